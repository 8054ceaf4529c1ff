mod noise;
mod recording;
mod signal;

pub use noise::{
    AdditiveNoiseConfig, ImpulseNoiseConfig, NoiseConfig, apply_noise, signal_power,
};
pub use recording::{RecordingConfig, call_band, generate_recording, random_calls};
pub use signal::{CALL_FADE_SECONDS, CallShape, CallSpec, add_call, silence};
