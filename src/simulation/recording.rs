use rand::RngExt;

use super::noise::{NoiseConfig, apply_noise, create_rng};
use super::signal::{CallSpec, add_call, silence};
use crate::config::CallType;

/// Description of a synthetic recording
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct RecordingConfig {
    pub sample_rate: u32,
    /// Recording length (s)
    pub duration: f32,
    #[serde(default)]
    pub calls: Vec<CallSpec>,
    #[serde(default)]
    pub noise: NoiseConfig,
}

impl RecordingConfig {
    pub fn new(sample_rate: u32, duration: f32) -> Self {
        Self {
            sample_rate,
            duration,
            calls: Vec::new(),
            noise: NoiseConfig::default(),
        }
    }

    pub fn with_call(mut self, call: CallSpec) -> Self {
        self.calls.push(call);
        self
    }

    pub fn with_noise(mut self, noise: NoiseConfig) -> Self {
        self.noise = noise;
        self
    }
}

/// Render a recording: calls first, then noise
pub fn generate_recording(config: &RecordingConfig) -> Vec<f32> {
    let mut signal = silence(config.duration, config.sample_rate);
    for call in &config.calls {
        add_call(&mut signal, config.sample_rate, call);
    }
    apply_noise(&mut signal, &config.noise, config.sample_rate);
    signal
}

/// Frequency range of synthetic calls of each type (Hz)
pub fn call_band(call_type: CallType) -> (f32, f32) {
    match call_type {
        CallType::Tseep => (6500.0, 9500.0),
        CallType::Thrush => (3000.0, 4800.0),
    }
}

/// Randomly placed, non-overlapping downward chirps in the band of
/// `call_type`, sorted by onset
///
/// Calls are separated by at least one second so that each can be detected
/// on its own.
pub fn random_calls(
    call_type: CallType,
    count: usize,
    recording_duration: f32,
    amplitude: f32,
    seed: Option<u64>,
) -> Vec<CallSpec> {
    let mut rng = create_rng(seed);
    let (low, high) = call_band(call_type);
    let slot = recording_duration / count.max(1) as f32;

    (0..count)
        .filter_map(|i| {
            let duration = 0.05 + rng.random::<f32>() * 0.1;
            let spare = slot - duration - 1.0;
            if spare <= 0.0 {
                return None;
            }
            let onset = i as f32 * slot + 0.5 + rng.random::<f32>() * spare;
            let start_hz = high - rng.random::<f32>() * (high - low) * 0.3;
            let end_hz = low + rng.random::<f32>() * (high - low) * 0.3;
            Some(CallSpec::chirp(onset, duration, start_hz, end_hz, amplitude))
        })
        .collect()
}
