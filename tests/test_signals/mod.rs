#![allow(dead_code)]

use nfcdetect::config::CallType;
use nfcdetect::simulation::{
    CallSpec, NoiseConfig, RecordingConfig, generate_recording, random_calls,
};

/// A single constant-frequency tone in otherwise silent audio
pub fn tone_in_silence(
    sample_rate: u32,
    duration: f32,
    onset: f32,
    tone_duration: f32,
    frequency_hz: f32,
) -> Vec<f32> {
    let config = RecordingConfig::new(sample_rate, duration).with_call(CallSpec::tone(
        onset,
        tone_duration,
        frequency_hz,
        0.5,
    ));
    generate_recording(&config)
}

/// Faint white noise with a few chirps in the band of `call_type`
pub fn noisy_night(call_type: CallType, sample_rate: u32, duration: f32, seed: u64) -> Vec<f32> {
    let calls = random_calls(call_type, 4, duration, 0.2, Some(seed));
    let config = RecordingConfig {
        sample_rate,
        duration,
        calls,
        noise: NoiseConfig::default()
            .with_seed(seed)
            .with_white_noise(-40.0)
            .with_impulse(0.5, 0.3, 3),
    };
    generate_recording(&config)
}

/// 16-bit samples at full scale
pub fn to_i16(signal: &[f32]) -> Vec<i16> {
    signal
        .iter()
        .map(|&x| (x.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16)
        .collect()
}
