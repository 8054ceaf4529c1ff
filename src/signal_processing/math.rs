/// Convert a duration to a whole number of samples, rounding to nearest
///
/// Ties round to even, matching the rounding the legacy detectors used for
/// every duration except the ratio delay.
pub fn seconds_to_samples(seconds: f64, sample_rate: f64) -> usize {
    (seconds * sample_rate).round_ties_even().max(0.0) as usize
}

/// Convert a duration to a whole number of samples, rounding toward zero
///
/// The legacy ratio delay was computed this way rather than to nearest.
pub fn seconds_to_samples_truncated(seconds: f64, sample_rate: f64) -> usize {
    (seconds * sample_rate).trunc().max(0.0) as usize
}

/// Normalized sinc, `sin(pi x) / (pi x)`
pub fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = std::f64::consts::PI * x;
        px.sin() / px
    }
}
