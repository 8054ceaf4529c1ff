use super::SignalStage;
use crate::constants::RATIO_DENOMINATOR_EPSILON;
use crate::error::{DetectorError, Result};

/// Ratio of a signal to a delayed copy of itself
///
/// Output `i` is `x[i + delay] / x[i]`. Denominators that are exactly zero
/// are replaced by `RATIO_DENOMINATOR_EPSILON`, so silence yields zero and an
/// onset out of silence yields a very large but finite ratio.
pub struct Divider {
    delay: usize,
}

impl Divider {
    /// # Errors
    /// Returns `DetectorError::Config` if `delay` is zero
    pub fn new(delay: usize) -> Result<Self> {
        if delay == 0 {
            return Err(DetectorError::Config(
                "ratio delay must be at least one sample".to_string(),
            ));
        }
        Ok(Self { delay })
    }

    pub fn delay(&self) -> usize {
        self.delay
    }
}

impl SignalStage for Divider {
    fn name(&self) -> &'static str {
        "Divider"
    }

    fn record_size(&self) -> usize {
        self.delay + 1
    }

    fn process(&mut self, input: &[f64]) -> Vec<f64> {
        if input.len() <= self.delay {
            return Vec::new();
        }
        input[self.delay..]
            .iter()
            .zip(input)
            .map(|(&numerator, &denominator)| {
                let denominator = if denominator == 0.0 {
                    RATIO_DENOMINATOR_EPSILON
                } else {
                    denominator
                };
                numerator / denominator
            })
            .collect()
    }
}
