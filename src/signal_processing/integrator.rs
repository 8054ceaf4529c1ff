use super::SignalStage;
use crate::error::{DetectorError, Result};

/// Moving-average integrator
///
/// Equivalent to an FIR filter whose `L` taps all equal `1/L`, approximating
/// the leaky integrator of the legacy analog detector. Every output is a
/// fresh sum over its own window, so rounding error never accumulates over
/// long recordings and the output for a given window does not depend on how
/// the input stream was split into buffers.
pub struct Integrator {
    length: usize,
    scale: f64,
}

impl Integrator {
    /// Create a new integrator
    ///
    /// # Arguments
    /// * `length` - Number of samples to average
    ///
    /// # Errors
    /// Returns `DetectorError::Config` if `length` is zero
    pub fn new(length: usize) -> Result<Self> {
        if length == 0 {
            return Err(DetectorError::Config(
                "integration length must be at least one sample".to_string(),
            ));
        }
        Ok(Self {
            length,
            scale: 1.0 / length as f64,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl SignalStage for Integrator {
    fn name(&self) -> &'static str {
        "Integrator"
    }

    fn record_size(&self) -> usize {
        self.length
    }

    fn process(&mut self, input: &[f64]) -> Vec<f64> {
        input
            .windows(self.length)
            .map(|window| window.iter().sum::<f64>() * self.scale)
            .collect()
    }
}
