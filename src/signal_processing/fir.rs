use std::sync::Arc;

use super::SignalStage;
use crate::error::{DetectorError, Result};

/// FIR filter stage
///
/// Computes the strictly valid part of the convolution of its input with the
/// filter taps: `N` taps turn `M` input samples into `M - N + 1` outputs, and
/// no zero padding is ever applied. The taps are shared read-only, so
/// detectors built from the same design can share one allocation.
pub struct FirFilter {
    taps: Arc<[f64]>,
    reversed: Vec<f64>,
}

impl FirFilter {
    /// Create a new FIR filter with the given tap coefficients
    ///
    /// # Errors
    /// Returns `DetectorError::Config` if `taps` is empty
    pub fn new(taps: impl Into<Arc<[f64]>>) -> Result<Self> {
        let taps: Arc<[f64]> = taps.into();
        if taps.is_empty() {
            return Err(DetectorError::Config(
                "FIR filter needs at least one tap".to_string(),
            ));
        }
        let reversed = taps.iter().rev().copied().collect();
        let filter = Self { taps, reversed };
        log::debug!(
            "FIR filter: {} taps, group delay {} samples",
            filter.num_taps(),
            filter.group_delay_samples()
        );
        Ok(filter)
    }

    /// Get the number of taps (filter length)
    pub fn num_taps(&self) -> usize {
        self.taps.len()
    }

    /// Get the group delay in samples (half the filter length for linear phase)
    pub fn group_delay_samples(&self) -> usize {
        (self.taps.len() - 1) / 2
    }
}

impl SignalStage for FirFilter {
    fn name(&self) -> &'static str {
        "FIR Filter"
    }

    fn record_size(&self) -> usize {
        self.taps.len()
    }

    fn process(&mut self, input: &[f64]) -> Vec<f64> {
        input
            .windows(self.reversed.len())
            .map(|window| {
                window
                    .iter()
                    .zip(&self.reversed)
                    .map(|(x, h)| x * h)
                    .sum::<f64>()
            })
            .collect()
    }
}
