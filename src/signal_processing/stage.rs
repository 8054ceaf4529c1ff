/// One stage of a streaming signal processor chain
///
/// A stage maps a run of input samples to a run of output samples. Every
/// output sample depends on exactly `record_size()` consecutive input
/// samples, and consecutive outputs are `hop_size()` inputs apart. A stage
/// never produces an output whose record it has not fully received; callers
/// carry unconsumed samples over to the next call themselves.
///
/// Samples may be vectors (e.g. one power spectrum per spectrogram frame).
/// The `input_width()` / `output_width()` values give the number of `f64`
/// values per sample, stored contiguously.
pub trait SignalStage: Send {
    fn name(&self) -> &'static str;

    /// Number of input samples spanned by one output sample
    fn record_size(&self) -> usize;

    /// Number of input samples between consecutive output samples
    fn hop_size(&self) -> usize {
        1
    }

    fn input_width(&self) -> usize {
        1
    }

    fn output_width(&self) -> usize {
        1
    }

    /// Input samples that must be received before the first output exists,
    /// beyond the one the output is aligned with
    fn latency(&self) -> usize {
        self.record_size() - 1
    }

    /// Position, in input samples, of the nominal time of output sample 0
    ///
    /// Causal stages align an output with the last input it depends on.
    fn time_offset(&self) -> f64 {
        self.latency() as f64
    }

    /// Input samples needed to produce `num_outputs` output samples
    fn required_inputs(&self, num_outputs: usize) -> usize {
        if num_outputs == 0 {
            0
        } else {
            (num_outputs - 1) * self.hop_size() + self.record_size()
        }
    }

    /// Output samples producible from `num_inputs` input samples
    fn output_count(&self, num_inputs: usize) -> usize {
        let record_size = self.record_size();
        if num_inputs < record_size {
            0
        } else {
            (num_inputs - record_size) / self.hop_size() + 1
        }
    }

    /// Process a run of input samples
    ///
    /// `input.len()` must be a multiple of `input_width()`. Returns
    /// `output_count(input.len() / input_width())` samples.
    fn process(&mut self, input: &[f64]) -> Vec<f64>;
}
