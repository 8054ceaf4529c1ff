use super::SignalStage;
use crate::error::{DetectorError, Result};

/// Ordered composition of signal stages
///
/// The chain behaves as a single stage whose record size, hop size and
/// latency are derived from its members. Given any run of input samples it
/// produces every output whose record lies entirely in that run; the caller
/// keeps the unconsumed tail and prepends it to the next run.
pub struct SignalProcessorChain {
    stages: Vec<Box<dyn SignalStage>>,
    input_sample_rate: f64,
    hop_size: usize,
    latency: usize,
    time_offset_samples: f64,
}

impl SignalProcessorChain {
    /// Create a chain from its stages, first stage first
    ///
    /// # Errors
    /// Returns `DetectorError::Config` if the chain is empty, the sample rate
    /// is not positive, or adjacent stages disagree on sample width
    pub fn new(stages: Vec<Box<dyn SignalStage>>, input_sample_rate: f64) -> Result<Self> {
        if stages.is_empty() {
            return Err(DetectorError::Config(
                "signal processor chain needs at least one stage".to_string(),
            ));
        }
        if !(input_sample_rate > 0.0) || !input_sample_rate.is_finite() {
            return Err(DetectorError::Config(format!(
                "invalid sample rate {}",
                input_sample_rate
            )));
        }

        let first = &stages[0];
        if first.input_width() != 1 {
            return Err(DetectorError::Config(format!(
                "first stage '{}' must take scalar samples",
                first.name()
            )));
        }
        for pair in stages.windows(2) {
            if pair[0].output_width() != pair[1].input_width() {
                return Err(DetectorError::Config(format!(
                    "stage '{}' produces samples of width {} but '{}' expects {}",
                    pair[0].name(),
                    pair[0].output_width(),
                    pair[1].name(),
                    pair[1].input_width()
                )));
            }
        }
        if let Some(last) = stages.last()
            && last.output_width() != 1
        {
            return Err(DetectorError::Config(format!(
                "last stage '{}' must produce scalar samples",
                last.name()
            )));
        }

        let hop_size = stages.iter().map(|s| s.hop_size()).product();
        let time_offset_samples = stages
            .iter()
            .rev()
            .fold(0.0, |offset, s| s.time_offset() + s.hop_size() as f64 * offset);

        let mut chain = Self {
            stages,
            input_sample_rate,
            hop_size,
            latency: 0,
            time_offset_samples,
        };
        chain.latency = chain.required_inputs(1) - 1;

        log::debug!(
            "Signal processor chain [{}]: latency {} samples, hop {}",
            chain
                .stages
                .iter()
                .map(|s| s.name())
                .collect::<Vec<_>>()
                .join(" -> "),
            chain.latency,
            chain.hop_size
        );

        Ok(chain)
    }

    /// Input samples that must be received beyond the first before the
    /// first output exists
    pub fn latency(&self) -> usize {
        self.latency
    }

    /// Input samples between consecutive outputs
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    pub fn input_sample_rate(&self) -> f64 {
        self.input_sample_rate
    }

    pub fn output_sample_rate(&self) -> f64 {
        self.input_sample_rate / self.hop_size as f64
    }

    /// Nominal time of output 0, in input samples
    pub fn time_offset_samples(&self) -> f64 {
        self.time_offset_samples
    }

    /// Nominal time of output 0, in seconds
    pub fn output_time_offset(&self) -> f64 {
        self.time_offset_samples / self.input_sample_rate
    }

    /// Input samples needed to produce `num_outputs` outputs
    pub fn required_inputs(&self, num_outputs: usize) -> usize {
        self.stages
            .iter()
            .rev()
            .fold(num_outputs, |needed, stage| stage.required_inputs(needed))
    }

    /// Outputs producible from `num_inputs` inputs
    pub fn output_count(&self, num_inputs: usize) -> usize {
        self.stages
            .iter()
            .fold(num_inputs, |available, stage| stage.output_count(available))
    }

    /// Leading inputs no longer needed once `num_outputs` outputs exist
    pub fn consumed_inputs(&self, num_outputs: usize) -> usize {
        num_outputs * self.hop_size
    }

    /// Index of the last input sample output `output_index` depends on
    pub fn input_index(&self, output_index: usize) -> usize {
        output_index * self.hop_size + self.latency
    }

    /// Nominal time of output `output_index`, in input samples
    pub fn input_time(&self, output_index: usize) -> f64 {
        output_index as f64 * self.hop_size as f64 + self.time_offset_samples
    }

    /// Run every complete record in `input` through the chain
    ///
    /// Only the first `required_inputs(n)` samples are used, where `n` is
    /// `output_count(input.len())`.
    pub fn process(&mut self, input: &[f64]) -> Vec<f64> {
        let num_outputs = self.output_count(input.len());
        if num_outputs == 0 {
            return Vec::new();
        }

        let used = self.required_inputs(num_outputs);
        let mut stages = self.stages.iter_mut();
        let Some(first) = stages.next() else {
            return Vec::new();
        };
        let mut signal = first.process(&input[..used]);
        for stage in stages {
            signal = stage.process(&signal);
        }

        debug_assert_eq!(signal.len(), num_outputs);
        signal
    }
}
