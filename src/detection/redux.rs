use super::clips::{
    ClipExtender, ClipMerger, ClipPostProcessor, ClipProcessor, ClipShifter, ClipSpan,
    ClipSuppressor, ClipTruncator,
};
use super::listener::{Clip, ClipListener};
use super::transient::{Transient, TransientFinder};
use crate::audio::{Sample, SampleTail};
use crate::config::ReduxSettings;
use crate::constants::CROSSING_INDEX_CORRECTION;
use crate::error::{DetectorError, Result};
use crate::signal_processing::{
    Divider, FirFilter, Integrator, SignalProcessorChain, SignalStage, Squarer,
    ThresholdCrossingDetector, bandpass_taps, seconds_to_samples, seconds_to_samples_truncated,
};

/// Sample counts derived from `ReduxSettings` at one sample rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReduxLengths {
    pub filter_length: usize,
    pub integration_length: usize,
    pub ratio_delay: usize,
    pub min_length: usize,
    pub max_length: usize,
    pub initial_padding: usize,
    pub suppressor_period: usize,
}

impl ReduxLengths {
    pub fn new(settings: &ReduxSettings, sample_rate: f64) -> Self {
        let samples = |seconds| seconds_to_samples(seconds, sample_rate);
        Self {
            filter_length: samples(settings.filter_duration),
            integration_length: samples(settings.integration_time),
            ratio_delay: seconds_to_samples_truncated(settings.ratio_delay, sample_rate),
            min_length: samples(settings.min_duration),
            max_length: samples(settings.max_duration),
            initial_padding: samples(settings.initial_padding),
            suppressor_period: samples(settings.suppressor_period),
        }
    }
}

/// Per-threshold detection pipeline
struct ThresholdPipeline {
    threshold: f64,
    crossings: ThresholdCrossingDetector,
    finder: TransientFinder,
    post_processor: ClipPostProcessor,
    num_clips: usize,
}

/// Old Bird redux transient detector
///
/// Bandpass filters the input, squares and integrates it to a power signal,
/// and divides that power by a delayed copy of itself. Each threshold runs
/// its own crossing detector, transient finder and clip post-processor over
/// the shared ratio signal, and every resulting clip goes to the listener.
///
/// Feed samples with `detect` as they arrive, in buffers of any size, and
/// finish with `complete_detection`. The clips found do not depend on how
/// the input is divided into buffers.
pub struct ReduxDetector<L> {
    settings: ReduxSettings,
    sample_rate: f64,
    lengths: ReduxLengths,
    chain: SignalProcessorChain,
    pipelines: Vec<ThresholdPipeline>,
    tail: SampleTail,
    listener: L,
    num_samples_received: usize,
    complete: bool,
}

impl<L: ClipListener> ReduxDetector<L> {
    /// Create a detector for input at `sample_rate`
    ///
    /// # Errors
    /// Returns an error if the settings are invalid or describe filters that
    /// cannot be realized at this sample rate
    pub fn new(settings: ReduxSettings, sample_rate: f64, listener: L) -> Result<Self> {
        settings.validate()?;
        if !(sample_rate > 0.0) || !sample_rate.is_finite() {
            return Err(DetectorError::Config(format!(
                "invalid sample rate {}",
                sample_rate
            )));
        }

        let lengths = ReduxLengths::new(&settings, sample_rate);
        for (name, length) in [
            ("filter_duration", lengths.filter_length),
            ("integration_time", lengths.integration_length),
            ("ratio_delay", lengths.ratio_delay),
            ("min_duration", lengths.min_length),
        ] {
            if length == 0 {
                return Err(DetectorError::Config(format!(
                    "{} is shorter than one sample at {} Hz",
                    name, sample_rate
                )));
            }
        }

        let taps = bandpass_taps(
            lengths.filter_length,
            settings.filter_f0,
            settings.filter_f1,
            settings.filter_bw,
            sample_rate,
        )?;

        let stages: Vec<Box<dyn SignalStage>> = vec![
            Box::new(FirFilter::new(taps)?),
            Box::new(Squarer),
            Box::new(Integrator::new(lengths.integration_length)?),
            Box::new(Divider::new(lengths.ratio_delay)?),
        ];
        let chain = SignalProcessorChain::new(stages, sample_rate)?;

        let index_offset = chain.latency() + CROSSING_INDEX_CORRECTION;
        let pipelines = settings
            .thresholds
            .iter()
            .map(|&threshold| ThresholdPipeline {
                threshold,
                crossings: ThresholdCrossingDetector::new(threshold, index_offset),
                finder: TransientFinder::new(lengths.min_length, lengths.max_length),
                post_processor: Self::clip_post_processor(&settings, &lengths, sample_rate),
                num_clips: 0,
            })
            .collect();

        log::debug!(
            "{}: {} Hz, {} filter taps, integration {} samples, delay {}, latency {}",
            settings.name,
            sample_rate,
            lengths.filter_length,
            lengths.integration_length,
            lengths.ratio_delay,
            chain.latency()
        );

        Ok(Self {
            settings,
            sample_rate,
            lengths,
            chain,
            pipelines,
            tail: SampleTail::new(),
            listener,
            num_samples_received: 0,
            complete: false,
        })
    }

    fn clip_post_processor(
        settings: &ReduxSettings,
        lengths: &ReduxLengths,
        sample_rate: f64,
    ) -> ClipPostProcessor {
        let stages_settings = &settings.clip_stages;
        let mut stages: Vec<Box<dyn ClipProcessor>> =
            vec![Box::new(ClipExtender::new(lengths.initial_padding))];
        if stages_settings.merge {
            stages.push(Box::new(ClipMerger::new()));
        }
        if stages_settings.suppress {
            stages.push(Box::new(ClipSuppressor::new(
                settings.suppressor_count_threshold,
                lengths.suppressor_period,
            )));
        }
        if let Some(duration) = stages_settings.truncation_buffer_duration {
            stages.push(Box::new(ClipTruncator::new(seconds_to_samples(
                duration,
                sample_rate,
            ))));
        }
        stages.push(Box::new(ClipShifter::new(lengths.initial_padding)));
        ClipPostProcessor::new(stages)
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn settings(&self) -> &ReduxSettings {
        &self.settings
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn lengths(&self) -> &ReduxLengths {
        &self.lengths
    }

    /// Input samples that must arrive after a sample before any ratio
    /// depending on it is computed
    pub fn latency(&self) -> usize {
        self.chain.latency()
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.settings.thresholds
    }

    pub fn num_samples_received(&self) -> usize {
        self.num_samples_received
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }

    /// Process the next buffer of samples
    ///
    /// # Panics
    /// Panics if called after `complete_detection`
    pub fn detect<S: Sample>(&mut self, samples: &[S]) -> Result<()> {
        assert!(
            !self.complete,
            "detect called on a detector whose detection is complete"
        );

        self.tail.push(samples);
        self.num_samples_received += samples.len();

        let ratios = self.chain.process(self.tail.samples());
        self.tail.consume(self.chain.consumed_inputs(ratios.len()));

        log::trace!(
            "{}: {} samples in, {} ratios, {} retained",
            self.settings.name,
            samples.len(),
            ratios.len(),
            self.tail.len()
        );

        for pipeline in &mut self.pipelines {
            let crossings = pipeline.crossings.process(&ratios);
            if !crossings.is_empty() {
                log::trace!(
                    "threshold {}: {} crossings",
                    pipeline.threshold,
                    crossings.len()
                );
            }
            let transients = pipeline.finder.process(&crossings);
            let spans = pipeline.post_processor.process(to_spans(transients));
            notify(&mut self.listener, pipeline, spans)?;
        }

        Ok(())
    }

    /// Flush transients still open at the end of the stream
    ///
    /// # Panics
    /// Panics if detection is already complete
    pub fn complete_detection(&mut self) -> Result<()> {
        assert!(!self.complete, "detection is already complete");
        self.complete = true;

        let end_index = self.num_samples_received;
        for pipeline in &mut self.pipelines {
            let transients = pipeline.finder.complete(end_index);
            let spans = pipeline.post_processor.complete(to_spans(transients));
            notify(&mut self.listener, pipeline, spans)?;
            self.listener
                .complete_processing(pipeline.threshold)
                .map_err(DetectorError::Listener)?;

            log::debug!(
                "{}: threshold {} produced {} clips",
                self.settings.name,
                pipeline.threshold,
                pipeline.num_clips
            );
        }

        Ok(())
    }
}

fn to_spans(transients: Vec<Transient>) -> Vec<ClipSpan> {
    transients.into_iter().map(ClipSpan::from).collect()
}

fn notify<L: ClipListener>(
    listener: &mut L,
    pipeline: &mut ThresholdPipeline,
    spans: Vec<ClipSpan>,
) -> Result<()> {
    for span in spans {
        let clip = Clip {
            threshold: pipeline.threshold,
            start_index: span.start.max(0) as usize,
            length: span.length as usize,
            score: None,
        };
        pipeline.num_clips += 1;
        listener
            .process_clip(&clip)
            .map_err(DetectorError::Listener)?;
    }
    Ok(())
}
