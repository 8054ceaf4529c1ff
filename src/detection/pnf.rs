use super::clips::Clipper;
use super::listener::{Clip, ClipListener};
use crate::audio::{Sample, SampleTail};
use crate::config::PnfSettings;
use crate::error::{DetectorError, Result};
use crate::signal_processing::{
    Divider, FirFilter, FrequencyIntegrator, ScoredRise, ScoredRiseDetector,
    SignalProcessorChain, SignalStage, Spectrograph, lowpass_taps, seconds_to_samples,
    seconds_to_samples_truncated,
};

/// Per-threshold detection state
struct ThresholdPipeline {
    threshold: f64,
    rises: ScoredRiseDetector,
    num_clips: usize,
}

/// Spectrogram band-energy detector
///
/// Computes a spectrogram, sums the power in the call band, smooths that
/// power with a lowpass filter and divides it by a delayed copy of itself.
/// Each excursion of the ratio above a threshold yields one fixed-length
/// clip, scored with the largest ratio reached during the excursion.
pub struct PnfDetector<L> {
    settings: PnfSettings,
    sample_rate: f64,
    chain: SignalProcessorChain,
    clipper: Clipper,
    pipelines: Vec<ThresholdPipeline>,
    tail: SampleTail,
    listener: L,
    num_samples_received: usize,
    complete: bool,
}

impl<L: ClipListener> PnfDetector<L> {
    /// Create a detector for input at `sample_rate`
    ///
    /// # Errors
    /// Returns an error if the settings are invalid or cannot be realized at
    /// this sample rate
    pub fn new(settings: PnfSettings, sample_rate: f64, listener: L) -> Result<Self> {
        settings.validate()?;
        if !(sample_rate > 0.0) || !sample_rate.is_finite() {
            return Err(DetectorError::Config(format!(
                "invalid sample rate {}",
                sample_rate
            )));
        }

        let window_size = seconds_to_samples(settings.window_size, sample_rate);
        let hop_size =
            seconds_to_samples(settings.window_size * settings.hop_size / 100.0, sample_rate);
        if window_size == 0 || hop_size == 0 {
            return Err(DetectorError::Config(format!(
                "spectrogram window of {} s is shorter than one sample at {} Hz",
                settings.window_size, sample_rate
            )));
        }

        let spectrograph = Spectrograph::new(settings.window_type, window_size, hop_size)?;
        let bin_size = spectrograph.bin_size(sample_rate);
        let integrator = FrequencyIntegrator::from_band(
            spectrograph.num_bins(),
            bin_size,
            settings.start_frequency,
            settings.end_frequency,
        )?;
        let bins = integrator.bin_range();

        let frame_rate = sample_rate / hop_size as f64;
        let power_filter_taps = lowpass_taps(
            settings.power_filter_length,
            settings.power_filter_passband_end_frequency,
            settings.power_filter_stopband_start_frequency,
            frame_rate,
        )?;

        let delay = seconds_to_samples_truncated(settings.delay, frame_rate);
        let stages: Vec<Box<dyn SignalStage>> = vec![
            Box::new(spectrograph),
            Box::new(integrator),
            Box::new(FirFilter::new(power_filter_taps)?),
            Box::new(Divider::new(delay)?),
        ];
        let chain = SignalProcessorChain::new(stages, sample_rate)?;

        let clipper = Clipper::new(
            seconds_to_samples(settings.initial_clip_padding, sample_rate),
            seconds_to_samples(settings.clip_duration, sample_rate),
        );

        let pipelines = settings
            .thresholds
            .iter()
            .map(|&threshold| ThresholdPipeline {
                threshold,
                rises: ScoredRiseDetector::new(threshold),
                num_clips: 0,
            })
            .collect();

        log::debug!(
            "{}: {} Hz, window {} hop {}, bins {}..{}, {} power filter taps, delay {} frames, latency {}",
            settings.name,
            sample_rate,
            window_size,
            hop_size,
            bins.start,
            bins.end,
            settings.power_filter_length,
            delay,
            chain.latency()
        );

        Ok(Self {
            settings,
            sample_rate,
            chain,
            clipper,
            pipelines,
            tail: SampleTail::new(),
            listener,
            num_samples_received: 0,
            complete: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn settings(&self) -> &PnfSettings {
        &self.settings
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn latency(&self) -> usize {
        self.chain.latency()
    }

    /// Input samples between consecutive ratio values
    pub fn hop_size(&self) -> usize {
        self.chain.hop_size()
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
            for rise in pipeline.rises.process(&ratios) {
                let clip = make_clip(&self.chain, &self.clipper, pipeline.threshold, rise);
                pipeline.num_clips += 1;
                self.listener
                    .process_clip(&clip)
                    .map_err(DetectorError::Listener)?;
            }
        }

        Ok(())
    }

    /// Report excursions still above threshold at the end of the stream
    ///
    /// # Panics
    /// Panics if detection is already complete
    pub fn complete_detection(&mut self) -> Result<()> {
        assert!(!self.complete, "detection is already complete");
        self.complete = true;

        for pipeline in &mut self.pipelines {
            if let Some(rise) = pipeline.rises.finish() {
                let clip = make_clip(&self.chain, &self.clipper, pipeline.threshold, rise);
                pipeline.num_clips += 1;
                self.listener
                    .process_clip(&clip)
                    .map_err(DetectorError::Listener)?;
            }
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

/// Clip for a scored rise, timed at the center of the ratio's numerator
fn make_clip(
    chain: &SignalProcessorChain,
    clipper: &Clipper,
    threshold: f64,
    rise: ScoredRise,
) -> Clip {
    let time = chain.input_time(rise.ratio_index).round_ties_even().max(0.0) as usize;
    let (start_index, length) = clipper.clip(time);
    Clip {
        threshold,
        start_index,
        length,
        score: Some(rise.score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::ClipCollector;

    #[test]
    fn test_tseep_geometry_at_24k() {
        let detector =
            PnfDetector::new(PnfSettings::tseep(), 24000.0, ClipCollector::new()).unwrap();
        // 120-sample window, 60-sample hop, 23 filter taps, 20-frame delay
        assert_eq!(detector.hop_size(), 60);
        assert_eq!(detector.latency(), 119 + (22 + 20) * 60);
    }

    #[test]
    fn test_silence_produces_no_clips() {
        let mut detector =
            PnfDetector::new(PnfSettings::thrush(), 22050.0, ClipCollector::new()).unwrap();
        detector.detect(&vec![0.0f32; 44100]).unwrap();
        detector.complete_detection().unwrap();
        let collector = detector.into_listener();
        assert!(collector.clips.is_empty());
        assert_eq!(collector.completed, vec![2.0]);
    }

    #[test]
    fn test_band_above_nyquist_rejected() {
        let mut settings = PnfSettings::tseep();
        settings.end_frequency = 30000.0;
        assert!(PnfDetector::new(settings, 24000.0, ClipCollector::new()).is_err());
    }

    #[test]
    #[should_panic(expected = "complete")]
    fn test_detect_after_completion_panics() {
        let mut detector =
            PnfDetector::new(PnfSettings::tseep(), 24000.0, ClipCollector::new()).unwrap();
        detector.complete_detection().unwrap();
        let _ = detector.detect(&[0i16; 10]);
    }
}
