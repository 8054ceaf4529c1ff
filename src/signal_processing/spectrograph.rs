use super::stage::SignalStage;
use crate::error::{DetectorError, Result};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;
use std::sync::Arc;

/// Spectrogram analysis window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    Hann,
    Hamming,
    Blackman,
    Rectangular,
}

impl WindowType {
    /// Periodic (DFT-even) window of the given length
    pub fn coefficients(self, size: usize) -> Vec<f64> {
        let n = size as f64;
        (0..size)
            .map(|i| {
                let phase = 2.0 * PI * i as f64 / n;
                match self {
                    WindowType::Hann => 0.5 - 0.5 * phase.cos(),
                    WindowType::Hamming => 0.54 - 0.46 * phase.cos(),
                    WindowType::Blackman => {
                        0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
                    }
                    WindowType::Rectangular => 1.0,
                }
            })
            .collect()
    }
}

impl FromStr for WindowType {
    type Err = DetectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hann" | "hanning" => Ok(WindowType::Hann),
            "hamming" => Ok(WindowType::Hamming),
            "blackman" => Ok(WindowType::Blackman),
            "rectangular" | "boxcar" => Ok(WindowType::Rectangular),
            other => Err(DetectorError::Config(format!(
                "unknown window type '{}'",
                other
            ))),
        }
    }
}

/// Short-time Fourier transform power stage
///
/// Each output sample is the power spectrum `|X[k]|^2`, `k = 0..=dft_size/2`,
/// of one windowed record of `window_size` input samples, zero-padded to
/// `dft_size` (the next power of two). Records start `hop_size` samples
/// apart. The nominal time of a spectrum is the center of its window.
pub struct Spectrograph {
    window: Vec<f64>,
    hop_size: usize,
    dft_size: usize,
    fft: Arc<dyn Fft<f64>>,
    buffer: Vec<Complex64>,
    scratch: Vec<Complex64>,
}

impl Spectrograph {
    pub fn new(window_type: WindowType, window_size: usize, hop_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(DetectorError::Config(
                "spectrogram window size must be positive".to_string(),
            ));
        }
        if hop_size == 0 {
            return Err(DetectorError::Config(
                "spectrogram hop size must be positive".to_string(),
            ));
        }

        let dft_size = window_size.next_power_of_two();
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(dft_size);
        let scratch = vec![Complex64::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Ok(Self {
            window: window_type.coefficients(window_size),
            hop_size,
            dft_size,
            fft,
            buffer: vec![Complex64::new(0.0, 0.0); dft_size],
            scratch,
        })
    }

    pub fn window_size(&self) -> usize {
        self.window.len()
    }

    pub fn dft_size(&self) -> usize {
        self.dft_size
    }

    pub fn num_bins(&self) -> usize {
        self.dft_size / 2 + 1
    }

    /// Width of one frequency bin in Hz
    pub fn bin_size(&self, sample_rate: f64) -> f64 {
        sample_rate / self.dft_size as f64
    }
}

impl SignalStage for Spectrograph {
    fn name(&self) -> &'static str {
        "Spectrograph"
    }

    fn record_size(&self) -> usize {
        self.window.len()
    }

    fn hop_size(&self) -> usize {
        self.hop_size
    }

    fn output_width(&self) -> usize {
        self.num_bins()
    }

    fn time_offset(&self) -> f64 {
        (self.window.len() as f64 - 1.0) / 2.0
    }

    fn process(&mut self, input: &[f64]) -> Vec<f64> {
        let num_frames = self.output_count(input.len());
        let num_bins = self.num_bins();
        let window_size = self.window.len();
        let mut output = Vec::with_capacity(num_frames * num_bins);

        for frame in 0..num_frames {
            let start = frame * self.hop_size;
            let record = &input[start..start + window_size];

            for (slot, (&x, &w)) in self.buffer.iter_mut().zip(record.iter().zip(&self.window)) {
                *slot = Complex64::new(x * w, 0.0);
            }
            for slot in &mut self.buffer[window_size..] {
                *slot = Complex64::new(0.0, 0.0);
            }

            self.fft
                .process_with_scratch(&mut self.buffer, &mut self.scratch);
            output.extend(self.buffer[..num_bins].iter().map(|c| c.norm_sqr()));
        }

        output
    }
}

/// Sums spectrum bins `[start_bin, end_bin)` into a single power value
pub struct FrequencyIntegrator {
    num_bins: usize,
    start_bin: usize,
    end_bin: usize,
}

impl FrequencyIntegrator {
    pub fn new(num_bins: usize, start_bin: usize, end_bin: usize) -> Result<Self> {
        if start_bin >= end_bin || end_bin > num_bins {
            return Err(DetectorError::Config(format!(
                "invalid frequency bin range [{}, {}) for {} bins",
                start_bin, end_bin, num_bins
            )));
        }
        Ok(Self {
            num_bins,
            start_bin,
            end_bin,
        })
    }

    /// Integrator for the bins whose centers best cover a frequency band
    ///
    /// The start bin is the first whose lower edge is at or above
    /// `start_frequency`, and the end bin the last whose upper edge is at or
    /// below `end_frequency`, each rounded half to even.
    pub fn from_band(
        num_bins: usize,
        bin_size: f64,
        start_frequency: f64,
        end_frequency: f64,
    ) -> Result<Self> {
        let half = bin_size / 2.0;
        let start_bin = ((start_frequency + half) / bin_size).round_ties_even();
        let end_bin = ((end_frequency - half) / bin_size).round_ties_even();
        if start_bin < 0.0 || end_bin <= start_bin {
            return Err(DetectorError::Config(format!(
                "frequency band {}-{} Hz covers no spectrum bins (bin size {} Hz)",
                start_frequency, end_frequency, bin_size
            )));
        }
        Self::new(num_bins, start_bin as usize, end_bin as usize)
    }

    pub fn bin_range(&self) -> std::ops::Range<usize> {
        self.start_bin..self.end_bin
    }
}

impl SignalStage for FrequencyIntegrator {
    fn name(&self) -> &'static str {
        "Frequency Integrator"
    }

    fn record_size(&self) -> usize {
        1
    }

    fn input_width(&self) -> usize {
        self.num_bins
    }

    fn process(&mut self, input: &[f64]) -> Vec<f64> {
        input
            .chunks_exact(self.num_bins)
            .map(|spectrum| spectrum[self.start_bin..self.end_bin].iter().sum())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_window_coefficients() {
        let hann = WindowType::Hann.coefficients(4);
        assert_relative_eq!(hann[0], 0.0);
        assert_relative_eq!(hann[1], 0.5, epsilon = 1e-12);
        assert_relative_eq!(hann[2], 1.0);
        assert_relative_eq!(hann[3], 0.5, epsilon = 1e-12);

        assert!(WindowType::Rectangular.coefficients(5).iter().all(|&w| w == 1.0));
        assert_relative_eq!(WindowType::Hamming.coefficients(8)[0], 0.08, epsilon = 1e-12);
        assert_relative_eq!(WindowType::Blackman.coefficients(8)[0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_window_type_from_str() {
        assert_eq!("hann".parse::<WindowType>().unwrap(), WindowType::Hann);
        assert_eq!("Hamming".parse::<WindowType>().unwrap(), WindowType::Hamming);
        assert!("kaiser".parse::<WindowType>().is_err());
    }

    #[test]
    fn test_spectrograph_geometry() {
        let spectrograph = Spectrograph::new(WindowType::Hann, 120, 60).unwrap();
        assert_eq!(spectrograph.dft_size(), 128);
        assert_eq!(spectrograph.num_bins(), 65);
        assert_eq!(spectrograph.latency(), 119);
        assert_relative_eq!(spectrograph.time_offset(), 59.5);
        assert_eq!(spectrograph.output_count(119), 0);
        assert_eq!(spectrograph.output_count(120), 1);
        assert_eq!(spectrograph.output_count(180), 2);
        assert_eq!(spectrograph.required_inputs(3), 240);
    }

    #[test]
    fn test_spectrograph_tone_peak() {
        let sample_rate = 1024.0;
        let freq = 128.0;
        let input: Vec<f64> = (0..256)
            .map(|n| (2.0 * PI * freq * n as f64 / sample_rate).sin())
            .collect();

        let mut spectrograph = Spectrograph::new(WindowType::Hann, 64, 32).unwrap();
        let output = spectrograph.process(&input);
        let num_bins = spectrograph.num_bins();
        assert_eq!(output.len(), 7 * num_bins);

        let expected_bin = (freq / spectrograph.bin_size(sample_rate)) as usize;
        for spectrum in output.chunks_exact(num_bins) {
            let peak = spectrum
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(k, _)| k)
                .unwrap();
            assert_eq!(peak, expected_bin);
        }
    }

    #[test]
    fn test_spectrograph_rectangular_dc_power() {
        let mut spectrograph = Spectrograph::new(WindowType::Rectangular, 8, 8).unwrap();
        let output = spectrograph.process(&[1.0; 8]);
        assert_relative_eq!(output[0], 64.0, epsilon = 1e-9);
        assert!(output[1..].iter().all(|&p| p < 1e-9));
    }

    #[test]
    fn test_band_to_bins() {
        // 24 kHz, 128-point DFT: 187.5 Hz bins.
        let integrator = FrequencyIntegrator::from_band(65, 187.5, 6000.0, 10000.0).unwrap();
        // (6000 + 93.75) / 187.5 = 32.5 -> 32; (10000 - 93.75) / 187.5 = 52.83 -> 53
        assert_eq!(integrator.bin_range(), 32..53);
    }

    #[test]
    fn test_frequency_integrator_sums_bins() {
        let mut integrator = FrequencyIntegrator::new(4, 1, 3).unwrap();
        let output = integrator.process(&[1.0, 2.0, 3.0, 4.0, 10.0, 20.0, 30.0, 40.0]);
        assert_eq!(output, vec![5.0, 50.0]);
    }

    #[test]
    fn test_empty_band_rejected() {
        assert!(FrequencyIntegrator::from_band(65, 187.5, 6000.0, 6000.0).is_err());
        assert!(FrequencyIntegrator::new(4, 3, 5).is_err());
    }
}
