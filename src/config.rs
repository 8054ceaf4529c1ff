//! Detector settings and presets.
//!
//! Every detector is configured by an immutable settings record. Named
//! presets exist for each detector kind and call type; any preset can have
//! its thresholds overridden, and complete settings can be loaded from TOML:
//!
//! ```toml
//! name = "Old Bird Redux 1.1 Tseep"
//! filter_f0 = 6000.0
//! filter_f1 = 10000.0
//! # ...
//! thresholds = [2.0, 3.0]
//! ```
//!
//! Durations are in seconds and frequencies in Hz throughout. They are
//! converted to whole samples only when a detector is built for a specific
//! sample rate.

use crate::constants::LEGACY_SAMPLE_RATE;
use crate::error::{DetectorError, Result};
use crate::signal_processing::WindowType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Nocturnal flight call class a detector is tuned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    /// High, thin calls, roughly 6 to 10 kHz
    Tseep,
    /// Lower calls, roughly 2.8 to 5 kHz
    Thrush,
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallType::Tseep => write!(f, "Tseep"),
            CallType::Thrush => write!(f, "Thrush"),
        }
    }
}

impl FromStr for CallType {
    type Err = DetectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tseep" => Ok(CallType::Tseep),
            "thrush" => Ok(CallType::Thrush),
            other => Err(DetectorError::Config(format!(
                "unknown call type '{}'",
                other
            ))),
        }
    }
}

/// Detector family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    /// Old Bird redux: bandpass, power, integration, ratio
    Redux,
    /// Spectrogram band energy with a smoothed power ratio
    Pnf,
    /// Earlier tuning of the spectrogram energy detector
    Baseline,
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorKind::Redux => write!(f, "redux"),
            DetectorKind::Pnf => write!(f, "pnf"),
            DetectorKind::Baseline => write!(f, "baseline"),
        }
    }
}

impl FromStr for DetectorKind {
    type Err = DetectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redux" | "old-bird" | "oldbird" => Ok(DetectorKind::Redux),
            "pnf" | "energy" => Ok(DetectorKind::Pnf),
            "baseline" => Ok(DetectorKind::Baseline),
            other => Err(DetectorError::Config(format!(
                "unknown detector kind '{}'",
                other
            ))),
        }
    }
}

/// Optional legacy clip stages of the redux detector
///
/// All disabled by default. When enabled they run between the clip
/// extender and the clip shifter, in the order merge, suppress, truncate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClipStageSettings {
    /// Merge overlapping or adjacent clips
    pub merge: bool,
    /// Drop clips that arrive in bursts (see `suppressor_count_threshold`)
    pub suppress: bool,
    /// Truncate clips to windows of this many seconds aligned to multiples
    /// of the same duration
    pub truncation_buffer_duration: Option<f64>,
}

fn default_redux_name() -> String {
    "Old Bird Redux 1.1".to_string()
}

/// Settings of an Old Bird redux detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReduxSettings {
    #[serde(default = "default_redux_name")]
    pub name: String,
    /// Bandpass lower passband edge (Hz)
    pub filter_f0: f64,
    /// Bandpass upper passband edge (Hz)
    pub filter_f1: f64,
    /// Width of each bandpass transition band (Hz)
    pub filter_bw: f64,
    /// Bandpass filter length (s)
    pub filter_duration: f64,
    /// Power integration window (s)
    pub integration_time: f64,
    /// Delay between the two powers of the ratio (s)
    pub ratio_delay: f64,
    /// Rise thresholds; the fall threshold of each is its inverse
    #[serde(alias = "ratio_thresholds")]
    pub thresholds: Vec<f64>,
    /// Minimum transient duration (s)
    pub min_duration: f64,
    /// Maximum transient duration (s)
    pub max_duration: f64,
    /// Lead-in added before each transient (s)
    pub initial_padding: f64,
    /// Clip count that triggers suppression
    pub suppressor_count_threshold: usize,
    /// Window over which clips are counted for suppression (s)
    pub suppressor_period: f64,
    #[serde(default)]
    pub clip_stages: ClipStageSettings,
}

impl ReduxSettings {
    pub fn tseep() -> Self {
        Self {
            name: "Old Bird Redux 1.1 Tseep".to_string(),
            filter_f0: 6000.0,
            filter_f1: 10000.0,
            filter_bw: 100.0,
            filter_duration: 100.0 / LEGACY_SAMPLE_RATE,
            integration_time: 2000.0 / LEGACY_SAMPLE_RATE,
            ratio_delay: 0.02,
            thresholds: vec![2.0],
            min_duration: 0.1,
            max_duration: 0.4,
            initial_padding: 3000.0 / LEGACY_SAMPLE_RATE,
            suppressor_count_threshold: 15,
            suppressor_period: 20.0,
            clip_stages: ClipStageSettings::default(),
        }
    }

    pub fn thrush() -> Self {
        Self {
            name: "Old Bird Redux 1.1 Thrush".to_string(),
            filter_f0: 2800.0,
            filter_f1: 5000.0,
            filter_bw: 100.0,
            filter_duration: 100.0 / LEGACY_SAMPLE_RATE,
            integration_time: 4000.0 / LEGACY_SAMPLE_RATE,
            ratio_delay: 0.02,
            thresholds: vec![1.3],
            min_duration: 0.1,
            max_duration: 0.4,
            initial_padding: 5000.0 / LEGACY_SAMPLE_RATE,
            suppressor_count_threshold: 10,
            suppressor_period: 20.0,
            clip_stages: ClipStageSettings::default(),
        }
    }

    pub fn preset(call_type: CallType) -> Self {
        match call_type {
            CallType::Tseep => Self::tseep(),
            CallType::Thrush => Self::thrush(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: Vec<f64>) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Check settings that do not depend on the sample rate
    pub fn validate(&self) -> Result<()> {
        validate_thresholds(&self.thresholds)?;
        require_positive("filter_f0", self.filter_f0)?;
        require_positive("filter_bw", self.filter_bw)?;
        if self.filter_f1 <= self.filter_f0 {
            return Err(DetectorError::Config(format!(
                "filter_f1 ({}) must exceed filter_f0 ({})",
                self.filter_f1, self.filter_f0
            )));
        }
        require_positive("filter_duration", self.filter_duration)?;
        require_positive("integration_time", self.integration_time)?;
        require_positive("ratio_delay", self.ratio_delay)?;
        require_positive("min_duration", self.min_duration)?;
        if !(self.max_duration >= self.min_duration) || !self.max_duration.is_finite() {
            return Err(DetectorError::Config(format!(
                "max_duration ({}) must be at least min_duration ({})",
                self.max_duration, self.min_duration
            )));
        }
        require_non_negative("initial_padding", self.initial_padding)?;
        if self.suppressor_count_threshold == 0 {
            return Err(DetectorError::Config(
                "suppressor_count_threshold must be positive".to_string(),
            ));
        }
        require_positive("suppressor_period", self.suppressor_period)?;
        if let Some(duration) = self.clip_stages.truncation_buffer_duration {
            require_positive("truncation_buffer_duration", duration)?;
        }
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(text).map_err(|e| DetectorError::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&read_settings_file(path.as_ref())?)
    }
}

fn default_pnf_name() -> String {
    "PNF Energy Detector 1.0".to_string()
}

/// Settings of a spectrogram energy (PNF) detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PnfSettings {
    #[serde(default = "default_pnf_name")]
    pub name: String,
    pub window_type: WindowType,
    /// Spectrogram window length (s)
    pub window_size: f64,
    /// Spectrogram hop, in percent of the window length
    pub hop_size: f64,
    /// Lower edge of the integrated band (Hz)
    pub start_frequency: f64,
    /// Upper edge of the integrated band (Hz)
    pub end_frequency: f64,
    /// End of the power filter passband (Hz)
    pub power_filter_passband_end_frequency: f64,
    /// Start of the power filter stopband (Hz)
    pub power_filter_stopband_start_frequency: f64,
    /// Power filter length (taps)
    pub power_filter_length: usize,
    /// Delay between the two powers of the ratio (s)
    pub delay: f64,
    pub thresholds: Vec<f64>,
    /// Lead-in before each detection (s)
    pub initial_clip_padding: f64,
    /// Fixed clip length (s)
    pub clip_duration: f64,
}

impl PnfSettings {
    pub fn tseep() -> Self {
        Self {
            name: "PNF Tseep Energy Detector 1.0".to_string(),
            window_type: WindowType::Hann,
            window_size: 0.005,
            hop_size: 50.0,
            start_frequency: 6000.0,
            end_frequency: 10000.0,
            power_filter_passband_end_frequency: 5.0,
            power_filter_stopband_start_frequency: 15.0,
            power_filter_length: 23,
            delay: 0.05,
            thresholds: vec![2.0],
            initial_clip_padding: 0.05,
            clip_duration: 0.3,
        }
    }

    pub fn thrush() -> Self {
        Self {
            name: "PNF Thrush Energy Detector 1.0".to_string(),
            start_frequency: 2800.0,
            end_frequency: 5000.0,
            clip_duration: 0.4,
            ..Self::tseep()
        }
    }

    /// Earlier Tseep tuning: wider band, slower power filter, higher threshold
    pub fn baseline_tseep() -> Self {
        Self {
            name: "PNF 2018 Baseline Tseep Detector 1.0".to_string(),
            start_frequency: 5000.0,
            end_frequency: 10000.0,
            power_filter_passband_end_frequency: 3.0,
            power_filter_stopband_start_frequency: 10.0,
            power_filter_length: 31,
            delay: 0.06,
            thresholds: vec![2.5],
            ..Self::tseep()
        }
    }

    pub fn baseline_thrush() -> Self {
        Self {
            name: "PNF 2018 Baseline Thrush Detector 1.0".to_string(),
            start_frequency: 2000.0,
            end_frequency: 5000.0,
            clip_duration: 0.4,
            ..Self::baseline_tseep()
        }
    }

    pub fn preset(call_type: CallType) -> Self {
        match call_type {
            CallType::Tseep => Self::tseep(),
            CallType::Thrush => Self::thrush(),
        }
    }

    pub fn baseline_preset(call_type: CallType) -> Self {
        match call_type {
            CallType::Tseep => Self::baseline_tseep(),
            CallType::Thrush => Self::baseline_thrush(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: Vec<f64>) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Check settings that do not depend on the sample rate
    pub fn validate(&self) -> Result<()> {
        validate_thresholds(&self.thresholds)?;
        require_positive("window_size", self.window_size)?;
        if !(self.hop_size > 0.0 && self.hop_size <= 100.0) {
            return Err(DetectorError::Config(format!(
                "hop_size must be in (0, 100] percent, got {}",
                self.hop_size
            )));
        }
        require_non_negative("start_frequency", self.start_frequency)?;
        if !(self.end_frequency > self.start_frequency) || !self.end_frequency.is_finite() {
            return Err(DetectorError::Config(format!(
                "end_frequency ({}) must exceed start_frequency ({})",
                self.end_frequency, self.start_frequency
            )));
        }
        require_positive(
            "power_filter_passband_end_frequency",
            self.power_filter_passband_end_frequency,
        )?;
        if !(self.power_filter_stopband_start_frequency
            > self.power_filter_passband_end_frequency)
        {
            return Err(DetectorError::Config(format!(
                "power filter stopband start ({}) must exceed passband end ({})",
                self.power_filter_stopband_start_frequency,
                self.power_filter_passband_end_frequency
            )));
        }
        if self.power_filter_length == 0 {
            return Err(DetectorError::Config(
                "power_filter_length must be positive".to_string(),
            ));
        }
        require_positive("delay", self.delay)?;
        require_non_negative("initial_clip_padding", self.initial_clip_padding)?;
        require_positive("clip_duration", self.clip_duration)?;
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(text).map_err(|e| DetectorError::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&read_settings_file(path.as_ref())?)
    }
}

/// Settings of any detector kind
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorSettings {
    Redux(ReduxSettings),
    Pnf(PnfSettings),
}

impl DetectorSettings {
    pub fn preset(kind: DetectorKind, call_type: CallType) -> Self {
        match kind {
            DetectorKind::Redux => DetectorSettings::Redux(ReduxSettings::preset(call_type)),
            DetectorKind::Pnf => DetectorSettings::Pnf(PnfSettings::preset(call_type)),
            DetectorKind::Baseline => {
                DetectorSettings::Pnf(PnfSettings::baseline_preset(call_type))
            }
        }
    }

    /// Load settings of the given kind from a TOML document
    pub fn from_toml_str(kind: DetectorKind, text: &str) -> Result<Self> {
        match kind {
            DetectorKind::Redux => ReduxSettings::from_toml_str(text).map(DetectorSettings::Redux),
            DetectorKind::Pnf | DetectorKind::Baseline => {
                PnfSettings::from_toml_str(text).map(DetectorSettings::Pnf)
            }
        }
    }

    pub fn from_toml_file(kind: DetectorKind, path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(kind, &read_settings_file(path.as_ref())?)
    }

    pub fn with_thresholds(self, thresholds: Vec<f64>) -> Self {
        match self {
            DetectorSettings::Redux(s) => DetectorSettings::Redux(s.with_thresholds(thresholds)),
            DetectorSettings::Pnf(s) => DetectorSettings::Pnf(s.with_thresholds(thresholds)),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DetectorSettings::Redux(s) => &s.name,
            DetectorSettings::Pnf(s) => &s.name,
        }
    }

    pub fn thresholds(&self) -> &[f64] {
        match self {
            DetectorSettings::Redux(s) => &s.thresholds,
            DetectorSettings::Pnf(s) => &s.thresholds,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            DetectorSettings::Redux(s) => s.validate(),
            DetectorSettings::Pnf(s) => s.validate(),
        }
    }
}

fn read_settings_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DetectorError::Settings(format!("{}: {}", path.display(), e)))
}

fn validate_thresholds(thresholds: &[f64]) -> Result<()> {
    if thresholds.is_empty() {
        return Err(DetectorError::Config(
            "at least one threshold is required".to_string(),
        ));
    }
    for &threshold in thresholds {
        if !(threshold > 1.0) || !threshold.is_finite() {
            return Err(DetectorError::Config(format!(
                "threshold {} must be a finite value greater than 1",
                threshold
            )));
        }
    }
    Ok(())
}

fn require_positive(field: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(DetectorError::Config(format!(
            "{} must be positive, got {}",
            field, value
        )))
    }
}

fn require_non_negative(field: &str, value: f64) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(DetectorError::Config(format!(
            "{} must not be negative, got {}",
            field, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for call_type in [CallType::Tseep, CallType::Thrush] {
            for kind in [DetectorKind::Redux, DetectorKind::Pnf, DetectorKind::Baseline] {
                let settings = DetectorSettings::preset(kind, call_type);
                assert!(settings.validate().is_ok(), "{} {}", kind, call_type);
                assert!(settings.name().contains(&call_type.to_string()));
            }
        }
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(ReduxSettings::tseep().name, "Old Bird Redux 1.1 Tseep");
        assert_eq!(PnfSettings::thrush().name, "PNF Thrush Energy Detector 1.0");
        assert_eq!(
            PnfSettings::baseline_tseep().name,
            "PNF 2018 Baseline Tseep Detector 1.0"
        );
    }

    #[test]
    fn test_with_thresholds() {
        let settings = DetectorSettings::preset(DetectorKind::Redux, CallType::Tseep)
            .with_thresholds(vec![2.0, 2.7, 5.0]);
        assert_eq!(settings.thresholds(), &[2.0, 2.7, 5.0]);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        for thresholds in [vec![], vec![1.0], vec![0.5], vec![2.0, f64::NAN]] {
            let settings = ReduxSettings::tseep().with_thresholds(thresholds);
            assert!(matches!(settings.validate(), Err(DetectorError::Config(_))));
        }
    }

    #[test]
    fn test_inverted_durations_rejected() {
        let mut settings = ReduxSettings::tseep();
        settings.min_duration = 0.5;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_inverted_band_rejected() {
        let mut settings = PnfSettings::tseep();
        settings.end_frequency = settings.start_frequency;
        assert!(settings.validate().is_err());

        let mut settings = PnfSettings::tseep();
        settings.hop_size = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_call_type_and_kind_from_str() {
        assert_eq!("Tseep".parse::<CallType>().unwrap(), CallType::Tseep);
        assert_eq!("thrush".parse::<CallType>().unwrap(), CallType::Thrush);
        assert!("warbler".parse::<CallType>().is_err());
        assert_eq!("PNF".parse::<DetectorKind>().unwrap(), DetectorKind::Pnf);
        assert_eq!("old-bird".parse::<DetectorKind>().unwrap(), DetectorKind::Redux);
        assert!("nope".parse::<DetectorKind>().is_err());
    }

    #[test]
    fn test_redux_from_toml() {
        let text = r#"
            name = "Custom Redux"
            filter_f0 = 6000.0
            filter_f1 = 10000.0
            filter_bw = 100.0
            filter_duration = 0.005
            integration_time = 0.09
            ratio_delay = 0.02
            ratio_thresholds = [2.0, 3.0]
            min_duration = 0.1
            max_duration = 0.4
            initial_padding = 0.136
            suppressor_count_threshold = 15
            suppressor_period = 20.0

            [clip_stages]
            merge = true
        "#;
        let settings = ReduxSettings::from_toml_str(text).unwrap();
        assert_eq!(settings.name, "Custom Redux");
        assert_eq!(settings.thresholds, vec![2.0, 3.0]);
        assert!(settings.clip_stages.merge);
        assert!(!settings.clip_stages.suppress);
        assert_eq!(settings.clip_stages.truncation_buffer_duration, None);
    }

    #[test]
    fn test_pnf_round_trips_through_toml() {
        let settings = PnfSettings::thrush();
        let text = toml::to_string(&settings).unwrap();
        assert!(text.contains("window_type = \"hann\""));
        let parsed = DetectorSettings::from_toml_str(DetectorKind::Pnf, &text).unwrap();
        assert_eq!(parsed, DetectorSettings::Pnf(settings));
    }

    #[test]
    fn test_toml_errors() {
        assert!(matches!(
            ReduxSettings::from_toml_str("filter_f0 = 'high'"),
            Err(DetectorError::Settings(_))
        ));

        let text = toml::to_string(&PnfSettings::tseep().with_thresholds(vec![0.5])).unwrap();
        assert!(matches!(
            PnfSettings::from_toml_str(&text),
            Err(DetectorError::Config(_))
        ));
    }

    #[test]
    fn test_missing_settings_file() {
        let result = DetectorSettings::from_toml_file(DetectorKind::Redux, "/nonexistent/x.toml");
        assert!(matches!(result, Err(DetectorError::Settings(_))));
    }
}
