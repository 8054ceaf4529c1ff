mod csv;
mod json;
mod stats;
mod text;

use crate::detection::{Clip, ClipListener};
use crate::error::ListenerError;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::stats::{ClipLengthSummary, summarize_clip_lengths};
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// A clip as reported for one recording
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRecord {
    pub detector: String,
    /// Recording the clip was found in
    pub unit: String,
    pub sample_rate: f64,
    pub clip: Clip,
}

impl ClipRecord {
    pub fn start_seconds(&self) -> f64 {
        self.clip.start_index as f64 / self.sample_rate
    }

    pub fn duration_seconds(&self) -> f64 {
        self.clip.length as f64 / self.sample_rate
    }
}

pub trait Formatter: Send {
    fn format(&self, record: &ClipRecord) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

/// Formatter for the given output format
///
/// `scored` selects layouts with a detector score column.
pub fn create_formatter(format: OutputFormat, scored: bool, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter::new(scored)),
    }
}

/// Listener that records every clip of one recording
#[derive(Debug, Clone)]
pub struct RecordingListener {
    detector: String,
    unit: String,
    sample_rate: f64,
    records: Vec<ClipRecord>,
}

impl RecordingListener {
    pub fn new(detector: impl Into<String>, unit: impl Into<String>, sample_rate: f64) -> Self {
        Self {
            detector: detector.into(),
            unit: unit.into(),
            sample_rate,
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[ClipRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ClipRecord> {
        self.records
    }
}

impl ClipListener for RecordingListener {
    fn process_clip(&mut self, clip: &Clip) -> Result<(), ListenerError> {
        self.records.push(ClipRecord {
            detector: self.detector.clone(),
            unit: self.unit.clone(),
            sample_rate: self.sample_rate,
            clip: *clip,
        });
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn sample_record(score: Option<f64>) -> ClipRecord {
    ClipRecord {
        detector: "Old Bird Redux 1.1 Tseep".to_string(),
        unit: "night.wav".to_string(),
        sample_rate: 24000.0,
        clip: Clip {
            threshold: 2.0,
            start_index: 18000,
            length: 9600,
            score,
        },
    }
}
