use super::{ClipRecord, Formatter};

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, record: &ClipRecord) -> String {
        let clip = &record.clip;
        let score = clip
            .score
            .map_or(String::new(), |s| format!(" score: {:.2}", s));
        if self.verbose {
            format!(
                "{} [{} @ {}]: start {:>10} ({:>9.3} s) length {:>6} ({:.3} s){}",
                record.unit,
                record.detector,
                clip.threshold,
                clip.start_index,
                record.start_seconds(),
                clip.length,
                record.duration_seconds(),
                score
            )
        } else {
            format!(
                "{}: {:>9.3} s  {:.3} s  threshold {}{}",
                record.unit,
                record.start_seconds(),
                record.duration_seconds(),
                clip.threshold,
                score
            )
        }
    }
}
