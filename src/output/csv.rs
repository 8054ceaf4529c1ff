use super::{ClipRecord, Formatter};

pub struct CsvFormatter {
    scored: bool,
}

impl CsvFormatter {
    pub fn new(scored: bool) -> Self {
        Self { scored }
    }
}

/// Quote a field if it contains a delimiter, quote or line break
fn field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

impl Formatter for CsvFormatter {
    fn format(&self, record: &ClipRecord) -> String {
        let clip = &record.clip;
        let mut line = format!(
            "{},{},{},{},{}",
            field(&record.detector),
            field(&record.unit),
            clip.threshold,
            clip.start_index,
            clip.length
        );
        if self.scored {
            line.push(',');
            if let Some(score) = clip.score {
                line.push_str(&format!("{:.6}", score));
            }
        }
        line
    }

    fn header(&self) -> Option<&'static str> {
        if self.scored {
            Some("Detector,Unit,Threshold,Start Index,Length,Detector Score")
        } else {
            Some("Detector,Unit,Threshold,Start Index,Length")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::sample_record;

    #[test]
    fn test_unscored_row() {
        let formatter = CsvFormatter::new(false);
        assert_eq!(
            formatter.format(&sample_record(None)),
            "Old Bird Redux 1.1 Tseep,night.wav,2,18000,9600"
        );
        assert_eq!(
            formatter.header(),
            Some("Detector,Unit,Threshold,Start Index,Length")
        );
    }

    #[test]
    fn test_scored_row() {
        let formatter = CsvFormatter::new(true);
        let line = formatter.format(&sample_record(Some(3.25)));
        assert!(line.ends_with(",3.250000"));
        assert!(formatter.header().unwrap().ends_with("Detector Score"));
    }

    #[test]
    fn test_unit_with_comma_is_quoted() {
        let mut record = sample_record(None);
        record.unit = "a,b.wav".to_string();
        let line = CsvFormatter::new(false).format(&record);
        assert!(line.contains("\"a,b.wav\""));
    }
}
