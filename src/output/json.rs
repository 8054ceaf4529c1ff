use super::{ClipRecord, Formatter};

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, record: &ClipRecord) -> String {
        let clip = &record.clip;
        serde_json::json!({
            "detector": record.detector,
            "unit": record.unit,
            "threshold": clip.threshold,
            "start_index": clip.start_index,
            "length": clip.length,
            "start_seconds": record.start_seconds(),
            "score": clip.score,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::sample_record;

    #[test]
    fn test_json_fields() {
        let line = JsonFormatter.format(&sample_record(Some(4.0)));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["unit"], "night.wav");
        assert_eq!(value["start_index"], 18000);
        assert_eq!(value["length"], 9600);
        assert_eq!(value["score"], 4.0);

        let line = JsonFormatter.format(&sample_record(None));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert!(value["score"].is_null());
    }
}
