use rolling_stats::Stats;
use serde::Serialize;

use super::ClipRecord;

/// Clip length statistics for one threshold, in seconds
#[derive(Debug, Clone, Serialize)]
pub struct ClipLengthSummary {
    pub threshold: f64,
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Summarize clip lengths per threshold, in order of first appearance
pub fn summarize_clip_lengths(records: &[ClipRecord]) -> Vec<ClipLengthSummary> {
    let mut per_threshold: Vec<(f64, Stats<f64>)> = Vec::new();

    for record in records {
        let threshold = record.clip.threshold;
        let index = match per_threshold.iter().position(|(t, _)| *t == threshold) {
            Some(index) => index,
            None => {
                per_threshold.push((threshold, Stats::new()));
                per_threshold.len() - 1
            }
        };
        per_threshold[index].1.update(record.duration_seconds());
    }

    per_threshold
        .into_iter()
        .map(|(threshold, stats)| ClipLengthSummary {
            threshold,
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
        .collect()
}
