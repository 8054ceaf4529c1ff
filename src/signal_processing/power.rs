use super::SignalStage;

/// Instantaneous power: squares every sample
pub struct Squarer;

impl SignalStage for Squarer {
    fn name(&self) -> &'static str {
        "Squarer"
    }

    fn record_size(&self) -> usize {
        1
    }

    fn process(&mut self, input: &[f64]) -> Vec<f64> {
        input.iter().map(|x| x * x).collect()
    }
}
