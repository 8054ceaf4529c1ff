use super::Sample;

/// Input samples received but not yet consumed by a signal processor chain
///
/// New buffers are appended to whatever the previous `detect` call left
/// behind, so the chain always sees one contiguous run of samples. After
/// processing, the consumed prefix is dropped and only the unconsumed tail
/// (at most one chain record) is kept.
pub struct SampleTail {
    buffer: Vec<f64>,
}

impl SampleTail {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Append new samples after the retained tail
    pub fn push<S: Sample>(&mut self, data: &[S]) {
        self.buffer.reserve(data.len());
        self.buffer.extend(data.iter().map(|s| s.to_f64()));
    }

    /// Retained samples followed by everything pushed since, oldest first
    pub fn samples(&self) -> &[f64] {
        &self.buffer
    }

    /// Drop the oldest `count` samples
    pub fn consume(&mut self, count: usize) {
        let count = count.min(self.buffer.len());
        self.buffer.drain(0..count);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for SampleTail {
    fn default() -> Self {
        Self::new()
    }
}
