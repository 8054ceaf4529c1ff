//! Clip post-processing.
//!
//! Transients become clips by passing through a chain of clip processors.
//! The redux detector always extends each transient by an initial padding
//! and shifts it back again at the end of the chain; between the two, legacy
//! merge, suppress and truncate stages may run. Spans may temporarily start
//! before the stream (negative start) while inside the chain.

use std::collections::VecDeque;

use super::transient::Transient;

/// Clip span in input sample indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipSpan {
    pub start: i64,
    pub length: i64,
}

impl ClipSpan {
    pub fn new(start: i64, length: i64) -> Self {
        Self { start, length }
    }

    pub fn end(&self) -> i64 {
        self.start + self.length
    }
}

impl From<Transient> for ClipSpan {
    fn from(transient: Transient) -> Self {
        Self::new(transient.start as i64, transient.length as i64)
    }
}

/// One stage of clip post-processing
///
/// Spans arrive with non-decreasing starts. A stage may hold spans back
/// until later spans (or `complete`) show what to do with them.
pub trait ClipProcessor: Send {
    fn process(&mut self, spans: Vec<ClipSpan>) -> Vec<ClipSpan>;

    /// Release any spans still held at the end of the stream
    fn complete(&mut self) -> Vec<ClipSpan> {
        Vec::new()
    }
}

/// Moves each start earlier by `padding`, keeping the end
pub struct ClipExtender {
    padding: i64,
}

impl ClipExtender {
    pub fn new(padding: usize) -> Self {
        Self {
            padding: padding as i64,
        }
    }
}

impl ClipProcessor for ClipExtender {
    fn process(&mut self, spans: Vec<ClipSpan>) -> Vec<ClipSpan> {
        spans
            .into_iter()
            .map(|s| ClipSpan::new(s.start - self.padding, s.length + self.padding))
            .collect()
    }
}

/// Moves each start later by `padding`, keeping the end, and clamps starts
/// to the beginning of the stream
///
/// Spans left empty are dropped.
pub struct ClipShifter {
    padding: i64,
}

impl ClipShifter {
    pub fn new(padding: usize) -> Self {
        Self {
            padding: padding as i64,
        }
    }
}

impl ClipProcessor for ClipShifter {
    fn process(&mut self, spans: Vec<ClipSpan>) -> Vec<ClipSpan> {
        spans
            .into_iter()
            .filter_map(|s| {
                let end = s.end();
                let start = (s.start + self.padding).max(0);
                (end > start).then(|| ClipSpan::new(start, end - start))
            })
            .collect()
    }
}

/// Merges overlapping or adjacent spans
pub struct ClipMerger {
    pending: Option<ClipSpan>,
}

impl ClipMerger {
    pub fn new() -> Self {
        Self { pending: None }
    }
}

impl Default for ClipMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipProcessor for ClipMerger {
    fn process(&mut self, spans: Vec<ClipSpan>) -> Vec<ClipSpan> {
        let mut merged = Vec::new();
        for span in spans {
            match self.pending.as_mut() {
                Some(pending) if span.start <= pending.end() => {
                    let end = pending.end().max(span.end());
                    pending.length = end - pending.start;
                }
                _ => merged.extend(self.pending.replace(span)),
            }
        }
        merged
    }

    fn complete(&mut self) -> Vec<ClipSpan> {
        self.pending.take().into_iter().collect()
    }
}

/// Drops spans that arrive in bursts
///
/// A span is dropped when, counting itself, at least `count_threshold` spans
/// started within the last `period` samples.
pub struct ClipSuppressor {
    count_threshold: usize,
    period: i64,
    recent_starts: VecDeque<i64>,
}

impl ClipSuppressor {
    pub fn new(count_threshold: usize, period: usize) -> Self {
        Self {
            count_threshold,
            period: period as i64,
            recent_starts: VecDeque::new(),
        }
    }
}

impl ClipProcessor for ClipSuppressor {
    fn process(&mut self, spans: Vec<ClipSpan>) -> Vec<ClipSpan> {
        let mut kept = Vec::with_capacity(spans.len());
        for span in spans {
            while self
                .recent_starts
                .front()
                .is_some_and(|&start| start <= span.start - self.period)
            {
                self.recent_starts.pop_front();
            }
            self.recent_starts.push_back(span.start);

            if self.recent_starts.len() >= self.count_threshold {
                log::trace!("Suppressing clip at {}", span.start);
            } else {
                kept.push(span);
            }
        }
        kept
    }
}

/// Truncates each span to the end of the `buffer_size`-aligned window its
/// start falls in
pub struct ClipTruncator {
    buffer_size: i64,
}

impl ClipTruncator {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1) as i64,
        }
    }
}

impl ClipProcessor for ClipTruncator {
    fn process(&mut self, spans: Vec<ClipSpan>) -> Vec<ClipSpan> {
        spans
            .into_iter()
            .map(|s| {
                let window_end = (s.start.div_euclid(self.buffer_size) + 1) * self.buffer_size;
                ClipSpan::new(s.start, s.end().min(window_end) - s.start)
            })
            .collect()
    }
}

/// Ordered chain of clip processors
pub struct ClipPostProcessor {
    stages: Vec<Box<dyn ClipProcessor>>,
}

impl ClipPostProcessor {
    pub fn new(stages: Vec<Box<dyn ClipProcessor>>) -> Self {
        Self { stages }
    }

    pub fn process(&mut self, spans: Vec<ClipSpan>) -> Vec<ClipSpan> {
        self.stages
            .iter_mut()
            .fold(spans, |spans, stage| stage.process(spans))
    }

    /// Process the final spans and flush every stage, in order
    ///
    /// Spans released by one stage's completion still pass through the
    /// stages after it.
    pub fn complete(&mut self, spans: Vec<ClipSpan>) -> Vec<ClipSpan> {
        self.stages.iter_mut().fold(spans, |spans, stage| {
            let mut out = stage.process(spans);
            out.extend(stage.complete());
            out
        })
    }
}

/// Converts a scored detection time into a fixed-length clip
#[derive(Debug, Clone, Copy)]
pub struct Clipper {
    initial_padding: usize,
    clip_length: usize,
}

impl Clipper {
    pub fn new(initial_padding: usize, clip_length: usize) -> Self {
        Self {
            initial_padding,
            clip_length,
        }
    }

    /// Start index and length of the clip for a detection at `time`
    pub fn clip(&self, time: usize) -> (usize, usize) {
        (time.saturating_sub(self.initial_padding), self.clip_length)
    }
}
