/// Direction of a threshold crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Ratio rose above the threshold
    Rise,
    /// Ratio fell below the inverse threshold
    Fall,
}

/// A threshold crossing at an input sample index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub index: usize,
    pub edge: Edge,
}

impl Crossing {
    pub fn rise(index: usize) -> Self {
        Self {
            index,
            edge: Edge::Rise,
        }
    }

    pub fn fall(index: usize) -> Self {
        Self {
            index,
            edge: Edge::Fall,
        }
    }
}

/// Streaming detector of ratio threshold crossings
///
/// For consecutive ratio samples `(x0, x1)`, reports a rise when
/// `x0 <= threshold < x1` and a fall when `x0 >= 1 / threshold > x1`. The
/// last ratio of each call is kept so that pairs spanning call boundaries
/// are examined too.
///
/// Crossing indices are the index of `x0` in the whole ratio stream plus a
/// fixed `index_offset`, which callers use to map ratio indices back to
/// input sample indices.
pub struct ThresholdCrossingDetector {
    threshold: f64,
    inverse_threshold: f64,
    index_offset: usize,
    previous: Option<f64>,
    next_index: usize,
}

impl ThresholdCrossingDetector {
    /// Create a crossing detector
    ///
    /// # Arguments
    /// * `threshold` - Rise threshold, greater than one
    /// * `index_offset` - Added to every reported crossing index
    pub fn new(threshold: f64, index_offset: usize) -> Self {
        Self {
            threshold,
            inverse_threshold: 1.0 / threshold,
            index_offset,
            previous: None,
            next_index: 0,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Find the crossings completed by the next run of ratios
    ///
    /// Returned crossings are sorted by index. A threshold above one cannot
    /// produce a rise and a fall from the same pair.
    pub fn process(&mut self, ratios: &[f64]) -> Vec<Crossing> {
        let mut crossings = Vec::new();
        if ratios.is_empty() {
            return crossings;
        }

        // Global index of the first ratio in this call.
        let first_index = self.next_index;

        let mut push = |x0: f64, x1: f64, x0_index: usize| {
            let index = x0_index + self.index_offset;
            if x0 <= self.threshold && x1 > self.threshold {
                crossings.push(Crossing::rise(index));
            } else if x0 >= self.inverse_threshold && x1 < self.inverse_threshold {
                crossings.push(Crossing::fall(index));
            }
        };

        if let Some(previous) = self.previous {
            push(previous, ratios[0], first_index - 1);
        }
        for (i, pair) in ratios.windows(2).enumerate() {
            push(pair[0], pair[1], first_index + i);
        }

        self.previous = ratios.last().copied();
        self.next_index += ratios.len();
        crossings
    }
}

/// A rise above threshold scored by the peak ratio of its excursion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredRise {
    /// Index, in the ratio stream, of the first ratio above threshold
    pub ratio_index: usize,
    /// Largest ratio reached before falling back to the threshold
    pub score: f64,
}

/// Streaming detector of scored threshold rises
///
/// A rise is reported once the ratio falls back to or below the threshold,
/// scored with the peak ratio of the excursion. An excursion still open
/// when the stream ends is reported by `finish`.
pub struct ScoredRiseDetector {
    threshold: f64,
    previous: Option<f64>,
    next_index: usize,
    open: Option<ScoredRise>,
}

impl ScoredRiseDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            previous: None,
            next_index: 0,
            open: None,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Consume the next run of ratios, returning the rises they complete
    pub fn process(&mut self, ratios: &[f64]) -> Vec<ScoredRise> {
        let mut rises = Vec::new();

        for &x in ratios {
            let index = self.next_index;
            self.next_index += 1;

            match self.open.as_mut() {
                Some(rise) if x > self.threshold => {
                    if x > rise.score {
                        rise.score = x;
                    }
                }
                Some(_) => {
                    rises.extend(self.open.take());
                }
                None => {
                    let was_below = self.previous.is_some_and(|p| p <= self.threshold);
                    if was_below && x > self.threshold {
                        self.open = Some(ScoredRise {
                            ratio_index: index,
                            score: x,
                        });
                    }
                }
            }

            self.previous = Some(x);
        }

        rises
    }

    /// Report the excursion still above threshold, if any
    pub fn finish(&mut self) -> Option<ScoredRise> {
        self.open.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rise_and_fall() {
        let mut detector = ThresholdCrossingDetector::new(2.0, 0);
        let ratios = [1.0, 2.0, 3.0, 1.0, 0.4, 0.6];
        let crossings = detector.process(&ratios);
        assert_eq!(crossings, vec![Crossing::rise(1), Crossing::fall(3)]);
    }

    #[test]
    fn test_boundary_values() {
        let mut detector = ThresholdCrossingDetector::new(2.0, 0);
        // Reaching the threshold exactly is not a rise; reaching the inverse
        // threshold exactly is not a fall.
        assert!(detector.process(&[1.0, 2.0, 1.0, 0.5]).is_empty());

        let mut detector = ThresholdCrossingDetector::new(2.0, 0);
        // x0 == 1/t and x1 below is a fall.
        assert_eq!(detector.process(&[0.5, 0.25]), vec![Crossing::fall(0)]);
    }

    #[test]
    fn test_index_offset() {
        let mut detector = ThresholdCrossingDetector::new(2.0, 100);
        let crossings = detector.process(&[1.0, 3.0]);
        assert_eq!(crossings, vec![Crossing::rise(100)]);
    }

    #[test]
    fn test_crossing_across_calls() {
        let mut whole = ThresholdCrossingDetector::new(2.0, 7);
        let ratios = [1.0, 1.5, 2.5, 2.5, 1.0, 0.3, 0.2, 3.0];
        let expected = whole.process(&ratios);

        for split in 1..ratios.len() {
            let mut chunked = ThresholdCrossingDetector::new(2.0, 7);
            let mut crossings = chunked.process(&ratios[..split]);
            crossings.extend(chunked.process(&ratios[split..]));
            assert_eq!(crossings, expected, "split at {}", split);
        }

        let mut single = ThresholdCrossingDetector::new(2.0, 7);
        let crossings: Vec<Crossing> = ratios.iter().flat_map(|&r| single.process(&[r])).collect();
        assert_eq!(crossings, expected);
    }

    #[test]
    fn test_empty_input_keeps_state() {
        let mut detector = ThresholdCrossingDetector::new(2.0, 0);
        assert!(detector.process(&[1.0]).is_empty());
        assert!(detector.process(&[]).is_empty());
        assert_eq!(detector.process(&[5.0]), vec![Crossing::rise(0)]);
    }

    #[test]
    fn test_scored_rise_peak() {
        let mut detector = ScoredRiseDetector::new(2.0);
        let rises = detector.process(&[1.0, 2.5, 4.0, 3.0, 2.0, 1.0]);
        assert_eq!(
            rises,
            vec![ScoredRise {
                ratio_index: 1,
                score: 4.0
            }]
        );
        assert!(detector.finish().is_none());
    }

    #[test]
    fn test_scored_rise_requires_prior_sample_below() {
        let mut detector = ScoredRiseDetector::new(2.0);
        // The first ratio has no predecessor, so it cannot start a rise.
        assert!(detector.process(&[3.0, 1.0]).is_empty());
        assert!(detector.finish().is_none());
    }

    #[test]
    fn test_scored_rise_spanning_calls() {
        let mut detector = ScoredRiseDetector::new(2.0);
        assert!(detector.process(&[1.0, 3.0]).is_empty());
        assert!(detector.process(&[5.0, 4.0]).is_empty());
        let rises = detector.process(&[1.5, 1.0, 6.0]);
        assert_eq!(
            rises,
            vec![ScoredRise {
                ratio_index: 1,
                score: 5.0
            }]
        );
        assert_eq!(
            detector.finish(),
            Some(ScoredRise {
                ratio_index: 6,
                score: 6.0
            })
        );
        assert!(detector.finish().is_none());
    }
}
