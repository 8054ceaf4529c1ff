use crate::error::ListenerError;

/// Annotation name under which scored detectors report each clip's score
pub const DETECTOR_SCORE_ANNOTATION: &str = "Detector Score";

/// A detected clip, in input sample indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clip {
    /// Threshold whose pipeline produced the clip
    pub threshold: f64,
    pub start_index: usize,
    pub length: usize,
    /// Detector score, for detectors that score their detections
    pub score: Option<f64>,
}

impl Clip {
    /// Named annotations attached to the clip
    pub fn annotations(&self) -> Vec<(&'static str, f64)> {
        self.score
            .map(|score| (DETECTOR_SCORE_ANNOTATION, score))
            .into_iter()
            .collect()
    }

    /// Index one past the last sample of the clip
    pub fn end_index(&self) -> usize {
        self.start_index + self.length
    }
}

/// Receiver of detected clips
///
/// Clips of one threshold arrive with non-decreasing start indices. An error
/// returned by the listener stops the current `detect` or
/// `complete_detection` call and is returned from it.
pub trait ClipListener {
    fn process_clip(&mut self, clip: &Clip) -> Result<(), ListenerError>;

    /// Called once per threshold when detection completes
    fn complete_processing(&mut self, _threshold: f64) -> Result<(), ListenerError> {
        Ok(())
    }
}

impl<T: ClipListener + ?Sized> ClipListener for &mut T {
    fn process_clip(&mut self, clip: &Clip) -> Result<(), ListenerError> {
        (**self).process_clip(clip)
    }

    fn complete_processing(&mut self, threshold: f64) -> Result<(), ListenerError> {
        (**self).complete_processing(threshold)
    }
}

/// Listener that keeps every clip in memory
#[derive(Debug, Default)]
pub struct ClipCollector {
    pub clips: Vec<Clip>,
    /// Thresholds whose processing has completed, in completion order
    pub completed: Vec<f64>,
}

impl ClipCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clips of one threshold, in arrival order
    pub fn clips_for(&self, threshold: f64) -> Vec<Clip> {
        self.clips
            .iter()
            .filter(|clip| clip.threshold == threshold)
            .copied()
            .collect()
    }
}

impl ClipListener for ClipCollector {
    fn process_clip(&mut self, clip: &Clip) -> Result<(), ListenerError> {
        self.clips.push(*clip);
        Ok(())
    }

    fn complete_processing(&mut self, threshold: f64) -> Result<(), ListenerError> {
        self.completed.push(threshold);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotations() {
        let mut clip = Clip {
            threshold: 2.0,
            start_index: 10,
            length: 5,
            score: None,
        };
        assert!(clip.annotations().is_empty());
        assert_eq!(clip.end_index(), 15);

        clip.score = Some(3.5);
        assert_eq!(clip.annotations(), vec![(DETECTOR_SCORE_ANNOTATION, 3.5)]);
    }

    #[test]
    fn test_collector_through_mutable_reference() {
        fn deliver<L: ClipListener>(mut listener: L) {
            let clip = Clip {
                threshold: 2.0,
                start_index: 0,
                length: 1,
                score: None,
            };
            listener.process_clip(&clip).unwrap();
            listener.complete_processing(2.0).unwrap();
        }

        let mut collector = ClipCollector::new();
        deliver(&mut collector);
        assert_eq!(collector.clips.len(), 1);
        assert_eq!(collector.completed, vec![2.0]);
        assert_eq!(collector.clips_for(2.0).len(), 1);
        assert!(collector.clips_for(3.0).is_empty());
    }
}
