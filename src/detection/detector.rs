use super::listener::ClipListener;
use super::pnf::PnfDetector;
use super::redux::ReduxDetector;
use crate::audio::Sample;
use crate::config::{CallType, DetectorKind, DetectorSettings};
use crate::error::Result;

/// Any detector, selected at run time
pub enum Detector<L> {
    Redux(ReduxDetector<L>),
    Pnf(PnfDetector<L>),
}

impl<L: ClipListener> Detector<L> {
    pub fn new(settings: DetectorSettings, sample_rate: f64, listener: L) -> Result<Self> {
        Ok(match settings {
            DetectorSettings::Redux(s) => {
                Detector::Redux(ReduxDetector::new(s, sample_rate, listener)?)
            }
            DetectorSettings::Pnf(s) => Detector::Pnf(PnfDetector::new(s, sample_rate, listener)?),
        })
    }

    /// Detector built from a named preset, optionally with other thresholds
    pub fn from_preset(
        kind: DetectorKind,
        call_type: CallType,
        thresholds: Option<Vec<f64>>,
        sample_rate: f64,
        listener: L,
    ) -> Result<Self> {
        let mut settings = DetectorSettings::preset(kind, call_type);
        if let Some(thresholds) = thresholds {
            settings = settings.with_thresholds(thresholds);
        }
        Self::new(settings, sample_rate, listener)
    }

    pub fn detect<S: Sample>(&mut self, samples: &[S]) -> Result<()> {
        match self {
            Detector::Redux(d) => d.detect(samples),
            Detector::Pnf(d) => d.detect(samples),
        }
    }

    pub fn complete_detection(&mut self) -> Result<()> {
        match self {
            Detector::Redux(d) => d.complete_detection(),
            Detector::Pnf(d) => d.complete_detection(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Detector::Redux(d) => d.name(),
            Detector::Pnf(d) => d.name(),
        }
    }

    pub fn latency(&self) -> usize {
        match self {
            Detector::Redux(d) => d.latency(),
            Detector::Pnf(d) => d.latency(),
        }
    }

    pub fn thresholds(&self) -> &[f64] {
        match self {
            Detector::Redux(d) => d.thresholds(),
            Detector::Pnf(d) => d.thresholds(),
        }
    }

    /// Whether clips carry a detector score
    pub fn is_scored(&self) -> bool {
        matches!(self, Detector::Pnf(_))
    }

    pub fn listener(&self) -> &L {
        match self {
            Detector::Redux(d) => d.listener(),
            Detector::Pnf(d) => d.listener(),
        }
    }

    pub fn into_listener(self) -> L {
        match self {
            Detector::Redux(d) => d.into_listener(),
            Detector::Pnf(d) => d.into_listener(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::ClipCollector;

    #[test]
    fn test_preset_names() {
        let cases = [
            (DetectorKind::Redux, CallType::Tseep, "Old Bird Redux 1.1 Tseep"),
            (DetectorKind::Redux, CallType::Thrush, "Old Bird Redux 1.1 Thrush"),
            (DetectorKind::Pnf, CallType::Tseep, "PNF Tseep Energy Detector 1.0"),
            (DetectorKind::Pnf, CallType::Thrush, "PNF Thrush Energy Detector 1.0"),
            (
                DetectorKind::Baseline,
                CallType::Tseep,
                "PNF 2018 Baseline Tseep Detector 1.0",
            ),
            (
                DetectorKind::Baseline,
                CallType::Thrush,
                "PNF 2018 Baseline Thrush Detector 1.0",
            ),
        ];
        for (kind, call_type, name) in cases {
            let detector =
                Detector::from_preset(kind, call_type, None, 24000.0, ClipCollector::new())
                    .unwrap();
            assert_eq!(detector.name(), name);
            assert_eq!(detector.is_scored(), kind != DetectorKind::Redux);
        }
    }

    #[test]
    fn test_threshold_override() {
        let detector = Detector::from_preset(
            DetectorKind::Pnf,
            CallType::Tseep,
            Some(vec![2.0, 3.0]),
            22050.0,
            ClipCollector::new(),
        )
        .unwrap();
        assert_eq!(detector.thresholds(), &[2.0, 3.0]);
    }

    #[test]
    fn test_invalid_threshold_override_rejected() {
        let result = Detector::from_preset(
            DetectorKind::Redux,
            CallType::Thrush,
            Some(vec![0.9]),
            22050.0,
            ClipCollector::new(),
        );
        assert!(result.is_err());
    }
}
