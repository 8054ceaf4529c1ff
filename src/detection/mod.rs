//! Transient detection: detector facades, the transient state machine,
//! clip post-processing and clip listeners.

pub mod clips;
pub mod detector;
pub mod listener;
pub mod pnf;
pub mod redux;
pub mod transient;

pub use clips::{ClipPostProcessor, ClipProcessor, ClipSpan, Clipper};
pub use detector::Detector;
pub use listener::{Clip, ClipCollector, ClipListener, DETECTOR_SCORE_ANNOTATION};
pub use pnf::PnfDetector;
pub use redux::{ReduxDetector, ReduxLengths};
pub use transient::{Transient, TransientFinder};
