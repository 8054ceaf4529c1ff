//! Streaming detectors for nocturnal flight calls.
//!
//! Two detector families find transient sounds in long audio recordings:
//! the Old Bird redux detectors (bandpass power ratio with a transient
//! state machine) and the spectrogram band-energy (PNF) detectors. Both take
//! audio in buffers of any size and report clips to a `ClipListener`.
//!
//! ```no_run
//! use nfcdetect::config::ReduxSettings;
//! use nfcdetect::detection::{ClipCollector, ReduxDetector};
//!
//! let mut detector = ReduxDetector::new(ReduxSettings::tseep(), 24000.0, ClipCollector::new())?;
//! for buffer in [vec![0.0f32; 24000], vec![0.0f32; 24000]] {
//!     detector.detect(&buffer)?;
//! }
//! detector.complete_detection()?;
//! for clip in &detector.listener().clips {
//!     println!("{} {} {}", clip.threshold, clip.start_index, clip.length);
//! }
//! # Ok::<(), nfcdetect::DetectorError>(())
//! ```

pub mod audio;
pub mod config;
pub mod constants;
pub mod detection;
pub mod error;
pub mod output;
pub mod signal_processing;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::{CallType, DetectorKind, DetectorSettings, PnfSettings, ReduxSettings};
pub use detection::{Clip, ClipListener, Detector, PnfDetector, ReduxDetector};
pub use error::{DetectorError, Result};
pub use wav::save_wav;
