pub mod chain;
pub mod crossing;
pub mod divider;
pub mod fir;
pub mod firls;
pub mod integrator;
pub mod math;
pub mod power;
pub mod spectrograph;
pub mod stage;

pub use chain::SignalProcessorChain;
pub use crossing::{Crossing, Edge, ScoredRise, ScoredRiseDetector, ThresholdCrossingDetector};
pub use divider::Divider;
pub use fir::FirFilter;
pub use firls::{bandpass_taps, firls, lowpass_taps};
pub use integrator::Integrator;
pub use math::{seconds_to_samples, seconds_to_samples_truncated};
pub use power::Squarer;
pub use spectrograph::{FrequencyIntegrator, Spectrograph, WindowType};
pub use stage::SignalStage;
