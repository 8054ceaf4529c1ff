//! Numeric constants shared by the detection pipeline
//!
//! Several of these reproduce constants of the legacy detectors exactly;
//! changing them changes which threshold crossings are found.

/// Substitute for exact-zero denominators in the ratio stage.
pub const RATIO_DENOMINATOR_EPSILON: f64 = 1e-20;

/// Correction added to every crossing index so that detection indices line
/// up with the legacy detector's.
pub const CROSSING_INDEX_CORRECTION: usize = 1;

/// Sample rate the legacy detector settings were tuned at.
pub const LEGACY_SAMPLE_RATE: f64 = 22050.0;

/// Smallest diagonal pivot accepted by the least-squares solver.
pub const MIN_CHOLESKY_PIVOT: f64 = 1e-300;
