//! Least-squares linear-phase FIR design.
//!
//! Produces the same filters as the classic `firls` routine, for both odd
//! (type I) and even (type II) filter lengths. The amplitude response of a
//! symmetric filter of length `N` is a cosine series
//!
//! ```text
//! A(f) = sum_i a_i cos(2 pi m_i f),   m_i = i (N odd) or i + 1/2 (N even)
//! ```
//!
//! Minimizing the weighted squared error against a piecewise-linear desired
//! response over the bands gives normal equations `G a = b`, where `G` is the
//! sum of a Toeplitz matrix (in `m_i - m_j`) and a Hankel matrix (in
//! `m_i + m_j`). `G` is symmetric positive definite and is solved by Cholesky
//! decomposition; the impulse response is the half-length solution mirrored
//! about the filter center.

use super::math::sinc;
use crate::constants::MIN_CHOLESKY_PIVOT;
use crate::error::{DetectorError, Result};
use std::f64::consts::PI;

/// Design a least-squares linear-phase FIR filter
///
/// # Arguments
/// * `num_taps` - Filter length, odd or even
/// * `bands` - Band edge pairs, normalized so that 1.0 is the Nyquist
///   frequency; must be non-decreasing and within `[0, 1]`
/// * `desired` - Desired amplitude at each band edge
/// * `weights` - Optional weight per band (defaults to 1.0)
///
/// # Errors
/// Returns `DetectorError::FilterDesign` if the arguments are inconsistent or
/// the normal equations are not positive definite
pub fn firls(
    num_taps: usize,
    bands: &[f64],
    desired: &[f64],
    weights: Option<&[f64]>,
) -> Result<Vec<f64>> {
    validate(num_taps, bands, desired, weights)?;

    // Work in cycles per sample, so the Nyquist frequency is 0.5.
    let edges: Vec<f64> = bands.iter().map(|f| f / 2.0).collect();
    let num_bands = edges.len() / 2;
    let band_weight = |band: usize| weights.map_or(1.0, |w| w[band]);

    let odd = num_taps % 2 == 1;
    let num_coeffs = num_taps.div_ceil(2);
    let m: Vec<f64> = (0..num_coeffs)
        .map(|i| if odd { i as f64 } else { i as f64 + 0.5 })
        .collect();

    let mut gram = vec![0.0; num_coeffs * num_coeffs];
    let mut rhs = vec![0.0; num_coeffs];

    for band in 0..num_bands {
        let f1 = edges[2 * band];
        let f2 = edges[2 * band + 1];
        let d1 = desired[2 * band];
        let d2 = desired[2 * band + 1];
        let w = band_weight(band);

        let slope = (d2 - d1) / (f2 - f1);
        let intercept = d1 - slope * f1;

        for (i, &k) in m.iter().enumerate() {
            rhs[i] += w * desired_projection(k, f1, f2, slope, intercept);
        }

        for (i, &mi) in m.iter().enumerate() {
            for (j, &mj) in m.iter().enumerate().skip(i) {
                let sum = mi + mj;
                let diff = mi - mj;
                let q = 0.5 * f2 * (sinc(2.0 * sum * f2) + sinc(2.0 * diff * f2))
                    - 0.5 * f1 * (sinc(2.0 * sum * f1) + sinc(2.0 * diff * f1));
                gram[i * num_coeffs + j] += w * q;
                if i != j {
                    gram[j * num_coeffs + i] += w * q;
                }
            }
        }
    }

    let a = solve_positive_definite(gram, rhs, num_coeffs)?;

    let taps = if odd {
        let half = num_coeffs - 1;
        let mut taps = Vec::with_capacity(num_taps);
        taps.extend(a[1..].iter().rev().map(|c| c / 2.0));
        taps.push(a[0]);
        taps.extend(a[1..].iter().map(|c| c / 2.0));
        debug_assert_eq!(taps.len(), 2 * half + 1);
        taps
    } else {
        let mut taps = Vec::with_capacity(num_taps);
        taps.extend(a.iter().rev().map(|c| c / 2.0));
        taps.extend(a.iter().map(|c| c / 2.0));
        taps
    };

    Ok(taps)
}

/// Integral of the linear desired response `slope * f + intercept` against
/// `cos(2 pi k f)` over `[f1, f2]`
fn desired_projection(k: f64, f1: f64, f2: f64, slope: f64, intercept: f64) -> f64 {
    if k == 0.0 {
        return intercept * (f2 - f1) + slope / 2.0 * (f2 * f2 - f1 * f1);
    }
    let cosine_term =
        slope / (4.0 * PI * PI) * ((2.0 * PI * k * f2).cos() - (2.0 * PI * k * f1).cos()) / (k * k);
    let sinc_term = f2 * (slope * f2 + intercept) * sinc(2.0 * k * f2)
        - f1 * (slope * f1 + intercept) * sinc(2.0 * k * f1);
    cosine_term + sinc_term
}

fn validate(
    num_taps: usize,
    bands: &[f64],
    desired: &[f64],
    weights: Option<&[f64]>,
) -> Result<()> {
    if num_taps == 0 {
        return Err(DetectorError::FilterDesign(
            "number of taps must be positive".to_string(),
        ));
    }
    if bands.is_empty() || bands.len() % 2 != 0 {
        return Err(DetectorError::FilterDesign(format!(
            "band edges must come in pairs, got {}",
            bands.len()
        )));
    }
    if desired.len() != bands.len() {
        return Err(DetectorError::FilterDesign(format!(
            "{} desired values for {} band edges",
            desired.len(),
            bands.len()
        )));
    }
    if bands.iter().any(|f| !(0.0..=1.0).contains(f)) {
        return Err(DetectorError::FilterDesign(format!(
            "band edges must lie in [0, 1]: {:?}",
            bands
        )));
    }
    if bands.windows(2).any(|pair| pair[1] < pair[0]) {
        return Err(DetectorError::FilterDesign(format!(
            "band edges must be non-decreasing: {:?}",
            bands
        )));
    }
    if bands.chunks_exact(2).any(|band| band[1] <= band[0]) {
        return Err(DetectorError::FilterDesign(format!(
            "every band must have positive width: {:?}",
            bands
        )));
    }
    if let Some(weights) = weights {
        if weights.len() != bands.len() / 2 {
            return Err(DetectorError::FilterDesign(format!(
                "{} weights for {} bands",
                weights.len(),
                bands.len() / 2
            )));
        }
        if weights.iter().any(|&w| !(w > 0.0)) {
            return Err(DetectorError::FilterDesign(
                "band weights must be positive".to_string(),
            ));
        }
    }
    Ok(())
}

/// Solve `matrix * x = rhs` for a symmetric positive definite `matrix`
/// (row-major, `n` x `n`) by Cholesky decomposition
fn solve_positive_definite(matrix: Vec<f64>, rhs: Vec<f64>, n: usize) -> Result<Vec<f64>> {
    // Lower-triangular factor, row-major.
    let mut lower = vec![0.0; n * n];

    for j in 0..n {
        let row_j = &lower[j * n..j * n + j];
        let pivot = matrix[j * n + j] - row_j.iter().map(|v| v * v).sum::<f64>();
        if !(pivot > MIN_CHOLESKY_PIVOT) || !pivot.is_finite() {
            return Err(DetectorError::FilterDesign(format!(
                "least-squares system is not positive definite (pivot {} = {:e})",
                j, pivot
            )));
        }
        let diagonal = pivot.sqrt();
        lower[j * n + j] = diagonal;

        for i in (j + 1)..n {
            let dot: f64 = (0..j).map(|k| lower[i * n + k] * lower[j * n + k]).sum();
            lower[i * n + j] = (matrix[i * n + j] - dot) / diagonal;
        }
    }

    // Forward substitution: L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let dot: f64 = (0..i).map(|k| lower[i * n + k] * y[k]).sum();
        y[i] = (rhs[i] - dot) / lower[i * n + i];
    }

    // Back substitution: L^T x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let dot: f64 = ((i + 1)..n).map(|k| lower[k * n + i] * x[k]).sum();
        x[i] = (y[i] - dot) / lower[i * n + i];
    }

    Ok(x)
}

/// Design a least-squares bandpass filter
///
/// The passband is `[f0, f1]` Hz with transition bands `bw` Hz wide on
/// either side.
///
/// # Errors
/// Returns `DetectorError::FilterDesign` if the band does not fit between
/// DC and the Nyquist frequency
pub fn bandpass_taps(
    num_taps: usize,
    f0: f64,
    f1: f64,
    bw: f64,
    sample_rate: f64,
) -> Result<Vec<f64>> {
    let nyquist = sample_rate / 2.0;
    if !(bw > 0.0) || f0 - bw <= 0.0 || f1 <= f0 || f1 + bw >= nyquist {
        return Err(DetectorError::FilterDesign(format!(
            "Invalid bandpass: f0={}, f1={}, bw={}, sample_rate={}",
            f0, f1, bw, sample_rate
        )));
    }
    let bands = [
        0.0,
        (f0 - bw) / nyquist,
        f0 / nyquist,
        f1 / nyquist,
        (f1 + bw) / nyquist,
        1.0,
    ];
    let desired = [0.0, 0.0, 1.0, 1.0, 0.0, 0.0];
    firls(num_taps, &bands, &desired, None)
}

/// Design a least-squares lowpass filter
///
/// # Errors
/// Returns `DetectorError::FilterDesign` if the transition band does not fit
/// between DC and the Nyquist frequency
pub fn lowpass_taps(
    num_taps: usize,
    passband_end: f64,
    stopband_start: f64,
    sample_rate: f64,
) -> Result<Vec<f64>> {
    let nyquist = sample_rate / 2.0;
    if !(passband_end > 0.0) || stopband_start <= passband_end || stopband_start >= nyquist {
        return Err(DetectorError::FilterDesign(format!(
            "Invalid lowpass: passband end={}, stopband start={}, sample_rate={}",
            passband_end, stopband_start, sample_rate
        )));
    }
    let bands = [0.0, passband_end / nyquist, stopband_start / nyquist, 1.0];
    let desired = [1.0, 1.0, 0.0, 0.0];
    firls(num_taps, &bands, &desired, None)
}
