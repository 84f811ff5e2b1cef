// src/finalize.rs

//! Scale resolution of the separated sources.
//!
//! ICA recovers sources only up to a scale and sign per component. This
//! module fixes them either by back-projecting every source onto a reference
//! observation channel or by normalizing the whole estimate to a unit peak.
//! The ordering of the sources is left untouched.

use crate::error::{IcaError, Result};
use crate::math::{count_non_finite, inverse, max_abs};
use ndarray::{Array1, Array2, Axis};

/// How the scale ambiguity of the estimate is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleResolution {
    /// Divide everything by the global peak magnitude of the estimate.
    Normalize,
    /// Rescale each source to its contribution in the given observation
    /// channel (1-based).
    BackProject {
        /// Reference channel.
        channel: usize,
    },
}

impl ScaleResolution {
    /// Interpret a channel selector: 0 normalizes, `1..=n_channels` projects.
    pub fn from_channel(channel: usize, n_channels: usize) -> Result<Self> {
        match channel {
            0 => Ok(ScaleResolution::Normalize),
            c if c <= n_channels => Ok(ScaleResolution::BackProject { channel: c }),
            c => Err(IcaError::BackProjectionChannelOutOfRange {
                channel: c,
                n_channels,
            }),
        }
    }
}

/// Scale-resolved estimate.
pub struct Finalized {
    /// Rescaled estimate (n_sources × n_samples).
    pub sources: Array2<f64>,
    /// Rescaled demixing matrix, still satisfying `sources = W·X`.
    pub demixing: Array2<f64>,
    /// Factor applied to each source.
    pub scale: Array1<f64>,
}

/// Least-squares mixing estimate `D = (X·Yᵀ)·(Y·Yᵀ)⁻¹`.
///
/// `D` minimizes `‖X − D·Y‖²`; row `k` gives the contribution of every
/// source to observation channel `k`.
pub fn back_projection_matrix(x: &Array2<f64>, y: &Array2<f64>) -> Result<Array2<f64>> {
    let yyt = y.dot(&y.t());
    let xyt = x.dot(&y.t());
    Ok(xyt.dot(&inverse(&yyt)?))
}

/// Scale rows of the estimate and the demixing matrix by `scale`.
fn rescale(y: Array2<f64>, w: Array2<f64>, scale: Array1<f64>) -> Finalized {
    let column = scale.view().insert_axis(Axis(1));
    Finalized {
        sources: y * &column,
        demixing: w * &column,
        scale,
    }
}

/// Back-project every source onto observation channel `channel` (1-based).
pub fn back_project(
    x: &Array2<f64>,
    y: Array2<f64>,
    w: Array2<f64>,
    channel: usize,
) -> Result<Finalized> {
    let n_channels = x.nrows();
    if channel == 0 || channel > n_channels {
        return Err(IcaError::BackProjectionChannelOutOfRange {
            channel,
            n_channels,
        });
    }

    let d = back_projection_matrix(x, &y)?;
    let scale = d.row(channel - 1).to_owned();
    Ok(rescale(y, w, scale))
}

/// Check that the estimate is finite and small enough for `Y·Yᵀ` to stay
/// finite over its sample count.
pub fn check_estimate(y: &Array2<f64>) -> Result<()> {
    let non_finite = count_non_finite(y);
    let peak = max_abs(y);
    let limit = (f64::MAX / y.ncols().max(1) as f64).sqrt();
    if non_finite > 0 || peak >= limit {
        return Err(IcaError::Divergence { non_finite, peak });
    }
    Ok(())
}

/// Normalize the estimate so its largest magnitude is 1.
pub fn normalize_peak(y: Array2<f64>, w: Array2<f64>) -> Result<Finalized> {
    check_estimate(&y)?;

    let peak = max_abs(&y);
    if peak == 0.0 {
        return Err(IcaError::CollapsedEstimate);
    }

    let scale = Array1::from_elem(y.nrows(), 1.0 / peak);
    Ok(rescale(y, w, scale))
}

/// Resolve the scale of `y = W·X` according to `resolution`.
pub fn finalize(
    x: &Array2<f64>,
    y: Array2<f64>,
    w: Array2<f64>,
    resolution: ScaleResolution,
) -> Result<Finalized> {
    match resolution {
        ScaleResolution::Normalize => normalize_peak(y, w),
        ScaleResolution::BackProject { channel } => back_project(x, y, w, channel),
    }
}
