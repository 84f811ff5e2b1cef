// src/normalize.rs

//! Data preprocessing: orientation and scalar normalization.

use crate::config::SignalLayout;
use crate::error::{IcaError, Result};
use crate::math::{count_non_finite, max_abs};
use ndarray::{Array2, ArrayBase, Data, Ix2};

/// Result of normalizing an observed signal.
pub struct Normalized {
    /// Normalized data matrix (channels × samples).
    pub data: Array2<f64>,
    /// Factor the data was divided by.
    pub scale: f64,
}

/// Bring the caller's matrix into channels × samples orientation.
pub fn to_channels_by_samples<S: Data<Elem = f64>>(
    x: &ArrayBase<S, Ix2>,
    layout: SignalLayout,
) -> Array2<f64> {
    match layout {
        SignalLayout::ChannelsBySamples => x.to_owned(),
        SignalLayout::SamplesByChannels => x.t().to_owned(),
    }
}

/// Inverse of [`to_channels_by_samples`].
pub fn to_layout(y: Array2<f64>, layout: SignalLayout) -> Array2<f64> {
    match layout {
        SignalLayout::ChannelsBySamples => y,
        SignalLayout::SamplesByChannels => y.reversed_axes(),
    }
}

/// Divide the signal by its global root-mean-square value.
///
/// A single scalar keeps the relative channel gains intact, so a demixing
/// matrix learned on the normalized data applies unchanged to the original.
///
/// # Arguments
/// * `x` - Data matrix of shape (n_channels, n_samples)
pub fn normalize(x: &Array2<f64>) -> Result<Normalized> {
    let n = x.len();
    if n == 0 {
        return Err(IcaError::InputShape {
            message: "observed signal is empty".into(),
        });
    }

    if count_non_finite(x) > 0 {
        return Err(IcaError::InputShape {
            message: "observed signal contains non-finite values".into(),
        });
    }

    // Squares are taken relative to the peak so they neither overflow nor
    // flush to zero.
    let peak = max_abs(x);
    if peak == 0.0 {
        return Err(IcaError::DegenerateSignal);
    }
    let energy: f64 = x.iter().map(|v| (v / peak).powi(2)).sum();
    let scale = peak * (energy / n as f64).sqrt();

    Ok(Normalized {
        data: x / scale,
        scale,
    })
}

/// Undo [`normalize`] on an estimate computed from normalized data.
pub fn denormalize(y: &mut Array2<f64>, scale: f64) {
    y.mapv_inplace(|v| v * scale);
}
