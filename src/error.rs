// src/error.rs

//! Error types for the natural-gradient ICA crate.

use ndarray_linalg::error::LinalgError;
use thiserror::Error;

/// Errors that can occur while estimating a demixing matrix.
#[derive(Error, Debug)]
pub enum IcaError {
    /// Input or initial matrix has an unusable shape.
    #[error("Invalid input shape: {message}")]
    InputShape {
        /// Description of the shape problem.
        message: String,
    },

    /// Score function name is not one of `laplace`, `sech` or `cosh`.
    #[error("Unsupported score function type '{0}', expected one of: laplace, sech, cosh")]
    UnsupportedScoreType(String),

    /// Back-projection reference channel exceeds the channel count.
    #[error(
        "Back-projection channel {channel} is out of range, \
         expected 0 (normalize) or 1..={n_channels}"
    )]
    BackProjectionChannelOutOfRange {
        /// Requested channel (1-based, 0 means normalize).
        channel: usize,
        /// Number of observed channels.
        n_channels: usize,
    },

    /// The estimated signal contains NaN or infinite values, or grew too
    /// large for its second moments to be representable.
    #[error(
        "Estimated signal diverged ({non_finite} non-finite values, peak magnitude {peak:e}). \
         Consider decreasing the step size."
    )]
    Divergence {
        /// Number of non-finite entries in the estimate.
        non_finite: usize,
        /// Largest finite magnitude in the estimate.
        peak: f64,
    },

    /// The estimated signal is identically zero, so its scale cannot be fixed.
    #[error("Estimated signal collapsed to zero")]
    CollapsedEstimate,

    /// The observed signal has no energy and cannot be normalized.
    #[error("Observed signal is identically zero")]
    DegenerateSignal,

    /// Invalid configuration parameter.
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Name of the invalid parameter.
        parameter: String,
        /// Description of why it's invalid.
        message: String,
    },

    /// A singular matrix was encountered during computation.
    #[error("Singular matrix encountered during computation")]
    SingularMatrix,

    /// Errors raised by the LAPACK backend.
    #[error("Linalg error: {0}")]
    Linalg(#[from] LinalgError),
}

/// Convenience type alias for Results with IcaError.
pub type Result<T> = std::result::Result<T, IcaError>;
