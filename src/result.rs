//! Result type for natural-gradient ICA.

use crate::config::SignalLayout;
use crate::error::Result;
use crate::math::inverse;
use ndarray::{Array1, Array2};

/// Result of running natural-gradient ICA.
#[derive(Debug, Clone)]
pub struct IcaResult {
    /// Estimated sources, in the same orientation as the input signal.
    pub sources: Array2<f64>,

    /// Demixing matrix W (n_channels × n_channels), scale-resolved.
    ///
    /// Applied to the original (channels × samples) signal it reproduces
    /// the estimated sources.
    pub demixing: Array2<f64>,

    /// Cost before the first iteration followed by the cost after each one.
    /// Empty if cost tracking was disabled.
    pub cost_trace: Vec<f64>,

    /// Number of iterations performed.
    pub n_iterations: usize,

    /// Factor the finalizer applied to each source.
    pub scale: Array1<f64>,

    /// Orientation of `sources`.
    pub layout: SignalLayout,
}

impl IcaResult {
    /// Cost at initialization, if tracked.
    pub fn initial_cost(&self) -> Option<f64> {
        self.cost_trace.first().copied()
    }

    /// Cost after the last iteration, if tracked.
    pub fn final_cost(&self) -> Option<f64> {
        self.cost_trace.last().copied()
    }

    /// Get the mixing matrix estimate (inverse of the demixing matrix).
    ///
    /// Column `i` is the contribution of source `i` to every channel.
    pub fn mixing(&self) -> Result<Array2<f64>> {
        inverse(&self.demixing)
    }

    /// Number of separated sources.
    pub fn n_sources(&self) -> usize {
        self.demixing.nrows()
    }
}
