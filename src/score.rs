// src/score.rs

//! Score functions for natural-gradient ICA.
//!
//! A score function is the derivative of the negative log-density assumed for
//! the sources. It is the only nonlinearity in the update rule, so picking the
//! density that matches the sources (super- or sub-Gaussian) decides whether
//! the algorithm separates them at all.

use std::f64::consts::{LN_2, PI};
use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::IcaError;

/// Trait for source densities used by the update loop and the cost tracker.
///
/// `score` must equal `-d/dy log_pdf`, elementwise.
pub trait Density: Clone + Send + Sync {
    /// Log-density of every entry of `y`.
    fn log_pdf(&self, y: &Array2<f64>) -> Array2<f64>;

    /// Score function of every entry of `y`, same shape as the input.
    fn score(&self, y: &Array2<f64>) -> Array2<f64>;
}

/// `ln(cosh(v))` without overflow for large `|v|`.
pub(crate) fn ln_cosh(v: f64) -> f64 {
    let a = v.abs();
    a + (-2.0 * a).exp().ln_1p() - LN_2
}

/// Laplace density `p(y) = exp(-|y|) / 2`.
///
/// Super-Gaussian, the usual choice for speech and other sparse signals.
/// The score is `sign(y)`; an exact zero maps to zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct Laplace;

impl Density for Laplace {
    fn log_pdf(&self, y: &Array2<f64>) -> Array2<f64> {
        y.mapv(|v| -LN_2 - v.abs())
    }

    fn score(&self, y: &Array2<f64>) -> Array2<f64> {
        // f64::signum(0.0) is 1.0
        y.mapv(|v| if v == 0.0 { 0.0 } else { v.signum() })
    }
}

/// Hyperbolic secant density `p(y) = sech(y) / π`.
///
/// Super-Gaussian with a smooth score `tanh(y)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sech;

impl Density for Sech {
    fn log_pdf(&self, y: &Array2<f64>) -> Array2<f64> {
        y.mapv(|v| -ln_cosh(v) - PI.ln())
    }

    fn score(&self, y: &Array2<f64>) -> Array2<f64> {
        y.mapv(f64::tanh)
    }
}

/// Density `p(y) ∝ exp(-y²/2) · cosh(y)`.
///
/// A symmetric mixture of two unit Gaussians centred at ±1, which makes it
/// sub-Gaussian. Score is `y - tanh(y)`.
///
/// The log-density is left unnormalized, matching the cost definition; the
/// missing constant only shifts the cost trace.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cosh;

impl Density for Cosh {
    fn log_pdf(&self, y: &Array2<f64>) -> Array2<f64> {
        y.mapv(|v| -0.5 * v * v + ln_cosh(v))
    }

    fn score(&self, y: &Array2<f64>) -> Array2<f64> {
        y.mapv(|v| v - v.tanh())
    }
}

/// Enumeration of the supported score functions.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "lowercase")
)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScoreFunction {
    /// Laplace density, `sign(y)`.
    #[default]
    Laplace,
    /// Hyperbolic secant density, `tanh(y)`.
    Sech,
    /// Sub-Gaussian cosh density, `y - tanh(y)`.
    Cosh,
}

impl ScoreFunction {
    /// Name accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            ScoreFunction::Laplace => "laplace",
            ScoreFunction::Sech => "sech",
            ScoreFunction::Cosh => "cosh",
        }
    }

    /// Compute the score function.
    pub fn score(&self, y: &Array2<f64>) -> Array2<f64> {
        match self {
            ScoreFunction::Laplace => Laplace.score(y),
            ScoreFunction::Sech => Sech.score(y),
            ScoreFunction::Cosh => Cosh.score(y),
        }
    }

    /// Compute the log-density.
    pub fn log_pdf(&self, y: &Array2<f64>) -> Array2<f64> {
        match self {
            ScoreFunction::Laplace => Laplace.log_pdf(y),
            ScoreFunction::Sech => Sech.log_pdf(y),
            ScoreFunction::Cosh => Cosh.log_pdf(y),
        }
    }
}

impl fmt::Display for ScoreFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScoreFunction {
    type Err = IcaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "laplace" => Ok(ScoreFunction::Laplace),
            "sech" => Ok(ScoreFunction::Sech),
            "cosh" => Ok(ScoreFunction::Cosh),
            _ => Err(IcaError::UnsupportedScoreType(s.to_string())),
        }
    }
}
