// src/lib.rs

//! # natgrad-ica
//!
//! Blind source separation with Independent Component Analysis optimized by
//! the natural gradient.
//!
//! Given an observed multichannel signal `X = A·S`, produced by an unknown
//! square mixing matrix `A` acting on statistically independent sources `S`,
//! the solver estimates a demixing matrix `W` such that `Y = W·X` recovers
//! the sources up to permutation and scale. The update rule is
//!
//! ```text
//! W ← W − μ·(E[ψ(Y)·Yᵀ] − I)·W
//! ```
//!
//! with `ψ` the score function of the assumed source density (see
//! [`ScoreFunction`]). After a fixed number of iterations the scale of each
//! source is resolved by back-projection onto a reference channel, or by
//! normalizing the estimate to a unit peak. Which output corresponds to which
//! source is not resolved.
//!
//! ## Example
//!
//! ```rust,no_run
//! use natgrad_ica::{IcaConfig, NaturalGradientIca, ScoreFunction};
//! use ndarray::Array2;
//!
//! # fn main() -> Result<(), natgrad_ica::IcaError> {
//! // Observed signal (n_channels x n_samples)
//! let x = Array2::<f64>::zeros((3, 16000));
//!
//! // Separate with default settings
//! let result = NaturalGradientIca::fit(&x)?;
//!
//! // Or with custom configuration
//! let config = IcaConfig::builder()
//!     .score(ScoreFunction::Sech)
//!     .step_size(0.05)
//!     .n_iter(200)
//!     .back_projection_channel(1)
//!     .track_cost(true)
//!     .random_state(42)
//!     .build();
//! let result = NaturalGradientIca::fit_with_config(&x, &config)?;
//!
//! // Access results
//! let sources = &result.sources;
//! let demixing = &result.demixing;
//! let costs = &result.cost_trace;
//! # Ok(())
//! # }
//! ```

mod config;
mod cost;
mod error;
mod finalize;
mod math;
mod natgrad;
mod normalize;
mod result;
mod score;
mod solver;

pub use config::{ConfigBuilder, IcaConfig, SignalLayout};
pub use cost::negative_log_likelihood;
pub use error::{IcaError, Result};
pub use finalize::{back_projection_matrix, ScaleResolution};
pub use natgrad::{IterationState, NoopObserver, Observer};
pub use result::IcaResult;
pub use score::{Cosh, Density, Laplace, ScoreFunction, Sech};
pub use solver::{initial_demixing, NaturalGradientIca};

// Evaluation helpers for synthetic mixtures
pub mod utils;

// Re-export ndarray for convenience
pub use ndarray;
