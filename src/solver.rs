// src/solver.rs

//! Main natural-gradient ICA solver interface.

use crate::config::IcaConfig;
use crate::error::{IcaError, Result};
use crate::finalize::{check_estimate, finalize, ScaleResolution};
use crate::math::{count_non_finite, max_abs};
use crate::natgrad::{self, LoopParams, NoopObserver, Observer};
use crate::normalize::{denormalize, normalize, to_channels_by_samples, to_layout};
use crate::result::IcaResult;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// The natural-gradient Independent Component Analysis solver.
///
/// This struct provides static methods for fitting ICA models.
pub struct NaturalGradientIca;

impl NaturalGradientIca {
    /// Fit ICA model with default configuration.
    ///
    /// # Arguments
    /// * `x` - Observed signal of shape (n_channels, n_samples)
    pub fn fit(x: &Array2<f64>) -> Result<IcaResult> {
        Self::fit_with_config(x, &IcaConfig::default())
    }

    /// Fit ICA model with custom configuration.
    ///
    /// The random initial demixing matrix is drawn from a generator seeded
    /// with `config.random_state`, or from the OS when no seed is given.
    pub fn fit_with_config(x: &Array2<f64>, config: &IcaConfig) -> Result<IcaResult> {
        let mut rng = match config.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self::fit_with_rng(x, config, &mut rng)
    }

    /// Fit ICA model drawing the initial demixing matrix from `rng`.
    ///
    /// `config.random_state` is ignored.
    pub fn fit_with_rng<R: Rng + ?Sized>(
        x: &Array2<f64>,
        config: &IcaConfig,
        rng: &mut R,
    ) -> Result<IcaResult> {
        Self::fit_observed(x, config, rng, &mut NoopObserver)
    }

    /// Fit ICA model, reporting every iteration to `observer`.
    ///
    /// # Errors
    /// * [`IcaError::InvalidConfig`] for a bad step size or iteration count
    /// * [`IcaError::InputShape`] for fewer than 2 channels, no samples or a
    ///   mis-sized `w_init`
    /// * [`IcaError::BackProjectionChannelOutOfRange`] for a selector above
    ///   the channel count, reported before iterating
    /// * [`IcaError::Divergence`] if the estimate ends up non-finite or too
    ///   large for its second moments to be finite
    pub fn fit_observed<R, O>(
        x: &Array2<f64>,
        config: &IcaConfig,
        rng: &mut R,
        observer: &mut O,
    ) -> Result<IcaResult>
    where
        R: Rng + ?Sized,
        O: Observer + ?Sized,
    {
        config.validate()?;

        let x = to_channels_by_samples(x, config.layout);
        let (n, t) = x.dim();

        if t == 0 {
            return Err(IcaError::InputShape {
                message: "observed signal has no samples".into(),
            });
        }
        config.validate_for_channels(n)?;
        let resolution = ScaleResolution::from_channel(config.back_projection_channel, n)?;

        let normalized = normalize(&x)?;

        let w_init = match &config.w_init {
            Some(w) => w.clone(),
            None => initial_demixing(n, rng),
        };

        if config.verbose {
            log::info!(
                "Running natural-gradient ICA: {} channels, {} samples, {} iterations, {} score",
                n,
                t,
                config.n_iter,
                config.score
            );
        }

        let params = LoopParams {
            score: config.score,
            step_size: config.step_size,
            n_iter: config.n_iter,
            track_cost: config.track_cost,
            verbose: config.verbose,
        };
        let (mut y, w, info) = natgrad::run(&normalized.data, w_init, &params, observer);

        // W learned on X / scale maps X itself to scale * Y
        denormalize(&mut y, normalized.scale);

        if let Err(err) = check_estimate(&y) {
            log::warn!(
                "Estimate unusable after {} iterations with step size {}: {}",
                info.n_iterations,
                config.step_size,
                err
            );
            return Err(err);
        }

        let finalized = finalize(&x, y, w, resolution)?;

        let non_finite = count_non_finite(&finalized.sources);
        if non_finite > 0 {
            log::warn!("Scale resolution produced {} non-finite values", non_finite);
            return Err(IcaError::Divergence {
                non_finite,
                peak: max_abs(&finalized.sources),
            });
        }

        if let (Some(first), Some(last)) = (info.cost_trace.first(), info.cost_trace.last()) {
            log::debug!("Cost went from {:.6e} to {:.6e}", first, last);
        }

        Ok(IcaResult {
            sources: to_layout(finalized.sources, config.layout),
            demixing: finalized.demixing,
            cost_trace: info.cost_trace,
            n_iterations: info.n_iterations,
            scale: finalized.scale,
            layout: config.layout,
        })
    }

    /// Separate new data with a fitted demixing matrix.
    ///
    /// # Arguments
    /// * `x` - New observed signal, in the orientation the model was fitted with
    /// * `result` - Result from a previous fit
    pub fn transform(x: &Array2<f64>, result: &IcaResult) -> Result<Array2<f64>> {
        let x = to_channels_by_samples(x, result.layout);
        if x.nrows() != result.demixing.ncols() {
            return Err(IcaError::InputShape {
                message: format!(
                    "expected {} channels, got {}",
                    result.demixing.ncols(),
                    x.nrows()
                ),
            });
        }

        Ok(to_layout(result.demixing.dot(&x), result.layout))
    }
}

/// Draw an `n × n` demixing matrix with independent standard normal entries.
pub fn initial_demixing<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Array2<f64> {
    Array2::from_shape_fn((n, n), |_| rng.sample::<f64, _>(StandardNormal))
}
