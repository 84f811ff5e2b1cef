// src/natgrad.rs

//! Natural-gradient update loop.
//!
//! Each iteration applies
//!
//! ```text
//! Y ← W·X
//! E ← ψ(Y)·Yᵀ / T
//! W ← W − μ·(E − I)·W
//! ```
//!
//! where `ψ` is the score function. Right-multiplying the Euclidean gradient
//! by `WᵀW` turns it into the natural gradient on the general linear group,
//! so the step needs no matrix inversion and behaves the same however badly
//! `W` is conditioned. The loop runs for a fixed number of iterations.

use crate::cost::negative_log_likelihood;
use crate::score::ScoreFunction;
use ndarray::{Array2, ArrayView2};

/// Snapshot handed to an [`Observer`] before the first and after every iteration.
#[derive(Debug, Clone, Copy)]
pub struct IterationState<'a> {
    /// 0 for the initial state, `i` after the i-th update.
    pub iteration: usize,
    /// Current demixing matrix (acting on the normalized signal).
    pub demixing: ArrayView2<'a, f64>,
    /// Cost of the current state, present only when cost tracking is enabled.
    pub cost: Option<f64>,
}

/// Receives progress from the update loop.
///
/// Any `FnMut(&IterationState)` closure is an observer.
pub trait Observer {
    /// Called once with the initial state and once after every update.
    fn observe(&mut self, state: &IterationState<'_>);
}

impl<F> Observer for F
where
    F: FnMut(&IterationState<'_>),
{
    fn observe(&mut self, state: &IterationState<'_>) {
        self(state)
    }
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn observe(&mut self, _state: &IterationState<'_>) {}
}

/// Parameters of a single loop run.
#[derive(Debug, Clone, Copy)]
pub struct LoopParams {
    pub score: ScoreFunction,
    pub step_size: f64,
    pub n_iter: usize,
    pub track_cost: bool,
    pub verbose: bool,
}

/// Information returned from the update loop.
pub struct CoreInfo {
    /// Cost before the first iteration followed by the cost after each one.
    /// Empty when tracking is disabled.
    pub cost_trace: Vec<f64>,
    /// Number of iterations performed.
    pub n_iterations: usize,
}

/// Compute `E = ψ(Y)·Yᵀ / T`.
pub fn score_moment(y: &Array2<f64>, score: ScoreFunction) -> Array2<f64> {
    let t = y.ncols().max(1) as f64;
    score.score(y).dot(&y.t()) / t
}

/// One natural-gradient step: `W − μ·(E − I)·W`.
pub fn natural_gradient_step(
    w: &Array2<f64>,
    y: &Array2<f64>,
    score: ScoreFunction,
    step_size: f64,
) -> Array2<f64> {
    let n = w.nrows();
    let mut direction = score_moment(y, score);
    for i in 0..n {
        direction[[i, i]] -= 1.0;
    }
    w - &(direction.dot(w) * step_size)
}

/// Run the update loop.
///
/// # Arguments
/// * `x` - Normalized data of shape (n_channels, n_samples)
/// * `w` - Initial demixing matrix, consumed and returned updated
///
/// # Returns
/// * `(Y, W, info)` with `Y = W·X` for the final `W`
pub fn run<O: Observer + ?Sized>(
    x: &Array2<f64>,
    mut w: Array2<f64>,
    params: &LoopParams,
    observer: &mut O,
) -> (Array2<f64>, Array2<f64>, CoreInfo) {
    let mut y = w.dot(x);
    let mut cost_trace = Vec::with_capacity(if params.track_cost {
        params.n_iter + 1
    } else {
        0
    });

    let cost = params
        .track_cost
        .then(|| negative_log_likelihood(&w, &y, params.score));
    cost_trace.extend(cost);
    observer.observe(&IterationState {
        iteration: 0,
        demixing: w.view(),
        cost,
    });

    for iter in 1..=params.n_iter {
        w = natural_gradient_step(&w, &y, params.score, params.step_size);
        y = w.dot(x);

        let cost = params
            .track_cost
            .then(|| negative_log_likelihood(&w, &y, params.score));
        cost_trace.extend(cost);

        match cost {
            Some(c) if params.verbose => log::info!("iteration {}, cost = {:.6e}", iter, c),
            Some(c) => log::debug!("iteration {}, cost = {:.6e}", iter, c),
            None if params.verbose => log::info!("iteration {}", iter),
            None => {}
        }

        observer.observe(&IterationState {
            iteration: iter,
            demixing: w.view(),
            cost,
        });
    }

    let info = CoreInfo {
        cost_trace,
        n_iterations: params.n_iter,
    };

    (y, w, info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn params(n_iter: usize, track_cost: bool) -> LoopParams {
        LoopParams {
            score: ScoreFunction::Sech,
            step_size: 0.1,
            n_iter,
            track_cost,
            verbose: false,
        }
    }

    #[test]
    fn test_score_moment_shape() {
        let y = Array2::from_shape_fn((3, 50), |(i, j)| ((i * 7 + j) as f64).sin());
        let e = score_moment(&y, ScoreFunction::Laplace);
        assert_eq!(e.shape(), &[3, 3]);
    }

    #[test]
    fn test_step_is_stationary_at_fixed_point() {
        // Independent ±1 rows: E = I exactly for the Laplace score
        let y = array![[1.0, -1.0, 1.0, -1.0], [1.0, 1.0, -1.0, -1.0]];
        let w = array![[2.0, 0.5], [-0.3, 1.0]];
        let e = score_moment(&y, ScoreFunction::Laplace);
        assert_abs_diff_eq!(e, Array2::<f64>::eye(2), epsilon = 1e-12);

        let w_next = natural_gradient_step(&w, &y, ScoreFunction::Laplace, 0.5);
        assert_abs_diff_eq!(w_next, w, epsilon = 1e-12);
    }

    #[test]
    fn test_step_grows_small_estimate() {
        // With E ≈ 0 the step scales W by (1 + μ)
        let y = Array2::from_elem((2, 10), 1e-9);
        let w = Array2::<f64>::eye(2);
        let w_next = natural_gradient_step(&w, &y, ScoreFunction::Sech, 0.1);
        assert_abs_diff_eq!(w_next, Array2::<f64>::eye(2) * 1.1, epsilon = 1e-9);
    }

    #[test]
    fn test_cost_trace_length() {
        let x = Array2::from_shape_fn((2, 200), |(i, j)| ((j * (i + 2)) as f64 * 0.37).sin());
        let w = Array2::eye(2);

        let (_, _, info) = run(&x, w.clone(), &params(12, true), &mut NoopObserver);
        assert_eq!(info.cost_trace.len(), 13);
        assert_eq!(info.n_iterations, 12);

        let (_, _, info) = run(&x, w, &params(12, false), &mut NoopObserver);
        assert!(info.cost_trace.is_empty());
    }

    #[test]
    fn test_observer_sees_every_iteration() {
        let x = Array2::from_shape_fn((2, 100), |(i, j)| ((j + 3 * i) as f64 * 0.11).cos());
        let mut seen = Vec::new();
        let mut observer = |state: &IterationState<'_>| {
            seen.push((state.iteration, state.cost.is_some(), state.demixing.dim()));
        };

        let (y, w, _) = run(&x, Array2::eye(2), &params(5, true), &mut observer);

        assert_eq!(seen.len(), 6);
        for (k, &(iteration, has_cost, dim)) in seen.iter().enumerate() {
            assert_eq!(iteration, k);
            assert!(has_cost);
            assert_eq!(dim, (2, 2));
        }
        assert_abs_diff_eq!(y, w.dot(&x), epsilon = 1e-12);
    }
}
