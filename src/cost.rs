// src/cost.rs

//! Negative log-likelihood of the current estimate.

use crate::math::sln_det;
use crate::score::ScoreFunction;
use ndarray::Array2;

/// Compute the cost `-ln|det W| - (1/T) Σ ln p(y_ij)`.
///
/// `y` is the estimate `W·X` with one row per source and `T` columns.
///
/// The cost is `+inf` when `W` is singular, and NaN when `W` or `y` holds
/// non-finite values. The log-densities themselves are evaluated in closed
/// form and stay finite for any finite `y`.
pub fn negative_log_likelihood(w: &Array2<f64>, y: &Array2<f64>, score: ScoreFunction) -> f64 {
    if w.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return f64::NAN;
    }

    let log_abs_det = match sln_det(w) {
        Ok((sign, log_abs)) if sign != 0.0 => log_abs,
        Ok(_) => f64::NEG_INFINITY,
        Err(e) => {
            log::warn!("log-determinant failed, reporting infinite cost: {}", e);
            f64::NEG_INFINITY
        }
    };

    let t = y.ncols().max(1) as f64;
    let log_lik = score.log_pdf(y).sum() / t;

    -log_abs_det - log_lik
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use std::f64::consts::{LN_2, PI};

    #[test]
    fn test_laplace_cost_identity() {
        let w = Array2::eye(2);
        let y = array![[1.0, -1.0, 0.0], [2.0, 0.0, -2.0]];
        // Σ|y| = 6, six entries each contributing ln 2
        let expected = (6.0 + 6.0 * LN_2) / 3.0;
        let cost = negative_log_likelihood(&w, &y, ScoreFunction::Laplace);
        assert_abs_diff_eq!(cost, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_log_det_term() {
        let w = array![[2.0, 0.0], [0.0, 3.0]];
        let y = Array2::zeros((2, 4));
        let cost = negative_log_likelihood(&w, &y, ScoreFunction::Sech);
        // p(0) = 1/π for every entry, two rows
        let expected = -(6.0_f64).ln() + 2.0 * PI.ln();
        assert_abs_diff_eq!(cost, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_cosh_cost_at_zero() {
        let w = Array2::eye(3);
        let y = Array2::zeros((3, 10));
        let cost = negative_log_likelihood(&w, &y, ScoreFunction::Cosh);
        assert_abs_diff_eq!(cost, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_demixing_gives_infinite_cost() {
        let w = array![[1.0, 2.0], [2.0, 4.0]];
        let y = array![[0.5, -0.5], [1.0, -1.0]];
        let cost = negative_log_likelihood(&w, &y, ScoreFunction::Laplace);
        assert!(cost.is_infinite() && cost > 0.0);
    }

    #[test]
    fn test_non_finite_estimate_gives_nan() {
        let w = Array2::eye(2);
        let y = array![[f64::INFINITY, 0.0], [0.0, 1.0]];
        assert!(negative_log_likelihood(&w, &y, ScoreFunction::Sech).is_nan());
    }
}
