// src/math.rs

//! Small linear-algebra helpers shared by the loop, the cost and the finalizer.

use crate::error::{IcaError, Result};
use ndarray::{Array2, ArrayBase, Data, Ix2};
use ndarray_linalg::{Determinant, Inverse};

/// Compute the signed log-determinant of a square matrix using LAPACK.
///
/// Returns (sign, log_abs_det) where:
/// - sign is 1.0, -1.0, or 0.0
/// - log_abs_det is ln(|det(m)|), `-inf` for a singular matrix
pub fn sln_det(m: &Array2<f64>) -> Result<(f64, f64)> {
    Ok(m.sln_det()?)
}

/// Invert a square matrix, reporting singularity as [`IcaError::SingularMatrix`].
pub fn inverse(m: &Array2<f64>) -> Result<Array2<f64>> {
    let inv = m.inv().map_err(|_| IcaError::SingularMatrix)?;
    if inv.iter().all(|v| v.is_finite()) {
        Ok(inv)
    } else {
        Err(IcaError::SingularMatrix)
    }
}

/// Largest absolute entry, 0.0 for an empty matrix.
pub fn max_abs<S: Data<Elem = f64>>(a: &ArrayBase<S, Ix2>) -> f64 {
    a.iter().fold(0.0, |acc, &v| acc.max(v.abs()))
}

/// Number of NaN or infinite entries.
pub fn count_non_finite<S: Data<Elem = f64>>(a: &ArrayBase<S, Ix2>) -> usize {
    a.iter().filter(|v| !v.is_finite()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_sln_det() {
        let m = array![[1.0, 2.0], [3.0, 4.0]];
        let (sign, log_abs) = sln_det(&m).unwrap();
        assert_abs_diff_eq!(sign, -1.0, epsilon = 1e-10); // det is negative
        assert_abs_diff_eq!(log_abs, 2.0_f64.ln(), epsilon = 1e-10); // |det| = 2
    }

    #[test]
    fn test_sln_det_large_values() {
        // Test with a matrix that would overflow if computing det directly
        let m = array![[1e200, 0.0], [0.0, 1e200]];
        let (sign, log_abs) = sln_det(&m).unwrap();
        assert_abs_diff_eq!(sign, 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(log_abs, 2.0 * 200.0 * 10.0_f64.ln(), epsilon = 1e-6);
    }

    #[test]
    fn test_inverse() {
        let m = array![[4.0, 7.0], [2.0, 6.0]];
        let inv = inverse(&m).unwrap();
        let eye = m.dot(&inv);
        assert_abs_diff_eq!(eye, Array2::<f64>::eye(2), epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_singular() {
        let m = array![[1.0, 2.0], [2.0, 4.0]];
        assert!(matches!(inverse(&m), Err(IcaError::SingularMatrix)));
    }

    #[test]
    fn test_max_abs_and_non_finite() {
        let a = array![[0.5, -3.0], [f64::NAN, 2.0]];
        assert_eq!(max_abs(&array![[0.5, -3.0], [1.0, 2.0]]), 3.0);
        assert_eq!(count_non_finite(&a), 1);
        assert_eq!(max_abs(&Array2::<f64>::zeros((0, 0))), 0.0);
    }
}
