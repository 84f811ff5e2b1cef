//! Utility functions for evaluating a separation.
//!
//! These need ground truth (the mixing matrix or the original sources) and
//! are meant for tests, benchmarks and experiments with synthetic mixtures.

use ndarray::{s, Array2, ArrayBase, Data, Ix1, Zip};

/// Permute and scale a matrix to be close to identity.
///
/// # Arguments
/// * `a` - Matrix to permute (typically W @ A where W is demixing and A is mixing)
/// * `scale` - If true, scale rows to have unit diagonal
///
/// # Returns
/// * Permuted (and optionally scaled) matrix
pub fn permute(a: &Array2<f64>, scale: bool) -> Array2<f64> {
    let n = a.nrows();
    let mut a = a.clone();

    // Swap rows until no swap increases the diagonal energy
    let mut done = false;
    while !done {
        done = true;
        for i in 0..n {
            for j in 0..i {
                let diag_sq = a[[i, i]].powi(2) + a[[j, j]].powi(2);
                let off_sq = a[[i, j]].powi(2) + a[[j, i]].powi(2);

                if diag_sq < off_sq {
                    let (upper, lower) = a.multi_slice_mut((s![j, ..], s![i, ..]));
                    Zip::from(upper).and(lower).for_each(std::mem::swap);
                    done = false;
                }
            }
        }
    }

    if scale {
        for (i, mut row) in a.rows_mut().into_iter().enumerate() {
            let diag = row[i];
            if diag.abs() > 1e-10 {
                row.mapv_inplace(|v| v / diag);
            }
        }
    }

    a
}

/// Compute the Amari distance between a demixing and a mixing matrix.
///
/// The Amari distance measures how close `W @ A` is to a permutation
/// and scaling matrix. It equals 0 when W perfectly unmixes A.
pub fn amari_distance(w: &Array2<f64>, a: &Array2<f64>) -> f64 {
    let p = w.dot(a).mapv(f64::abs);
    let n = p.nrows() as f64;

    let s = |r: &Array2<f64>| -> f64 {
        r.rows()
            .into_iter()
            .map(|row| {
                let row_sq = row.mapv(|x| x * x);
                let row_max = row_sq.iter().cloned().fold(0.0, f64::max);
                if row_max > 1e-15 {
                    row_sq.sum() / row_max - 1.0
                } else {
                    0.0
                }
            })
            .sum()
    };

    (s(&p) + s(&p.t().to_owned())) / (2.0 * n)
}

/// Largest ratio of an off-peak entry to the peak entry over all rows of `p`.
///
/// For `p = W @ A` this is small when `p` is close to a scaled permutation.
/// Returns 1.0 when two rows peak in the same column, since `p` then cannot
/// be a permutation.
pub fn max_crosstalk(p: &Array2<f64>) -> f64 {
    let mut used = vec![false; p.ncols()];
    let mut worst: f64 = 0.0;

    for row in p.rows() {
        let Some((peak_col, peak)) = row
            .iter()
            .map(|v| v.abs())
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
        else {
            continue;
        };
        if used[peak_col] || peak == 0.0 {
            return 1.0;
        }
        used[peak_col] = true;

        for (j, v) in row.iter().enumerate() {
            if j != peak_col {
                worst = worst.max(v.abs() / peak);
            }
        }
    }

    worst
}

/// Pearson correlation coefficient of two equally long signals.
///
/// Returns `None` when the lengths differ, the signals are empty or either
/// signal is constant.
pub fn pearson_correlation<S1, S2>(a: &ArrayBase<S1, Ix1>, b: &ArrayBase<S2, Ix1>) -> Option<f64>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let n = a.len() as f64;

    let mean_a = a.sum() / n;
    let mean_b = b.sum() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (dx, dy) = (x - mean_a, y - mean_b);
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some(cov / (var_a * var_b).sqrt())
}

/// Align estimated sources to reference sources by absolute correlation.
///
/// Both matrices are sources × samples. Pairs are picked greedily, highest
/// |correlation| first, so every reference and every estimate is used once.
///
/// # Returns
/// * For each reference row, `Some((estimate_row, correlation))`, or `None`
///   once every estimate has been taken
pub fn match_sources(
    estimated: &Array2<f64>,
    reference: &Array2<f64>,
) -> Vec<Option<(usize, f64)>> {
    let n_ref = reference.nrows();
    let n_est = estimated.nrows();

    let corr: Vec<Vec<f64>> = reference
        .rows()
        .into_iter()
        .map(|r| {
            estimated
                .rows()
                .into_iter()
                .map(|e| pearson_correlation(&r, &e).unwrap_or(0.0))
                .collect()
        })
        .collect();

    let mut pairs: Vec<(usize, usize)> = (0..n_ref)
        .flat_map(|i| (0..n_est).map(move |j| (i, j)))
        .collect();
    pairs.sort_by(|&(i1, j1), &(i2, j2)| corr[i2][j2].abs().total_cmp(&corr[i1][j1].abs()));

    let mut matched = vec![None; n_ref];
    let mut taken = vec![false; n_est];
    for (i, j) in pairs {
        if matched[i].is_none() && !taken[j] {
            matched[i] = Some((j, corr[i][j]));
            taken[j] = true;
        }
    }

    matched
}
