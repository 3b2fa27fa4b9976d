//! Ordinary least squares for the feature-regression baseline.
//!
//! We solve small regression problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! where `x_i` is a row of standardized feature columns plus an intercept.
//!
//! Implementation choices:
//! - Columns are z-scored on the fit window before solving; attendance lags
//!   are in the millions while cyclical terms are in [-1, 1].
//! - SVD solve, because the design matrix is tall (more rows than columns)
//!   and some feature pairs are strongly collinear (lags vs rolling means).

use nalgebra::{DMatrix, DVector};

use crate::math::stats::{mean, sample_std};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Per-column centering/scaling learned on the fit window.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    pub means: Vec<f64>,
    /// Zero for constant columns; those columns are mapped to 0.
    pub scales: Vec<f64>,
}

impl Standardizer {
    /// Learn column means and sample standard deviations from `rows`.
    pub fn fit(rows: &[Vec<f64>]) -> Option<Self> {
        let p = rows.first()?.len();
        let mut means = Vec::with_capacity(p);
        let mut scales = Vec::with_capacity(p);
        for j in 0..p {
            let col: Vec<f64> = rows.iter().map(|r| r[j]).collect();
            means.push(mean(&col)?);
            scales.push(sample_std(&col).unwrap_or(0.0));
        }
        Some(Self { means, scales })
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(v, (m, s))| if *s > 0.0 { (v - m) / s } else { 0.0 })
            .collect()
    }
}

/// Build a design matrix with a leading intercept column.
pub fn design_matrix(rows: &[Vec<f64>]) -> DMatrix<f64> {
    let n = rows.len();
    let p = rows.first().map_or(0, Vec::len) + 1;
    DMatrix::from_fn(n, p, |i, j| if j == 0 { 1.0 } else { rows[i][j - 1] })
}

/// Evaluate `β0 + Σ βj xj` for one (already standardized) row.
pub fn linear_predict(beta: &DVector<f64>, row: &[f64]) -> f64 {
    beta[0] + row.iter().zip(beta.iter().skip(1)).map(|(x, b)| x * b).sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn standardized_fit_recovers_predictions() {
        // y = 1000 + 2 * a - 5 * b, with a constant third column.
        let raw: Vec<Vec<f64>> = (0..10)
            .map(|i| vec![100_000.0 + 37.0 * i as f64, ((i * 7) % 5) as f64, 1.0])
            .collect();
        let y: Vec<f64> = raw.iter().map(|r| 1000.0 + 2.0 * r[0] - 5.0 * r[1]).collect();

        let std = Standardizer::fit(&raw).unwrap();
        assert_eq!(std.scales[2], 0.0);
        let rows: Vec<Vec<f64>> = raw.iter().map(|r| std.transform(r)).collect();
        let beta = solve_least_squares(&design_matrix(&rows), &DVector::from_vec(y.clone())).unwrap();

        for (row, target) in rows.iter().zip(&y) {
            assert!((linear_predict(&beta, row) - target).abs() < 1e-6);
        }
    }
}
