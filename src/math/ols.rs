//! Least squares solver.
//!
//! Every fit in this project reduces to an ordinary least squares problem:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! The regression fitter builds a polynomial-plus-indicator design matrix and
//! the price-curve fitter builds a hinge design matrix; both are linear in β,
//! so they share this solver.
//!
//! Implementation choices:
//! - SVD solves the least-squares problem robustly for tall matrices (a year
//!   of daily observations against a handful of columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - High-degree polynomial columns in raw °C can be poorly scaled, so we try
//!   progressively looser tolerances before giving up.
//! - No randomness anywhere: identical inputs produce bit-identical β.

use nalgebra::{DMatrix, DVector};

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
    fn least_squares_is_deterministic() {
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.5]);
        let y = DVector::from_row_slice(&[1.0, 2.2, 2.9, 4.6]);

        let a = solve_least_squares(&x, &y).unwrap();
        let b = solve_least_squares(&x, &y).unwrap();
        assert_eq!(a, b);
    }
}
