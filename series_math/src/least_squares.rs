//! Least squares and ridge regression solvers.
//!
//! Both forecasting models reduce their fit to small dense problems of the form
//!
//! ```text
//! minimize ||y - Xβ||² + Σ λ_j β_j²
//! ```
//!
//! The ridge term is folded into an augmented system `[X; diag(√λ)] β = [y; 0]`
//! which is then solved by SVD, so tall and rank-deficient designs are handled
//! the same way as well-conditioned ones.

use nalgebra::{DMatrix, DVector};

use crate::{MathError, Result};

/// Solve an ordinary least squares problem using SVD.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
    if x.nrows() != y.len() {
        return Err(MathError::InvalidInput(format!(
            "Design matrix has {} rows but target has {} values",
            x.nrows(),
            y.len()
        )));
    }
    if x.ncols() == 0 {
        return Ok(DVector::zeros(0));
    }

    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if a strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Ok(beta);
            }
        }
    }

    Err(MathError::CalculationError(
        "Least squares system is too ill-conditioned to solve".to_string(),
    ))
}

/// Solve a ridge regression problem with one penalty per column.
///
/// A penalty of zero leaves the column unregularized.
pub fn solve_ridge(x: &DMatrix<f64>, y: &DVector<f64>, penalties: &[f64]) -> Result<DVector<f64>> {
    if penalties.len() != x.ncols() {
        return Err(MathError::InvalidInput(format!(
            "Expected {} penalties, got {}",
            x.ncols(),
            penalties.len()
        )));
    }
    if let Some(bad) = penalties.iter().find(|p| !p.is_finite() || **p < 0.0) {
        return Err(MathError::InvalidInput(format!(
            "Ridge penalties must be finite and non-negative, got {bad}"
        )));
    }

    let n = x.nrows();
    let k = x.ncols();
    let augmented = DMatrix::from_fn(n + k, k, |i, j| {
        if i < n {
            x[(i, j)]
        } else if i - n == j {
            penalties[j].sqrt()
        } else {
            0.0
        }
    });
    let target = DVector::from_fn(n + k, |i, _| if i < n { y[i] } else { 0.0 });

    solve_least_squares(&augmented, &target)
}

/// Residuals `y - Xβ` of a fitted linear model.
pub fn residuals(x: &DMatrix<f64>, y: &DVector<f64>, beta: &DVector<f64>) -> DVector<f64> {
    if beta.is_empty() {
        return y.clone();
    }
    y - x * beta
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert_abs_diff_eq!(beta[0], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(beta[1], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn ridge_with_zero_penalty_matches_ols() {
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let y = DVector::from_row_slice(&[1.0, 3.0, 5.0, 7.0]);

        let ols = solve_least_squares(&x, &y).unwrap();
        let ridge = solve_ridge(&x, &y, &[0.0, 0.0]).unwrap();
        assert_abs_diff_eq!(ols[0], ridge[0], epsilon = 1e-9);
        assert_abs_diff_eq!(ols[1], ridge[1], epsilon = 1e-9);
    }

    #[test]
    fn ridge_penalty_shrinks_towards_zero() {
        let x = DMatrix::from_row_slice(3, 1, &[1.0, 2.0, 3.0]);
        let y = DVector::from_row_slice(&[2.0, 4.0, 6.0]);

        let free = solve_ridge(&x, &y, &[0.0]).unwrap();
        let shrunk = solve_ridge(&x, &y, &[100.0]).unwrap();
        assert_abs_diff_eq!(free[0], 2.0, epsilon = 1e-9);
        assert!(shrunk[0].abs() < free[0].abs());
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        assert!(solve_least_squares(&x, &y).is_err());
        assert!(solve_ridge(&x, &DVector::from_row_slice(&[1.0, 2.0]), &[1.0, 1.0]).is_err());
    }

    #[test]
    fn residuals_of_exact_fit_are_zero() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);
        let beta = solve_least_squares(&x, &y).unwrap();
        let r = residuals(&x, &y, &beta);
        assert!(r.iter().all(|v| v.abs() < 1e-9));
    }
}
