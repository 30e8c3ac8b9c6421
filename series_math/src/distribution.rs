//! Normal distribution quantiles used for prediction intervals.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::{MathError, Result};

/// Quantile of the standard normal distribution.
pub fn normal_quantile(p: f64) -> Result<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(MathError::InvalidInput(format!(
            "Probability must be in (0, 1), got {p}"
        )));
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| MathError::CalculationError(format!("Standard normal unavailable: {e}")))?;
    Ok(normal.inverse_cdf(p))
}

/// Critical value `z` such that `±z` covers `coverage` of a standard normal.
pub fn two_sided_z(coverage: f64) -> Result<f64> {
    if !(coverage > 0.0 && coverage < 1.0) {
        return Err(MathError::InvalidInput(format!(
            "Interval coverage must be in (0, 1), got {coverage}"
        )));
    }
    normal_quantile((1.0 + coverage) / 2.0)
}
