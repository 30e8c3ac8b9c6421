//! Descriptive statistics over slices.

use crate::{MathError, Result};

/// Arithmetic mean.
pub fn mean(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot compute mean of empty data".to_string(),
        ));
    }
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Mean of squared values, the residual variance when residuals have zero mean.
pub fn mean_square(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot compute mean square of empty data".to_string(),
        ));
    }
    Ok(data.iter().map(|v| v * v).sum::<f64>() / data.len() as f64)
}

/// Largest absolute value, or zero for empty input.
pub fn max_abs(data: &[f64]) -> f64 {
    data.iter().map(|v| v.abs()).fold(0.0, f64::max)
}
