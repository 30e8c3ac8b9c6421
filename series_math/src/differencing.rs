//! Differencing and integration of series for ARIMA-style models.

use crate::{MathError, Result};

/// Apply `order` rounds of first differencing.
///
/// Each round shortens the series by one value.
pub fn difference(data: &[f64], order: usize) -> Vec<f64> {
    let mut current = data.to_vec();
    for _ in 0..order {
        if current.len() < 2 {
            return Vec::new();
        }
        current = current.windows(2).map(|w| w[1] - w[0]).collect();
    }
    current
}

/// Undo `order` rounds of differencing for values that continue `history`.
///
/// `diffed` are values on the `order`-times differenced scale that follow the
/// end of `history`; the result is on the original scale.
pub fn integrate(diffed: &[f64], history: &[f64], order: usize) -> Result<Vec<f64>> {
    if order == 0 {
        return Ok(diffed.to_vec());
    }
    if history.len() < order {
        return Err(MathError::InsufficientData(format!(
            "Need at least {order} historical values to undo differencing, got {}",
            history.len()
        )));
    }

    // Last value of each intermediate level: level k is the k-times differenced history.
    let mut last: Vec<f64> = (0..order)
        .map(|k| {
            difference(history, k)
                .last()
                .copied()
                .ok_or_else(|| MathError::InsufficientData("Empty differenced history".to_string()))
        })
        .collect::<Result<_>>()?;

    let mut out = Vec::with_capacity(diffed.len());
    for &value in diffed {
        let mut carried = value;
        for level in (0..order).rev() {
            carried += last[level];
            last[level] = carried;
        }
        out.push(carried);
    }

    Ok(out)
}
