//! Yule–Walker estimation of autoregressive coefficients.

use crate::{MathError, Result};

/// Autocovariances at lags `0..=max_lag`, normalized by the series length.
///
/// The series is centered on its mean when `demean` is set, otherwise on zero.
pub fn autocovariances(data: &[f64], max_lag: usize, demean: bool) -> Result<Vec<f64>> {
    if data.len() <= max_lag {
        return Err(MathError::InsufficientData(format!(
            "Need more than {max_lag} values for lag {max_lag} autocovariance, got {}",
            data.len()
        )));
    }
    let n = data.len();
    let center = if demean {
        data.iter().sum::<f64>() / n as f64
    } else {
        0.0
    };
    let centered: Vec<f64> = data.iter().map(|x| x - center).collect();

    Ok((0..=max_lag)
        .map(|k| {
            centered[k..]
                .iter()
                .zip(&centered)
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n as f64
        })
        .collect())
}

/// AR(p) fit from the Yule–Walker equations.
#[derive(Debug, Clone, PartialEq)]
pub struct YuleWalkerFit {
    /// φ₁..φₚ
    pub coefficients: Vec<f64>,
    /// Mean the series was centered on (zero without demeaning)
    pub mean: f64,
    /// Innovation variance from the Levinson–Durbin recursion
    pub sigma2: f64,
}

/// Solve the Yule–Walker equations by Levinson–Durbin.
///
/// Only `data.len() > order` is required. Biased autocovariances keep the
/// recursion's reflection coefficients inside `(-1, 1)`, so the fitted model
/// is stationary. A series with no variation yields zero coefficients.
pub fn yule_walker(data: &[f64], order: usize, demean: bool) -> Result<YuleWalkerFit> {
    let gamma = autocovariances(data, order, demean)?;
    let mean = if demean {
        data.iter().sum::<f64>() / data.len() as f64
    } else {
        0.0
    };

    let mut phi = vec![0.0; order];
    let mut err = gamma[0];
    for k in 1..=order {
        if err <= 1e-12 * gamma[0].max(f64::MIN_POSITIVE) {
            break;
        }
        let mut acc = gamma[k];
        for j in 1..k {
            acc -= phi[j - 1] * gamma[k - j];
        }
        let kappa = acc / err;
        let previous = phi.clone();
        phi[k - 1] = kappa;
        for j in 1..k {
            phi[j - 1] = previous[j - 1] - kappa * previous[k - j - 1];
        }
        err *= 1.0 - kappa * kappa;
    }

    if !err.is_finite() || phi.iter().any(|c| !c.is_finite()) {
        return Err(MathError::CalculationError(
            "Yule-Walker recursion produced non-finite values".to_string(),
        ));
    }

    Ok(YuleWalkerFit {
        coefficients: phi,
        mean,
        sigma2: err.max(0.0),
    })
}
