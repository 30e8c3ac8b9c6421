//! Fourier terms for smooth periodic seasonality.

use std::f64::consts::PI;

/// Length of the yearly cycle in days.
pub const YEAR_DAYS: f64 = 365.25;

/// Build Fourier features for each time point.
///
/// `t_days` is time in days since an arbitrary origin. Each row holds
/// `[sin(2π·1·t/P), cos(2π·1·t/P), …, sin(2π·K·t/P), cos(2π·K·t/P)]`.
pub fn fourier_terms(t_days: &[f64], period: f64, order: usize) -> Vec<Vec<f64>> {
    t_days
        .iter()
        .map(|&t| {
            let mut row = Vec::with_capacity(2 * order);
            for k in 1..=order {
                let angle = 2.0 * PI * k as f64 * t / period;
                row.push(angle.sin());
                row.push(angle.cos());
            }
            row
        })
        .collect()
}
