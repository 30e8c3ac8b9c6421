//! ARMA polynomial helpers.
//!
//! Polynomials are stored as coefficient vectors in powers of the backshift
//! operator `B`, constant term first.

/// Multiply two polynomials in `B`.
pub fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] += ai * bj;
        }
    }
    out
}

/// The AR polynomial `φ(B)(1 - B)^d` expressed as `1 - Σ a_i B^i`.
///
/// Returns the `a_i` coefficients (lag 1 first).
pub fn integrated_ar_coefficients(ar: &[f64], d: usize) -> Vec<f64> {
    let mut poly = Vec::with_capacity(ar.len() + 1);
    poly.push(1.0);
    poly.extend(ar.iter().map(|c| -c));

    for _ in 0..d {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }

    poly.iter().skip(1).map(|c| -c).collect()
}

/// Impulse response (ψ) weights of an ARIMA process.
///
/// `ψ_0 = 1` and `ψ_j = θ_j + Σ a_i ψ_{j-i}` where `a` are the integrated AR
/// coefficients. The h-step forecast variance is `σ² Σ_{j<h} ψ_j²`.
pub fn psi_weights(ar: &[f64], ma: &[f64], d: usize, n: usize) -> Vec<f64> {
    let a = integrated_ar_coefficients(ar, d);
    let mut psi = Vec::with_capacity(n);
    for j in 0..n {
        if j == 0 {
            psi.push(1.0);
            continue;
        }
        let mut value = ma.get(j - 1).copied().unwrap_or(0.0);
        for (i, &ai) in a.iter().enumerate() {
            let lag = i + 1;
            if lag > j {
                break;
            }
            value += ai * psi[j - lag];
        }
        psi.push(value);
    }
    psi
}

/// Cumulative forecast variances for horizons `1..=n`.
pub fn forecast_variances(ar: &[f64], ma: &[f64], d: usize, sigma2: f64, n: usize) -> Vec<f64> {
    let psi = psi_weights(ar, ma, d, n);
    let mut acc = 0.0;
    psi.iter()
        .map(|w| {
            acc += w * w;
            sigma2 * acc
        })
        .collect()
}
