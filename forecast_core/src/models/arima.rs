//! ARIMA models for time series forecasting
//!
//! The series is differenced `d` times and an ARMA(p, q) model is fitted to
//! the result. A constant is estimated only for `d == 0`; integrated models
//! carry no drift. Pure AR models are solved from the Yule–Walker equations,
//! which need only `p + 1` differenced observations. With an MA part the
//! Hannan–Rissanen procedure is used: a long autoregression supplies
//! innovation estimates, which then enter a least squares regression as
//! lagged regressors.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use series_math::arma::forecast_variances;
use series_math::autoregression::yule_walker;
use series_math::differencing::{difference, integrate};
use series_math::distribution::two_sided_z;
use series_math::least_squares::{residuals, solve_least_squares};
use series_math::stats::mean_square;
use tracing::debug;

use crate::chart::{BandPoint, Chart, SeriesStyle};
use crate::dataset::TimeSeriesDataset;
use crate::error::{ForecastError, Result};
use crate::frequency::Frequency;
use crate::models::{ForecastResult, ForecastRow, Forecaster, Stage};

/// Default number of forecast periods.
pub const DEFAULT_PERIODS: usize = 12;
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// ARIMA order `(p, d, q)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self { p: 5, d: 1, q: 0 }
    }
}

#[derive(Debug, Clone)]
struct FittedArima {
    intercept: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    sigma2: f64,
    /// Differenced series the model was fitted on
    diffed: Vec<f64>,
    /// In-sample innovations aligned with `diffed`
    innovations: Vec<f64>,
}

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct ArimaForecaster {
    name: String,
    order: ArimaOrder,
    confidence_level: f64,
    frequency: Option<Frequency>,
    stage: Stage,
    dataset: Option<TimeSeriesDataset>,
    fitted: Option<FittedArima>,
    forecast: Option<ForecastResult>,
}

impl Default for ArimaForecaster {
    fn default() -> Self {
        Self::new(ArimaOrder::default())
    }
}

impl ArimaForecaster {
    /// Create a new ARIMA model
    pub fn new(order: ArimaOrder) -> Self {
        Self {
            name: format!("ARIMA({},{},{})", order.p, order.d, order.q),
            order,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            frequency: None,
            stage: Stage::Unloaded,
            dataset: None,
            fitted: None,
            forecast: None,
        }
    }

    /// Space forecast dates explicitly instead of using the dataset's frequency.
    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Fitted AR coefficients φ₁..φₚ
    pub fn ar_coefficients(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.ar.as_slice())
    }

    /// Fitted MA coefficients θ₁..θ_q
    pub fn ma_coefficients(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.ma.as_slice())
    }

    pub fn intercept(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.intercept)
    }

    /// Innovation variance on the differenced scale
    pub fn sigma2(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.sigma2)
    }

    pub fn load(&mut self, dataset: TimeSeriesDataset) {
        debug!(observations = dataset.len(), model = %self.name, "ARIMA model loaded");
        self.dataset = Some(dataset);
        self.fitted = None;
        self.forecast = None;
        self.stage = Stage::Loaded;
    }

    /// Fit the model to the loaded dataset.
    pub fn train(&mut self) -> Result<()> {
        let dataset = self.dataset.as_ref().ok_or(ForecastError::NotLoaded)?;
        let ArimaOrder { p, d, q } = self.order;
        let constant = d == 0;
        let diffed = difference(&dataset.values(), d);

        let fitted = if q == 0 {
            fit_autoregressive(&diffed, p, constant)?
        } else {
            let long_order = long_ar_order(diffed.len(), p, q);
            let long = fit_autoregressive(&diffed, long_order, constant)?;
            fit_arma(&diffed, p, q, constant, &long.innovations, p.max(long_order + q))?
        };

        debug!(
            model = %self.name,
            intercept = fitted.intercept,
            sigma2 = fitted.sigma2,
            "ARIMA model trained"
        );
        self.fitted = Some(fitted);
        self.forecast = None;
        self.stage = Stage::Trained;
        Ok(())
    }

    /// Forecast `periods` steps past the last observation.
    ///
    /// Only future rows are returned; dates follow the explicit frequency or
    /// the dataset's native frequency.
    pub fn predict_future(&mut self, periods: usize) -> Result<&ForecastResult> {
        let dataset = self.dataset.as_ref().ok_or(ForecastError::NotLoaded)?;
        let fitted = self.fitted.as_ref().ok_or(ForecastError::NotTrained)?;
        if periods == 0 {
            return Err(ForecastError::InvalidParameter(
                "ARIMA forecast needs at least one period".to_string(),
            ));
        }

        let frequency = self.frequency.unwrap_or_else(|| dataset.frequency());
        let dates = frequency.dates_after(dataset.last().timestamp, periods);
        if dates.len() != periods {
            return Err(ForecastError::InvalidParameter(format!(
                "{periods} {} periods run past the supported date range",
                frequency.label()
            )));
        }

        let steps = fitted.forecast_differenced(periods);
        let levels = integrate(&steps, &dataset.values(), self.order.d)?;
        let variances = forecast_variances(&fitted.ar, &fitted.ma, self.order.d, fitted.sigma2, periods);
        let z = two_sided_z(self.confidence_level)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;

        let rows: Vec<ForecastRow> = dates
            .into_iter()
            .zip(levels)
            .zip(variances)
            .map(|((timestamp, point), variance)| {
                let half = z * variance.sqrt();
                ForecastRow {
                    timestamp,
                    point_estimate: point,
                    lower_bound: point - half,
                    upper_bound: point + half,
                }
            })
            .collect();

        debug!(model = %self.name, periods, frequency = frequency.label(), "ARIMA forecast produced");
        let result = ForecastResult::new(self.name.clone(), rows, 0)?;
        self.stage = Stage::Predicted;
        Ok(self.forecast.insert(result))
    }

    pub fn forecast(&self) -> Option<&ForecastResult> {
        self.forecast.as_ref()
    }

    /// History line, forecast line and the native confidence band.
    pub fn plot(&self) -> Result<Chart> {
        self.plot_with_labels("Data", "Wartość")
    }

    pub fn plot_with_labels(&self, x_label: &str, y_label: &str) -> Result<Chart> {
        let forecast = self.forecast.as_ref().ok_or(ForecastError::NoForecast)?;
        Ok(self.chart_for(forecast, x_label, y_label))
    }

    fn chart_for(&self, band: &ForecastResult, x_label: &str, y_label: &str) -> Chart {
        let mut chart = Chart::new("Prognoza ARIMA").with_labels(x_label, y_label);
        if let Some(dataset) = &self.dataset {
            chart.add_series(
                "Dane historyczne",
                SeriesStyle::Line,
                dataset.points().iter().map(|p| (p.timestamp, p.value)).collect(),
            );
        }
        chart.add_series(
            "Prognoza",
            SeriesStyle::Line,
            band.rows().iter().map(|r| (r.timestamp, r.point_estimate)).collect(),
        );
        chart.add_band(
            "Przedział ufności",
            band.rows()
                .iter()
                .map(|r| BandPoint {
                    date: r.timestamp,
                    lower: r.lower_bound,
                    upper: r.upper_bound,
                })
                .collect(),
        );
        chart
    }
}

impl FittedArima {
    /// Recursive forecasts on the differenced scale; future innovations are zero.
    fn forecast_differenced(&self, periods: usize) -> Vec<f64> {
        let mut w = self.diffed.clone();
        let mut e = self.innovations.clone();
        let mut out = Vec::with_capacity(periods);
        for _ in 0..periods {
            let next = one_step(self.intercept, &self.ar, &self.ma, &w, &e, w.len());
            w.push(next);
            e.push(0.0);
            out.push(next);
        }
        out
    }
}

/// Conditional expectation of `w[t]` given everything before `t`.
fn one_step(intercept: f64, ar: &[f64], ma: &[f64], w: &[f64], e: &[f64], t: usize) -> f64 {
    let mut value = intercept;
    for (i, phi) in ar.iter().enumerate() {
        if let Some(lag) = t.checked_sub(i + 1) {
            value += phi * w[lag];
        }
    }
    for (j, theta) in ma.iter().enumerate() {
        if let Some(lag) = t.checked_sub(j + 1) {
            value += theta * e[lag];
        }
    }
    value
}

fn long_ar_order(n: usize, p: usize, q: usize) -> usize {
    let by_length = (n as f64).ln().ceil() as usize;
    (p + q).max(by_length).max(1).min(n / 3)
}

/// AR(p) by Yule–Walker; the intercept follows from the series mean.
fn fit_autoregressive(w: &[f64], p: usize, constant: bool) -> Result<FittedArima> {
    if w.len() <= p {
        return Err(ForecastError::ModelFit(format!(
            "AR({p}) needs more than {p} observations after differencing, got {}",
            w.len()
        )));
    }
    let fit = yule_walker(w, p, constant)
        .map_err(|e| ForecastError::ModelFit(format!("Yule-Walker fit failed: {e}")))?;
    let intercept = fit.mean * (1.0 - fit.coefficients.iter().sum::<f64>());
    Ok(with_innovations(w, intercept, fit.coefficients, Vec::new(), fit.sigma2))
}

/// Regress `w[t]` on an optional intercept, `p` lags of `w` and `q` lags of
/// `lagged_innovations` for `t >= start`.
fn fit_arma(
    w: &[f64],
    p: usize,
    q: usize,
    constant: bool,
    lagged_innovations: &[f64],
    start: usize,
) -> Result<FittedArima> {
    let offset = usize::from(constant);
    let n_params = offset + p + q;
    let usable = w.len().saturating_sub(start);
    if usable <= n_params {
        return Err(ForecastError::ModelFit(format!(
            "ARMA({p},{q}) needs more than {n_params} usable observations after differencing, got {usable}"
        )));
    }

    let x = DMatrix::from_fn(usable, n_params, |i, j| {
        let t = start + i;
        if j < offset {
            return 1.0;
        }
        let lag = j - offset;
        if lag < p {
            w[t - 1 - lag]
        } else {
            lagged_innovations[t - 1 - (lag - p)]
        }
    });
    let y = DVector::from_iterator(usable, w[start..].iter().copied());
    let beta = solve_least_squares(&x, &y)
        .map_err(|e| ForecastError::ModelFit(format!("ARMA regression failed: {e}")))?;
    let sigma2 = mean_square(residuals(&x, &y, &beta).as_slice())?;
    if !sigma2.is_finite() || beta.iter().any(|b| !b.is_finite()) {
        return Err(ForecastError::ModelFit(
            "ARMA fit produced non-finite coefficients".to_string(),
        ));
    }

    let intercept = if constant { beta[0] } else { 0.0 };
    let ar: Vec<f64> = beta.iter().skip(offset).take(p).copied().collect();
    let ma: Vec<f64> = beta.iter().skip(offset + p).take(q).copied().collect();
    Ok(with_innovations(w, intercept, ar, ma, sigma2))
}

/// Attach recursively computed in-sample innovations to fitted coefficients.
fn with_innovations(w: &[f64], intercept: f64, ar: Vec<f64>, ma: Vec<f64>, sigma2: f64) -> FittedArima {
    let mut innovations = vec![0.0; w.len()];
    for t in ar.len().max(ma.len())..w.len() {
        innovations[t] = w[t] - one_step(intercept, &ar, &ma, w, &innovations, t);
    }
    FittedArima {
        intercept,
        ar,
        ma,
        sigma2,
        diffed: w.to_vec(),
        innovations,
    }
}

impl Forecaster for ArimaForecaster {
    fn name(&self) -> &str {
        &self.name
    }

    fn stage(&self) -> Stage {
        self.stage
    }

    fn load(&mut self, dataset: TimeSeriesDataset) {
        ArimaForecaster::load(self, dataset)
    }

    fn train_default(&mut self) -> Result<()> {
        self.train()
    }

    fn predict_default(&mut self) -> Result<&ForecastResult> {
        self.predict_future(DEFAULT_PERIODS)
    }

    fn predict_horizon(&mut self, horizon: usize) -> Result<&ForecastResult> {
        self.predict_future(horizon)
    }

    fn forecast(&self) -> Option<&ForecastResult> {
        self.forecast.as_ref()
    }

    /// The ARIMA chart always shows the native confidence band;
    /// `confidence_reduction` does not apply to it.
    fn plot_chart(&self, _confidence_reduction: f64, x_label: &str, y_label: &str) -> Result<Chart> {
        self.plot_with_labels(x_label, y_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetBuilder, TimeSeriesPoint};
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    /// xorshift noise in [-1, 1]
    fn noise(n: usize, mut state: u64) -> Vec<f64> {
        (0..n)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state % 20_001) as f64 / 10_000.0 - 1.0
            })
            .collect()
    }

    fn dataset(values: &[f64]) -> TimeSeriesDataset {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(start + chrono::Duration::days(i as i64), *v));
        DatasetBuilder::new().from_points(points).unwrap()
    }

    #[test]
    fn recovers_ar1_coefficient() {
        let eps = noise(500, 0x2545_f491_4f6c_dd1d);
        let mut series = vec![0.0];
        for e in &eps[1..] {
            let prev = *series.last().unwrap();
            series.push(0.6 * prev + e);
        }

        let mut model = ArimaForecaster::new(ArimaOrder::new(1, 0, 0));
        model.load(dataset(&series));
        model.train().unwrap();
        assert_abs_diff_eq!(model.ar_coefficients().unwrap()[0], 0.6, epsilon = 0.1);
    }

    fn random_walk(n: usize, seed: u64) -> Vec<f64> {
        let mut level = 100.0;
        noise(n, seed)
            .iter()
            .map(|e| {
                level += 0.7 + e;
                level
            })
            .collect()
    }

    #[test]
    fn integrated_model_has_no_drift() {
        let series = random_walk(20, 7);
        let last = *series.last().unwrap();

        let mut model = ArimaForecaster::new(ArimaOrder::new(0, 1, 0));
        model.load(dataset(&series));
        model.train().unwrap();
        assert_eq!(model.intercept(), Some(0.0));

        let forecast = model.predict_future(12).unwrap();
        for row in forecast.rows() {
            assert_abs_diff_eq!(row.point_estimate, last, epsilon = 1e-9);
        }
        assert!(forecast.rows()[11].width() > forecast.rows()[0].width());
    }

    #[test]
    fn integrated_ar_band_widens() {
        let series = random_walk(200, 11);
        let mut model = ArimaForecaster::new(ArimaOrder::new(1, 1, 0));
        model.load(dataset(&series));
        model.train().unwrap();
        assert_eq!(model.intercept(), Some(0.0));

        let forecast = model.predict_future(5).unwrap();
        assert_eq!(forecast.len(), 5);
        assert_eq!(forecast.horizon_start(), 0);
        assert!(forecast.rows()[4].width() > forecast.rows()[0].width());
    }

    #[test]
    fn moving_average_order_is_fitted() {
        let eps = noise(400, 99);
        let series: Vec<f64> = (0..eps.len())
            .map(|t| eps[t] + if t > 0 { 0.5 * eps[t - 1] } else { 0.0 })
            .collect();

        let mut model = ArimaForecaster::new(ArimaOrder::new(0, 0, 1));
        model.load(dataset(&series));
        model.train().unwrap();
        let theta = model.ma_coefficients().unwrap()[0];
        assert_abs_diff_eq!(theta, 0.5, epsilon = 0.15);
        assert!(model.predict_future(3).is_ok());
    }

    #[test]
    fn default_order_fits_ten_observations() {
        let series: Vec<f64> = (0..10).map(|i| i as f64 * 1.5 + (i % 3) as f64).collect();
        let mut model = ArimaForecaster::default();
        model.load(dataset(&series));
        model.train().unwrap();
        assert_eq!(model.ar_coefficients().unwrap().len(), 5);

        let forecast = model.predict_future(12).unwrap();
        assert_eq!(forecast.len(), 12);
        for row in forecast.rows() {
            assert!(row.lower_bound <= row.point_estimate && row.point_estimate <= row.upper_bound);
        }
    }

    #[test]
    fn order_beyond_differenced_length_is_fit_error() {
        let series: Vec<f64> = (0..10).map(|i| i as f64 * 1.5 + (i % 3) as f64).collect();
        let mut model = ArimaForecaster::new(ArimaOrder::new(9, 1, 0));
        model.load(dataset(&series));
        // 9 differences leave nothing beyond the 9 lags
        assert!(matches!(model.train(), Err(ForecastError::ModelFit(_))));
    }

    #[test]
    fn chart_keeps_native_band() {
        let mut model = ArimaForecaster::new(ArimaOrder::new(1, 1, 0));
        model.load(dataset(&random_walk(40, 5)));
        model.train().unwrap();
        let native: Vec<f64> = model.predict_future(6).unwrap().rows().iter().map(|r| r.width()).collect();

        let chart = model.plot_chart(0.5, "Data", "Przychody odsetkowe").unwrap();
        let widths: Vec<f64> = chart.bands[0].points.iter().map(|p| p.upper - p.lower).collect();
        assert_eq!(widths, native);
    }

    #[test]
    fn lifecycle_errors() {
        let mut model = ArimaForecaster::default();
        assert!(matches!(model.train(), Err(ForecastError::NotLoaded)));
        assert!(matches!(model.plot(), Err(ForecastError::NoForecast)));
        model.load(dataset(&noise(30, 3)));
        assert!(matches!(model.predict_future(12), Err(ForecastError::NotTrained)));
    }
}
