//! Additive trend + seasonality forecaster
//!
//! The model is
//!
//! ```text
//! y(t) = k·t + m + Σ δ_j (t - s_j)₊ + Σ yearly Fourier terms + Σ holiday indicators
//! ```
//!
//! with time scaled to `[0, 1]` over the history and `y` scaled by its largest
//! absolute value. Coefficients are a MAP estimate under Gaussian priors,
//! which reduces to ridge regression with a penalty of `σ² / scale²` per
//! column group. The noise variance `σ²` is estimated from a first fit and
//! refined once.
//!
//! Prediction intervals combine the noise variance with the expected variance
//! of trend changes beyond the history: future changepoints arrive at the
//! same rate as in the history with a Laplace magnitude whose scale is the
//! mean absolute fitted change.

use chrono::{Datelike, Days, NaiveDate};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use series_math::distribution::two_sided_z;
use series_math::fourier::{fourier_terms, YEAR_DAYS};
use series_math::least_squares::{residuals, solve_ridge};
use series_math::stats::{max_abs, mean, mean_square};
use tracing::{debug, warn};

use crate::chart::{BandPoint, Chart, SeriesStyle};
use crate::dataset::{DatasetBuilder, TimeSeriesDataset};
use crate::error::{ForecastError, Result};
use crate::frequency::Frequency;
use crate::holidays::Country;
use crate::models::{ForecastResult, ForecastRow, Forecaster, Stage};
use crate::table::RawTable;

pub const DEFAULT_CHANGEPOINT_PRIOR_SCALE: f64 = 0.1;
pub const DEFAULT_SEASONALITY_PRIOR_SCALE: f64 = 10.0;
pub const DEFAULT_HOLIDAYS_PRIOR_SCALE: f64 = 10.0;
/// Default forecast horizon in calendar days.
pub const DEFAULT_DAYS_AHEAD: usize = 365;

/// Prior scale of the base growth rate and offset.
const TREND_PRIOR_SCALE: f64 = 5.0;
/// Lower bound on the scaled noise variance.
const SIGMA2_FLOOR: f64 = 1e-8;

/// Hyperparameters of the trend model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub changepoint_prior_scale: f64,
    pub seasonality_prior_scale: f64,
    pub holidays_prior_scale: f64,
    /// Upper bound; capped by the history length
    pub n_changepoints: usize,
    /// Share of the history in which changepoints are placed
    pub changepoint_range: f64,
    pub yearly_fourier_order: usize,
    /// Coverage of the prediction interval
    pub interval_width: f64,
    pub country_holidays: Option<Country>,
    /// Spacing of future dates; the dataset's native frequency when unset
    pub frequency: Option<Frequency>,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            changepoint_prior_scale: DEFAULT_CHANGEPOINT_PRIOR_SCALE,
            seasonality_prior_scale: DEFAULT_SEASONALITY_PRIOR_SCALE,
            holidays_prior_scale: DEFAULT_HOLIDAYS_PRIOR_SCALE,
            n_changepoints: 25,
            changepoint_range: 0.8,
            yearly_fourier_order: 10,
            interval_width: 0.8,
            country_holidays: Some(Country::Poland),
            frequency: None,
        }
    }
}

impl TrendConfig {
    pub fn with_changepoint_prior_scale(mut self, scale: f64) -> Self {
        self.changepoint_prior_scale = scale;
        self
    }

    pub fn with_seasonality_prior_scale(mut self, scale: f64) -> Self {
        self.seasonality_prior_scale = scale;
        self
    }

    pub fn with_holidays_prior_scale(mut self, scale: f64) -> Self {
        self.holidays_prior_scale = scale;
        self
    }

    pub fn with_n_changepoints(mut self, n: usize) -> Self {
        self.n_changepoints = n;
        self
    }

    pub fn with_changepoint_range(mut self, range: f64) -> Self {
        self.changepoint_range = range;
        self
    }

    pub fn with_yearly_fourier_order(mut self, order: usize) -> Self {
        self.yearly_fourier_order = order;
        self
    }

    pub fn with_interval_width(mut self, width: f64) -> Self {
        self.interval_width = width;
        self
    }

    pub fn with_country_holidays(mut self, country: Option<Country>) -> Self {
        self.country_holidays = country;
        self
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    fn validate(&self) -> Result<()> {
        check_prior_scale("holidays_prior_scale", self.holidays_prior_scale)?;
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "changepoint_range must be in (0, 1], got {}",
                self.changepoint_range
            )));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval_width must be in (0, 1), got {}",
                self.interval_width
            )));
        }
        Ok(())
    }
}

fn check_prior_scale(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ForecastError::InvalidParameter(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

/// Column layout of the design matrix.
#[derive(Debug, Clone)]
struct DesignLayout {
    start: NaiveDate,
    span_days: f64,
    /// Changepoint locations in scaled time
    changepoints: Vec<f64>,
    fourier_order: usize,
    country: Option<Country>,
    /// Holidays observed in the history, one indicator column each
    holidays: Vec<&'static str>,
}

impl DesignLayout {
    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days
    }

    fn n_columns(&self) -> usize {
        2 + self.changepoints.len() + 2 * self.fourier_order + self.holidays.len()
    }

    fn row(&self, date: NaiveDate) -> Vec<f64> {
        let t = self.scaled_time(date);
        let mut row = Vec::with_capacity(self.n_columns());
        row.push(t);
        row.push(1.0);
        row.extend(self.changepoints.iter().map(|s| (t - s).max(0.0)));

        if self.fourier_order > 0 {
            let day = f64::from(date.num_days_from_ce());
            if let Some(terms) = fourier_terms(&[day], YEAR_DAYS, self.fourier_order).pop() {
                row.extend(terms);
            }
        }

        if !self.holidays.is_empty() {
            let today = self.country.and_then(|c| c.holiday_on(date));
            row.extend(
                self.holidays
                    .iter()
                    .map(|name| if Some(*name) == today { 1.0 } else { 0.0 }),
            );
        }
        row
    }

    fn matrix(&self, dates: &[NaiveDate]) -> DMatrix<f64> {
        let rows: Vec<Vec<f64>> = dates.iter().map(|d| self.row(*d)).collect();
        DMatrix::from_fn(rows.len(), self.n_columns(), |i, j| rows[i][j])
    }

    fn penalties(&self, sigma2: f64, changepoint: f64, seasonality: f64, holidays: f64) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.n_columns());
        let trend = sigma2 / (TREND_PRIOR_SCALE * TREND_PRIOR_SCALE);
        out.push(trend);
        out.push(trend);
        out.extend(std::iter::repeat(sigma2 / (changepoint * changepoint)).take(self.changepoints.len()));
        out.extend(
            std::iter::repeat(sigma2 / (seasonality * seasonality)).take(2 * self.fourier_order),
        );
        out.extend(std::iter::repeat(sigma2 / (holidays * holidays)).take(self.holidays.len()));
        out
    }
}

#[derive(Debug, Clone)]
struct FittedTrend {
    layout: DesignLayout,
    beta: DVector<f64>,
    /// Noise variance on the scaled axis
    sigma2: f64,
    y_scale: f64,
}

impl FittedTrend {
    fn predict_scaled(&self, row: &[f64]) -> f64 {
        row.iter().zip(self.beta.iter()).map(|(x, b)| x * b).sum()
    }

    /// Expected variance of the trend at scaled time `t` from unseen changepoints.
    fn trend_variance(&self, t: f64) -> f64 {
        if t <= 1.0 || self.layout.changepoints.is_empty() {
            return 0.0;
        }
        let n_cp = self.layout.changepoints.len();
        let deltas = &self.beta.as_slice()[2..2 + n_cp];
        let laplace_scale = deltas.iter().map(|d| d.abs()).sum::<f64>() / n_cp as f64;
        let rate = n_cp as f64;
        rate * 2.0 * laplace_scale * laplace_scale * (t - 1.0).powi(3) / 3.0
    }
}

/// Trend + yearly seasonality + holidays forecaster.
#[derive(Debug, Clone)]
pub struct TrendForecaster {
    name: String,
    config: TrendConfig,
    stage: Stage,
    dataset: Option<TimeSeriesDataset>,
    fitted: Option<FittedTrend>,
    forecast: Option<ForecastResult>,
    last_failure: Option<String>,
}

impl Default for TrendForecaster {
    fn default() -> Self {
        Self::new(TrendConfig::default())
    }
}

impl TrendForecaster {
    pub fn new(config: TrendConfig) -> Self {
        Self {
            name: "Trend".to_string(),
            config,
            stage: Stage::Unloaded,
            dataset: None,
            fitted: None,
            forecast: None,
            last_failure: None,
        }
    }

    pub fn config(&self) -> &TrendConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn dataset(&self) -> Option<&TimeSeriesDataset> {
        self.dataset.as_ref()
    }

    /// Why the last [`load_table`](Self::load_table) failed, if it did.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Holidays that received a regressor in the last fit.
    pub fn fitted_holidays(&self) -> Option<&[&'static str]> {
        self.fitted.as_ref().map(|f| f.layout.holidays.as_slice())
    }

    /// Number of changepoints used in the last fit.
    pub fn fitted_changepoints(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.layout.changepoints.len())
    }

    /// Attach a validated dataset and reset any fitted state.
    pub fn load(&mut self, dataset: TimeSeriesDataset) {
        debug!(observations = dataset.len(), "trend model loaded");
        self.dataset = Some(dataset);
        self.fitted = None;
        self.forecast = None;
        self.last_failure = None;
        self.stage = Stage::Loaded;
    }

    /// Build a dataset from `table` through `builder` and load it.
    ///
    /// On failure the model is reset to `Unloaded` and the reason is kept
    /// in [`last_failure`](Self::last_failure).
    pub fn load_table(
        &mut self,
        table: &RawTable,
        date_column: &str,
        value_column: &str,
        builder: &DatasetBuilder,
    ) -> Result<()> {
        match builder.build(table, date_column, value_column) {
            Ok(dataset) => {
                self.load(dataset);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, value_column, "could not load data for the trend model");
                self.dataset = None;
                self.fitted = None;
                self.forecast = None;
                self.stage = Stage::Unloaded;
                self.last_failure = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Fit the model with explicit changepoint and seasonality prior scales.
    pub fn train(&mut self, changepoint_prior_scale: f64, seasonality_prior_scale: f64) -> Result<()> {
        let dataset = self.dataset.as_ref().ok_or(ForecastError::NotLoaded)?;
        check_prior_scale("changepoint_prior_scale", changepoint_prior_scale)?;
        check_prior_scale("seasonality_prior_scale", seasonality_prior_scale)?;
        self.config.validate()?;

        let dates = dataset.dates();
        let values = dataset.values();
        let n = dates.len();

        let start = dates[0];
        let span_days = ((dates[n - 1] - start).num_days() as f64).max(1.0);
        let y_scale = match max_abs(&values) {
            s if s > 0.0 => s,
            _ => 1.0,
        };

        let mut layout = DesignLayout {
            start,
            span_days,
            changepoints: Vec::new(),
            fourier_order: self.config.yearly_fourier_order,
            country: self.config.country_holidays,
            holidays: Vec::new(),
        };
        layout.changepoints = self.changepoint_locations(&layout, &dates);
        if let Some(country) = self.config.country_holidays {
            for date in &dates {
                if let Some(name) = country.holiday_on(*date) {
                    if !layout.holidays.contains(&name) {
                        layout.holidays.push(name);
                    }
                }
            }
        }

        let x = layout.matrix(&dates);
        let y = DVector::from_iterator(n, values.iter().map(|v| v / y_scale));

        // Starting noise guess: the variance of the scaled series.
        let y_mean = mean(y.as_slice())?;
        let centered: Vec<f64> = y.iter().map(|v| v - y_mean).collect();
        let mut sigma2 = mean_square(&centered)?.max(SIGMA2_FLOOR);
        let mut beta = DVector::zeros(layout.n_columns());

        for _ in 0..2 {
            let penalties = layout.penalties(
                sigma2,
                changepoint_prior_scale,
                seasonality_prior_scale,
                self.config.holidays_prior_scale,
            );
            beta = solve_ridge(&x, &y, &penalties)
                .map_err(|e| ForecastError::ModelFit(format!("trend fit failed: {e}")))?;
            let resid = residuals(&x, &y, &beta);
            sigma2 = mean_square(resid.as_slice())?.max(SIGMA2_FLOOR);
        }

        if !sigma2.is_finite() || beta.iter().any(|b| !b.is_finite()) {
            return Err(ForecastError::ModelFit(
                "trend fit produced non-finite coefficients".to_string(),
            ));
        }

        debug!(
            observations = n,
            changepoints = layout.changepoints.len(),
            holidays = layout.holidays.len(),
            sigma = (sigma2.sqrt() * y_scale),
            "trend model trained"
        );

        self.fitted = Some(FittedTrend {
            layout,
            beta,
            sigma2,
            y_scale,
        });
        self.forecast = None;
        self.stage = Stage::Trained;
        Ok(())
    }

    /// Changepoints at evenly spaced observations within the first
    /// `changepoint_range` share of the history.
    fn changepoint_locations(&self, layout: &DesignLayout, dates: &[NaiveDate]) -> Vec<f64> {
        let hist_size = (dates.len() as f64 * self.config.changepoint_range).floor() as usize;
        let n_cp = self.config.n_changepoints.min(hist_size.saturating_sub(1));
        if n_cp == 0 {
            return Vec::new();
        }
        let step = (hist_size - 1) as f64 / n_cp as f64;
        let mut locations: Vec<f64> = (1..=n_cp)
            .map(|j| {
                let idx = (j as f64 * step).round() as usize;
                layout.scaled_time(dates[idx.min(dates.len() - 1)])
            })
            .collect();
        locations.dedup();
        locations
    }

    /// Forecast every history date plus future dates up to `days_ahead`
    /// calendar days after the last observation.
    pub fn predict_future(&mut self, days_ahead: usize) -> Result<&ForecastResult> {
        let dataset = self.dataset.as_ref().ok_or(ForecastError::NotLoaded)?;
        let fitted = self.fitted.as_ref().ok_or(ForecastError::NotTrained)?;

        let frequency = self.config.frequency.unwrap_or_else(|| dataset.frequency());
        let last = dataset.last().timestamp;
        let until = last
            .checked_add_days(Days::new(days_ahead as u64))
            .ok_or_else(|| ForecastError::InvalidParameter(format!("horizon of {days_ahead} days is out of range")))?;
        let history = dataset.dates();
        let future = frequency.dates_until(last, until);

        let z = two_sided_z(self.config.interval_width)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;

        let rows: Vec<ForecastRow> = history
            .iter()
            .chain(future.iter())
            .map(|&date| {
                let row = fitted.layout.row(date);
                let t = fitted.layout.scaled_time(date);
                let yhat = fitted.predict_scaled(&row);
                let half = z * (fitted.sigma2 + fitted.trend_variance(t)).sqrt();
                ForecastRow {
                    timestamp: date,
                    point_estimate: yhat * fitted.y_scale,
                    lower_bound: (yhat - half) * fitted.y_scale,
                    upper_bound: (yhat + half) * fitted.y_scale,
                }
            })
            .collect();

        debug!(
            history = history.len(),
            future = future.len(),
            frequency = frequency.label(),
            "trend forecast produced"
        );

        let result = ForecastResult::new(self.name.clone(), rows, history.len())?;
        self.stage = Stage::Predicted;
        Ok(self.forecast.insert(result))
    }

    pub fn forecast(&self) -> Option<&ForecastResult> {
        self.forecast.as_ref()
    }

    /// Chart with default `Data` / `Wartość` axis labels.
    pub fn plot(&self, confidence_reduction: f64) -> Result<Chart> {
        self.plot_with_labels(confidence_reduction, "Data", "Wartość")
    }

    /// Observed points, the fitted line and the band rescaled by `confidence_reduction`.
    pub fn plot_with_labels(&self, confidence_reduction: f64, x_label: &str, y_label: &str) -> Result<Chart> {
        let forecast = self.forecast.as_ref().ok_or(ForecastError::NoForecast)?;
        let band = rescale_band(forecast, confidence_reduction)?;

        let mut chart = Chart::new("Prognoza trendu z niepewnością").with_labels(x_label, y_label);
        if let Some(dataset) = &self.dataset {
            chart.add_series(
                "Dane historyczne",
                SeriesStyle::Points,
                dataset.points().iter().map(|p| (p.timestamp, p.value)).collect(),
            );
        }
        chart.add_series(
            "Prognoza",
            SeriesStyle::Line,
            forecast.rows().iter().map(|r| (r.timestamp, r.point_estimate)).collect(),
        );
        chart.add_band(
            "Niepewność prognozy",
            band.rows()
                .iter()
                .map(|r| BandPoint {
                    date: r.timestamp,
                    lower: r.lower_bound,
                    upper: r.upper_bound,
                })
                .collect(),
        );
        Ok(chart)
    }
}

/// Scale every interval around its point estimate by `reduction`.
///
/// `upper' = point + r·(upper - point)` and `lower' = point - r·(point - lower)`,
/// so `r = 0.5` halves the width and `r = 0` collapses the band.
pub fn rescale_band(forecast: &ForecastResult, reduction: f64) -> Result<ForecastResult> {
    if !reduction.is_finite() || reduction < 0.0 {
        return Err(ForecastError::InvalidParameter(format!(
            "confidence_reduction must be a non-negative number, got {reduction}"
        )));
    }

    let rows = forecast
        .rows()
        .iter()
        .map(|r| ForecastRow {
            timestamp: r.timestamp,
            point_estimate: r.point_estimate,
            lower_bound: r.point_estimate - reduction * (r.point_estimate - r.lower_bound),
            upper_bound: r.point_estimate + reduction * (r.upper_bound - r.point_estimate),
        })
        .collect();
    ForecastResult::new(forecast.model(), rows, forecast.horizon_start())
}

impl Forecaster for TrendForecaster {
    fn name(&self) -> &str {
        &self.name
    }

    fn stage(&self) -> Stage {
        self.stage
    }

    fn load(&mut self, dataset: TimeSeriesDataset) {
        TrendForecaster::load(self, dataset)
    }

    fn train_default(&mut self) -> Result<()> {
        let (cps, sps) = (
            self.config.changepoint_prior_scale,
            self.config.seasonality_prior_scale,
        );
        self.train(cps, sps)
    }

    fn predict_default(&mut self) -> Result<&ForecastResult> {
        self.predict_future(DEFAULT_DAYS_AHEAD)
    }

    fn predict_horizon(&mut self, horizon: usize) -> Result<&ForecastResult> {
        self.predict_future(horizon)
    }

    fn forecast(&self) -> Option<&ForecastResult> {
        self.forecast.as_ref()
    }

    fn plot_chart(&self, confidence_reduction: f64, x_label: &str, y_label: &str) -> Result<Chart> {
        self.plot_with_labels(confidence_reduction, x_label, y_label)
    }
}
