//! Forecasting models for time series data
//!
//! Two backends share one lifecycle:
//!
//! ```text
//! Unloaded --load--> Loaded --train--> Trained --predict--> Predicted
//! ```
//!
//! Loading again resets to `Loaded`, training again discards the forecast.
//! Calling an operation too early fails with a lifecycle error
//! ([`ForecastError::NotLoaded`], [`ForecastError::NotTrained`],
//! [`ForecastError::NoForecast`]) instead of panicking.

pub mod arima;
pub mod trend;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::chart::Chart;
use crate::dataset::TimeSeriesDataset;
use crate::error::{ForecastError, Result};

pub use arima::{ArimaForecaster, ArimaOrder};
pub use trend::{rescale_band, TrendConfig, TrendForecaster};

/// Lifecycle stage of a forecaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Unloaded,
    Loaded,
    Trained,
    Predicted,
}

/// One forecast row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub timestamp: NaiveDate,
    pub point_estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl ForecastRow {
    /// Width of the uncertainty interval.
    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }
}

/// Forecast produced by a model.
///
/// Every row satisfies `lower_bound <= point_estimate <= upper_bound`; this is
/// checked when the result is created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    model: String,
    rows: Vec<ForecastRow>,
    /// Index of the first row after the observed history
    horizon_start: usize,
}

impl ForecastResult {
    /// Create a forecast result, validating the interval ordering of every row.
    pub fn new(model: impl Into<String>, rows: Vec<ForecastRow>, horizon_start: usize) -> Result<Self> {
        if horizon_start > rows.len() {
            return Err(ForecastError::ModelFit(format!(
                "Horizon start {} is past the {} forecast rows",
                horizon_start,
                rows.len()
            )));
        }

        for row in &rows {
            let finite = row.point_estimate.is_finite()
                && row.lower_bound.is_finite()
                && row.upper_bound.is_finite();
            if !finite {
                return Err(ForecastError::ModelFit(format!(
                    "Non-finite forecast at {}",
                    row.timestamp
                )));
            }
            if !(row.lower_bound <= row.point_estimate && row.point_estimate <= row.upper_bound) {
                return Err(ForecastError::ModelFit(format!(
                    "Interval [{}, {}] does not contain the estimate {} at {}",
                    row.lower_bound, row.upper_bound, row.point_estimate, row.timestamp
                )));
            }
        }

        Ok(Self {
            model: model.into(),
            rows,
            horizon_start,
        })
    }

    /// Label of the model that produced the forecast
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn horizon_start(&self) -> usize {
        self.horizon_start
    }

    /// Rows covering the observed history (empty for future-only forecasts)
    pub fn history_rows(&self) -> &[ForecastRow] {
        &self.rows[..self.horizon_start]
    }

    /// Rows after the last observation
    pub fn future_rows(&self) -> &[ForecastRow] {
        &self.rows[self.horizon_start..]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timestamps(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }

    pub fn point_estimates(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.point_estimate).collect()
    }
}

/// Common interface of the forecasting backends.
pub trait Forecaster {
    /// Display name of the model
    fn name(&self) -> &str;

    /// Current lifecycle stage
    fn stage(&self) -> Stage;

    /// Attach a validated dataset, discarding any fitted state.
    fn load(&mut self, dataset: TimeSeriesDataset);

    /// Fit with the model's configured hyperparameters.
    fn train_default(&mut self) -> Result<()>;

    /// Forecast with the model's default horizon.
    fn predict_default(&mut self) -> Result<&ForecastResult>;

    /// Forecast `horizon` ahead; the unit is model specific
    /// (calendar days for the trend model, periods for ARIMA).
    fn predict_horizon(&mut self, horizon: usize) -> Result<&ForecastResult>;

    /// The latest forecast, if one was produced
    fn forecast(&self) -> Option<&ForecastResult>;

    /// Build a chart of the history and the latest forecast.
    fn plot_chart(&self, confidence_reduction: f64, x_label: &str, y_label: &str) -> Result<Chart>;
}

fn default_changepoint_prior_scale() -> f64 {
    trend::DEFAULT_CHANGEPOINT_PRIOR_SCALE
}

fn default_seasonality_prior_scale() -> f64 {
    trend::DEFAULT_SEASONALITY_PRIOR_SCALE
}

/// Serializable choice of backend and its hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Trend {
        #[serde(default = "default_changepoint_prior_scale")]
        changepoint_prior_scale: f64,
        #[serde(default = "default_seasonality_prior_scale")]
        seasonality_prior_scale: f64,
    },
    Autoregressive {
        #[serde(default)]
        order: ArimaOrder,
    },
}

impl Default for ModelSpec {
    fn default() -> Self {
        ModelSpec::Trend {
            changepoint_prior_scale: trend::DEFAULT_CHANGEPOINT_PRIOR_SCALE,
            seasonality_prior_scale: trend::DEFAULT_SEASONALITY_PRIOR_SCALE,
        }
    }
}

impl ModelSpec {
    /// Default horizon of the backend (days for trend, periods for ARIMA).
    pub fn default_horizon(&self) -> usize {
        match self {
            ModelSpec::Trend { .. } => trend::DEFAULT_DAYS_AHEAD,
            ModelSpec::Autoregressive { .. } => arima::DEFAULT_PERIODS,
        }
    }
}

/// Either backend, selected at runtime from a [`ModelSpec`].
#[derive(Debug, Clone)]
pub enum AnyForecaster {
    Trend(TrendForecaster),
    Autoregressive(ArimaForecaster),
}

impl AnyForecaster {
    pub fn from_spec(spec: &ModelSpec) -> Self {
        match *spec {
            ModelSpec::Trend {
                changepoint_prior_scale,
                seasonality_prior_scale,
            } => AnyForecaster::Trend(TrendForecaster::new(
                TrendConfig::default()
                    .with_changepoint_prior_scale(changepoint_prior_scale)
                    .with_seasonality_prior_scale(seasonality_prior_scale),
            )),
            ModelSpec::Autoregressive { order } => {
                AnyForecaster::Autoregressive(ArimaForecaster::new(order))
            }
        }
    }

    fn inner(&self) -> &dyn Forecaster {
        match self {
            AnyForecaster::Trend(m) => m,
            AnyForecaster::Autoregressive(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Forecaster {
        match self {
            AnyForecaster::Trend(m) => m,
            AnyForecaster::Autoregressive(m) => m,
        }
    }
}

impl Forecaster for AnyForecaster {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn stage(&self) -> Stage {
        self.inner().stage()
    }

    fn load(&mut self, dataset: TimeSeriesDataset) {
        self.inner_mut().load(dataset)
    }

    fn train_default(&mut self) -> Result<()> {
        self.inner_mut().train_default()
    }

    fn predict_default(&mut self) -> Result<&ForecastResult> {
        self.inner_mut().predict_default()
    }

    fn predict_horizon(&mut self, horizon: usize) -> Result<&ForecastResult> {
        self.inner_mut().predict_horizon(horizon)
    }

    fn forecast(&self) -> Option<&ForecastResult> {
        self.inner().forecast()
    }

    fn plot_chart(&self, confidence_reduction: f64, x_label: &str, y_label: &str) -> Result<Chart> {
        self.inner().plot_chart(confidence_reduction, x_label, y_label)
    }
}
