//! Shared forecasting pipeline used by front-ends.
//!
//! One call runs the whole workflow for a table:
//! dataset build -> load -> train -> predict -> plot
//!
//! It either returns the forecast together with its chart or the first error;
//! there are no partial results.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chart::Chart;
use crate::dataset::{BuildReport, DatasetBuilder, DEFAULT_MIN_OBSERVATIONS};
use crate::error::Result;
use crate::models::{AnyForecaster, ForecastResult, Forecaster, ModelSpec};
use crate::table::RawTable;

fn default_min_observations() -> usize {
    DEFAULT_MIN_OBSERVATIONS
}

fn default_confidence_reduction() -> f64 {
    1.0
}

fn default_x_label() -> String {
    "Data".to_string()
}

fn default_y_label() -> String {
    "Wartość".to_string()
}

/// Everything needed to forecast one column of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub date_column: String,
    pub value_column: String,
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,
    #[serde(default)]
    pub model: ModelSpec,
    /// Model specific horizon; the model default when unset
    #[serde(default)]
    pub horizon: Option<usize>,
    #[serde(default = "default_confidence_reduction")]
    pub confidence_reduction: f64,
    #[serde(default = "default_x_label")]
    pub x_label: String,
    #[serde(default = "default_y_label")]
    pub y_label: String,
    /// Chart title; the model's own title when unset
    #[serde(default)]
    pub title: Option<String>,
}

impl ForecastRequest {
    pub fn new(date_column: impl Into<String>, value_column: impl Into<String>, model: ModelSpec) -> Self {
        Self {
            date_column: date_column.into(),
            value_column: value_column.into(),
            min_observations: DEFAULT_MIN_OBSERVATIONS,
            model,
            horizon: None,
            confidence_reduction: 1.0,
            x_label: default_x_label(),
            y_label: default_y_label(),
            title: None,
        }
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }

    pub fn with_confidence_reduction(mut self, reduction: f64) -> Self {
        self.confidence_reduction = reduction;
        self
    }

    pub fn with_min_observations(mut self, min: usize) -> Self {
        self.min_observations = min;
        self
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Horizon actually used for the request.
    pub fn effective_horizon(&self) -> usize {
        self.horizon.unwrap_or_else(|| self.model.default_horizon())
    }
}

/// Outputs of a successful pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub model: String,
    pub report: BuildReport,
    pub forecast: ForecastResult,
    pub chart: Chart,
}

/// Run build -> load -> train -> predict -> plot for one request.
pub fn run_pipeline(table: &RawTable, request: &ForecastRequest) -> Result<PipelineOutput> {
    // 1) Validate and clean the input columns.
    let dataset = DatasetBuilder::new()
        .min_observations(request.min_observations)
        .build(table, &request.date_column, &request.value_column)?;
    let report = *dataset.report();

    // 2) Fit the selected backend.
    let mut model = AnyForecaster::from_spec(&request.model);
    model.load(dataset);
    model.train_default()?;

    // 3) Forecast and chart.
    let horizon = request.effective_horizon();
    let forecast = model.predict_horizon(horizon)?.clone();
    let mut chart = model.plot_chart(request.confidence_reduction, &request.x_label, &request.y_label)?;
    if let Some(title) = &request.title {
        chart.title = title.clone();
    }

    debug!(
        model = model.name(),
        value_column = %request.value_column,
        horizon,
        rows = forecast.len(),
        "pipeline finished"
    );

    Ok(PipelineOutput {
        model: model.name().to_string(),
        report,
        forecast,
        chart,
    })
}
