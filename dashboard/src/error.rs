use forecast_core::ForecastError;
use thiserror::Error;

/// Errors raised while configuring or driving the dashboard
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unknown company: {0}")]
    UnknownCompany(String),

    #[error("Unknown tab: {0}")]
    UnknownTab(String),

    #[error("Forecast error: {0}")]
    Forecast(#[from] ForecastError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
