//! Error types for the forecast_core crate

use series_math::MathError;
use thiserror::Error;

/// Custom error types for the forecast_core crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A column the operation needs is not present in the table
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// The cleaned dataset is smaller than the configured minimum
    #[error("insufficient data: {available} valid observations, at least {required} required")]
    InsufficientData { required: usize, available: usize },

    /// `train` called before a valid dataset was loaded
    #[error("Model has no data loaded; call load first")]
    NotLoaded,

    /// `predict_future` called before the model was trained
    #[error("Model is not trained; call train first")]
    NotTrained,

    /// `plot` called before a forecast was produced
    #[error("No forecast available; call predict_future first")]
    NoForecast,

    /// The model could not be fitted to the data
    #[error("Model fit error: {0}")]
    ModelFit(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from numeric kernels
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from JSON serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Broad classes of failure, used by callers to pick a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input data
    Data,
    /// Too few valid observations after cleaning
    InsufficientData,
    /// A lifecycle stage was called out of order
    Lifecycle,
    /// Numerical failure while fitting or predicting
    ModelFit,
    /// Invalid configuration value
    Parameter,
    /// Failure reading or writing external resources
    Io,
}

impl ForecastError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::MissingColumn(_) | ForecastError::DataError(_) => ErrorKind::Data,
            ForecastError::InsufficientData { .. } => ErrorKind::InsufficientData,
            ForecastError::NotLoaded | ForecastError::NotTrained | ForecastError::NoForecast => {
                ErrorKind::Lifecycle
            }
            ForecastError::ModelFit(_) | ForecastError::Math(_) => ErrorKind::ModelFit,
            ForecastError::InvalidParameter(_) => ErrorKind::Parameter,
            ForecastError::IoError(_) | ForecastError::Csv(_) | ForecastError::Json(_) => {
                ErrorKind::Io
            }
        }
    }

    /// Whether the error comes from calling lifecycle stages out of order.
    pub fn is_lifecycle(&self) -> bool {
        self.kind() == ErrorKind::Lifecycle
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
