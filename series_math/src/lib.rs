//! # Series Math
//!
//! Numeric building blocks shared by the forecasting models.
//! This crate provides least squares solvers, Yule–Walker estimation,
//! differencing helpers, ARMA impulse responses, Fourier seasonality terms and normal quantiles.

use thiserror::Error;

pub mod arma;
pub mod autoregression;
pub mod differencing;
pub mod distribution;
pub mod fourier;
pub mod least_squares;
pub mod stats;

pub use autoregression::{yule_walker, YuleWalkerFit};
pub use least_squares::{solve_least_squares, solve_ridge};

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;
