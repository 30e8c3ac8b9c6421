//! # Forecast Core
//!
//! Turns messy financial tables into forecasts.
//!
//! ## Features
//!
//! - Raw CSV tables with untyped string cells ([`table`])
//! - Locale number and mixed date normalization ([`normalize`])
//! - Company vs industry composite field splitting ([`splitter`])
//! - A single validation gate producing clean datasets ([`dataset`])
//! - Trend + yearly seasonality + Polish holidays forecaster ([`models::trend`])
//! - ARIMA(p, d, q) forecaster ([`models::arima`])
//! - Chart values with a terminal renderer ([`chart`])
//! - Margin and quarter-on-quarter growth indicators ([`indicators`])
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forecast_core::dataset::DatasetBuilder;
//! use forecast_core::models::TrendForecaster;
//! use forecast_core::table::RawTable;
//!
//! # fn main() -> forecast_core::error::Result<()> {
//! let table = RawTable::from_csv("data/pkn/pkn_d.csv")?;
//! let dataset = DatasetBuilder::new().build(&table, "Data", "Zamkniecie")?;
//!
//! let mut model = TrendForecaster::default();
//! model.load(dataset);
//! model.train(0.05, 5.0)?;
//! model.predict_future(365)?;
//!
//! let chart = model.plot_with_labels(0.5, "Data", "Cena zamknięcia")?;
//! println!("{}", forecast_core::chart::render_ascii(&chart, 80, 20));
//! # Ok(())
//! # }
//! ```

pub mod chart;
pub mod dataset;
pub mod error;
pub mod frequency;
pub mod holidays;
pub mod indicators;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod splitter;
pub mod table;

// Re-export commonly used types
pub use crate::chart::{render_ascii, Chart};
pub use crate::dataset::{DatasetBuilder, TimeSeriesDataset, TimeSeriesPoint};
pub use crate::error::{ErrorKind, ForecastError};
pub use crate::frequency::Frequency;
pub use crate::models::{
    AnyForecaster, ArimaForecaster, ArimaOrder, ForecastResult, ForecastRow, Forecaster, ModelSpec,
    Stage, TrendConfig, TrendForecaster,
};
pub use crate::pipeline::{run_pipeline, ForecastRequest, PipelineOutput};
pub use crate::table::RawTable;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
