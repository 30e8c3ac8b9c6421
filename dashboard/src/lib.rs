//! # Dashboard
//!
//! `dashboard` runs the forecasting tabs of a company over its CSV datasets and
//! renders the results in the terminal.
//!
//! Each tab names a data file category (daily prices, profitability, cash
//! flow, valuation, financial statements), the columns to forecast and the
//! model to use. A tab whose data cannot be forecast shows its raw columns
//! instead; a failing tab never stops the others.
//!
//! ## Usage Example
//!
//! ```no_run
//! use dashboard::{render_report, Dashboard, DashboardConfig, RenderOptions};
//!
//! # fn main() -> dashboard::Result<()> {
//! let dashboard = Dashboard::new(DashboardConfig::default());
//! for report in dashboard.run_company("pkn")? {
//!     println!("{}", render_report(&report, &RenderOptions::default()));
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod render;

pub use config::{Company, DashboardConfig, TabConfig};
pub use controller::{process_table, Dashboard, TabOutcome, TabReport};
pub use error::{DashboardError, Result};
pub use render::{render_forecast_table, render_report, render_table, RenderOptions};
