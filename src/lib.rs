//! # Prognoza
//!
//! Umbrella crate for the forecasting workspace.
//!
//! - [`math`]: numeric kernels (least squares, differencing, Fourier terms)
//! - [`forecast`]: table normalization, dataset gate, trend and ARIMA forecasters
//! - [`dashboard`]: per-company tabs and terminal rendering
//!
//! ```
//! use prognoza::forecast::normalize::{parse_flexible_date, parse_locale_number};
//!
//! assert_eq!(parse_locale_number("12,5%"), Some(12.5));
//! assert_eq!(
//!     parse_flexible_date("2023/Q3").map(|d| d.to_string()),
//!     Some("2023-07-01".to_string())
//! );
//! ```

pub use series_math as math;

#[cfg(feature = "forecast")]
pub use forecast_core as forecast;

#[cfg(feature = "dashboard")]
pub use dashboard;
