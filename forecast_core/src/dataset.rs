//! Time series dataset handling for forecasting
//!
//! [`DatasetBuilder`] is the single validation gate in front of the models:
//! a [`TimeSeriesDataset`] can only be obtained through it, so every dataset
//! a forecaster sees is cleaned, deduplicated, sorted and large enough.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ForecastError, Result};
use crate::frequency::Frequency;
use crate::normalize::{parse_flexible_date, parse_locale_number};
use crate::table::RawTable;

/// Default minimum number of observations a dataset must keep after cleaning.
pub const DEFAULT_MIN_OBSERVATIONS: usize = 10;

/// One observation of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub timestamp: NaiveDate,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: NaiveDate, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// What happened to the input rows while building a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Rows offered to the builder
    pub rows_read: usize,
    /// Rows dropped because the date did not parse
    pub invalid_dates: usize,
    /// Rows dropped because the value did not parse
    pub invalid_values: usize,
    /// Rows dropped because an earlier row had the same date
    pub duplicates: usize,
}

impl BuildReport {
    /// Total number of rows that did not make it into the dataset.
    pub fn dropped(&self) -> usize {
        self.invalid_dates + self.invalid_values + self.duplicates
    }
}

/// A validated, chronologically ordered series with unique dates.
#[derive(Debug, Clone, Serialize)]
pub struct TimeSeriesDataset {
    points: Vec<TimeSeriesPoint>,
    frequency: Frequency,
    report: BuildReport,
}

impl TimeSeriesDataset {
    /// The observations in ascending date order.
    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a dataset that passed the gate.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Observation dates.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    /// Observation values.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Earliest observation.
    pub fn first(&self) -> &TimeSeriesPoint {
        &self.points[0]
    }

    /// Latest observation.
    pub fn last(&self) -> &TimeSeriesPoint {
        &self.points[self.points.len() - 1]
    }

    /// Native frequency inferred from the observation dates.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Row accounting from the build.
    pub fn report(&self) -> &BuildReport {
        &self.report
    }
}

/// Builds [`TimeSeriesDataset`]s from raw tables or points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetBuilder {
    min_observations: usize,
}

impl Default for DatasetBuilder {
    fn default() -> Self {
        Self {
            min_observations: DEFAULT_MIN_OBSERVATIONS,
        }
    }
}

impl DatasetBuilder {
    /// Builder with the default minimum of 10 observations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum number of observations (at least 2).
    pub fn min_observations(mut self, min: usize) -> Self {
        self.min_observations = min;
        self
    }

    /// The configured minimum.
    pub fn required(&self) -> usize {
        self.min_observations
    }

    /// Select `date_column` and `value_column` from `table` and clean them.
    ///
    /// Rows with an unparsable date or value are dropped. Duplicate dates keep
    /// the first occurrence in source order.
    pub fn build(
        &self,
        table: &RawTable,
        date_column: &str,
        value_column: &str,
    ) -> Result<TimeSeriesDataset> {
        let dates = table
            .column(date_column)
            .ok_or_else(|| ForecastError::MissingColumn(date_column.to_string()))?;
        let values = table
            .column(value_column)
            .ok_or_else(|| ForecastError::MissingColumn(value_column.to_string()))?;

        let mut report = BuildReport {
            rows_read: table.len(),
            ..BuildReport::default()
        };
        let mut points = Vec::with_capacity(table.len());

        for (raw_date, raw_value) in dates.into_iter().zip(values) {
            let Some(timestamp) = parse_flexible_date(raw_date) else {
                report.invalid_dates += 1;
                continue;
            };
            let Some(value) = parse_locale_number(raw_value) else {
                report.invalid_values += 1;
                continue;
            };
            points.push(TimeSeriesPoint { timestamp, value });
        }

        if report.invalid_dates + report.invalid_values > 0 {
            warn!(
                date_column,
                value_column,
                invalid_dates = report.invalid_dates,
                invalid_values = report.invalid_values,
                "dropped malformed rows"
            );
        }

        self.finish(points, report)
    }

    /// Apply the same ordering, deduplication and size gate to in-memory points.
    pub fn from_points<I>(&self, points: I) -> Result<TimeSeriesDataset>
    where
        I: IntoIterator<Item = TimeSeriesPoint>,
    {
        let mut report = BuildReport::default();
        let mut kept = Vec::new();
        for point in points {
            report.rows_read += 1;
            if point.value.is_finite() {
                kept.push(point);
            } else {
                report.invalid_values += 1;
            }
        }
        self.finish(kept, report)
    }

    fn finish(
        &self,
        mut points: Vec<TimeSeriesPoint>,
        mut report: BuildReport,
    ) -> Result<TimeSeriesDataset> {
        if self.min_observations < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "min_observations must be at least 2, got {}",
                self.min_observations
            )));
        }

        // Stable sort keeps source order among equal dates, so dedup keeps the first.
        points.sort_by_key(|p| p.timestamp);
        let before = points.len();
        points.dedup_by_key(|p| p.timestamp);
        report.duplicates = before - points.len();

        if points.len() < self.min_observations {
            return Err(ForecastError::InsufficientData {
                required: self.min_observations,
                available: points.len(),
            });
        }

        let dates: Vec<NaiveDate> = points.iter().map(|p| p.timestamp).collect();
        let frequency = Frequency::infer(&dates).unwrap_or(Frequency::Daily);

        debug!(
            observations = points.len(),
            frequency = frequency.label(),
            dropped = report.dropped(),
            "dataset built"
        );

        Ok(TimeSeriesDataset {
            points,
            frequency,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(&str, &str)]) -> RawTable {
        RawTable::from_rows(
            &["Data", "Zamkniecie"],
            rows.iter().map(|(d, v)| vec![*d, *v]),
        )
    }

    #[test]
    fn drops_and_counts_malformed_rows() {
        let mut rows: Vec<(String, String)> = (1..=10)
            .map(|d| (format!("2023-01-{d:02}"), format!("{d},5")))
            .collect();
        rows.push(("garbage".into(), "1".into()));
        rows.push(("2023-02-01".into(), "n/a".into()));
        let borrowed: Vec<(&str, &str)> = rows.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();

        let ds = DatasetBuilder::new().build(&table(&borrowed), "Data", "Zamkniecie").unwrap();
        assert_eq!(ds.len(), 10);
        assert_eq!(ds.report().invalid_dates, 1);
        assert_eq!(ds.report().invalid_values, 1);
        assert_eq!(ds.first().value, 1.5);
    }

    #[test]
    fn missing_column_is_reported() {
        let err = DatasetBuilder::new()
            .build(&table(&[]), "Data", "Kurs")
            .unwrap_err();
        assert!(matches!(err, ForecastError::MissingColumn(c) if c == "Kurs"));
    }

    #[test]
    fn minimum_below_two_is_rejected() {
        let points = vec![TimeSeriesPoint::new(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), 1.0)];
        let err = DatasetBuilder::new().min_observations(1).from_points(points).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidParameter(_)));
    }
}
