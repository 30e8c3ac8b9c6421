//! Runs dashboard tabs: load a company's CSV, prepare it and forecast it.
//!
//! A structural failure stops only the tab it happened in. When a tab cannot
//! be forecast because of its data, the raw columns are charted instead.

use std::path::PathBuf;

use forecast_core::chart::Chart;
use forecast_core::error::{ErrorKind, ForecastError};
use forecast_core::indicators::{calculate_margins, calculate_quarterly_growth};
use forecast_core::pipeline::{run_pipeline, PipelineOutput};
use forecast_core::splitter::split_company_industry;
use forecast_core::table::RawTable;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Company, DashboardConfig, TabConfig};
use crate::error::Result;

/// Rows of the loaded table kept for display
pub const PREVIEW_ROWS: usize = 5;

/// What a tab produced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TabOutcome {
    /// Forecast with its chart, plus an optional comparison chart of raw columns
    Forecast {
        output: PipelineOutput,
        comparison: Option<Chart>,
    },
    /// No forecast; raw data charted with the reason
    RawData { reason: String, chart: Chart },
    /// Nothing to show
    Failed { reason: String },
}

impl TabOutcome {
    pub fn is_forecast(&self) -> bool {
        matches!(self, TabOutcome::Forecast { .. })
    }

    pub fn chart(&self) -> Option<&Chart> {
        match self {
            TabOutcome::Forecast { output, .. } => Some(&output.chart),
            TabOutcome::RawData { chart, .. } => Some(chart),
            TabOutcome::Failed { .. } => None,
        }
    }
}

/// Result of one tab for one company.
#[derive(Debug, Clone, Serialize)]
pub struct TabReport {
    pub tab_id: String,
    pub title: String,
    pub company: String,
    pub path: PathBuf,
    /// First rows of the prepared table, when it could be read
    pub preview: Option<RawTable>,
    pub outcome: TabOutcome,
}

/// Drives tabs according to a [`DashboardConfig`].
#[derive(Debug, Clone)]
pub struct Dashboard {
    config: DashboardConfig,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Run one tab, looked up by company and tab id.
    pub fn run(&self, company: &str, tab: &str) -> Result<TabReport> {
        let company = self.config.company(company)?;
        let tab = self.config.tab(tab)?;
        Ok(self.run_tab(company, tab))
    }

    /// Run every configured tab for a company, in order.
    pub fn run_company(&self, company: &str) -> Result<Vec<TabReport>> {
        let company = self.config.company(company)?;
        Ok(self
            .config
            .tabs
            .iter()
            .map(|tab| self.run_tab(company, tab))
            .collect())
    }

    /// Load the tab's file for `company` and process it; never fails as a whole.
    pub fn run_tab(&self, company: &Company, tab: &TabConfig) -> TabReport {
        let path = self.config.data_path(company, tab);
        info!(company = %company.key, tab = %tab.id, path = %path.display(), "running tab");

        let loaded = tab
            .csv_options()
            .map_err(|e| e.to_string())
            .and_then(|options| RawTable::from_csv_with(&path, options).map_err(|e| e.to_string()));

        let (preview, outcome) = match loaded {
            Ok(mut table) => {
                let outcome = process_table(tab, &mut table);
                (Some(table.head(PREVIEW_ROWS)), outcome)
            }
            Err(reason) => {
                warn!(path = %path.display(), %reason, "could not read data file");
                (
                    None,
                    TabOutcome::Failed {
                        reason: format!("could not read {}: {reason}", path.display()),
                    },
                )
            }
        };

        TabReport {
            tab_id: tab.id.clone(),
            title: tab.title.clone(),
            company: company.name.clone(),
            path,
            preview,
            outcome,
        }
    }
}

/// Prepare a loaded table in place and forecast it, falling back to raw data.
pub fn process_table(tab: &TabConfig, table: &mut RawTable) -> TabOutcome {
    if let Some(column) = &tab.split_column {
        if let Err(e) = split_company_industry(table, column) {
            debug!(tab = %tab.id, error = %e, "continuing without split columns");
        }
    }

    if tab.indicators {
        if let Err(e) = calculate_margins(table) {
            warn!(tab = %tab.id, error = %e, "margins not calculated");
        }
        if let Err(e) = calculate_quarterly_growth(table) {
            warn!(tab = %tab.id, error = %e, "growth not calculated");
        }
    }

    match run_pipeline(table, &tab.request) {
        Ok(mut output) => {
            if tab.request.title.is_none() {
                output.chart.title = tab.title.clone();
            }
            TabOutcome::Forecast {
                comparison: comparison_chart(tab, table),
                output,
            }
        }
        Err(e) if shows_raw_data(&e) => {
            warn!(tab = %tab.id, error = %e, "forecast unavailable, showing raw data");
            match raw_chart(tab, table) {
                Ok(chart) => TabOutcome::RawData {
                    reason: e.to_string(),
                    chart,
                },
                Err(raw_err) => TabOutcome::Failed {
                    reason: format!("{e}; raw data unavailable: {raw_err}"),
                },
            }
        }
        Err(e) => {
            warn!(tab = %tab.id, error = %e, "tab failed");
            TabOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

/// Data problems and fit failures leave the raw series worth showing.
fn shows_raw_data(error: &ForecastError) -> bool {
    matches!(
        error.kind(),
        ErrorKind::Data | ErrorKind::InsufficientData | ErrorKind::ModelFit
    )
}

fn raw_chart(tab: &TabConfig, table: &RawTable) -> forecast_core::error::Result<Chart> {
    let date_column = tab.request.date_column.as_str();
    let columns: Vec<&str> = if tab.raw_columns.is_empty() {
        table
            .headers()
            .iter()
            .map(String::as_str)
            .filter(|h| *h != date_column)
            .collect()
    } else {
        tab.raw_columns.iter().map(String::as_str).collect()
    };

    Ok(Chart::comparative(table, date_column, &columns, format!("{} (surowe dane)", tab.title))?
        .with_labels(tab.request.x_label.clone(), tab.request.y_label.clone()))
}

fn comparison_chart(tab: &TabConfig, table: &RawTable) -> Option<Chart> {
    if tab.compare_columns.is_empty() || !tab.compare_columns.iter().all(|c| table.has_column(c)) {
        return None;
    }
    let columns: Vec<&str> = tab.compare_columns.iter().map(String::as_str).collect();
    Chart::comparative(
        table,
        &tab.request.date_column,
        &columns,
        format!("{}: porównanie", tab.title),
    )
    .ok()
    .map(|chart| chart.with_labels(tab.request.x_label.clone(), tab.request.y_label.clone()))
}
