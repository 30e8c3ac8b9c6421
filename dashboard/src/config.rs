//! Dashboard configuration: companies, tabs and where their CSV files live.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use forecast_core::models::{ArimaOrder, ModelSpec};
use forecast_core::pipeline::ForecastRequest;
use forecast_core::splitter::{COMPANY_COLUMN, INDUSTRY_COLUMN};
use forecast_core::table::CsvOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DashboardError, Result};

const THREE_YEARS_DAYS: usize = 365 * 3;

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_delimiter() -> char {
    ','
}

/// A company selectable in the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Display name
    pub name: String,
    /// Directory and file prefix under the data directory
    pub key: String,
}

impl Company {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

/// One dashboard tab: a data file category and how to forecast it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabConfig {
    /// Short identifier used on the command line
    pub id: String,
    /// Tab name shown as the section heading
    pub title: String,
    /// Appended to the company key to form the file name
    pub file_suffix: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Composite company/industry column split before forecasting
    #[serde(default)]
    pub split_column: Option<String>,
    /// Add margin and growth indicator columns to the table
    #[serde(default)]
    pub indicators: bool,
    /// Columns drawn when no forecast can be produced; all non-date columns when empty
    #[serde(default)]
    pub raw_columns: Vec<String>,
    /// Columns drawn together next to a successful forecast, when all exist
    #[serde(default)]
    pub compare_columns: Vec<String>,
    #[serde(flatten)]
    pub request: ForecastRequest,
}

impl TabConfig {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        file_suffix: impl Into<String>,
        request: ForecastRequest,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            file_suffix: file_suffix.into(),
            delimiter: default_delimiter(),
            split_column: None,
            indicators: false,
            raw_columns: Vec::new(),
            compare_columns: Vec::new(),
            request,
        }
    }

    pub fn with_split_column(mut self, column: impl Into<String>) -> Self {
        self.split_column = Some(column.into());
        self
    }

    pub fn with_indicators(mut self, enabled: bool) -> Self {
        self.indicators = enabled;
        self
    }

    pub fn with_raw_columns(mut self, columns: &[&str]) -> Self {
        self.raw_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_compare_columns(mut self, columns: &[&str]) -> Self {
        self.compare_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// CSV reader options for this tab's file
    pub fn csv_options(&self) -> Result<CsvOptions> {
        if !self.delimiter.is_ascii() {
            return Err(DashboardError::Config(format!(
                "tab '{}': delimiter must be an ASCII character",
                self.id
            )));
        }
        Ok(CsvOptions {
            delimiter: self.delimiter as u8,
        })
    }

    fn validate(&self) -> Result<()> {
        self.csv_options()?;
        let reduction = self.request.confidence_reduction;
        if !reduction.is_finite() || reduction < 0.0 {
            return Err(DashboardError::Config(format!(
                "tab '{}': confidence_reduction must be a non-negative number",
                self.id
            )));
        }
        if self.request.horizon == Some(0) {
            return Err(DashboardError::Config(format!(
                "tab '{}': horizon must be positive",
                self.id
            )));
        }
        Ok(())
    }
}

/// Full dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    pub companies: Vec<Company>,
    pub tabs: Vec<TabConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let trend = |changepoint_prior_scale: f64| ModelSpec::Trend {
            changepoint_prior_scale,
            seasonality_prior_scale: 5.0,
        };

        let tabs = vec![
            TabConfig::new(
                "ceny",
                "Ceny akcji",
                "_d.csv",
                ForecastRequest::new("Data", "Zamkniecie", trend(0.05))
                    .with_horizon(THREE_YEARS_DAYS)
                    .with_confidence_reduction(0.5)
                    .with_labels("Data", "Cena zamknięcia")
                    .with_title("Prognoza cen akcji"),
            )
            .with_compare_columns(&["Zamkniecie", "Branża"]),
            TabConfig::new(
                "rentownosc",
                "Rentowność",
                "_rent_wskaźniki.csv",
                ForecastRequest::new("Data-Kwartał", COMPANY_COLUMN, trend(0.05))
                    .with_horizon(THREE_YEARS_DAYS)
                    .with_confidence_reduction(0.5)
                    .with_labels("Data", "Rentowność (%)")
                    .with_title("Prognoza rentowności (ROE)"),
            )
            .with_split_column("ROE")
            .with_raw_columns(&[COMPANY_COLUMN, INDUSTRY_COLUMN]),
            TabConfig::new(
                "przeplywy",
                "Przepływy pieniężne",
                "_pp_wskaźniki.csv",
                ForecastRequest::new(
                    "Data-Kwartał",
                    "Przepływy pieniężne z działalności operacyjnej",
                    trend(0.1),
                )
                .with_horizon(THREE_YEARS_DAYS)
                .with_confidence_reduction(0.5)
                .with_title("Prognoza przepływów pieniężnych"),
            ),
            TabConfig::new(
                "wartosc",
                "Wartość rynkowa",
                "_wr_wskaźniki.csv",
                ForecastRequest::new("Data-Kwartał", COMPANY_COLUMN, trend(0.05))
                    .with_horizon(THREE_YEARS_DAYS)
                    .with_confidence_reduction(0.5)
                    .with_title("Prognoza wartości rynkowej"),
            )
            .with_split_column("Cena / Zysk")
            .with_raw_columns(&[COMPANY_COLUMN, INDUSTRY_COLUMN]),
            TabConfig::new(
                "finanse",
                "Dane finansowe",
                "_dane.csv",
                ForecastRequest::new(
                    "Data",
                    "Przychody odsetkowe",
                    ModelSpec::Autoregressive {
                        order: ArimaOrder::default(),
                    },
                )
                .with_horizon(12)
                .with_labels("Data", "Przychody odsetkowe")
                .with_title("Prognoza ARIMA"),
            )
            .with_indicators(true),
        ];

        Self {
            data_dir: default_data_dir(),
            companies: vec![
                Company::new("PKN Orlen", "pkn"),
                Company::new("Kęty", "kt"),
                Company::new("PCC Rokita", "pcc"),
                Company::new("Bank Handlowy", "bh"),
            ],
            tabs,
        }
    }
}

impl DashboardConfig {
    /// Parse and validate a configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading dashboard config");
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Check for empty lists, duplicate keys and invalid tab settings.
    pub fn validate(&self) -> Result<()> {
        if self.companies.is_empty() {
            return Err(DashboardError::Config("no companies configured".to_string()));
        }
        if self.tabs.is_empty() {
            return Err(DashboardError::Config("no tabs configured".to_string()));
        }

        let mut keys = HashSet::new();
        for company in &self.companies {
            if !keys.insert(company.key.as_str()) {
                return Err(DashboardError::Config(format!(
                    "duplicate company key '{}'",
                    company.key
                )));
            }
        }

        let mut ids = HashSet::new();
        for tab in &self.tabs {
            if !ids.insert(tab.id.as_str()) {
                return Err(DashboardError::Config(format!("duplicate tab id '{}'", tab.id)));
            }
            tab.validate()?;
        }
        Ok(())
    }

    /// Find a company by key or display name, ignoring case.
    pub fn company(&self, name_or_key: &str) -> Result<&Company> {
        self.companies
            .iter()
            .find(|c| c.key.eq_ignore_ascii_case(name_or_key) || c.name.to_lowercase() == name_or_key.to_lowercase())
            .ok_or_else(|| DashboardError::UnknownCompany(name_or_key.to_string()))
    }

    pub fn tab(&self, id: &str) -> Result<&TabConfig> {
        self.tabs
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| DashboardError::UnknownTab(id.to_string()))
    }

    /// `{data_dir}/{key}/{key}{suffix}`
    pub fn data_path(&self, company: &Company, tab: &TabConfig) -> PathBuf {
        self.data_dir
            .join(&company.key)
            .join(format!("{}{}", company.key, tab.file_suffix))
    }
}
