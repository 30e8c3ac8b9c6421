//! Plain-text rendering of tab reports for the terminal.

use std::fmt::Write;

use forecast_core::chart::render_ascii;
use forecast_core::models::ForecastResult;
use forecast_core::table::RawTable;

use crate::controller::{TabOutcome, TabReport};

/// Sizes used when rendering a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub width: usize,
    pub height: usize,
    /// Forecast rows printed before the table is cut short
    pub max_rows: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 80,
            height: 20,
            max_rows: 10,
        }
    }
}

/// Align table cells into columns separated by `|`.
pub fn render_table(table: &RawTable) -> String {
    let headers = table.headers();
    let rows: Vec<Vec<&str>> = table
        .records()
        .map(|r| r.values().iter().map(String::as_str).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[&str]| -> String {
        widths
            .iter()
            .enumerate()
            .map(|(i, &w)| format!("{:<w$}", cells.get(i).copied().unwrap_or("")))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    let header_cells: Vec<&str> = headers.iter().map(String::as_str).collect();
    out.push_str(&line(header_cells.as_slice()));
    out.push('\n');
    for row in &rows {
        out.push_str(&line(row.as_slice()));
        out.push('\n');
    }
    out
}

/// Future rows of a forecast: date, point estimate and band.
pub fn render_forecast_table(forecast: &ForecastResult, max_rows: usize) -> String {
    let rows = forecast.future_rows();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} | {:>14} | {:>14} | {:>14}",
        "Data", "Prognoza", "Dolna granica", "Górna granica"
    );
    for row in rows.iter().take(max_rows) {
        let _ = writeln!(
            out,
            "{:<10} | {:>14.2} | {:>14.2} | {:>14.2}",
            row.timestamp.format("%Y-%m-%d"),
            row.point_estimate,
            row.lower_bound,
            row.upper_bound
        );
    }
    if rows.len() > max_rows {
        let _ = writeln!(out, "... ({} więcej)", rows.len() - max_rows);
    }
    out
}

/// Full text for one tab: heading, data preview, forecast and charts.
pub fn render_report(report: &TabReport, options: &RenderOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {}: {} ==", report.title, report.company);

    if let Some(preview) = &report.preview {
        let _ = writeln!(out, "Dane załadowane ({}):", report.path.display());
        out.push_str(&render_table(preview));
        out.push('\n');
    }

    match &report.outcome {
        TabOutcome::Forecast { output, comparison } => {
            let _ = writeln!(
                out,
                "Model: {} (wiersze: {}, odrzucone: {})",
                output.model,
                output.report.rows_read,
                output.report.dropped()
            );
            out.push_str(&render_forecast_table(&output.forecast, options.max_rows));
            out.push('\n');
            out.push_str(&render_ascii(&output.chart, options.width, options.height));
            if let Some(chart) = comparison {
                out.push('\n');
                out.push_str(&render_ascii(chart, options.width, options.height));
            }
        }
        TabOutcome::RawData { reason, chart } => {
            let _ = writeln!(out, "Brak prognozy: {reason}. Wyświetlam surowe dane.");
            out.push_str(&render_ascii(chart, options.width, options.height));
        }
        TabOutcome::Failed { reason } => {
            let _ = writeln!(out, "Błąd: {reason}");
        }
    }
    out
}
