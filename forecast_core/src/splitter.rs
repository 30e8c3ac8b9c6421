//! Splitting of composite "company vs industry" fields.
//!
//! Ratio tables report a company figure together with the industry benchmark
//! in one text field, e.g. `"12,3% branża 9,8%"`. The splitter extracts both
//! percentages into their own columns.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ForecastError, Result};
use crate::table::RawTable;

/// Column receiving the company figure.
pub const COMPANY_COLUMN: &str = "wynik_spolki";
/// Column receiving the industry benchmark.
pub const INDUSTRY_COLUMN: &str = "wynik_branzy";

lazy_static! {
    static ref COMPANY_VALUE: Regex = Regex::new(r"^([0-9.,\-]+)%").unwrap();
    static ref INDUSTRY_VALUE: Regex = Regex::new(r"branża ([0-9.,\-]+)%").unwrap();
}

/// Company and industry values extracted from one composite field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    pub company: Option<f64>,
    pub industry: Option<f64>,
}

/// Counts of values extracted by [`split_company_industry`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitSummary {
    pub rows: usize,
    pub company_values: usize,
    pub industry_values: usize,
}

/// Extract the leading company percentage and the industry percentage.
///
/// Each side is matched independently, so either may be absent. The company
/// value must start the field; leading whitespace is not skipped.
pub fn parse_composite(text: &str) -> CompositeResult {
    CompositeResult {
        company: capture_percentage(&COMPANY_VALUE, text),
        industry: capture_percentage(&INDUSTRY_VALUE, text),
    }
}

fn capture_percentage(pattern: &Regex, text: &str) -> Option<f64> {
    let caps = pattern.captures(text)?;
    caps[1].replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Add [`COMPANY_COLUMN`] and [`INDUSTRY_COLUMN`] derived from `source_column`.
///
/// Missing values are written as empty fields. If the source column does not
/// exist the table is left untouched and [`ForecastError::MissingColumn`] is
/// returned; callers are expected to log it and carry on.
pub fn split_company_industry(table: &mut RawTable, source_column: &str) -> Result<SplitSummary> {
    let Some(values) = table.column(source_column) else {
        warn!(column = source_column, "composite column not found, table left unchanged");
        return Err(ForecastError::MissingColumn(source_column.to_string()));
    };

    let parsed: Vec<CompositeResult> = values.into_iter().map(parse_composite).collect();
    let summary = SplitSummary {
        rows: parsed.len(),
        company_values: parsed.iter().filter(|r| r.company.is_some()).count(),
        industry_values: parsed.iter().filter(|r| r.industry.is_some()).count(),
    };

    let company = parsed.iter().map(|r| format_optional(r.company)).collect();
    let industry = parsed.iter().map(|r| format_optional(r.industry)).collect();
    table.set_column(COMPANY_COLUMN, company)?;
    table.set_column(INDUSTRY_COLUMN, industry)?;

    debug!(
        column = source_column,
        rows = summary.rows,
        company = summary.company_values,
        industry = summary.industry_values,
        "split composite column"
    );
    Ok(summary)
}

fn format_optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_decimals_on_both_sides() {
        let r = parse_composite("12,3% branża 9,8%");
        assert_eq!(r.company, Some(12.3));
        assert_eq!(r.industry, Some(9.8));
    }

    #[test]
    fn industry_only() {
        let r = parse_composite("n/a branża 4%");
        assert_eq!(r.company, None);
        assert_eq!(r.industry, Some(4.0));
    }

    #[test]
    fn leading_whitespace_hides_company_value() {
        let r = parse_composite(" 12% branża 9%");
        assert_eq!(r.company, None);
        assert_eq!(r.industry, Some(9.0));
    }

    #[test]
    fn unparsable_capture_is_absent() {
        // The pattern accepts "1.2.3" but it is not a float.
        let r = parse_composite("1.2.3% branża -%");
        assert_eq!(r.company, None);
        assert_eq!(r.industry, None);
    }

    #[test]
    fn values_written_back_as_text() {
        let mut table = RawTable::from_rows(&["ROE"], vec![vec!["5,5% branża 2%"], vec!["x"]]);
        split_company_industry(&mut table, "ROE").unwrap();
        assert_eq!(table.column(COMPANY_COLUMN), Some(vec!["5.5", ""]));
        assert_eq!(table.column(INDUSTRY_COLUMN), Some(vec!["2", ""]));
    }
}
