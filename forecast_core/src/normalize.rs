//! Normalization of locale-formatted numbers and mixed date notations.
//!
//! Both parsers are total: they return `None` instead of failing, and callers
//! drop the affected rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_NUMERIC: Regex = Regex::new(r"[^0-9.,\-]").unwrap();
    static ref NUMBER: Regex = Regex::new(r"-?[0-9]+(?:\.[0-9]+)?").unwrap();
    static ref FISCAL_QUARTER: Regex = Regex::new(r"^([0-9]{4})/Q([1-4])").unwrap();
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a number that may use a comma decimal separator and carry units.
///
/// Everything except digits, `.`, `,` and `-` is removed, commas become
/// periods and the first signed decimal literal is parsed:
/// `"12,5%"` → `12.5`, `"1 234,5 zł"` → `1234.5`.
pub fn parse_locale_number(raw: &str) -> Option<f64> {
    let stripped = NON_NUMERIC.replace_all(raw, "");
    let normalized = stripped.replace(',', ".");
    let literal = NUMBER.find(&normalized)?;
    literal
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parse a calendar date written either as `YYYY/Qn` or as a common date format.
///
/// Fiscal quarters map to the first day of the quarter's first month, so
/// `2023/Q3` becomes 2023-07-01.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(caps) = FISCAL_QUARTER.captures(raw) {
        let year: i32 = caps[1].parse().ok()?;
        let quarter: u32 = caps[2].parse().ok()?;
        return quarter_start(year, quarter);
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
}

/// First day of the given fiscal quarter.
pub fn quarter_start(year: i32, quarter: u32) -> Option<NaiveDate> {
    if !(1..=4).contains(&quarter) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1)
}
