//! Derived financial indicators computed on raw statement tables.
//!
//! Results are appended to the table as text columns so they can be charted
//! or forecast like any other column. Cells that cannot be computed are left
//! empty.

use tracing::debug;

use crate::error::{ForecastError, Result};
use crate::normalize::parse_locale_number;
use crate::table::RawTable;

pub const REVENUE: &str = "Przychody ze sprzedaży";
pub const GROSS_PROFIT: &str = "Zysk ze sprzedaży";
pub const OPERATING_PROFIT: &str = "Zysk operacyjny (EBIT)";
pub const NET_PROFIT: &str = "Zysk netto";

pub const GROSS_MARGIN: &str = "marża_brutto";
pub const OPERATING_MARGIN: &str = "marża_operacyjna";
pub const NET_MARGIN: &str = "marża_netto";
pub const REVENUE_QOQ: &str = "przychody_qoq";
pub const NET_PROFIT_QOQ: &str = "zysk_netto_qoq";

/// Add gross, operating and net margins in percent of revenue.
pub fn calculate_margins(table: &mut RawTable) -> Result<()> {
    let revenue = numeric_column(table, REVENUE)?;
    let gross = numeric_column(table, GROSS_PROFIT)?;
    let operating = numeric_column(table, OPERATING_PROFIT)?;
    let net = numeric_column(table, NET_PROFIT)?;

    let margin = |profit: &[Option<f64>]| -> Vec<String> {
        profit
            .iter()
            .zip(&revenue)
            .map(|(p, r)| match (p, r) {
                (Some(p), Some(r)) if *r != 0.0 => format_cell(p / r * 100.0),
                _ => String::new(),
            })
            .collect()
    };
    let columns = [
        (GROSS_MARGIN, margin(&gross)),
        (OPERATING_MARGIN, margin(&operating)),
        (NET_MARGIN, margin(&net)),
    ];

    for (name, values) in columns {
        table.set_column(name, values)?;
    }
    debug!(rows = table.len(), "margins calculated");
    Ok(())
}

/// Add quarter-on-quarter percentage change of revenue and net profit.
///
/// Rows are compared with the previous row, so the table must already be in
/// chronological order. The first row has no previous value.
pub fn calculate_quarterly_growth(table: &mut RawTable) -> Result<()> {
    let revenue = numeric_column(table, REVENUE)?;
    let net = numeric_column(table, NET_PROFIT)?;

    let revenue_growth = pct_change(&revenue);
    let net_growth = pct_change(&net);
    table.set_column(REVENUE_QOQ, revenue_growth)?;
    table.set_column(NET_PROFIT_QOQ, net_growth)?;
    debug!(rows = table.len(), "quarterly growth calculated");
    Ok(())
}

fn numeric_column(table: &RawTable, name: &str) -> Result<Vec<Option<f64>>> {
    let values = table
        .column(name)
        .ok_or_else(|| ForecastError::MissingColumn(name.to_string()))?;
    Ok(values.into_iter().map(parse_locale_number).collect())
}

fn pct_change(values: &[Option<f64>]) -> Vec<String> {
    let mut out = Vec::with_capacity(values.len());
    for (i, current) in values.iter().enumerate() {
        let previous = i.checked_sub(1).and_then(|j| values[j]);
        let cell = match (previous, current) {
            (Some(prev), Some(cur)) if prev != 0.0 => format_cell((cur - prev) / prev * 100.0),
            _ => String::new(),
        };
        out.push(cell);
    }
    out
}

fn format_cell(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statements() -> RawTable {
        RawTable::from_rows(
            &["Data", REVENUE, GROSS_PROFIT, OPERATING_PROFIT, NET_PROFIT],
            vec![
                vec!["2023/Q1", "200", "50", "40", "20"],
                vec!["2023/Q2", "250", "60", "50", "25"],
                vec!["2023/Q3", "0", "1", "1", "1"],
                vec!["2023/Q4", "brak", "1", "1", "10"],
            ],
        )
    }

    #[test]
    fn margins_in_percent() {
        let mut table = statements();
        calculate_margins(&mut table).unwrap();
        assert_eq!(table.get(0, GROSS_MARGIN), Some("25"));
        assert_eq!(table.get(0, OPERATING_MARGIN), Some("20"));
        assert_eq!(table.get(0, NET_MARGIN), Some("10"));
        // zero and unparsable revenue
        assert_eq!(table.get(2, NET_MARGIN), Some(""));
        assert_eq!(table.get(3, NET_MARGIN), Some(""));
    }

    #[test]
    fn growth_against_previous_row() {
        let mut table = statements();
        calculate_quarterly_growth(&mut table).unwrap();
        assert_eq!(table.column(REVENUE_QOQ), Some(vec!["", "25", "-100", ""]));
        assert_eq!(table.get(1, NET_PROFIT_QOQ), Some("25"));
        assert_eq!(table.get(3, NET_PROFIT_QOQ), Some("900"));
    }

    #[test]
    fn missing_column_leaves_table_untouched() {
        let mut table = RawTable::from_rows(&["Data", REVENUE], vec![vec!["2023/Q1", "1"]]);
        let before = table.clone();
        assert!(matches!(calculate_margins(&mut table), Err(ForecastError::MissingColumn(_))));
        assert_eq!(table, before);
    }
}
