use forecast_core::error::ForecastError;
use forecast_core::splitter::{
    parse_composite, split_company_industry, COMPANY_COLUMN, INDUSTRY_COLUMN,
};
use forecast_core::table::RawTable;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case("12.3% branża 9.8%", Some(12.3), Some(9.8))]
#[case("7%", Some(7.0), None)]
#[case("-1,5% branża -0,5%", Some(-1.5), Some(-0.5))]
#[case("brak", None, None)]
fn test_parse_composite(
    #[case] text: &str,
    #[case] company: Option<f64>,
    #[case] industry: Option<f64>,
) {
    let result = parse_composite(text);
    assert_eq!(result.company, company);
    assert_eq!(result.industry, industry);
}

#[test]
fn test_split_adds_both_columns() {
    let mut table = RawTable::from_rows(
        &["Data-Kwartał", "ROE"],
        vec![
            vec!["2022/Q4", "10,1% branża 8,0%"],
            vec!["2023/Q1", "11%"],
            vec!["2023/Q2", ""],
        ],
    );

    let summary = split_company_industry(&mut table, "ROE").unwrap();

    assert_eq!(summary.rows, 3);
    assert_eq!(summary.company_values, 2);
    assert_eq!(summary.industry_values, 1);
    assert_eq!(table.column(COMPANY_COLUMN), Some(vec!["10.1", "11", ""]));
    assert_eq!(table.column(INDUSTRY_COLUMN), Some(vec!["8", "", ""]));
}

#[test]
fn test_missing_source_column_leaves_table_unchanged() {
    let mut table = RawTable::from_rows(&["Data", "Cena / Zysk"], vec![vec!["2023/Q1", "9,1"]]);
    let before = table.clone();

    let err = split_company_industry(&mut table, "ROE").unwrap_err();

    assert!(matches!(err, ForecastError::MissingColumn(ref c) if c == "ROE"));
    assert_eq!(table, before);
}
