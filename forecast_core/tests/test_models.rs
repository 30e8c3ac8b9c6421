use approx::assert_relative_eq;
use chrono::{Datelike, Months, NaiveDate};
use forecast_core::dataset::{DatasetBuilder, TimeSeriesDataset, TimeSeriesPoint};
use forecast_core::error::{ErrorKind, ForecastError};
use forecast_core::frequency::Frequency;
use forecast_core::models::{
    rescale_band, AnyForecaster, ArimaForecaster, ArimaOrder, Forecaster, ModelSpec, Stage,
    TrendConfig, TrendForecaster,
};
use forecast_core::table::RawTable;
use rstest::rstest;

fn daily_seasonal(days: i64) -> TimeSeriesDataset {
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    let points = (0..days).map(|i| {
        let t = i as f64;
        let season = 5.0 * (2.0 * std::f64::consts::PI * t / 365.25).sin();
        let wiggle = 0.3 * (t * 1.7).sin();
        TimeSeriesPoint::new(start + chrono::Duration::days(i), 50.0 + 0.02 * t + season + wiggle)
    });
    DatasetBuilder::new().from_points(points).unwrap()
}

/// Deterministic irregular component in [0, 1).
fn jitter(i: u32) -> f64 {
    f64::from((i * i * 7 + 3 * i + 5) % 11) / 11.0
}

fn monthly(n: u32) -> TimeSeriesDataset {
    let start = NaiveDate::from_ymd_opt(2019, 1, 31).unwrap();
    let points = (0..n).map(|i| {
        let date = start.checked_add_months(Months::new(i)).unwrap();
        TimeSeriesPoint::new(date, 100.0 + 2.0 * i as f64 + 3.0 * (i as f64).sin() + jitter(i))
    });
    DatasetBuilder::new().from_points(points).unwrap()
}

fn quarterly(n: u32) -> TimeSeriesDataset {
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    let points = (0..n).map(|i| {
        let date = start.checked_add_months(Months::new(3 * i)).unwrap();
        let season = if i % 4 == 3 { 2.0 } else { 0.0 };
        TimeSeriesPoint::new(date, 10.0 + 0.5 * i as f64 + season + 0.5 * jitter(i))
    });
    DatasetBuilder::new().from_points(points).unwrap()
}

#[test]
fn test_trend_rows_respect_interval_order() {
    let mut model = TrendForecaster::default();
    model.load(daily_seasonal(730));
    model.train(0.1, 10.0).unwrap();
    let forecast = model.predict_future(365).unwrap();

    assert_eq!(forecast.history_rows().len(), 730);
    assert_eq!(forecast.future_rows().len(), 365);
    for row in forecast.rows() {
        assert!(row.lower_bound <= row.point_estimate && row.point_estimate <= row.upper_bound);
    }

    let future = forecast.future_rows();
    assert!(future[future.len() - 1].width() >= future[0].width());
}

#[test]
fn test_trend_tracks_seasonal_history() {
    let dataset = daily_seasonal(730);
    let observed = dataset.values();
    let mut model = TrendForecaster::default();
    model.load(dataset);
    model.train(0.1, 10.0).unwrap();
    let forecast = model.predict_future(30).unwrap();

    let mean_abs_error = forecast
        .history_rows()
        .iter()
        .zip(&observed)
        .map(|(row, y)| (row.point_estimate - y).abs())
        .sum::<f64>()
        / observed.len() as f64;
    assert!(mean_abs_error < 1.0, "mean abs error {mean_abs_error}");
}

#[test]
fn test_trend_future_follows_native_frequency() {
    let mut model = TrendForecaster::new(TrendConfig::default().with_country_holidays(None));
    model.load(quarterly(16));
    model.train(0.1, 10.0).unwrap();
    let forecast = model.predict_future(365).unwrap();

    let future: Vec<NaiveDate> = forecast.future_rows().iter().map(|r| r.timestamp).collect();
    assert_eq!(
        future,
        vec![
            NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2019, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2019, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2019, 10, 1).unwrap(),
        ]
    );
}

#[test]
fn test_trend_frequency_override() {
    let config = TrendConfig::default()
        .with_country_holidays(None)
        .with_frequency(Frequency::Monthly);
    let mut model = TrendForecaster::new(config);
    model.load(quarterly(12));
    model.train(0.1, 10.0).unwrap();
    let forecast = model.predict_future(92).unwrap();
    assert_eq!(forecast.future_rows().len(), 3);
}

#[rstest]
#[case(0.5)]
#[case(0.0)]
#[case(2.0)]
fn test_band_rescale_scales_width(#[case] reduction: f64) {
    let mut model = TrendForecaster::default();
    model.load(daily_seasonal(400));
    model.train(0.1, 10.0).unwrap();
    let native = model.predict_future(60).unwrap().clone();

    let scaled = rescale_band(&native, reduction).unwrap();
    for (a, b) in native.rows().iter().zip(scaled.rows()) {
        assert_eq!(a.point_estimate, b.point_estimate);
        assert_relative_eq!(b.width(), reduction * a.width(), max_relative = 1e-9, epsilon = 1e-12);
    }

    let chart = model.plot(reduction).unwrap();
    let band = &chart.bands[0];
    assert_eq!(band.points.len(), native.len());
    for (p, row) in band.points.iter().zip(native.rows()) {
        assert_relative_eq!(
            p.upper - p.lower,
            reduction * row.width(),
            max_relative = 1e-9,
            epsilon = 1e-12
        );
    }
}

#[test]
fn test_plot_uses_axis_labels() {
    let mut model = TrendForecaster::default();
    model.load(daily_seasonal(100));
    model.train(0.05, 5.0).unwrap();
    model.predict_future(10).unwrap();

    let chart = model.plot_with_labels(0.5, "Data", "Cena zamknięcia").unwrap();
    assert_eq!(chart.x_label, "Data");
    assert_eq!(chart.y_label, "Cena zamknięcia");
    assert_eq!(chart.series.len(), 2);
}

#[test]
fn test_load_table_failure_is_recorded() {
    let table = RawTable::from_rows(
        &["Data", "Zamkniecie"],
        vec![vec!["2023-01-02", "1"], vec!["2023-01-03", "2"]],
    );
    let mut model = TrendForecaster::default();

    let err = model
        .load_table(&table, "Data", "Zamkniecie", &DatasetBuilder::new())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientData);
    assert_eq!(model.stage(), Stage::Unloaded);
    assert!(model.last_failure().unwrap().contains("insufficient data"));
    assert!(matches!(model.train(0.1, 10.0), Err(ForecastError::NotLoaded)));
}

#[test]
fn test_reload_resets_to_loaded() {
    let mut model = TrendForecaster::default();
    model.load(daily_seasonal(60));
    model.train(0.1, 10.0).unwrap();
    model.predict_future(5).unwrap();

    model.load(daily_seasonal(90));
    assert_eq!(model.stage(), Stage::Loaded);
    assert!(model.forecast().is_none());
    assert!(matches!(model.predict_future(5), Err(ForecastError::NotTrained)));
}

#[test]
fn test_arima_rows_respect_interval_order() {
    let mut model = ArimaForecaster::default();
    model.load(monthly(48));
    model.train().unwrap();
    let forecast = model.predict_future(12).unwrap();

    assert_eq!(forecast.len(), 12);
    assert!(forecast.history_rows().is_empty());
    for row in forecast.rows() {
        assert!(row.lower_bound <= row.point_estimate && row.point_estimate <= row.upper_bound);
    }
}

#[test]
fn test_arima_dates_follow_dataset_frequency() {
    let mut model = ArimaForecaster::new(ArimaOrder::new(2, 1, 0));
    model.load(quarterly(20));
    model.train().unwrap();
    let forecast = model.predict_future(4).unwrap();

    let months: Vec<(i32, u32)> = forecast
        .rows()
        .iter()
        .map(|r| (r.timestamp.year(), r.timestamp.month()))
        .collect();
    assert_eq!(months, vec![(2020, 1), (2020, 4), (2020, 7), (2020, 10)]);
}

#[test]
fn test_arima_monthly_dates_clamp_to_month_end() {
    let mut model = ArimaForecaster::default();
    model.load(monthly(48));
    model.train().unwrap();
    let forecast = model.predict_future(2).unwrap();

    // last observation is 2022-12-31
    assert_eq!(forecast.rows()[0].timestamp, NaiveDate::from_ymd_opt(2023, 1, 31).unwrap());
    assert_eq!(forecast.rows()[1].timestamp, NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
}

#[test]
fn test_arima_explicit_frequency() {
    let mut model = ArimaForecaster::new(ArimaOrder::new(1, 1, 0)).with_frequency(Frequency::Weekly);
    model.load(monthly(24));
    model.train().unwrap();
    let forecast = model.predict_future(2).unwrap();
    let gap = forecast.rows()[1].timestamp - forecast.rows()[0].timestamp;
    assert_eq!(gap.num_days(), 7);
}

#[rstest]
#[case(ModelSpec::default())]
#[case(ModelSpec::Autoregressive { order: ArimaOrder::default() })]
fn test_predict_before_train_is_lifecycle_error(#[case] spec: ModelSpec) {
    let mut model = AnyForecaster::from_spec(&spec);
    let err = model.predict_default().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lifecycle);

    model.load(monthly(36));
    let err = model.predict_default().unwrap_err();
    assert!(matches!(err, ForecastError::NotTrained));

    let err = model.plot_chart(1.0, "Data", "Wartość").unwrap_err();
    assert!(matches!(err, ForecastError::NoForecast));
}

#[rstest]
#[case(ModelSpec::default(), 365)]
#[case(ModelSpec::Autoregressive { order: ArimaOrder::default() }, 12)]
fn test_any_forecaster_full_lifecycle(#[case] spec: ModelSpec, #[case] horizon: usize) {
    let mut model = AnyForecaster::from_spec(&spec);
    assert_eq!(spec.default_horizon(), horizon);

    model.load(monthly(48));
    model.train_default().unwrap();
    assert_eq!(model.stage(), Stage::Trained);
    model.predict_default().unwrap();
    assert_eq!(model.stage(), Stage::Predicted);

    let chart = model.plot_chart(0.5, "Data", "Wartość").unwrap();
    assert!(!chart.bands.is_empty());
    assert!(model.forecast().unwrap().len() >= 12);
}

#[test]
fn test_default_arima_forecasts_smallest_valid_dataset() {
    let dataset = quarterly(10);
    assert_eq!(dataset.len(), DatasetBuilder::new().required());

    let mut model = ArimaForecaster::default();
    model.load(dataset);
    model.train().unwrap();
    let forecast = model.predict_future(12).unwrap();
    assert_eq!(forecast.len(), 12);
}

#[test]
fn test_integrated_arima_forecast_is_flat_without_ar_terms() {
    let dataset = quarterly(20);
    let last = dataset.last().value;

    let mut model = ArimaForecaster::new(ArimaOrder::new(0, 1, 0));
    model.load(dataset);
    model.train().unwrap();
    let forecast = model.predict_future(12).unwrap();
    for row in forecast.rows() {
        assert_relative_eq!(row.point_estimate, last, epsilon = 1e-9);
    }
}
