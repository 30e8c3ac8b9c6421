use forecast_core::error::{ErrorKind, ForecastError};
use series_math::MathError;
use std::io;

#[test]
fn test_error_conversion() {
    // IO error conversion
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let forecast_error = ForecastError::from(io_error);
    assert!(matches!(forecast_error, ForecastError::IoError(_)));
    assert_eq!(forecast_error.kind(), ErrorKind::Io);

    // Numeric kernel errors
    let math_error = MathError::CalculationError("singular".to_string());
    let forecast_error = ForecastError::from(math_error);
    assert!(matches!(forecast_error, ForecastError::Math(_)));
    assert_eq!(forecast_error.kind(), ErrorKind::ModelFit);

    // JSON errors
    let json_error = serde_json::from_str::<u32>("nope").unwrap_err();
    assert!(matches!(ForecastError::from(json_error), ForecastError::Json(_)));
}

#[test]
fn test_error_display() {
    let error = ForecastError::InvalidParameter("confidence_reduction must be non-negative".to_string());
    assert!(error.to_string().contains("confidence_reduction must be non-negative"));

    let error = ForecastError::InsufficientData {
        required: 10,
        available: 3,
    };
    let text = error.to_string();
    assert!(text.contains("insufficient data"));
    assert!(text.contains("10"));
    assert!(text.contains('3'));

    let error = ForecastError::MissingColumn("ROE".to_string());
    assert_eq!(error.to_string(), "Missing column: ROE");
}

#[test]
fn test_lifecycle_errors_are_distinct() {
    let errors = [
        ForecastError::NotLoaded,
        ForecastError::NotTrained,
        ForecastError::NoForecast,
    ];
    for error in &errors {
        assert!(error.is_lifecycle());
        assert_eq!(error.kind(), ErrorKind::Lifecycle);
    }
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert_ne!(messages[0], messages[1]);
    assert_ne!(messages[1], messages[2]);
}

#[test]
fn test_error_kinds() {
    assert_eq!(ForecastError::DataError("x".into()).kind(), ErrorKind::Data);
    assert_eq!(ForecastError::MissingColumn("x".into()).kind(), ErrorKind::Data);
    assert_eq!(ForecastError::ModelFit("x".into()).kind(), ErrorKind::ModelFit);
    assert_eq!(ForecastError::InvalidParameter("x".into()).kind(), ErrorKind::Parameter);
    assert!(!ForecastError::ModelFit("x".into()).is_lifecycle());
}
