//! Error types for the indicator engine.

use thiserror::Error;

/// Top-level engine error.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    #[error(transparent)]
    UnknownIndicator(#[from] UnknownIndicatorKeyError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Shape violations detected while validating a base series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidInputError {
    #[error("Series is empty")]
    EmptySeries,

    #[error("Timestamp at index {index} ({current}) is not after the previous one ({previous})")]
    NonMonotonicTimestamp {
        index: usize,
        previous: i64,
        current: i64,
    },

    #[error("Bar {index} is missing a finite value for '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Bar {index} has negative volume {volume}")]
    NegativeVolume { index: usize, volume: f64 },

    #[error("Bar {index} has high {high} below low {low}")]
    HighBelowLow { index: usize, high: f64, low: f64 },

    #[error("Bar {index} has {field} {value} outside its high/low range")]
    PriceOutsideRange {
        index: usize,
        field: &'static str,
        value: f64,
    },
}

/// Indicator calculation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// A request referenced an indicator key that is not registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown indicator key: {0}")]
pub struct UnknownIndicatorKeyError(pub String);

/// Errors raised while loading bars for the application shell.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("No data available")]
    NoDataAvailable,

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = IndicatorError::InsufficientData {
            required: 20,
            available: 5,
        };
        assert_eq!(err.to_string(), "Insufficient data: need 20 points, have 5");

        let err = UnknownIndicatorKeyError("foo".to_string());
        assert_eq!(err.to_string(), "Unknown indicator key: foo");
    }

    #[test]
    fn test_engine_error_from() {
        let err: EngineError = InvalidInputError::EmptySeries.into();
        assert!(matches!(err, EngineError::InvalidInput(InvalidInputError::EmptySeries)));
    }
}
