//! Core types and traits for the indicator engine.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BaseSeries) and base series validation
//! - Derived column containers and indicator parameter values
//! - The error taxonomy shared by every layer
//! - Core traits for indicator algorithms

pub mod error;
pub mod traits;
pub mod types;
pub mod validation;

pub use error::{
    DataError, EngineError, EngineResult, IndicatorError, InvalidInputError,
    UnknownIndicatorKeyError,
};
pub use traits::*;
pub use types::*;
pub use validation::validate_bars;
