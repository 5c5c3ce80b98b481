//! Core data types for the indicator engine.

mod column;
mod ohlcv;
mod params;

pub use column::{defined, fill_none, Column, DerivedColumns};
pub use ohlcv::{Bar, BaseSeries, BASE_COLUMNS};
pub use params::{ParamValue, Params};
