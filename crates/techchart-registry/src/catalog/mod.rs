//! Built-in indicator catalog.
//!
//! Each family module contributes its definitions in declaration order. A
//! definition pairs a column namer with a compute adapter; adapters always
//! name their output through the namer so the two cannot drift apart.

mod oscillator;
mod other;
mod trend;
mod volume;

use techchart_core::error::IndicatorError;
use techchart_core::types::{Column, DerivedColumns};

use crate::definition::{IndicatorDefinition, ParamSpec};

/// Every built-in definition, in declaration order.
pub fn builtin_definitions() -> Vec<IndicatorDefinition> {
    let mut definitions = trend::definitions();
    definitions.extend(oscillator::definitions());
    definitions.extend(volume::definitions());
    definitions.extend(other::definitions());
    definitions
}

/// Integer window parameter with a lower bound of 1.
fn window(default: i64, max: Option<i64>) -> ParamSpec {
    ParamSpec::int("window", "Window", default, 1, max)
}

/// Pair column names with computed columns.
fn assemble(names: Vec<String>, columns: Vec<Column>) -> Result<DerivedColumns, IndicatorError> {
    if names.len() != columns.len() {
        return Err(IndicatorError::CalculationError(format!(
            "produced {} columns for {} names",
            columns.len(),
            names.len()
        )));
    }
    Ok(names
        .into_iter()
        .zip(columns)
        .fold(DerivedColumns::new(), |acc, (name, column)| acc.with(name, column)))
}

/// Project one field out of per-bar outputs.
fn field<T>(outputs: &[T], f: impl Fn(&T) -> Option<f64>) -> Column {
    outputs.iter().map(f).collect()
}

/// Project one field out of per-bar outputs that may be missing.
fn optional_field<T>(outputs: &[Option<T>], f: impl Fn(&T) -> f64) -> Column {
    outputs.iter().map(|o| o.as_ref().map(&f)).collect()
}
