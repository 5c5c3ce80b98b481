//! Declarative indicator catalog.
//!
//! Every indicator is described by an [`IndicatorDefinition`]: a key, a label,
//! a parameter schema, a chart placement and two function pointers, one that
//! computes derived columns and one that names them. The [`IndicatorRegistry`]
//! indexes the built-in catalog by key.

mod catalog;
mod definition;
mod registry;

pub use catalog::builtin_definitions;
pub use definition::{
    Category, ColumnsFn, ComputeFn, IndicatorDefinition, IndicatorInfo, ParamKind, ParamSpec,
    Placement,
};
pub use registry::IndicatorRegistry;
