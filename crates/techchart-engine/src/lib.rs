//! Indicator computation engine.
//!
//! The [`Orchestrator`] runs a [`ComputationRequest`] against a base series
//! and returns a [`ComputationResult`]: the augmented dataset, column labels,
//! per-indicator failures and a chart layout. The [`Projector`] turns a result
//! into a bounded, row-oriented view for downstream consumers.

mod dataset;
mod orchestrator;
mod projector;
mod request;
mod result;

pub use dataset::{AugmentedDataset, DatasetBuilder};
pub use orchestrator::Orchestrator;
pub use projector::{
    format_value, latest_values, Cell, Projection, Projector, Row, DEFAULT_PROJECTION_ROWS,
};
pub use request::ComputationRequest;
pub use result::{
    ChartLayout, ColumnLabel, ColumnLabelMap, ComputationResult, FailureRecord,
    ResolvedIndicator, SubplotGroup,
};
