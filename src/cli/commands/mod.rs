//! CLI command implementations.

pub mod compute;
pub mod indicators;
pub mod validate;
