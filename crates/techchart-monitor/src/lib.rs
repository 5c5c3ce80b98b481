//! Logging for the techchart binary.

mod logging;

pub use logging::{setup_logging, setup_logging_with_file};
pub use tracing_appender::non_blocking::WorkerGuard;
