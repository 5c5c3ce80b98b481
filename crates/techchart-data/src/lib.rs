//! Bar loading for the application shell.

mod csv_source;

pub use csv_source::{parse_timestamp, read_bars_from, CsvDataSource};
