//! CLI definitions.

pub mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use techchart_config::{load_config, AppConfig};

#[derive(Parser)]
#[command(name = "techchart")]
#[command(author, version, about = "Technical-indicator computation engine for OHLCV series")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", env = "TECHCHART_CONFIG")]
    pub config: PathBuf,

    /// Log level (defaults to the configured level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Level from the command line, else the given fallback.
    pub fn log_level_or<'a>(&self, fallback: &'a str) -> &'a str {
        match self.log_level {
            Some(LogLevel::Trace) => "trace",
            Some(LogLevel::Debug) => "debug",
            Some(LogLevel::Info) => "info",
            Some(LogLevel::Warn) => "warn",
            Some(LogLevel::Error) => "error",
            None => fallback,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute indicators over a CSV file
    Compute(ComputeArgs),
    /// List available indicators
    Indicators(IndicatorsArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct ComputeArgs {
    /// Data file (CSV with Date, Open, High, Low, Close, Volume)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Symbol name (defaults to the file name)
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// Indicator keys (comma-separated); defaults to the configured list
    #[arg(short, long, value_delimiter = ',')]
    pub indicators: Vec<String>,

    /// Parameter override as key.param=value (repeatable)
    #[arg(long = "set", value_name = "KEY.PARAM=VALUE")]
    pub overrides: Vec<String>,

    /// Number of recent rows to project
    #[arg(long)]
    pub rows: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Save the JSON projection to a file
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct IndicatorsArgs {
    /// Only list one category (trend, oscillator, volume, other)
    #[arg(long)]
    pub category: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Load the configuration file, or defaults when it does not exist.
pub fn load_app_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    load_config(path).with_context(|| format!("Failed to load configuration from {}", path.display()))
}
