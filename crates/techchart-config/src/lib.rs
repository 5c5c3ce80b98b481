//! Configuration management.

mod settings;

pub use settings::{AppConfig, AppSettings, EngineSettings, LoggingConfig};

use config::{Config, ConfigError, Environment, File, FileFormat};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or checking configuration.
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error(transparent)]
    Source(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Load configuration from file and environment.
///
/// Environment variables use the `TECHCHART` prefix with `__` separating
/// sections, e.g. `TECHCHART__ENGINE__PROJECTION_ROWS=100`.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigLoadError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(environment())
        .build()?;

    let app: AppConfig = config.try_deserialize()?;
    validate(&app)?;
    Ok(app)
}

/// Load configuration from a TOML string plus environment.
pub fn load_config_str(toml: &str) -> Result<AppConfig, ConfigLoadError> {
    let config = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .add_source(environment())
        .build()?;

    let app: AppConfig = config.try_deserialize()?;
    validate(&app)?;
    Ok(app)
}

fn environment() -> Environment {
    Environment::with_prefix("TECHCHART")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Check values serde cannot constrain.
pub fn validate(config: &AppConfig) -> Result<(), ConfigLoadError> {
    if config.engine.projection_rows == 0 {
        return Err(ConfigLoadError::Invalid(
            "engine.projection_rows must be at least 1".to_string(),
        ));
    }
    let format = config.logging.format.to_ascii_lowercase();
    if format != "pretty" && format != "json" {
        return Err(ConfigLoadError::Invalid(format!(
            "logging.format must be 'pretty' or 'json', got '{}'",
            config.logging.format
        )));
    }
    Ok(())
}

/// Render a configuration as TOML.
pub fn to_toml(config: &AppConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}
