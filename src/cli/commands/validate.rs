//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use techchart_config::load_config;
use techchart_registry::IndicatorRegistry;

pub fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    // Indicator keys and override parameters must match the catalog
    let registry = IndicatorRegistry::global();
    let mut problems = Vec::new();
    for key in &config.engine.default_indicators {
        if !registry.contains(key) {
            problems.push(format!("unknown indicator '{}' in engine.default_indicators", key));
        }
    }
    for (key, params) in &config.engine.overrides {
        if let Err(e) = registry.resolve_params(key, Some(params)) {
            problems.push(format!("engine.overrides.{}: {}", key, e));
        }
    }

    if !problems.is_empty() {
        for problem in &problems {
            println!("Configuration error: {}", problem);
        }
        anyhow::bail!("{} configuration problem(s) found", problems.len());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Log format: {}", config.logging.format);
    println!("Projection rows: {}", config.engine.projection_rows);
    println!("Default indicators: {}", config.engine.default_indicators.join(", "));
    println!("Overrides: {}", config.engine.overrides.len());

    Ok(())
}
