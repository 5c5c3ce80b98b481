//! Compute command implementation.

use anyhow::{bail, Context, Result};
use techchart_config::AppConfig;
use techchart_core::types::{BaseSeries, ParamValue, Params};
use techchart_data::CsvDataSource;
use techchart_engine::{latest_values, ComputationRequest, Orchestrator, Projector};
use tracing::info;

use crate::cli::{ComputeArgs, OutputFormat};

pub fn run(args: ComputeArgs, config: &AppConfig) -> Result<()> {
    let source = CsvDataSource::new(&args.data)
        .with_context(|| format!("Cannot open data file {}", args.data.display()))?;
    let symbol = args.symbol.clone().unwrap_or_else(|| source.default_symbol());
    let bars = source.load().context("Failed to load bars")?;
    let series = BaseSeries::new(symbol, bars).context("Invalid OHLCV series")?;

    let request = build_request(&args, config)?;
    info!(
        symbol = series.symbol(),
        bars = series.len(),
        indicators = request.len(),
        "Starting computation"
    );

    let result = Orchestrator::default().run(&series, &request)?;

    let rows = args.rows.unwrap_or(config.engine.projection_rows);
    let projection = Projector::new(rows).project(&result);

    match args.output {
        OutputFormat::Json => println!("{}", projection.to_json()?),
        OutputFormat::Text => {
            println!("{}", result.summary());
            let columns = result.dataset.column_names();
            println!("LATEST VALUES");
            println!("───────────────────────────────────────────────────────────");
            for (name, value) in latest_values(&result.dataset, &columns) {
                println!("  {:<28} {}", name, value);
            }
        }
    }

    if let Some(save_path) = &args.save {
        std::fs::write(save_path, projection.to_json()?)
            .with_context(|| format!("Failed to write {}", save_path.display()))?;
        info!("Projection saved to {:?}", save_path);
    }

    Ok(())
}

/// Selected keys and overrides: command line first, then configuration.
fn build_request(args: &ComputeArgs, config: &AppConfig) -> Result<ComputationRequest> {
    let keys = if args.indicators.is_empty() {
        config.engine.default_indicators.clone()
    } else {
        args.indicators.iter().map(|k| k.trim().to_string()).collect()
    };
    if keys.is_empty() {
        bail!("No indicators selected; pass --indicators or set engine.default_indicators");
    }

    let mut request = ComputationRequest::new(keys);
    for (key, params) in &config.engine.overrides {
        request.set_override(key.clone(), params.clone());
    }
    for raw in &args.overrides {
        let (key, params) = parse_override(raw)?;
        request.set_override(key, params);
    }
    Ok(request)
}

/// Parse `key.param=value`.
fn parse_override(raw: &str) -> Result<(String, Params)> {
    let (target, value) = raw
        .split_once('=')
        .with_context(|| format!("Override '{}' must look like key.param=value", raw))?;
    let (key, param) = target
        .split_once('.')
        .with_context(|| format!("Override '{}' must name key.param", raw))?;

    let (key, param) = (key.trim(), param.trim());
    if key.is_empty() || param.is_empty() {
        bail!("Override '{}' has an empty key or parameter name", raw);
    }

    let value: ParamValue = match value.parse() {
        Ok(v) => v,
        Err(never) => match never {},
    };
    Ok((key.to_string(), Params::new().with(param, value)))
}
