//! Technical-indicator computation CLI.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use techchart_monitor::setup_logging_with_file;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Validation reports problems itself, so it must not fail on a bad file first
    if let Commands::ValidateConfig = cli.command {
        setup_logging_with_file(cli.log_level_or("info"), cli.json_logs, None);
        return cli::commands::validate::run(&cli.config);
    }

    let config = cli::load_app_config(&cli.config)?;

    let log_file = config.logging.file.as_deref().map(std::path::Path::new);
    let _guard = setup_logging_with_file(
        cli.log_level_or(&config.logging.level),
        cli.json_logs || config.logging.is_json(),
        log_file,
    );

    match cli.command {
        Commands::Compute(args) => cli::commands::compute::run(args, &config),
        Commands::Indicators(args) => cli::commands::indicators::run(args),
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config),
    }
}
