//! a11ylens CLI -- one-shot accessibility scans of source trees and live flows

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use a11ylens_core::config::GeneralConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let loaded = commands::load_config(&cli.config).await;

    let general = loaded
        .as_ref()
        .map(|config| config.general.clone())
        .unwrap_or_else(|_| GeneralConfig::default());
    if let Err(e) = logging::init_tracing(&general, cli.log_level.as_deref()) {
        eprintln!("error: failed to initialize logging: {e:#}");
        std::process::exit(CliError::Config(e.to_string()).exit_code());
    }

    a11ylens_core::metrics::describe_all();
    tracing::debug!(config = %cli.config.display(), "a11ylens starting");

    let writer = OutputWriter::new(cli.output);
    let result = match cli.command {
        Commands::Config(args) => commands::config::execute(args, &cli.config, loaded, &writer),
        Commands::Scan(args) => match loaded {
            Ok(config) => commands::scan::execute(args, &config, &writer).await,
            Err(e) => Err(e.into()),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}
