use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};
use config::ConfigFile;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let base = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let resolve = |layer: ConfigFile| -> Result<ConfigFile> {
        let config = base.clone().merged(layer);
        debug!(config = %serde_json::to_string(&config)?, "resolved configuration");
        Ok(config)
    };

    match cli.command {
        Commands::Single {
            snapshot,
            csv,
            list,
        } => commands::single::run(&resolve(snapshot.as_config())?, &csv, list),
        Commands::Filter {
            snapshot,
            csv,
            filters,
        } => commands::filter::run(&resolve(snapshot.as_config())?, &csv, &filters),
        Commands::Batch {
            snapshot,
            series,
            csv,
            filters,
            box_speed,
            box_delay,
        } => {
            let config = resolve(snapshot.as_config().merged(series.as_config()))?;
            commands::batch::run(&config, &csv, &filters, box_speed, box_delay)
        }
        Commands::StressInfo { snapshot, particle } => {
            commands::stress_info::run(&resolve(snapshot.as_config())?, particle)
        }
    }
}
