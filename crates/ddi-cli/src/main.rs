//! ddi-import - Load DDInter drug-drug interaction CSV files into SQLite,
//! Firestore or MongoDB.

use anyhow::Context;
use clap::Parser;
use ddi_cli::commands;
use ddi_cli::{Cli, Command, Config, Formatter};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Debug rendering includes the cause chain and, with
            // RUST_BACKTRACE set, a backtrace.
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let formatter = Formatter::new(!cli.no_color);

    match cli.command {
        Command::Import(args) => {
            let backend = args.target.backend;
            commands::execute_import(args, &config, &formatter)
                .await
                .with_context(|| format!("Import into {} failed", backend))?;
        }
        Command::Ping(args) => {
            commands::execute_ping(args, &config, &formatter).await?;
        }
        Command::Status(args) => {
            let backend = args.target.backend;
            commands::execute_status(args, &config, &formatter)
                .await
                .with_context(|| format!("Cannot read status of {}", backend))?;
        }
    }

    Ok(())
}
