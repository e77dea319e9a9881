//! Ping command implementation.

use crate::backend;
use crate::cli::{Backend, TargetArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use ddi_domain::StoreInspector;

/// Execute the ping command.
///
/// On failure, prints remediation steps before returning the error.
pub async fn execute_ping(args: TargetArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let backend = args.backend;
    match ping(&args, config).await {
        Ok(()) => {
            println!("{}", formatter.success(&format!("Connected to {}", backend)));
            Ok(())
        }
        Err(e) => {
            backend::report_unreachable(backend, formatter);
            Err(CliError::Connection {
                backend: backend.as_str(),
                message: e.to_string(),
            })
        }
    }
}

async fn ping(args: &TargetArgs, config: &Config) -> Result<()> {
    match args.backend {
        Backend::Sqlite => backend::sqlite(config, args)?.ping().await?,
        Backend::Mongodb => backend::mongodb(config, args).await?.ping().await?,
        Backend::Firestore => backend::firestore(config, args)?.ping().await?,
    }
    Ok(())
}
