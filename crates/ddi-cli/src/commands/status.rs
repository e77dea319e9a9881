//! Status command implementation.

use crate::backend;
use crate::cli::{Backend, StatusArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use ddi_domain::{InteractionRecord, StoreInspector};

/// Record count and a few samples from a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    /// Records in the interactions table / collection
    pub count: u64,
    /// First stored records
    pub samples: Vec<InteractionRecord>,
}

/// Execute the status command.
pub async fn execute_status(args: StatusArgs, config: &Config, formatter: &Formatter) -> Result<StoreStatus> {
    let target = &args.target;
    let status = match target.backend {
        Backend::Sqlite => inspect(&mut backend::sqlite(config, target)?, args.limit).await?,
        Backend::Mongodb => inspect(&mut backend::mongodb(config, target).await?, args.limit).await?,
        Backend::Firestore => inspect(&mut backend::firestore(config, target)?, args.limit).await?,
    };

    if status.count == 0 {
        println!("{}", formatter.warning(&format!("No interactions stored in {}", target.backend)));
    } else {
        println!(
            "{}",
            formatter.info(&format!("{} interactions stored in {}", status.count, target.backend))
        );
        println!("{}", formatter.format_samples(&status.samples));
    }
    Ok(status)
}

async fn inspect<S: StoreInspector>(store: &mut S, limit: usize) -> std::result::Result<StoreStatus, S::Error> {
    let count = store.count().await?;
    let samples = if count == 0 { Vec::new() } else { store.sample(limit).await? };
    Ok(StoreStatus { count, samples })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use ddi_domain::StoreAdapter;
    use ddi_store::SqliteStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_status_sqlite() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("ddi.db");
        {
            let mut store = SqliteStore::new(&db).unwrap();
            let records: Vec<_> = ["A", "B", "C", "D"]
                .iter()
                .map(|d| InteractionRecord::new(*d, "Aspirin", "Minor").unwrap())
                .collect();
            store.bulk_write(&records).await.unwrap();
        }

        let cli = Cli::try_parse_from(["ddi-import", "status", "-b", "sqlite", "--sqlite-path", db.to_str().unwrap()])
            .unwrap();
        let Command::Status(args) = cli.command else {
            panic!("Expected Status command");
        };

        let status = execute_status(args, &Config::default(), &Formatter::new(false)).await.unwrap();
        assert_eq!(status.count, 4);
        assert_eq!(status.samples.len(), 3);
        assert_eq!(status.samples[0].drug_a, "A");
    }

    #[tokio::test]
    async fn test_status_empty_store() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let status = inspect(&mut store, 3).await.unwrap();
        assert_eq!(status.count, 0);
        assert!(status.samples.is_empty());
    }
}
