//! Import command implementation.

use crate::backend;
use crate::cli::{Backend, ImportArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::{ConsoleObserver, Formatter};
use ddi_domain::{IndexField, StoreAdapter};
use ddi_ingest::{IngestConfig, IngestReport, Ingestor};
use ddi_store::StoreError;
use std::path::PathBuf;

/// Execute the import command.
pub async fn execute_import(args: ImportArgs, config: &Config, formatter: &Formatter) -> Result<IngestReport> {
    let files = config.source_files(args.dir.as_deref(), &args.files);
    let ingest = ingest_config(&args, config);
    let target = &args.target;

    println!(
        "{}",
        formatter.info(&format!(
            "Importing {} files into {} (batch size {})",
            files.len(),
            target.backend,
            ingest.batch_size
        ))
    );

    let report = match target.backend {
        Backend::Sqlite => {
            let mut store = backend::sqlite(config, target)?;
            import_into(&mut store, target.backend, &files, ingest, formatter).await?
        }
        Backend::Mongodb => {
            let mut store = backend::mongodb(config, target).await?;
            import_into(&mut store, target.backend, &files, ingest, formatter).await?
        }
        Backend::Firestore => {
            let mut store = backend::firestore(config, target)?;
            import_into(&mut store, target.backend, &files, ingest, formatter).await?
        }
    };

    println!("{}", formatter.format_report(&report));
    Ok(report)
}

/// Preset, then config file, then command line.
fn ingest_config(args: &ImportArgs, config: &Config) -> IngestConfig {
    let base = config.ingest_config(args.target.backend);
    IngestConfig {
        batch_size: args.batch_size.unwrap_or(base.batch_size),
        inter_batch_delay_ms: args.inter_batch_delay_ms.unwrap_or(base.inter_batch_delay_ms),
        quota_retry_delay_ms: args.quota_retry_delay_ms.unwrap_or(base.quota_retry_delay_ms),
    }
}

/// Build the indexes, then ingest every file.
///
/// An unreachable backend shows up on the first request, so a connection
/// failure while building indexes is reported with remediation steps.
async fn import_into<S>(
    store: &mut S,
    backend: Backend,
    files: &[PathBuf],
    config: IngestConfig,
    formatter: &Formatter,
) -> Result<IngestReport>
where
    S: StoreAdapter<Error = StoreError>,
{
    if let Err(e) = store.create_indexes(&IndexField::ALL).await {
        return Err(match e {
            StoreError::Connection(message) => {
                backend::report_unreachable(backend, formatter);
                CliError::Connection {
                    backend: backend.as_str(),
                    message,
                }
            }
            other => other.into(),
        });
    }

    let mut ingestor = Ingestor::new(config, ConsoleObserver::new(*formatter));
    Ok(ingestor.ingest_all(files, store).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use ddi_domain::{InteractionRecord, StoreInspector, WriteResult};
    use ddi_store::SqliteStore;
    use std::fs;
    use tempfile::TempDir;

    fn import_args(args: &[&str]) -> ImportArgs {
        match Cli::try_parse_from(args.iter().copied()).unwrap().command {
            Command::Import(args) => args,
            _ => panic!("Expected Import command"),
        }
    }

    /// A store whose server never answers
    struct UnreachableStore {
        writes: usize,
    }

    impl StoreAdapter for UnreachableStore {
        type Error = StoreError;

        fn name(&self) -> &'static str {
            "unreachable"
        }

        fn is_request_bound(&self) -> bool {
            false
        }

        async fn create_indexes(&mut self, _fields: &[IndexField]) -> std::result::Result<(), StoreError> {
            Err(StoreError::Connection("Server selection timeout: no available servers".into()))
        }

        async fn bulk_write(
            &mut self,
            records: &[InteractionRecord],
        ) -> std::result::Result<WriteResult, StoreError> {
            self.writes += records.len();
            Ok(WriteResult { written: records.len() })
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_connection_error() {
        let mut store = UnreachableStore { writes: 0 };
        let result = import_into(
            &mut store,
            Backend::Mongodb,
            &[PathBuf::from("a.csv")],
            IngestConfig::mongodb(),
            &Formatter::new(false),
        )
        .await;

        match result {
            Err(CliError::Connection { backend, message }) => {
                assert_eq!(backend, "mongodb");
                assert!(message.contains("Server selection timeout"));
            }
            other => panic!("Expected connection error, got {:?}", other.map(|r| r.total)),
        }
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn test_command_line_overrides_config_file() {
        let mut config = Config::default();
        config.ingest.firestore.batch_size = Some(400);
        config.ingest.firestore.quota_retry_delay_ms = Some(5000);

        let args = import_args(&["ddi-import", "import", "-b", "firestore", "--batch-size", "200"]);
        let ingest = ingest_config(&args, &config);

        assert_eq!(ingest.batch_size, 200);
        assert_eq!(ingest.quota_retry_delay_ms, 5000);
        assert_eq!(ingest.inter_batch_delay_ms, 1000);
    }

    #[tokio::test]
    async fn test_import_into_sqlite() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.csv"),
            "DDInterID_A,Drug_A,DDInterID_B,Drug_B,Level\n\
             DDInter1263,Naltrexone,DDInter1,Abacavir,Moderate\n\
             DDInter1,Abacavir,,Aspirin,Minor\n",
        )
        .unwrap();
        let db = dir.path().join("ddi.db");
        let dir_arg = dir.path().to_str().unwrap();
        let db_arg = db.to_str().unwrap();

        let args = import_args(&[
            "ddi-import", "import", "-b", "sqlite", "--sqlite-path", db_arg, "--dir", dir_arg,
            "--file", "a.csv", "--file", "missing.csv",
        ]);
        let report = execute_import(args, &Config::default(), &Formatter::new(false))
            .await
            .unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.skipped().count(), 1);

        let mut store = SqliteStore::new(&db).unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
        assert_eq!(store.index_names().unwrap().len(), 3);
    }
}
