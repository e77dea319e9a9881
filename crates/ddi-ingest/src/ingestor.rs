//! Sequential batched ingestion

use crate::retry::{with_retry, RetryPolicy};
use crate::source::{CsvSource, RowOutcome};
use crate::{
    FileOutcome, FileReport, IngestConfig, IngestError, IngestReport, ProgressEvent,
    ProgressObserver, TracingObserver,
};
use ddi_domain::{InteractionRecord, StoreAdapter, StoreFailure};
use std::io;
use std::path::Path;

/// Streams CSV files into a store in fixed-size batches
///
/// One file is read at a time and one batch is written at a time. The batch
/// buffer carries over file boundaries; only the end of the run forces a
/// partial batch.
///
/// # Examples
///
/// ```no_run
/// use ddi_ingest::{IngestConfig, Ingestor};
/// use ddi_store::SqliteStore;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = SqliteStore::new("drug_interactions.db")?;
/// let mut ingestor = Ingestor::with_tracing(IngestConfig::sqlite());
///
/// let report = ingestor
///     .ingest_all(&["ddinterpy/ddinter_downloads_code_A.csv"], &mut store)
///     .await?;
/// println!("{}", report.summary());
/// # Ok(())
/// # }
/// ```
pub struct Ingestor<O = TracingObserver> {
    config: IngestConfig,
    observer: O,
}

impl Ingestor<TracingObserver> {
    /// Create an Ingestor that reports progress through `tracing`
    pub fn with_tracing(config: IngestConfig) -> Self {
        Self::new(config, TracingObserver)
    }
}

impl<O: ProgressObserver> Ingestor<O> {
    /// Create a new Ingestor with the given configuration and observer
    pub fn new(config: IngestConfig, observer: O) -> Self {
        Self { config, observer }
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Consume the ingestor, returning its observer
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Ingest every file in order, then flush whatever remains buffered
    ///
    /// Missing files are skipped and malformed rows rejected; both are
    /// recorded in the report. Any other failure aborts the run. Records from
    /// earlier flushes stay persisted and are counted in the error.
    pub async fn ingest_all<S, P>(&mut self, files: &[P], store: &mut S) -> Result<IngestReport, IngestError>
    where
        S: StoreAdapter,
        P: AsRef<Path>,
    {
        self.config.validate_for(store.max_batch_size())?;
        tracing::info!(
            "Ingesting {} files into {} (batch size {})",
            files.len(),
            store.name(),
            self.config.batch_size
        );

        let mut buffer = Vec::with_capacity(self.config.batch_size);
        let mut report = IngestReport::default();

        for path in files {
            let file = self.ingest_file(path.as_ref(), store, &mut buffer, &mut report).await?;
            report.files.push(file);
        }

        if !buffer.is_empty() {
            self.flush(store, &mut buffer, &mut report).await?;
        }

        tracing::info!("{}", report.summary());
        Ok(report)
    }

    async fn ingest_file<S: StoreAdapter>(
        &mut self,
        path: &Path,
        store: &mut S,
        buffer: &mut Vec<InteractionRecord>,
        report: &mut IngestReport,
    ) -> Result<FileReport, IngestError> {
        let source = match CsvSource::open(path) {
            Ok(source) => source,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let reason = format!("file not found: {}", e);
                self.observer.on_event(&ProgressEvent::FileSkipped { path, reason: &reason });
                return Ok(FileReport {
                    path: path.to_path_buf(),
                    outcome: FileOutcome::Skipped { reason },
                });
            }
            Err(e) => {
                return Err(IngestError::Source {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };

        self.observer.on_event(&ProgressEvent::FileStarted { path });
        let (mut records, mut rejected) = (0u64, 0u64);

        for row in source {
            match row? {
                RowOutcome::Record(record) => {
                    buffer.push(record);
                    records += 1;
                    if buffer.len() >= self.config.batch_size {
                        self.flush(store, buffer, report).await?;
                        self.throttle(store).await;
                    }
                }
                RowOutcome::Rejected { line, reason } => {
                    self.observer.on_event(&ProgressEvent::RowRejected {
                        path,
                        line,
                        reason: &reason,
                    });
                    rejected += 1;
                }
            }
        }

        report.rejected += rejected;
        self.observer.on_event(&ProgressEvent::FileFinished {
            path,
            records,
            rejected,
        });
        Ok(FileReport {
            path: path.to_path_buf(),
            outcome: FileOutcome::Ingested { records, rejected },
        })
    }

    /// Write the buffer as one batch, retrying once on quota
    async fn flush<S: StoreAdapter>(
        &mut self,
        store: &mut S,
        buffer: &mut Vec<InteractionRecord>,
        report: &mut IngestReport,
    ) -> Result<(), IngestError> {
        let policy = RetryPolicy::once_after(self.config.quota_retry_delay());
        let observer = &mut self.observer;
        let batch = buffer.as_slice();

        let result = with_retry(
            policy,
            |e: &S::Error| e.is_quota_exceeded(),
            |attempt, e| {
                observer.on_event(&ProgressEvent::QuotaBackoff {
                    attempt,
                    delay: policy.delay,
                    message: &e.to_string(),
                })
            },
            async || store.bulk_write(batch).await,
        )
        .await;

        match result {
            Ok(written) => {
                let size = batch.len();
                if written.written != size {
                    tracing::warn!(
                        "{} acknowledged {} of {} records",
                        store.name(),
                        written.written,
                        size
                    );
                }
                report.total += written.written as u64;
                report.flushes += 1;
                self.observer.on_event(&ProgressEvent::BatchFlushed {
                    size,
                    total: report.total,
                });
                buffer.clear();
                Ok(())
            }
            Err(e) if e.is_quota_exceeded() => Err(IngestError::QuotaExhausted {
                persisted: report.total,
                message: e.to_string(),
            }),
            Err(e) => Err(IngestError::Store {
                persisted: report.total,
                message: e.to_string(),
            }),
        }
    }

    /// Pause between batches on stores whose quota counts requests
    async fn throttle<S: StoreAdapter>(&self, store: &S) {
        let delay = self.config.inter_batch_delay();
        if store.is_request_bound() && !delay.is_zero() {
            tracing::debug!("Waiting {:?} before next batch", delay);
            tokio::time::sleep(delay).await;
        }
    }
}
