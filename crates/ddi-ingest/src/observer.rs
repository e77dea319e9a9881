//! Progress notifications
//!
//! Observers are a side channel: the ingestor never reads anything back from
//! them, so they cannot change the outcome of a run.

use std::path::Path;
use std::time::Duration;

/// Something that happened during a run
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent<'a> {
    /// A source file was opened
    FileStarted {
        /// Source file
        path: &'a Path,
    },
    /// A source file was absent and skipped
    FileSkipped {
        /// Source file
        path: &'a Path,
        /// Why the file was skipped
        reason: &'a str,
    },
    /// A row could not become a record
    RowRejected {
        /// Source file
        path: &'a Path,
        /// 1-based file line the row starts on
        line: u64,
        /// Why the row was rejected
        reason: &'a str,
    },
    /// A batch was persisted
    BatchFlushed {
        /// Records in this batch
        size: usize,
        /// Records persisted so far in the run
        total: u64,
    },
    /// A flush was rejected for quota and will be retried after `delay`
    QuotaBackoff {
        /// Failed attempt number
        attempt: u32,
        /// Wait before the retry
        delay: Duration,
        /// Backend error text
        message: &'a str,
    },
    /// A source file was read to the end
    FileFinished {
        /// Source file
        path: &'a Path,
        /// Records accepted from the file
        records: u64,
        /// Rows rejected from the file
        rejected: u64,
    },
}

/// Receiver of [`ProgressEvent`]s
pub trait ProgressObserver {
    /// Handle one event
    fn on_event(&mut self, event: &ProgressEvent<'_>);
}

/// Observer that writes events to the `tracing` log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn on_event(&mut self, event: &ProgressEvent<'_>) {
        match event {
            ProgressEvent::FileStarted { path } => {
                tracing::info!("Processing {}", path.display());
            }
            ProgressEvent::FileSkipped { path, reason } => {
                tracing::warn!("Skipping {}: {}", path.display(), reason);
            }
            ProgressEvent::RowRejected { path, line, reason } => {
                tracing::warn!("Rejected {} line {}: {}", path.display(), line, reason);
            }
            ProgressEvent::BatchFlushed { size, total } => {
                tracing::info!("Flushed {} records ({} total)", size, total);
            }
            ProgressEvent::QuotaBackoff { attempt, delay, message } => {
                tracing::warn!(
                    "Quota exceeded on attempt {}, retrying in {:?}: {}",
                    attempt,
                    delay,
                    message
                );
            }
            ProgressEvent::FileFinished { path, records, rejected } => {
                tracing::info!(
                    "Finished {}: {} records, {} rejected",
                    path.display(),
                    records,
                    rejected
                );
            }
        }
    }
}
