//! Error types for ingestion runs

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an ingestion run
///
/// Store failures report how many records earlier flushes had already
/// persisted; those records stay in the store.
#[derive(Error, Debug)]
pub enum IngestError {
    /// A flush was rejected for quota twice in a row
    #[error("Quota still exceeded after retry ({persisted} records persisted): {message}")]
    QuotaExhausted {
        /// Records persisted before the failed flush
        persisted: u64,
        /// Backend error text
        message: String,
    },

    /// A flush failed for a reason other than quota
    #[error("Store error ({persisted} records persisted): {message}")]
    Store {
        /// Records persisted before the failed flush
        persisted: u64,
        /// Backend error text
        message: String,
    },

    /// A source file could not be opened or read
    #[error("Cannot read {}: {message}", path.display())]
    Source {
        /// File being read
        path: PathBuf,
        /// I/O or CSV error text
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IngestError {
    /// Records already persisted when a store failure aborted the run
    pub fn persisted(&self) -> Option<u64> {
        match self {
            IngestError::QuotaExhausted { persisted, .. } | IngestError::Store { persisted, .. } => {
                Some(*persisted)
            }
            IngestError::Source { .. } | IngestError::Config(_) => None,
        }
    }
}
