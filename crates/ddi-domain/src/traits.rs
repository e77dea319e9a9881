//! Trait definitions for external interactions
//!
//! These traits define the boundary between the ingestion procedure and the
//! persistence backends. Implementations live in `ddi-store`.
//!
//! The traits use `async fn` directly. The loader drives one store from one
//! task and never needs the futures to be `Send`.

#![allow(async_fn_in_trait)]

use crate::{IndexField, InteractionRecord};

/// Outcome of a successful bulk write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteResult {
    /// Number of records the backend acknowledged
    pub written: usize,
}

/// Classification a backend error must expose to the ingestor
pub trait StoreFailure {
    /// True when the backend rejected the call because a request or write
    /// rate quota was exceeded. Only these errors are retried.
    fn is_quota_exceeded(&self) -> bool;
}

/// Trait for writing interaction records to a destination store
///
/// Implemented by the infrastructure layer (ddi-store)
pub trait StoreAdapter {
    /// Error type for store operations
    type Error: StoreFailure + std::error::Error;

    /// Short backend name for logs and reports
    fn name(&self) -> &'static str;

    /// Whether the backend's quota counts requests, in which case the
    /// ingestor throttles between flushes
    fn is_request_bound(&self) -> bool;

    /// Largest batch a single `bulk_write` accepts, if the backend caps it
    fn max_batch_size(&self) -> Option<usize> {
        None
    }

    /// Build lookup indexes on the given fields
    ///
    /// Must be idempotent: calling it again with indexes already in place is
    /// a no-op, not an error.
    async fn create_indexes(&mut self, fields: &[IndexField]) -> Result<(), Self::Error>;

    /// Persist one batch of records
    ///
    /// Atomicity across the batch is backend specific. Callers treat the call
    /// as succeed-or-raise.
    async fn bulk_write(&mut self, records: &[InteractionRecord]) -> Result<WriteResult, Self::Error>;
}

/// Read-side diagnostics used by connection checks and status reports
pub trait StoreInspector: StoreAdapter {
    /// Verify the backend is reachable and the credentials work
    async fn ping(&mut self) -> Result<(), Self::Error>;

    /// Number of records in the interactions table / collection
    async fn count(&mut self) -> Result<u64, Self::Error>;

    /// Up to `limit` stored records, in backend order
    async fn sample(&mut self, limit: usize) -> Result<Vec<InteractionRecord>, Self::Error>;
}
