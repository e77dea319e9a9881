//! DDI Loader Domain Layer
//!
//! Core types shared by every backend and by the ingestor. This crate has
//! ZERO external dependencies and defines the record model, row
//! normalization rules and the trait interfaces the storage layer implements.
//!
//! ## Key Concepts
//!
//! - **InteractionRecord**: one normalized drug-drug interaction derived from a CSV row
//! - **IndexField**: the lookup fields every backend indexes (`Drug_A`, `Drug_B`, `Level`)
//! - **StoreAdapter**: the `create_indexes` / `bulk_write` capability of a backend
//! - **StoreFailure**: how a backend error tells the ingestor it was rate limited
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Infrastructure implementations live in `ddi-store`
//! - The batching procedure lives in `ddi-ingest`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod index;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use index::IndexField;
pub use record::{columns, InteractionRecord, RecordError};
pub use traits::{StoreAdapter, StoreFailure, StoreInspector, WriteResult};
