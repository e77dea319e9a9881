//! DDI Ingest
//!
//! Quota-aware batched ingestion of DDInter drug-drug-interaction CSV files.
//!
//! # Overview
//!
//! The [`Ingestor`] makes a single sequential pass:
//!
//! ```text
//! CSV file -> header-driven row decode -> InteractionRecord -> batch buffer
//!          -> bulk write (retry once on quota) -> next file -> final flush
//! ```
//!
//! - **Missing files** are skipped and reported, never fatal
//! - **Malformed rows** (a required field absent or empty) are rejected,
//!   logged and counted; the rest of the file is still read
//! - **Quota errors** are retried once after `quota_retry_delay_ms`; a second
//!   failure aborts the run
//! - **Request-bound stores** get an `inter_batch_delay_ms` pause after each
//!   full batch
//!
//! # Usage
//!
//! ```no_run
//! use ddi_domain::{IndexField, StoreAdapter};
//! use ddi_ingest::{IngestConfig, Ingestor};
//! use ddi_store::SqliteStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = SqliteStore::new("drug_interactions.db")?;
//! store.create_indexes(&IndexField::ALL).await?;
//!
//! let mut ingestor = Ingestor::with_tracing(IngestConfig::sqlite());
//! let report = ingestor
//!     .ingest_all(&["ddinterpy/ddinter_downloads_code_A.csv"], &mut store)
//!     .await?;
//!
//! println!("Total: {}", report.total);
//! for file in report.skipped() {
//!     println!("Skipped {}", file.path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! Presets match each backend's service limits:
//!
//! | Preset | batch_size | inter_batch_delay_ms | quota_retry_delay_ms |
//! |--------|-----------:|---------------------:|---------------------:|
//! | `firestore()` | 100 | 1000 | 10000 |
//! | `mongodb()` | 1000 | 0 | 10000 |
//! | `sqlite()` | 1000 | 0 | 0 |
//!
//! ```toml
//! [ingest.firestore]
//! batch_size = 100
//! inter_batch_delay_ms = 1000
//! quota_retry_delay_ms = 10000
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod ingestor;
mod observer;
mod report;
pub mod retry;
pub mod source;

pub use config::IngestConfig;
pub use error::IngestError;
pub use ingestor::Ingestor;
pub use observer::{ProgressEvent, ProgressObserver, TracingObserver};
pub use report::{FileOutcome, FileReport, IngestReport};
