//! DDI Loader Storage Layer
//!
//! Implements the `StoreAdapter` and `StoreInspector` traits for the three
//! supported destinations.
//!
//! # Backends
//!
//! - [`SqliteStore`]: local embedded database, one `interactions` table
//! - [`FirestoreStore`]: managed document store reached over its REST API
//! - [`MongoStore`]: managed document database reached through the official driver
//!
//! Every backend writes the same record shape (`Drug_A`, `Drug_B`, `Level`,
//! `DDInterID_A`, `DDInterID_B`) into a table or collection named
//! [`INTERACTIONS`].
//!
//! # Examples
//!
//! ```no_run
//! use ddi_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for bulk writes
//! ```

#![warn(missing_docs)]

mod error;
pub mod firestore;
pub mod mongo;
pub mod sqlite;

pub use error::StoreError;
pub use firestore::{FirestoreAuth, FirestoreConfig, FirestoreStore, ServiceAccountKey};
pub use mongo::{MongoConfig, MongoStore};
pub use sqlite::SqliteStore;

/// Table / collection name shared by every backend
pub const INTERACTIONS: &str = "interactions";
