//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A backend could not be reached or authenticated against
    #[error("Cannot connect to {backend}: {message}")]
    Connection {
        /// Backend name
        backend: &'static str,
        /// Underlying failure
        message: String,
    },

    /// Store error
    #[error(transparent)]
    Store(#[from] ddi_store::StoreError),

    /// Ingestion error
    #[error(transparent)]
    Ingest(#[from] ddi_ingest::IngestError),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}
