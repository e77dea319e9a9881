//! Error types shared by the storage backends

use ddi_domain::StoreFailure;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Embedded database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The backend reported a request or write rate quota violation
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Backend could not be reached (network, DNS, server selection)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Credentials missing, rejected or unusable
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Backend answered with a non-quota error status
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// Document database driver error
    #[error("MongoDB error: {0}")]
    Mongo(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Invalid adapter configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreFailure for StoreError {
    fn is_quota_exceeded(&self) -> bool {
        matches!(self, StoreError::QuotaExceeded(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            StoreError::Connection(e.to_string())
        } else if e.is_decode() {
            StoreError::InvalidData(format!("Unexpected response body: {}", e))
        } else {
            match e.status() {
                Some(status) => StoreError::Api {
                    status: status.as_u16(),
                    message: e.to_string(),
                },
                None => StoreError::Connection(e.to_string()),
            }
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::InvalidData(format!("JSON error: {}", e))
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        let message = e.to_string();
        let throttled = server_failures(&e)
            .iter()
            .any(|(code, text)| crate::mongo::is_quota_signal(Some(*code), text))
            || crate::mongo::is_quota_signal(None, &message);

        if throttled {
            StoreError::QuotaExceeded(message)
        } else if matches!(e.kind.as_ref(), ErrorKind::ServerSelection { .. }) {
            StoreError::Connection(message)
        } else {
            StoreError::Mongo(message)
        }
    }
}

/// Every server error code carried by a driver error, with its message
///
/// Commands report one code; `insert_many` reports one per failed document
/// plus an optional write concern failure.
fn server_failures(e: &mongodb::error::Error) -> Vec<(i32, &str)> {
    use mongodb::error::{ErrorKind, WriteFailure};

    match e.kind.as_ref() {
        ErrorKind::Command(command) => vec![(command.code, command.message.as_str())],
        ErrorKind::Write(WriteFailure::WriteError(write)) => vec![(write.code, write.message.as_str())],
        ErrorKind::Write(WriteFailure::WriteConcernError(concern)) => {
            vec![(concern.code, concern.message.as_str())]
        }
        ErrorKind::InsertMany(insert) => {
            let mut failures: Vec<(i32, &str)> = insert
                .write_errors
                .iter()
                .flatten()
                .map(|w| (w.code, w.message.as_str()))
                .collect();
            if let Some(concern) = &insert.write_concern_error {
                failures.push((concern.code, concern.message.as_str()));
            }
            failures
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_quota_errors_are_retryable() {
        assert!(StoreError::QuotaExceeded("RESOURCE_EXHAUSTED".into()).is_quota_exceeded());
        assert!(!StoreError::Connection("refused".into()).is_quota_exceeded());
        assert!(!StoreError::Api { status: 500, message: "boom".into() }.is_quota_exceeded());
        assert!(!StoreError::InvalidData("bad".into()).is_quota_exceeded());
    }

    fn insert_many_failure(write_errors: mongodb::bson::Document) -> mongodb::error::Error {
        let insert: mongodb::error::InsertManyError = mongodb::bson::from_document(write_errors).unwrap();
        mongodb::error::Error::from(mongodb::error::ErrorKind::InsertMany(insert))
    }

    #[test]
    fn test_throttled_insert_many_is_quota() {
        let err = insert_many_failure(mongodb::bson::doc! {
            "writeErrors": [{
                "index": 0,
                "code": 16500,
                "codeName": "RequestRateTooLarge",
                "errmsg": "Request rate is large",
            }],
        });
        assert!(StoreError::from(err).is_quota_exceeded());
    }

    #[test]
    fn test_atlas_quota_write_concern_is_quota() {
        let err = insert_many_failure(mongodb::bson::doc! {
            "writeConcernError": {
                "code": 8000,
                "codeName": "AtlasError",
                "errmsg": "you are over your space quota",
            },
        });
        assert!(StoreError::from(err).is_quota_exceeded());
    }

    #[test]
    fn test_duplicate_key_on_insert_many_is_not_quota() {
        let err = insert_many_failure(mongodb::bson::doc! {
            "writeErrors": [{
                "index": 3,
                "code": 11000,
                "errmsg": "E11000 duplicate key error",
            }],
        });
        assert!(matches!(StoreError::from(err), StoreError::Mongo(_)));
    }

    #[test]
    fn test_api_error_display() {
        let err = StoreError::Api { status: 400, message: "bad request".into() };
        assert_eq!(err.to_string(), "API error (HTTP 400): bad request");
    }
}
