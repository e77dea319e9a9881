//! Batching and throttling settings for an ingestion run

use crate::IngestError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the [`Ingestor`](crate::Ingestor)
///
/// Each backend has a preset matching the limits of its service.
///
/// # Examples
///
/// ```
/// use ddi_ingest::IngestConfig;
///
/// let config = IngestConfig::firestore();
/// assert_eq!(config.batch_size, 100);
/// assert_eq!(config.inter_batch_delay_ms, 1000);
///
/// let config = IngestConfig::sqlite();
/// assert_eq!(config.quota_retry_delay_ms, 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Records per flush
    pub batch_size: usize,

    /// Pause after each size-triggered flush on request-bound stores
    #[serde(default)]
    pub inter_batch_delay_ms: u64,

    /// Wait before the single retry of a flush rejected for quota
    #[serde(default)]
    pub quota_retry_delay_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::sqlite()
    }
}

impl IngestConfig {
    /// Small batches spaced one second apart, ten second quota backoff
    pub fn firestore() -> Self {
        Self {
            batch_size: 100,
            inter_batch_delay_ms: 1000,
            quota_retry_delay_ms: 10_000,
        }
    }

    /// Large batches, no throttle, ten second quota backoff
    pub fn mongodb() -> Self {
        Self {
            batch_size: 1000,
            inter_batch_delay_ms: 0,
            quota_retry_delay_ms: 10_000,
        }
    }

    /// Large batches with no delays
    pub fn sqlite() -> Self {
        Self {
            batch_size: 1000,
            inter_batch_delay_ms: 0,
            quota_retry_delay_ms: 0,
        }
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.batch_size == 0 {
            return Err(IngestError::Config("batch_size must be greater than 0".into()));
        }
        Ok(())
    }

    /// Check the settings against a backend's per-call batch limit
    pub fn validate_for(&self, max_batch_size: Option<usize>) -> Result<(), IngestError> {
        self.validate()?;
        match max_batch_size {
            Some(max) if self.batch_size > max => Err(IngestError::Config(format!(
                "batch_size {} exceeds the backend limit of {}",
                self.batch_size, max
            ))),
            _ => Ok(()),
        }
    }

    /// Get the inter-batch delay as Duration
    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.inter_batch_delay_ms)
    }

    /// Get the quota retry delay as Duration
    pub fn quota_retry_delay(&self) -> Duration {
        Duration::from_millis(self.quota_retry_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(
            IngestConfig::firestore(),
            IngestConfig {
                batch_size: 100,
                inter_batch_delay_ms: 1000,
                quota_retry_delay_ms: 10_000
            }
        );
        assert_eq!(IngestConfig::mongodb().batch_size, 1000);
        assert_eq!(IngestConfig::mongodb().inter_batch_delay_ms, 0);
        assert_eq!(IngestConfig::default(), IngestConfig::sqlite());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = IngestConfig {
            batch_size: 0,
            ..IngestConfig::sqlite()
        };
        assert!(matches!(config.validate(), Err(IngestError::Config(_))));
    }

    #[test]
    fn test_backend_limit() {
        let config = IngestConfig {
            batch_size: 501,
            ..IngestConfig::firestore()
        };
        assert!(config.validate_for(None).is_ok());
        assert!(config.validate_for(Some(501)).is_ok());
        assert!(matches!(config.validate_for(Some(500)), Err(IngestError::Config(_))));
    }

    #[test]
    fn test_duration_conversions() {
        let config = IngestConfig::firestore();
        assert_eq!(config.inter_batch_delay(), Duration::from_secs(1));
        assert_eq!(config.quota_retry_delay(), Duration::from_secs(10));
    }

    #[test]
    fn test_delays_default_to_zero_when_omitted() {
        let config: IngestConfig = serde_json::from_str(r#"{"batch_size": 250}"#).unwrap();
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.inter_batch_delay_ms, 0);
        assert_eq!(config.quota_retry_delay_ms, 0);
    }
}
