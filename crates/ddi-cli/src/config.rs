//! Configuration management for the CLI.
//!
//! Settings come from a TOML file; connection secrets never do. They are
//! read from the environment through the command-line arguments instead.

use crate::cli::Backend;
use crate::error::{CliError, Result};
use ddi_ingest::IngestConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The DDInter download files, one per ATC category
pub const DEFAULT_FILES: [&str; 8] = [
    "ddinter_downloads_code_A.csv",
    "ddinter_downloads_code_B.csv",
    "ddinter_downloads_code_D.csv",
    "ddinter_downloads_code_H.csv",
    "ddinter_downloads_code_L.csv",
    "ddinter_downloads_code_P.csv",
    "ddinter_downloads_code_R.csv",
    "ddinter_downloads_code_V.csv",
];

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the CSV files are
    pub source: SourceConfig,
    /// SQLite settings
    pub sqlite: SqliteSettings,
    /// MongoDB settings (the connection string comes from `MONGODB_URI`)
    pub mongodb: MongoSettings,
    /// Firestore settings
    pub firestore: FirestoreSettings,
    /// Per-backend batching overrides
    pub ingest: IngestSettings,
}

/// Source file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory holding the files
    pub dir: PathBuf,
    /// File names, read in this order
    pub files: Vec<String>,
}

/// SQLite settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteSettings {
    /// Database file
    pub path: PathBuf,
}

/// MongoDB settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoSettings {
    /// Database name
    pub database: Option<String>,
}

/// Firestore settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FirestoreSettings {
    /// Google Cloud project id
    pub project_id: Option<String>,
    /// Service-account JSON key file
    pub credentials_path: Option<PathBuf>,
}

/// `[ingest.<backend>]` sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Overrides for SQLite imports
    pub sqlite: IngestOverrides,
    /// Overrides for MongoDB imports
    pub mongodb: IngestOverrides,
    /// Overrides for Firestore imports
    pub firestore: IngestOverrides,
}

/// Optional replacements for preset batching values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOverrides {
    /// Records per batch
    pub batch_size: Option<usize>,
    /// Pause between batches
    pub inter_batch_delay_ms: Option<u64>,
    /// Wait before the quota retry
    pub quota_retry_delay_ms: Option<u64>,
}

impl IngestOverrides {
    /// Replace the fields of `base` that are set here
    pub fn apply(&self, base: IngestConfig) -> IngestConfig {
        IngestConfig {
            batch_size: self.batch_size.unwrap_or(base.batch_size),
            inter_batch_delay_ms: self.inter_batch_delay_ms.unwrap_or(base.inter_batch_delay_ms),
            quota_retry_delay_ms: self.quota_retry_delay_ms.unwrap_or(base.quota_retry_delay_ms),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("ddinterpy"),
            files: DEFAULT_FILES.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl Default for SqliteSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("drug_interactions.db"),
        }
    }
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".ddi-import").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used
    /// when present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&contents)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Files to import, after command-line overrides.
    pub fn source_files(&self, dir: Option<&Path>, files: &[String]) -> Vec<PathBuf> {
        let dir = dir.unwrap_or(&self.source.dir);
        let names: &[String] = if files.is_empty() { &self.source.files } else { files };
        names.iter().map(|name| dir.join(name)).collect()
    }

    /// Backend preset with this file's overrides applied.
    pub fn ingest_config(&self, backend: Backend) -> IngestConfig {
        let (preset, overrides) = match backend {
            Backend::Sqlite => (IngestConfig::sqlite(), &self.ingest.sqlite),
            Backend::Mongodb => (IngestConfig::mongodb(), &self.ingest.mongodb),
            Backend::Firestore => (IngestConfig::firestore(), &self.ingest.firestore),
        };
        overrides.apply(preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source.dir, PathBuf::from("ddinterpy"));
        assert_eq!(config.source.files.len(), 8);
        assert_eq!(config.sqlite.path, PathBuf::from("drug_interactions.db"));
        assert_eq!(config.ingest_config(Backend::Firestore), IngestConfig::firestore());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [source]
            dir = "/data/ddinter"

            [ingest.firestore]
            batch_size = 400
            "#,
        )
        .unwrap();

        assert_eq!(config.source.dir, PathBuf::from("/data/ddinter"));
        assert_eq!(config.source.files.len(), 8);

        let firestore = config.ingest_config(Backend::Firestore);
        assert_eq!(firestore.batch_size, 400);
        assert_eq!(firestore.inter_batch_delay_ms, 1000);
        assert_eq!(config.ingest_config(Backend::Mongodb), IngestConfig::mongodb());
    }

    #[test]
    fn test_source_file_overrides() {
        let config = Config::default();
        let files = config.source_files(Some(Path::new("in")), &["x.csv".to_string()]);
        assert_eq!(files, vec![PathBuf::from("in/x.csv")]);

        let files = config.source_files(None, &[]);
        assert_eq!(files[0], PathBuf::from("ddinterpy/ddinter_downloads_code_A.csv"));
        assert_eq!(files[7], PathBuf::from("ddinterpy/ddinter_downloads_code_V.csv"));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[sqlite]\npath = \"/tmp/ddi.db\"\n\n[mongodb]\ndatabase = \"ddi\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.sqlite.path, PathBuf::from("/tmp/ddi.db"));
        assert_eq!(config.mongodb.database.as_deref(), Some("ddi"));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[source\ndir = 1").unwrap();
        assert!(matches!(Config::load(Some(file.path())), Err(CliError::Toml(_))));
    }
}
