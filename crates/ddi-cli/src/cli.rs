//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;

/// ddi-import - Load DDInter drug-drug interaction CSV files into a database.
#[derive(Debug, Parser)]
#[command(name = "ddi-import")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.ddi-import/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import the configured CSV files
    Import(ImportArgs),

    /// Check that the backend is reachable with the configured credentials
    Ping(TargetArgs),

    /// Show the record count and a few sample records
    Status(StatusArgs),
}

/// Destination backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Local SQLite database file
    Sqlite,
    /// Google Cloud Firestore
    Firestore,
    /// MongoDB (e.g. Atlas)
    Mongodb,
}

impl Backend {
    /// Name used in config sections and messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Sqlite => "sqlite",
            Backend::Firestore => "firestore",
            Backend::Mongodb => "mongodb",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend selection and connection settings.
///
/// Secrets are only accepted from the environment or the command line.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Destination backend
    #[arg(short, long, value_enum)]
    pub backend: Backend,

    /// SQLite database file
    #[arg(long)]
    pub sqlite_path: Option<PathBuf>,

    /// MongoDB connection string
    #[arg(long, env = "MONGODB_URI", hide_env_values = true)]
    pub mongodb_uri: Option<String>,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB")]
    pub mongodb_db: Option<String>,

    /// Firestore project id
    #[arg(long, env = "FIRESTORE_PROJECT_ID")]
    pub firestore_project: Option<String>,

    /// Service-account JSON key for Firestore
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Pre-issued OAuth2 access token for Firestore
    #[arg(long, env = "FIRESTORE_ACCESS_TOKEN", hide_env_values = true)]
    pub firestore_token: Option<String>,

    /// Firestore emulator address (host:port)
    #[arg(long, env = "FIRESTORE_EMULATOR_HOST")]
    pub firestore_emulator: Option<String>,
}

/// Arguments for the import command.
#[derive(Debug, Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Directory holding the source files
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Source file name, relative to the directory (repeatable)
    #[arg(long = "file")]
    pub files: Vec<String>,

    /// Records per batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Pause between batches in milliseconds (request-bound backends only)
    #[arg(long)]
    pub inter_batch_delay_ms: Option<u64>,

    /// Wait before retrying a batch rejected for quota, in milliseconds
    #[arg(long)]
    pub quota_retry_delay_ms: Option<u64>,
}

/// Arguments for the status command.
#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Number of sample records to show
    #[arg(short, long, default_value_t = 3)]
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_command() {
        let cli = Cli::try_parse_from([
            "ddi-import",
            "import",
            "--backend",
            "sqlite",
            "--dir",
            "data",
            "--file",
            "a.csv",
            "--file",
            "b.csv",
            "--batch-size",
            "250",
        ])
        .unwrap();
        match cli.command {
            Command::Import(args) => {
                assert_eq!(args.target.backend, Backend::Sqlite);
                assert_eq!(args.files, vec!["a.csv", "b.csv"]);
                assert_eq!(args.batch_size, Some(250));
                assert_eq!(args.dir, Some(PathBuf::from("data")));
            }
            _ => panic!("Expected Import command"),
        }
    }

    #[test]
    fn test_status_default_limit() {
        let cli = Cli::try_parse_from(["ddi-import", "status", "-b", "mongodb"]).unwrap();
        match cli.command {
            Command::Status(args) => {
                assert_eq!(args.limit, 3);
                assert_eq!(args.target.backend, Backend::Mongodb);
            }
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ddi-import", "ping", "-b", "firestore", "-v", "--no-color"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.no_color);
    }

    #[test]
    fn test_backend_required() {
        assert!(Cli::try_parse_from(["ddi-import", "import"]).is_err());
        assert!(Cli::try_parse_from(["ddi-import", "import", "-b", "postgres"]).is_err());
    }
}
