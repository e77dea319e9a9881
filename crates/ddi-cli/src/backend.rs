//! Store construction from configuration and arguments.

use crate::cli::{Backend, TargetArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use ddi_store::{
    FirestoreAuth, FirestoreConfig, FirestoreStore, MongoConfig, MongoStore, ServiceAccountKey,
    SqliteStore,
};

/// Open (or create) the SQLite database.
pub fn sqlite(config: &Config, args: &TargetArgs) -> Result<SqliteStore> {
    let path = args.sqlite_path.as_ref().unwrap_or(&config.sqlite.path);
    tracing::debug!("Opening SQLite database {}", path.display());
    Ok(SqliteStore::new(path)?)
}

/// Build a MongoDB client from `MONGODB_URI`.
pub async fn mongodb(config: &Config, args: &TargetArgs) -> Result<MongoStore> {
    let uri = args
        .mongodb_uri
        .clone()
        .filter(|uri| !uri.is_empty())
        .ok_or_else(|| CliError::Config("MONGODB_URI is not set".into()))?;

    let mut mongo = MongoConfig::new(uri);
    if let Some(database) = args.mongodb_db.as_ref().or(config.mongodb.database.as_ref()) {
        mongo = mongo.with_database(database.clone());
    }
    Ok(MongoStore::connect(mongo).await?)
}

/// Build a Firestore client.
///
/// Credentials are taken from the emulator host, a pre-issued token or a
/// service-account key, in that order.
pub fn firestore(config: &Config, args: &TargetArgs) -> Result<FirestoreStore> {
    let key_path = args
        .credentials
        .as_ref()
        .or(config.firestore.credentials_path.as_ref());

    let (auth, key_project) = if args.firestore_emulator.is_some() {
        (FirestoreAuth::Emulator, None)
    } else if let Some(token) = args.firestore_token.clone().filter(|t| !t.is_empty()) {
        (FirestoreAuth::Token(token), None)
    } else if let Some(path) = key_path {
        let key = ServiceAccountKey::from_file(path)?;
        let project = key.project_id.clone();
        (FirestoreAuth::ServiceAccount(key), project)
    } else {
        return Err(CliError::Config(
            "No Firestore credentials: set GOOGLE_APPLICATION_CREDENTIALS or FIRESTORE_ACCESS_TOKEN"
                .into(),
        ));
    };

    let project_id = args
        .firestore_project
        .clone()
        .or_else(|| config.firestore.project_id.clone())
        .or(key_project)
        .ok_or_else(|| CliError::Config("FIRESTORE_PROJECT_ID is not set".into()))?;

    let mut firestore = FirestoreConfig::new(project_id, auth);
    if let Some(host) = &args.firestore_emulator {
        firestore = firestore.with_emulator(host);
    }
    Ok(FirestoreStore::new(firestore)?)
}

/// Steps an operator can take when a backend is unreachable.
pub fn remediation(backend: Backend) -> &'static [&'static str] {
    match backend {
        Backend::Sqlite => &[
            "Check that the database path is writable",
            "Pass --sqlite-path or set [sqlite] path in the config file",
        ],
        Backend::Mongodb => &[
            "Check that MONGODB_URI is a valid connection string",
            "In MongoDB Atlas, add this machine's IP address under Network Access",
            "Verify the database user name and password",
        ],
        Backend::Firestore => &[
            "Check FIRESTORE_PROJECT_ID (or [firestore] project_id)",
            "Point GOOGLE_APPLICATION_CREDENTIALS at a service-account key with Firestore access",
            "Make sure the Firestore API is enabled for the project",
        ],
    }
}

/// Print a connection failure headline followed by the remediation steps.
pub fn report_unreachable(backend: Backend, formatter: &Formatter) {
    println!("{}", formatter.error(&format!("Cannot connect to {}", backend)));
    for step in remediation(backend) {
        println!("  - {}", step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use tempfile::TempDir;

    fn target(args: &[&str]) -> TargetArgs {
        let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
        match cli.command {
            Command::Ping(target) => target,
            _ => panic!("Expected Ping command"),
        }
    }

    fn firestore_target() -> TargetArgs {
        TargetArgs {
            backend: Backend::Firestore,
            sqlite_path: None,
            mongodb_uri: None,
            mongodb_db: None,
            firestore_project: None,
            credentials: None,
            firestore_token: None,
            firestore_emulator: None,
        }
    }

    #[test]
    fn test_sqlite_path_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ddi.db");
        let args = target(&["ddi-import", "ping", "-b", "sqlite", "--sqlite-path", path.to_str().unwrap()]);

        sqlite(&Config::default(), &args).unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_mongodb_requires_uri() {
        let args = TargetArgs {
            backend: Backend::Mongodb,
            ..firestore_target()
        };
        let result = mongodb(&Config::default(), &args).await;
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_firestore_requires_credentials() {
        let args = TargetArgs {
            firestore_project: Some("demo".into()),
            ..firestore_target()
        };
        assert!(matches!(firestore(&Config::default(), &args), Err(CliError::Config(_))));
    }

    #[test]
    fn test_firestore_requires_project() {
        let args = TargetArgs {
            firestore_token: Some("ya29.token".into()),
            ..firestore_target()
        };
        assert!(matches!(firestore(&Config::default(), &args), Err(CliError::Config(_))));
    }

    #[test]
    fn test_firestore_project_from_config_file() {
        let mut config = Config::default();
        config.firestore.project_id = Some("smartpilladvisor".into());
        let args = TargetArgs {
            firestore_emulator: Some("localhost:8080".into()),
            ..firestore_target()
        };
        assert!(firestore(&config, &args).is_ok());
    }

    #[test]
    fn test_every_backend_has_remediation() {
        for backend in [Backend::Sqlite, Backend::Mongodb, Backend::Firestore] {
            assert!(!remediation(backend).is_empty());
        }
    }
}
