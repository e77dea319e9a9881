//! Embedded SQLite backend
//!
//! One `interactions` table with an autoincrement key and non-unique lookup
//! indexes. Local writes have no request quota, so the ingestor never
//! throttles this backend.

use crate::{StoreError, INTERACTIONS};
use ddi_domain::{IndexField, InteractionRecord, StoreAdapter, StoreInspector, WriteResult};
use rusqlite::{params, Connection};
use std::path::Path;

const INSERT_SQL: &str = "INSERT INTO interactions (Drug_A, Drug_B, Level, DDInterID_A, DDInterID_B)
     VALUES (?1, ?2, ?3, ?4, ?5)";

/// SQLite-based implementation of `StoreAdapter`
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the table exists
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ddi_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("drug_interactions.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Names of the explicit indexes on the interactions table, sorted
    pub fn index_names(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'index' AND tbl_name = ?1 AND sql IS NOT NULL
             ORDER BY name",
        )?;
        let names = stmt
            .query_map(params![INTERACTIONS], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Insert a batch inside a single transaction
    fn insert_batch(&mut self, records: &[InteractionRecord]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_SQL)?;
            for record in records {
                stmt.execute(params![
                    &record.drug_a,
                    &record.drug_b,
                    &record.level,
                    &record.id_a,
                    &record.id_b,
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }
}

impl StoreAdapter for SqliteStore {
    type Error = StoreError;

    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn is_request_bound(&self) -> bool {
        false
    }

    async fn create_indexes(&mut self, fields: &[IndexField]) -> Result<(), Self::Error> {
        for field in fields {
            // Identifiers come from a closed enum, never from input.
            let sql = format!(
                "CREATE INDEX IF NOT EXISTS {} ON {}({})",
                field.index_name(),
                INTERACTIONS,
                field.column()
            );
            self.conn.execute(&sql, [])?;
        }
        tracing::debug!("Ensured {} sqlite indexes", fields.len());
        Ok(())
    }

    async fn bulk_write(&mut self, records: &[InteractionRecord]) -> Result<WriteResult, Self::Error> {
        let written = self.insert_batch(records)?;
        Ok(WriteResult { written })
    }
}

impl StoreInspector for SqliteStore {
    async fn ping(&mut self) -> Result<(), Self::Error> {
        self.conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    async fn count(&mut self) -> Result<u64, Self::Error> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM interactions", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    async fn sample(&mut self, limit: usize) -> Result<Vec<InteractionRecord>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT Drug_A, Drug_B, Level, DDInterID_A, DDInterID_B
             FROM interactions ORDER BY id LIMIT ?1",
        )?;

        let records = stmt
            .query_map(params![limit as i64], |row| {
                Ok(InteractionRecord {
                    drug_a: row.get(0)?,
                    drug_b: row.get(1)?,
                    level: row.get(2)?,
                    id_a: row.get(3)?,
                    id_b: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}
