use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

use crate::error::{CrmError, Result};
use crate::models::RecordKind;

mod contacts;
mod interactions;
mod schema;
mod tasks;

pub use schema::SCHEMA_VERSION;

/// How long a writer waits on another connection's lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open an existing database. The schema must already be at
    /// `SCHEMA_VERSION`; run [`Database::migrate_at`] first otherwise.
    pub fn open_at(path: &Path) -> Result<Self> {
        let db = Self::connect(path)?;
        let version = db.schema_version()?;
        if version != SCHEMA_VERSION {
            return Err(CrmError::SchemaMismatch {
                found: version,
                expected: SCHEMA_VERSION,
            });
        }
        Ok(db)
    }

    /// Create the database file if needed and bring its schema up to date.
    /// Returns the resulting schema version.
    pub fn migrate_at(path: &Path) -> Result<i32> {
        let db = Self::connect(path)?;
        db.migrate()?;
        db.schema_version()
    }

    /// Open in-memory database for testing
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure(&conn)?;

        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn connect(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::configure(&conn)?;
        Ok(Self { conn })
    }

    fn configure(conn: &Connection) -> Result<()> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside one IMMEDIATE transaction. Commits when `f` returns
    /// `Ok`, rolls back otherwise. Not reentrant.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        self.run_in(TransactionBehavior::Immediate, f)
    }

    /// Consistent read of several queries without taking the write lock.
    pub fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        self.run_in(TransactionBehavior::Deferred, f)
    }

    fn run_in<T, F>(&self, behavior: TransactionBehavior, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        let tx = Transaction::new_unchecked(&self.conn, behavior)?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    // ==================== GENERIC RECORD OPS ====================

    pub fn exists(&self, kind: RecordKind, id: i64) -> Result<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", kind.table());
        let found: bool = self.conn.query_row(&sql, [id], |row| row.get(0))?;
        Ok(found)
    }

    /// Delete one record by id. Children of a contact go with it (CASCADE).
    pub fn delete_record(&self, kind: RecordKind, id: i64) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?", kind.table());
        let rows = self.conn.execute(&sql, [id])?;
        if rows == 0 {
            return Err(CrmError::not_found(kind, id));
        }
        Ok(())
    }

    // ==================== MIGRATIONS ====================

    fn migrate(&self) -> Result<()> {
        let version = self.schema_version()?;

        if version < 1 {
            self.conn.execute_batch(&format!(
                "BEGIN TRANSACTION; {} COMMIT;",
                schema::SCHEMA_V1
            ))?;
            self.set_schema_version(1)?;
            log::info!("Migrated schema to version 1");
        }

        if version < 2 {
            self.conn.execute_batch(&format!(
                "BEGIN TRANSACTION; {} COMMIT;",
                schema::MIGRATION_V2
            ))?;
            self.set_schema_version(2)?;
            log::info!("Migrated schema to version 2");
        }

        Ok(())
    }

    pub fn schema_version(&self) -> Result<i32> {
        let has_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version')",
            [],
            |row| row.get(0),
        )?;
        if !has_table {
            return Ok(0);
        }

        let version: Option<i32> = self
            .conn
            .query_row("SELECT version FROM schema_version WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(version.unwrap_or(0))
    }

    fn set_schema_version(&self, version: i32) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?)",
            [version],
        )?;
        Ok(())
    }
}

/// Fixed-width UTC text so lexical order matches chronological order
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Helper to convert timestamp parse errors to rusqlite errors
pub(crate) fn parse_timestamp(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}
