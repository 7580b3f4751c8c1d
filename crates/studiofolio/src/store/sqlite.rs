//! `SQLite`-backed content store.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::{check_revision, migrations, validate_key, ContentStore, Revision};
use crate::error::{Error, Result};

/// A [`ContentStore`] backed by a single `SQLite` database file.
///
/// Each key is one row of the `entries` table. Revisions are stored next to
/// the value so [`ContentStore::write_if`] can compare and write inside one
/// transaction.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a content database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist
    /// and brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::StoreOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::StoreOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn upsert(conn: &Connection, key: &str, value: &str) -> Result<Revision> {
        let revision = Revision::of(value);
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        conn.execute(
            r"
            INSERT INTO entries (key, value, revision, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                revision = excluded.revision,
                updated_at = excluded.updated_at
            ",
            params![key, value, revision.as_str(), now],
        )?;
        Ok(revision)
    }

    fn stored_revision(conn: &Connection, key: &str) -> Result<Option<Revision>> {
        let revision: Option<String> = conn
            .query_row(
                "SELECT revision FROM entries WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(revision.map(Revision::from_hex))
    }
}

impl ContentStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM entries WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        Self::upsert(&self.conn, key, value)?;
        debug!(key, bytes = value.len(), "Wrote entry");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM entries WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM entries ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn revision(&self, key: &str) -> Result<Option<Revision>> {
        Self::stored_revision(&self.conn, key)
    }

    fn last_modified(&self) -> Result<Option<DateTime<Utc>>> {
        let latest: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM entries ORDER BY updated_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        latest
            .map(|text| {
                DateTime::parse_from_rfc3339(&text)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| Error::internal(format!("bad updated_at {text:?}: {e}")))
            })
            .transpose()
    }

    fn write_if(&self, key: &str, value: &str, expected: Option<&Revision>) -> Result<Revision> {
        validate_key(key)?;
        let tx = self.conn.unchecked_transaction()?;
        let actual = Self::stored_revision(&tx, key)?;
        check_revision(key, expected, actual.as_ref())?;
        let revision = Self::upsert(&tx, key, value)?;
        tx.commit()?;
        Ok(revision)
    }
}
