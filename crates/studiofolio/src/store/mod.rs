//! Content store for studiofolio.
//!
//! The site keeps every piece of content as a JSON document under a fixed
//! string key. [`ContentStore`] is the seam between that key/value contract
//! and the place the bytes actually live:
//!
//! - [`MemoryStore`] keeps documents in process (tests, dry runs).
//! - [`FileStore`] keeps one `<key>.json` file per key in a directory.
//! - [`SqliteStore`] keeps documents in an `SQLite` table with revisions.
//!
//! Typed access (collections, normalization, fail-open loading) lives in
//! [`crate::repo`]; this module only moves strings.

mod files;
mod memory;
pub mod migrations;
pub mod schema;
mod sqlite;

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::{Backend, Config};
use crate::error::{Error, Result};

pub use files::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Pattern every storage key must match.
const KEY_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_-]{0,63}$";

/// Digest of a stored value, used as an optimistic-concurrency token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision(String);

impl Revision {
    /// Compute the revision of a stored value.
    #[must_use]
    pub fn of(value: &str) -> Self {
        Self(blake3::hash(value.as_bytes()).to_hex().to_string())
    }

    /// Wrap an already computed digest.
    #[must_use]
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// The full hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form, like an abbreviated commit hash.
        let end = self.0.len().min(12);
        f.write_str(&self.0[..end])
    }
}

/// Key/value persistence for JSON documents.
///
/// Implementations store opaque strings; callers are responsible for
/// encoding and decoding. Every write replaces the whole value.
pub trait ContentStore: fmt::Debug {
    /// Short name of the backend (`memory`, `files`, `sqlite`).
    fn backend(&self) -> &'static str;

    /// Human-readable location (directory, database path, or `:memory:`).
    fn location(&self) -> String;

    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Returns `true` if a value was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<bool>;

    /// All keys currently stored, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be listed.
    fn keys(&self) -> Result<Vec<String>>;

    /// Time of the most recent write to any key, if the backend tracks it.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn last_modified(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(None)
    }

    /// Revision of the value currently stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn revision(&self, key: &str) -> Result<Option<Revision>> {
        Ok(self.read(key)?.map(|value| Revision::of(&value)))
    }

    /// Replace the value only if the stored revision still matches.
    ///
    /// `expected` of `None` means the key must not exist yet. Returns the
    /// revision of the new value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the stored revision differs, or a
    /// backend error.
    fn write_if(&self, key: &str, value: &str, expected: Option<&Revision>) -> Result<Revision> {
        let actual = self.revision(key)?;
        check_revision(key, expected, actual.as_ref())?;
        self.write(key, value)?;
        Ok(Revision::of(value))
    }
}

/// Compare an expected revision with the stored one.
pub(crate) fn check_revision(
    key: &str,
    expected: Option<&Revision>,
    actual: Option<&Revision>,
) -> Result<()> {
    if expected == actual {
        return Ok(());
    }
    warn!(key, "Refusing write: stored revision changed");
    Err(Error::Conflict {
        key: key.to_string(),
        expected: expected
            .cloned()
            .unwrap_or_else(|| Revision::from_hex("none")),
        actual: actual.map_or_else(|| "none".to_string(), ToString::to_string),
    })
}

/// Check that a storage key is well formed.
///
/// Keys double as file names for [`FileStore`], so they are restricted to
/// ASCII letters, digits, `_` and `-`.
///
/// # Errors
///
/// Returns [`Error::InvalidKey`] if the key does not match.
pub fn validate_key(key: &str) -> Result<()> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(KEY_PATTERN).expect("key pattern is valid"));
    if pattern.is_match(key) {
        Ok(())
    } else {
        Err(Error::InvalidKey {
            key: key.to_string(),
        })
    }
}

/// Open the store selected by the configuration.
///
/// # Errors
///
/// Returns an error if the backend cannot be opened.
pub fn open(config: &Config) -> Result<Box<dyn ContentStore>> {
    let store: Box<dyn ContentStore> = match config.storage.backend {
        Backend::Memory => Box::new(MemoryStore::new()),
        Backend::Files => Box::new(FileStore::open(config.data_dir())?),
        Backend::Sqlite => Box::new(SqliteStore::open(config.database_path())?),
    };
    info!(
        backend = store.backend(),
        location = %store.location(),
        "Content store ready"
    );
    Ok(store)
}

/// Dump every key into a single JSON object.
///
/// Values that are not valid JSON are exported as JSON strings so a dump
/// never loses data.
///
/// # Errors
///
/// Returns an error if the backend cannot be read.
pub fn export(store: &dyn ContentStore) -> Result<Map<String, Value>> {
    let mut dump = Map::new();
    for key in store.keys()? {
        let Some(raw) = store.read(&key)? else {
            continue;
        };
        let value = serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key = %key, error = %e, "Exporting unparsable value as a string");
            Value::String(raw)
        });
        dump.insert(key, value);
    }
    debug!(keys = dump.len(), "Exported content store");
    Ok(dump)
}

/// Write every entry of a dump back into the store.
///
/// Existing keys are overwritten; keys absent from the dump are left alone.
/// Returns the number of keys written.
///
/// # Errors
///
/// Returns an error if a key is malformed or the backend cannot be written.
pub fn import(store: &dyn ContentStore, dump: &Map<String, Value>) -> Result<usize> {
    for key in dump.keys() {
        validate_key(key)?;
    }
    for (key, value) in dump {
        store.write(key, &serde_json::to_string(value)?)?;
    }
    info!(keys = dump.len(), "Imported content dump");
    Ok(dump.len())
}
