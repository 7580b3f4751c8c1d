//! In-process content store.

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::{validate_key, ContentStore};
use crate::error::Result;

/// A [`ContentStore`] that keeps everything in memory.
///
/// Nothing survives the process. Used by tests and by the `memory` backend
/// for dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given entries.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RefCell::new(map),
        }
    }
}

impl ContentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn location(&self) -> String {
        ":memory:".to_string()
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.borrow_mut().remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing() {
        let store = MemoryStore::new();
        assert!(store.read("services").unwrap().is_none());
        assert!(store.revision("services").unwrap().is_none());
    }

    #[test]
    fn test_write_and_read() {
        let store = MemoryStore::new();
        store.write("services", "[]").unwrap();
        assert_eq!(store.read("services").unwrap().as_deref(), Some("[]"));

        store.write("services", "[1]").unwrap();
        assert_eq!(store.read("services").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_write_rejects_bad_key() {
        let store = MemoryStore::new();
        assert!(store.write("a/b", "[]").is_err());
    }

    #[test]
    fn test_remove() {
        let store = MemoryStore::with_entries([("messages", "[]")]);
        assert!(store.remove("messages").unwrap());
        assert!(!store.remove("messages").unwrap());
    }

    #[test]
    fn test_keys_sorted() {
        let store = MemoryStore::with_entries([("testimonials", "[]"), ("messages", "[]")]);
        assert_eq!(store.keys().unwrap(), vec!["messages", "testimonials"]);
    }
}
