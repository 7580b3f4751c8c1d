//! Typed access to the content store.
//!
//! [`Repository`] turns the store's raw strings into records and back:
//!
//! - Loading fails open. A missing key, a value that isn't JSON, or a value
//!   that isn't an array all read as an empty collection; single records
//!   that can't be decoded are skipped. Problems are logged, never returned.
//! - Every record goes through [`versioning::upgrade`] and
//!   [`Record::normalize`] on the way in, so legacy data stays readable.
//! - Saving always writes the whole collection. [`Repository::save`] is
//!   last-writer-wins; [`Repository::save_if_unchanged`] checks a revision.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::collection;
use crate::config::{Config, KeysConfig};
use crate::error::{Error, Result};
use crate::model::{versioning, Message, Project, Record, Service, Settings, Testimonial};
use crate::store::{self, ContentStore, Revision};

/// Binds a record type to its storage key.
pub trait Stored: Record {
    /// Key the collection is saved under.
    fn key(keys: &KeysConfig) -> &str;

    /// Older key to read when [`Stored::key`] is absent.
    fn legacy_key(_keys: &KeysConfig) -> Option<&str> {
        None
    }
}

impl Stored for Project {
    fn key(keys: &KeysConfig) -> &str {
        &keys.projects
    }

    fn legacy_key(keys: &KeysConfig) -> Option<&str> {
        keys.legacy_projects()
    }
}

impl Stored for Service {
    fn key(keys: &KeysConfig) -> &str {
        &keys.services
    }
}

impl Stored for Testimonial {
    fn key(keys: &KeysConfig) -> &str {
        &keys.testimonials
    }
}

impl Stored for Message {
    fn key(keys: &KeysConfig) -> &str {
        &keys.messages
    }
}

/// A collection as read, with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<R> {
    /// Normalized records in stored order.
    pub records: Vec<R>,
    /// Revision of the primary key, or `None` if it was absent.
    pub revision: Option<Revision>,
}

/// Counts shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentStats {
    /// Backend name.
    pub backend: &'static str,
    /// Backend location.
    pub location: String,
    /// Number of projects.
    pub projects: usize,
    /// Number of services.
    pub services: usize,
    /// Number of testimonials.
    pub testimonials: usize,
    /// Number of messages.
    pub messages: usize,
    /// Number of unread messages.
    pub unread_messages: usize,
    /// Number of keys in the store, including unknown ones.
    pub keys: usize,
    /// Most recent write to the store, when the backend records it.
    pub last_updated: Option<DateTime<Utc>>,
}

/// Typed, fail-open access to a [`ContentStore`].
#[derive(Debug)]
pub struct Repository {
    store: Box<dyn ContentStore>,
    keys: KeysConfig,
    pretty: bool,
}

impl Repository {
    /// Wrap a store using the given keys.
    #[must_use]
    pub fn new(store: Box<dyn ContentStore>, keys: KeysConfig) -> Self {
        Self {
            store,
            keys,
            pretty: false,
        }
    }

    /// Open the configured store.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be opened.
    pub fn open(config: &Config) -> Result<Self> {
        let store = store::open(config)?;
        Ok(Self::new(store, config.keys.clone()).with_pretty(config.storage.pretty))
    }

    /// Pretty-print saved JSON.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &dyn ContentStore {
        self.store.as_ref()
    }

    /// The keys in use.
    #[must_use]
    pub fn keys(&self) -> &KeysConfig {
        &self.keys
    }

    /// Load a collection, failing open.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend itself cannot be read.
    pub fn load<R: Stored>(&self) -> Result<Vec<R>> {
        Ok(self.load_snapshot()?.records)
    }

    /// Load a collection together with its revision.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend itself cannot be read.
    pub fn load_snapshot<R: Stored>(&self) -> Result<Snapshot<R>> {
        let key = R::key(&self.keys);
        let mut raw = self.store.read(key)?;
        let revision = raw.as_deref().map(Revision::of);

        if raw.is_none() {
            if let Some(legacy) = R::legacy_key(&self.keys) {
                raw = self.store.read(legacy)?;
                if raw.is_some() {
                    info!(
                        collection = R::NAME,
                        legacy, "Reading collection from legacy key"
                    );
                }
            }
        }

        let records = raw.map(|r| decode_collection(&r)).unwrap_or_default();
        Ok(Snapshot { records, revision })
    }

    /// Find one record by id.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend itself cannot be read.
    pub fn find<R: Stored>(&self, id: i64) -> Result<Option<R>> {
        let records = self.load::<R>()?;
        Ok(collection::find(&records, id).cloned())
    }

    /// Overwrite a collection. Last writer wins.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the backend write fails.
    pub fn save<R: Stored>(&self, records: &[R]) -> Result<()> {
        let key = R::key(&self.keys);
        let text = self.encode_collection(records)?;
        self.store.write(key, &text)?;
        debug!(collection = R::NAME, count = records.len(), "Saved collection");
        Ok(())
    }

    /// Overwrite a collection only if it hasn't changed since `expected`.
    ///
    /// Pass the revision from [`Repository::load_snapshot`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if another writer saved in between.
    pub fn save_if_unchanged<R: Stored>(
        &self,
        records: &[R],
        expected: Option<&Revision>,
    ) -> Result<Revision> {
        let key = R::key(&self.keys);
        let text = self.encode_collection(records)?;
        self.store.write_if(key, &text, expected)
    }

    /// Insert a new record with a fresh id. Returns the saved record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn insert<R: Stored>(&self, record: R) -> Result<R> {
        let mut records = self.load::<R>()?;
        let now = Utc::now().timestamp_millis();
        let id = collection::insert(&mut records, record.normalize(), now)?;
        self.save(&records)?;
        info!(collection = R::NAME, id, "Created record");
        collection::find(&records, id)
            .cloned()
            .ok_or_else(|| Error::internal("inserted record vanished"))
    }

    /// Replace the record with a matching id. Returns the saved record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id doesn't exist.
    pub fn update<R: Stored>(&self, record: R) -> Result<R> {
        let mut records = self.load::<R>()?;
        let record = record.normalize();
        collection::update(&mut records, record.clone(), R::NAME)?;
        self.save(&records)?;
        info!(collection = R::NAME, id = record.id(), "Updated record");
        Ok(record)
    }

    /// Delete every record with the given id. Returns `true` if any existed.
    ///
    /// The collection is only rewritten when something was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn delete<R: Stored>(&self, id: i64) -> Result<bool> {
        let mut records = self.load::<R>()?;
        if !collection::remove(&mut records, id) {
            return Ok(false);
        }
        self.save(&records)?;
        info!(collection = R::NAME, id, "Deleted record");
        Ok(true)
    }

    /// Assign display orders following `ids`. Returns the reordered records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if an id doesn't exist.
    pub fn reorder<R: Stored>(&self, ids: &[i64]) -> Result<Vec<R>> {
        let mut records = self.load::<R>()?;
        collection::apply_order(&mut records, ids, R::NAME)?;
        self.save(&records)?;
        info!(collection = R::NAME, count = records.len(), "Reordered collection");
        Ok(records)
    }

    /// Load the settings document, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend itself cannot be read.
    pub fn load_settings(&self) -> Result<Settings> {
        let key = &self.keys.settings;
        let Some(raw) = self.store.read(key)? else {
            return Ok(Settings::default());
        };
        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key = %key, error = %e, "Unreadable settings; using defaults");
            Settings::default()
        }))
    }

    /// Save the settings document.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the backend write fails.
    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let text = self.to_json(&serde_json::to_value(settings)?)?;
        self.store.write(&self.keys.settings, &text)?;
        info!("Saved site settings");
        Ok(())
    }

    /// Dashboard counts.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend itself cannot be read.
    pub fn stats(&self) -> Result<ContentStats> {
        let messages = self.load::<Message>()?;
        Ok(ContentStats {
            backend: self.store.backend(),
            location: self.store.location(),
            projects: self.load::<Project>()?.len(),
            services: self.load::<Service>()?.len(),
            testimonials: self.load::<Testimonial>()?.len(),
            unread_messages: messages.iter().filter(|m| !m.read).count(),
            messages: messages.len(),
            keys: self.store.keys()?.len(),
            last_updated: self.store.last_modified()?,
        })
    }

    fn encode_collection<R: Record>(&self, records: &[R]) -> Result<String> {
        let values = records
            .iter()
            .map(|record| {
                let mut value = serde_json::to_value(record)?;
                versioning::stamp(&mut value, R::SCHEMA_VERSION);
                Ok(value)
            })
            .collect::<Result<Vec<Value>>>()?;
        self.to_json(&Value::Array(values))
    }

    fn to_json(&self, value: &Value) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }
}

/// Decode a stored collection, skipping anything unusable.
///
/// This is the read-time normalization path: parse, upgrade each record to
/// the current schema, decode, then [`Record::normalize`].
#[must_use]
pub fn decode_collection<R: Record>(raw: &str) -> Vec<R> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(collection = R::NAME, error = %e, "Stored collection is not JSON; using empty");
            return Vec::new();
        }
    };

    let Value::Array(items) = value else {
        warn!(collection = R::NAME, "Stored collection is not an array; using empty");
        return Vec::new();
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match normalize_value::<R>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(collection = R::NAME, index, error = %e, "Skipping unreadable record");
                None
            }
        })
        .collect()
}

/// Upgrade, decode and normalize a single raw record.
///
/// # Errors
///
/// Returns an error if the upgraded value doesn't decode as `R`.
pub fn normalize_value<R: Record>(value: Value) -> Result<R> {
    let upgraded = versioning::upgrade::<R>(value);
    let record: R = serde_json::from_value(upgraded)?;
    Ok(record.normalize())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::ProjectSize;
    use crate::store::MemoryStore;

    fn create_test_repo() -> Repository {
        Repository::new(Box::new(MemoryStore::new()), KeysConfig::default())
    }

    fn repo_with(entries: &[(&str, &str)]) -> Repository {
        let store = MemoryStore::with_entries(entries.iter().copied());
        Repository::new(Box::new(store), KeysConfig::default())
    }

    #[test]
    fn test_load_missing_is_empty() {
        let repo = create_test_repo();
        assert!(repo.load::<Project>().unwrap().is_empty());
        assert!(repo.load_snapshot::<Project>().unwrap().revision.is_none());
    }

    #[test]
    fn test_load_corrupted_is_empty() {
        let repo = repo_with(&[("portfolioProjects", "{{not json")]);
        assert!(repo.load::<Project>().unwrap().is_empty());
    }

    #[test]
    fn test_load_non_array_is_empty() {
        let repo = repo_with(&[("services", r#"{"id": 1}"#)]);
        assert!(repo.load::<Service>().unwrap().is_empty());
    }

    #[test]
    fn test_load_skips_bad_records() {
        let repo = repo_with(&[(
            "testimonials",
            r#"[{"id": 1, "quote": "Great", "author": "Ada"}, {"id": "x"}, 42]"#,
        )]);
        let loaded = repo.load::<Testimonial>().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].author, "Ada");
    }

    #[test]
    fn test_load_normalizes_legacy_values() {
        let repo = repo_with(&[(
            "portfolioProjects",
            r#"[{"id": 1, "title": "A", "size": "small", "alignment": "up"}]"#,
        )]);
        let project = &repo.load::<Project>().unwrap()[0];
        assert_eq!(project.size, ProjectSize::Col4);
        assert_eq!(project.alignment.as_str(), "center");
    }

    #[test]
    fn test_legacy_project_key_fallback() {
        let repo = repo_with(&[("adminPortfolio", r#"[{"id": 9, "title": "Old"}]"#)]);
        let snapshot = repo.load_snapshot::<Project>().unwrap();
        assert_eq!(snapshot.records.len(), 1);
        assert!(snapshot.revision.is_none());

        // Saving migrates to the canonical key and leaves the legacy key alone.
        repo.save(&snapshot.records).unwrap();
        assert!(repo.store().read("portfolioProjects").unwrap().is_some());
        assert!(repo.store().read("adminPortfolio").unwrap().is_some());
    }

    #[test]
    fn test_canonical_key_wins_over_legacy() {
        let repo = repo_with(&[
            ("adminPortfolio", r#"[{"id": 1, "title": "Old"}]"#),
            ("portfolioProjects", r#"[{"id": 2, "title": "New"}]"#),
        ]);
        let loaded = repo.load::<Project>().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "New");
    }

    #[test]
    fn test_save_stamps_schema_version() {
        let repo = create_test_repo();
        repo.save(&[Service::new(1, "Web")]).unwrap();

        let raw = repo.store().read("services").unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["schemaVersion"], json!(1));
        assert_eq!(repo.load::<Service>().unwrap()[0].title, "Web");
    }

    #[test]
    fn test_insert_update_delete() {
        let repo = create_test_repo();
        let a = repo.insert(Project::new(0, "A", "Web")).unwrap();
        let b = repo.insert(Project::new(0, "B", "Print")).unwrap();
        assert_ne!(a.id, b.id);

        let mut renamed = a.clone();
        renamed.title = "A2".to_string();
        repo.update(renamed).unwrap();
        assert_eq!(repo.find::<Project>(a.id).unwrap().unwrap().title, "A2");

        assert!(repo.delete::<Project>(a.id).unwrap());
        assert!(!repo.delete::<Project>(a.id).unwrap());
        let remaining = repo.load::<Project>().unwrap();
        assert_eq!(remaining, vec![b]);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let repo = create_test_repo();
        let err = repo.update(Service::new(4, "Ghost")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_services_get_sequential_ids() {
        let repo = create_test_repo();
        let first = repo.insert(Service::new(0, "One")).unwrap();
        let second = repo.insert(Service::new(0, "Two")).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn test_save_if_unchanged_conflict() {
        let repo = create_test_repo();
        let snapshot = repo.load_snapshot::<Service>().unwrap();
        let rev = repo
            .save_if_unchanged(&[Service::new(1, "A")], snapshot.revision.as_ref())
            .unwrap();

        // Someone else saves.
        repo.save(&[Service::new(1, "B")]).unwrap();

        let err = repo
            .save_if_unchanged(&[Service::new(1, "C")], Some(&rev))
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(repo.load::<Service>().unwrap()[0].title, "B");
    }

    #[test]
    fn test_reorder() {
        let repo = create_test_repo();
        let a = repo.insert(Service::new(0, "A")).unwrap();
        let b = repo.insert(Service::new(0, "B")).unwrap();
        let records = repo.reorder::<Service>(&[b.id, a.id]).unwrap();
        assert_eq!(records[0].id, b.id);
        assert_eq!(records[0].order, Some(0));
        assert_eq!(repo.load::<Service>().unwrap()[1].order, Some(1));
    }

    #[test]
    fn test_settings_roundtrip_and_fallback() {
        let repo = create_test_repo();
        assert_eq!(repo.load_settings().unwrap(), Settings::default());

        let mut settings = Settings::default();
        settings.tagline = "Design studio".to_string();
        repo.save_settings(&settings).unwrap();
        assert_eq!(repo.load_settings().unwrap().tagline, "Design studio");

        repo.store().write("siteSettings", "garbage").unwrap();
        assert_eq!(repo.load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_stats() {
        let repo = create_test_repo();
        repo.insert(Project::new(0, "A", "Web")).unwrap();
        let mut read = Message::new(0, "Ada", "ada@example.com", "Hi");
        read.read = true;
        repo.insert(read).unwrap();
        repo.insert(Message::new(0, "Bob", "bob@example.com", "Yo"))
            .unwrap();

        let stats = repo.stats().unwrap();
        assert_eq!(stats.backend, "memory");
        assert_eq!(stats.projects, 1);
        assert_eq!(stats.messages, 2);
        assert_eq!(stats.unread_messages, 1);
        assert_eq!(stats.keys, 2);
    }

    #[test]
    fn test_pretty_output() {
        let repo = create_test_repo().with_pretty(true);
        repo.save(&[Service::new(1, "Web")]).unwrap();
        let raw = repo.store().read("services").unwrap().unwrap();
        assert!(raw.contains('\n'));
    }

    #[test]
    fn test_normalize_value_is_idempotent() {
        let raw = json!({"id": 1, "title": " A ", "size": "large"});
        let once: Project = normalize_value(raw).unwrap();
        let again: Project = normalize_value(serde_json::to_value(&once).unwrap()).unwrap();
        assert_eq!(once, again);
        assert_eq!(once.size, ProjectSize::Col8);
    }
}
