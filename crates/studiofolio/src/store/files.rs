//! Directory-backed content store.
//!
//! Each key is a `<key>.json` file inside the data directory, which mirrors
//! how the site's browser storage held one JSON blob per key. Writers take
//! an exclusive advisory lock on a `<key>.lock` sidecar, so a revision check
//! and the write it guards happen as one step even across processes.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use fs4::fs_std::FileExt;
use tracing::{debug, info, trace};

use super::{check_revision, validate_key, ContentStore, Revision};
use crate::error::{Error, Result};

/// File extension used for stored documents.
const EXTENSION: &str = "json";

/// File extension of the per-key lock files.
const LOCK_EXTENSION: &str = "lock";

/// Distinguishes temp files written by the same process.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A [`ContentStore`] that keeps one JSON file per key.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| Error::DirectoryCreate {
                path: dir.clone(),
                source,
            })?;
            info!("Created data directory at {}", dir.display());
        }
        Ok(Self { dir })
    }

    /// The directory holding the documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{EXTENSION}")))
    }

    /// Block until this process holds the write lock for `key`.
    ///
    /// The lock is released when the returned file is dropped.
    fn lock(&self, key: &str) -> Result<File> {
        let path = self.dir.join(format!("{key}.{LOCK_EXTENSION}"));
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        FileExt::lock_exclusive(&file)?;
        trace!(key, "Acquired write lock");
        Ok(file)
    }

    /// Write beside the target and rename, so readers never see a torn file.
    /// Callers must hold the key's lock.
    fn replace(&self, key: &str, path: &Path, value: &str) -> Result<()> {
        let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .dir
            .join(format!("{key}.{EXTENSION}.{}-{n}.tmp", process::id()));
        fs::write(&tmp, value)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!(key, bytes = value.len(), "Wrote {}", path.display());
        Ok(())
    }

    fn key_paths(&self) -> Result<Vec<(String, PathBuf)>> {
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_key(stem).is_ok() {
                    found.push((stem.to_string(), path.clone()));
                }
            }
        }
        found.sort();
        Ok(found)
    }
}

impl ContentStore for FileStore {
    fn backend(&self) -> &'static str {
        "files"
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let _lock = self.lock(key)?;
        self.replace(key, &path, value)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        let _lock = self.lock(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.key_paths()?.into_iter().map(|(key, _)| key).collect())
    }

    fn last_modified(&self) -> Result<Option<DateTime<Utc>>> {
        let mut latest = None;
        for (_, path) in self.key_paths()? {
            let modified: DateTime<Utc> = fs::metadata(&path)?.modified()?.into();
            latest = latest.max(Some(modified));
        }
        Ok(latest)
    }

    fn write_if(&self, key: &str, value: &str, expected: Option<&Revision>) -> Result<Revision> {
        let path = self.path_for(key)?;
        let _lock = self.lock(key)?;
        let actual = self.revision(key)?;
        check_revision(key, expected, actual.as_ref())?;
        self.replace(key, &path, value)?;
        Ok(Revision::of(value))
    }
}
