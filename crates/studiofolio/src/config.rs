//! Configuration management for studiofolio.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::validate_key;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "studiofolio";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "content.db";

/// Environment variable prefix. Nested keys are separated by `__`,
/// e.g. `STUDIOFOLIO_STORAGE__BACKEND=sqlite`.
const ENV_PREFIX: &str = "STUDIOFOLIO_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `STUDIOFOLIO_`)
/// 2. TOML config file at `~/.config/studiofolio/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Storage keys for each collection.
    pub keys: KeysConfig,
}

/// Which [`crate::store::ContentStore`] implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One JSON file per key in the data directory.
    #[default]
    Files,
    /// A single `SQLite` database.
    Sqlite,
    /// Process memory only; nothing is persisted.
    Memory,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Files => write!(f, "files"),
            Self::Sqlite => write!(f, "sqlite"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend used for content.
    pub backend: Backend,
    /// Directory for the `files` backend.
    /// Defaults to `~/.local/share/studiofolio/content`
    pub data_dir: Option<PathBuf>,
    /// Database file for the `sqlite` backend.
    /// Defaults to `~/.local/share/studiofolio/content.db`
    pub database_path: Option<PathBuf>,
    /// Pretty-print JSON documents when saving.
    pub pretty: bool,
}

/// Storage keys for the content collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Portfolio projects.
    pub projects: String,
    /// Older key projects were saved under; read when `projects` is absent.
    /// Set to an empty string to disable the fallback.
    pub legacy_projects: String,
    /// Services.
    pub services: String,
    /// Testimonials.
    pub testimonials: String,
    /// Contact form messages.
    pub messages: String,
    /// Site settings document.
    pub settings: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Files,
            data_dir: None, // Will be resolved to default at runtime
            database_path: None,
            pretty: true,
        }
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            projects: "portfolioProjects".to_string(),
            legacy_projects: "adminPortfolio".to_string(),
            services: "services".to_string(),
            testimonials: "testimonials".to_string(),
            messages: "messages".to_string(),
            settings: "siteSettings".to_string(),
        }
    }
}

impl KeysConfig {
    /// The legacy project key, if the fallback is enabled.
    #[must_use]
    pub fn legacy_projects(&self) -> Option<&str> {
        if self.legacy_projects.is_empty() {
            None
        } else {
            Some(&self.legacy_projects)
        }
    }

    /// Every collection key with its config name.
    #[must_use]
    pub fn all(&self) -> [(&'static str, &str); 5] {
        [
            ("projects", &self.projects),
            ("services", &self.services),
            ("testimonials", &self.testimonials),
            ("messages", &self.messages),
            ("settings", &self.settings),
        ]
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `STUDIOFOLIO_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing, or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let mut seen: Vec<&str> = Vec::new();
        for (name, key) in self.keys.all() {
            if validate_key(key).is_err() {
                return Err(Error::ConfigValidation {
                    message: format!("keys.{name} is not a valid storage key: {key:?}"),
                });
            }
            if seen.contains(&key) {
                return Err(Error::ConfigValidation {
                    message: format!("keys.{name} reuses the storage key {key:?}"),
                });
            }
            seen.push(key);
        }

        if let Some(legacy) = self.keys.legacy_projects() {
            if validate_key(legacy).is_err() {
                return Err(Error::ConfigValidation {
                    message: format!("keys.legacy_projects is not a valid storage key: {legacy:?}"),
                });
            }
            if seen.contains(&legacy) {
                return Err(Error::ConfigValidation {
                    message: format!("keys.legacy_projects reuses the storage key {legacy:?}"),
                });
            }
        }

        if let Some(dir) = &self.storage.data_dir {
            if dir.as_os_str().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "storage.data_dir must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the data directory for the `files` backend, resolving defaults.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("content"))
    }

    /// Get the database path for the `sqlite` backend, resolving defaults.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Where the selected backend keeps its data.
    #[must_use]
    pub fn store_location(&self) -> String {
        match self.storage.backend {
            Backend::Files => self.data_dir().display().to_string(),
            Backend::Sqlite => self.database_path().display().to_string(),
            Backend::Memory => ":memory:".to_string(),
        }
    }
}
