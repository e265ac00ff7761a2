//! Durable key/value settings backed by a single JSON document.

pub mod data;
pub mod io;


use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub use data::{Config, ConfigKey, DEFAULT_MODEL, DEFAULT_THREAD};

/// Environment variable whose value overrides the persisted `api_key`.
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", crate::core::paths::path_display(.path))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {}: {source}", crate::core::paths::path_display(.path))]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode config for {}: {source}", crate::core::paths::path_display(.path))]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write config at {}: {source}", crate::core::paths::path_display(.path))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    Config,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub value: String,
    pub source: CredentialSource,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("value", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Settings loaded once from disk and rewritten in full on every change.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    config: Config,
}

impl ConfigStore {
    /// Opens the store at `path`. Never fails: a missing or damaged document
    /// yields an empty configuration.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = Config::load_or_default(&path);
        debug!(path = %path.display(), "loaded configuration");
        Self { path, config }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        self.config.get(key)
    }

    pub fn get_or<'a>(&'a self, key: ConfigKey, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// The stored value, or the key's documented default.
    pub fn effective(&self, key: ConfigKey) -> Option<&str> {
        self.get(key).or(key.default_value())
    }

    pub fn default_model(&self) -> &str {
        self.get_or(ConfigKey::DefaultModel, DEFAULT_MODEL)
    }

    pub fn default_thread(&self) -> &str {
        self.get_or(ConfigKey::DefaultThread, DEFAULT_THREAD)
    }

    /// Upserts `key` and persists the whole document. The in-memory state
    /// only changes once the write has succeeded.
    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) -> Result<(), ConfigError> {
        self.mutate(|config| config.set(key, value.into()))
    }

    /// Removes `key`, returning whether it was present. Nothing is written
    /// when the key was already absent.
    pub fn unset(&mut self, key: ConfigKey) -> Result<bool, ConfigError> {
        if self.get(key).is_none() {
            return Ok(false);
        }
        self.mutate(|config| config.unset(key))
    }

    fn mutate<T>(&mut self, mutator: impl FnOnce(&mut Config) -> T) -> Result<T, ConfigError> {
        let mut working = self.config.clone();
        let result = mutator(&mut working);
        working.save_to_path(&self.path)?;
        self.config = working;
        debug!(path = %self.path.display(), "persisted configuration");
        Ok(result)
    }

    /// API credential: the environment wins over the persisted key.
    pub fn credential(&self) -> Option<Credential> {
        self.credential_with(|name| std::env::var(name).ok())
    }

    pub fn credential_with<F>(&self, lookup: F) -> Option<Credential>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(API_KEY_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            return Some(Credential {
                value,
                source: CredentialSource::Environment,
            });
        }

        self.get(ConfigKey::ApiKey)
            .filter(|v| !v.trim().is_empty())
            .map(|value| Credential {
                value: value.to_string(),
                source: CredentialSource::Config,
            })
    }
}
