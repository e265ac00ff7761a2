use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::ConfigError;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_THREAD: &str = "default";

/// The persisted settings document.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_thread: Option<String>,
    /// Keys this version does not know about, kept so a rewrite does not drop them.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A known setting name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ApiKey,
    DefaultModel,
    DefaultThread,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [
        ConfigKey::ApiKey,
        ConfigKey::DefaultModel,
        ConfigKey::DefaultThread,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::ApiKey => "api_key",
            ConfigKey::DefaultModel => "default_model",
            ConfigKey::DefaultThread => "default_thread",
        }
    }

    /// Value a missing key resolves to, if it has one.
    pub fn default_value(self) -> Option<&'static str> {
        match self {
            ConfigKey::ApiKey => None,
            ConfigKey::DefaultModel => Some(DEFAULT_MODEL),
            ConfigKey::DefaultThread => Some(DEFAULT_THREAD),
        }
    }

    pub fn is_secret(self) -> bool {
        self == ConfigKey::ApiKey
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl Config {
    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        self.slot(key).as_deref()
    }

    pub fn set(&mut self, key: ConfigKey, value: String) {
        *self.slot_mut(key) = Some(value);
    }

    pub fn unset(&mut self, key: ConfigKey) -> bool {
        self.slot_mut(key).take().is_some()
    }

    fn slot(&self, key: ConfigKey) -> &Option<String> {
        match key {
            ConfigKey::ApiKey => &self.api_key,
            ConfigKey::DefaultModel => &self.default_model,
            ConfigKey::DefaultThread => &self.default_thread,
        }
    }

    fn slot_mut(&mut self, key: ConfigKey) -> &mut Option<String> {
        match key {
            ConfigKey::ApiKey => &mut self.api_key,
            ConfigKey::DefaultModel => &mut self.default_model,
            ConfigKey::DefaultThread => &mut self.default_thread,
        }
    }
}
