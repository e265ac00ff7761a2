use crate::core::config::data::Config;
use crate::core::config::ConfigError;
use crate::utils::atomic_file::write_atomic;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::warn;

impl Config {
    /// Strict load: a missing file is an empty config, anything else that
    /// goes wrong is an error.
    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        let contents = match fs::read_to_string(config_path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: config_path.to_path_buf(),
                    source,
                })
            }
        };

        if contents.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
    }

    /// Lenient load used by the store: an unreadable or malformed document
    /// is treated as empty so a damaged file never locks the user out.
    pub fn load_or_default(config_path: &Path) -> Config {
        match Self::load_from_path(config_path) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "ignoring unusable configuration document");
                Config::default()
            }
        }
    }

    pub(crate) fn save_to_path(&self, config_path: &Path) -> Result<(), ConfigError> {
        let contents =
            serde_json::to_string_pretty(self).map_err(|source| ConfigError::Serialize {
                path: config_path.to_path_buf(),
                source,
            })?;

        write_atomic(config_path, contents.as_bytes()).map_err(|source| ConfigError::Write {
            path: config_path.to_path_buf(),
            source,
        })
    }
}
