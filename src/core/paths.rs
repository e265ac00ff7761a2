//! Per-user locations of the configuration document and thread directory.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable that relocates all persisted state under one directory.
pub const HOME_ENV_VAR: &str = "CLLM_HOME";

const CONFIG_FILE_NAME: &str = "config.json";
const THREADS_DIR_NAME: &str = "threads";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    pub config_file: PathBuf,
    pub threads_dir: PathBuf,
}

impl StatePaths {
    /// Lays out both locations under a single root.
    pub fn under(root: &Path) -> Self {
        Self {
            config_file: root.join(CONFIG_FILE_NAME),
            threads_dir: root.join(THREADS_DIR_NAME),
        }
    }

    /// Resolves the locations for the current user, honoring [`HOME_ENV_VAR`].
    pub fn discover() -> Option<Self> {
        Self::discover_with(|name| std::env::var_os(name).map(PathBuf::from))
    }

    pub(crate) fn discover_with<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        if let Some(root) = lookup(HOME_ENV_VAR).filter(|p| !p.as_os_str().is_empty()) {
            return Some(Self::under(&root));
        }

        let dirs = ProjectDirs::from("", "", "cllm")?;
        Some(Self {
            config_file: dirs.config_dir().join(CONFIG_FILE_NAME),
            threads_dir: dirs.data_dir().join(THREADS_DIR_NAME),
        })
    }
}

/// Get a user-friendly display string for a path, using `~` for the home
/// directory on Unix-like systems.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_override_places_everything_under_root() {
        let paths = StatePaths::discover_with(|name| {
            (name == HOME_ENV_VAR).then(|| PathBuf::from("/tmp/cllm-home"))
        })
        .expect("override should resolve");

        assert_eq!(
            paths.config_file,
            PathBuf::from("/tmp/cllm-home/config.json")
        );
        assert_eq!(paths.threads_dir, PathBuf::from("/tmp/cllm-home/threads"));
    }

    #[test]
    fn empty_override_is_ignored() {
        let paths = StatePaths::discover_with(|_| Some(PathBuf::new()));
        if let Some(paths) = paths {
            assert!(paths.config_file.ends_with(CONFIG_FILE_NAME));
            assert_ne!(paths.config_file, PathBuf::from(CONFIG_FILE_NAME));
        }
    }
}
