//! Conversation threads persisted as one JSON document per thread.
//!
//! A thread file holds a pretty-printed JSON array of `{role, content}`
//! objects. Writes always go through a temp file and an atomic rename, so a
//! reader sees either the previous or the new history. Concurrent writers
//! are not coordinated; the last rename wins.

mod id;


use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::core::message::Turn;
use crate::core::paths::path_display;
use crate::utils::atomic_file::StagedFile;

pub use id::{InvalidThreadId, ThreadId};

#[derive(Debug, Error)]
pub enum ThreadStoreError {
    #[error(transparent)]
    InvalidId(#[from] InvalidThreadId),

    #[error("thread '{id}' is corrupt ({}): {source}", path_display(.path))]
    Corrupt {
        id: ThreadId,
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("storage error at {}: {source}", path_display(.path))]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ThreadStoreError {
    fn storage(path: &Path, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Listing entry for one stored thread.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadSummary {
    pub id: ThreadId,
    /// `None` when the document exists but does not parse.
    pub turns: Option<usize>,
    pub modified: Option<DateTime<Local>>,
}

/// A commit whose document is written but not yet visible under the
/// thread's name.
#[derive(Debug)]
pub struct StagedCommit {
    id: ThreadId,
    file: StagedFile,
}

impl StagedCommit {
    pub fn id(&self) -> &ThreadId {
        &self.id
    }

    pub fn temp_path(&self) -> &Path {
        self.file.temp_path()
    }

    /// Atomically replaces the thread document.
    pub fn publish(self) -> Result<(), ThreadStoreError> {
        let target = self.file.target().to_path_buf();
        self.file
            .publish()
            .map_err(|source| ThreadStoreError::storage(&target, source))?;
        debug!(thread = %self.id, "committed thread");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ThreadStore {
    root: PathBuf,
}

impl ThreadStore {
    /// The directory is created lazily on the first commit.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: &ThreadId) -> PathBuf {
        self.root.join(id.file_name())
    }

    /// Stored history of `id`, or an empty history if none exists.
    pub fn load(&self, id: &ThreadId) -> Result<Vec<Turn>, ThreadStoreError> {
        let path = self.path_for(id);
        let contents = match fs::read(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(thread = %id, "no stored history");
                return Ok(Vec::new());
            }
            Err(source) => return Err(ThreadStoreError::storage(&path, source)),
        };

        let turns: Vec<Turn> =
            serde_json::from_slice(&contents).map_err(|source| ThreadStoreError::Corrupt {
                id: id.clone(),
                path: path.clone(),
                source,
            })?;
        debug!(thread = %id, turns = turns.len(), "loaded history");
        Ok(turns)
    }

    /// Writes the full replacement document next to the target without
    /// making it visible yet.
    pub fn stage(&self, id: &ThreadId, turns: &[Turn]) -> Result<StagedCommit, ThreadStoreError> {
        let path = self.path_for(id);
        let contents = serde_json::to_string_pretty(turns).map_err(|source| {
            ThreadStoreError::storage(&path, std::io::Error::new(ErrorKind::InvalidData, source))
        })?;
        let file = StagedFile::stage(&path, contents.as_bytes())
            .map_err(|source| ThreadStoreError::storage(&path, source))?;
        Ok(StagedCommit {
            id: id.clone(),
            file,
        })
    }

    /// Replaces the stored history of `id` with `turns`.
    pub fn commit(&self, id: &ThreadId, turns: &[Turn]) -> Result<(), ThreadStoreError> {
        self.stage(id, turns)?.publish()
    }

    /// Deletes the thread document. Returns whether one existed.
    pub fn clear(&self, id: &ThreadId) -> Result<bool, ThreadStoreError> {
        let path = self.path_for(id);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(thread = %id, "cleared thread");
                Ok(true)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(ThreadStoreError::storage(&path, source)),
        }
    }

    /// Ids of every stored thread. Files whose stem is not a valid id are
    /// skipped.
    pub fn list(&self) -> Result<BTreeSet<ThreadId>, ThreadStoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(source) => return Err(ThreadStoreError::storage(&self.root, source)),
        };

        let mut ids = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|source| ThreadStoreError::storage(&self.root, source))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if let Ok(id) = ThreadId::parse(stem) {
                ids.insert(id);
            }
        }
        Ok(ids)
    }

    pub fn summaries(&self) -> Result<Vec<ThreadSummary>, ThreadStoreError> {
        let summaries = self
            .list()?
            .into_iter()
            .map(|id| {
                let path = self.path_for(&id);
                let modified = fs::metadata(&path)
                    .and_then(|meta| meta.modified())
                    .ok()
                    .map(DateTime::<Local>::from);
                let turns = self.load(&id).ok().map(|turns| turns.len());
                ThreadSummary {
                    id,
                    turns,
                    modified,
                }
            })
            .collect();
        Ok(summaries)
    }
}
