//! Whole-document replacement through a sibling temporary file.
//!
//! Contents are written and synced to a temp file in the target's directory,
//! then renamed over the target. Readers observe either the previous or the
//! new document, never a truncated one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A fully written temp file that has not replaced its target yet.
///
/// Dropping it without calling [`StagedFile::publish`] deletes the temp file
/// and leaves the target untouched.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    pub fn stage(target: &Path, contents: &[u8]) -> io::Result<Self> {
        let parent = target.parent().filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        let mut temp = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new_in(".")?,
        };

        temp.write_all(contents)?;
        temp.as_file_mut().sync_all()?;

        Ok(Self {
            temp,
            target: target.to_path_buf(),
        })
    }

    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn publish(self) -> io::Result<()> {
        self.temp
            .persist(&self.target)
            .map(|_| ())
            .map_err(|err| err.error)
    }
}

pub fn write_atomic(target: &Path, contents: &[u8]) -> io::Result<()> {
    StagedFile::stage(target, contents)?.publish()
}
