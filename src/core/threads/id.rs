use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Why a candidate thread name was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid thread id {id:?}: {reason}")]
pub struct InvalidThreadId {
    pub id: String,
    pub reason: &'static str,
}

/// Name of a conversation thread, safe to use as a single file stem.
///
/// Validation is purely lexical so bad ids are refused before any storage
/// is touched.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn parse(raw: &str) -> Result<Self, InvalidThreadId> {
        let reject = |reason| {
            Err(InvalidThreadId {
                id: raw.to_string(),
                reason,
            })
        };

        if raw.is_empty() {
            return reject("thread id must not be empty");
        }
        if raw.contains(['/', '\\']) {
            return reject("thread id must not contain path separators");
        }
        if raw.contains('\0') {
            return reject("thread id must not contain NUL bytes");
        }
        if raw.starts_with('.') {
            return reject("thread id must not start with '.'");
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ThreadId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ThreadId {
    type Err = InvalidThreadId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ThreadId {
    type Error = InvalidThreadId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
