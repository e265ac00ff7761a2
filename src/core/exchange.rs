//! One request's in-memory view of a thread.
//!
//! The history moves through [`LoadedHistory`] → [`PendingExchange`] →
//! [`CompletedExchange`]. Only a completed exchange yields turns to commit,
//! so a history ending in an unanswered user turn cannot reach storage.

use crate::core::message::{Role, Turn};
use crate::core::threads::ThreadId;

/// Snapshot of a thread as it was read from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedHistory {
    thread: ThreadId,
    turns: Vec<Turn>,
}

impl LoadedHistory {
    pub fn new(thread: ThreadId, turns: Vec<Turn>) -> Self {
        Self { thread, turns }
    }

    pub fn thread(&self) -> &ThreadId {
        &self.thread
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Appends the user's message in memory only.
    pub fn append_user(mut self, message: impl Into<String>) -> PendingExchange {
        self.turns.push(Turn::user(message));
        PendingExchange { history: self }
    }
}

/// History with a trailing user turn awaiting its answer.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingExchange {
    history: LoadedHistory,
}

impl PendingExchange {
    pub fn thread(&self) -> &ThreadId {
        &self.history.thread
    }

    /// The full sequence to send, ending with the new user turn.
    pub fn turns(&self) -> &[Turn] {
        &self.history.turns
    }

    /// Records the assistant's reply. Whatever role the reply carried, it is
    /// stored as the assistant's.
    pub fn complete(mut self, reply: Turn) -> CompletedExchange {
        let reply = Turn::new(Role::Assistant, reply.content);
        self.history.turns.push(reply);
        CompletedExchange {
            history: self.history,
        }
    }

    /// Drops the unanswered user turn, restoring the loaded snapshot.
    pub fn revert(mut self) -> LoadedHistory {
        let popped = self.history.turns.pop();
        debug_assert!(popped.is_some_and(|turn| turn.role.is_user()));
        self.history
    }
}

/// History ending in a matched user/assistant pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedExchange {
    history: LoadedHistory,
}

impl CompletedExchange {
    pub fn thread(&self) -> &ThreadId {
        &self.history.thread
    }

    pub fn turns(&self) -> &[Turn] {
        &self.history.turns
    }

    pub fn reply(&self) -> &Turn {
        // A completed exchange always ends with the reply pushed in `complete`.
        &self.history.turns[self.history.turns.len() - 1]
    }

    pub fn into_reply(mut self) -> Turn {
        self.history
            .turns
            .pop()
            .unwrap_or_else(|| Turn::assistant(String::new()))
    }
}
