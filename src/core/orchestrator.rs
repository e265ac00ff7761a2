//! Runs one conversational exchange against a stored thread.
//!
//! Sequence per call: resolve thread and model, load history, append the
//! user turn in memory, ask the gateway, then commit. A gateway failure
//! reverts the append and nothing is written.

use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info_span, warn, Instrument};

use crate::core::config::{ConfigKey, ConfigStore, DEFAULT_MODEL, DEFAULT_THREAD};
use crate::core::exchange::LoadedHistory;
use crate::core::gateway::{CompletionError, CompletionGateway, CompletionRequest};
use crate::core::message::Turn;
use crate::core::threads::{
    InvalidThreadId, ThreadId, ThreadStore, ThreadStoreError, ThreadSummary,
};

pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    InvalidThreadId(#[from] InvalidThreadId),

    #[error(transparent)]
    Thread(ThreadStoreError),

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

impl From<ThreadStoreError> for OrchestratorError {
    fn from(err: ThreadStoreError) -> Self {
        match err {
            ThreadStoreError::InvalidId(invalid) => OrchestratorError::InvalidThreadId(invalid),
            other => OrchestratorError::Thread(other),
        }
    }
}

/// Caller-supplied parameters of one exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct AskRequest {
    pub thread: Option<String>,
    pub message: String,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl AskRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            thread: None,
            message: message.into(),
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn on_thread(mut self, thread: impl Into<String>) -> Self {
        self.thread = Some(thread.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// The assistant's answer and where it was recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub thread: ThreadId,
    pub model: String,
    pub turn: Turn,
}

pub struct Orchestrator<G> {
    config: ConfigStore,
    threads: ThreadStore,
    gateway: G,
}

impl<G: CompletionGateway> Orchestrator<G> {
    pub fn new(config: ConfigStore, threads: ThreadStore, gateway: G) -> Self {
        Self {
            config,
            threads,
            gateway,
        }
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    pub fn threads(&self) -> &ThreadStore {
        &self.threads
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Explicit id, else the configured default, else `"default"`.
    pub fn resolve_thread(&self, explicit: Option<&str>) -> Result<ThreadId, InvalidThreadId> {
        let raw = explicit
            .or_else(|| self.config.get(ConfigKey::DefaultThread))
            .unwrap_or(DEFAULT_THREAD);
        ThreadId::parse(raw)
    }

    /// Explicit model, else the configured default, else `"gpt-3.5-turbo"`.
    pub fn resolve_model(&self, explicit: Option<&str>) -> String {
        explicit
            .filter(|model| !model.trim().is_empty())
            .or_else(|| self.config.get(ConfigKey::DefaultModel))
            .unwrap_or(DEFAULT_MODEL)
            .to_string()
    }

    pub async fn resolve_and_run(&self, request: AskRequest) -> Result<Reply, OrchestratorError> {
        let thread = self.resolve_thread(request.thread.as_deref())?;
        let model = self.resolve_model(request.model.as_deref());
        let span = info_span!("exchange", thread = %thread, model = %model);

        async move {
            let history = LoadedHistory::new(thread.clone(), self.threads.load(&thread)?);
            debug!(turns = history.turns().len(), "history loaded");

            let pending = history.append_user(request.message);
            let outcome = self
                .gateway
                .complete(CompletionRequest {
                    turns: pending.turns(),
                    model: &model,
                    max_tokens: request.max_tokens,
                    temperature: request.temperature,
                })
                .await;

            let reply = match outcome {
                Ok(reply) => reply,
                Err(err) => {
                    let restored = pending.revert();
                    warn!(
                        error = %err,
                        turns = restored.turns().len(),
                        "completion failed; history left unchanged"
                    );
                    return Err(err.into());
                }
            };

            let completed = pending.complete(reply);
            self.threads.commit(completed.thread(), completed.turns())?;
            debug!(turns = completed.turns().len(), "exchange committed");

            Ok::<_, OrchestratorError>(Reply {
                thread,
                model,
                turn: completed.into_reply(),
            })
        }
        .instrument(span)
        .await
    }

    pub fn list_threads(&self) -> Result<BTreeSet<ThreadId>, OrchestratorError> {
        Ok(self.threads.list()?)
    }

    pub fn thread_summaries(&self) -> Result<Vec<ThreadSummary>, OrchestratorError> {
        Ok(self.threads.summaries()?)
    }

    pub fn clear_thread(&self, id: &str) -> Result<bool, OrchestratorError> {
        let id = ThreadId::parse(id)?;
        Ok(self.threads.clear(&id)?)
    }

    /// Stored turns of a thread, resolved like [`Self::resolve_and_run`].
    pub fn history(&self, explicit: Option<&str>) -> Result<(ThreadId, Vec<Turn>), OrchestratorError> {
        let id = self.resolve_thread(explicit)?;
        let turns = self.threads.load(&id)?;
        Ok((id, turns))
    }
}
