//! Errors surfaced by CLI commands and their user-facing rendering.

use std::io::Write;
use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::gateway::CompletionError;
use crate::core::orchestrator::OrchestratorError;
use crate::core::threads::{InvalidThreadId, ThreadStoreError};

const API_KEY_FIXES: &[&str] = &[
    "cllm set-api-key                # Store a key in the config file",
    "export OPENAI_API_KEY=sk-...    # Or provide it through the environment",
];
const MODEL_FIXES: &[&str] = &[
    "cllm ask -m gpt-3.5-turbo ...   # Pick a model for one request",
    "cllm set-default-model <MODEL>  # Change the default model",
];

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InvalidThreadId(#[from] InvalidThreadId),

    #[error("{0}")]
    Usage(String),

    #[error("could not determine where to store settings; set CLLM_HOME")]
    NoStateDir,

    #[error("failed to start async runtime: {0}")]
    Runtime(std::io::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    fn completion(&self) -> Option<&CompletionError> {
        match self {
            CliError::Orchestrator(OrchestratorError::Completion(err)) => Some(err),
            _ => None,
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        if let Some(err) = self.completion() {
            return match err {
                CompletionError::MissingCredential | CompletionError::Auth { .. } => 2,
                CompletionError::ModelNotFound { .. } => 3,
                CompletionError::RateLimited { .. } => 4,
                CompletionError::Transport { .. } => 5,
                CompletionError::Rejected { .. } => 1,
            };
        }

        match self {
            CliError::Usage(_)
            | CliError::InvalidThreadId(_)
            | CliError::Config(_)
            | CliError::NoStateDir
            | CliError::Orchestrator(OrchestratorError::InvalidThreadId(_)) => 2,
            _ => 1,
        }
    }

    pub fn quick_fixes(&self) -> &'static [&'static str] {
        match self.completion() {
            Some(err) if err.is_auth() => API_KEY_FIXES,
            Some(CompletionError::ModelNotFound { .. }) => MODEL_FIXES,
            _ => &[],
        }
    }

    /// One-paragraph description for the terminal.
    pub fn describe(&self) -> String {
        if let Some(err) = self.completion() {
            return describe_completion(err);
        }

        match self {
            CliError::Orchestrator(OrchestratorError::Thread(ThreadStoreError::Corrupt {
                id,
                ..
            })) => format!(
                "{self}\nThe thread was left as is. Run 'cllm clear-thread {id}' to start it over."
            ),
            _ => self.to_string(),
        }
    }

    pub fn print(&self, err: &mut impl Write) {
        let _ = writeln!(err, "❌ {}", self.describe());
        let fixes = self.quick_fixes();
        if !fixes.is_empty() {
            let _ = writeln!(err);
            let _ = writeln!(err, "💡 Quick fixes:");
            for fix in fixes {
                let _ = writeln!(err, "  • {fix}");
            }
        }
    }
}

fn describe_completion(err: &CompletionError) -> String {
    match err {
        CompletionError::MissingCredential => "API key not configured!".to_string(),
        CompletionError::Auth { message } => format!("Authentication failed: {message}"),
        CompletionError::ModelNotFound { model } => {
            format!("The model `{model}` does not exist or you do not have access to it.")
        }
        CompletionError::RateLimited {
            message,
            retry_after: Some(delay),
        } => format!(
            "Rate limited by the API: {message} (retry in {}s)",
            delay.as_secs()
        ),
        CompletionError::RateLimited { message, .. } => {
            format!("Rate limited by the API: {message}")
        }
        CompletionError::Transport { timeout: true, .. } => {
            format!("{err}. Your message was not saved; try again.")
        }
        CompletionError::Transport { .. } => format!("{err}. Your message was not saved."),
        CompletionError::Rejected { status, message } => {
            format!("The API rejected the request ({status}): {message}")
        }
    }
}
