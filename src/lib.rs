//! cllm is a command-line client for chat-completion APIs that keeps
//! multi-turn conversations in named threads on local disk.
//!
//! The crate is organized in a few layers:
//! - [`core`] owns the persisted state (configuration and threads), the
//!   completion gateway abstraction, and the orchestrator that runs one
//!   exchange with rollback on failure.
//! - [`api`] defines the `chat/completions` payloads spoken by the HTTP
//!   gateway.
//! - [`ui`] renders replies as markdown for the terminal.
//! - [`cli`] parses arguments and renders results; `src/main.rs` routes
//!   straight into [`cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod logging;
pub mod ui;
pub mod utils;
