//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments, wires the persisted stores and
//! the HTTP gateway together, and renders results for the terminal.

pub mod ask;
pub mod error;
pub mod settings;
pub mod threads;

#[cfg(test)]
mod tests;

use std::io::{self, BufRead, IsTerminal, Write};

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::core::config::ConfigStore;
use crate::core::gateway::{CompletionGateway, OpenAiGateway};
use crate::core::orchestrator::{Orchestrator, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::core::paths::StatePaths;
use crate::core::threads::ThreadStore;
use crate::utils::url::resolve_base_url;

pub use error::CliError;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("VERGEN_GIT_DESCRIBE"),
    "\nbuilt: ",
    env!("VERGEN_BUILD_DATE"),
    "\ntarget: ",
    env!("VERGEN_CARGO_TARGET_TRIPLE")
);

#[derive(Parser, Debug)]
#[command(name = "cllm")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "CLI for interacting with chat-completion language models")]
#[command(
    long_about = "cllm sends your message to an OpenAI-compatible chat-completion API and prints \
the reply. Conversations are kept in named threads on disk, so follow-up questions carry \
their earlier context.\n\n\
Environment Variables:\n\
  OPENAI_API_KEY    API key; takes precedence over the stored key\n\
  OPENAI_BASE_URL   Custom API base URL (defaults to https://api.openai.com/v1)\n\
  CLLM_HOME         Keep config.json and threads/ under this directory\n\
  RUST_LOG          Diagnostic log filter (e.g. cllm=debug)\n\n\
A .env file in the working directory is read on startup."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Print diagnostic logs to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Send a message and print the reply
    Ask {
        /// Message to send (multiple words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
        /// Model to use for this request (defaults to the configured model)
        #[arg(short = 'm', long)]
        model: Option<String>,
        /// Sampling temperature
        #[arg(short = 't', long, default_value_t = DEFAULT_TEMPERATURE)]
        temperature: f32,
        /// Maximum tokens in the reply
        #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
        max_tokens: u32,
        /// Thread that keeps the conversation context (defaults to the configured thread)
        #[arg(long = "thread-id", visible_alias = "thread", value_name = "THREAD")]
        thread: Option<String>,
        /// Print only the reply text, without a header
        #[arg(long)]
        raw: bool,
        /// Render the reply as markdown (the default)
        #[arg(long, overrides_with = "no_markdown")]
        markdown: bool,
        /// Print the reply text exactly as received
        #[arg(long, overrides_with = "markdown")]
        no_markdown: bool,
    },
    /// Store the API key in the config file (prompts when omitted)
    SetApiKey {
        /// API key
        key: Option<String>,
    },
    /// Set the model used when --model is not given
    SetDefaultModel {
        /// Model name
        model: String,
    },
    /// Set the thread used when --thread-id is not given
    SetDefaultThread {
        /// Thread name
        thread: String,
    },
    /// Remove a stored setting (api_key, default_model, default_thread)
    Unset {
        /// Setting name
        key: String,
    },
    /// Show the current configuration
    ListConfig,
    /// List stored threads
    ListThreads,
    /// Delete a thread's history
    ClearThread {
        /// Thread name
        thread: String,
    },
    /// Print a thread's history (defaults to the configured thread)
    ShowThread {
        /// Thread name
        thread: Option<String>,
    },
}

/// Binary entrypoint; returns the process exit status.
pub fn main() -> i32 {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    crate::logging::init(args.verbose);

    match run(args) {
        Ok(()) => 0,
        Err(err) => {
            err.print(&mut io::stderr());
            err.exit_code()
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let paths = StatePaths::discover().ok_or(CliError::NoStateDir)?;
    debug!(
        config = %paths.config_file.display(),
        threads = %paths.threads_dir.display(),
        "resolved state locations"
    );

    let config = ConfigStore::open(&paths.config_file);
    let api_key = config.credential().map(|credential| credential.value);
    let gateway = OpenAiGateway::new(resolve_base_url(), api_key);
    let mut orchestrator = Orchestrator::new(config, ThreadStore::new(&paths.threads_dir), gateway);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let styled = stdout.is_terminal();
    let mut out = stdout.lock();
    runtime.block_on(execute(
        args.command,
        &mut orchestrator,
        &mut out,
        &mut input,
        styled,
    ))
}

/// Runs one command against an assembled orchestrator. `styled` allows
/// ANSI attributes in rendered replies.
pub async fn execute<G, W, R>(
    command: Commands,
    orchestrator: &mut Orchestrator<G>,
    out: &mut W,
    input: &mut R,
    styled: bool,
) -> Result<(), CliError>
where
    G: CompletionGateway,
    W: Write,
    R: BufRead,
{
    match command {
        Commands::Ask {
            message,
            model,
            temperature,
            max_tokens,
            thread,
            raw,
            no_markdown,
            ..
        } => {
            let format = if raw {
                ask::ReplyFormat::Raw
            } else if no_markdown {
                ask::ReplyFormat::Plain
            } else {
                ask::ReplyFormat::Markdown { styled }
            };
            let options = ask::AskOptions {
                message,
                model,
                temperature,
                max_tokens,
                thread,
                format,
            };
            ask::run_ask(orchestrator, options, out).await
        }
        Commands::SetApiKey { key } => settings::set_api_key(orchestrator, key, out, input),
        Commands::SetDefaultModel { model } => settings::set_default_model(orchestrator, &model, out),
        Commands::SetDefaultThread { thread } => {
            settings::set_default_thread(orchestrator, &thread, out)
        }
        Commands::Unset { key } => settings::unset(orchestrator, &key, out),
        Commands::ListConfig => settings::list_config(orchestrator, out),
        Commands::ListThreads => threads::list_threads(orchestrator, out),
        Commands::ClearThread { thread } => threads::clear_thread(orchestrator, &thread, out),
        Commands::ShowThread { thread } => {
            threads::show_thread(orchestrator, thread.as_deref(), out)
        }
    }
}
