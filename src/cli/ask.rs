//! The `ask` command: one exchange, printed to stdout.

use std::io::Write;

use super::CliError;
use crate::core::gateway::CompletionGateway;
use crate::core::orchestrator::{AskRequest, Orchestrator, Reply};
use crate::ui::markdown::{render_markdown, MarkdownRenderConfig};

/// How a reply is written to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyFormat {
    /// Reply text only, no header.
    Raw,
    /// Header, then the reply text as received.
    Plain,
    /// Header, then the reply rendered as markdown.
    Markdown { styled: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AskOptions {
    pub message: Vec<String>,
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub thread: Option<String>,
    pub format: ReplyFormat,
}

pub async fn run_ask<G, W>(
    orchestrator: &Orchestrator<G>,
    options: AskOptions,
    out: &mut W,
) -> Result<(), CliError>
where
    G: CompletionGateway,
    W: Write,
{
    let message = options.message.join(" ");
    if message.trim().is_empty() {
        return Err(CliError::Usage("Usage: cllm ask <MESSAGE>".to_string()));
    }

    let request = AskRequest {
        thread: options.thread,
        message,
        model: options.model,
        max_tokens: options.max_tokens,
        temperature: options.temperature,
    };
    let reply = orchestrator.resolve_and_run(request).await?;

    print_reply(&reply, options.format, out)?;
    Ok(())
}

fn print_reply<W: Write>(reply: &Reply, format: ReplyFormat, out: &mut W) -> std::io::Result<()> {
    if format != ReplyFormat::Raw {
        writeln!(
            out,
            "── Response ({}) · Thread: {} ──",
            reply.model, reply.thread
        )?;
    }
    match format {
        ReplyFormat::Raw | ReplyFormat::Plain => writeln!(out, "{}", reply.turn.content)?,
        ReplyFormat::Markdown { styled } => {
            for line in render_markdown(&reply.turn.content, MarkdownRenderConfig::styled(styled)) {
                writeln!(out, "{line}")?;
            }
        }
    }
    out.flush()
}
