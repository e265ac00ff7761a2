//! Thread listing and maintenance commands.

use std::io::Write;

use super::CliError;
use crate::core::gateway::CompletionGateway;
use crate::core::orchestrator::Orchestrator;
use crate::core::threads::ThreadSummary;

pub fn list_threads<G, W>(orchestrator: &Orchestrator<G>, out: &mut W) -> Result<(), CliError>
where
    G: CompletionGateway,
    W: Write,
{
    let summaries = orchestrator.thread_summaries()?;
    if summaries.is_empty() {
        writeln!(out, "No threads found.")?;
        return Ok(());
    }

    let default_thread = orchestrator.config().default_thread();
    writeln!(out, "Available threads:")?;
    for summary in &summaries {
        let marker = if summary.id.as_str() == default_thread {
            " (default)"
        } else {
            ""
        };
        writeln!(out, "  • {}{} {}", summary.id, marker, describe(summary))?;
    }
    Ok(())
}

fn describe(summary: &ThreadSummary) -> String {
    let count = match summary.turns {
        Some(1) => "1 turn".to_string(),
        Some(n) => format!("{n} turns"),
        None => "unreadable".to_string(),
    };
    match summary.modified {
        Some(modified) => format!("({count}, updated {})", modified.format("%Y-%m-%d %H:%M")),
        None => format!("({count})"),
    }
}

pub fn clear_thread<G, W>(
    orchestrator: &Orchestrator<G>,
    thread: &str,
    out: &mut W,
) -> Result<(), CliError>
where
    G: CompletionGateway,
    W: Write,
{
    if orchestrator.clear_thread(thread)? {
        writeln!(out, "✅ Thread '{thread}' removed.")?;
    } else {
        writeln!(out, "Thread '{thread}' not found.")?;
    }
    Ok(())
}

pub fn show_thread<G, W>(
    orchestrator: &Orchestrator<G>,
    thread: Option<&str>,
    out: &mut W,
) -> Result<(), CliError>
where
    G: CompletionGateway,
    W: Write,
{
    let (id, turns) = orchestrator.history(thread)?;
    if turns.is_empty() {
        writeln!(out, "Thread '{id}' has no messages.")?;
        return Ok(());
    }

    for turn in &turns {
        writeln!(out, "[{}] {}", turn.role, turn.content)?;
    }
    Ok(())
}
