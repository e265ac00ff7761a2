//! Configuration commands.

use std::io::{BufRead, Write};

use super::CliError;
use crate::core::config::{ConfigKey, CredentialSource};
use crate::core::gateway::CompletionGateway;
use crate::core::orchestrator::Orchestrator;
use crate::core::paths::path_display;
use crate::core::threads::ThreadId;

pub fn set_api_key<G, W, R>(
    orchestrator: &mut Orchestrator<G>,
    key: Option<String>,
    out: &mut W,
    input: &mut R,
) -> Result<(), CliError>
where
    G: CompletionGateway,
    W: Write,
    R: BufRead,
{
    let key = match key {
        Some(key) => key,
        None => {
            write!(out, "Enter your API key: ")?;
            out.flush()?;
            let mut line = String::new();
            input.read_line(&mut line)?;
            line
        }
    };

    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::Usage("API key cannot be empty".to_string()));
    }

    orchestrator.config_mut().set(ConfigKey::ApiKey, key)?;
    writeln!(out, "✅ API key saved.")?;
    Ok(())
}

pub fn set_default_model<G, W>(
    orchestrator: &mut Orchestrator<G>,
    model: &str,
    out: &mut W,
) -> Result<(), CliError>
where
    G: CompletionGateway,
    W: Write,
{
    let model = model.trim();
    if model.is_empty() {
        return Err(CliError::Usage("Model name cannot be empty".to_string()));
    }

    orchestrator.config_mut().set(ConfigKey::DefaultModel, model)?;
    writeln!(out, "✅ Default model set to: {model}")?;
    Ok(())
}

pub fn set_default_thread<G, W>(
    orchestrator: &mut Orchestrator<G>,
    thread: &str,
    out: &mut W,
) -> Result<(), CliError>
where
    G: CompletionGateway,
    W: Write,
{
    let id = ThreadId::parse(thread)?;
    orchestrator
        .config_mut()
        .set(ConfigKey::DefaultThread, id.as_str())?;
    writeln!(out, "✅ Default thread set to: {id}")?;
    Ok(())
}

pub fn unset<G, W>(orchestrator: &mut Orchestrator<G>, key: &str, out: &mut W) -> Result<(), CliError>
where
    G: CompletionGateway,
    W: Write,
{
    let key: ConfigKey = key.parse()?;
    if orchestrator.config_mut().unset(key)? {
        writeln!(out, "✅ {key} unset.")?;
    } else {
        writeln!(out, "{key} was not set.")?;
    }
    Ok(())
}

pub fn list_config<G, W>(orchestrator: &Orchestrator<G>, out: &mut W) -> Result<(), CliError>
where
    G: CompletionGateway,
    W: Write,
{
    let config = orchestrator.config();

    writeln!(out, "Current configuration:")?;
    let api_key = match config.credential() {
        Some(credential) => match credential.source {
            CredentialSource::Environment => "set (from environment)",
            CredentialSource::Config => "set (from config file)",
        },
        None => "not set",
    };
    writeln!(out, "  API key: {api_key}")?;

    for key in ConfigKey::ALL.into_iter().filter(|key| !key.is_secret()) {
        match config.get(key) {
            Some(value) => writeln!(out, "  {key}: {value}")?,
            None => match key.default_value() {
                Some(default) => writeln!(out, "  {key}: {default} (default)")?,
                None => writeln!(out, "  {key}: (unset)")?,
            },
        }
    }

    writeln!(out)?;
    writeln!(out, "  Config file: {}", path_display(config.path()))?;
    writeln!(
        out,
        "  Threads directory: {}",
        path_display(orchestrator.threads().root())
    )?;
    Ok(())
}
