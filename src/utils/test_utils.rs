use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use crate::core::config::ConfigStore;
use crate::core::gateway::{CompletionError, CompletionGateway, CompletionRequest};
use crate::core::message::Turn;
use crate::core::orchestrator::Orchestrator;
use crate::core::paths::StatePaths;
use crate::core::threads::ThreadStore;

/// Gateway stub that replays scripted outcomes and records what it was sent.
#[derive(Default)]
pub struct ScriptedGateway {
    outcomes: Mutex<VecDeque<Result<Turn, CompletionError>>>,
    seen: Mutex<Vec<(Vec<Turn>, String)>>,
}

impl ScriptedGateway {
    pub fn replying(outcomes: impl IntoIterator<Item = Result<Turn, CompletionError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far, as (turns, model).
    pub fn calls(&self) -> Vec<(Vec<Turn>, String)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Turn, CompletionError> {
        self.seen
            .lock()
            .unwrap()
            .push((request.turns.to_vec(), request.model.to_string()));
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("gateway called more often than scripted"))
    }
}

/// Orchestrator whose config and threads live under `root`.
pub fn orchestrator_in(root: &Path, gateway: ScriptedGateway) -> Orchestrator<ScriptedGateway> {
    let paths = StatePaths::under(root);
    Orchestrator::new(
        ConfigStore::open(paths.config_file),
        ThreadStore::new(paths.threads_dir),
        gateway,
    )
}
