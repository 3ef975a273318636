pub mod stats;

use crate::api::options::RunOptions;
use async_trait::async_trait;
use playdrive_plugins::callback::CallbackPlugin;
use self::stats::AggregateStats;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Failures raised by the wrapped engine.
///
/// Parse rejections are the only engine failure the runner translates;
/// everything else crosses the boundary untouched.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Parse(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Credentials forwarded to the engine's connection and privilege
/// escalation layers.
#[derive(Debug, Default, Clone)]
pub struct Passwords {
    pub conn_pass: Option<String>,
    pub become_pass: Option<String>,
}

/// Everything the engine needs to stage a run of a single playbook.
/// Inventory sources, the subset filter, and extra vars travel inside
/// the already-merged options.
#[derive(Debug, Clone)]
pub struct ExecutorRequest {
    pub playbook: PathBuf,
    pub options: RunOptions,
    pub passwords: Passwords,
}

/// A run-scoped handle onto the engine's executor.
///
/// Observers must be registered before [`run`] is called; the executor is
/// consumed by a single run and is not reusable.
///
/// [`run`]: PlaybookExecutor::run
#[async_trait]
pub trait PlaybookExecutor: Send {
    /// Attach an observer to the executor's event chain.
    fn register_callback(&mut self, callback: Arc<dyn CallbackPlugin>);

    /// Drive the playbook to completion and hand back the final per-host
    /// statistics.
    async fn run(&mut self) -> Result<AggregateStats, EngineError>;
}

/// The engine binding. Implementations resolve inventory, variables, and
/// loader state on their side and return an executor staged for exactly
/// one playbook; batching multiple playbooks into one executor is not
/// supported.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    async fn executor(
        &self,
        request: ExecutorRequest,
    ) -> Result<Box<dyn PlaybookExecutor>, EngineError>;
}
