use crate::api::options::{OptionsBag, RunOptions};
use crate::api::result::{process_stats, RunResult};
use crate::callbacks::errors::ErrorsCollector;
use crate::callbacks::progress::TrackProgress;
use crate::config::manager::ConfigManager;
use crate::error::ApiError;
use crate::executor::{EngineError, ExecutionEngine, ExecutorRequest, Passwords};
use log::debug;
use playdrive_plugins::callback::CallbackPlugin;
use std::path::Path;
use std::sync::Arc;

/// Drives the wrapped engine through one playbook run at a time and
/// normalizes the outcome into a [`RunResult`].
///
/// The runner performs no scheduling of its own; host fan-out, retries,
/// and transport all belong to the engine behind [`ExecutionEngine`].
pub struct ApiRunner {
    engine: Arc<dyn ExecutionEngine>,
    inventory: Vec<String>,
    custom_opts: OptionsBag,
    callbacks: Vec<Arc<dyn CallbackPlugin>>,
    progress: Arc<TrackProgress>,
}

impl ApiRunner {
    pub fn new(engine: Arc<dyn ExecutionEngine>) -> Self {
        Self::builder(engine).build()
    }

    pub fn builder(engine: Arc<dyn ExecutionEngine>) -> ApiRunnerBuilder {
        ApiRunnerBuilder::new(engine)
    }

    /// Progress of the current (or last finished) run, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress.progress()
    }

    /// Register an additional observer; it will be attached to every
    /// subsequent run. There is no removal.
    pub fn add_callback(&mut self, callback: Arc<dyn CallbackPlugin>) {
        self.callbacks.push(callback);
    }

    /// Run a single playbook and reduce the outcome.
    ///
    /// `inventory` overrides the runner-level inventory sources for this
    /// call only. `overrides` is the per-call option layer; it wins over
    /// the runner's custom options, which win over the defaults.
    pub async fn run(
        &mut self,
        playbook: &Path,
        inventory: Option<&[String]>,
        overrides: &OptionsBag,
    ) -> Result<RunResult, ApiError> {
        // process-wide config must not leak across invocations
        ConfigManager::instance().lock().await.reset()?;

        if !playbook.is_file() {
            return Err(ApiError::FileNotFound {
                path: playbook.to_path_buf(),
            });
        }

        let inventory = inventory.map_or_else(|| self.inventory.clone(), <[String]>::to_vec);

        debug!("running with inventory: {inventory:?}");
        debug!("running with playbook: {}", playbook.display());

        let options = self.build_options(&inventory, overrides).await?;
        let passwords = Passwords::from_bag(overrides)?;

        let mut executor = self
            .engine
            .executor(ExecutorRequest {
                playbook: playbook.to_path_buf(),
                options,
                passwords,
            })
            .await
            .map_err(map_engine_err)?;

        // fresh failure collector per run; the progress tracker and any
        // custom observers are re-registered every time
        let errors = Arc::new(ErrorsCollector::new());
        executor.register_callback(self.progress.clone());
        executor.register_callback(errors.clone());
        for callback in &self.callbacks {
            executor.register_callback(callback.clone());
        }

        let stats = executor.run().await.map_err(map_engine_err)?;

        Ok(process_stats(&stats, &errors.failed_results()))
    }

    async fn build_options(
        &self,
        inventory: &[String],
        overrides: &OptionsBag,
    ) -> Result<RunOptions, ApiError> {
        let (subset, verbosity) = {
            let config = ConfigManager::instance().lock().await;
            let subset = config
                .get_config_value::<String>("DEFAULT_SUBSET")?
                .map(|(value, _)| value);
            let verbosity = config
                .get_config_value::<u8>("DEFAULT_VERBOSITY")?
                .map_or(0, |(value, _)| value);
            (subset, verbosity)
        };

        let mut options = RunOptions::defaults(inventory, subset, verbosity);
        options.apply(&self.custom_opts)?;
        options.apply(overrides)?;
        Ok(options)
    }
}

fn map_engine_err(err: EngineError) -> ApiError {
    match err {
        EngineError::Parse(msg) => ApiError::ParsePlaybook { msg },
        EngineError::Other(err) => ApiError::Engine(err),
    }
}

pub struct ApiRunnerBuilder {
    engine: Arc<dyn ExecutionEngine>,
    inventory: Vec<String>,
    custom_opts: OptionsBag,
    callbacks: Vec<Arc<dyn CallbackPlugin>>,
}

impl ApiRunnerBuilder {
    pub fn new(engine: Arc<dyn ExecutionEngine>) -> Self {
        ApiRunnerBuilder {
            engine,
            inventory: Vec::new(),
            custom_opts: OptionsBag::new(),
            callbacks: Vec::new(),
        }
    }

    /// Default inventory sources, used when a call does not bring its own.
    pub fn inventory(mut self, sources: &[String]) -> Self {
        self.inventory = sources.to_vec();
        self
    }

    /// Runner-level option, applied to every run under per-call overrides.
    pub fn option(mut self, key: &str, value: serde_json::Value) -> Self {
        self.custom_opts.insert(key.to_string(), value);
        self
    }

    pub fn callback(mut self, callback: Arc<dyn CallbackPlugin>) -> Self {
        self.callbacks.push(callback);
        self
    }

    pub fn build(self) -> ApiRunner {
        ApiRunner {
            engine: self.engine,
            inventory: self.inventory,
            custom_opts: self.custom_opts,
            callbacks: self.callbacks,
            progress: Arc::new(TrackProgress::new()),
        }
    }
}
