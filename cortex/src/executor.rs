use crate::action::{ActionKind, ActionResult, Params};
use crate::actions::{activity, popup, screenshot};
use crate::config::BridgeConfig;
use crate::errors::{ActionFailure, RunnerError};
use crate::registry::ActionSpec;
use crate::runner::{CommandOutput, CommandRunner, ProcessRunner};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Runs one action per call and maps every outcome to an [`ActionResult`].
#[derive(Clone)]
pub struct Executor {
    config: Arc<BridgeConfig>,
    runner: Arc<dyn CommandRunner>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Executor {
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_runner(config, Arc::new(ProcessRunner))
    }

    pub fn with_runner(config: BridgeConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config: Arc::new(config),
            runner,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub async fn execute(&self, spec: &ActionSpec, params: &Params) -> ActionResult {
        let started = Instant::now();
        let result = match spec.kind {
            ActionKind::CaptureScreenshot => screenshot::capture(self, spec).await,
            ActionKind::ShowPopup => popup::show(self, spec, params).await,
            ActionKind::LogActivity => activity::append(self, spec, params).await,
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => info!(action = spec.name(), elapsed_ms, "action succeeded"),
            Err(failure) => warn!(
                action = spec.name(),
                kind = %failure.kind,
                elapsed_ms,
                "action failed: {}",
                failure.detail
            ),
        }
        ActionResult::from(result)
    }

    /// Renders the spec's command with `vars` and runs it within the spec's timeout.
    pub(crate) async fn run_command(
        &self,
        spec: &ActionSpec,
        vars: &[(&str, &str)],
    ) -> Result<CommandOutput, RunnerError> {
        let template = spec.command.as_ref().ok_or(RunnerError::EmptyCommand)?;
        let invocation = template.render(vars);
        self.runner.run(&invocation, spec.timeout).await
    }
}

/// Deserializes validated parameters into an action's typed arguments.
pub(crate) fn parse_args<T: DeserializeOwned>(
    action: &str,
    params: &Params,
) -> Result<T, ActionFailure> {
    serde_json::from_value(Value::Object(params.clone())).map_err(|e| {
        ActionFailure::invalid_argument(format!("Invalid arguments for {action}: {e}"))
    })
}
