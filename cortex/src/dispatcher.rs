use crate::action::{ActionRequest, ActionResult, Params};
use crate::errors::ActionFailure;
use crate::executor::Executor;
use crate::registry::{ActionRegistry, ActionSpec};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Routes a named request to exactly one registered action.
///
/// Lookup and validation happen before anything is spawned, so unknown names
/// and bad arguments never reach the executor.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ActionRegistry>,
    executor: Executor,
}

impl Dispatcher {
    pub fn new(registry: ActionRegistry, executor: Executor) -> Self {
        Self {
            registry: Arc::new(registry),
            executor,
        }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub async fn dispatch(&self, request: ActionRequest) -> ActionResult {
        let started = Instant::now();
        debug!(action = %request.name, "dispatching request");

        let Some(spec) = self.registry.lookup(&request.name) else {
            warn!(action = %request.name, "rejected unknown action");
            return ActionFailure::unknown_action(&request.name).into();
        };

        let params = match validate(spec, &request.parameters) {
            Ok(params) => params,
            Err(failure) => {
                warn!(action = spec.name(), "rejected request: {}", failure.detail);
                return failure.into();
            }
        };

        let result = self.executor.execute(spec, &params).await;
        info!(
            action = spec.name(),
            success = result.is_success(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dispatch complete"
        );
        result
    }
}

/// Checks `params` against the action's parameter contract and fills in defaults.
///
/// Parameters the contract does not mention are passed through untouched.
pub fn validate(spec: &ActionSpec, params: &Params) -> Result<Params, ActionFailure> {
    let mut validated = params.clone();
    for param in spec.kind.params() {
        match params.get(param.name) {
            None | Some(Value::Null) if param.required => {
                return Err(ActionFailure::invalid_argument(format!(
                    "Missing required parameter '{}' for {}",
                    param.name,
                    spec.name()
                )));
            }
            None | Some(Value::Null) => {
                validated.remove(param.name);
                if let Some(default) = param.default {
                    validated.insert(param.name.to_string(), Value::String(default.to_string()));
                }
            }
            Some(value) => {
                let (value, fell_back) = param.check(value).map_err(|reason| {
                    ActionFailure::invalid_argument(format!(
                        "Invalid parameter for {}: {reason}",
                        spec.name()
                    ))
                })?;
                if fell_back {
                    warn!(
                        action = spec.name(),
                        "'{}' value not recognized, using default {:?}", param.name, param.default
                    );
                }
                validated.insert(param.name.to_string(), value);
            }
        }
    }
    Ok(validated)
}
