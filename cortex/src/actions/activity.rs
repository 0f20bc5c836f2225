use crate::action::Params;
use crate::errors::ActionFailure;
use crate::executor::{parse_args, Executor};
use crate::registry::ActionSpec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_APP_NAME: &str = "Unknown app";

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct LogActivityArgs {
    #[schemars(description = "Description of the user's current activity")]
    pub activity: String,
    #[schemars(description = "Whether the activity is considered productive")]
    pub productive: bool,
    #[serde(default = "default_app_name")]
    #[schemars(description = "Name of the application being used")]
    pub app_name: String,
}

/// One line of the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub timestamp: String,
    pub activity: String,
    pub productive: bool,
    pub app_name: String,
}

impl From<LogActivityArgs> for ActivityRecord {
    fn from(args: LogActivityArgs) -> Self {
        Self {
            timestamp: chrono::Local::now().to_rfc3339(),
            activity: args.activity,
            productive: args.productive,
            app_name: args.app_name,
        }
    }
}

/// Appends `line` to `path` with one `write_all` on an append-mode handle,
/// creating the parent directory first.
pub fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}

/// Writes one activity record, waiting at most `spec.timeout`.
///
/// A blocking write cannot be cancelled. When the wait runs out the write is
/// left to finish in the background and the caller gets a `Timeout` failure
/// that says so, since retrying may then log the record twice.
pub(crate) async fn append(
    executor: &Executor,
    spec: &ActionSpec,
    params: &Params,
) -> Result<Params, ActionFailure> {
    let args: LogActivityArgs = parse_args(spec.name(), params)?;
    let record = ActivityRecord::from(args);
    let path = executor.config().activity_log_path();

    let mut line = serde_json::to_string(&record)
        .map_err(|e| ActionFailure::encoding(format!("Failed to encode activity record: {e}")))?;
    line.push('\n');

    let target = path.clone();
    let write = tokio::task::spawn_blocking(move || append_line(&target, &line));
    match tokio::time::timeout(spec.timeout, write).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => {
            return Err(ActionFailure::io(format!("Failed to log activity: {e}")));
        }
        Ok(Err(join_error)) => {
            return Err(ActionFailure::io(format!(
                "Failed to log activity: {join_error}"
            )));
        }
        Err(_) => {
            warn!(
                path = %path.display(),
                "activity write still pending after {}s",
                spec.timeout.as_secs_f64()
            );
            return Err(ActionFailure::timeout(format!(
                "Writing to {} timed out after {}s; the record may still be written",
                path.display(),
                spec.timeout.as_secs_f64()
            )));
        }
    }

    info!(
        productive = record.productive,
        "Logged activity '{}' in {}", record.activity, record.app_name
    );

    let confirmation = format!(
        "Activity logged: {} ({}) in {}",
        record.activity,
        if record.productive {
            "productive"
        } else {
            "unproductive"
        },
        record.app_name
    );
    let mut payload = Params::new();
    payload.insert("confirmation".to_string(), json!(confirmation));
    payload.insert("record".to_string(), json!(record));
    payload.insert("log_file".to_string(), json!(path.display().to_string()));
    Ok(payload)
}
