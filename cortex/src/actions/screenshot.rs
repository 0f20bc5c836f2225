use crate::action::Params;
use crate::config::PATH_PLACEHOLDER;
use crate::errors::{ActionFailure, RunnerError};
use crate::executor::Executor;
use crate::registry::ActionSpec;
use base64::{engine::general_purpose, Engine as _};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub fn encode_image(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

pub fn decode_image(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(encoded)
}

/// Destination file for one capture. Removed when dropped.
struct TempScreenshot {
    path: PathBuf,
    removed: bool,
}

impl TempScreenshot {
    fn new(dir: &Path) -> Self {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        // The timestamp only has second resolution
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let path = dir.join(format!(
            "simulator_screenshot_{timestamp}_{}.png",
            &suffix[..12]
        ));
        Self {
            path,
            removed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn remove(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed temporary screenshot {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove temporary screenshot {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for TempScreenshot {
    fn drop(&mut self) {
        self.remove();
    }
}

pub(crate) async fn capture(executor: &Executor, spec: &ActionSpec) -> Result<Params, ActionFailure> {
    let dir = &executor.config().screenshot_dir;
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        ActionFailure::io(format!(
            "Failed to create screenshot directory {}: {e}",
            dir.display()
        ))
    })?;
    let mut shot = TempScreenshot::new(dir);
    let path = shot.path().to_string_lossy().into_owned();
    info!("Taking simulator screenshot into {}", path);

    let output = executor
        .run_command(spec, &[(PATH_PLACEHOLDER, path.as_str())])
        .await
        .map_err(|e| match e {
            RunnerError::TimedOut { timeout, .. } => ActionFailure::timeout(format!(
                "Simulator screenshot timed out after {}s",
                timeout.as_secs_f64()
            )),
            other => ActionFailure::command_failed(format!("Simulator screenshot failed: {other}")),
        })?;

    if !output.success() {
        return Err(ActionFailure::command_failed(format!(
            "Simulator screenshot failed: {}",
            output.failure_text()
        )));
    }

    let bytes = tokio::fs::read(shot.path()).await.map_err(|e| {
        ActionFailure::encoding(format!("Failed to read screenshot file {path}: {e}"))
    })?;
    shot.remove();

    info!("Simulator screenshot captured ({} bytes)", bytes.len());

    let mut payload = Params::new();
    payload.insert("image".to_string(), json!(encode_image(&bytes)));
    payload.insert(
        "timestamp".to_string(),
        json!(chrono::Local::now().to_rfc3339()),
    );
    payload.insert("bytes".to_string(), json!(bytes.len()));
    Ok(payload)
}
