use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Placeholder replaced with the screenshot destination path.
pub const PATH_PLACEHOLDER: &str = "{path}";
/// Placeholder replaced with the full AppleScript `display alert` statement.
pub const SCRIPT_PLACEHOLDER: &str = "{script}";
pub const TITLE_PLACEHOLDER: &str = "{title}";
pub const MESSAGE_PLACEHOLDER: &str = "{message}";
pub const SEVERITY_PLACEHOLDER: &str = "{severity}";

pub const ACTIVITY_LOG_FILE: &str = "activity.log";

/// Runtime settings for the bridge. Loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub screenshot_command: Vec<String>,
    pub screenshot_timeout_secs: u64,
    pub screenshot_dir: PathBuf,
    pub alert_command: Vec<String>,
    pub alert_timeout_secs: u64,
    /// Seconds after which the alert dismisses itself.
    pub alert_give_up_secs: u64,
    pub activity_log_dir: PathBuf,
    pub log_timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            screenshot_command: ["xcrun", "simctl", "io", "booted", "screenshot", PATH_PLACEHOLDER]
                .into_iter()
                .map(String::from)
                .collect(),
            screenshot_timeout_secs: 10,
            screenshot_dir: std::env::temp_dir(),
            alert_command: ["osascript", "-e", SCRIPT_PLACEHOLDER]
                .into_iter()
                .map(String::from)
                .collect(),
            alert_timeout_secs: 15,
            alert_give_up_secs: 10,
            activity_log_dir: default_activity_log_dir(),
            log_timeout_secs: 5,
        }
    }
}

/// `~/Library/Logs/Cortex`, or a temp directory when no home is known.
pub fn default_activity_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("Library").join("Logs").join("Cortex"))
        .unwrap_or_else(|| std::env::temp_dir().join("cortex-logs"))
}

impl BridgeConfig {
    /// Reads a JSON config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screenshot_command.is_empty() {
            return Err(ConfigError::EmptyCommand("capture_screenshot"));
        }
        if self.alert_command.is_empty() {
            return Err(ConfigError::EmptyCommand("show_popup"));
        }
        if self.screenshot_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("capture_screenshot"));
        }
        if self.alert_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("show_popup"));
        }
        if self.log_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("log_activity"));
        }
        Ok(())
    }

    pub fn activity_log_path(&self) -> PathBuf {
        self.activity_log_dir.join(ACTIVITY_LOG_FILE)
    }

    pub fn screenshot_timeout(&self) -> Duration {
        Duration::from_secs(self.screenshot_timeout_secs)
    }

    pub fn alert_timeout(&self) -> Duration {
        Duration::from_secs(self.alert_timeout_secs)
    }

    pub fn log_timeout(&self) -> Duration {
        Duration::from_secs(self.log_timeout_secs)
    }
}
