use anyhow::Result;
use clap::Args;
use cortex::BridgeConfig;
use std::path::PathBuf;

/// Settings for the alert and activity-log actions.
///
/// Values given here win over the JSON file passed with `--config`.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// JSON file with bridge settings
    #[arg(long, env = "CORTEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory that holds activity.log
    #[arg(long, env = "CORTEX_ACTIVITY_LOG_DIR")]
    pub activity_log_dir: Option<PathBuf>,

    /// Seconds to wait for the alert command
    #[arg(long, env = "CORTEX_ALERT_TIMEOUT_SECS")]
    pub alert_timeout_secs: Option<u64>,

    /// Seconds before the alert dismisses itself
    #[arg(long, env = "CORTEX_ALERT_GIVE_UP_SECS")]
    pub alert_give_up_secs: Option<u64>,

    /// Seconds to wait for an activity log write
    #[arg(long, env = "CORTEX_LOG_TIMEOUT_SECS")]
    pub log_timeout_secs: Option<u64>,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::from_file(path)?,
            None => BridgeConfig::default(),
        };
        if let Some(dir) = &self.activity_log_dir {
            config.activity_log_dir = dir.clone();
        }
        if let Some(secs) = self.alert_timeout_secs {
            config.alert_timeout_secs = secs;
        }
        if let Some(secs) = self.alert_give_up_secs {
            config.alert_give_up_secs = secs;
        }
        if let Some(secs) = self.log_timeout_secs {
            config.log_timeout_secs = secs;
        }
        config.validate()?;
        Ok(config)
    }
}

pub const LOG_FILE_NAME: &str = "cortex-mcp-agent.log";

/// Stderr plus a daily rolling file. Stdout belongs to the stdio transport.
pub fn init_logging() -> Result<()> {
    cortex::logging::init_logging(LOG_FILE_NAME)?;
    Ok(())
}

/// Panics go to stderr only, never to the protocol stream.
pub fn install_panic_hook() {
    cortex::logging::install_panic_hook("cortex-mcp-agent");
}
