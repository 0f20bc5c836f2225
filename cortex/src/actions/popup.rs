use crate::action::Params;
use crate::config::{MESSAGE_PLACEHOLDER, SCRIPT_PLACEHOLDER, SEVERITY_PLACEHOLDER, TITLE_PLACEHOLDER};
use crate::errors::{ActionFailure, RunnerError};
use crate::executor::{parse_args, Executor};
use crate::registry::ActionSpec;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tracing::{info, warn};

/// Alert style. Unknown names resolve to [`Severity::DEFAULT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
#[schemars(inline)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub const DEFAULT: Severity = Severity::Warning;
    pub const NAMES: &'static [&'static str] = &[
        Severity::Info.as_str(),
        Severity::Warning.as_str(),
        Severity::Critical.as_str(),
    ];

    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "info" => Severity::Info,
            "warning" => Severity::Warning,
            "critical" => Severity::Critical,
            other => {
                warn!(
                    "Unknown severity '{}', falling back to {}",
                    other,
                    Severity::DEFAULT.as_str()
                );
                Severity::DEFAULT
            }
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }

    /// Icon keyword accepted by `display alert ... as <icon>`.
    pub fn alert_icon(&self) -> &'static str {
        match self {
            Severity::Info => "informational",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::DEFAULT
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Severity::parse_or_default(&name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct ShowPopupArgs {
    #[schemars(description = "Title of the popup (e.g., 'Productivity Alert')")]
    pub title: String,
    #[schemars(
        description = "Warning message to display (e.g., 'You are browsing Instagram. Consider returning to your goal.')"
    )]
    pub message: String,
    #[serde(default)]
    #[schemars(description = "Severity level of the alert")]
    pub severity: Severity,
}

/// Quotes `text` as an AppleScript string literal.
pub fn applescript_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn alert_script(args: &ShowPopupArgs, give_up_secs: u64) -> String {
    format!(
        "display alert {} message {} as {} giving up after {}",
        applescript_literal(&args.title),
        applescript_literal(&args.message),
        args.severity.alert_icon(),
        give_up_secs
    )
}

pub(crate) async fn show(
    executor: &Executor,
    spec: &ActionSpec,
    params: &Params,
) -> Result<Params, ActionFailure> {
    let args: ShowPopupArgs = parse_args(spec.name(), params)?;
    let script = alert_script(&args, executor.config().alert_give_up_secs);
    info!(severity = args.severity.as_str(), "Showing popup '{}'", args.title);

    let vars = [
        (SCRIPT_PLACEHOLDER, script.as_str()),
        (TITLE_PLACEHOLDER, args.title.as_str()),
        (MESSAGE_PLACEHOLDER, args.message.as_str()),
        (SEVERITY_PLACEHOLDER, args.severity.as_str()),
    ];
    let output = executor
        .run_command(spec, &vars)
        .await
        .map_err(|e| match e {
            RunnerError::TimedOut { timeout, .. } => ActionFailure::timeout(format!(
                "Popup display timed out after {}s",
                timeout.as_secs_f64()
            )),
            other => ActionFailure::command_failed(format!("Error displaying popup: {other}")),
        })?;

    if !output.success() {
        return Err(ActionFailure::command_failed(format!(
            "Failed to display popup: {}",
            output.failure_text()
        )));
    }

    let mut payload = Params::new();
    payload.insert(
        "confirmation".to_string(),
        json!(format!(
            "Popup displayed successfully: '{}' - '{}'",
            args.title, args.message
        )),
    );
    payload.insert("severity".to_string(), json!(args.severity.as_str()));
    payload.insert("response".to_string(), json!(output.stdout.trim()));
    Ok(payload)
}
