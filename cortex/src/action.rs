//! Request, result and action vocabulary shared by every surface.

use crate::actions::activity::DEFAULT_APP_NAME;
use crate::actions::{LogActivityArgs, Severity, ShowPopupArgs};
use crate::errors::ActionFailure;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Named parameters of a request or fields of a success payload.
pub type Params = serde_json::Map<String, Value>;

/// The fixed set of actions the bridge knows how to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CaptureScreenshot,
    ShowPopup,
    LogActivity,
}

const SHOW_POPUP_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("title", ParamKind::String),
    ParamSpec::required("message", ParamKind::String),
    ParamSpec::optional(
        "severity",
        ParamKind::Choice(Severity::NAMES),
        Some(Severity::DEFAULT.as_str()),
    ),
];

const LOG_ACTIVITY_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("activity", ParamKind::String),
    ParamSpec::required("productive", ParamKind::Boolean),
    ParamSpec::optional("app_name", ParamKind::String, Some(DEFAULT_APP_NAME)),
];

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [
        ActionKind::CaptureScreenshot,
        ActionKind::ShowPopup,
        ActionKind::LogActivity,
    ];

    /// Wire name used by callers. Matching is exact and case-sensitive.
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::CaptureScreenshot => "capture_screenshot",
            ActionKind::ShowPopup => "show_popup",
            ActionKind::LogActivity => "log_activity",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ActionKind::CaptureScreenshot => {
                "Capture a screenshot of the booted iOS Simulator and return it base64-encoded"
            }
            ActionKind::ShowPopup => {
                "Display a popup warning to the user about unproductive activity"
            }
            ActionKind::LogActivity => "Log user activity for tracking purposes",
        }
    }

    pub fn params(&self) -> &'static [ParamSpec] {
        match self {
            ActionKind::CaptureScreenshot => &[],
            ActionKind::ShowPopup => SHOW_POPUP_PARAMS,
            ActionKind::LogActivity => LOG_ACTIVITY_PARAMS,
        }
    }

    /// JSON schema of the action's arguments, derived from its argument type.
    pub fn input_schema(&self) -> Params {
        match self {
            ActionKind::CaptureScreenshot => {
                let mut schema = Params::new();
                schema.insert("type".to_string(), json!("object"));
                schema.insert("properties".to_string(), json!({}));
                schema
            }
            ActionKind::ShowPopup => object_schema::<ShowPopupArgs>(),
            ActionKind::LogActivity => object_schema::<LogActivityArgs>(),
        }
    }
}

fn object_schema<T: JsonSchema>() -> Params {
    match schemars::schema_for!(T).to_value() {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Expected shape of a single parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Boolean,
    Choice(&'static [&'static str]),
}

impl ParamKind {
    fn describe(&self) -> String {
        match self {
            ParamKind::String => "a string".to_string(),
            ParamKind::Boolean => "a boolean".to_string(),
            ParamKind::Choice(options) => format!("one of [{}]", options.join(", ")),
        }
    }
}

/// Validation contract for one parameter. Defaults come from the argument types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<&'static str>,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            default: None,
        }
    }

    pub const fn optional(
        name: &'static str,
        kind: ParamKind,
        default: Option<&'static str>,
    ) -> Self {
        Self {
            name,
            kind,
            required: false,
            default,
        }
    }

    /// Checks `value` against this parameter's shape.
    ///
    /// Choice parameters that carry a default accept unknown strings and
    /// resolve them to the default; the returned flag reports that fallback.
    pub fn check(&self, value: &Value) -> Result<(Value, bool), String> {
        match (self.kind, value) {
            (ParamKind::String, Value::String(_)) | (ParamKind::Boolean, Value::Bool(_)) => {
                Ok((value.clone(), false))
            }
            (ParamKind::Choice(options), Value::String(s)) => {
                if options.contains(&s.as_str()) {
                    Ok((value.clone(), false))
                } else if let Some(default) = self.default {
                    Ok((Value::String(default.to_string()), true))
                } else {
                    Err(format!(
                        "'{}' must be {}, got '{}'",
                        self.name,
                        self.kind.describe(),
                        s
                    ))
                }
            }
            _ => Err(format!(
                "'{}' must be {}, got {}",
                self.name,
                self.kind.describe(),
                json_type_name(value)
            )),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// One inbound call, created per request and discarded after handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub name: String,
    #[serde(default)]
    pub parameters: Params,
}

impl ActionRequest {
    pub fn new(name: impl Into<String>, parameters: Params) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    pub fn without_params(name: impl Into<String>) -> Self {
        Self::new(name, Params::new())
    }
}

/// Outcome of a dispatched request. Exactly one branch is populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionResult {
    Success { payload: Params },
    Failure(ActionFailure),
}

impl ActionResult {
    pub fn success(payload: Params) -> Self {
        ActionResult::Success { payload }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success { .. })
    }

    pub fn payload(&self) -> Option<&Params> {
        match self {
            ActionResult::Success { payload } => Some(payload),
            ActionResult::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ActionFailure> {
        match self {
            ActionResult::Success { .. } => None,
            ActionResult::Failure(failure) => Some(failure),
        }
    }

    pub fn into_result(self) -> Result<Params, ActionFailure> {
        match self {
            ActionResult::Success { payload } => Ok(payload),
            ActionResult::Failure(failure) => Err(failure),
        }
    }
}

impl From<Result<Params, ActionFailure>> for ActionResult {
    fn from(result: Result<Params, ActionFailure>) -> Self {
        match result {
            Ok(payload) => ActionResult::Success { payload },
            Err(failure) => ActionResult::Failure(failure),
        }
    }
}

impl From<ActionFailure> for ActionResult {
    fn from(failure: ActionFailure) -> Self {
        ActionResult::Failure(failure)
    }
}
