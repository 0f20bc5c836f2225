//! Process-wide table of supported actions.
//!
//! The registry is built once from [`BridgeConfig`] and only read afterwards.
//! Each surface owns a registry holding the subset of [`ActionKind`]s it
//! exposes.

use crate::action::ActionKind;
use crate::config::BridgeConfig;
use crate::errors::ConfigError;
use crate::runner::CommandInvocation;
use std::collections::BTreeMap;
use std::time::Duration;

/// An external command with `{placeholder}` tokens in its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn from_parts(parts: &[String], action: &'static str) -> Result<Self, ConfigError> {
        let (program, args) = parts
            .split_first()
            .ok_or(ConfigError::EmptyCommand(action))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Substitutes `vars` into every argument in a single pass.
    ///
    /// Substituted values are never rescanned, so caller text containing
    /// `{...}` stays literal. Unknown placeholders are left untouched.
    pub fn render(&self, vars: &[(&str, &str)]) -> CommandInvocation {
        CommandInvocation {
            program: render_arg(&self.program, vars),
            args: self.args.iter().map(|arg| render_arg(arg, vars)).collect(),
        }
    }
}

fn render_arg(arg: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(arg.len());
    let mut rest = arg;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        let replaced = candidate.find('}').and_then(|end| {
            let token = &candidate[..=end];
            vars.iter()
                .find(|(key, _)| *key == token)
                .map(|(_, value)| (*value, end + 1))
        });
        match replaced {
            Some((value, consumed)) => {
                out.push_str(value);
                rest = &candidate[consumed..];
            }
            None => {
                out.push('{');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Static description of one supported action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpec {
    pub kind: ActionKind,
    /// `None` for actions that do not shell out.
    pub command: Option<CommandTemplate>,
    pub timeout: Duration,
}

impl ActionSpec {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn required_params(&self) -> impl Iterator<Item = &'static str> {
        self.kind
            .params()
            .iter()
            .filter(|param| param.required)
            .map(|param| param.name)
    }

    fn from_config(kind: ActionKind, config: &BridgeConfig) -> Result<Self, ConfigError> {
        let spec = match kind {
            ActionKind::CaptureScreenshot => ActionSpec {
                kind,
                command: Some(CommandTemplate::from_parts(
                    &config.screenshot_command,
                    kind.name(),
                )?),
                timeout: config.screenshot_timeout(),
            },
            ActionKind::ShowPopup => ActionSpec {
                kind,
                command: Some(CommandTemplate::from_parts(
                    &config.alert_command,
                    kind.name(),
                )?),
                timeout: config.alert_timeout(),
            },
            ActionKind::LogActivity => ActionSpec {
                kind,
                command: None,
                timeout: config.log_timeout(),
            },
        };
        Ok(spec)
    }
}

#[derive(Debug, Clone)]
pub struct ActionRegistry {
    specs: BTreeMap<&'static str, ActionSpec>,
}

impl ActionRegistry {
    pub fn new(config: &BridgeConfig, kinds: &[ActionKind]) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut specs = BTreeMap::new();
        for kind in kinds {
            specs.insert(kind.name(), ActionSpec::from_config(*kind, config)?);
        }
        Ok(Self { specs })
    }

    /// Actions reachable over HTTP.
    pub fn http_surface(config: &BridgeConfig) -> Result<Self, ConfigError> {
        Self::new(config, &[ActionKind::CaptureScreenshot])
    }

    /// Actions exposed as named tools.
    pub fn tool_surface(config: &BridgeConfig) -> Result<Self, ConfigError> {
        Self::new(config, &[ActionKind::ShowPopup, ActionKind::LogActivity])
    }

    pub fn lookup(&self, name: &str) -> Option<&ActionSpec> {
        self.specs.get(name)
    }

    pub fn specs(&self) -> impl Iterator<Item = &ActionSpec> {
        self.specs.values()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
