use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Failure categories reported back to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    UnknownAction,
    InvalidArgument,
    ExternalCommandFailed,
    Timeout,
    #[serde(rename = "IOError")]
    IoError,
    EncodingError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnknownAction => "UnknownAction",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::ExternalCommandFailed => "ExternalCommandFailed",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::IoError => "IOError",
            ErrorKind::EncodingError => "EncodingError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The failure branch of an [`ActionResult`](crate::ActionResult).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{detail}")]
pub struct ActionFailure {
    pub kind: ErrorKind,
    pub detail: String,
}

impl ActionFailure {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn unknown_action(name: &str) -> Self {
        Self::new(ErrorKind::UnknownAction, format!("{name} is not supported"))
    }

    pub fn invalid_argument(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, detail)
    }

    pub fn command_failed(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalCommandFailed, detail)
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, detail)
    }

    pub fn io(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::IoError, detail)
    }

    pub fn encoding(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::EncodingError, detail)
    }
}

/// Errors raised while running an external process.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    #[error("Failed while waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Empty command template")]
    EmptyCommand,
}

impl From<RunnerError> for ActionFailure {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::TimedOut { .. } => ActionFailure::timeout(err.to_string()),
            RunnerError::Spawn { .. } | RunnerError::Wait { .. } | RunnerError::EmptyCommand => {
                ActionFailure::command_failed(err.to_string())
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Command template for {0} is empty")]
    EmptyCommand(&'static str),

    #[error("Timeout for {0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
