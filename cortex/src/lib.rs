//! Local automation bridge core
//!
//! This crate maps named requests onto a fixed set of workstation actions
//! (simulator screenshot, native alert, activity log) and runs each one behind
//! a bounded wait, turning every outcome into an [`ActionResult`] instead of a
//! crash. The HTTP and tool-invocation surfaces are thin layers over
//! [`Dispatcher`].

pub mod action;
pub mod actions;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod executor;
#[cfg(feature = "logging")]
pub mod logging;
pub mod registry;
pub mod runner;

pub use action::{ActionKind, ActionRequest, ActionResult, ParamKind, ParamSpec, Params};
pub use config::BridgeConfig;
pub use dispatcher::Dispatcher;
pub use errors::{ActionFailure, ConfigError, ErrorKind, RunnerError};
pub use executor::Executor;
pub use registry::{ActionRegistry, ActionSpec, CommandTemplate};
pub use runner::{CommandInvocation, CommandOutput, CommandRunner, ProcessRunner};
