#![allow(dead_code)]

use async_trait::async_trait;
use cortex::{BridgeConfig, CommandInvocation, CommandOutput, CommandRunner, RunnerError};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every spawn instead of starting a process.
#[derive(Default)]
pub struct CountingRunner {
    pub calls: Mutex<Vec<CommandInvocation>>,
    pub response: Mutex<Option<CommandOutput>>,
}

impl CountingRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn responding(output: CommandOutput) -> Arc<Self> {
        let runner = Self::default();
        *runner.response.lock().unwrap() = Some(output);
        Arc::new(runner)
    }

    pub fn spawn_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<CommandInvocation> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CommandRunner for CountingRunner {
    async fn run(
        &self,
        invocation: &CommandInvocation,
        _timeout: Duration,
    ) -> Result<CommandOutput, RunnerError> {
        self.calls.lock().unwrap().push(invocation.clone());
        Ok(self.response.lock().unwrap().clone().unwrap_or(CommandOutput {
            status_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        }))
    }
}

pub fn strings(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// Config whose paths all live under `root`.
pub fn test_config(root: &Path) -> BridgeConfig {
    BridgeConfig {
        screenshot_dir: root.join("shots"),
        activity_log_dir: root.join("logs"),
        ..BridgeConfig::default()
    }
}
