use crate::errors::RunnerError;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// A fully rendered external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: String,
    pub args: Vec<String>,
}

/// Holds the output of an external command execution
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// `None` when the process was ended by a signal.
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }

    /// Trimmed stderr, or a placeholder naming the exit status when it is empty.
    pub fn failure_text(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        match self.status_code {
            Some(code) => format!("exited with status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Seam between the executor and the operating system.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `invocation` to completion or until `timeout` elapses.
    ///
    /// Implementations must not leave the process running after returning
    /// [`RunnerError::TimedOut`].
    async fn run(
        &self,
        invocation: &CommandInvocation,
        timeout: Duration,
    ) -> Result<CommandOutput, RunnerError>;
}

/// Runs commands as real child processes via `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        invocation: &CommandInvocation,
        timeout: Duration,
    ) -> Result<CommandOutput, RunnerError> {
        let program = invocation.program.clone();
        debug!(program = %program, args = ?invocation.args, "spawning external command");

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own group so a timeout can take down anything the command started
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|source| RunnerError::Spawn {
            program: program.clone(),
            source,
        })?;
        // id() is gone once the child has been reaped
        let pid = child.id();

        let started = Instant::now();
        let deadline = started + timeout;
        let mut stdout_task = drain(child.stdout.take());
        let mut stderr_task = drain(child.stderr.take());

        match tokio::time::timeout_at(deadline, child.wait()).await {
            Ok(Ok(status)) => {
                let drained = tokio::time::timeout_at(deadline, async {
                    tokio::join!(&mut stdout_task, &mut stderr_task)
                })
                .await;
                let (stdout, stderr) = match drained {
                    Ok((stdout, stderr)) => (stdout.unwrap_or_default(), stderr.unwrap_or_default()),
                    Err(_) => {
                        warn!(
                            program = %program,
                            "output still open at deadline, terminating leftover processes"
                        );
                        kill_process_group(pid);
                        stdout_task.abort();
                        stderr_task.abort();
                        (String::new(), String::new())
                    }
                };
                debug!(
                    program = %program,
                    status = ?status.code(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "external command finished"
                );
                Ok(CommandOutput {
                    status_code: status.code(),
                    stdout,
                    stderr,
                })
            }
            Ok(Err(source)) => {
                kill_process_group(pid);
                stdout_task.abort();
                stderr_task.abort();
                Err(RunnerError::Wait { program, source })
            }
            Err(_) => {
                warn!(program = %program, ?timeout, "external command timed out, terminating");
                kill_process_group(pid);
                // kill() sends SIGKILL and reaps the child before returning
                if let Err(e) = child.kill().await {
                    warn!(program = %program, "failed to terminate timed out command: {}", e);
                }
                stdout_task.abort();
                stderr_task.abort();
                Err(RunnerError::TimedOut { program, timeout })
            }
        }
    }
}

/// Sends SIGKILL to every process in the group led by `pid`.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    let Some(pid) = pid else {
        return;
    };
    // Negative pid addresses the whole process group
    let rc = unsafe { libc::kill(-(pid as i32), libc::SIGKILL) };
    if rc != 0 {
        debug!(pid, "process group already gone: {}", std::io::Error::last_os_error());
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

fn drain<R>(pipe: Option<R>) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(e) = pipe.read_to_end(&mut buf).await {
                debug!("failed to read command output: {}", e);
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}
