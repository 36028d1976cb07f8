use super::traits::{AgentFuture, AgentRunner};
use crate::error::AgentError;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Tailscale CLI runner — wraps the `tailscale` binary.
pub struct TailscaleCli {
    binary: String,
}

impl TailscaleCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn describe(&self, args: &[String]) -> String {
        format!("{} {}", self.binary, args.join(" "))
    }
}

/// Resolve `binary` the way a shell would: paths are checked directly, bare
/// names are searched on `PATH`. Either way the file must be executable.
pub(crate) fn find_executable(binary: &str) -> Option<PathBuf> {
    match which::which(binary) {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::debug!(binary, "Agent not found on PATH: {e}");
            None
        }
    }
}

fn launch_error(e: std::io::Error) -> AgentError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AgentError::NotInstalled
    } else {
        AgentError::Io(e)
    }
}

impl AgentRunner for TailscaleCli {
    fn name(&self) -> &str {
        "tailscale"
    }

    fn locate(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move { find_executable(&self.binary).is_some() })
    }

    fn run(&self, args: Vec<String>, timeout: Duration) -> AgentFuture<'_, String> {
        Box::pin(async move {
            let command = self.describe(&args);
            let child = Command::new(&self.binary)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(launch_error)?;

            // Dropping the wait future on timeout drops the child, which kills it.
            let output = tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| AgentError::Timeout {
                    command: command.clone(),
                    secs: timeout.as_secs(),
                })??;

            if !output.status.success() {
                return Err(AgentError::CommandFailed {
                    command,
                    code: output.status.code(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }

            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        })
    }

    fn spawn_detached(&self, args: Vec<String>) -> AgentFuture<'_, Option<u32>> {
        Box::pin(async move {
            let child = Command::new(&self.binary)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .map_err(|e| AgentError::Spawn(format!("{}: {e}", self.describe(&args))))?;

            let pid = child.id();
            tracing::debug!(pid = ?pid, command = %self.describe(&args), "Spawned detached agent process");
            // Not awaited: the process outlives this handle and is reaped by the runtime.
            drop(child);
            Ok(pid)
        })
    }

    fn signal(&self, pid: u32) -> AgentFuture<'_, ()> {
        Box::pin(async move { send_sigterm(pid) })
    }
}

#[cfg(unix)]
fn send_sigterm(pid: u32) -> Result<(), AgentError> {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).map_err(|_| AgentError::Signal {
        pid,
        message: "pid out of range".into(),
    })?;
    kill(Pid::from_raw(raw), Signal::SIGTERM).map_err(|e| AgentError::Signal {
        pid,
        message: e.to_string(),
    })
}

#[cfg(not(unix))]
fn send_sigterm(pid: u32) -> Result<(), AgentError> {
    Err(AgentError::Signal {
        pid,
        message: "signals are not supported on this platform".into(),
    })
}
