//! Runs one inspection command through the shell and captures its stdout.
//! Every failure mode collapses into `RawOutput::Unavailable`.

use crate::types::RawOutput;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// A named shell command line from the command table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub line: String,
}

impl CommandSpec {
    pub fn new(name: &'static str, line: impl Into<String>) -> Self {
        Self {
            name,
            line: line.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT)
    }
}

impl CommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn run(&self, spec: &CommandSpec) -> RawOutput {
        match self.try_run(spec).await {
            Ok(text) => {
                debug!(command = spec.name, bytes = text.len(), "command completed");
                RawOutput::Text(text)
            }
            Err(msg) => {
                warn!(command = spec.name, cli = %spec.line, "failed to run command: {msg}");
                RawOutput::Unavailable
            }
        }
    }

    async fn try_run(&self, spec: &CommandSpec) -> Result<String, String> {
        let child = Command::new("sh")
            .arg("-c")
            .arg(&spec.line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // dropping the future on timeout must not leave the child behind
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(out)) => out,
            Ok(Err(e)) => return Err(format!("spawn failed: {e}")),
            Err(_) => return Err(format!("timed out after {:?}", self.timeout)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("exited with {}: {}", output.status, stderr.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
