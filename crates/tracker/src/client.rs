//! `bd` subprocess client

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::{IssueTracker, Result, TrackerError};

const DEFAULT_PROGRAM: &str = "bd";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runs `bd` commands with a bounded timeout
#[derive(Debug, Clone)]
pub struct BdClient {
    program: String,
    timeout: Duration,
    working_dir: Option<PathBuf>,
}

impl BdClient {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
            working_dir: None,
        }
    }

    /// Run `bd` from a fixed directory instead of the process cwd
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolved path of the binary, if any
    pub fn locate(&self) -> Option<PathBuf> {
        which::which(&self.program).ok()
    }
}

impl Default for BdClient {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

#[async_trait]
impl IssueTracker for BdClient {
    fn is_available(&self) -> bool {
        self.locate().is_some()
    }

    async fn run(&self, mut args: Vec<String>, json: bool) -> Result<String> {
        if json {
            args.push("--json".to_string());
        }

        debug!("◆ BD: {} {}", self.program, args.join(" "));
        let mut cmd = Command::new(&self.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TrackerError::NotInstalled(self.program.clone()))
            }
            Ok(Err(e)) => return Err(TrackerError::Spawn(e)),
            Err(_) => return Err(TrackerError::Timeout(self.timeout.as_secs())),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() { stdout } else { stderr };
        debug!("◆ BD FAILED ({:?}): {}", output.status.code(), message);
        Err(TrackerError::CommandFailed {
            code: output.status.code(),
            message,
        })
    }
}
