//! Process adapter for [`CommandPort`].
//!
//! Programs are started directly with an argument vector; no shell parses
//! the values, so model-supplied text cannot inject extra commands.

use async_trait::async_trait;
use tokio::process::Command;

use ops_core::ports::CommandPort;
use ops_types::{action::ExecResult, OpsError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl CommandPort for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<ExecResult> {
        log::debug!("running {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| OpsError::Command(format!("failed to run {}: {}", program, e)))?;

        Ok(ExecResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            // Terminated by a signal
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}
