//! Modal CLI runner
//!
//! Every tool ends up here. `run` executes a command to completion and
//! classifies it by exit code, `run_json` additionally normalises `--json`
//! output, and `streaming_capture` samples a never-ending log stream for a
//! bounded number of seconds.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::output::{format_json_listing, strip_rich, truncate_middle};
use crate::domain::types::CommandSpec;
use crate::error::{Error, Result};
use crate::infra::process::ProcessExecutor;
use crate::Config;

pub const MIN_CAPTURE_SECS: i64 = 3;
pub const MAX_CAPTURE_SECS: i64 = 60;
pub const DEFAULT_CAPTURE_SECS: i64 = 10;

/// Argument vector for one CLI invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    args: Vec<String>,
    /// Indices of arguments hidden from logs
    secret: Vec<usize>,
}

impl CliArgs {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            secret: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append an argument that must never be logged
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.secret.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    /// Append `flag` only when `enabled`
    pub fn flag(mut self, flag: &str, enabled: bool) -> Self {
        if enabled {
            self.args.push(flag.to_string());
        }
        self
    }

    /// Append `option value` when a value is present
    pub fn opt(mut self, option: &str, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.args.push(option.to_string());
            self.args.push(value);
        }
        self
    }

    /// Append `--env <environment>` when an environment is selected
    pub fn env(self, environment: Option<String>) -> Self {
        self.opt("--env", environment)
    }

    /// Arguments joined for logging, secrets masked
    pub fn display(&self) -> String {
        self.args
            .iter()
            .enumerate()
            .map(|(i, a)| if self.secret.contains(&i) { "***" } else { a.as_str() })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn into_vec(self) -> Vec<String> {
        self.args
    }
}

/// Clamp a requested capture duration into the supported window
pub fn clamp_capture_secs(duration: i64) -> u64 {
    duration.clamp(MIN_CAPTURE_SECS, MAX_CAPTURE_SECS) as u64
}

/// Runs the Modal CLI through a [`ProcessExecutor`]
#[derive(Clone)]
pub struct ModalCli {
    executor: Arc<dyn ProcessExecutor>,
    config: Arc<Config>,
}

impl ModalCli {
    pub fn new(executor: Arc<dyn ProcessExecutor>, config: Arc<Config>) -> Self {
        Self { executor, config }
    }

    fn spec(&self, args: CliArgs) -> CommandSpec {
        CommandSpec::new(self.config.cli_bin.clone(), args.into_vec())
            .with_env(self.config.child_env())
    }

    /// Run a CLI command to completion and return its cleaned text
    pub async fn run(&self, args: CliArgs, timeout_secs: u64) -> Result<String> {
        info!("modal {}", args.display());
        let spec = self.spec(args);

        let output = self
            .executor
            .run(spec, Duration::from_secs(timeout_secs))
            .await
            .map_err(|e| match e {
                Error::ExecutableNotFound(_) => Error::CliNotFound,
                Error::CommandTimeout(_) => Error::CommandTimeout(timeout_secs),
                other => other,
            })?;

        let out = output.stdout.trim();
        let err = strip_rich(output.stderr.trim());

        if output.success() {
            if !out.is_empty() {
                Ok(out.to_string())
            } else if !err.is_empty() {
                Ok(err)
            } else {
                Ok("OK".to_string())
            }
        } else {
            debug!("modal exited with {:?}", output.exit_code);
            Err(Error::CommandFailed {
                exit_code: output.exit_code,
                stderr: err,
            })
        }
    }

    /// Run a CLI command with `--json` and render the result as text
    pub async fn run_json(&self, args: CliArgs, timeout_secs: u64) -> Result<String> {
        let text = self.run(args.arg("--json"), timeout_secs).await?;
        Ok(format_json_listing(&text))
    }

    /// Capture a streaming CLI command for a bounded number of seconds
    pub async fn streaming_capture(&self, args: CliArgs, duration: i64) -> Result<String> {
        let secs = clamp_capture_secs(duration);
        if secs as i64 != duration {
            debug!("Capture duration {} clamped to {}", duration, secs);
        }

        info!("modal {} (capturing {}s)", args.display(), secs);
        let spec = self.spec(args);

        let output = self
            .executor
            .capture(spec, Duration::from_secs(secs))
            .await
            .map_err(|e| match e {
                Error::ExecutableNotFound(_) => Error::CliNotFound,
                other => other,
            })?;

        let out = strip_rich(&output.stdout);
        let err = strip_rich(&output.stderr);

        if !err.is_empty() && out.is_empty() {
            warn!("Log stream produced only stderr");
            return Ok(format!("Error: {}", err));
        }

        if out.is_empty() {
            Ok(format!("No output captured in {}s.", secs))
        } else {
            Ok(format!(
                "{}\n\n(Captured {}s of log stream)",
                truncate_middle(&out),
                secs
            ))
        }
    }
}
