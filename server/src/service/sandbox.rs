//! Sandbox launcher
//!
//! Sandboxes are created through the Modal Python SDK, not the CLI. A fixed
//! runner script is written to a temporary file and executed with the
//! configured interpreter; the request travels as a single JSON argument so
//! no caller-supplied text is ever spliced into source code.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::output::strip_rich;
use crate::domain::sandbox::{SandboxReport, SandboxRequest};
use crate::domain::types::CommandSpec;
use crate::error::{Error, Result};
use crate::infra::process::ProcessExecutor;
use crate::Config;

const RUNNER_SCRIPT: &str = include_str!("sandbox_runner.py");

/// Launches sandbox runs through the runner script
#[derive(Clone)]
pub struct SandboxLauncher {
    executor: Arc<dyn ProcessExecutor>,
    config: Arc<Config>,
}

impl SandboxLauncher {
    pub fn new(executor: Arc<dyn ProcessExecutor>, config: Arc<Config>) -> Self {
        Self { executor, config }
    }

    /// Run one sandbox and render its report
    pub async fn launch(&self, request: SandboxRequest) -> Result<String> {
        request.validate()?;

        let payload = serde_json::to_string(&request)?;
        let budget = request.timeout.saturating_add(self.config.sandbox_grace);

        // Removed when `script` is dropped at the end of this call
        let script = tempfile::Builder::new()
            .prefix("modal-mcp-sandbox-")
            .suffix(".py")
            .tempfile()?;
        tokio::fs::write(script.path(), RUNNER_SCRIPT).await?;
        let script_path = script
            .path()
            .to_str()
            .ok_or_else(|| Error::InvalidPath(script.path().to_string_lossy().into_owned()))?
            .to_string();

        info!(
            "Launching sandbox (image: {}, timeout: {}s, gpu: {:?})",
            request.image.as_str(),
            request.timeout,
            request.gpu
        );

        let spec = CommandSpec::new(
            self.config.python_bin.clone(),
            vec![script_path, payload],
        )
        .with_env(self.config.child_env());

        let output = self
            .executor
            .run(spec, Duration::from_secs(budget))
            .await
            .map_err(|e| match e {
                Error::CommandTimeout(_) => Error::SandboxTimeout(budget),
                other => other,
            })?;

        if !output.success() {
            warn!("Sandbox runner exited with {:?}", output.exit_code);
        }

        let report = SandboxReport::parse(&output.stdout);
        Ok(report.render(&strip_rich(output.stderr.trim())))
    }
}
