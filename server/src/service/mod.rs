//! Service layer
//!
//! [`ModalService`] owns one method per MCP tool. Methods validate their
//! input, build the CLI argument vector and hand it to [`cli::ModalCli`] or
//! the [`sandbox::SandboxLauncher`]. Validation failures and safety gates
//! return before any process is spawned.

pub mod cli;
pub mod output;
pub mod sandbox;

mod apps;
mod objects;
mod sandboxes;
mod volumes;
mod workspace;

pub use objects::{DEFAULT_DICT_ITEMS, DEFAULT_PEEK_COUNT};
pub use sandboxes::SandboxOptions;
pub use workspace::{DEFAULT_BILLING_PERIOD, DEFAULT_BILLING_RESOLUTION};

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::infra::process::ProcessExecutor;
use crate::Config;
use cli::ModalCli;
use sandbox::SandboxLauncher;

/// Tool implementations backed by the Modal CLI
#[derive(Clone)]
pub struct ModalService {
    cli: ModalCli,
    sandbox: SandboxLauncher,
    config: Arc<Config>,
}

impl ModalService {
    /// Create a new Modal service
    pub fn new(executor: Arc<dyn ProcessExecutor>, config: Arc<Config>) -> Self {
        Self {
            cli: ModalCli::new(executor.clone(), config.clone()),
            sandbox: SandboxLauncher::new(executor, config.clone()),
            config,
        }
    }

    /// Requested environment, falling back to the configured default
    fn environment(&self, requested: Option<String>) -> Option<String> {
        non_empty(requested).or_else(|| self.config.default_environment.clone())
    }
}

/// Treat blank optional strings as absent
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Reject blank required identifiers
fn require(field: &str, value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::invalid(format!(
            "Invalid parameter: {} must not be empty",
            field
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::types::CommandOutput;
    use crate::infra::process::MockProcessExecutor;

    pub fn service(mock: MockProcessExecutor) -> ModalService {
        ModalService::new(Arc::new(mock), Arc::new(Config::default()))
    }

    pub fn service_with(mock: MockProcessExecutor, config: Config) -> ModalService {
        ModalService::new(Arc::new(mock), Arc::new(config))
    }

    /// Mock that fails the test if any process is spawned
    pub fn untouched() -> MockProcessExecutor {
        let mut mock = MockProcessExecutor::new();
        mock.expect_run().times(0);
        mock.expect_capture().times(0);
        mock
    }

    /// Mock expecting exactly one `run` with the given arguments
    pub fn expect_args(expected: &[&str], stdout: &str) -> MockProcessExecutor {
        let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        let stdout = stdout.to_string();
        let mut mock = MockProcessExecutor::new();
        mock.expect_run()
            .withf(move |spec, _| spec.args == expected)
            .times(1)
            .returning(move |_, _| Ok(ok(&stdout)));
        mock
    }

    pub fn ok(stdout: &str) -> CommandOutput {
        CommandOutput {
            exit_code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
            timed_out: false,
        }
    }
}
