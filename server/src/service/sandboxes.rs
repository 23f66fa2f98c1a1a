//! Sandbox tools

use super::{non_empty, ModalService};
use crate::domain::sandbox::{
    shell_quote, SandboxImage, SandboxRequest, DEFAULT_PYTHON_VERSION, DEFAULT_SANDBOX_TIMEOUT,
};
use crate::error::Result;

/// Caller-facing sandbox options shared by both sandbox tools
#[derive(Debug, Clone, Default)]
pub struct SandboxOptions {
    pub image: Option<String>,
    pub python_version: Option<String>,
    pub pip_packages: Option<Vec<String>>,
    pub timeout: Option<u64>,
    pub gpu: Option<String>,
    pub environment: Option<String>,
}

impl ModalService {
    pub async fn run_sandbox_command(&self, command: &str, options: SandboxOptions) -> Result<String> {
        let request = SandboxRequest {
            command: command.to_string(),
            image: SandboxImage::parse(options.image.as_deref().unwrap_or_default())?,
            python_version: non_empty(options.python_version)
                .unwrap_or_else(|| DEFAULT_PYTHON_VERSION.to_string()),
            pip_packages: options.pip_packages.unwrap_or_default(),
            timeout: options.timeout.unwrap_or(DEFAULT_SANDBOX_TIMEOUT),
            gpu: non_empty(options.gpu),
            environment: self.environment(options.environment),
        };
        self.sandbox.launch(request).await
    }

    pub async fn run_python_in_sandbox(&self, code: &str, options: SandboxOptions) -> Result<String> {
        let command = format!("python3 -c {}", shell_quote(code));
        self.run_sandbox_command(&command, options).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::super::test_support::*;
    use super::*;
    use crate::domain::types::CommandOutput;
    use crate::infra::process::MockProcessExecutor;

    fn sandbox_output(stdout: &str) -> CommandOutput {
        CommandOutput {
            exit_code: Some(0),
            stdout: format!("===STDOUT===\n{}\n===STDERR===\n\n===RC=0===\n", stdout),
            stderr: String::new(),
            timed_out: false,
        }
    }

    fn payload(args: &[String]) -> serde_json::Value {
        serde_json::from_str(&args[1]).expect("payload should be JSON")
    }

    #[tokio::test]
    async fn test_run_sandbox_command_defaults() {
        let mut mock = MockProcessExecutor::new();
        mock.expect_run()
            .withf(|spec, timeout| {
                let p = payload(&spec.args);
                p["command"] == "ls /"
                    && p["image"] == "debian_slim"
                    && p["python_version"] == "3.12"
                    && p["timeout"] == 120
                    && p["gpu"].is_null()
                    && *timeout == Duration::from_secs(180)
            })
            .times(1)
            .returning(|_, _| Ok(sandbox_output("bin\netc")));

        let text = service(mock)
            .run_sandbox_command("ls /", SandboxOptions::default())
            .await
            .unwrap();
        assert_eq!(text, "bin\netc");
    }

    #[tokio::test]
    async fn test_run_sandbox_command_rejects_unknown_image() {
        let options = SandboxOptions {
            image: Some("debian_slim(); import os".to_string()),
            ..SandboxOptions::default()
        };
        let err = service(untouched())
            .run_sandbox_command("ls", options)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Error: Unsupported image"));
    }

    #[tokio::test]
    async fn test_run_python_in_sandbox_quotes_code() {
        let mut mock = MockProcessExecutor::new();
        mock.expect_run()
            .withf(|spec, _| {
                let p = payload(&spec.args);
                p["command"] == "python3 -c 'print('\\''hi'\\'')'" && p["gpu"] == "A100"
            })
            .times(1)
            .returning(|_, _| Ok(sandbox_output("hi")));

        let options = SandboxOptions {
            gpu: Some("A100".to_string()),
            ..SandboxOptions::default()
        };
        let text = service(mock)
            .run_python_in_sandbox("print('hi')", options)
            .await
            .unwrap();
        assert_eq!(text, "hi");
    }
}
