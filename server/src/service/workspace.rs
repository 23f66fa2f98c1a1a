//! Environment, profile, token and billing tools

use super::cli::CliArgs;
use super::{require, ModalService};
use crate::error::{Error, Result};

pub const CONFIRM_DELETE_ENVIRONMENT: &str = "Safety check: set confirm=True to actually delete the environment. All resources in it will be deleted.";

pub const DEFAULT_BILLING_PERIOD: &str = "this month";
pub const DEFAULT_BILLING_RESOLUTION: &str = "d";

impl ModalService {
    pub async fn list_environments(&self) -> Result<String> {
        self.cli
            .run(CliArgs::new(["environment", "list"]), self.config.command_timeout)
            .await
    }

    pub async fn create_environment(&self, env_name: &str) -> Result<String> {
        let args = CliArgs::new(["environment", "create"]).arg(require("env_name", env_name)?);
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn delete_environment(&self, env_name: &str, confirm: bool) -> Result<String> {
        if !confirm {
            return Ok(CONFIRM_DELETE_ENVIRONMENT.to_string());
        }

        let args = CliArgs::new(["environment", "delete"])
            .arg(require("env_name", env_name)?)
            .arg("--yes");
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn current_profile(&self) -> Result<String> {
        self.cli
            .run(CliArgs::new(["profile", "current"]), self.config.command_timeout)
            .await
    }

    pub async fn token_info(&self) -> Result<String> {
        self.cli
            .run(CliArgs::new(["token", "info"]), self.config.command_timeout)
            .await
    }

    pub async fn billing_usage(&self, period: &str, resolution: &str) -> Result<String> {
        if resolution != "d" && resolution != "h" {
            return Err(Error::invalid(format!(
                "Invalid resolution: {} (expected \"d\" or \"h\")",
                resolution
            )));
        }

        let args = CliArgs::new(["billing", "report", "--for"])
            .arg(require("period", period)?)
            .arg("-r")
            .arg(resolution);
        self.cli.run(args, self.config.billing_timeout).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::super::test_support::*;
    use super::*;
    use crate::infra::process::MockProcessExecutor;

    #[tokio::test]
    async fn test_delete_environment_requires_confirmation() {
        let text = service(untouched()).delete_environment("staging", false).await.unwrap();
        assert_eq!(text, CONFIRM_DELETE_ENVIRONMENT);
    }

    #[tokio::test]
    async fn test_environment_tools() {
        let mock = expect_args(&["environment", "list"], "main\nstaging");
        assert_eq!(service(mock).list_environments().await.unwrap(), "main\nstaging");

        let mock = expect_args(&["environment", "create", "staging"], "Created");
        assert_eq!(service(mock).create_environment("staging").await.unwrap(), "Created");

        let mock = expect_args(&["environment", "delete", "staging", "--yes"], "Deleted");
        assert_eq!(service(mock).delete_environment("staging", true).await.unwrap(), "Deleted");
    }

    #[tokio::test]
    async fn test_profile_and_token() {
        let mock = expect_args(&["profile", "current"], "acme");
        assert_eq!(service(mock).current_profile().await.unwrap(), "acme");

        let mock = expect_args(&["token", "info"], "Token: ak-123");
        assert_eq!(service(mock).token_info().await.unwrap(), "Token: ak-123");
    }

    #[tokio::test]
    async fn test_billing_usage_uses_billing_timeout() {
        let mut mock = MockProcessExecutor::new();
        mock.expect_run()
            .withf(|spec, timeout| {
                spec.args == ["billing", "report", "--for", "this month", "-r", "d"]
                    && *timeout == Duration::from_secs(30)
            })
            .times(1)
            .returning(|_, _| Ok(ok("$12.34")));

        let text = service(mock)
            .billing_usage(DEFAULT_BILLING_PERIOD, DEFAULT_BILLING_RESOLUTION)
            .await
            .unwrap();
        assert_eq!(text, "$12.34");
    }

    #[tokio::test]
    async fn test_billing_usage_rejects_bad_resolution() {
        let err = service(untouched())
            .billing_usage("today", "weekly")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid resolution"));
    }
}
