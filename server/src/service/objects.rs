//! Secret, queue and dict tools

use std::collections::BTreeMap;

use super::cli::CliArgs;
use super::{non_empty, require, ModalService};
use crate::error::{Error, Result};

pub const CONFIRM_DELETE_SECRET: &str =
    "Safety check: set confirm=True to actually delete the secret. This cannot be undone.";
pub const CONFIRM_DELETE_QUEUE: &str = "Safety check: set confirm=True to actually delete the queue.";
pub const CONFIRM_DELETE_DICT: &str = "Safety check: set confirm=True to actually delete the dict.";

pub const DEFAULT_PEEK_COUNT: u32 = 5;
pub const DEFAULT_DICT_ITEMS: u32 = 20;

impl ModalService {
    // ------------------------------------------------------------------------
    // Secrets
    // ------------------------------------------------------------------------

    pub async fn list_secrets(&self, environment: Option<String>) -> Result<String> {
        let args = CliArgs::new(["secret", "list"]).env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn create_secret(
        &self,
        secret_name: &str,
        key_values: &BTreeMap<String, String>,
        environment: Option<String>,
    ) -> Result<String> {
        if key_values.is_empty() {
            return Err(Error::invalid(
                "key_values must contain at least one key-value pair.",
            ));
        }
        if let Some(key) = key_values.keys().find(|k| k.is_empty() || k.contains('=')) {
            return Err(Error::invalid(format!(
                "Invalid parameter: secret key '{}' must be non-empty and must not contain '='",
                key
            )));
        }

        let mut args = CliArgs::new(["secret", "create"]).arg(require("secret_name", secret_name)?);
        for (key, value) in key_values {
            args = args.secret_arg(format!("{}={}", key, value));
        }
        let args = args.env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn delete_secret(
        &self,
        secret_name: &str,
        confirm: bool,
        environment: Option<String>,
    ) -> Result<String> {
        if !confirm {
            return Ok(CONFIRM_DELETE_SECRET.to_string());
        }

        let args = CliArgs::new(["secret", "delete"])
            .arg(require("secret_name", secret_name)?)
            .arg("--yes")
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    // ------------------------------------------------------------------------
    // Queues
    // ------------------------------------------------------------------------

    pub async fn list_queues(&self, environment: Option<String>) -> Result<String> {
        let args = CliArgs::new(["queue", "list"]).env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn create_queue(&self, queue_name: &str, environment: Option<String>) -> Result<String> {
        let args = CliArgs::new(["queue", "create"])
            .arg(require("queue_name", queue_name)?)
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn delete_queue(
        &self,
        queue_name: &str,
        confirm: bool,
        environment: Option<String>,
    ) -> Result<String> {
        if !confirm {
            return Ok(CONFIRM_DELETE_QUEUE.to_string());
        }

        let args = CliArgs::new(["queue", "delete"])
            .arg(require("queue_name", queue_name)?)
            .arg("--yes")
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn clear_queue(
        &self,
        queue_name: &str,
        partition: Option<String>,
        environment: Option<String>,
    ) -> Result<String> {
        let args = CliArgs::new(["queue", "clear"])
            .arg(require("queue_name", queue_name)?)
            .opt("-p", non_empty(partition))
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn peek_queue(
        &self,
        queue_name: &str,
        n: u32,
        partition: Option<String>,
        environment: Option<String>,
    ) -> Result<String> {
        let args = CliArgs::new(["queue", "peek"])
            .arg(require("queue_name", queue_name)?)
            .arg(n.to_string())
            .opt("-p", non_empty(partition))
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn queue_length(
        &self,
        queue_name: &str,
        partition: Option<String>,
        total: bool,
        environment: Option<String>,
    ) -> Result<String> {
        let args = CliArgs::new(["queue", "len"])
            .arg(require("queue_name", queue_name)?)
            .opt("-p", non_empty(partition))
            .flag("-t", total)
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    // ------------------------------------------------------------------------
    // Dicts
    // ------------------------------------------------------------------------

    pub async fn list_dicts(&self, environment: Option<String>) -> Result<String> {
        let args = CliArgs::new(["dict", "list"]).env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn create_dict(&self, dict_name: &str, environment: Option<String>) -> Result<String> {
        let args = CliArgs::new(["dict", "create"])
            .arg(require("dict_name", dict_name)?)
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn delete_dict(
        &self,
        dict_name: &str,
        confirm: bool,
        environment: Option<String>,
    ) -> Result<String> {
        if !confirm {
            return Ok(CONFIRM_DELETE_DICT.to_string());
        }

        let args = CliArgs::new(["dict", "delete"])
            .arg(require("dict_name", dict_name)?)
            .arg("--yes")
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn clear_dict(&self, dict_name: &str, environment: Option<String>) -> Result<String> {
        let args = CliArgs::new(["dict", "clear"])
            .arg(require("dict_name", dict_name)?)
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn get_dict_value(
        &self,
        dict_name: &str,
        key: &str,
        environment: Option<String>,
    ) -> Result<String> {
        let args = CliArgs::new(["dict", "get"])
            .arg(require("dict_name", dict_name)?)
            .arg(require("key", key)?)
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn list_dict_items(
        &self,
        dict_name: &str,
        n: u32,
        environment: Option<String>,
    ) -> Result<String> {
        let args = CliArgs::new(["dict", "items"])
            .arg(require("dict_name", dict_name)?)
            .arg(n.to_string())
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }
}
