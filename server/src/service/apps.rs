//! App and container tools

use std::path::{Path, PathBuf};

use super::cli::CliArgs;
use super::{non_empty, require, ModalService};
use crate::error::{Error, Result};

/// Check that an app file path is absolute and exists
fn existing_app_path(app_path: &str) -> Result<PathBuf> {
    let path = Path::new(app_path);
    if !path.is_absolute() {
        return Err(Error::PathNotAbsolute(app_path.to_string()));
    }
    if !path.exists() {
        return Err(Error::FileNotFound(app_path.to_string()));
    }
    Ok(path.to_path_buf())
}

impl ModalService {
    pub async fn deploy_app(
        &self,
        app_path: &str,
        name: Option<String>,
        environment: Option<String>,
    ) -> Result<String> {
        let path = existing_app_path(app_path)?;
        if path.extension().and_then(|e| e.to_str()) != Some("py") {
            let suffix = path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            return Err(Error::InvalidExtension(suffix));
        }

        let args = CliArgs::new(["deploy"])
            .arg(path.to_string_lossy())
            .opt("--name", non_empty(name))
            .env(self.environment(environment));
        self.cli.run(args, self.config.deploy_timeout).await
    }

    pub async fn run_app(&self, app_path: &str, environment: Option<String>) -> Result<String> {
        let path = existing_app_path(app_path)?;

        let args = CliArgs::new(["run"])
            .arg(path.to_string_lossy())
            .env(self.environment(environment));
        self.cli.run(args, self.config.deploy_timeout).await
    }

    pub async fn list_apps(&self, environment: Option<String>) -> Result<String> {
        let args = CliArgs::new(["app", "list"]).env(self.environment(environment));
        self.cli.run_json(args, self.config.command_timeout).await
    }

    pub async fn stop_app(&self, app_name: &str, environment: Option<String>) -> Result<String> {
        let args = CliArgs::new(["app", "stop"])
            .arg(require("app_name", app_name)?)
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn app_logs(
        &self,
        app_name_or_id: &str,
        duration: i64,
        environment: Option<String>,
    ) -> Result<String> {
        let args = CliArgs::new(["app", "logs"])
            .arg(require("app_name_or_id", app_name_or_id)?)
            .env(self.environment(environment));
        self.cli.streaming_capture(args, duration).await
    }

    pub async fn list_containers(&self, environment: Option<String>) -> Result<String> {
        let args = CliArgs::new(["container", "list"]).env(self.environment(environment));
        self.cli.run_json(args, self.config.command_timeout).await
    }

    pub async fn container_logs(&self, container_id: &str, duration: i64) -> Result<String> {
        let args = CliArgs::new(["container", "logs"]).arg(require("container_id", container_id)?);
        self.cli.streaming_capture(args, duration).await
    }

    pub async fn stop_container(&self, container_id: &str) -> Result<String> {
        let args = CliArgs::new(["container", "stop"]).arg(require("container_id", container_id)?);
        self.cli.run(args, self.config.command_timeout).await
    }
}
