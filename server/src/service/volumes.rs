//! Volume tools

use std::path::Path;

use super::cli::CliArgs;
use super::{require, ModalService};
use crate::error::{Error, Result};

pub const CONFIRM_DELETE_VOLUME: &str =
    "Safety check: set confirm=True to actually delete the volume. This cannot be undone.";

impl ModalService {
    pub async fn list_volumes(&self, environment: Option<String>) -> Result<String> {
        let args = CliArgs::new(["volume", "list"]).env(self.environment(environment));
        self.cli.run_json(args, self.config.command_timeout).await
    }

    pub async fn list_volume_contents(
        &self,
        volume_name: &str,
        path: &str,
        environment: Option<String>,
    ) -> Result<String> {
        let path = if path.trim().is_empty() { "/" } else { path };
        let args = CliArgs::new(["volume", "ls"])
            .arg(require("volume_name", volume_name)?)
            .arg(path)
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn create_volume(&self, volume_name: &str, environment: Option<String>) -> Result<String> {
        let args = CliArgs::new(["volume", "create"])
            .arg(require("volume_name", volume_name)?)
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn delete_volume(
        &self,
        volume_name: &str,
        confirm: bool,
        environment: Option<String>,
    ) -> Result<String> {
        if !confirm {
            return Ok(CONFIRM_DELETE_VOLUME.to_string());
        }

        let args = CliArgs::new(["volume", "delete"])
            .arg(require("volume_name", volume_name)?)
            .arg("--yes")
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn rename_volume(
        &self,
        volume_name: &str,
        new_name: &str,
        environment: Option<String>,
    ) -> Result<String> {
        let args = CliArgs::new(["volume", "rename"])
            .arg(require("volume_name", volume_name)?)
            .arg(require("new_name", new_name)?)
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn upload_to_volume(
        &self,
        volume_name: &str,
        local_path: &str,
        remote_path: &str,
        force: bool,
        environment: Option<String>,
    ) -> Result<String> {
        if !Path::new(local_path).exists() {
            return Err(Error::LocalPathNotFound(local_path.to_string()));
        }

        let args = CliArgs::new(["volume", "put"])
            .arg(require("volume_name", volume_name)?)
            .arg(local_path)
            .arg(remote_path)
            .flag("--force", force)
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn download_from_volume(
        &self,
        volume_name: &str,
        remote_path: &str,
        local_path: &str,
        force: bool,
        environment: Option<String>,
    ) -> Result<String> {
        let args = CliArgs::new(["volume", "get"])
            .arg(require("volume_name", volume_name)?)
            .arg(require("remote_path", remote_path)?)
            .arg(local_path)
            .flag("--force", force)
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }

    pub async fn remove_volume_file(
        &self,
        volume_name: &str,
        remote_path: &str,
        recursive: bool,
        environment: Option<String>,
    ) -> Result<String> {
        let args = CliArgs::new(["volume", "rm"])
            .arg(require("volume_name", volume_name)?)
            .arg(require("remote_path", remote_path)?)
            .flag("-r", recursive)
            .env(self.environment(environment));
        self.cli.run(args, self.config.command_timeout).await
    }
}
