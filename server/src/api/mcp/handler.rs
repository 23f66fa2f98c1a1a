//! MCP Server Handler implementation
//!
//! Declares every Modal tool and delegates to [`ModalService`]. Each tool
//! returns plain text: the CLI output on success or the error message.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use tracing::{error, info};

use super::types::*;
use crate::service::cli::DEFAULT_CAPTURE_SECS;
use crate::service::{
    ModalService, SandboxOptions, DEFAULT_BILLING_PERIOD, DEFAULT_BILLING_RESOLUTION,
    DEFAULT_DICT_ITEMS, DEFAULT_PEEK_COUNT,
};
use crate::AppState;

/// MCP Handler exposing the Modal CLI as tools
#[derive(Clone)]
pub struct ModalMcpHandler {
    state: AppState,
    tool_router: ToolRouter<Self>,
}

impl ModalMcpHandler {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    fn modal(&self) -> &ModalService {
        &self.state.modal_service
    }
}

/// Render a tool result as the text sent back to the client
fn respond(tool: &str, result: crate::Result<String>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => {
            error!(code = e.code(), kind = ?e.kind(), "MCP: {} failed: {}", tool, e);
            e.to_string()
        }
    }
}

#[tool_router]
impl ModalMcpHandler {
    // ========================================================================
    // App Tools
    // ========================================================================

    #[tool(
        description = "Deploy a Modal app from an absolute path to a .py file. Returns the deploy output including app URLs."
    )]
    async fn deploy_app(&self, Parameters(params): Parameters<DeployAppParams>) -> String {
        info!("MCP: deploy_app called for {}", params.app_path);

        let result = self
            .modal()
            .deploy_app(&params.app_path, params.name, params.environment)
            .await;
        respond("deploy_app", result)
    }

    #[tool(description = "Run a Modal app's local entrypoint from an absolute file path.")]
    async fn run_app(&self, Parameters(params): Parameters<RunAppParams>) -> String {
        info!("MCP: run_app called for {}", params.app_path);

        let result = self.modal().run_app(&params.app_path, params.environment).await;
        respond("run_app", result)
    }

    #[tool(description = "List deployed and running Modal apps.")]
    async fn list_apps(&self, Parameters(params): Parameters<EnvironmentParams>) -> String {
        info!("MCP: list_apps called");

        respond("list_apps", self.modal().list_apps(params.environment).await)
    }

    #[tool(description = "Stop a running Modal app.")]
    async fn stop_app(&self, Parameters(params): Parameters<StopAppParams>) -> String {
        info!("MCP: stop_app called for {}", params.app_name);

        let result = self.modal().stop_app(&params.app_name, params.environment).await;
        respond("stop_app", result)
    }

    #[tool(
        description = "Capture an app's log stream for a few seconds (3 to 60, default 10) and return what was printed."
    )]
    async fn app_logs(&self, Parameters(params): Parameters<AppLogsParams>) -> String {
        info!("MCP: app_logs called for {}", params.app_name_or_id);

        let result = self
            .modal()
            .app_logs(
                &params.app_name_or_id,
                params.duration.unwrap_or(DEFAULT_CAPTURE_SECS),
                params.environment,
            )
            .await;
        respond("app_logs", result)
    }

    // ========================================================================
    // Container Tools
    // ========================================================================

    #[tool(description = "List running Modal containers.")]
    async fn list_containers(&self, Parameters(params): Parameters<EnvironmentParams>) -> String {
        info!("MCP: list_containers called");

        respond(
            "list_containers",
            self.modal().list_containers(params.environment).await,
        )
    }

    #[tool(
        description = "Capture a container's log stream for a few seconds (3 to 60, default 10)."
    )]
    async fn container_logs(&self, Parameters(params): Parameters<ContainerLogsParams>) -> String {
        info!("MCP: container_logs called for {}", params.container_id);

        let result = self
            .modal()
            .container_logs(
                &params.container_id,
                params.duration.unwrap_or(DEFAULT_CAPTURE_SECS),
            )
            .await;
        respond("container_logs", result)
    }

    #[tool(description = "Stop a running Modal container.")]
    async fn stop_container(&self, Parameters(params): Parameters<ContainerIdParams>) -> String {
        info!("MCP: stop_container called for {}", params.container_id);

        respond(
            "stop_container",
            self.modal().stop_container(&params.container_id).await,
        )
    }

    // ========================================================================
    // Volume Tools
    // ========================================================================

    #[tool(description = "List Modal volumes.")]
    async fn list_volumes(&self, Parameters(params): Parameters<EnvironmentParams>) -> String {
        info!("MCP: list_volumes called");

        respond("list_volumes", self.modal().list_volumes(params.environment).await)
    }

    #[tool(description = "List files and directories inside a volume.")]
    async fn list_volume_contents(
        &self,
        Parameters(params): Parameters<VolumeContentsParams>,
    ) -> String {
        info!("MCP: list_volume_contents called for {}", params.volume_name);

        let path = params.path.unwrap_or_else(|| "/".to_string());
        let result = self
            .modal()
            .list_volume_contents(&params.volume_name, &path, params.environment)
            .await;
        respond("list_volume_contents", result)
    }

    #[tool(description = "Create a new Modal volume.")]
    async fn create_volume(&self, Parameters(params): Parameters<VolumeNameParams>) -> String {
        info!("MCP: create_volume called for {}", params.volume_name);

        let result = self
            .modal()
            .create_volume(&params.volume_name, params.environment)
            .await;
        respond("create_volume", result)
    }

    #[tool(
        description = "Delete a Modal volume and all of its data. Requires confirm=true; without it nothing is deleted."
    )]
    async fn delete_volume(&self, Parameters(params): Parameters<DeleteVolumeParams>) -> String {
        info!(
            "MCP: delete_volume called for {} (confirm={})",
            params.volume_name, params.confirm
        );

        let result = self
            .modal()
            .delete_volume(&params.volume_name, params.confirm, params.environment)
            .await;
        respond("delete_volume", result)
    }

    #[tool(description = "Rename a Modal volume.")]
    async fn rename_volume(&self, Parameters(params): Parameters<RenameVolumeParams>) -> String {
        info!(
            "MCP: rename_volume called for {} -> {}",
            params.volume_name, params.new_name
        );

        let result = self
            .modal()
            .rename_volume(&params.volume_name, &params.new_name, params.environment)
            .await;
        respond("rename_volume", result)
    }

    #[tool(description = "Upload a local file or directory into a volume.")]
    async fn upload_to_volume(&self, Parameters(params): Parameters<UploadParams>) -> String {
        info!(
            "MCP: upload_to_volume called for {} -> {}",
            params.local_path, params.volume_name
        );

        let remote_path = params.remote_path.unwrap_or_else(|| "/".to_string());
        let result = self
            .modal()
            .upload_to_volume(
                &params.volume_name,
                &params.local_path,
                &remote_path,
                params.force,
                params.environment,
            )
            .await;
        respond("upload_to_volume", result)
    }

    #[tool(description = "Download a file or directory from a volume to the local machine.")]
    async fn download_from_volume(&self, Parameters(params): Parameters<DownloadParams>) -> String {
        info!(
            "MCP: download_from_volume called for {}:{}",
            params.volume_name, params.remote_path
        );

        let local_path = params.local_path.unwrap_or_else(|| ".".to_string());
        let result = self
            .modal()
            .download_from_volume(
                &params.volume_name,
                &params.remote_path,
                &local_path,
                params.force,
                params.environment,
            )
            .await;
        respond("download_from_volume", result)
    }

    #[tool(description = "Remove a file or directory from a volume.")]
    async fn remove_volume_file(
        &self,
        Parameters(params): Parameters<RemoveVolumeFileParams>,
    ) -> String {
        info!(
            "MCP: remove_volume_file called for {}:{}",
            params.volume_name, params.remote_path
        );

        let result = self
            .modal()
            .remove_volume_file(
                &params.volume_name,
                &params.remote_path,
                params.recursive,
                params.environment,
            )
            .await;
        respond("remove_volume_file", result)
    }

    // ========================================================================
    // Sandbox Tools
    // ========================================================================

    #[tool(
        description = "Run a shell command in an ephemeral Modal sandbox and return its stdout, stderr and exit code. Supports custom images, pip packages and GPUs."
    )]
    async fn run_sandbox_command(
        &self,
        Parameters(params): Parameters<SandboxCommandParams>,
    ) -> String {
        info!("MCP: run_sandbox_command called: {}", params.command);

        let options = SandboxOptions {
            image: params.image,
            python_version: params.python_version,
            pip_packages: params.pip_packages,
            timeout: params.timeout,
            gpu: params.gpu,
            environment: params.environment,
        };
        let result = self
            .modal()
            .run_sandbox_command(&params.command, options)
            .await;
        respond("run_sandbox_command", result)
    }

    #[tool(
        description = "Run Python code in an ephemeral Modal sandbox. Install dependencies with pip_packages and attach a GPU with gpu."
    )]
    async fn run_python_in_sandbox(
        &self,
        Parameters(params): Parameters<SandboxPythonParams>,
    ) -> String {
        info!(
            "MCP: run_python_in_sandbox called ({} bytes of code)",
            params.code.len()
        );

        let options = SandboxOptions {
            python_version: params.python_version,
            pip_packages: params.pip_packages,
            timeout: params.timeout,
            gpu: params.gpu,
            ..SandboxOptions::default()
        };
        let result = self
            .modal()
            .run_python_in_sandbox(&params.code, options)
            .await;
        respond("run_python_in_sandbox", result)
    }

    // ========================================================================
    // Secret Tools
    // ========================================================================

    #[tool(description = "List Modal secrets (names only, never values).")]
    async fn list_secrets(&self, Parameters(params): Parameters<EnvironmentParams>) -> String {
        info!("MCP: list_secrets called");

        respond("list_secrets", self.modal().list_secrets(params.environment).await)
    }

    #[tool(description = "Create a Modal secret from key/value pairs.")]
    async fn create_secret(&self, Parameters(params): Parameters<CreateSecretParams>) -> String {
        // Values are never logged
        info!(
            "MCP: create_secret called for {} ({} keys)",
            params.secret_name,
            params.key_values.len()
        );

        let result = self
            .modal()
            .create_secret(&params.secret_name, &params.key_values, params.environment)
            .await;
        respond("create_secret", result)
    }

    #[tool(description = "Delete a Modal secret. Requires confirm=true.")]
    async fn delete_secret(&self, Parameters(params): Parameters<DeleteSecretParams>) -> String {
        info!(
            "MCP: delete_secret called for {} (confirm={})",
            params.secret_name, params.confirm
        );

        let result = self
            .modal()
            .delete_secret(&params.secret_name, params.confirm, params.environment)
            .await;
        respond("delete_secret", result)
    }

    // ========================================================================
    // Queue Tools
    // ========================================================================

    #[tool(description = "List Modal queues.")]
    async fn list_queues(&self, Parameters(params): Parameters<EnvironmentParams>) -> String {
        info!("MCP: list_queues called");

        respond("list_queues", self.modal().list_queues(params.environment).await)
    }

    #[tool(description = "Create a named Modal queue.")]
    async fn create_queue(&self, Parameters(params): Parameters<QueueNameParams>) -> String {
        info!("MCP: create_queue called for {}", params.queue_name);

        let result = self
            .modal()
            .create_queue(&params.queue_name, params.environment)
            .await;
        respond("create_queue", result)
    }

    #[tool(description = "Delete a Modal queue. Requires confirm=true.")]
    async fn delete_queue(&self, Parameters(params): Parameters<DeleteQueueParams>) -> String {
        info!(
            "MCP: delete_queue called for {} (confirm={})",
            params.queue_name, params.confirm
        );

        let result = self
            .modal()
            .delete_queue(&params.queue_name, params.confirm, params.environment)
            .await;
        respond("delete_queue", result)
    }

    #[tool(description = "Remove all items from a queue, or from one partition.")]
    async fn clear_queue(&self, Parameters(params): Parameters<ClearQueueParams>) -> String {
        info!("MCP: clear_queue called for {}", params.queue_name);

        let result = self
            .modal()
            .clear_queue(&params.queue_name, params.partition, params.environment)
            .await;
        respond("clear_queue", result)
    }

    #[tool(description = "Show the next items in a queue without removing them.")]
    async fn peek_queue(&self, Parameters(params): Parameters<PeekQueueParams>) -> String {
        info!("MCP: peek_queue called for {}", params.queue_name);

        let result = self
            .modal()
            .peek_queue(
                &params.queue_name,
                params.n.unwrap_or(DEFAULT_PEEK_COUNT),
                params.partition,
                params.environment,
            )
            .await;
        respond("peek_queue", result)
    }

    #[tool(description = "Get the number of items in a queue.")]
    async fn queue_length(&self, Parameters(params): Parameters<QueueLengthParams>) -> String {
        info!("MCP: queue_length called for {}", params.queue_name);

        let result = self
            .modal()
            .queue_length(
                &params.queue_name,
                params.partition,
                params.total,
                params.environment,
            )
            .await;
        respond("queue_length", result)
    }

    // ========================================================================
    // Dict Tools
    // ========================================================================

    #[tool(description = "List Modal dicts.")]
    async fn list_dicts(&self, Parameters(params): Parameters<EnvironmentParams>) -> String {
        info!("MCP: list_dicts called");

        respond("list_dicts", self.modal().list_dicts(params.environment).await)
    }

    #[tool(description = "Create a named Modal dict.")]
    async fn create_dict(&self, Parameters(params): Parameters<DictNameParams>) -> String {
        info!("MCP: create_dict called for {}", params.dict_name);

        let result = self
            .modal()
            .create_dict(&params.dict_name, params.environment)
            .await;
        respond("create_dict", result)
    }

    #[tool(description = "Delete a Modal dict. Requires confirm=true.")]
    async fn delete_dict(&self, Parameters(params): Parameters<DeleteDictParams>) -> String {
        info!(
            "MCP: delete_dict called for {} (confirm={})",
            params.dict_name, params.confirm
        );

        let result = self
            .modal()
            .delete_dict(&params.dict_name, params.confirm, params.environment)
            .await;
        respond("delete_dict", result)
    }

    #[tool(description = "Remove all items from a dict.")]
    async fn clear_dict(&self, Parameters(params): Parameters<DictNameParams>) -> String {
        info!("MCP: clear_dict called for {}", params.dict_name);

        let result = self
            .modal()
            .clear_dict(&params.dict_name, params.environment)
            .await;
        respond("clear_dict", result)
    }

    #[tool(description = "Get the value stored under a key in a dict.")]
    async fn get_dict_value(&self, Parameters(params): Parameters<DictValueParams>) -> String {
        info!(
            "MCP: get_dict_value called for {}[{}]",
            params.dict_name, params.key
        );

        let result = self
            .modal()
            .get_dict_value(&params.dict_name, &params.key, params.environment)
            .await;
        respond("get_dict_value", result)
    }

    #[tool(description = "List the first n items in a dict (default 20).")]
    async fn list_dict_items(&self, Parameters(params): Parameters<DictItemsParams>) -> String {
        info!("MCP: list_dict_items called for {}", params.dict_name);

        let result = self
            .modal()
            .list_dict_items(
                &params.dict_name,
                params.n.unwrap_or(DEFAULT_DICT_ITEMS),
                params.environment,
            )
            .await;
        respond("list_dict_items", result)
    }

    // ========================================================================
    // Environment, Profile and Billing Tools
    // ========================================================================

    #[tool(description = "List Modal environments in the current workspace.")]
    async fn list_environments(&self) -> String {
        info!("MCP: list_environments called");

        respond("list_environments", self.modal().list_environments().await)
    }

    #[tool(description = "Create a new Modal environment.")]
    async fn create_environment(&self, Parameters(params): Parameters<EnvNameParams>) -> String {
        info!("MCP: create_environment called for {}", params.env_name);

        respond(
            "create_environment",
            self.modal().create_environment(&params.env_name).await,
        )
    }

    #[tool(
        description = "Delete a Modal environment and every resource in it. Requires confirm=true."
    )]
    async fn delete_environment(
        &self,
        Parameters(params): Parameters<DeleteEnvironmentParams>,
    ) -> String {
        info!(
            "MCP: delete_environment called for {} (confirm={})",
            params.env_name, params.confirm
        );

        let result = self
            .modal()
            .delete_environment(&params.env_name, params.confirm)
            .await;
        respond("delete_environment", result)
    }

    #[tool(description = "Show the active Modal profile (workspace).")]
    async fn current_profile(&self) -> String {
        info!("MCP: current_profile called");

        respond("current_profile", self.modal().current_profile().await)
    }

    #[tool(description = "Show information about the Modal token in use.")]
    async fn token_info(&self) -> String {
        info!("MCP: token_info called");

        respond("token_info", self.modal().token_info().await)
    }

    #[tool(
        description = "Report workspace usage costs for a period ('this month', 'last month', 'today', ...) at daily (d) or hourly (h) resolution."
    )]
    async fn billing_usage(&self, Parameters(params): Parameters<BillingParams>) -> String {
        let period = params
            .period
            .unwrap_or_else(|| DEFAULT_BILLING_PERIOD.to_string());
        let resolution = params
            .resolution
            .unwrap_or_else(|| DEFAULT_BILLING_RESOLUTION.to_string());
        info!("MCP: billing_usage called for {} ({})", period, resolution);

        respond(
            "billing_usage",
            self.modal().billing_usage(&period, &resolution).await,
        )
    }
}

#[tool_handler]
impl ServerHandler for ModalMcpHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Modal MCP Server - Manage Modal apps, containers, volumes, secrets, \
                queues, dicts and environments through the Modal CLI, and run code in \
                ephemeral sandboxes. Destructive tools require confirm=true."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::infra::process::MockProcessExecutor;
    use crate::Config;

    fn handler() -> ModalMcpHandler {
        let mut mock = MockProcessExecutor::new();
        mock.expect_run().times(0);
        mock.expect_capture().times(0);

        let config = Arc::new(Config::default());
        let state = AppState {
            config: config.clone(),
            modal_service: Arc::new(ModalService::new(Arc::new(mock), config)),
        };
        ModalMcpHandler::new(state)
    }

    #[test]
    fn test_all_tools_registered() {
        let tools = handler().tool_router.list_all();
        assert_eq!(tools.len(), 39);
        assert!(tools.iter().any(|t| t.name == "run_sandbox_command"));
        assert!(tools.iter().any(|t| t.name == "billing_usage"));
    }

    #[tokio::test]
    async fn test_gate_returns_plain_text() {
        let text = handler()
            .delete_dict(Parameters(DeleteDictParams {
                dict_name: "cache".to_string(),
                confirm: false,
                environment: None,
            }))
            .await;
        assert_eq!(
            text,
            "Safety check: set confirm=True to actually delete the dict."
        );
    }

    #[tokio::test]
    async fn test_errors_rendered_as_text() {
        let text = handler()
            .deploy_app(Parameters(DeployAppParams {
                app_path: "relative/path.py".to_string(),
                name: None,
                environment: None,
            }))
            .await;
        assert_eq!(text, "Error: Path must be absolute, got: relative/path.py");
    }

    #[test]
    fn test_server_info_enables_tools() {
        let info = handler().get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap().contains("confirm=true"));
    }
}
