//! MCP Tool Parameter Types
//!
//! Every optional field falls back to the documented default when omitted.
//! Boolean flags default to `false`.

use std::collections::BTreeMap;

use rmcp::schemars;
use serde::Deserialize;

// ============================================================================
// App Tool Parameters
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeployAppParams {
    #[schemars(description = "Absolute path to the Python file defining the Modal app")]
    pub app_path: String,

    #[schemars(description = "Optional name for the deployment")]
    pub name: Option<String>,

    #[schemars(description = "Modal environment to deploy into")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RunAppParams {
    #[schemars(description = "Absolute path to the Python file to run")]
    pub app_path: String,

    #[schemars(description = "Modal environment to run in")]
    pub environment: Option<String>,
}

/// Shared by every tool whose only argument is the environment
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EnvironmentParams {
    #[schemars(description = "Modal environment (defaults to the active one)")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct StopAppParams {
    #[schemars(description = "Name or ID of the app to stop")]
    pub app_name: String,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AppLogsParams {
    #[schemars(description = "Name or ID of the app")]
    pub app_name_or_id: String,

    #[schemars(description = "Seconds of log stream to capture, clamped to 3..60 (default: 10)")]
    pub duration: Option<i64>,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

// ============================================================================
// Container Tool Parameters
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ContainerLogsParams {
    #[schemars(description = "ID of the container")]
    pub container_id: String,

    #[schemars(description = "Seconds of log stream to capture, clamped to 3..60 (default: 10)")]
    pub duration: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ContainerIdParams {
    #[schemars(description = "ID of the container")]
    pub container_id: String,
}

// ============================================================================
// Volume Tool Parameters
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct VolumeContentsParams {
    #[schemars(description = "Name of the volume")]
    pub volume_name: String,

    #[schemars(description = "Path inside the volume (default: /)")]
    pub path: Option<String>,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct VolumeNameParams {
    #[schemars(description = "Name of the volume")]
    pub volume_name: String,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteVolumeParams {
    #[schemars(description = "Name of the volume to delete")]
    pub volume_name: String,

    #[schemars(description = "Must be true to actually delete the volume")]
    #[serde(default)]
    pub confirm: bool,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RenameVolumeParams {
    #[schemars(description = "Current name of the volume")]
    pub volume_name: String,

    #[schemars(description = "New name for the volume")]
    pub new_name: String,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UploadParams {
    #[schemars(description = "Name of the volume")]
    pub volume_name: String,

    #[schemars(description = "Local file or directory to upload")]
    pub local_path: String,

    #[schemars(description = "Destination path inside the volume (default: /)")]
    pub remote_path: Option<String>,

    #[schemars(description = "Overwrite existing files")]
    #[serde(default)]
    pub force: bool,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DownloadParams {
    #[schemars(description = "Name of the volume")]
    pub volume_name: String,

    #[schemars(description = "Path inside the volume to download")]
    pub remote_path: String,

    #[schemars(description = "Local destination (default: .)")]
    pub local_path: Option<String>,

    #[schemars(description = "Overwrite existing local files")]
    #[serde(default)]
    pub force: bool,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveVolumeFileParams {
    #[schemars(description = "Name of the volume")]
    pub volume_name: String,

    #[schemars(description = "Path inside the volume to remove")]
    pub remote_path: String,

    #[schemars(description = "Remove directories recursively")]
    #[serde(default)]
    pub recursive: bool,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

// ============================================================================
// Sandbox Tool Parameters
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SandboxCommandParams {
    #[schemars(description = "Shell command to run inside the sandbox")]
    pub command: String,

    #[schemars(description = "Base image: debian_slim (default) or ubuntu")]
    pub image: Option<String>,

    #[schemars(description = "Python version for the image (default: 3.12)")]
    pub python_version: Option<String>,

    #[schemars(description = "pip packages to install in the image")]
    pub pip_packages: Option<Vec<String>>,

    #[schemars(description = "Sandbox timeout in seconds (default: 120)")]
    pub timeout: Option<u64>,

    #[schemars(description = "GPU type to attach, e.g. T4 or A100")]
    pub gpu: Option<String>,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SandboxPythonParams {
    #[schemars(description = "Python source code to execute")]
    pub code: String,

    #[schemars(description = "pip packages to install in the image")]
    pub pip_packages: Option<Vec<String>>,

    #[schemars(description = "Python version for the image (default: 3.12)")]
    pub python_version: Option<String>,

    #[schemars(description = "Sandbox timeout in seconds (default: 120)")]
    pub timeout: Option<u64>,

    #[schemars(description = "GPU type to attach, e.g. T4 or A100")]
    pub gpu: Option<String>,
}

// ============================================================================
// Secret Tool Parameters
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateSecretParams {
    #[schemars(description = "Name of the secret")]
    pub secret_name: String,

    #[schemars(description = "Key/value pairs stored in the secret")]
    pub key_values: BTreeMap<String, String>,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteSecretParams {
    #[schemars(description = "Name of the secret to delete")]
    pub secret_name: String,

    #[schemars(description = "Must be true to actually delete the secret")]
    #[serde(default)]
    pub confirm: bool,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

// ============================================================================
// Queue Tool Parameters
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QueueNameParams {
    #[schemars(description = "Name of the queue")]
    pub queue_name: String,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteQueueParams {
    #[schemars(description = "Name of the queue to delete")]
    pub queue_name: String,

    #[schemars(description = "Must be true to actually delete the queue")]
    #[serde(default)]
    pub confirm: bool,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ClearQueueParams {
    #[schemars(description = "Name of the queue")]
    pub queue_name: String,

    #[schemars(description = "Only clear this partition")]
    pub partition: Option<String>,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PeekQueueParams {
    #[schemars(description = "Name of the queue")]
    pub queue_name: String,

    #[schemars(description = "Number of items to peek (default: 5)")]
    pub n: Option<u32>,

    #[schemars(description = "Partition to peek")]
    pub partition: Option<String>,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QueueLengthParams {
    #[schemars(description = "Name of the queue")]
    pub queue_name: String,

    #[schemars(description = "Partition to measure")]
    pub partition: Option<String>,

    #[schemars(description = "Count items across all partitions")]
    #[serde(default)]
    pub total: bool,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

// ============================================================================
// Dict Tool Parameters
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DictNameParams {
    #[schemars(description = "Name of the dict")]
    pub dict_name: String,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteDictParams {
    #[schemars(description = "Name of the dict to delete")]
    pub dict_name: String,

    #[schemars(description = "Must be true to actually delete the dict")]
    #[serde(default)]
    pub confirm: bool,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DictValueParams {
    #[schemars(description = "Name of the dict")]
    pub dict_name: String,

    #[schemars(description = "Key to look up")]
    pub key: String,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DictItemsParams {
    #[schemars(description = "Name of the dict")]
    pub dict_name: String,

    #[schemars(description = "Number of items to list (default: 20)")]
    pub n: Option<u32>,

    #[schemars(description = "Modal environment")]
    pub environment: Option<String>,
}

// ============================================================================
// Environment / Billing Tool Parameters
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EnvNameParams {
    #[schemars(description = "Name of the environment")]
    pub env_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteEnvironmentParams {
    #[schemars(description = "Name of the environment to delete")]
    pub env_name: String,

    #[schemars(description = "Must be true to actually delete the environment")]
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BillingParams {
    #[schemars(description = "Reporting period, e.g. 'this month', 'last month', 'today' (default: this month)")]
    pub period: Option<String>,

    #[schemars(description = "Resolution: d (daily, default) or h (hourly)")]
    pub resolution: Option<String>,
}
