//! Server configuration

use std::collections::HashMap;

use serde::Deserialize;

/// Environment overrides applied to every child process so the wrapped CLI
/// prints plain, uncoloured, wide output.
pub const CHILD_ENV_OVERRIDES: [(&str, &str); 3] =
    [("TERM", "dumb"), ("NO_COLOR", "1"), ("COLUMNS", "200")];

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path or name of the Modal CLI executable
    #[serde(default = "default_cli_bin")]
    pub cli_bin: String,

    /// Python interpreter used to launch the sandbox runner script
    #[serde(default = "default_python_bin")]
    pub python_bin: String,

    /// Timeout in seconds for ordinary CLI commands
    #[serde(default = "default_command_timeout")]
    pub command_timeout: u64,

    /// Timeout in seconds for `deploy` and `run`
    #[serde(default = "default_deploy_timeout")]
    pub deploy_timeout: u64,

    /// Timeout in seconds for billing reports
    #[serde(default = "default_billing_timeout")]
    pub billing_timeout: u64,

    /// Extra seconds the sandbox runner gets on top of the sandbox timeout
    #[serde(default = "default_sandbox_grace")]
    pub sandbox_grace: u64,

    /// Modal environment used when a tool call does not name one
    #[serde(default)]
    pub default_environment: Option<String>,

    /// Log output format: "text" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_cli_bin() -> String {
    "modal".to_string()
}

fn default_python_bin() -> String {
    "python3".to_string()
}

fn default_command_timeout() -> u64 {
    120
}

fn default_deploy_timeout() -> u64 {
    300
}

fn default_billing_timeout() -> u64 {
    30
}

fn default_sandbox_grace() -> u64 {
    60
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> anyhow::Result<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        let mut config = Self::from_vars(&vars);

        // Resolve the CLI once so child processes do not depend on PATH lookups
        if !vars.contains_key("MODAL_MCP_CLI_BIN") {
            if let Ok(path) = which::which(&config.cli_bin) {
                config.cli_bin = path.to_string_lossy().to_string();
            }
        }

        Ok(config)
    }

    /// Build a configuration from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        // Start with default config as base
        let mut config = Config::default();

        if let Some(val) = vars.get("MODAL_MCP_CLI_BIN") {
            config.cli_bin = val.clone();
        }
        if let Some(val) = vars.get("MODAL_MCP_PYTHON_BIN") {
            config.python_bin = val.clone();
        }
        if let Some(val) = vars.get("MODAL_MCP_COMMAND_TIMEOUT") {
            if let Ok(secs) = val.parse() {
                config.command_timeout = secs;
            }
        }
        if let Some(val) = vars.get("MODAL_MCP_DEPLOY_TIMEOUT") {
            if let Ok(secs) = val.parse() {
                config.deploy_timeout = secs;
            }
        }
        if let Some(val) = vars.get("MODAL_MCP_BILLING_TIMEOUT") {
            if let Ok(secs) = val.parse() {
                config.billing_timeout = secs;
            }
        }
        if let Some(val) = vars.get("MODAL_MCP_SANDBOX_GRACE") {
            if let Ok(secs) = val.parse() {
                config.sandbox_grace = secs;
            }
        }
        if let Some(val) = vars.get("MODAL_MCP_ENVIRONMENT") {
            let val = val.trim();
            if !val.is_empty() {
                config.default_environment = Some(val.to_string());
            }
        }
        if let Some(val) = vars.get("MODAL_MCP_LOG_FORMAT") {
            config.log_format = val.to_lowercase();
        }

        config
    }

    /// Environment overrides for child processes
    pub fn child_env(&self) -> HashMap<String, String> {
        CHILD_ENV_OVERRIDES
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cli_bin: default_cli_bin(),
            python_bin: default_python_bin(),
            command_timeout: default_command_timeout(),
            deploy_timeout: default_deploy_timeout(),
            billing_timeout: default_billing_timeout(),
            sandbox_grace: default_sandbox_grace(),
            default_environment: None,
            log_format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(&HashMap::new());
        assert_eq!(config.cli_bin, "modal");
        assert_eq!(config.python_bin, "python3");
        assert_eq!(config.command_timeout, 120);
        assert_eq!(config.deploy_timeout, 300);
        assert_eq!(config.billing_timeout, 30);
        assert_eq!(config.sandbox_grace, 60);
        assert!(config.default_environment.is_none());
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let config = Config::from_vars(&vars(&[
            ("MODAL_MCP_CLI_BIN", "/opt/modal/bin/modal"),
            ("MODAL_MCP_COMMAND_TIMEOUT", "45"),
            ("MODAL_MCP_DEPLOY_TIMEOUT", "not-a-number"),
            ("MODAL_MCP_ENVIRONMENT", " staging "),
            ("MODAL_MCP_LOG_FORMAT", "JSON"),
        ]));
        assert_eq!(config.cli_bin, "/opt/modal/bin/modal");
        assert_eq!(config.command_timeout, 45);
        assert_eq!(config.deploy_timeout, 300);
        assert_eq!(config.default_environment.as_deref(), Some("staging"));
        assert_eq!(config.log_format, "json");
    }

    #[test]
    fn test_blank_environment_is_ignored() {
        let config = Config::from_vars(&vars(&[("MODAL_MCP_ENVIRONMENT", "  ")]));
        assert!(config.default_environment.is_none());
    }

    #[test]
    fn test_child_env_overrides() {
        let env = Config::default().child_env();
        assert_eq!(env.get("TERM").map(String::as_str), Some("dumb"));
        assert_eq!(env.get("NO_COLOR").map(String::as_str), Some("1"));
        assert_eq!(env.get("COLUMNS").map(String::as_str), Some("200"));
    }
}
