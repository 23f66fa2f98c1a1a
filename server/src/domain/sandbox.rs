//! Sandbox domain model
//!
//! A sandbox run is described by a [`SandboxRequest`], handed to the runner
//! script as JSON, and reported back through three text markers that the
//! script prints around the sandbox's own output.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const STDOUT_MARKER: &str = "===STDOUT===";
pub const STDERR_MARKER: &str = "===STDERR===";

pub const DEFAULT_PYTHON_VERSION: &str = "3.12";
pub const DEFAULT_SANDBOX_TIMEOUT: u64 = 120;

/// Base image for a sandbox
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SandboxImage {
    #[default]
    DebianSlim,
    Ubuntu,
}

impl SandboxImage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SandboxImage::DebianSlim => "debian_slim",
            SandboxImage::Ubuntu => "ubuntu",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "debian_slim" => Ok(SandboxImage::DebianSlim),
            "ubuntu" => Ok(SandboxImage::Ubuntu),
            other => Err(Error::invalid(format!(
                "Unsupported image: {} (expected debian_slim or ubuntu)",
                other
            ))),
        }
    }
}

/// Everything the runner script needs to create one sandbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SandboxRequest {
    pub command: String,
    pub image: SandboxImage,
    pub python_version: String,
    pub pip_packages: Vec<String>,
    pub timeout: u64,
    pub gpu: Option<String>,
    pub environment: Option<String>,
}

impl SandboxRequest {
    /// Check the request before anything is launched
    pub fn validate(&self) -> Result<()> {
        if self.command.trim().is_empty() {
            return Err(Error::invalid("Invalid parameter: command must not be empty"));
        }
        if !python_version_regex().is_match(&self.python_version) {
            return Err(Error::invalid(format!(
                "Invalid python_version: {} (expected e.g. 3.12)",
                self.python_version
            )));
        }
        if self.timeout == 0 {
            return Err(Error::invalid("timeout must be at least 1 second"));
        }
        if self.pip_packages.iter().any(|p| p.trim().is_empty()) {
            return Err(Error::invalid("pip_packages must not contain empty names"));
        }
        if matches!(&self.gpu, Some(g) if g.trim().is_empty()) {
            return Err(Error::invalid("gpu must not be empty when set"));
        }
        Ok(())
    }
}

fn python_version_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+\.\d+$").expect("python version pattern should compile"))
}

fn rc_marker_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"===RC=(-?\d+|None)===").expect("return code marker pattern should compile")
    })
}

/// Sections recovered from the runner's stdout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SandboxReport {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl SandboxReport {
    /// Split runner output on the three markers.
    ///
    /// The stdout section runs from the first stdout marker to the last stderr
    /// marker, so sandbox output that happens to print a marker stays in the
    /// stdout section. Missing markers yield empty sections.
    pub fn parse(output: &str) -> Self {
        let rc_match = rc_marker_regex().find_iter(output).last();
        let exit_code = rc_match.and_then(|m| {
            rc_marker_regex()
                .captures(m.as_str())
                .and_then(|c| c.get(1))
                .and_then(|g| g.as_str().parse().ok())
        });
        let body_end = rc_match.map(|m| m.start()).unwrap_or(output.len());
        let body = &output[..body_end];

        let stdout_start = body.find(STDOUT_MARKER).map(|i| i + STDOUT_MARKER.len());
        let stderr_at = body.rfind(STDERR_MARKER).filter(|i| match stdout_start {
            Some(start) => *i >= start,
            None => true,
        });

        let stdout = match stdout_start {
            Some(start) => &body[start..stderr_at.unwrap_or(body.len())],
            None => "",
        };
        let stderr = match stderr_at {
            Some(at) => &body[at + STDERR_MARKER.len()..],
            None => "",
        };

        Self {
            stdout: stdout.trim().to_string(),
            stderr: stderr.trim().to_string(),
            exit_code,
        }
    }

    /// Render the report, adding cleaned runner diagnostics when present
    pub fn render(&self, runner_stderr: &str) -> String {
        let mut lines = Vec::new();
        if !self.stdout.is_empty() {
            lines.push(self.stdout.clone());
        }
        if !self.stderr.is_empty() {
            lines.push(format!("Stderr: {}", self.stderr));
        }
        if let Some(code) = self.exit_code.filter(|c| *c != 0) {
            lines.push(format!("Exit code: {}", code));
        }
        if !runner_stderr.is_empty() {
            lines.push(format!("Runner: {}", runner_stderr));
        }

        if lines.is_empty() {
            "Sandbox completed with no output.".to_string()
        } else {
            lines.join("\n")
        }
    }
}

/// Quote a string for POSIX shells using single quotes
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(command: &str) -> SandboxRequest {
        SandboxRequest {
            command: command.to_string(),
            image: SandboxImage::DebianSlim,
            python_version: DEFAULT_PYTHON_VERSION.to_string(),
            pip_packages: vec![],
            timeout: DEFAULT_SANDBOX_TIMEOUT,
            gpu: None,
            environment: None,
        }
    }

    #[test]
    fn test_parse_full_report() {
        let output = "===STDOUT===\nhello\nworld\n===STDERR===\nwarn: x\n===RC=0===\n";
        let report = SandboxReport::parse(output);
        assert_eq!(report.stdout, "hello\nworld");
        assert_eq!(report.stderr, "warn: x");
        assert_eq!(report.exit_code, Some(0));
        assert_eq!(report.render(""), "hello\nworld\nStderr: warn: x");
    }

    #[test]
    fn test_parse_excludes_rc_marker_from_stderr() {
        let report = SandboxReport::parse("===STDOUT===\n\n===STDERR===\n\n===RC=3===\n");
        assert_eq!(report.stdout, "");
        assert_eq!(report.stderr, "");
        assert_eq!(report.exit_code, Some(3));
        assert_eq!(report.render(""), "Exit code: 3");
    }

    #[test]
    fn test_parse_marker_inside_sandbox_stdout() {
        let output = "===STDOUT===\nprinted ===STDERR=== literally\n===STDERR===\n\n===RC=0===\n";
        let report = SandboxReport::parse(output);
        assert_eq!(report.stdout, "printed ===STDERR=== literally");
        assert_eq!(report.stderr, "");
    }

    #[test]
    fn test_parse_without_markers() {
        let report = SandboxReport::parse("Traceback (most recent call last):\n  boom\n");
        assert_eq!(report, SandboxReport::default());
        assert_eq!(report.render(""), "Sandbox completed with no output.");
        assert_eq!(
            report.render("ModuleNotFoundError: No module named 'modal'"),
            "Runner: ModuleNotFoundError: No module named 'modal'"
        );
    }

    #[test]
    fn test_parse_rc_none() {
        let report = SandboxReport::parse("===STDOUT===\nok\n===STDERR===\n\n===RC=None===\n");
        assert_eq!(report.stdout, "ok");
        assert_eq!(report.exit_code, None);
    }

    #[test]
    fn test_image_parse() {
        assert_eq!(SandboxImage::parse("debian_slim").unwrap(), SandboxImage::DebianSlim);
        assert_eq!(SandboxImage::parse("Ubuntu").unwrap(), SandboxImage::Ubuntu);
        assert!(SandboxImage::parse("alpine; rm -rf /").is_err());
    }

    #[test]
    fn test_validate() {
        assert!(request("ls /").validate().is_ok());
        assert!(request("  ").validate().is_err());

        let mut bad_version = request("ls");
        bad_version.python_version = "3.12\"); import os; (\"".to_string();
        assert!(bad_version.validate().is_err());

        let mut zero_timeout = request("ls");
        zero_timeout.timeout = 0;
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_request_json_keeps_command_verbatim() {
        let command = "echo \"\"\"triple\"\"\" && printf '%s\\n' $HOME";
        let json = serde_json::to_value(request(command)).unwrap();
        assert_eq!(json["command"], command);
        assert_eq!(json["image"], "debian_slim");
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("print(1)"), "'print(1)'");
        assert_eq!(shell_quote("print('hi')"), "'print('\\''hi'\\'')'");
    }
}
