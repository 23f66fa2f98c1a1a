//! Child process execution
//!
//! [`ProcessExecutor`] is the seam between the tool layer and the operating
//! system. The tokio implementation runs commands to completion under a
//! timeout, or captures a long-running command for a fixed window and then
//! kills it.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::domain::types::{CommandOutput, CommandSpec};
use crate::error::{Error, Result};

/// How long to keep draining pipes after a capture window closes
const DRAIN_GRACE: Duration = Duration::from_millis(500);

const READ_BUFFER_SIZE: usize = 8192;

/// Runs child processes on behalf of the tool layer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Run to completion; the child is killed and `CommandTimeout` returned
    /// if `timeout` elapses first.
    async fn run(&self, spec: CommandSpec, timeout: Duration) -> Result<CommandOutput>;

    /// Collect output for at most `window`, then kill the child and return
    /// whatever was read.
    async fn capture(&self, spec: CommandSpec, window: Duration) -> Result<CommandOutput>;
}

/// Output chunk read from one of the child's pipes
#[derive(Debug)]
enum StreamChunk {
    Stdout(Vec<u8>),
    Stderr(Vec<u8>),
}

/// Process executor backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct TokioProcessExecutor;

impl TokioProcessExecutor {
    pub fn new() -> Self {
        Self
    }

    fn command(spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .envs(spec.env.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ProcessExecutor for TokioProcessExecutor {
    async fn run(&self, spec: CommandSpec, timeout: Duration) -> Result<CommandOutput> {
        debug!(
            "Running {} with {} args (timeout {:?})",
            spec.program,
            spec.args.len(),
            timeout
        );

        let child = Self::command(&spec)
            .spawn()
            .map_err(|e| spawn_error(&spec.program, e))?;

        // Dropping the wait future on timeout drops the child, which kills it
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(output) => {
                let output = output?;
                Ok(CommandOutput {
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    timed_out: false,
                })
            }
            Err(_) => {
                warn!("{} timed out after {:?}", spec.program, timeout);
                Err(Error::CommandTimeout(timeout.as_secs()))
            }
        }
    }

    async fn capture(&self, spec: CommandSpec, window: Duration) -> Result<CommandOutput> {
        debug!("Capturing {} for {:?}", spec.program, window);

        let mut cmd = Self::command(&spec);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|e| spawn_error(&spec.program, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Internal("stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Internal("stderr not captured".to_string()))?;

        let (tx, mut rx) = mpsc::channel(64);
        spawn_reader(stdout, tx.clone(), StreamChunk::Stdout);
        spawn_reader(stderr, tx, StreamChunk::Stderr);

        let mut out = Vec::new();
        let mut err = Vec::new();
        let timed_out = !collect_until(&mut rx, Instant::now() + window, &mut out, &mut err).await;

        if timed_out {
            debug!("Capture window closed, killing {}", spec.program);
            terminate(&mut child);
            collect_until(&mut rx, Instant::now() + DRAIN_GRACE, &mut out, &mut err).await;
        }

        let exit_code = match tokio::time::timeout(DRAIN_GRACE, child.wait()).await {
            Ok(Ok(status)) => status.code(),
            _ => None,
        };

        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&out).into_owned(),
            stderr: String::from_utf8_lossy(&err).into_owned(),
            timed_out,
        })
    }
}

/// Append chunks until both pipes close (returns true) or `deadline` passes
async fn collect_until(
    rx: &mut mpsc::Receiver<StreamChunk>,
    deadline: Instant,
    out: &mut Vec<u8>,
    err: &mut Vec<u8>,
) -> bool {
    loop {
        tokio::select! {
            chunk = rx.recv() => match chunk {
                Some(StreamChunk::Stdout(data)) => out.extend_from_slice(&data),
                Some(StreamChunk::Stderr(data)) => err.extend_from_slice(&data),
                None => return true,
            },
            _ = tokio::time::sleep_until(deadline) => return false,
        }
    }
}

fn spawn_reader<R>(mut reader: R, tx: mpsc::Sender<StreamChunk>, wrap: fn(Vec<u8>) -> StreamChunk)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if tx.send(wrap(buf[..n].to_vec())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });
}

/// Kill the child and, on unix, every process in its group
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = child.id() {
            if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
                debug!("killpg({}) failed: {}", pid, e);
            }
        }
    }

    if let Err(e) = child.start_kill() {
        debug!("start_kill failed: {}", e);
    }
}

fn spawn_error(program: &str, err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        Error::ExecutableNotFound(program.to_string())
    } else {
        Error::Io(format!("failed to start {}: {}", program, err))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn test_run_captures_both_streams() {
        let output = TokioProcessExecutor::new()
            .run(sh("echo hello; echo oops 1>&2"), Duration::from_secs(10))
            .await
            .expect("run should succeed");

        assert_eq!(output.exit_code, Some(0));
        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.stderr, "oops\n");
        assert!(output.success());
    }

    #[tokio::test]
    async fn test_run_reports_exit_code() {
        let output = TokioProcessExecutor::new()
            .run(sh("exit 3"), Duration::from_secs(10))
            .await
            .expect("run should succeed");
        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_run_applies_env_overrides() {
        let mut env = HashMap::new();
        env.insert("NO_COLOR".to_string(), "1".to_string());

        let output = TokioProcessExecutor::new()
            .run(sh("printf %s \"$NO_COLOR\"").with_env(env), Duration::from_secs(10))
            .await
            .expect("run should succeed");
        assert_eq!(output.stdout, "1");
    }

    #[tokio::test]
    async fn test_run_missing_executable() {
        let result = TokioProcessExecutor::new()
            .run(
                CommandSpec::new("modal-mcp-no-such-binary", vec![]),
                Duration::from_secs(10),
            )
            .await;
        assert!(matches!(result, Err(Error::ExecutableNotFound(_))));
    }

    #[tokio::test]
    async fn test_run_timeout_kills_child() {
        let start = std::time::Instant::now();
        let result = TokioProcessExecutor::new()
            .run(sh("sleep 5"), Duration::from_millis(200))
            .await;

        assert!(matches!(result, Err(Error::CommandTimeout(_))));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_capture_returns_when_process_exits() {
        let start = std::time::Instant::now();
        let output = TokioProcessExecutor::new()
            .capture(sh("echo done"), Duration::from_secs(10))
            .await
            .expect("capture should succeed");

        assert_eq!(output.stdout, "done\n");
        assert!(!output.timed_out);
        assert_eq!(output.exit_code, Some(0));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_capture_kills_after_window() {
        let start = std::time::Instant::now();
        let output = TokioProcessExecutor::new()
            .capture(sh("echo first; sleep 10; echo never"), Duration::from_millis(300))
            .await
            .expect("capture should succeed");

        assert!(output.timed_out);
        assert_eq!(output.stdout, "first\n");
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    /// True when the pid is gone or only a zombie awaiting reaping
    #[cfg(target_os = "linux")]
    fn is_dead(pid: u32) -> bool {
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            Ok(stat) => stat
                .rsplit_once(") ")
                .map(|(_, rest)| rest.starts_with('Z') || rest.starts_with('X'))
                .unwrap_or(false),
            Err(_) => true,
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_capture_kills_whole_process_group() {
        let output = TokioProcessExecutor::new()
            .capture(sh("sleep 30 & echo $!; wait"), Duration::from_millis(300))
            .await
            .expect("capture should succeed");
        assert!(output.timed_out);

        let pid: u32 = output
            .stdout
            .trim()
            .parse()
            .expect("stdout should hold the background pid");

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !is_dead(pid) && std::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(is_dead(pid), "background sleep {} survived the capture", pid);
    }

    #[tokio::test]
    async fn test_capture_missing_executable() {
        let result = TokioProcessExecutor::new()
            .capture(
                CommandSpec::new("modal-mcp-no-such-binary", vec![]),
                Duration::from_secs(1),
            )
            .await;
        assert!(matches!(result, Err(Error::ExecutableNotFound(_))));
    }
}
