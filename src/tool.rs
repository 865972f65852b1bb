//! External tool invocation
//!
//! Every substantive operation in this pipeline (authentication, download,
//! conversion) is delegated to a pre-existing external program. This module
//! wraps those programs: binary resolution (explicit path or PATH discovery
//! via `which`), blocking invocation with the child's stdio inherited, an
//! optional timeout, and Ctrl-C propagation that kills the running child.

use crate::error::{Error, Result, ToolError};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// A named external binary the pipeline delegates to
#[derive(Clone, Debug)]
pub struct ExternalTool {
    name: String,
    binary: PathBuf,
}

impl ExternalTool {
    /// Create a tool with an explicit binary path
    pub fn new(name: impl Into<String>, binary: PathBuf) -> Self {
        Self {
            name: name.into(),
            binary,
        }
    }

    /// Attempt to find a binary of the given name in PATH
    ///
    /// Returns `Some(ExternalTool)` if the binary is found, `None` otherwise.
    pub fn from_path(name: &str) -> Option<Self> {
        which::which(name).ok().map(|binary| Self::new(name, binary))
    }

    /// Resolve a tool: an explicit configured path wins, otherwise the
    /// binary is discovered on PATH when `search_path` is enabled.
    ///
    /// An explicit path is taken as-is without an existence check; a missing
    /// binary surfaces as a launch failure when the tool runs. A tool that
    /// can be resolved neither way is a configuration error.
    pub fn resolve(name: &str, explicit: Option<&Path>, search_path: bool) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(tool = name, binary = ?path, "using explicitly configured binary");
            return Ok(Self::new(name, path.to_path_buf()));
        }
        if search_path
            && let Some(tool) = Self::from_path(name)
        {
            debug!(tool = name, binary = ?tool.binary, "discovered binary on PATH");
            return Ok(tool);
        }
        Err(Error::Config {
            message: format!("cannot find `{name}` (not configured and not on PATH)"),
            key: Some(format!("tools.{}", name.replace('-', "_"))),
        })
    }

    /// The tool's name, used in log output and error messages
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved binary path
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Run the tool to completion with the given arguments.
    ///
    /// The child inherits stdout/stderr so the user sees the tool's own
    /// output live, exactly as when running it by hand. The call blocks
    /// until the child exits; a non-zero exit status is an error. When a
    /// timeout is given the child is killed once it elapses, and a Ctrl-C
    /// while the child runs kills it and aborts the pipeline.
    pub async fn run<I, S>(&self, args: I, cwd: &Path, timeout: Option<Duration>) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.binary);
        command.args(args).current_dir(cwd).kill_on_drop(true);

        info!(tool = %self.name, binary = ?self.binary, ?cwd, "running external tool");

        let mut child = command.spawn().map_err(|e| ToolError::Launch {
            tool: self.name.clone(),
            binary: self.binary.clone(),
            reason: e.to_string(),
        })?;

        let status = match timeout {
            Some(limit) => self.wait_with_timeout(&mut child, limit).await?,
            None => self.wait(&mut child).await?,
        };

        if status.success() {
            debug!(tool = %self.name, "external tool completed");
            Ok(())
        } else {
            let code = status.code();
            warn!(tool = %self.name, code = ?code, "external tool failed");
            Err(ToolError::Failed {
                tool: self.name.clone(),
                code,
            }
            .into())
        }
    }

    async fn wait(&self, child: &mut Child) -> Result<ExitStatus> {
        tokio::select! {
            status = child.wait() => Ok(status?),
            _ = tokio::signal::ctrl_c() => {
                warn!(tool = %self.name, "interrupt received, killing child");
                child.kill().await.ok();
                Err(ToolError::Interrupted {
                    tool: self.name.clone(),
                }
                .into())
            }
        }
    }

    async fn wait_with_timeout(&self, child: &mut Child, limit: Duration) -> Result<ExitStatus> {
        tokio::select! {
            result = tokio::time::timeout(limit, child.wait()) => match result {
                Ok(status) => Ok(status?),
                Err(_) => {
                    warn!(tool = %self.name, timeout = ?limit, "external tool timed out, killing child");
                    child.kill().await.ok();
                    Err(ToolError::TimedOut {
                        tool: self.name.clone(),
                        timeout: limit,
                    }
                    .into())
                }
            },
            _ = tokio::signal::ctrl_c() => {
                warn!(tool = %self.name, "interrupt received, killing child");
                child.kill().await.ok();
                Err(ToolError::Interrupted {
                    tool: self.name.clone(),
                }
                .into())
            }
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_path_returns_none_for_nonexistent_binary() {
        assert!(ExternalTool::from_path("nonexistent-ebook-dl-binary-xyz").is_none());
    }

    #[test]
    fn from_path_consistency_with_which_crate() {
        // Both should agree on whether the binary exists
        let which_result = which::which("sh");
        let from_path_result = ExternalTool::from_path("sh");
        assert_eq!(which_result.is_ok(), from_path_result.is_some());
    }

    #[test]
    fn resolve_prefers_explicit_path() {
        let explicit = PathBuf::from("/opt/custom/safaribooks");
        let tool = ExternalTool::resolve("safaribooks", Some(&explicit), true).unwrap();
        assert_eq!(tool.binary(), explicit.as_path());
        assert_eq!(tool.name(), "safaribooks");
    }

    #[test]
    fn resolve_without_explicit_path_or_search_is_a_config_error() {
        let err = ExternalTool::resolve("safaribooks", None, false).unwrap_err();
        match err {
            Error::Config { key, .. } => {
                assert_eq!(key.as_deref(), Some("tools.safaribooks"));
            }
            other => panic!("expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn resolve_unfindable_binary_is_a_config_error() {
        let err =
            ExternalTool::resolve("nonexistent-ebook-dl-binary-xyz", None, true).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[cfg(unix)]
    mod unix {
        use super::super::*;

        fn sh() -> ExternalTool {
            ExternalTool::from_path("sh").expect("sh should be on PATH")
        }

        #[tokio::test]
        async fn run_succeeds_on_zero_exit() {
            let cwd = std::env::temp_dir();
            sh().run(["-c", "exit 0"], &cwd, None).await.unwrap();
        }

        #[tokio::test]
        async fn run_reports_nonzero_exit_code() {
            let cwd = std::env::temp_dir();
            let err = sh().run(["-c", "exit 3"], &cwd, None).await.unwrap_err();
            match err {
                Error::Tool(ToolError::Failed { tool, code }) => {
                    assert_eq!(tool, "sh");
                    assert_eq!(code, Some(3));
                }
                other => panic!("expected Failed, got: {other:?}"),
            }
            assert_eq!(
                Error::Tool(ToolError::Failed {
                    tool: "sh".into(),
                    code: Some(3)
                })
                .exit_code(),
                3
            );
        }

        #[tokio::test]
        async fn run_missing_binary_is_a_launch_error() {
            let tool = ExternalTool::new(
                "ghost",
                PathBuf::from("/nonexistent/ebook-dl-test-binary"),
            );
            let cwd = std::env::temp_dir();
            let err = tool.run(Vec::<&str>::new(), &cwd, None).await.unwrap_err();
            assert!(matches!(err, Error::Tool(ToolError::Launch { .. })));
        }

        #[tokio::test]
        async fn run_kills_child_on_timeout() {
            let cwd = std::env::temp_dir();
            let err = sh()
                .run(["-c", "sleep 30"], &cwd, Some(Duration::from_millis(200)))
                .await
                .unwrap_err();
            match err {
                Error::Tool(ToolError::TimedOut { tool, timeout }) => {
                    assert_eq!(tool, "sh");
                    assert_eq!(timeout, Duration::from_millis(200));
                }
                other => panic!("expected TimedOut, got: {other:?}"),
            }
        }

        #[tokio::test]
        async fn run_honors_working_directory() {
            let tmp = tempfile::tempdir().unwrap();
            sh().run(["-c", "pwd > marker.txt"], tmp.path(), None)
                .await
                .unwrap();
            let recorded = std::fs::read_to_string(tmp.path().join("marker.txt")).unwrap();
            let canonical = tmp.path().canonicalize().unwrap();
            assert_eq!(recorded.trim(), canonical.to_string_lossy());
        }
    }
}
