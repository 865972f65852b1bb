//! Error types for ebook-dl
//!
//! This module provides error handling for the pipeline, including:
//! - Domain-specific error types (Usage, Tool, NotFound, etc.)
//! - Process exit code mapping for the CLI surface
//! - Context information (tool name, searched root, artifact path)

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for ebook-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ebook-dl
///
/// This is the primary error type used throughout the library. Each variant
/// includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// No usable book identifier was supplied
    #[error("no book identifier supplied")]
    Usage,

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "work_dir")
        key: Option<String>,
    },

    /// External tool execution failed (cookie helper, downloader, converter)
    #[error("external tool error: {0}")]
    Tool(#[from] ToolError),

    /// The downloader exited successfully but the expected EPUB could not be
    /// located anywhere under the output root
    #[error(
        "downloader reported success but {identifier}.epub was not found under {}",
        .root.display()
    )]
    NotFound {
        /// The book identifier that was requested
        identifier: String,
        /// The output root that was searched
        root: PathBuf,
    },

    /// More than one file matched the expected EPUB filename
    #[error(
        "{} files named {identifier}.epub found under {}; refusing to pick one",
        .matches.len(),
        .root.display()
    )]
    Ambiguous {
        /// The book identifier that was requested
        identifier: String,
        /// The output root that was searched
        root: PathBuf,
        /// All matching paths, sorted
        matches: Vec<PathBuf>,
    },

    /// A tool exited successfully but the artifact its contract promises is
    /// missing (cookie store after the helper, cleaned copy after the converter)
    #[error(
        "{tool} exited successfully but expected artifact {} does not exist",
        .path.display()
    )]
    ArtifactMissing {
        /// The tool whose contract was violated
        tool: String,
        /// The path that should have been produced
        path: PathBuf,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// External tool invocation errors
///
/// Every pipeline stage that spawns a child process reports failures through
/// this type, naming the tool so the user can tell which step failed.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The binary could not be spawned at all (missing, not executable)
    #[error("failed to launch {tool} ({}): {reason}", .binary.display())]
    Launch {
        /// The tool that could not be launched
        tool: String,
        /// The binary path that was attempted
        binary: PathBuf,
        /// The underlying spawn error
        reason: String,
    },

    /// The child process exited with a non-zero status
    #[error("{tool} exited with {}", format_status(.code))]
    Failed {
        /// The tool that failed
        tool: String,
        /// The child's exit code, if it exited normally (None when killed by signal)
        code: Option<i32>,
    },

    /// The child process ran longer than the configured timeout and was killed
    #[error("{tool} timed out after {timeout:?}")]
    TimedOut {
        /// The tool that timed out
        tool: String,
        /// The timeout that was exceeded
        timeout: Duration,
    },

    /// The pipeline was interrupted (Ctrl-C) while the tool was running
    #[error("{tool} interrupted, pipeline aborted")]
    Interrupted {
        /// The tool that was running when the interrupt arrived
        tool: String,
    },
}

fn format_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "no exit code (killed by signal)".to_string(),
    }
}

impl Error {
    /// Map this error to a process exit status for the CLI.
    ///
    /// The failing child's own exit code is propagated when it is known.
    /// Conventional shell codes are used for the launch/timeout/interrupt
    /// cases (127, 124 and 130 respectively); everything else exits 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage => 1,
            Error::Config { .. } => 1,
            Error::Tool(tool) => match tool {
                ToolError::Launch { .. } => 127,
                ToolError::Failed { code, .. } => code.unwrap_or(1),
                ToolError::TimedOut { .. } => 124,
                ToolError::Interrupted { .. } => 130,
            },
            Error::NotFound { .. } => 1,
            Error::Ambiguous { .. } => 1,
            Error::ArtifactMissing { .. } => 1,
            Error::Io(_) => 1,
        }
    }
}
