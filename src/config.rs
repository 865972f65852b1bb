//! Configuration types for ebook-dl
//!
//! The original shell-script ancestry of this pipeline coupled its steps
//! through filesystem conventions (the cookie helper dropped `cookies.json`
//! wherever it ran, the downloader deposited books under `Books/`). Here
//! every one of those conventions is an explicit, overridable setting, with
//! defaults that reproduce the conventions exactly.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default binary name for the cookie-retrieval helper
pub const DEFAULT_COOKIE_HELPER: &str = "retrieve-cookies";
/// Default binary name for the e-book downloader
pub const DEFAULT_DOWNLOADER: &str = "safaribooks";
/// Default binary name for the EPUB conversion tool
pub const DEFAULT_CONVERTER: &str = "epub-cleaner";

/// External tool paths (cookie helper, downloader, converter)
///
/// Each tool may be pinned to an explicit binary path; when unset the tool
/// is discovered on PATH by its default name, provided `search_path` is
/// enabled. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the cookie-retrieval helper (auto-detected if None)
    #[serde(default)]
    pub cookie_helper: Option<PathBuf>,

    /// Path to the downloader executable (auto-detected if None)
    #[serde(default)]
    pub downloader: Option<PathBuf>,

    /// Path to the conversion executable (auto-detected if None)
    #[serde(default)]
    pub converter: Option<PathBuf>,

    /// Whether to search PATH for external binaries if explicit paths not set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            cookie_helper: None,
            downloader: None,
            converter: None,
            search_path: true,
        }
    }
}

/// Main configuration for the pipeline
///
/// All fields have defaults matching the original conventions, so
/// `Config::default()` behaves exactly like the script this replaces:
/// cookies land in `./cookies.json` and books are searched under `./Books`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Directory the cookie helper and downloader run in (default: ".")
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Cookie store the helper must produce, resolved against `work_dir`
    /// when relative (default: "cookies.json")
    #[serde(default = "default_cookies_file")]
    pub cookies_file: PathBuf,

    /// Root directory searched for the downloaded EPUB, resolved against
    /// `work_dir` when relative (default: "Books")
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// External tool paths and discovery behavior
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Per-tool timeout in seconds (None = no timeout, matching the
    /// original behavior of waiting indefinitely)
    #[serde(default)]
    pub tool_timeout_secs: Option<u64>,

    /// Keep the intermediate `_clear` file after finalize instead of
    /// consuming it with the replacing rename (default: false)
    #[serde(default)]
    pub keep_intermediate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            cookies_file: default_cookies_file(),
            output_root: default_output_root(),
            tools: ToolsConfig::default(),
            tool_timeout_secs: None,
            keep_intermediate: false,
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults, so a partial file is fine.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read config file {}: {e}", path.display()),
            key: None,
        })?;
        serde_json::from_str(&contents).map_err(|e| Error::Config {
            message: format!("invalid config file {}: {e}", path.display()),
            key: None,
        })
    }

    /// Validate the configuration.
    ///
    /// Checks that the working directory exists and that the timeout, if
    /// set, is non-zero.
    pub fn validate(&self) -> Result<()> {
        if !self.work_dir.is_dir() {
            return Err(Error::Config {
                message: format!(
                    "working directory {} does not exist",
                    self.work_dir.display()
                ),
                key: Some("work_dir".into()),
            });
        }
        if self.tool_timeout_secs == Some(0) {
            return Err(Error::Config {
                message: "tool timeout must be greater than zero".into(),
                key: Some("tool_timeout_secs".into()),
            });
        }
        Ok(())
    }

    /// Absolute-or-work_dir-relative path of the cookie store
    pub fn cookies_path(&self) -> PathBuf {
        self.resolve(&self.cookies_file)
    }

    /// Absolute-or-work_dir-relative path of the output root
    pub fn books_root(&self) -> PathBuf {
        self.resolve(&self.output_root)
    }

    /// Per-tool timeout as a [`Duration`], if configured
    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout_secs.map(Duration::from_secs)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_cookies_file() -> PathBuf {
    PathBuf::from("cookies.json")
}

fn default_output_root() -> PathBuf {
    PathBuf::from("Books")
}

fn default_true() -> bool {
    true
}
