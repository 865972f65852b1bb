//! The fetch-and-clean pipeline
//!
//! Five stages, executed strictly in order, aborting on the first failure:
//! 1. Authenticate - run the cookie helper, check the cookie store appeared
//! 2. Download - run the downloader with the book identifier
//! 3. Locate - find `<identifier>.epub` under the output root
//! 4. Convert - produce the cleaned `_clear` copy next to the original
//! 5. Finalize - replace the original with the cleaned copy
//!
//! There is no retry and no rollback: partial side effects of a failed run
//! (a half-downloaded tree, an orphaned `_clear` file) are left as-is, and
//! the next run copes with them (the convert stage removes a stale `_clear`
//! file before invoking the converter).

use crate::config::{
    Config, DEFAULT_CONVERTER, DEFAULT_COOKIE_HELPER, DEFAULT_DOWNLOADER,
};
use crate::error::{Error, Result};
use crate::locate;
use crate::tool::ExternalTool;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Pipeline stage, used in log output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Cookie retrieval
    Authenticate,
    /// E-book download
    Download,
    /// Artifact location under the output root
    Locate,
    /// Cleaned-copy conversion
    Convert,
    /// Replacing the original with the cleaned copy
    Finalize,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Authenticate => "authenticate",
            Stage::Download => "download",
            Stage::Locate => "locate",
            Stage::Convert => "convert",
            Stage::Finalize => "finalize",
        };
        f.write_str(name)
    }
}

/// The pipeline runner
///
/// Holds the validated configuration and the three resolved external tools.
/// Construction performs all tool resolution so a misconfigured environment
/// fails before any side effect.
pub struct Pipeline {
    config: Config,
    cookie_helper: ExternalTool,
    downloader: ExternalTool,
    converter: ExternalTool,
}

impl Pipeline {
    /// Create a pipeline from a configuration.
    ///
    /// Validates the configuration and resolves all three external tools
    /// (explicit configured paths win, PATH discovery otherwise).
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let search = config.tools.search_path;
        let cookie_helper = ExternalTool::resolve(
            DEFAULT_COOKIE_HELPER,
            config.tools.cookie_helper.as_deref(),
            search,
        )?;
        let downloader = ExternalTool::resolve(
            DEFAULT_DOWNLOADER,
            config.tools.downloader.as_deref(),
            search,
        )?;
        let converter = ExternalTool::resolve(
            DEFAULT_CONVERTER,
            config.tools.converter.as_deref(),
            search,
        )?;
        Ok(Self {
            config,
            cookie_helper,
            downloader,
            converter,
        })
    }

    /// Run the full pipeline for one book.
    ///
    /// Returns the final path of the cleaned EPUB. The identifier is used
    /// verbatim as the filename stem and as the downloader's sole argument;
    /// an empty identifier is a usage error and causes no side effects.
    pub async fn run(&self, identifier: &str) -> Result<PathBuf> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(Error::Usage);
        }

        info!(identifier, "starting pipeline");

        self.authenticate().await?;
        self.download(identifier).await?;
        let source = self.locate(identifier)?;
        let cleaned = self.convert(&source).await?;
        let final_path = self.finalize(&source, &cleaned).await?;

        info!(identifier, path = ?final_path, "pipeline complete");
        Ok(final_path)
    }

    /// Run the cookie helper and check that the cookie store appeared.
    ///
    /// The helper takes no arguments; it runs in the configured working
    /// directory so its conventional output location coincides with the
    /// configured cookie store path.
    async fn authenticate(&self) -> Result<()> {
        debug!(stage = %Stage::Authenticate, "running cookie helper");
        self.cookie_helper
            .run(
                Vec::<&str>::new(),
                &self.config.work_dir,
                self.config.tool_timeout(),
            )
            .await?;

        let cookies = self.config.cookies_path();
        if !cookies.is_file() {
            return Err(Error::ArtifactMissing {
                tool: self.cookie_helper.name().to_string(),
                path: cookies,
            });
        }
        info!(stage = %Stage::Authenticate, cookies = ?cookies, "cookie store ready");
        Ok(())
    }

    /// Run the downloader with the identifier as its sole argument.
    async fn download(&self, identifier: &str) -> Result<()> {
        debug!(stage = %Stage::Download, identifier, "running downloader");
        self.downloader
            .run(
                [identifier],
                &self.config.work_dir,
                self.config.tool_timeout(),
            )
            .await
    }

    /// Locate the downloaded EPUB under the output root.
    fn locate(&self, identifier: &str) -> Result<PathBuf> {
        debug!(stage = %Stage::Locate, identifier, "locating downloaded book");
        locate::find_book(&self.config.books_root(), identifier)
    }

    /// Run the converter to produce the cleaned sibling copy.
    ///
    /// A stale cleaned copy left by an earlier interrupted run is removed
    /// first. After a zero exit the cleaned copy must exist; a converter
    /// that reports success without producing it violates its contract.
    async fn convert(&self, source: &Path) -> Result<PathBuf> {
        let cleaned = cleaned_path(source)?;
        if tokio::fs::try_exists(&cleaned).await? {
            debug!(path = ?cleaned, "removing stale cleaned copy from a previous run");
            tokio::fs::remove_file(&cleaned).await?;
        }

        debug!(stage = %Stage::Convert, ?source, dest = ?cleaned, "running converter");
        self.converter
            .run(
                [source.as_os_str(), cleaned.as_os_str()],
                &self.config.work_dir,
                self.config.tool_timeout(),
            )
            .await?;

        if !cleaned.is_file() {
            return Err(Error::ArtifactMissing {
                tool: self.converter.name().to_string(),
                path: cleaned,
            });
        }
        Ok(cleaned)
    }

    /// Replace the original with the cleaned copy.
    ///
    /// The cleaned copy lives in the same directory as the original, so the
    /// default rename is an atomic replace that also consumes the
    /// intermediate file. With `keep_intermediate` the cleaned content is
    /// copied over the original instead and the intermediate stays behind.
    async fn finalize(&self, source: &Path, cleaned: &Path) -> Result<PathBuf> {
        debug!(stage = %Stage::Finalize, ?source, ?cleaned, "replacing original with cleaned copy");
        if self.config.keep_intermediate {
            tokio::fs::copy(cleaned, source).await?;
        } else {
            tokio::fs::rename(cleaned, source).await?;
        }
        Ok(source.to_path_buf())
    }
}

/// Sibling path with `_clear` inserted before the extension
/// (`Books/x/book123.epub` -> `Books/x/book123_clear.epub`).
fn cleaned_path(source: &Path) -> Result<PathBuf> {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::Config {
            message: format!("located file {} has no usable name", source.display()),
            key: None,
        })?;
    let extension = source
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("epub");
    Ok(source.with_file_name(format!("{stem}_clear.{extension}")))
}
