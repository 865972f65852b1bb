//! # ebook-dl
//!
//! Fetch-and-clean pipeline for e-books.
//!
//! Everything substantive is delegated to three external tools: a cookie
//! helper that authenticates against the content provider, a downloader
//! that fetches `<identifier>.epub` into its own directory tree, and a
//! converter that strips restrictive packaging from the result. This crate
//! sequences them, locates the downloaded artifact, and atomically replaces
//! it with the cleaned copy.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ebook_dl::{Config, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = Pipeline::new(Config::default())?;
//!     let path = pipeline.run("9781234567890").await?;
//!     println!("{}", path.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Locating the downloaded artifact
pub mod locate;
/// The fetch-and-clean pipeline
pub mod pipeline;
/// External tool invocation
pub mod tool;

// Re-export commonly used types
pub use config::{Config, ToolsConfig};
pub use error::{Error, Result, ToolError};
pub use pipeline::{Pipeline, Stage};
pub use tool::ExternalTool;
