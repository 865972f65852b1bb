//! Command-line entry point for ebook-dl

use clap::Parser;
use clap::error::ErrorKind;
use ebook_dl::{Config, Pipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Fetch an e-book by identifier and strip its restrictive packaging
#[derive(Parser, Debug)]
#[command(name = "ebook-dl", version, about)]
struct Cli {
    /// Book identifier, used verbatim as the filename stem and passed to
    /// the downloader
    identifier: String,

    /// Path to a JSON config file (flags below override its values)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Working directory for the cookie helper and downloader
    #[arg(long, value_name = "DIR")]
    work_dir: Option<PathBuf>,

    /// Cookie store the helper must produce (relative paths resolve
    /// against the working directory)
    #[arg(long, value_name = "FILE")]
    cookies_file: Option<PathBuf>,

    /// Root directory searched for the downloaded EPUB
    #[arg(long, value_name = "DIR")]
    output_root: Option<PathBuf>,

    /// Path to the cookie-retrieval helper binary
    #[arg(long, value_name = "BIN")]
    cookie_helper: Option<PathBuf>,

    /// Path to the downloader binary
    #[arg(long, value_name = "BIN")]
    downloader: Option<PathBuf>,

    /// Path to the conversion binary
    #[arg(long, value_name = "BIN")]
    converter: Option<PathBuf>,

    /// Per-tool timeout in seconds (no timeout when omitted)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Keep the intermediate _clear file after the final replace
    #[arg(long)]
    keep_clear: bool,
}

impl Cli {
    /// Build the effective configuration: config file first, CLI overrides
    /// on top, defaults for everything else.
    fn into_config(self) -> ebook_dl::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(work_dir) = self.work_dir {
            config.work_dir = work_dir;
        }
        if let Some(cookies_file) = self.cookies_file {
            config.cookies_file = cookies_file;
        }
        if let Some(output_root) = self.output_root {
            config.output_root = output_root;
        }
        if let Some(cookie_helper) = self.cookie_helper {
            config.tools.cookie_helper = Some(cookie_helper);
        }
        if let Some(downloader) = self.downloader {
            config.tools.downloader = Some(downloader);
        }
        if let Some(converter) = self.converter {
            config.tools.converter = Some(converter);
        }
        if let Some(timeout) = self.timeout {
            config.tool_timeout_secs = Some(timeout);
        }
        if self.keep_clear {
            config.keep_intermediate = true;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    // try_parse instead of parse: a missing identifier must exit 1 with a
    // usage message, while --help/--version still exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            err.print().ok();
            std::process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let identifier = cli.identifier.clone();
    let result = async {
        let pipeline = Pipeline::new(cli.into_config()?)?;
        pipeline.run(&identifier).await
    }
    .await;

    match result {
        Ok(path) => println!("{}", path.display()),
        Err(err) => {
            eprintln!("ebook-dl: {err}");
            std::process::exit(err.exit_code());
        }
    }
}
