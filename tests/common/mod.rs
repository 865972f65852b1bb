//! Common helpers for pipeline integration tests
//!
//! The three external tools are stood in for by small shell-script stubs
//! written into a temp directory. Stubs run with the configured working
//! directory as their cwd, exactly like the real tools, and record marker
//! files so tests can assert which tools actually ran.

#![allow(dead_code)]

use ebook_dl::{Config, ToolsConfig};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Write an executable shell-script stub into `dir` and return its path.
pub fn write_stub(dir: &Path, name: &str, script: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{script}\n")).expect("write stub script");
    let mut perms = fs::metadata(&path).expect("stat stub").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod stub");
    path
}

/// Config wired to three explicit stub binaries, PATH discovery disabled.
pub fn stub_config(work: &Path, cookie: &Path, downloader: &Path, converter: &Path) -> Config {
    Config {
        work_dir: work.to_path_buf(),
        tools: ToolsConfig {
            cookie_helper: Some(cookie.to_path_buf()),
            downloader: Some(downloader.to_path_buf()),
            converter: Some(converter.to_path_buf()),
            search_path: false,
        },
        ..Default::default()
    }
}

/// Cookie helper stub: records that it ran and writes the cookie store in
/// its cwd, like the real helper does.
pub fn cookie_stub(bin: &Path) -> PathBuf {
    write_stub(
        bin,
        "retrieve-cookies",
        "touch cookie_ran\nprintf '{}' > cookies.json",
    )
}

/// Downloader stub: records that it ran and deposits `<id>.epub` inside a
/// provider-style nested directory under `Books/`.
pub fn downloader_stub(bin: &Path) -> PathBuf {
    write_stub(
        bin,
        "safaribooks",
        concat!(
            "touch downloader_ran\n",
            "mkdir -p \"Books/A Book ($1)\"\n",
            "printf 'RAW CONTENT' > \"Books/A Book ($1)/$1.epub\"",
        ),
    )
}

/// Converter stub: records its arguments, copies the source to the
/// destination and appends a marker so cleaned content is distinguishable.
pub fn converter_stub(bin: &Path) -> PathBuf {
    write_stub(
        bin,
        "epub-cleaner",
        concat!(
            "printf '%s\\n%s\\n' \"$1\" \"$2\" > converter_args\n",
            "cat \"$1\" > \"$2\"\n",
            "printf 'CLEANED' >> \"$2\"",
        ),
    )
}
