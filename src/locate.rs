//! Locating the downloaded artifact
//!
//! The downloader owns the directory layout under the output root (it nests
//! books under provider-defined directories), so the produced file is found
//! by exact filename rather than by an assumed path. Zero matches means the
//! downloader's reported success does not match the filesystem; more than
//! one match is ambiguous and refused rather than silently picking one.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Recursively search `root` for the file named `<identifier>.epub`.
///
/// Returns the single match, [`Error::NotFound`] when there is none, and
/// [`Error::Ambiguous`] (with all matches, sorted) when there are several.
/// An unreadable or missing root behaves like an empty one.
pub fn find_book(root: &Path, identifier: &str) -> Result<PathBuf> {
    let target = format!("{identifier}.epub");
    debug!(?root, target, "searching output root for downloaded book");

    let mut matches: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(?root, error = %e, "skipping unreadable entry during search");
                continue;
            }
        };
        if entry.file_type().is_file() && entry.file_name().to_string_lossy() == target {
            matches.push(entry.into_path());
        }
    }
    matches.sort();

    match matches.len() {
        0 => Err(Error::NotFound {
            identifier: identifier.to_string(),
            root: root.to_path_buf(),
        }),
        1 => {
            let path = matches.remove(0);
            debug!(?path, "located downloaded book");
            Ok(path)
        }
        count => {
            warn!(?root, count, "multiple files match the expected name");
            Err(Error::Ambiguous {
                identifier: identifier.to_string(),
                root: root.to_path_buf(),
                matches,
            })
        }
    }
}
