//! Directory walk producing the ordered set of files to search

use crate::config::Config;
use crate::error::{Error, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Ordered absolute file paths, in depth-first walk order with siblings
/// sorted by name
pub type FileSet = Vec<PathBuf>;

/// Walk `root` once and collect every file not excluded by `config`.
///
/// Excluded directories are pruned before they are entered, so nothing
/// beneath them is ever read, regardless of other rules.
pub fn build_file_set(root: &Path, config: &Config) -> Result<FileSet> {
    let root = root
        .canonicalize()
        .map_err(|_| Error::InvalidDirectoryPath(root.to_path_buf()))?;
    if !root.is_dir() {
        return Err(Error::InvalidDirectoryPath(root));
    }

    let matcher = config.exclude.matcher(&root);

    // The rule set is the only filter: no hidden/.gitignore handling here
    let walker = WalkBuilder::new(&root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| !matcher.is_excluded(entry.path()))
        .build();

    let mut files = FileSet::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        // Results are keyed by path on the wire, which must be UTF-8
        if entry.path().to_str().is_none() {
            warn!(file = %entry.path().display(), "skipping file with non-UTF-8 path");
            continue;
        }
        files.push(entry.into_path());
    }

    debug!(root = %root.display(), files = files.len(), "file set built");
    Ok(files)
}
