//! Eagerly built per-file parse cache used by the daemon.
//!
//! The store is a snapshot: entries are never rebuilt or invalidated when
//! files change on disk. A daemon serves whatever the tree looked like when
//! it started.

use crate::handlers::{FileIndex, HandlerRegistry};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

/// Parsed files keyed by absolute path. Read-only once built.
#[derive(Debug, Default)]
pub struct IndexStore {
    by_file: HashMap<PathBuf, FileIndex>,
}

impl IndexStore {
    /// Parse every file that has a handler.
    ///
    /// Files that fail to parse are logged and left out; queries fall back
    /// to parsing them on demand, which reports the same failure.
    pub fn build_all(files: &[PathBuf], registry: &HandlerRegistry) -> Self {
        Self::build_with_progress(files, registry, false)
    }

    /// Like [`IndexStore::build_all`], drawing a progress bar on stderr
    /// when `show_progress` is set and the `progress` feature is enabled
    pub fn build_with_progress(files: &[PathBuf], registry: &HandlerRegistry, show_progress: bool) -> Self {
        #[cfg(feature = "progress")]
        let progress_bar = show_progress.then(|| {
            let pb = ProgressBar::new(files.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("█▓▒░  "),
            );
            pb.set_message("Indexing files...");
            pb
        });
        #[cfg(not(feature = "progress"))]
        let _ = show_progress;

        let mut by_file = HashMap::new();
        let mut failed = 0usize;

        for path in files {
            if let Some(language) = registry.handler_for(path) {
                match language.build_index(path) {
                    Ok(index) => {
                        by_file.insert(path.clone(), index);
                    }
                    Err(e) => {
                        failed += 1;
                        warn!(error = %e, "not indexing file");
                    }
                }
            }

            #[cfg(feature = "progress")]
            if let Some(ref pb) = progress_bar {
                pb.inc(1);
            }
        }

        #[cfg(feature = "progress")]
        if let Some(pb) = progress_bar {
            pb.finish_with_message(format!("Indexed {} files", by_file.len()));
        }

        info!(indexed = by_file.len(), failed, total = files.len(), "index built");
        Self { by_file }
    }

    pub fn get(&self, path: &Path) -> Option<&FileIndex> {
        self.by_file.get(path)
    }

    pub fn len(&self) -> usize {
        self.by_file.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_file.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_build_all_skips_unhandled_and_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.py");
        let broken = dir.path().join("broken.py");
        let notes = dir.path().join("notes.rst");
        fs::write(&good, "def ok():\n    pass\n").unwrap();
        fs::write(&broken, "def nope(:\n").unwrap();
        fs::write(&notes, "title\n=====\n").unwrap();

        let files = vec![good.clone(), broken.clone(), notes.clone()];
        let store = IndexStore::build_all(&files, &HandlerRegistry::default());

        assert_eq!(store.len(), 1);
        assert!(store.get(&good).is_some());
        assert!(store.get(&broken).is_none());
        assert!(store.get(&notes).is_none());
        assert_eq!(store.get(&good).unwrap().path(), good.as_path());
    }

    #[test]
    fn test_index_is_a_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.py");
        fs::write(&file, "def before():\n    pass\n").unwrap();

        let store = IndexStore::build_all(std::slice::from_ref(&file), &HandlerRegistry::default());
        fs::write(&file, "def after():\n    pass\n").unwrap();

        assert!(store.get(&file).unwrap().source().contains("before"));
    }
}
