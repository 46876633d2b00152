//! Running one operation over a whole file set

use crate::config::{self, Config};
use crate::entry::{Entry, SearchResult};
use crate::error::{Error, Result};
use crate::handlers::{ExtractError, FileIndex, HandlerRegistry, Language};
use crate::index::IndexStore;
use crate::walk::{build_file_set, FileSet};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// The queries a handler answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Classes,
    Functions,
    References,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Classes => "classes",
            Operation::Functions => "functions",
            Operation::References => "references",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "classes" | "cls" => Ok(Operation::Classes),
            "functions" | "fun" => Ok(Operation::Functions),
            "references" | "ref" => Ok(Operation::References),
            _ => Err(format!("Unknown operation: {}", s)),
        }
    }
}

/// Applies one operation uniformly across a file set.
///
/// Files without a handler are left out of the result. Files whose
/// extraction fails are logged and left out too. Every other file gets a
/// list, possibly empty.
pub struct SearchDispatcher<'a> {
    files: &'a [PathBuf],
    config: &'a Config,
    registry: &'a HandlerRegistry,
    index: Option<&'a IndexStore>,
}

impl<'a> SearchDispatcher<'a> {
    pub fn new(files: &'a [PathBuf], config: &'a Config, registry: &'a HandlerRegistry) -> Self {
        Self {
            files,
            config,
            registry,
            index: None,
        }
    }

    /// Reuse pre-parsed files from `index` when present
    pub fn with_index(mut self, index: &'a IndexStore) -> Self {
        self.index = Some(index);
        self
    }

    /// Run `operation` with `pattern`.
    ///
    /// For classes and functions `pattern` is a regular expression searched
    /// for in each name. For references it is also compiled (so invalid
    /// input is rejected the same way) but call sites are matched by exact
    /// symbol name.
    pub fn run(&self, operation: Operation, pattern: &str) -> Result<SearchResult> {
        let regex = Regex::new(pattern)?;
        let mut result = SearchResult::new();

        for path in self.files {
            let Some(language) = self.registry.handler_for(path) else {
                continue;
            };

            if operation == Operation::References && !language.supports_references() {
                warn!(
                    file = %path.display(),
                    language = language.display_name(),
                    "reference lookup is not supported for this language"
                );
                result.insert(path.clone(), Vec::new());
                continue;
            }

            let index = match self.file_index(path, language) {
                Ok(index) => index,
                Err(e) => {
                    warn!(error = %e, "skipping file");
                    continue;
                }
            };

            let entries = self.query(language, operation, &index, &regex, pattern);
            debug!(file = %path.display(), matches = entries.len(), "searched");
            result.insert(path.clone(), entries);
        }

        Ok(result)
    }

    fn file_index(&self, path: &Path, language: Language) -> std::result::Result<Cow<'a, FileIndex>, ExtractError> {
        if let Some(cached) = self.index.and_then(|store| store.get(path)) {
            return Ok(Cow::Borrowed(cached));
        }
        language.build_index(path).map(Cow::Owned)
    }

    fn query(
        &self,
        language: Language,
        operation: Operation,
        index: &FileIndex,
        regex: &Regex,
        pattern: &str,
    ) -> Vec<Entry> {
        match operation {
            Operation::Classes => language.classes(self.config, index, regex).collect(),
            Operation::Functions => language.functions(self.config, index, regex).collect(),
            Operation::References => language
                .references(self.config, index, pattern)
                .map(|calls| calls.collect())
                .unwrap_or_default(),
        }
    }
}

/// A search session over one root directory.
///
/// Resolves the configuration and walks the tree once; queries then run
/// against that fixed file set. With [`CodeSearch::with_index`] every file
/// is also parsed up front.
pub struct CodeSearch {
    root: PathBuf,
    config: Config,
    files: FileSet,
    registry: HandlerRegistry,
    index: Option<IndexStore>,
}

impl CodeSearch {
    /// Open a session with the default handler registry
    pub fn open(root: &Path, include_source: bool) -> Result<Self> {
        Self::open_with_registry(root, include_source, HandlerRegistry::default())
    }

    pub fn open_with_registry(root: &Path, include_source: bool, registry: HandlerRegistry) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::InvalidDirectoryPath(root.to_path_buf()));
        }
        let root = root
            .canonicalize()
            .map_err(|_| Error::InvalidDirectoryPath(root.to_path_buf()))?;

        let config = config::resolve(&root)?.with_include_source(include_source);
        let files = build_file_set(&root, &config)?;

        Ok(Self {
            root,
            config,
            files,
            registry,
            index: None,
        })
    }

    /// Parse every handled file now instead of per query
    pub fn with_index(mut self, show_progress: bool) -> Self {
        self.index = Some(IndexStore::build_with_progress(&self.files, &self.registry, show_progress));
        self
    }

    pub fn search(&self, operation: Operation, pattern: &str) -> Result<SearchResult> {
        self.search_with_source(operation, pattern, self.config.include_source)
    }

    /// Search with a per-call override of the include-source setting
    pub fn search_with_source(&self, operation: Operation, pattern: &str, include_source: bool) -> Result<SearchResult> {
        let config = if include_source == self.config.include_source {
            Cow::Borrowed(&self.config)
        } else {
            Cow::Owned(Config {
                include_source,
                ..self.config.clone()
            })
        };

        let mut dispatcher = SearchDispatcher::new(&self.files, &config, &self.registry);
        if let Some(index) = &self.index {
            dispatcher = dispatcher.with_index(index);
        }
        dispatcher.run(operation, pattern)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn index(&self) -> Option<&IndexStore> {
        self.index.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "def alpha():\n    beta()\n\ndef beta():\n    pass\n").unwrap();
        fs::write(dir.path().join("b.cpp"), "int beta_count() { return 0; }\n").unwrap();
        fs::write(dir.path().join("c.py"), "def broken(:\n").unwrap();
        fs::write(dir.path().join("notes.rs"), "fn beta() {}\n").unwrap();
        dir
    }

    #[test]
    fn test_operation_parsing() {
        assert_eq!("classes".parse::<Operation>(), Ok(Operation::Classes));
        assert_eq!("fun".parse::<Operation>(), Ok(Operation::Functions));
        assert_eq!("ref".parse::<Operation>(), Ok(Operation::References));
        assert!("methods".parse::<Operation>().is_err());
    }

    #[test]
    fn test_result_distinguishes_searched_from_skipped() {
        let dir = tree();
        let search = CodeSearch::open(dir.path(), false).unwrap();
        let root = search.root().to_path_buf();

        let result = search.search(Operation::Functions, "beta").unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[&root.join("a.py")].len(), 1);
        assert_eq!(result[&root.join("a.py")][0].name, "beta");
        assert_eq!(result[&root.join("b.cpp")][0].name, "beta_count");
        // failed extraction and unknown extension are both absent
        assert!(!result.contains_key(&root.join("c.py")));
        assert!(!result.contains_key(&root.join("notes.rs")));
    }

    #[test]
    fn test_unsupported_references_yield_empty_list() {
        let dir = tree();
        let search = CodeSearch::open(dir.path(), false).unwrap();
        let root = search.root().to_path_buf();

        let result = search.search(Operation::References, "beta").unwrap();

        assert_eq!(result[&root.join("a.py")].len(), 1);
        assert_eq!(result[&root.join("a.py")][0].line, 2);
        assert!(result[&root.join("b.cpp")].is_empty());
    }

    #[test]
    fn test_indexed_and_direct_results_agree() {
        let dir = tree();
        let direct = CodeSearch::open(dir.path(), false).unwrap();
        let indexed = CodeSearch::open(dir.path(), false).unwrap().with_index(false);

        for op in [Operation::Classes, Operation::Functions, Operation::References] {
            assert_eq!(direct.search(op, "beta").unwrap(), indexed.search(op, "beta").unwrap());
        }
        assert_eq!(indexed.index().unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_pattern_is_fatal() {
        let dir = tree();
        let search = CodeSearch::open(dir.path(), false).unwrap();
        assert!(matches!(
            search.search(Operation::Classes, "(unclosed"),
            Err(Error::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_invalid_root() {
        assert!(matches!(
            CodeSearch::open(Path::new("./invalid-dir"), false),
            Err(Error::InvalidDirectoryPath(_))
        ));
    }

    #[test]
    fn test_source_override() {
        let dir = tree();
        let search = CodeSearch::open(dir.path(), false).unwrap();
        let root = search.root().to_path_buf();

        let with_source = search.search_with_source(Operation::Functions, "alpha", true).unwrap();
        let entry = &with_source[&root.join("a.py")][0];
        assert!(entry.source_text.as_deref().unwrap().starts_with("def alpha():"));

        let without = search.search(Operation::Functions, "alpha").unwrap();
        assert!(without[&root.join("a.py")][0].source_text.is_none());
    }
}
