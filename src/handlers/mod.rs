//! Per-language symbol extraction.
//!
//! Every supported language is one [`Language`] variant. A variant parses a
//! file into a [`FileIndex`] with its tree-sitter grammar and answers three
//! queries over it:
//!
//! - `classes` / `functions`: declarations whose name contains a regex match
//! - `references`: same-file call sites `symbol(...)` or `symbol.method(...)`
//!
//! Parsing is purely syntactic. Source files are never executed or
//! imported, so searching a tree has no side effects.
//!
//! Which variant handles a file is decided by the [`HandlerRegistry`] from
//! the file extension. Files with unknown extensions have no handler.

mod cpp;
mod javascript;
mod python;
pub mod syntax;

use crate::config::Config;
use crate::entry::{Entry, EntryKind};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use syntax::{CallSite, Symbol};
use thiserror::Error;
use tree_sitter::{Parser, Tree};

/// Why a single file could not be indexed. Never fatal to a search.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("syntax error in {} at line {line}", path.display())]
    Syntax { path: PathBuf, line: u32 },
}

/// Supported language variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Tsx,
    Cpp,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Tsx,
        Language::Cpp,
    ];

    /// Extensions (without the dot) handled by default
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Language::Python => &["py", "pyi"],
            Language::JavaScript => &["js", "mjs", "cjs", "jsx"],
            Language::TypeScript => &["ts", "mts", "cts"],
            Language::Tsx => &["tsx"],
            Language::Cpp => &["cpp", "hpp", "cc", "h", "cxx", "hh", "hxx"],
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Tsx => "TSX",
            Language::Cpp => "C++",
        }
    }

    fn grammar(self) -> tree_sitter::Language {
        match self {
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Language::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        }
    }

    /// Whether `references` is implemented for this variant
    pub fn supports_references(self) -> bool {
        !matches!(self, Language::Cpp)
    }

    /// Read and parse `path` into a reusable index
    pub fn build_index(self, path: &Path) -> Result<FileIndex, ExtractError> {
        let source = fs::read_to_string(path).map_err(|source| ExtractError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_source(path, source)
    }

    /// Parse already loaded `source` as if it were the content of `path`
    pub fn parse_source(self, path: &Path, source: String) -> Result<FileIndex, ExtractError> {
        let parse_error = |reason: String| ExtractError::Parse {
            path: path.to_path_buf(),
            reason,
        };

        let mut parser = Parser::new();
        parser
            .set_language(&self.grammar())
            .map_err(|e| parse_error(e.to_string()))?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| parse_error("parser returned no tree".to_string()))?;

        if let Some(node) = syntax::first_error(&tree) {
            return Err(ExtractError::Syntax {
                path: path.to_path_buf(),
                line: syntax::position(&node).0,
            });
        }

        Ok(FileIndex {
            path: path.to_path_buf(),
            language: self,
            source,
            tree,
        })
    }

    /// Classes whose name matches `pattern`, in declaration order
    pub fn classes<'a>(
        self,
        config: &'a Config,
        index: &'a FileIndex,
        pattern: &'a Regex,
    ) -> impl Iterator<Item = Entry> + 'a {
        self.matching(EntryKind::Class, config, index, pattern)
    }

    /// Functions whose name matches `pattern`, in declaration order
    pub fn functions<'a>(
        self,
        config: &'a Config,
        index: &'a FileIndex,
        pattern: &'a Regex,
    ) -> impl Iterator<Item = Entry> + 'a {
        self.matching(EntryKind::Function, config, index, pattern)
    }

    /// Same-file call sites of `symbol`, or `None` if this variant does not
    /// support reference lookup.
    ///
    /// Name based only: no scopes, imports or aliases are resolved.
    pub fn references<'a>(
        self,
        config: &'a Config,
        index: &'a FileIndex,
        symbol: &'a str,
    ) -> Option<impl Iterator<Item = Entry> + 'a> {
        if !self.supports_references() {
            return None;
        }

        let calls = self.call_sites(&index.tree).filter_map(move |site| {
            let source = index.source.as_str();
            if syntax::text(&site.target, source) != symbol {
                return None;
            }

            let (line, col) = syntax::position(&site.callee);
            let start = site.target.start_byte() - site.callee.start_byte();
            let mut entry = Entry::new(EntryKind::Call, syntax::text(&site.callee, source), line, col)
                .with_match(start, start + symbol.len());
            if config.include_source {
                entry = entry.with_source(syntax::text(&site.call, source));
            }
            Some(entry)
        });
        Some(calls)
    }

    fn matching<'a>(
        self,
        kind: EntryKind,
        config: &'a Config,
        index: &'a FileIndex,
        pattern: &'a Regex,
    ) -> impl Iterator<Item = Entry> + 'a {
        self.definitions(&index.tree, kind).filter_map(move |symbol| {
            let source = index.source.as_str();
            let name = syntax::text(&symbol.name, source);
            let found = pattern.find(name)?;

            let (line, col) = syntax::position(&symbol.name);
            let mut entry = Entry::new(kind, name, line, col).with_match(found.start(), found.end());
            if config.include_source {
                entry = entry.with_source(syntax::text(&symbol.node, source));
            }
            Some(entry)
        })
    }

    fn definitions<'t>(self, tree: &'t Tree, kind: EntryKind) -> Box<dyn Iterator<Item = Symbol<'t>> + 't> {
        match self {
            Language::Python => Box::new(python::definitions(tree, kind)),
            Language::JavaScript | Language::TypeScript | Language::Tsx => {
                Box::new(javascript::definitions(tree, kind))
            }
            Language::Cpp => Box::new(cpp::definitions(tree, kind)),
        }
    }

    fn call_sites<'t>(self, tree: &'t Tree) -> Box<dyn Iterator<Item = CallSite<'t>> + 't> {
        match self {
            Language::Python => Box::new(python::call_sites(tree)),
            Language::JavaScript | Language::TypeScript | Language::Tsx => {
                Box::new(javascript::call_sites(tree))
            }
            Language::Cpp => Box::new(std::iter::empty()),
        }
    }
}

/// Parsed form of one file, reusable across queries.
///
/// Built once and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct FileIndex {
    path: PathBuf,
    language: Language,
    source: String,
    tree: Tree,
}

impl FileIndex {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Extension to language mapping.
///
/// Built once per process (or per daemon session) and passed to whatever
/// needs to pick a handler.
#[derive(Debug, Clone)]
pub struct HandlerRegistry {
    by_extension: HashMap<String, Language>,
}

impl HandlerRegistry {
    /// A registry with no languages
    pub fn empty() -> Self {
        Self {
            by_extension: HashMap::new(),
        }
    }

    /// Map `extension` (without the dot) to `language`
    pub fn register(&mut self, extension: &str, language: Language) {
        self.by_extension.insert(extension.to_ascii_lowercase(), language);
    }

    /// Handler for a file, or `None` if its extension is not mapped
    pub fn handler_for(&self, path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?;
        self.by_extension
            .get(ext)
            .or_else(|| self.by_extension.get(&ext.to_ascii_lowercase()))
            .copied()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for language in Language::ALL {
            for ext in language.extensions() {
                registry.register(ext, language);
            }
        }
        registry
    }
}
