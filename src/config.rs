//! Search configuration: which files are excluded and whether source text
//! is attached to results.
//!
//! A [`Config`] is resolved once per search session from three sources,
//! always in this order:
//!
//! 1. the built-in default exclusions,
//! 2. the optional project file `code-searcher.json` at the root,
//! 3. the optional `.gitignore` at the root.
//!
//! Exclusions only ever accumulate; every source is unioned into the
//! running [`ExclusionRuleSet`].

use crate::error::{Error, Result};
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Name of the project config file looked up at the search root
pub const CONFIG_FILE: &str = "code-searcher.json";

const GITIGNORE_FILE: &str = ".gitignore";

/// Build artifacts, VCS metadata, binary/media files, docs and lockfiles
const DEFAULT_EXCLUDES: &[&str] = &[
    "__main__.py",
    "__init__.py",
    "setup.py",
    "__pycache__",
    "*.png",
    "*.jpg",
    "*.bin",
    "*.jar",
    "*.exe",
    "*.so",
    "*.dll",
    "*.ini",
    "*.xml",
    "*.html",
    "*.css",
    ".git",
    "Makefile",
    "*.json",
    "LICENSE",
    "*.md",
    "CHANGELOG",
    "bin",
    ".gitignore",
    ".github",
    "*.rst",
    ".coveragerc",
    ".pylintrc",
    "*.txt",
    "node_modules",
    "package-lock.json",
    "*.min.js",
    "build",
];

/// Set of glob-style exclusion rules.
///
/// Order is irrelevant and merging is a plain set union, so it is
/// commutative, associative and idempotent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRuleSet(BTreeSet<String>);

impl ExclusionRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in rules every search starts from
    pub fn defaults() -> Self {
        DEFAULT_EXCLUDES.iter().copied().collect()
    }

    /// Add a rule, returning false if it was already present
    pub fn insert(&mut self, rule: impl Into<String>) -> bool {
        self.0.insert(rule.into())
    }

    pub fn contains(&self, rule: &str) -> bool {
        self.0.contains(rule)
    }

    /// Union of both rule sets
    pub fn merge(&self, other: &Self) -> Self {
        self.0.union(&other.0).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compile the rules for matching entries below `root`.
    ///
    /// Rules that are not valid globs are skipped with a warning; rules
    /// coming from the project config file were already validated during
    /// resolution.
    pub fn matcher(&self, root: &Path) -> ExclusionMatcher {
        let mut by_name = GlobSetBuilder::new();
        let mut by_path = GlobSetBuilder::new();

        for rule in self.iter() {
            let target = if rule.contains('/') {
                &mut by_path
            } else {
                &mut by_name
            };
            match compile_rule(rule) {
                Ok(glob) => {
                    target.add(glob);
                }
                Err(e) => warn!(rule, error = %e, "skipping invalid exclusion rule"),
            }
        }

        ExclusionMatcher {
            root: root.to_path_buf(),
            by_name: build_set(by_name),
            by_path: build_set(by_path),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionRuleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for ExclusionRuleSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

fn compile_rule(rule: &str) -> std::result::Result<Glob, globset::Error> {
    // Path rules keep `*` inside one component; `**` still spans directories
    GlobBuilder::new(rule)
        .literal_separator(rule.contains('/'))
        .build()
}

fn build_set(builder: GlobSetBuilder) -> GlobSet {
    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "failed to compile exclusion rules");
        GlobSet::empty()
    })
}

/// Compiled form of an [`ExclusionRuleSet`].
///
/// Rules without a `/` match an entry's basename. Rules with a `/` match the
/// absolute path, or the path relative to the root for relative rules.
#[derive(Debug, Clone)]
pub struct ExclusionMatcher {
    root: std::path::PathBuf,
    by_name: GlobSet,
    by_path: GlobSet,
}

impl ExclusionMatcher {
    pub fn is_excluded(&self, path: &Path) -> bool {
        if let Some(name) = path.file_name()
            && self.by_name.is_match(name)
        {
            return true;
        }

        if self.by_path.is_empty() {
            return false;
        }
        if self.by_path.is_match(path) {
            return true;
        }
        path.strip_prefix(&self.root)
            .map(|rel| self.by_path.is_match(rel))
            .unwrap_or(false)
    }
}

/// Resolved configuration for one search session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub exclude: ExclusionRuleSet,
    /// Attach the declaration's source text to each entry
    pub include_source: bool,
}

impl Config {
    pub fn with_include_source(mut self, include_source: bool) -> Self {
        self.include_source = self.include_source || include_source;
        self
    }
}

/// On-disk shape of `code-searcher.json`
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    exclude: Option<Vec<String>>,
    #[serde(default)]
    source: Option<bool>,
}

impl ConfigFile {
    fn load(path: &Path) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidConfig {
            path: path.to_path_buf(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let file: ConfigFile = serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;

        for rule in file.exclude.iter().flatten() {
            Glob::new(rule).map_err(|e| invalid(format!("bad exclude pattern {:?}: {}", rule, e)))?;
        }

        Ok(file)
    }

    fn exclude_rules(&self) -> ExclusionRuleSet {
        self.exclude.iter().flatten().cloned().collect()
    }
}

/// Resolve the configuration for a search rooted at `root`
pub fn resolve(root: &Path) -> Result<Config> {
    let mut config = Config {
        exclude: ExclusionRuleSet::defaults(),
        include_source: false,
    };

    let config_path = root.join(CONFIG_FILE);
    if config_path.is_file() {
        let file = ConfigFile::load(&config_path)?;
        config.exclude = config.exclude.merge(&file.exclude_rules());
        config.include_source = file.source.unwrap_or(false);
        debug!(path = %config_path.display(), "loaded project config");
    }

    let gitignore_path = root.join(GITIGNORE_FILE);
    if gitignore_path.is_file() {
        // git accepts non-UTF-8 bytes in .gitignore
        let bytes = fs::read(&gitignore_path).map_err(|e| Error::InvalidConfig {
            path: gitignore_path.clone(),
            reason: e.to_string(),
        })?;
        let content = String::from_utf8_lossy(&bytes);
        config.exclude = config.exclude.merge(&gitignore_rules(&content, root));
        debug!(path = %gitignore_path.display(), "merged .gitignore rules");
    }

    Ok(config)
}

/// Translate `.gitignore` content into exclusion rules.
///
/// A line anchored with a leading `/` only matches below `root`; any other
/// line matches at any depth. Every pattern also excludes everything
/// beneath it.
pub fn gitignore_rules(content: &str, root: &Path) -> ExclusionRuleSet {
    let root_prefix = globset::escape(&root.to_string_lossy());
    let mut rules = ExclusionRuleSet::new();

    for line in content.lines() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('!') {
            debug!(line, "negated .gitignore patterns are not supported");
            continue;
        }

        let line = line.strip_suffix('/').unwrap_or(line);
        if line.is_empty() {
            continue;
        }

        let pattern = match line.strip_prefix('/') {
            Some(anchored) => format!("{}/{}", root_prefix.trim_end_matches('/'), anchored),
            None => format!("**/{}", line),
        };

        if let Err(e) = Glob::new(&pattern) {
            warn!(line, error = %e, "skipping .gitignore line");
            continue;
        }

        rules.insert(format!("{}/**", pattern));
        rules.insert(pattern);
    }

    rules
}
