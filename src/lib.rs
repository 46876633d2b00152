//! # codesearch - structural code search
//!
//! Finds class definitions, function definitions and call sites by name
//! across a source tree. Files are parsed with tree-sitter, so matches come
//! from the syntax tree rather than from text.
//!
//! ## Architecture
//!
//! - [`config`] - Exclusion rules from defaults, `code-searcher.json` and `.gitignore`
//! - [`walk`] - Deterministic file set for a root directory
//! - [`handlers`] - Per-language extraction of classes, functions and call sites
//! - [`index`] - Eagerly parsed files kept by the daemon
//! - [`search`] - Running one operation across a file set
//! - [`server`] - TCP daemon, client and wire protocol
//! - [`output`] - Terminal rendering
//!
//! ## Quick Start
//!
//! ```no_run
//! use codesearch::search::{CodeSearch, Operation};
//! use std::path::Path;
//!
//! let search = CodeSearch::open(Path::new("."), false)?;
//! let result = search.search(Operation::Functions, "^parse_")?;
//!
//! for (path, entries) in &result {
//!     for entry in entries {
//!         println!("{}: {}", path.display(), entry);
//!     }
//! }
//! # Ok::<(), codesearch::Error>(())
//! ```

pub mod config;
pub mod entry;
pub mod error;
pub mod handlers;
pub mod index;
pub mod output;
pub mod search;
pub mod server;
pub mod walk;

pub use entry::{Entry, EntryKind, SearchResult};
pub use error::{Error, Result};
pub use search::{CodeSearch, Operation};
