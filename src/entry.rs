//! Located symbol occurrences and per-file result maps

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// What an [`Entry`] points at. Encoded on the wire as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum EntryKind {
    Function = 0,
    Class = 1,
    Call = 2,
}

impl From<EntryKind> for u8 {
    fn from(kind: EntryKind) -> Self {
        kind as u8
    }
}

impl TryFrom<u8> for EntryKind {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(EntryKind::Function),
            1 => Ok(EntryKind::Class),
            2 => Ok(EntryKind::Call),
            _ => Err(format!("unknown entry kind code {}", code)),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryKind::Function => "Fun",
            EntryKind::Class => "Class",
            EntryKind::Call => "Call",
        };
        write!(f, "{}", s)
    }
}

/// One located definition or call site
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// 1-based line
    pub line: u32,
    /// 0-based column of the name
    pub col: u32,
    pub kind: EntryKind,
    pub name: String,
    /// Byte span of the matched part of `name`
    pub match_span: Option<(usize, usize)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
}

impl Entry {
    pub fn new(kind: EntryKind, name: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            line,
            col,
            kind,
            name: name.into(),
            match_span: None,
            source_text: None,
        }
    }

    pub fn with_match(mut self, start: usize, end: usize) -> Self {
        self.match_span = Some((start, end));
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_text = Some(source.into());
        self
    }

    /// Split `name` into (before, matched, after) for highlighting.
    /// Falls back to no highlight when the span does not fit the name.
    pub fn highlight_parts(&self) -> (&str, &str, &str) {
        let Some((start, end)) = self.match_span else {
            return (self.name.as_str(), "", "");
        };
        match (self.name.get(..start), self.name.get(start..end), self.name.get(end..)) {
            (Some(before), Some(matched), Some(after)) if start <= end => (before, matched, after),
            _ => (self.name.as_str(), "", ""),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} [{}:{}] \"{}\">", self.kind, self.line, self.col, self.name)
    }
}

/// Entries per searched file.
///
/// A file that was searched but matched nothing maps to an empty list; a
/// file that was never considered (no handler, extraction failed) is
/// absent. Iteration order is file set order.
pub type SearchResult = BTreeMap<PathBuf, Vec<Entry>>;

/// True if no file in the result has any entry
pub fn is_empty_result(result: &SearchResult) -> bool {
    result.values().all(Vec::is_empty)
}
