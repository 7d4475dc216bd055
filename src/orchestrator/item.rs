// src/orchestrator/item.rs
// =============================================================================
// What the orchestrator is handed: URIs found in a document and where they
// were found.
// =============================================================================

use serde::{Deserialize, Serialize};

/// Where a URI sits in its source text.
///
/// `start..end` is a byte range; `line` and `column` are 1-based and point
/// at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,
}

/// A discovered URI. Owned by whoever walked the document until it is
/// handed to the orchestrator by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckItem {
    pub span: Span,
    pub uri: String,
    /// Position of this URI among all URIs found in the document
    pub index: usize,
}

/// One document's worth of work.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Path or URL of the document itself, used as the base for relative
    /// references when no base is configured
    pub location: Option<String>,
    pub items: Vec<CheckItem>,
}

impl Document {
    pub fn new(location: Option<String>, items: Vec<CheckItem>) -> Self {
        Self { location, items }
    }
}
