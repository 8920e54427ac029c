//! Error types for table loading and question templates.
//!
//! Both are fatal to the operation that raises them. Retrieval misses are
//! not errors and have no variant here; see [`crate::models::RetrievalResult`].

use thiserror::Error;

/// A source table could not be turned into a [`Table`](crate::table::Table).
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// The file could not be opened or read.
    #[error("cannot read table '{path}': {reason}")]
    Unreadable { path: String, reason: String },

    /// The delimited text could not be tokenized.
    #[error("malformed table at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// No header row.
    #[error("table is empty: no header row")]
    Empty,

    /// A header row but no entities.
    #[error("table has a header but no data rows")]
    NoDataRows,

    /// A row whose field count differs from the header's.
    #[error("line {line} has {found} fields, expected {expected}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// A question template could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// `$name` where `name` is not `index_label` or `column_label`.
    #[error("template references unknown placeholder '${name}' at byte {offset}")]
    UnknownPlaceholder { name: String, offset: usize },

    /// A `$` that starts neither a placeholder nor a `$$` escape.
    #[error("invalid placeholder in template at byte {offset}")]
    InvalidPlaceholder { offset: usize },
}
