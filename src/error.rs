//! Error types for canvasdoc library.

use std::io;
use thiserror::Error;

/// Result type alias for canvasdoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while editing, laying out or converting a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization of elements or options failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Element index does not exist in the element list.
    #[error("Element {0} is out of range (list has {1} elements)")]
    ElementIndexOutOfRange(usize, usize),

    /// The element at the given index is not a table.
    #[error("Element {0} is not a table")]
    NotATable(usize),

    /// Grid coordinate is outside the table.
    #[error("Cell ({row}, {col}) is out of range")]
    CellOutOfRange {
        /// Row index in grid coordinates
        row: usize,
        /// Column index in grid coordinates
        col: usize,
    },

    /// The merge range is empty or cuts through an already merged cell.
    #[error("Invalid merge range: {0}")]
    InvalidMergeRange(String),

    /// The editor is readonly.
    #[error("Editor is readonly")]
    Readonly,

    /// A table command was issued without a cursor inside a table.
    #[error("Cursor is not inside a table")]
    NotInTable,

    /// Clipboard markup could not be parsed.
    #[error("Markup error: {0}")]
    Markup(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Markup(err.to_string())
    }
}
