//! # canvasdoc
//!
//! Document and layout engine for canvas-rendered rich-text editors.
//!
//! A document is a flat, ordered list of [`Element`]s. From it the crate
//! derives a position list (page and pixel quad of every rendered unit),
//! searches the logical text, paints search highlights onto an abstract
//! drawing surface and converts content to and from clipboard HTML.
//!
//! ## Quick Start
//!
//! ```
//! use canvasdoc::render::RecordingSurface;
//! use canvasdoc::{Editor, EditorOptions, Element};
//!
//! let mut editor = Editor::with_elements(
//!     EditorOptions::default(),
//!     vec![Element::text("hello canvas, hello world")],
//! );
//!
//! assert_eq!(editor.search("hello"), 2);
//!
//! let mut surface = RecordingSurface::new();
//! let drawn = editor.render_search(&mut surface, 0);
//! assert_eq!(drawn, 10);
//! ```
//!
//! ## Features
//!
//! - **Element model**: text, titles, lists, tables, hyperlinks, images,
//!   controls, widgets, math and embedded blocks as one sum type
//! - **Tables as sub-documents**: every cell owns its elements and positions
//! - **Search**: exact, case-sensitive, overlapping matches grouped per
//!   occurrence, with next/previous navigation
//! - **Layout**: line wrapping, pagination, row alignment and mixed-direction
//!   reordering over a pluggable [`TextMeasure`]
//! - **Clipboard**: element lists to HTML and back
//! - **Table editing**: row/column insertion and deletion, merge and split

pub mod clipboard;
pub mod editor;
pub mod error;
pub mod layout;
pub mod model;
pub mod options;
pub mod render;
pub mod search;

// Re-export commonly used types
pub use editor::{ContextMenu, ContextMenuContext, Editor, TableCommand, TableCursor};
pub use error::{Error, Result};
pub use layout::{check_alignment, FixedMeasure, PositionResolver, TextMeasure};
pub use model::{
    CellRange, Element, ElementKind, ElementPosition, ElementStyle, Table, TableCell, TableRow,
    ZERO,
};
pub use options::{EditorMode, EditorOptions, HeaderOptions};
pub use render::{MatchRenderer, RecordingSurface, Surface};
pub use search::{group_elements, MatchGroupId, MatchLocation, SearchEngine, SearchMatch, Segment, SegmentKind};

use std::path::Path;

/// Parse a JSON element array.
///
/// # Example
///
/// ```
/// let elements = canvasdoc::parse_elements(r#"[{"type":"text","value":"hi"}]"#).unwrap();
/// assert_eq!(elements[0].plain_text(), "hi");
/// ```
pub fn parse_elements(json: &str) -> Result<Vec<Element>> {
    Ok(serde_json::from_str(json)?)
}

/// Load a JSON element array from a file.
///
/// # Example
///
/// ```no_run
/// let elements = canvasdoc::load_elements("document.json").unwrap();
/// println!("{} elements", elements.len());
/// ```
pub fn load_elements<P: AsRef<Path>>(path: P) -> Result<Vec<Element>> {
    let json = std::fs::read_to_string(path)?;
    parse_elements(&json)
}

/// Search an element list once and return the matches.
///
/// # Example
///
/// ```
/// use canvasdoc::{search, Element};
///
/// let matches = search(&[Element::text("aaa")], "aa");
/// assert_eq!(matches.len(), 4);
/// ```
pub fn search(elements: &[Element], query: &str) -> Vec<SearchMatch> {
    let mut engine = SearchEngine::new();
    engine.compute(elements, query);
    engine.matches().to_vec()
}

/// Lay out an element list with the given options.
pub fn layout(elements: &mut [Element], options: &EditorOptions) -> Vec<ElementPosition> {
    PositionResolver::new(options.clone()).compute(elements)
}
