//! Document model types.
//!
//! The element list is the single source of truth for document content.
//! Tables own rows, rows own cells and cells own their own element lists,
//! so a table is a tree of closed sub-documents embedded in the flat list.

mod element;
mod position;
mod style;
mod table;
mod unit;

pub use element::{
    BlockContent, ControlComponent, Element, ElementCommon, ElementKind, ImageDisplay, ListStyle,
    ListType,
};
pub use position::{Coordinate, ElementMetrics, ElementPosition, Point};
pub use style::{DecorationStyle, ElementStyle, RowFlex, TextDecoration};
pub use table::{
    CellRange, CellSlot, Column, Table, TableBorder, TableCell, TableGrid, TableRow, VerticalAlign,
};
pub use unit::{text_space, units, Unit, ZERO};
