//! Table types and structural edits.

use std::collections::HashSet;

use super::{Element, ElementPosition};
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// A table structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Column widths in pixels
    #[serde(default)]
    pub colgroup: Vec<Column>,

    /// Rows in the table
    pub rows: Vec<TableRow>,

    /// Border drawing mode
    #[serde(default)]
    pub border_type: TableBorder,

    /// Border color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,

    /// Border width in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f32>,
}

impl Table {
    /// Create a table from rows and column widths.
    pub fn new(rows: Vec<TableRow>, column_widths: impl IntoIterator<Item = f32>) -> Self {
        Self {
            id: None,
            colgroup: column_widths.into_iter().map(Column::new).collect(),
            rows,
            border_type: TableBorder::All,
            border_color: None,
            border_width: None,
        }
    }

    /// Create a table of text cells with evenly sized columns.
    pub fn from_text<R, S>(rows: impl IntoIterator<Item = R>, column_width: f32) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows: Vec<TableRow> = rows.into_iter().map(|r| TableRow::from_strings(r)).collect();
        let columns = rows
            .iter()
            .map(|r| r.cells.iter().map(|c| c.colspan as usize).sum::<usize>())
            .max()
            .unwrap_or(0);
        Self::new(rows, std::iter::repeat(column_width).take(columns))
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of grid columns.
    pub fn column_count(&self) -> usize {
        self.grid().cols.max(self.colgroup.len())
    }

    /// Check if the table has no rows or no columns left.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.rows.iter().all(|r| r.cells.is_empty())
    }

    /// Total width of all columns.
    pub fn width(&self) -> f32 {
        self.colgroup.iter().map(|c| c.width).sum()
    }

    /// Width of a grid column, if declared.
    pub fn column_width(&self, col: usize) -> Option<f32> {
        self.colgroup.get(col).map(|c| c.width)
    }

    /// Get a cell by row and cell index.
    pub fn cell(&self, row: usize, cell: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.cells.get(cell))
    }

    /// Get a mutable cell by row and cell index.
    pub fn cell_mut(&mut self, row: usize, cell: usize) -> Option<&mut TableCell> {
        self.rows.get_mut(row).and_then(|r| r.cells.get_mut(cell))
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if the table has complex structure (merged cells).
    pub fn has_merged_cells(&self) -> bool {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .any(|c| c.rowspan > 1 || c.colspan > 1)
    }

    /// Map every grid slot to the cell covering it.
    pub fn grid(&self) -> TableGrid {
        let mut slots: Vec<Vec<Option<CellSlot>>> = vec![Vec::new(); self.rows.len()];
        let mut starts = Vec::with_capacity(self.rows.len());

        for (r, row) in self.rows.iter().enumerate() {
            let mut col = 0;
            let mut row_starts = Vec::with_capacity(row.cells.len());
            for (i, cell) in row.cells.iter().enumerate() {
                while slots[r].get(col).copied().flatten().is_some() {
                    col += 1;
                }
                row_starts.push(col);
                let last_row = (r + cell.rowspan.max(1) as usize).min(self.rows.len());
                for covered in slots.iter_mut().take(last_row).skip(r) {
                    let end = col + cell.colspan.max(1) as usize;
                    if covered.len() < end {
                        covered.resize(end, None);
                    }
                    for slot in covered.iter_mut().take(end).skip(col) {
                        *slot = Some(CellSlot { row: r, cell: i });
                    }
                }
                col += cell.colspan.max(1) as usize;
            }
            starts.push(row_starts);
        }

        let cols = slots.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut slots {
            row.resize(cols, None);
        }

        TableGrid {
            rows: self.rows.len(),
            cols,
            slots,
            starts,
        }
    }

    /// Insert an empty row before grid row `at` (`at == row_count()` appends).
    pub fn insert_row(&mut self, at: usize, height: f32) -> Result<()> {
        if at > self.rows.len() {
            return Err(Error::CellOutOfRange { row: at, col: 0 });
        }
        let grid = self.grid();
        let mut grown = HashSet::new();
        let mut cells = Vec::new();

        for col in 0..grid.cols {
            let crossing = match (at.checked_sub(1), at < grid.rows) {
                (Some(above), true) => grid
                    .slot(above, col)
                    .filter(|slot| grid.slot(at, col) == Some(*slot)),
                _ => None,
            };
            match crossing {
                Some(slot) => {
                    if grown.insert(slot) {
                        self.rows[slot.row].cells[slot.cell].rowspan += 1;
                    }
                }
                None => cells.push(TableCell::empty()),
            }
        }

        log::debug!("insert row at {} with {} cells", at, cells.len());
        self.rows.insert(at, TableRow::new(cells).with_height(height));
        Ok(())
    }

    /// Insert an empty column before grid column `at`.
    ///
    /// Existing columns are scaled so the table keeps its total width.
    pub fn insert_column(&mut self, at: usize, width: f32) -> Result<()> {
        let grid = self.grid();
        if at > grid.cols {
            return Err(Error::CellOutOfRange { row: 0, col: at });
        }
        let mut grown = HashSet::new();

        for r in 0..grid.rows {
            let crossing = match at.checked_sub(1) {
                Some(left) if at < grid.cols => grid
                    .slot(r, left)
                    .filter(|slot| grid.slot(r, at) == Some(*slot)),
                _ => None,
            };
            if let Some(slot) = crossing {
                if grown.insert(slot) {
                    self.rows[slot.row].cells[slot.cell].colspan += 1;
                }
                continue;
            }
            let index = grid.starts[r].iter().filter(|&&start| start < at).count();
            self.rows[r].cells.insert(index, TableCell::empty());
        }

        let total = self.width();
        let at_col = at.min(self.colgroup.len());
        self.colgroup.insert(at_col, Column::new(width));
        if total > 0.0 {
            let factor = total / (total + width);
            for column in &mut self.colgroup {
                column.width *= factor;
            }
        }
        Ok(())
    }

    /// Delete grid row `at`.
    ///
    /// Cells starting in the row that span further down move into the next row.
    pub fn delete_row(&mut self, at: usize) -> Result<()> {
        if at >= self.rows.len() {
            return Err(Error::CellOutOfRange { row: at, col: 0 });
        }
        let grid = self.grid();

        for (r, row) in self.rows.iter_mut().enumerate().take(at) {
            for cell in &mut row.cells {
                if r + cell.rowspan as usize > at {
                    cell.rowspan -= 1;
                }
            }
        }

        let removed = self.rows.remove(at);
        let mut moved: Vec<(usize, TableCell)> = removed
            .cells
            .into_iter()
            .zip(grid.starts[at].iter().copied())
            .filter(|(cell, _)| cell.rowspan > 1)
            .map(|(mut cell, start)| {
                cell.rowspan -= 1;
                (start, cell)
            })
            .collect();

        if let Some(next) = self.rows.get_mut(at) {
            let mut next_starts = grid.starts[at + 1].clone();
            for (start, cell) in moved.drain(..) {
                let index = next_starts.iter().filter(|&&s| s < start).count();
                next.cells.insert(index, cell);
                next_starts.insert(index, start);
            }
        }
        Ok(())
    }

    /// Delete grid column `at`.
    pub fn delete_column(&mut self, at: usize) -> Result<()> {
        let grid = self.grid();
        if at >= grid.cols {
            return Err(Error::CellOutOfRange { row: 0, col: at });
        }

        for (r, row) in self.rows.iter_mut().enumerate() {
            let starts = &grid.starts[r];
            let mut index = 0;
            row.cells.retain_mut(|cell| {
                let start = starts[index];
                index += 1;
                let end = start + cell.colspan.max(1) as usize;
                if start <= at && at < end {
                    if cell.colspan > 1 {
                        cell.colspan -= 1;
                        return true;
                    }
                    return false;
                }
                true
            });
        }

        if at < self.colgroup.len() {
            self.colgroup.remove(at);
        }
        Ok(())
    }

    /// Merge every cell in `range` into its top-left cell.
    pub fn merge_cells(&mut self, range: CellRange) -> Result<()> {
        let grid = self.grid();
        if range.end_row >= grid.rows || range.end_col >= grid.cols {
            return Err(Error::CellOutOfRange {
                row: range.end_row,
                col: range.end_col,
            });
        }

        let mut ordered = Vec::new();
        let mut seen = HashSet::new();
        for r in range.start_row..=range.end_row {
            for c in range.start_col..=range.end_col {
                let slot = grid.slot(r, c).ok_or_else(|| {
                    Error::InvalidMergeRange(format!("slot ({}, {}) has no cell", r, c))
                })?;
                if seen.insert(slot) {
                    ordered.push(slot);
                }
            }
        }

        for slot in &ordered {
            let cell = &self.rows[slot.row].cells[slot.cell];
            let start_col = grid.starts[slot.row][slot.cell];
            let inside = slot.row >= range.start_row
                && slot.row + cell.rowspan.max(1) as usize - 1 <= range.end_row
                && start_col >= range.start_col
                && start_col + cell.colspan.max(1) as usize - 1 <= range.end_col;
            if !inside {
                return Err(Error::InvalidMergeRange(format!(
                    "cell at ({}, {}) extends outside the range",
                    slot.row, start_col
                )));
            }
        }

        if ordered.len() < 2 {
            return Ok(());
        }

        let target = ordered[0];
        let mut absorbed = Vec::new();
        for slot in &ordered[1..] {
            let cell = &mut self.rows[slot.row].cells[slot.cell];
            absorbed.append(&mut cell.elements);
        }

        let removed: HashSet<CellSlot> = ordered[1..].iter().copied().collect();
        for (r, row) in self.rows.iter_mut().enumerate() {
            let mut index = 0;
            row.cells.retain(|_| {
                let keep = !removed.contains(&CellSlot { row: r, cell: index });
                index += 1;
                keep
            });
        }

        let cell = &mut self.rows[target.row].cells[target.cell];
        cell.elements.append(&mut absorbed);
        cell.rowspan = (range.end_row - range.start_row + 1) as u32;
        cell.colspan = (range.end_col - range.start_col + 1) as u32;
        log::debug!(
            "merged {} cells into ({}, {})",
            ordered.len(),
            range.start_row,
            range.start_col
        );
        Ok(())
    }

    /// Split the merged cell covering grid slot (`row`, `col`) back into single cells.
    pub fn cancel_merge(&mut self, row: usize, col: usize) -> Result<()> {
        let grid = self.grid();
        let slot = grid.slot(row, col).ok_or(Error::CellOutOfRange { row, col })?;
        let start_col = grid.starts[slot.row][slot.cell];
        let cell = &mut self.rows[slot.row].cells[slot.cell];
        let (rowspan, colspan) = (cell.rowspan as usize, cell.colspan as usize);
        if rowspan == 1 && colspan == 1 {
            return Ok(());
        }
        cell.rowspan = 1;
        cell.colspan = 1;

        for extra in 1..colspan {
            self.rows[slot.row]
                .cells
                .insert(slot.cell + extra, TableCell::empty());
        }
        for r in slot.row + 1..(slot.row + rowspan).min(self.rows.len()) {
            let index = grid.starts[r].iter().filter(|&&s| s < start_col).count();
            for _ in 0..colspan {
                self.rows[r].cells.insert(index, TableCell::empty());
            }
        }
        Ok(())
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

/// Declared width of one grid column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Width in pixels
    pub width: f32,
}

impl Column {
    /// Create a column with the given width.
    pub fn new(width: f32) -> Self {
        Self { width }
    }
}

/// Border drawing mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableBorder {
    /// Borders around every cell
    #[default]
    All,
    /// No borders
    Empty,
    /// Outer border only
    External,
}

/// A table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Minimum height in pixels
    #[serde(default)]
    pub height: f32,

    /// Cells in the row
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            id: None,
            height: 0.0,
            cells,
        }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }

    /// Set the minimum height and return self.
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.plain_text())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell: a closed sub-document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell identifier
    #[serde(default = "new_cell_id")]
    pub id: String,

    /// Number of columns this cell spans (at least 1)
    #[serde(default = "one", deserialize_with = "span")]
    pub colspan: u32,

    /// Number of rows this cell spans (at least 1)
    #[serde(default = "one", deserialize_with = "span")]
    pub rowspan: u32,

    /// Vertical alignment
    #[serde(default)]
    pub vertical_align: VerticalAlign,

    /// Cell content
    #[serde(default)]
    pub elements: Vec<Element>,

    /// Layout output mirroring the cell's text space
    #[serde(skip)]
    pub positions: Vec<ElementPosition>,
}

fn new_cell_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn one() -> u32 {
    1
}

fn span<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    Ok(u32::deserialize(deserializer)?.max(1))
}

impl TableCell {
    /// Create a cell with content.
    pub fn with_elements(elements: Vec<Element>) -> Self {
        Self {
            id: new_cell_id(),
            colspan: 1,
            rowspan: 1,
            vertical_align: VerticalAlign::Top,
            elements,
            positions: Vec::new(),
        }
    }

    /// Create a new cell with text content.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::empty();
        }
        Self::with_elements(vec![Element::text(text)])
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self::with_elements(Vec::new())
    }

    /// Set colspan and return self.
    pub fn colspan(mut self, span: u32) -> Self {
        self.colspan = span.max(1);
        self
    }

    /// Set rowspan and return self.
    pub fn rowspan(mut self, span: u32) -> Self {
        self.rowspan = span.max(1);
        self
    }

    /// Set the id and return self.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Get plain text content.
    pub fn plain_text(&self) -> String {
        self.elements.iter().map(Element::plain_text).collect()
    }

    /// Check if this cell spans multiple rows or columns.
    pub fn is_merged(&self) -> bool {
        self.rowspan > 1 || self.colspan > 1
    }
}

/// Vertical alignment for table cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    /// Top alignment
    #[default]
    Top,
    /// Middle alignment
    Middle,
    /// Bottom alignment
    Bottom,
}

/// Storage address of a cell: row index and index within the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellSlot {
    /// Row the cell is stored in
    pub row: usize,
    /// Index within the row's cells
    pub cell: usize,
}

/// Grid view of a table with spans resolved.
#[derive(Debug, Clone)]
pub struct TableGrid {
    /// Number of grid rows
    pub rows: usize,
    /// Number of grid columns
    pub cols: usize,
    slots: Vec<Vec<Option<CellSlot>>>,
    starts: Vec<Vec<usize>>,
}

impl TableGrid {
    /// Cell covering grid slot (`row`, `col`).
    pub fn slot(&self, row: usize, col: usize) -> Option<CellSlot> {
        self.slots.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Grid column where a stored cell starts.
    pub fn start_column(&self, slot: CellSlot) -> Option<usize> {
        self.starts.get(slot.row).and_then(|r| r.get(slot.cell)).copied()
    }
}

/// Inclusive rectangle of grid slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    /// First row
    pub start_row: usize,
    /// First column
    pub start_col: usize,
    /// Last row (inclusive)
    pub end_row: usize,
    /// Last column (inclusive)
    pub end_col: usize,
}

impl CellRange {
    /// Build a normalized range from two corner slots.
    pub fn new(a: (usize, usize), b: (usize, usize)) -> Self {
        Self {
            start_row: a.0.min(b.0),
            start_col: a.1.min(b.1),
            end_row: a.0.max(b.0),
            end_col: a.1.max(b.1),
        }
    }

    /// Check if the range crosses more than one row or column.
    pub fn is_cross_row_col(&self) -> bool {
        self.end_row > self.start_row || self.end_col > self.start_col
    }
}
