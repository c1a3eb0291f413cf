//! Editor facade: owns the element list and keeps derived state current.
//!
//! Positions and search matches are derived from the element list. Every
//! content change marks them stale and they are recomputed before the next
//! read.

mod context;

pub use context::{table_menus, visible_menus, ContextMenu, ContextMenuContext, MenuPredicate, TableCommand};

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::clipboard::{read_element_list, write_element_list, ClipboardPayload};
use crate::error::{Error, Result};
use crate::layout::{check_alignment, PositionResolver, TextMeasure};
use crate::model::{CellRange, Element, ElementPosition, Table};
use crate::options::{EditorMode, EditorOptions};
use crate::render::{MatchRenderer, Surface};
use crate::search::{MatchGroupId, NavigateInfo, SearchEngine, SearchMatch};

/// Cursor position inside a table, in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCursor {
    /// Element index of the table
    pub table_index: usize,
    /// Grid row
    pub row: usize,
    /// Grid column
    pub col: usize,
}

impl TableCursor {
    /// Create a cursor.
    pub fn new(table_index: usize, row: usize, col: usize) -> Self {
        Self {
            table_index,
            row,
            col,
        }
    }
}

/// A document being edited.
pub struct Editor {
    options: EditorOptions,
    elements: Vec<Element>,
    positions: Vec<ElementPosition>,
    resolver: PositionResolver,
    search: SearchEngine,
    cursor: Option<TableCursor>,
    selection: Option<CellRange>,
    layout_stale: bool,
    search_stale: bool,
}

impl Editor {
    /// Create an empty editor.
    pub fn new(options: EditorOptions) -> Self {
        Self::with_elements(options, Vec::new())
    }

    /// Create an editor over `elements`.
    pub fn with_elements(options: EditorOptions, elements: Vec<Element>) -> Self {
        Self {
            resolver: PositionResolver::new(options.clone()),
            options,
            elements,
            positions: Vec::new(),
            search: SearchEngine::new(),
            cursor: None,
            selection: None,
            layout_stale: true,
            search_stale: false,
        }
    }

    /// Load an editor from a JSON element array.
    pub fn from_json(options: EditorOptions, json: &str) -> Result<Self> {
        let elements: Vec<Element> = serde_json::from_str(json)?;
        Ok(Self::with_elements(options, elements))
    }

    /// Serialize the element list as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.elements)?)
    }

    /// Replace the metric source used for layout.
    pub fn with_measure(mut self, measure: Box<dyn TextMeasure>) -> Self {
        self.resolver = PositionResolver::with_measure(self.options.clone(), measure);
        self.layout_stale = true;
        self
    }

    /// Editor options.
    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Switch between editing and readonly mode.
    pub fn set_mode(&mut self, mode: EditorMode) {
        self.options.mode = mode;
    }

    /// Check if the editor is readonly.
    pub fn is_readonly(&self) -> bool {
        self.options.is_readonly()
    }

    /// The element list.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Replace the element list.
    pub fn set_elements(&mut self, elements: Vec<Element>) {
        self.elements = elements;
        self.cursor = None;
        self.selection = None;
        self.invalidate();
    }

    /// Insert elements before index `at`.
    pub fn insert_elements(&mut self, at: usize, elements: Vec<Element>) -> Result<()> {
        if self.is_readonly() {
            return Err(Error::Readonly);
        }
        if at > self.elements.len() {
            return Err(Error::ElementIndexOutOfRange(at, self.elements.len()));
        }
        if let Some(cursor) = self.cursor.as_mut() {
            if cursor.table_index >= at {
                cursor.table_index += elements.len();
            }
        }
        self.elements.splice(at..at, elements);
        self.invalidate();
        Ok(())
    }

    /// Lay out the element list if it changed and return the positions.
    pub fn layout(&mut self) -> &[ElementPosition] {
        if self.layout_stale {
            self.positions = self.resolver.compute(&mut self.elements);
            let aligned = check_alignment(&self.elements, &self.positions);
            debug_assert!(aligned, "position sequence out of alignment with text space");
            self.layout_stale = false;
        }
        &self.positions
    }

    /// Positions of the last layout pass (possibly stale).
    pub fn positions(&self) -> &[ElementPosition] {
        &self.positions
    }

    /// Number of pages after layout.
    pub fn page_count(&mut self) -> usize {
        self.layout().last().map_or(0, |p| p.page_no + 1)
    }

    /// Search for `query` and return the number of occurrences.
    ///
    /// An empty query clears the search.
    pub fn search(&mut self, query: &str) -> usize {
        self.search.compute(&self.elements, query);
        self.search_stale = false;
        self.search.group_count()
    }

    /// Matches of the current query, recomputed if the content changed.
    pub fn search_matches(&mut self) -> &[SearchMatch] {
        self.refresh_search();
        self.search.matches()
    }

    /// The search engine holding the current matches.
    pub fn search_engine(&self) -> &SearchEngine {
        &self.search
    }

    /// Activate the next occurrence.
    pub fn search_navigate_next(&mut self) -> Option<NavigateInfo> {
        self.refresh_search();
        self.search.navigate_next();
        self.search.navigate_info()
    }

    /// Activate the previous occurrence.
    pub fn search_navigate_prev(&mut self) -> Option<NavigateInfo> {
        self.refresh_search();
        self.search.navigate_prev();
        self.search.navigate_info()
    }

    /// The active occurrence.
    pub fn search_active_group(&self) -> Option<MatchGroupId> {
        self.search.active_group()
    }

    /// Paint search highlights of `page_no` onto `surface`.
    pub fn render_search(&mut self, surface: &mut dyn Surface, page_no: usize) -> usize {
        self.layout();
        self.refresh_search();
        MatchRenderer::new(&self.options).render(
            surface,
            page_no,
            self.search.matches(),
            self.search.active_group(),
            &self.elements,
            &self.positions,
        )
    }

    /// Place the cursor inside a table (or outside any table with `None`).
    pub fn set_table_cursor(&mut self, cursor: Option<TableCursor>) {
        self.cursor = cursor;
        self.selection = None;
    }

    /// The table cursor.
    pub fn table_cursor(&self) -> Option<TableCursor> {
        self.cursor
    }

    /// Select a rectangle of cells in the cursor's table.
    pub fn set_cell_selection(&mut self, selection: Option<CellRange>) {
        self.selection = selection;
    }

    /// The cell selection.
    pub fn cell_selection(&self) -> Option<CellRange> {
        self.selection
    }

    /// Predicates the context menu is evaluated against.
    pub fn context(&self) -> ContextMenuContext {
        let is_in_table = self
            .cursor
            .and_then(|cursor| self.elements.get(cursor.table_index))
            .is_some_and(Element::is_table);
        ContextMenuContext {
            is_readonly: self.is_readonly(),
            is_in_table,
            is_cross_row_col: is_in_table && self.selection.is_some_and(|s| s.is_cross_row_col()),
        }
    }

    /// Table context menu entries visible in the current context.
    pub fn context_menus(&self) -> Vec<ContextMenu> {
        visible_menus(&table_menus(), &self.context())
    }

    /// Run a structural table edit at the cursor.
    pub fn execute(&mut self, command: TableCommand) -> Result<()> {
        if self.is_readonly() {
            return Err(Error::Readonly);
        }
        let mut cursor = self.cursor.ok_or(Error::NotInTable)?;
        let len = self.elements.len();
        let element = self
            .elements
            .get_mut(cursor.table_index)
            .ok_or(Error::ElementIndexOutOfRange(cursor.table_index, len))?;
        let table = element
            .as_table_mut()
            .ok_or(Error::NotATable(cursor.table_index))?;

        log::debug!("table command {:?} at {:?}", command, cursor);
        let row_height = self.options.default_row_min_height;
        let column_width = self.options.default_column_width;
        let mut remove_table = false;

        match command {
            TableCommand::InsertRowAbove => {
                table.insert_row(cursor.row, row_height)?;
                cursor.row += 1;
            }
            TableCommand::InsertRowBelow => {
                let (_, end_row, _, _) = covering_span(table, cursor)?;
                table.insert_row(end_row, row_height)?;
            }
            TableCommand::InsertColumnLeft => {
                table.insert_column(cursor.col, column_width)?;
                cursor.col += 1;
            }
            TableCommand::InsertColumnRight => {
                let (_, _, _, end_col) = covering_span(table, cursor)?;
                table.insert_column(end_col, column_width)?;
            }
            TableCommand::DeleteRow => {
                table.delete_row(cursor.row)?;
                remove_table = table.is_empty();
                cursor.row = cursor.row.min(table.row_count().saturating_sub(1));
            }
            TableCommand::DeleteColumn => {
                table.delete_column(cursor.col)?;
                remove_table = table.is_empty();
                cursor.col = cursor.col.min(table.column_count().saturating_sub(1));
            }
            TableCommand::DeleteTable => remove_table = true,
            TableCommand::MergeCells => {
                let range = self
                    .selection
                    .filter(CellRange::is_cross_row_col)
                    .ok_or_else(|| Error::InvalidMergeRange("no multi-cell selection".to_string()))?;
                table.merge_cells(range)?;
                cursor.row = range.start_row;
                cursor.col = range.start_col;
                self.selection = None;
            }
            TableCommand::CancelMerge => table.cancel_merge(cursor.row, cursor.col)?,
        }

        if remove_table {
            self.elements.remove(cursor.table_index);
            self.cursor = None;
            self.selection = None;
        } else {
            self.cursor = Some(cursor);
        }
        self.invalidate();
        Ok(())
    }

    /// Copy the elements in `range` to clipboard flavors.
    pub fn copy(&self, range: Range<usize>) -> Result<Option<ClipboardPayload>> {
        let len = self.elements.len();
        let slice = self
            .elements
            .get(range.clone())
            .ok_or(Error::ElementIndexOutOfRange(range.end, len))?;
        Ok(write_element_list(slice, &self.options))
    }

    /// Paste HTML before index `at` and return the number of inserted elements.
    pub fn paste_html(&mut self, at: usize, html: &str) -> Result<usize> {
        if self.is_readonly() {
            return Err(Error::Readonly);
        }
        let elements = read_element_list(html, &self.options)?;
        let count = elements.len();
        self.insert_elements(at, elements)?;
        Ok(count)
    }

    fn refresh_search(&mut self) {
        if !self.search_stale {
            return;
        }
        match self.search.query().map(str::to_string) {
            Some(query) => self.search.compute(&self.elements, &query),
            None => self.search.clear(),
        }
        self.search_stale = false;
    }

    fn invalidate(&mut self) {
        self.layout_stale = true;
        self.search_stale = true;
    }
}

/// Grid span `(start_row, end_row, start_col, end_col)` (exclusive ends) of
/// the cell under the cursor.
fn covering_span(table: &Table, cursor: TableCursor) -> Result<(usize, usize, usize, usize)> {
    let grid = table.grid();
    let slot = grid.slot(cursor.row, cursor.col).ok_or(Error::CellOutOfRange {
        row: cursor.row,
        col: cursor.col,
    })?;
    let cell = &table.rows[slot.row].cells[slot.cell];
    let start_col = grid.start_column(slot).unwrap_or(cursor.col);
    Ok((
        slot.row,
        slot.row + cell.rowspan.max(1) as usize,
        start_col,
        start_col + cell.colspan.max(1) as usize,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableRow;
    use crate::render::RecordingSurface;

    fn grid_table(rows: usize, cols: usize) -> Element {
        let rows: Vec<Vec<String>> = (0..rows)
            .map(|r| (0..cols).map(|c| format!("{}{}", r, c)).collect())
            .collect();
        Element::table(Table::from_text(rows, 60.0))
    }

    fn editor_with_table() -> Editor {
        let mut editor = Editor::with_elements(
            EditorOptions::default(),
            vec![Element::text("before"), grid_table(2, 2), Element::text("after")],
        );
        editor.set_table_cursor(Some(TableCursor::new(1, 0, 0)));
        editor
    }

    fn table(editor: &Editor) -> &Table {
        editor.elements()[1].as_table().unwrap()
    }

    #[test]
    fn test_context_predicates() {
        let mut editor = editor_with_table();
        assert_eq!(
            editor.context(),
            ContextMenuContext {
                is_readonly: false,
                is_in_table: true,
                is_cross_row_col: false,
            }
        );
        editor.set_cell_selection(Some(CellRange::new((0, 0), (1, 0))));
        assert!(editor.context().is_cross_row_col);

        editor.set_table_cursor(Some(TableCursor::new(0, 0, 0)));
        assert!(!editor.context().is_in_table);
    }

    #[test]
    fn test_insert_rows_and_columns() {
        let mut editor = editor_with_table();
        editor.execute(TableCommand::InsertRowAbove).unwrap();
        assert_eq!(table(&editor).row_count(), 3);
        assert_eq!(editor.table_cursor().unwrap().row, 1);
        assert_eq!(table(&editor).rows[1].plain_text(), "00\t01");

        editor.execute(TableCommand::InsertRowBelow).unwrap();
        assert_eq!(table(&editor).row_count(), 4);
        assert_eq!(table(&editor).rows[2].plain_text(), "\t");

        editor.execute(TableCommand::InsertColumnRight).unwrap();
        assert_eq!(table(&editor).column_count(), 3);
        assert_eq!(table(&editor).rows[1].plain_text(), "00\t\t01");
        assert_eq!(table(&editor).width(), 120.0);
    }

    #[test]
    fn test_delete_last_row_removes_table() {
        let mut editor = Editor::with_elements(EditorOptions::default(), vec![grid_table(1, 2)]);
        editor.set_table_cursor(Some(TableCursor::new(0, 0, 1)));
        editor.execute(TableCommand::DeleteRow).unwrap();
        assert!(editor.elements().is_empty());
        assert_eq!(editor.table_cursor(), None);
        assert!(!editor.context().is_in_table);
    }

    #[test]
    fn test_merge_and_cancel() {
        let mut editor = editor_with_table();
        assert!(matches!(
            editor.execute(TableCommand::MergeCells),
            Err(Error::InvalidMergeRange(_))
        ));

        editor.set_cell_selection(Some(CellRange::new((0, 0), (1, 1))));
        editor.execute(TableCommand::MergeCells).unwrap();
        assert_eq!(table(&editor).rows[0].cells.len(), 1);
        assert_eq!(table(&editor).rows[0].cells[0].plain_text(), "00011011");
        assert_eq!(editor.cell_selection(), None);

        editor.execute(TableCommand::CancelMerge).unwrap();
        assert_eq!(table(&editor).rows[0].cells.len(), 2);
        assert_eq!(table(&editor).rows[1].cells.len(), 2);
    }

    #[test]
    fn test_commands_gated() {
        let mut editor = editor_with_table();
        editor.set_mode(EditorMode::Readonly);
        assert!(matches!(
            editor.execute(TableCommand::DeleteTable),
            Err(Error::Readonly)
        ));
        assert!(editor.context_menus().iter().all(|m| m.is_divider));

        editor.set_mode(EditorMode::Edit);
        editor.set_table_cursor(None);
        assert!(matches!(
            editor.execute(TableCommand::DeleteTable),
            Err(Error::NotInTable)
        ));

        editor.set_table_cursor(Some(TableCursor::new(0, 0, 0)));
        assert!(matches!(
            editor.execute(TableCommand::DeleteRow),
            Err(Error::NotATable(0))
        ));
    }

    #[test]
    fn test_search_recomputed_after_edit() {
        let mut editor = editor_with_table();
        assert_eq!(editor.search("01"), 1);
        editor.execute(TableCommand::DeleteColumn).unwrap();
        assert_eq!(editor.search_matches().len(), 2);
        editor.execute(TableCommand::DeleteTable).unwrap();
        assert!(editor.search_matches().is_empty());
        assert_eq!(editor.search_engine().query(), Some("01"));
    }

    #[test]
    fn test_render_search_lays_out_first() {
        let mut editor = Editor::with_elements(
            EditorOptions::default(),
            vec![Element::text("find me, find me")],
        );
        editor.search("find");
        editor.search_navigate_next();
        let mut surface = RecordingSurface::new();
        assert_eq!(editor.render_search(&mut surface, 0), 8);
        assert_eq!(editor.page_count(), 1);
    }

    #[test]
    fn test_copy_and_paste() {
        let mut editor = Editor::with_elements(
            EditorOptions::default(),
            vec![Element::text("a"), Element::text("b")],
        );
        let payload = editor.copy(0..2).unwrap().unwrap();
        assert_eq!(payload.text, "ab");
        assert!(editor.copy(1..5).is_err());

        let inserted = editor.paste_html(1, "<p>x</p><p>y</p>").unwrap();
        assert_eq!(inserted, 3);
        let text: String = editor.elements().iter().map(Element::plain_text).collect();
        assert_eq!(text, "ax\nyb");
    }

    #[test]
    fn test_insert_shifts_cursor() {
        let mut editor = editor_with_table();
        editor.insert_elements(0, vec![Element::text("new")]).unwrap();
        assert_eq!(editor.table_cursor().unwrap().table_index, 2);
        assert!(editor.context().is_in_table);
    }

    #[test]
    fn test_json_round_trip() {
        let editor = Editor::with_elements(
            EditorOptions::default(),
            vec![Element::text("a"), Element::table(Table::new(vec![TableRow::from_strings(["x"])], [40.0]))],
        );
        let json = editor.to_json().unwrap();
        let loaded = Editor::from_json(EditorOptions::default(), &json).unwrap();
        assert_eq!(loaded.elements(), editor.elements());
    }
}
