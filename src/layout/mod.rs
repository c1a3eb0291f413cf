//! Position resolution: maps every rendered unit to a page and a pixel quad.
//!
//! The resolver walks an element list, breaks its units into lines that fit
//! the available width, stacks the lines onto pages and records one
//! [`ElementPosition`] per unit. Tables are laid out cell by cell; each cell
//! receives its own position sequence mirroring the cell's text space, and
//! the table itself occupies a single slot in the enclosing sequence.
//!
//! Positions are always recomputed from scratch.

mod measure;

pub use measure::{FixedMeasure, TextMeasure};

use unicode_bidi::{BidiInfo, Level};

use crate::model::{
    text_space, CellSlot, Coordinate, Element, ElementKind, ElementMetrics, ElementPosition,
    RowFlex, Table, TableCell, Unit, VerticalAlign, ZERO,
};
use crate::options::EditorOptions;

/// Bidi class stand-in for atomic units (OBJECT REPLACEMENT CHARACTER).
const OBJECT: char = '\u{FFFC}';

/// Computes position sequences for element lists.
pub struct PositionResolver {
    options: EditorOptions,
    measure: Box<dyn TextMeasure>,
}

impl PositionResolver {
    /// Create a resolver using [`FixedMeasure`] metrics.
    pub fn new(options: EditorOptions) -> Self {
        Self::with_measure(options, Box::new(FixedMeasure::default()))
    }

    /// Create a resolver with a custom metric source.
    pub fn with_measure(options: EditorOptions, measure: Box<dyn TextMeasure>) -> Self {
        Self { options, measure }
    }

    /// Options the resolver lays out with.
    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Lay out a page-level element list.
    ///
    /// Returns one position per unit of `elements` and writes the position
    /// sequence of every table cell into the cell.
    pub fn compute(&self, elements: &mut [Element]) -> Vec<ElementPosition> {
        let width = self.options.inner_width();
        let items = self.collect_items(elements, width);
        let lines = break_lines(items, width);
        let frame = Frame {
            x: self.options.margins[3],
            y: self.options.content_top(),
            width,
            bottom: Some(self.options.page_height - self.options.margins[2]),
        };
        let (positions, _) = self.place(elements, &lines, frame);
        log::debug!(
            "layout: {} units across {} lines, {} pages",
            positions.len(),
            lines.len(),
            positions.last().map(|p| p.page_no + 1).unwrap_or(0)
        );
        positions
    }

    fn collect_items(&self, elements: &mut [Element], max_width: f32) -> Vec<Item> {
        let mut items = Vec::new();
        for (index, element) in elements.iter_mut().enumerate() {
            let row_flex = element.common.style.row_flex;
            if let Some(table) = element.as_table_mut() {
                let (width, height) = self.layout_table(table);
                items.push(Item {
                    value: ZERO.to_string(),
                    metrics: boxed(width, height),
                    row_flex,
                    row_margin: 1.0,
                    kind: ItemKind::Table(index),
                    bidi: OBJECT,
                });
                continue;
            }
            let element: &Element = element;
            element.for_each_unit(&mut |unit| items.push(self.unit_item(unit, max_width)));
        }
        items
    }

    fn unit_item(&self, unit: Unit<'_>, max_width: f32) -> Item {
        let element = unit.element();
        let style = element.style();
        let size = style.size.unwrap_or(self.options.default_size);
        let row_margin = style.row_margin.unwrap_or(self.options.default_row_margin);

        let (value, metrics, kind, bidi) = match unit {
            Unit::Char { ch, .. } => {
                let mut metrics = self.measure.measure_char(ch, style, size);
                let kind = if unit.is_line_break() {
                    metrics.width = 0.0;
                    ItemKind::Break
                } else {
                    ItemKind::Inline
                };
                (ch.to_string(), metrics, kind, ch)
            }
            Unit::Placeholder { element } => {
                let (metrics, kind) = self.atomic_metrics(element, size, max_width);
                (ZERO.to_string(), metrics, kind, OBJECT)
            }
        };

        Item {
            value,
            metrics,
            row_flex: style.row_flex,
            row_margin,
            kind,
            bidi,
        }
    }

    fn atomic_metrics(&self, element: &Element, size: f32, max_width: f32) -> (ElementMetrics, ItemKind) {
        match &element.kind {
            ElementKind::Image { width, height, .. } => {
                let scale = if *width > max_width && *width > 0.0 {
                    max_width / width
                } else {
                    1.0
                };
                (boxed(width * scale, height * scale), ItemKind::Inline)
            }
            ElementKind::Block { width, height, .. } => {
                (boxed(width.min(max_width), *height), ItemKind::Block)
            }
            ElementKind::Separator { .. } => (boxed(max_width, size), ItemKind::Block),
            ElementKind::LaTex { value, .. } => {
                let width: f32 = value
                    .chars()
                    .map(|ch| self.measure.measure_char(ch, element.style(), size).width)
                    .sum();
                (boxed(width.min(max_width), size), ItemKind::Inline)
            }
            _ => (boxed(size, size), ItemKind::Inline),
        }
    }

    fn layout_table(&self, table: &mut Table) -> (f32, f32) {
        let grid = table.grid();
        let [pad_top, pad_right, pad_bottom, pad_left] = self.options.table_cell_padding;

        let mut col_x = Vec::with_capacity(grid.cols + 1);
        col_x.push(0.0);
        for col in 0..grid.cols {
            let width = table
                .column_width(col)
                .unwrap_or(self.options.default_column_width);
            col_x.push(col_x[col] + width);
        }

        let mut boxes = Vec::new();
        for (r, row) in table.rows.iter_mut().enumerate() {
            for (i, cell) in row.cells.iter_mut().enumerate() {
                let start = grid
                    .start_column(CellSlot { row: r, cell: i })
                    .unwrap_or(0)
                    .min(grid.cols);
                let end = (start + cell.colspan.max(1) as usize).min(grid.cols);
                let inner = (col_x[end] - col_x[start] - pad_left - pad_right).max(0.0);
                let items = self.collect_items(&mut cell.elements, inner);
                let lines = break_lines(items, inner);
                let (positions, height) =
                    self.place(&mut cell.elements, &lines, Frame::unbounded(inner));
                cell.positions = positions;
                boxes.push(CellBox {
                    row: r,
                    cell: i,
                    start,
                    last_row: r + cell.rowspan.max(1) as usize - 1,
                    height: height + pad_top + pad_bottom,
                });
            }
        }

        let row_count = table.rows.len();
        let mut row_heights: Vec<f32> = table
            .rows
            .iter()
            .map(|row| row.height.max(self.options.default_row_min_height))
            .collect();
        for b in boxes.iter().filter(|b| b.last_row == b.row) {
            row_heights[b.row] = row_heights[b.row].max(b.height);
        }
        for b in boxes.iter().filter(|b| b.last_row > b.row) {
            let last = b.last_row.min(row_count - 1);
            let spanned: f32 = row_heights[b.row..=last].iter().sum();
            if b.height > spanned {
                row_heights[last] += b.height - spanned;
            }
        }

        let mut row_y = Vec::with_capacity(row_count + 1);
        row_y.push(0.0);
        for (r, height) in row_heights.iter().enumerate() {
            row_y.push(row_y[r] + height);
        }

        for b in &boxes {
            let last = b.last_row.min(row_count - 1);
            let cell_height = row_y[last + 1] - row_y[b.row];
            let cell = &mut table.rows[b.row].cells[b.cell];
            let extra = match cell.vertical_align {
                VerticalAlign::Top => 0.0,
                VerticalAlign::Middle => (cell_height - b.height) / 2.0,
                VerticalAlign::Bottom => cell_height - b.height,
            }
            .max(0.0);
            relocate_cell(cell, col_x[b.start] + pad_left, row_y[b.row] + pad_top + extra, 0);
        }

        (col_x[grid.cols], row_y[row_count])
    }

    fn place(
        &self,
        elements: &mut [Element],
        lines: &[Line],
        frame: Frame,
    ) -> (Vec<ElementPosition>, f32) {
        let mut positions = Vec::new();
        let mut y = frame.y;
        let mut page_no = 0;
        let mut row_no = 0;

        for (row_index, line) in lines.iter().enumerate() {
            let height = line.height();
            if let Some(bottom) = frame.bottom {
                if y + height > bottom && row_no > 0 {
                    page_no += 1;
                    y = frame.y;
                    row_no = 0;
                }
            }

            let ascent = line.ascent();
            let start = frame.x + line.align_offset(frame.width);
            let mut xs = vec![0.0; line.items.len()];
            let mut x = start;
            for logical in visual_order(line) {
                xs[logical] = x;
                x += line.items[logical].metrics.width;
            }

            let last = line.items.len().saturating_sub(1);
            for (i, item) in line.items.iter().enumerate() {
                let x = xs[i];
                positions.push(ElementPosition {
                    page_no,
                    index: positions.len(),
                    value: item.value.clone(),
                    row_index,
                    row_no,
                    ascent,
                    line_height: height,
                    left: x - start,
                    metrics: item.metrics,
                    is_first_letter: i == 0,
                    is_last_letter: i == last,
                    coordinate: Coordinate::from_rect(x, y, item.metrics.width, height),
                });
                if let ItemKind::Table(index) = item.kind {
                    if let Some(table) = elements.get_mut(index).and_then(Element::as_table_mut) {
                        relocate_table(table, x, y, page_no);
                    }
                }
            }

            y += height;
            row_no += 1;
        }

        (positions, y - frame.y)
    }
}

/// Check that position sequences cover every unit of their text spaces.
///
/// Walks `elements` and each table cell recursively. Mismatches are logged;
/// the return value reports whether everything lines up.
pub fn check_alignment(elements: &[Element], positions: &[ElementPosition]) -> bool {
    let expected = text_space(elements).len();
    let mut aligned = expected == positions.len();
    if !aligned {
        log::warn!(
            "position sequence has {} records for {} units",
            positions.len(),
            expected
        );
    }
    for table in elements.iter().filter_map(Element::as_table) {
        for cell in table.rows.iter().flat_map(|row| &row.cells) {
            if !check_alignment(&cell.elements, &cell.positions) {
                log::warn!("cell {} is out of alignment", cell.id);
                aligned = false;
            }
        }
    }
    aligned
}

fn relocate_table(table: &mut Table, dx: f32, dy: f32, page_no: usize) {
    for cell in table.rows.iter_mut().flat_map(|row| row.cells.iter_mut()) {
        relocate_cell(cell, dx, dy, page_no);
    }
}

fn relocate_cell(cell: &mut TableCell, dx: f32, dy: f32, page_no: usize) {
    for position in &mut cell.positions {
        position.relocate(dx, dy, page_no);
    }
    for table in cell.elements.iter_mut().filter_map(Element::as_table_mut) {
        relocate_table(table, dx, dy, page_no);
    }
}

fn boxed(width: f32, height: f32) -> ElementMetrics {
    ElementMetrics {
        width,
        height,
        bounding_box_ascent: height,
        bounding_box_descent: 0.0,
    }
}

/// Visual-to-logical index map of a line.
fn visual_order(line: &Line) -> Vec<usize> {
    let text: String = line.items.iter().map(|item| item.bidi).collect();
    let info = BidiInfo::new(&text, None);
    let levels: Vec<Level> = text.char_indices().map(|(b, _)| info.levels[b]).collect();
    if levels.iter().any(|level| level.is_rtl()) {
        BidiInfo::reorder_visual(&levels)
    } else {
        (0..line.items.len()).collect()
    }
}

fn break_lines(items: Vec<Item>, max_width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Line::default();

    for item in items {
        let own_line = matches!(item.kind, ItemKind::Block | ItemKind::Table(_));
        let overflows = item.kind == ItemKind::Inline && current.width + item.metrics.width > max_width;
        if (own_line || overflows) && !current.items.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        let ends_line = own_line || item.kind == ItemKind::Break;
        current.width += item.metrics.width;
        current.items.push(item);
        if ends_line {
            lines.push(std::mem::take(&mut current));
        }
    }
    if !current.items.is_empty() {
        lines.push(current);
    }
    lines
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    x: f32,
    y: f32,
    width: f32,
    bottom: Option<f32>,
}

impl Frame {
    fn unbounded(width: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            bottom: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ItemKind {
    Inline,
    Break,
    Block,
    Table(usize),
}

#[derive(Debug, Clone)]
struct Item {
    value: String,
    metrics: ElementMetrics,
    row_flex: Option<RowFlex>,
    row_margin: f32,
    kind: ItemKind,
    bidi: char,
}

#[derive(Debug, Default)]
struct Line {
    items: Vec<Item>,
    width: f32,
}

impl Line {
    fn ascent(&self) -> f32 {
        self.items
            .iter()
            .map(|i| i.metrics.bounding_box_ascent)
            .fold(0.0, f32::max)
    }

    fn descent(&self) -> f32 {
        self.items
            .iter()
            .map(|i| i.metrics.bounding_box_descent)
            .fold(0.0, f32::max)
    }

    fn height(&self) -> f32 {
        let row_margin = self.items.iter().map(|i| i.row_margin).fold(1.0, f32::max);
        (self.ascent() + self.descent()) * row_margin
    }

    fn align_offset(&self, width: f32) -> f32 {
        let free = (width - self.width).max(0.0);
        match self.items.first().and_then(|i| i.row_flex) {
            Some(RowFlex::Center) => free / 2.0,
            Some(RowFlex::Right) => free,
            _ => 0.0,
        }
    }
}

/// Laid out cell before rows are sized.
struct CellBox {
    row: usize,
    cell: usize,
    start: usize,
    last_row: usize,
    height: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementStyle, TableRow};

    fn options() -> EditorOptions {
        EditorOptions::new()
            .with_page_size(220.0, 100.0)
            .with_margins([10.0, 10.0, 10.0, 10.0])
            .with_default_size(20.0)
    }

    #[test]
    fn test_one_position_per_unit() {
        let resolver = PositionResolver::new(options());
        let mut elements = vec![
            Element::text("ab"),
            Element::checkbox(true),
            Element::hyperlink("cd", "https://example.com"),
        ];
        let positions = resolver.compute(&mut elements);
        assert_eq!(positions.len(), 5);
        assert!(check_alignment(&elements, &positions));

        let first = &positions[0];
        assert_eq!(first.coordinate.left_top.x, 10.0);
        assert_eq!(first.coordinate.left_top.y, 10.0);
        assert_eq!(first.coordinate.width(), 10.0);
        assert!(first.is_first_letter);
        assert_eq!(positions[1].coordinate.left_top.x, 20.0);
        assert!(positions[4].is_last_letter);
        assert_eq!(positions[2].value, ZERO.to_string());
    }

    #[test]
    fn test_wrapping_and_pages() {
        // 200px inner width fits 20 narrow glyphs; 80px inner height fits 4 lines.
        let resolver = PositionResolver::new(options());
        let mut elements = vec![Element::text("x".repeat(100))];
        let positions = resolver.compute(&mut elements);
        assert_eq!(positions.len(), 100);
        assert_eq!(positions[19].row_index, 0);
        assert_eq!(positions[20].row_index, 1);
        assert_eq!(positions[20].coordinate.left_top.x, 10.0);
        assert_eq!(positions[79].page_no, 0);
        assert_eq!(positions[80].page_no, 1);
        assert_eq!(positions[80].row_no, 0);
        assert_eq!(positions[80].coordinate.left_top.y, 10.0);
    }

    #[test]
    fn test_line_break_and_center() {
        let resolver = PositionResolver::new(options());
        let centered = ElementStyle::new().with_row_flex(RowFlex::Center);
        let mut elements = vec![
            Element::text("a\n"),
            Element::styled_text("bb", centered),
        ];
        let positions = resolver.compute(&mut elements);
        assert_eq!(positions[1].metrics.width, 0.0);
        assert_eq!(positions[2].row_index, 1);
        // (200 - 20) / 2 offset into the line
        assert_eq!(positions[2].coordinate.left_top.x, 100.0);
    }

    #[test]
    fn test_header_band_pushes_content_down() {
        // header 30 + 20 ends 40px below the 10px top margin
        let options = options().with_header(crate::options::HeaderOptions::new(20.0));
        let resolver = PositionResolver::new(options);
        let mut elements = vec![Element::text("x".repeat(60))];
        let positions = resolver.compute(&mut elements);
        assert_eq!(positions[0].coordinate.left_top.y, 50.0);
        // 40px of content height left: two lines per page
        assert_eq!(positions[39].page_no, 0);
        assert_eq!(positions[40].page_no, 1);
        assert_eq!(positions[40].coordinate.left_top.y, 50.0);
    }

    #[test]
    fn test_table_cells_get_positions() {
        let resolver = PositionResolver::new(options());
        let table = Table::new(
            vec![TableRow::from_strings(["ab", "c"])],
            [100.0, 100.0],
        );
        let mut elements = vec![Element::text("z"), Element::table(table)];
        let positions = resolver.compute(&mut elements);
        assert_eq!(positions.len(), 2);
        assert!(check_alignment(&elements, &positions));

        let table_position = &positions[1];
        assert_eq!(table_position.coordinate.width(), 200.0);
        assert_eq!(table_position.row_index, 1);

        let table = elements[1].as_table().unwrap();
        let cell = &table.rows[0].cells[1];
        assert_eq!(cell.positions.len(), 1);
        // column offset 100 + left padding 5, relative to the table origin
        assert_eq!(
            cell.positions[0].coordinate.left_top.x,
            table_position.coordinate.left_top.x + 105.0
        );
        assert_eq!(cell.positions[0].page_no, table_position.page_no);
    }

    #[test]
    fn test_right_to_left_run_is_mirrored() {
        let resolver = PositionResolver::new(options());
        let mut elements = vec![Element::text("ab\u{05D0}\u{05D1}")];
        let positions = resolver.compute(&mut elements);
        let x = |i: usize| positions[i].coordinate.left_top.x;
        assert!(x(0) < x(1));
        assert!(x(3) < x(2));
        assert!(x(1) < x(3));
    }

    #[test]
    fn test_misaligned_positions_detected() {
        let elements = vec![Element::text("abc")];
        assert!(!check_alignment(&elements, &[]));
    }
}
