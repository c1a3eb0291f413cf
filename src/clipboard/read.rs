//! Clipboard markup to element list.

use super::markup::{parse_markup, parse_px, text_content, MarkupElement, MarkupNode};
use crate::error::Result;
use crate::model::{
    Column, Element, ElementKind, ElementStyle, ImageDisplay, RowFlex, Table, TableCell, TableRow,
};
use crate::options::EditorOptions;

/// Parse pasted HTML into elements.
///
/// Text picks up the color, weight, slant and pixel size in effect at its
/// position. Top-level text outside any element is dropped.
pub fn read_element_list(html: &str, options: &EditorOptions) -> Result<Vec<Element>> {
    let mut nodes = parse_markup(html)?;
    nodes.retain(|node| node.as_element().is_some());

    let mut reader = ElementReader {
        options,
        out: Vec::new(),
    };
    reader.children(&nodes, &ElementStyle::default());
    log::debug!("paste: {} bytes of html -> {} elements", html.len(), reader.out.len());
    Ok(reader.out)
}

struct ElementReader<'a> {
    options: &'a EditorOptions,
    out: Vec<Element>,
}

impl ElementReader<'_> {
    fn children(&mut self, nodes: &[MarkupNode], style: &ElementStyle) {
        let last = nodes.len().saturating_sub(1);
        for (n, node) in nodes.iter().enumerate() {
            match node {
                MarkupNode::Text(text) => self.text(text, style),
                MarkupNode::Element(element) => {
                    self.element(element, style);
                    if n != last && element.is_block() && self.options.line_break_on_block {
                        self.out.push(Element::line_break());
                    }
                }
            }
        }
    }

    fn text(&mut self, text: &str, style: &ElementStyle) {
        if text.trim().is_empty() && text.contains('\n') {
            return;
        }
        let value: String = text
            .chars()
            .map(|ch| if matches!(ch, '\n' | '\r' | '\t') { ' ' } else { ch })
            .collect();
        if !value.is_empty() {
            self.out.push(Element::styled_text(value, style.clone()));
        }
    }

    fn element(&mut self, element: &MarkupElement, inherited: &ElementStyle) {
        if element.is_raw() {
            return;
        }
        match element.tag.as_str() {
            "br" => self.out.push(Element::line_break()),
            "a" => {
                let value = text_content(&element.children);
                if !value.is_empty() {
                    self.out.push(Element::new(ElementKind::Hyperlink {
                        url: element.attribute("href").map(str::to_string),
                        hyperlink_id: None,
                        children: vec![Element::text(value)],
                    }));
                }
            }
            "img" => {
                if let Some(src) = element.attribute("src").filter(|s| !s.is_empty()) {
                    self.out.push(Element::new(ElementKind::Image {
                        src: src.to_string(),
                        width: dimension(element, "width"),
                        height: dimension(element, "height"),
                        display: ImageDisplay::Inline,
                    }));
                }
            }
            "hr" => self.out.push(Element::separator()),
            "table" => {
                let style = apply_style(element, inherited);
                if let Some(table) = self.table(element, &style) {
                    self.out.push(Element::table(table));
                }
            }
            _ => {
                let style = apply_style(element, inherited);
                self.children(&element.children, &style);
            }
        }
    }

    fn table(&self, element: &MarkupElement, style: &ElementStyle) -> Option<Table> {
        let mut rows = Vec::new();
        collect_rows(element, &mut |tr| {
            let cells = tr
                .children
                .iter()
                .filter_map(MarkupNode::as_element)
                .filter(|cell| cell.tag == "td" || cell.tag == "th")
                .map(|cell| self.cell(cell, style))
                .collect();
            rows.push(TableRow::new(cells));
        });
        if rows.iter().all(|row| row.cells.is_empty()) {
            return None;
        }

        let mut table = Table::new(rows, Vec::new());
        let cols = table.grid().cols.max(1);
        let width = self.options.inner_width() / cols as f32;
        table.colgroup = (0..cols).map(|_| Column::new(width)).collect();
        Some(table)
    }

    fn cell(&self, element: &MarkupElement, inherited: &ElementStyle) -> TableCell {
        let style = apply_style(element, inherited);
        let mut reader = ElementReader {
            options: self.options,
            out: Vec::new(),
        };
        reader.children(&element.children, &style);
        while matches!(reader.out.last(), Some(e) if e.plain_text() == "\n") {
            reader.out.pop();
        }
        let span = |name| {
            element
                .attribute(name)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(1)
        };
        TableCell::with_elements(reader.out)
            .colspan(span("colspan"))
            .rowspan(span("rowspan"))
    }
}

/// Call `f` for every `<tr>` of a table, looking through row groups.
fn collect_rows<'a>(element: &'a MarkupElement, f: &mut impl FnMut(&'a MarkupElement)) {
    for child in element.children.iter().filter_map(MarkupNode::as_element) {
        match child.tag.as_str() {
            "tr" => f(child),
            "thead" | "tbody" | "tfoot" => collect_rows(child, f),
            _ => {}
        }
    }
}

/// Style in effect inside `element`.
fn apply_style(element: &MarkupElement, inherited: &ElementStyle) -> ElementStyle {
    let mut style = inherited.clone();
    match element.tag.as_str() {
        "b" | "strong" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => style.bold = true,
        "i" | "em" => style.italic = true,
        "u" => style.underline = true,
        "s" | "strike" | "del" => style.strikeout = true,
        "font" => {
            if let Some(color) = element.attribute("color") {
                style.color = Some(color.to_string());
            }
        }
        _ => {}
    }

    if let Some(color) = element.style("color") {
        style.color = Some(color.to_string());
    }
    if let Some(weight) = element.style("font-weight") {
        style.bold = match weight {
            "bold" | "bolder" => true,
            "normal" | "lighter" => false,
            other => other.parse::<u32>().map_or(style.bold, |w| w > 500),
        };
    }
    if let Some(font_style) = element.style("font-style") {
        style.italic = font_style.contains("italic");
    }
    if let Some(size) = element.style("font-size").and_then(parse_px) {
        style.size = Some(size.floor());
    }
    if let Some(font) = element.style("font-family") {
        let family = font.split(',').next().unwrap_or(font);
        style.font = Some(family.trim().trim_matches(['"', '\'']).to_string());
    }
    if let Some(row_flex) = element.style("text-align").and_then(RowFlex::from_css) {
        style.row_flex = Some(row_flex);
    }
    style
}

fn dimension(element: &MarkupElement, name: &str) -> f32 {
    element
        .attribute(name)
        .and_then(|v| v.trim().trim_end_matches("px").parse().ok())
        .or_else(|| element.style(name).and_then(parse_px))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(html: &str) -> Vec<Element> {
        read_element_list(html, &EditorOptions::default()).unwrap()
    }

    fn values(elements: &[Element]) -> Vec<String> {
        elements.iter().map(Element::plain_text).collect()
    }

    #[test]
    fn test_inherited_style() {
        let elements = read(
            r#"<div style="color: rgb(255, 0, 0); font-size: 18.7px"><b>bold</b><i>it</i></div>"#,
        );
        assert_eq!(values(&elements), vec!["bold", "it"]);
        let bold = elements[0].style();
        assert!(bold.bold);
        assert_eq!(bold.color.as_deref(), Some("rgb(255, 0, 0)"));
        assert_eq!(bold.size, Some(18.0));
        assert!(elements[1].style().italic);
        assert!(!elements[1].style().bold);
    }

    #[test]
    fn test_font_weight_threshold() {
        let elements = read(
            r#"<p><span style="font-weight: 600">a</span><span style="font-weight: 400">b</span></p>"#,
        );
        assert!(elements[0].style().bold);
        assert!(!elements[1].style().bold);
    }

    #[test]
    fn test_line_breaks_between_blocks() {
        let elements = read("<div><p>one</p><p>two<br>three</p></div>");
        assert_eq!(values(&elements), vec!["one", "\n", "two", "\n", "three"]);
    }

    #[test]
    fn test_block_breaks_can_be_disabled() {
        let options = EditorOptions {
            line_break_on_block: false,
            ..EditorOptions::default()
        };
        let elements = read_element_list("<div><p>one</p><p>two</p></div>", &options).unwrap();
        assert_eq!(values(&elements), vec!["one", "two"]);
    }

    #[test]
    fn test_top_level_text_dropped() {
        let elements = read("stray<span>kept</span>tail");
        assert_eq!(values(&elements), vec!["kept"]);
    }

    #[test]
    fn test_hyperlink() {
        let elements = read(r#"<p><a href="https://example.com">link <b>text</b></a></p>"#);
        assert_eq!(elements.len(), 1);
        match &elements[0].kind {
            ElementKind::Hyperlink { url, children, .. } => {
                assert_eq!(url.as_deref(), Some("https://example.com"));
                assert_eq!(children.len(), 1);
                assert_eq!(children[0].plain_text(), "link text");
            }
            other => panic!("expected hyperlink, got {:?}", other),
        }
    }

    #[test]
    fn test_table() {
        let elements = read(
            "<table><tbody><tr><td colspan=\"2\">a</td></tr><tr><td>b</td><td><b>c</b></td></tr></tbody></table>",
        );
        let table = elements[0].as_table().unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.rows[0].cells[0].colspan, 2);
        assert_eq!(table.column_width(0), Some(277.0));
        assert!(table.rows[1].cells[1].elements[0].style().bold);
    }

    #[test]
    fn test_image_and_separator() {
        let elements = read(r#"<div><img src="a.png" width="30" height="40"><hr></div>"#);
        assert!(matches!(
            &elements[0].kind,
            ElementKind::Image { src, width, height, .. } if src == "a.png" && *width == 30.0 && *height == 40.0
        ));
        assert!(matches!(elements[1].kind, ElementKind::Separator { .. }));
    }

    #[test]
    fn test_styles_and_scripts_ignored() {
        let elements = read("<html><head><style>p { color: red }</style></head><body><p>x</p></body></html>");
        assert_eq!(values(&elements), vec!["x"]);
    }
}
