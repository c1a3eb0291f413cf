//! Element list to clipboard markup.

use super::markup::{text_content, to_html, MarkupElement, MarkupNode};
use crate::model::{ControlComponent, Element, ElementKind, ListType, Table, ZERO};
use crate::options::EditorOptions;
use serde::Serialize;

/// Plain text and HTML flavors of copied content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipboardPayload {
    /// `text/plain` flavor
    pub text: String,
    /// `text/html` flavor
    pub html: String,
}

/// Serialize elements for the clipboard.
///
/// Returns `None` when the selection produces no text (an image-only or
/// empty selection).
pub fn write_element_list(elements: &[Element], options: &EditorOptions) -> Option<ClipboardPayload> {
    let nodes = element_list_to_markup(elements, options);
    let text = text_content(&nodes);
    let html = to_html(&nodes);
    if text.is_empty() || html.is_empty() {
        return None;
    }
    log::debug!("clipboard: {} elements -> {} bytes of html", elements.len(), html.len());
    Some(ClipboardPayload { text, html })
}

/// Build the markup fragment for an element list.
pub fn element_list_to_markup(elements: &[Element], options: &EditorOptions) -> Vec<MarkupNode> {
    let mut nodes = Vec::new();
    for element in zip_text(elements) {
        write_element(&element, options, &mut nodes);
    }
    nodes
}

/// Merge runs of adjacent text elements sharing one style.
pub fn zip_text(elements: &[Element]) -> Vec<Element> {
    let mut zipped: Vec<Element> = Vec::with_capacity(elements.len());
    for element in elements {
        if let (
            Some(Element {
                common,
                kind: ElementKind::Text { value },
            }),
            ElementKind::Text { value: next },
        ) = (zipped.last_mut(), &element.kind)
        {
            if common.style == element.common.style && common.id.is_none() {
                value.push_str(next);
                continue;
            }
        }
        zipped.push(element.clone());
    }
    zipped
}

fn write_element(element: &Element, options: &EditorOptions, out: &mut Vec<MarkupNode>) {
    match &element.kind {
        ElementKind::Table(table) => out.push(write_table(table).into()),
        ElementKind::Hyperlink { url, children, .. } => {
            let mut a = MarkupElement::new("a");
            if let Some(url) = url {
                a = a.with_attribute("href", url.as_str());
            }
            let text: String = children.iter().map(Element::plain_text).collect();
            push_lines(&mut a.children, &text);
            out.push(a.into());
        }
        ElementKind::Image {
            src, width, height, ..
        } => {
            let mut img = MarkupElement::new("img");
            if !src.is_empty() {
                img = img
                    .with_attribute("src", src.as_str())
                    .with_attribute("width", width.to_string())
                    .with_attribute("height", height.to_string());
            }
            out.push(img.into());
        }
        ElementKind::Separator { .. } => out.push(MarkupElement::new("hr").into()),
        ElementKind::Title {
            level, children, ..
        } => {
            let mut heading = MarkupElement::new(format!("h{}", (*level).clamp(1, 6)));
            heading.children = element_list_to_markup(children, options);
            out.push(heading.into());
        }
        ElementKind::List {
            list_type, children, ..
        } => {
            let tag = match list_type {
                ListType::Ordered => "ol",
                ListType::Unordered => "ul",
            };
            let mut list = MarkupElement::new(tag);
            let text: String = children.iter().map(Element::plain_text).collect();
            for line in text.split(['\n', ZERO]).filter(|l| !l.is_empty()) {
                list.children.push(MarkupElement::new("li").with_text(line).into());
            }
            out.push(list.into());
        }
        ElementKind::Area { children, .. } => {
            let mut div = MarkupElement::new("div");
            div.children = element_list_to_markup(children, options);
            out.push(div.into());
        }
        ElementKind::Text { value } | ElementKind::Date { value, .. } | ElementKind::LaTex { value, .. } => {
            write_text(element, value, options, out)
        }
        ElementKind::Control {
            value,
            component: ControlComponent::Value,
            ..
        } => write_text(element, value, options, out),
        ElementKind::Control { .. }
        | ElementKind::Checkbox { .. }
        | ElementKind::Radio { .. }
        | ElementKind::Block { .. } => {}
    }
}

fn write_text(element: &Element, text: &str, options: &EditorOptions, out: &mut Vec<MarkupNode>) {
    if text.is_empty() {
        return;
    }
    let style = element.style();
    let tag = if style.is_block_aligned() { "p" } else { "span" };

    let mut css = vec![format!(
        "font-family: {}",
        style.font.as_deref().unwrap_or(&options.default_font)
    )];
    if let Some(row_flex) = style.row_flex {
        css.push(format!("text-align: {}", row_flex.as_css()));
    }
    if let Some(color) = &style.color {
        css.push(format!("color: {}", color));
    }
    if style.bold {
        css.push("font-weight: 600".to_string());
    }
    if style.italic {
        css.push("font-style: italic".to_string());
    }
    if let Some(size) = style.size {
        css.push(format!("font-size: {}px", size));
    }

    let mut node = MarkupElement::new(tag).with_attribute("style", css.join("; "));
    push_lines(&mut node.children, text);
    out.push(node.into());
}

fn write_table(table: &Table) -> MarkupElement {
    let mut node = MarkupElement::new("table");
    for row in &table.rows {
        let mut tr = MarkupElement::new("tr");
        for cell in &row.cells {
            let mut td = MarkupElement::new("td").with_attribute("style", "border: 1px solid");
            if cell.rowspan > 1 {
                td = td.with_attribute("rowspan", cell.rowspan.to_string());
            }
            if cell.colspan > 1 {
                td = td.with_attribute("colspan", cell.colspan.to_string());
            }
            push_lines(&mut td.children, &cell.plain_text());
            tr.children.push(td.into());
        }
        node.children.push(tr.into());
    }
    node
}

/// Append `text` as text nodes with line breaks turned into `<br>`.
fn push_lines(children: &mut Vec<MarkupNode>, text: &str) {
    for (i, line) in text.split(['\n', ZERO]).enumerate() {
        if i > 0 {
            children.push(MarkupElement::new("br").into());
        }
        if !line.is_empty() {
            children.push(MarkupNode::text(line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementStyle, RowFlex, TableCell, TableRow};

    #[test]
    fn test_styled_text() {
        let options = EditorOptions::default();
        let style = ElementStyle::new().bold().with_size(20.0).with_color("#ff0000");
        let payload = write_element_list(&[Element::styled_text("hi", style)], &options).unwrap();
        assert_eq!(payload.text, "hi");
        assert_eq!(
            payload.html,
            r#"<span style="font-family: Microsoft YaHei; color: #ff0000; font-weight: 600; font-size: 20px">hi</span>"#
        );
    }

    #[test]
    fn test_centered_text_is_paragraph() {
        let options = EditorOptions::default().with_default_font("Arial");
        let style = ElementStyle::new().with_row_flex(RowFlex::Center);
        let payload = write_element_list(&[Element::styled_text("x", style)], &options).unwrap();
        assert!(payload.html.starts_with(r#"<p style="font-family: Arial; text-align: center">"#));
    }

    #[test]
    fn test_adjacent_text_is_zipped() {
        let zipped = zip_text(&[
            Element::text("a"),
            Element::text("b"),
            Element::styled_text("c", ElementStyle::new().italic()),
            Element::text("d"),
        ]);
        assert_eq!(zipped.len(), 3);
        assert_eq!(zipped[0].plain_text(), "ab");
    }

    #[test]
    fn test_line_breaks() {
        let options = EditorOptions::default();
        let text = format!("a\nb{}c", ZERO);
        let payload = write_element_list(&[Element::text(text)], &options).unwrap();
        assert_eq!(payload.text, "a\nb\nc");
        assert!(payload.html.contains("a<br>b<br>c"));
    }

    #[test]
    fn test_table_markup() {
        let table = Table::new(
            vec![
                TableRow::new(vec![TableCell::text("a").colspan(2)]),
                TableRow::from_strings(["b", "c"]),
            ],
            [40.0, 40.0],
        );
        let payload = write_element_list(&[Element::table(table)], &EditorOptions::default()).unwrap();
        assert_eq!(
            payload.html,
            concat!(
                r#"<table><tr><td style="border: 1px solid" colspan="2">a</td></tr>"#,
                r#"<tr><td style="border: 1px solid">b</td><td style="border: 1px solid">c</td></tr></table>"#
            )
        );
        assert_eq!(payload.text, "a\nb\tc");
    }

    #[test]
    fn test_links_images_and_separators() {
        let elements = vec![
            Element::hyperlink("site", "https://example.com"),
            Element::image("pic.png", 10.0, 20.0),
            Element::separator(),
        ];
        let payload = write_element_list(&elements, &EditorOptions::default()).unwrap();
        assert_eq!(
            payload.html,
            r#"<a href="https://example.com">site</a><img src="pic.png" width="10" height="20"><hr>"#
        );
    }

    #[test]
    fn test_widgets_and_empty_text_skipped() {
        let elements = vec![
            Element::checkbox(true),
            Element::text(""),
            Element::control("{", ControlComponent::Prefix),
        ];
        assert_eq!(write_element_list(&elements, &EditorOptions::default()), None);
    }

    #[test]
    fn test_control_value_and_list() {
        let elements = vec![
            Element::control("42", ControlComponent::Value),
            Element::list(ListType::Ordered, vec![Element::text("one\ntwo")]),
        ];
        let payload = write_element_list(&elements, &EditorOptions::default()).unwrap();
        assert!(payload.html.ends_with("<ol><li>one</li><li>two</li></ol>"));
        assert!(payload.text.starts_with("42"));
    }
}
