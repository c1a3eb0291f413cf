//! In-memory markup tree for clipboard HTML.
//!
//! Parsing is lenient: void elements need no closing tag, unmatched end tags
//! are ignored and elements left open at the end of input are closed. A `<`
//! that cannot start a tag is text. Named entities resolve against the HTML5
//! table; text containing an unknown one is kept verbatim.

use std::borrow::Cow;
use std::sync::OnceLock;

use quick_xml::escape::{escape, resolve_html5_entity};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;
use regex::Regex;

use crate::error::Result;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "figure", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p",
    "pre", "section", "table", "tr", "ul",
];

/// Elements whose text is never content.
const RAW_TAGS: &[&str] = &["script", "style", "title", "head"];

/// A node of a markup fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    /// Element with attributes and children
    Element(MarkupElement),
    /// Text (already unescaped)
    Text(String),
}

/// A markup element.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupElement {
    /// Lowercase tag name
    pub tag: String,
    /// Attributes in source order, lowercase names
    pub attributes: Vec<(String, String)>,
    /// Child nodes
    pub children: Vec<MarkupNode>,
}

impl MarkupElement {
    /// Create an element with no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute and return self.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add a child and return self.
    pub fn with_child(mut self, child: impl Into<MarkupNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Add a text child and return self.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(MarkupNode::Text(text.into()))
    }

    /// Value of an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Value of an inline style property.
    pub fn style(&self, property: &str) -> Option<&str> {
        self.attribute("style")
            .and_then(|style| style_property(style, property))
    }

    /// Check if the element never has children.
    pub fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag.as_str())
    }

    /// Check if the element is laid out as a block.
    pub fn is_block(&self) -> bool {
        match self.style("display") {
            Some(display) => display.eq_ignore_ascii_case("block"),
            None => BLOCK_TAGS.contains(&self.tag.as_str()),
        }
    }

    /// Check if the element's text is not document content.
    pub fn is_raw(&self) -> bool {
        RAW_TAGS.contains(&self.tag.as_str())
    }
}

impl From<MarkupElement> for MarkupNode {
    fn from(element: MarkupElement) -> Self {
        MarkupNode::Element(element)
    }
}

impl MarkupNode {
    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        MarkupNode::Text(text.into())
    }

    /// Borrow the element, if this is an element node.
    pub fn as_element(&self) -> Option<&MarkupElement> {
        match self {
            MarkupNode::Element(element) => Some(element),
            MarkupNode::Text(_) => None,
        }
    }

    /// Serialize the node as HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_node(self, &mut out);
        out
    }

    /// Rendered text of the node: blocks start new lines, `<br>` breaks,
    /// table cells are tab separated.
    pub fn text_content(&self) -> String {
        text_content(std::slice::from_ref(self))
    }
}

/// Serialize a fragment as HTML.
pub fn to_html(nodes: &[MarkupNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

/// Rendered text of a fragment.
pub fn text_content(nodes: &[MarkupNode]) -> String {
    let mut text = TextCollector::default();
    for node in nodes {
        text.node(node);
    }
    text.out
}

/// Parse an HTML fragment.
pub fn parse_markup(html: &str) -> Result<Vec<MarkupNode>> {
    let source = escape_stray_lt(html);
    let mut reader = Reader::from_str(&source);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut tree = TreeBuilder::default();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let element = start_element(&e);
                if element.is_void() {
                    tree.append(element.into());
                } else {
                    tree.open.push(element);
                }
            }
            Event::Empty(e) => tree.append(start_element(&e).into()),
            Event::End(e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                tree.close(&tag);
            }
            Event::Text(e) => tree.text(unescape_text(&e)),
            Event::CData(e) => tree.text(String::from_utf8_lossy(&e).into_owned()),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(tree.finish())
}

/// Look up a property in an inline `style` declaration list.
pub fn style_property<'a>(style: &'a str, property: &str) -> Option<&'a str> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case(property))
        .map(|(_, value)| value.trim())
        .last()
}

/// Parse a CSS pixel length such as `16px` or `14.5px`.
pub fn parse_px(value: &str) -> Option<f32> {
    static PX: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = PX
        .get_or_init(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*px\s*$").ok())
        .as_ref()?;
    pattern.captures(value)?.get(1)?.as_str().parse().ok()
}

/// Replace every `<` that cannot open a tag, comment or declaration with `&lt;`.
fn escape_stray_lt(html: &str) -> Cow<'_, str> {
    let bytes = html.as_bytes();
    let stray: Vec<usize> = html
        .match_indices('<')
        .map(|(i, _)| i)
        .filter(|&i| {
            !matches!(bytes.get(i + 1), Some(b) if b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'))
        })
        .collect();
    if stray.is_empty() {
        return Cow::Borrowed(html);
    }

    let mut out = String::with_capacity(html.len() + stray.len() * 3);
    let mut last = 0;
    for i in stray {
        out.push_str(&html[last..i]);
        out.push_str("&lt;");
        last = i + 1;
    }
    out.push_str(&html[last..]);
    Cow::Owned(out)
}

fn start_element(e: &BytesStart<'_>) -> MarkupElement {
    let mut element = MarkupElement::new(String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.html_attributes().flatten() {
        let name = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        let value = match attr.unescape_value_with(resolve_html5_entity) {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        element.attributes.push((name, value));
    }
    element
}

fn unescape_text(e: &BytesText<'_>) -> String {
    match e.unescape_with(resolve_html5_entity) {
        Ok(text) => text.into_owned(),
        Err(err) => {
            log::trace!("keeping raw text: {}", err);
            String::from_utf8_lossy(e).into_owned()
        }
    }
}

#[derive(Default)]
struct TreeBuilder {
    roots: Vec<MarkupNode>,
    open: Vec<MarkupElement>,
}

impl TreeBuilder {
    fn append(&mut self, node: MarkupNode) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if let Some(MarkupNode::Text(last)) = self
            .open
            .last_mut()
            .map_or(self.roots.last_mut(), |parent| parent.children.last_mut())
        {
            last.push_str(&text);
            return;
        }
        self.append(MarkupNode::Text(text));
    }

    fn close(&mut self, tag: &str) {
        let Some(depth) = self.open.iter().rposition(|e| e.tag == tag) else {
            log::trace!("ignoring unmatched </{}>", tag);
            return;
        };
        while self.open.len() > depth {
            self.pop();
        }
    }

    fn pop(&mut self) {
        if let Some(element) = self.open.pop() {
            self.append(element.into());
        }
    }

    fn finish(mut self) -> Vec<MarkupNode> {
        while !self.open.is_empty() {
            self.pop();
        }
        self.roots
    }
}

fn write_node(node: &MarkupNode, out: &mut String) {
    match node {
        MarkupNode::Text(text) => out.push_str(&escape(text.as_str())),
        MarkupNode::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape(value.as_str()));
                out.push('"');
            }
            out.push('>');
            if element.is_void() {
                return;
            }
            for child in &element.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

#[derive(Default)]
struct TextCollector {
    out: String,
    pending_break: bool,
}

impl TextCollector {
    fn node(&mut self, node: &MarkupNode) {
        match node {
            MarkupNode::Text(text) => self.push(text),
            MarkupNode::Element(element) => self.element(element),
        }
    }

    fn element(&mut self, element: &MarkupElement) {
        if element.is_raw() {
            return;
        }
        if element.tag == "br" {
            self.out.push('\n');
            self.pending_break = false;
            return;
        }
        let block = element.is_block();
        if block && !self.out.is_empty() && !self.out.ends_with('\n') {
            self.pending_break = true;
        }
        let mut cells = 0;
        for child in &element.children {
            if let MarkupNode::Element(cell) = child {
                if cell.tag == "td" || cell.tag == "th" {
                    if cells > 0 {
                        self.push("\t");
                    }
                    cells += 1;
                }
            }
            self.node(child);
        }
        if block {
            self.pending_break = true;
        }
    }

    fn push(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.pending_break && !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.pending_break = false;
        self.out.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &MarkupNode) -> &MarkupElement {
        node.as_element().unwrap()
    }

    #[test]
    fn test_parse_nested() {
        let nodes = parse_markup(r#"<p style="color: red">a<b>b</b></p>"#).unwrap();
        assert_eq!(nodes.len(), 1);
        let p = element(&nodes[0]);
        assert_eq!(p.tag, "p");
        assert_eq!(p.style("color"), Some("red"));
        assert_eq!(p.children.len(), 2);
        assert_eq!(element(&p.children[1]).tag, "b");
    }

    #[test]
    fn test_void_and_unmatched_tags() {
        let nodes = parse_markup("a<br>b</span><img src=x.png>c").unwrap();
        assert_eq!(nodes.len(), 5);
        assert_eq!(element(&nodes[1]).tag, "br");
        assert_eq!(element(&nodes[3]).attribute("src"), Some("x.png"));
        assert_eq!(nodes[4], MarkupNode::text("c"));
    }

    #[test]
    fn test_unclosed_elements_are_closed() {
        let nodes = parse_markup("<div><span>open").unwrap();
        let div = element(&nodes[0]);
        assert_eq!(element(&div.children[0]).children[0], MarkupNode::text("open"));
    }

    #[test]
    fn test_entities() {
        let nodes = parse_markup("a&amp;b&nbsp;c").unwrap();
        assert_eq!(nodes, vec![MarkupNode::text("a&b\u{00A0}c")]);
    }

    #[test]
    fn test_html5_named_entities() {
        let nodes = parse_markup("caf&eacute; &euro;5 &lsquo;q&rsquo; &#233;").unwrap();
        assert_eq!(
            nodes,
            vec![MarkupNode::text("caf\u{e9} \u{20ac}5 \u{2018}q\u{2019} \u{e9}")]
        );
    }

    #[test]
    fn test_unknown_entity_kept() {
        let nodes = parse_markup("a &bogus; b").unwrap();
        assert_eq!(nodes, vec![MarkupNode::text("a &bogus; b")]);
    }

    #[test]
    fn test_attribute_entities() {
        let nodes = parse_markup(r#"<a title="na&iuml;ve">x</a>"#).unwrap();
        assert_eq!(element(&nodes[0]).attribute("title"), Some("na\u{ef}ve"));
    }

    #[test]
    fn test_stray_less_than_is_text() {
        let nodes = parse_markup("<p>1 < 2 and 3 <= 4</p>").unwrap();
        assert_eq!(nodes[0].text_content(), "1 < 2 and 3 <= 4");
        assert_eq!(escape_stray_lt("<b>x</b><!-- c -->"), "<b>x</b><!-- c -->");
        assert_eq!(escape_stray_lt("a<3"), "a&lt;3");
    }

    #[test]
    fn test_to_html_escapes() {
        let node: MarkupNode = MarkupElement::new("a")
            .with_attribute("href", "https://x.test/?a=1&b=\"2\"")
            .with_text("<link>")
            .into();
        assert_eq!(
            node.to_html(),
            r#"<a href="https://x.test/?a=1&amp;b=&quot;2&quot;">&lt;link&gt;</a>"#
        );
        let hr: MarkupNode = MarkupElement::new("hr").into();
        assert_eq!(hr.to_html(), "<hr>");
    }

    #[test]
    fn test_text_content() {
        let nodes = parse_markup(
            "<span>a</span><p>b</p><span>c<br>d</span><table><tr><td>1</td><td>2</td></tr></table>",
        )
        .unwrap();
        assert_eq!(text_content(&nodes), "a\nb\nc\nd\n1\t2");
    }

    #[test]
    fn test_style_helpers() {
        assert_eq!(style_property("font-size: 14px; COLOR:blue", "color"), Some("blue"));
        assert_eq!(style_property("font-size: 14px", "color"), None);
        assert_eq!(parse_px("14.5px"), Some(14.5));
        assert_eq!(parse_px(" 16px "), Some(16.0));
        assert_eq!(parse_px("1em"), None);
    }

    #[test]
    fn test_display_block_style() {
        let span = MarkupElement::new("span").with_attribute("style", "display: block");
        assert!(span.is_block());
        let div = MarkupElement::new("div").with_attribute("style", "display:inline");
        assert!(!div.is_block());
    }
}
