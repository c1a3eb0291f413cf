//! Element types: the units of document content.

use super::{ElementStyle, Table};
use serde::{Deserialize, Serialize};

/// One unit of document content (text run, table, image, control, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Attributes shared by every kind
    #[serde(flatten)]
    pub common: ElementCommon,

    /// Kind-specific payload
    #[serde(flatten)]
    pub kind: ElementKind,
}

/// Attributes shared by every element kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementCommon {
    /// Element identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Identifier assigned by the host application
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    /// Styling
    #[serde(flatten)]
    pub style: ElementStyle,

    /// Group/relationship ids (comments, annotations)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_ids: Vec<String>,
}

/// Kind-specific element payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    /// Plain text run
    Text {
        /// Text content
        value: String,
    },

    /// Title (heading) wrapping inline content
    Title {
        /// Heading level (1-6)
        level: u8,
        /// Title identifier
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title_id: Option<String>,
        /// Inline content
        children: Vec<Element>,
    },

    /// List wrapping inline content
    List {
        /// Ordered or unordered
        list_type: ListType,
        /// Marker style
        #[serde(default)]
        list_style: ListStyle,
        /// List identifier
        #[serde(default, skip_serializing_if = "Option::is_none")]
        list_id: Option<String>,
        /// Inline content, one item per line
        children: Vec<Element>,
    },

    /// Table
    Table(Table),

    /// Hyperlink wrapping inline content
    Hyperlink {
        /// Target URL
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        /// Hyperlink identifier
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hyperlink_id: Option<String>,
        /// Link text elements
        children: Vec<Element>,
    },

    /// Image
    Image {
        /// Image source (URL or data URI)
        src: String,
        /// Display width in pixels
        width: f32,
        /// Display height in pixels
        height: f32,
        /// Placement relative to text
        #[serde(default)]
        display: ImageDisplay,
    },

    /// Glyphs of a form control
    Control {
        /// Rendered glyphs of this control part
        value: String,
        /// Which part of the control these glyphs render
        component: ControlComponent,
        /// Control identifier
        #[serde(default, skip_serializing_if = "Option::is_none")]
        control_id: Option<String>,
        /// Current value of the whole control
        #[serde(default, skip_serializing_if = "Option::is_none")]
        control_value: Option<String>,
    },

    /// Standalone checkbox widget
    Checkbox {
        /// Submitted value
        #[serde(default)]
        value: String,
        /// Checked state
        #[serde(default)]
        checked: bool,
    },

    /// Standalone radio widget
    Radio {
        /// Submitted value
        #[serde(default)]
        value: String,
        /// Checked state
        #[serde(default)]
        checked: bool,
    },

    /// Date text
    Date {
        /// Formatted date text
        value: String,
        /// Format the date was rendered with
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date_format: Option<String>,
        /// Date identifier
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date_id: Option<String>,
    },

    /// Horizontal separator line
    Separator {
        /// Dash pattern (empty = solid)
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        dash_array: Vec<f32>,
    },

    /// Math expression
    #[serde(rename = "latex")]
    LaTex {
        /// LaTeX source
        value: String,
        /// Rendered SVG
        #[serde(default, skip_serializing_if = "Option::is_none")]
        svg: Option<String>,
    },

    /// Embedded block (iframe, video)
    Block {
        /// Embedded content
        block: BlockContent,
        /// Width in pixels
        width: f32,
        /// Height in pixels
        height: f32,
    },

    /// Editable area wrapping inline content
    Area {
        /// Area identifier
        #[serde(default, skip_serializing_if = "Option::is_none")]
        area_id: Option<String>,
        /// Content elements
        children: Vec<Element>,
    },
}

impl Element {
    /// Create an element of the given kind with no style.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            common: ElementCommon::default(),
            kind,
        }
    }

    /// Create a plain text element.
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(ElementKind::Text {
            value: value.into(),
        })
    }

    /// Create a styled text element.
    pub fn styled_text(value: impl Into<String>, style: ElementStyle) -> Self {
        Self::text(value).with_style(style)
    }

    /// Create a table element.
    pub fn table(table: Table) -> Self {
        Self::new(ElementKind::Table(table))
    }

    /// Create a hyperlink with a single text child.
    pub fn hyperlink(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(ElementKind::Hyperlink {
            url: Some(url.into()),
            hyperlink_id: None,
            children: vec![Element::text(text)],
        })
    }

    /// Create an inline image.
    pub fn image(src: impl Into<String>, width: f32, height: f32) -> Self {
        Self::new(ElementKind::Image {
            src: src.into(),
            width,
            height,
            display: ImageDisplay::Inline,
        })
    }

    /// Create control glyphs for one control part.
    pub fn control(value: impl Into<String>, component: ControlComponent) -> Self {
        Self::new(ElementKind::Control {
            value: value.into(),
            component,
            control_id: None,
            control_value: None,
        })
    }

    /// Create a checkbox widget.
    pub fn checkbox(checked: bool) -> Self {
        Self::new(ElementKind::Checkbox {
            value: String::new(),
            checked,
        })
    }

    /// Create a date element.
    pub fn date(value: impl Into<String>) -> Self {
        Self::new(ElementKind::Date {
            value: value.into(),
            date_format: None,
            date_id: None,
        })
    }

    /// Create a solid separator.
    pub fn separator() -> Self {
        Self::new(ElementKind::Separator {
            dash_array: Vec::new(),
        })
    }

    /// Create a title wrapping the given content.
    pub fn title(level: u8, children: Vec<Element>) -> Self {
        Self::new(ElementKind::Title {
            level: level.clamp(1, 6),
            title_id: None,
            children,
        })
    }

    /// Create a list wrapping the given content.
    pub fn list(list_type: ListType, children: Vec<Element>) -> Self {
        Self::new(ElementKind::List {
            list_type,
            list_style: ListStyle::default(),
            list_id: None,
            children,
        })
    }

    /// Create an explicit line break.
    pub fn line_break() -> Self {
        Self::text("\n")
    }

    /// Set the style and return self.
    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.common.style = style;
        self
    }

    /// Set the id and return self.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.common.id = Some(id.into());
        self
    }

    /// Element styling.
    pub fn style(&self) -> &ElementStyle {
        &self.common.style
    }

    /// Check if this element is a table.
    pub fn is_table(&self) -> bool {
        matches!(self.kind, ElementKind::Table(_))
    }

    /// Borrow the table payload, if this is a table.
    pub fn as_table(&self) -> Option<&Table> {
        match &self.kind {
            ElementKind::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Mutably borrow the table payload, if this is a table.
    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match &mut self.kind {
            ElementKind::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Check if this element renders the checkbox part of a control.
    pub fn is_checkbox_component(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Control {
                component: ControlComponent::Checkbox,
                ..
            }
        )
    }

    /// Text payload of a text-like element.
    ///
    /// Returns `None` for containers and atomic kinds, and for the checkbox
    /// part of a control, which renders as a single glyph slot.
    pub fn text_value(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Text { value } | ElementKind::Date { value, .. } => Some(value),
            ElementKind::Control {
                value, component, ..
            } if *component != ControlComponent::Checkbox => Some(value),
            _ => None,
        }
    }

    /// Inline children of a container kind.
    pub fn children(&self) -> Option<&[Element]> {
        match &self.kind {
            ElementKind::Title { children, .. }
            | ElementKind::List { children, .. }
            | ElementKind::Hyperlink { children, .. }
            | ElementKind::Area { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Plain text of this element, without placeholder slots.
    pub fn plain_text(&self) -> String {
        if let Some(value) = self.text_value() {
            return value.to_string();
        }
        match self.children() {
            Some(children) => children.iter().map(Element::plain_text).collect(),
            None => String::new(),
        }
    }

    /// Kind name as used in the serialized `type` tag.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Text { .. } => "text",
            ElementKind::Title { .. } => "title",
            ElementKind::List { .. } => "list",
            ElementKind::Table(_) => "table",
            ElementKind::Hyperlink { .. } => "hyperlink",
            ElementKind::Image { .. } => "image",
            ElementKind::Control { .. } => "control",
            ElementKind::Checkbox { .. } => "checkbox",
            ElementKind::Radio { .. } => "radio",
            ElementKind::Date { .. } => "date",
            ElementKind::Separator { .. } => "separator",
            ElementKind::LaTex { .. } => "latex",
            ElementKind::Block { .. } => "block",
            ElementKind::Area { .. } => "area",
        }
    }
}

/// Ordered or unordered list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    /// Bulleted list
    #[default]
    Unordered,
    /// Numbered list
    Ordered,
}

/// List marker style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    /// Filled circle
    #[default]
    Disc,
    /// Hollow circle
    Circle,
    /// Filled square
    Square,
    /// Decimal numbers
    Decimal,
    /// Checkbox markers
    Checkbox,
}

/// Image placement relative to surrounding text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageDisplay {
    /// Inline with text
    #[default]
    Inline,
    /// On its own line
    Block,
    /// Floating above text
    FloatTop,
    /// Floating below text
    FloatBottom,
    /// Text wraps around
    Surround,
}

/// Part of a form control rendered by a control element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlComponent {
    /// Leading delimiter
    Prefix,
    /// Trailing delimiter
    Postfix,
    /// Placeholder text shown while empty
    Placeholder,
    /// Entered value
    Value,
    /// Checkbox glyph
    Checkbox,
    /// Radio glyph
    Radio,
}

/// Embedded block content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BlockContent {
    /// Embedded frame
    Iframe {
        /// Frame source
        src: String,
    },
    /// Embedded video
    Video {
        /// Video source
        src: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_value_rules() {
        assert_eq!(Element::text("abc").text_value(), Some("abc"));
        assert_eq!(Element::date("2024-01-01").text_value(), Some("2024-01-01"));
        assert_eq!(
            Element::control("name", ControlComponent::Value).text_value(),
            Some("name")
        );
        assert_eq!(
            Element::control("☑", ControlComponent::Checkbox).text_value(),
            None
        );
        assert_eq!(Element::image("a.png", 10.0, 10.0).text_value(), None);
    }

    #[test]
    fn test_plain_text_of_container() {
        let link = Element::hyperlink("docs", "https://example.com");
        assert_eq!(link.plain_text(), "docs");
        assert_eq!(link.text_value(), None);

        let title = Element::title(9, vec![Element::text("Intro"), Element::text("!")]);
        assert_eq!(title.plain_text(), "Intro!");
        assert!(matches!(title.kind, ElementKind::Title { level: 6, .. }));
    }

    #[test]
    fn test_serde_tagged_shape() {
        let element = Element::styled_text("Hi", ElementStyle::new().bold());
        let json = serde_json::to_string(&element).unwrap();
        assert!(json.contains("\"type\":\"text\""));
        assert!(json.contains("\"bold\":true"));

        let parsed: Element =
            serde_json::from_str(r#"{"type":"control","value":"x","component":"checkbox"}"#)
                .unwrap();
        assert!(parsed.is_checkbox_component());
    }
}
