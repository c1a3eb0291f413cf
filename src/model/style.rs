//! Style attributes shared by every element kind.

use serde::{Deserialize, Serialize};

/// Character and paragraph styling carried by an element.
///
/// Unset optional attributes mean "not applicable" (the editor default is used).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementStyle {
    /// Font family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,

    /// Font size in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,

    /// Bold text
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,

    /// Italic text
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,

    /// Underlined text
    #[serde(skip_serializing_if = "is_false")]
    pub underline: bool,

    /// Struck-out text
    #[serde(skip_serializing_if = "is_false")]
    pub strikeout: bool,

    /// Text color (CSS color string)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Background highlight color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,

    /// Horizontal alignment of the row the element starts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_flex: Option<RowFlex>,

    /// Line spacing multiplier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_margin: Option<f32>,

    /// Extra spacing after each letter in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f32>,

    /// Decoration style for underline/strikeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<TextDecoration>,
}

impl ElementStyle {
    /// Create an empty style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bold and return self.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Set italic and return self.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Set the font size and return self.
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the color and return self.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the row alignment and return self.
    pub fn with_row_flex(mut self, row_flex: RowFlex) -> Self {
        self.row_flex = Some(row_flex);
        self
    }

    /// Check if this style lays the element out as its own block.
    pub fn is_block_aligned(&self) -> bool {
        matches!(self.row_flex, Some(RowFlex::Center) | Some(RowFlex::Right))
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Row alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowFlex {
    /// Left aligned
    #[default]
    Left,
    /// Centered
    Center,
    /// Right aligned
    Right,
    /// Aligned on both edges, except the last line
    Alignment,
    /// Justified
    Justify,
}

impl RowFlex {
    /// CSS `text-align` keyword.
    pub fn as_css(&self) -> &'static str {
        match self {
            RowFlex::Left => "left",
            RowFlex::Center => "center",
            RowFlex::Right => "right",
            RowFlex::Alignment | RowFlex::Justify => "justify",
        }
    }

    /// Parse a CSS `text-align` keyword.
    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim() {
            "left" | "start" => Some(RowFlex::Left),
            "center" => Some(RowFlex::Center),
            "right" | "end" => Some(RowFlex::Right),
            "justify" => Some(RowFlex::Justify),
            _ => None,
        }
    }
}

/// Decoration applied with underline or strikeout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextDecoration {
    /// Line style
    pub style: DecorationStyle,
}

/// Line style of a text decoration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecorationStyle {
    /// Single solid line
    #[default]
    Solid,
    /// Double line
    Double,
    /// Dashed line
    Dashed,
    /// Dotted line
    Dotted,
    /// Wavy line
    Wavy,
}
