//! Editor options and configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Options for layout, search highlighting and clipboard conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    /// Editing mode
    pub mode: EditorMode,

    /// Font family used when an element sets none
    pub default_font: String,

    /// Font size in pixels used when an element sets none
    pub default_size: f32,

    /// Line spacing multiplier used when an element sets none
    pub default_row_margin: f32,

    /// Page width in pixels
    pub page_width: f32,

    /// Page height in pixels
    pub page_height: f32,

    /// Page margins in pixels: top, right, bottom, left
    pub margins: [f32; 4],

    /// Fill color of search matches
    pub search_match_color: String,

    /// Opacity of search match highlights (0.0 - 1.0)
    pub search_match_alpha: f32,

    /// Fill color of the active (navigated) match group
    pub search_navigate_match_color: String,

    /// Table cell padding in pixels: top, right, bottom, left
    pub table_cell_padding: [f32; 4],

    /// Minimum table row height in pixels
    pub default_row_min_height: f32,

    /// Width of a table column that declares none
    pub default_column_width: f32,

    /// Insert a line break after pasted block-level markup
    pub line_break_on_block: bool,

    /// Page header band
    pub header: HeaderOptions,
}

impl EditorOptions {
    /// Create new editor options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the editing mode.
    pub fn with_mode(mut self, mode: EditorMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the default font family.
    pub fn with_default_font(mut self, font: impl Into<String>) -> Self {
        self.default_font = font.into();
        self
    }

    /// Set the default font size.
    pub fn with_default_size(mut self, size: f32) -> Self {
        self.default_size = size;
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, width: f32, height: f32) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Set the page margins (top, right, bottom, left).
    pub fn with_margins(mut self, margins: [f32; 4]) -> Self {
        self.margins = margins;
        self
    }

    /// Set the page header band.
    pub fn with_header(mut self, header: HeaderOptions) -> Self {
        self.header = header;
        self
    }

    /// Set the search match fill color and opacity.
    pub fn with_search_match(mut self, color: impl Into<String>, alpha: f32) -> Self {
        self.search_match_color = color.into();
        self.search_match_alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Check if editing is disabled.
    pub fn is_readonly(&self) -> bool {
        self.mode == EditorMode::Readonly
    }

    /// Width available to page content.
    pub fn inner_width(&self) -> f32 {
        (self.page_width - self.margins[1] - self.margins[3]).max(0.0)
    }

    /// Top of the page content area.
    pub fn content_top(&self) -> f32 {
        self.margins[0] + self.header.extra_height(self.margins[0], self.page_height)
    }

    /// Height available to page content.
    pub fn inner_height(&self) -> f32 {
        (self.page_height - self.content_top() - self.margins[2]).max(0.0)
    }
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            mode: EditorMode::Edit,
            default_font: "Microsoft YaHei".to_string(),
            default_size: 16.0,
            default_row_margin: 1.0,
            page_width: 794.0,
            page_height: 1123.0,
            margins: [100.0, 120.0, 100.0, 120.0],
            search_match_color: "#FFFF00".to_string(),
            search_match_alpha: 0.6,
            search_navigate_match_color: "#AAD280".to_string(),
            table_cell_padding: [0.0, 5.0, 5.0, 5.0],
            default_row_min_height: 42.0,
            default_column_width: 40.0,
            line_break_on_block: true,
            header: HeaderOptions::default(),
        }
    }
}

/// Header band drawn at the top of every page.
///
/// Content starts below the header once the header reaches past the top
/// margin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderOptions {
    /// Distance from the page top to the header
    pub top: f32,
    /// Height of the header content in pixels
    pub height: f32,
    /// Largest share of the page height the header may take (0.0 - 1.0)
    pub max_height_ratio: f32,
    /// Header is hidden and reserves no space
    pub disabled: bool,
}

impl HeaderOptions {
    /// Create a header with content of the given height.
    pub fn new(height: f32) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }

    /// Space the header takes below the top margin.
    pub fn extra_height(&self, margin_top: f32, page_height: f32) -> f32 {
        if self.disabled || self.height <= 0.0 {
            return 0.0;
        }
        let height = self.height.min(page_height * self.max_height_ratio.clamp(0.0, 1.0));
        (self.top + height - margin_top).max(0.0)
    }
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            top: 30.0,
            height: 0.0,
            max_height_ratio: 0.5,
            disabled: false,
        }
    }
}

/// Editing mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    /// Content can be edited
    #[default]
    Edit,
    /// Content is readonly
    Readonly,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EditorOptions::default();
        assert_eq!(options.inner_width(), 554.0);
        assert_eq!(options.inner_height(), 923.0);
        assert!(!options.is_readonly());
    }

    #[test]
    fn test_from_json_partial() {
        let options =
            EditorOptions::from_json(r#"{"mode":"readonly","search_match_alpha":0.3}"#).unwrap();
        assert!(options.is_readonly());
        assert_eq!(options.search_match_alpha, 0.3);
        assert_eq!(options.default_size, 16.0);
    }

    #[test]
    fn test_header_extra_height() {
        let options = EditorOptions::default();
        assert_eq!(options.content_top(), 100.0);

        // 30 + 90 reaches 20px past the 100px top margin
        let options = options.with_header(HeaderOptions::new(90.0));
        assert_eq!(options.content_top(), 120.0);
        assert_eq!(options.inner_height(), 903.0);

        let capped = HeaderOptions {
            max_height_ratio: 0.1,
            ..HeaderOptions::new(500.0)
        };
        assert!((capped.extra_height(100.0, 1123.0) - 42.3).abs() < 0.01);

        let disabled = HeaderOptions {
            disabled: true,
            ..HeaderOptions::new(90.0)
        };
        assert_eq!(disabled.extra_height(100.0, 1123.0), 0.0);
    }

    #[test]
    fn test_header_from_json() {
        let options = EditorOptions::from_json(r#"{"header":{"height":80}}"#).unwrap();
        assert_eq!(options.header.top, 30.0);
        assert_eq!(options.content_top(), 110.0);
    }

    #[test]
    fn test_builder() {
        let options = EditorOptions::new()
            .with_page_size(400.0, 300.0)
            .with_margins([10.0; 4])
            .with_search_match("#FF0000", 2.0);
        assert_eq!(options.inner_width(), 380.0);
        assert_eq!(options.search_match_alpha, 1.0);
    }
}
