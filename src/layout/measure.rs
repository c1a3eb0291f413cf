//! Metric sources for layout.
//!
//! Layout does not shape text. Hosts with a real font stack implement
//! [`TextMeasure`]; [`FixedMeasure`] derives metrics from the font size alone.

use crate::model::{ElementMetrics, ElementStyle};

/// Supplies the metrics of one character.
pub trait TextMeasure {
    /// Measure `ch` rendered with `style` at `font_size` pixels.
    fn measure_char(&self, ch: char, style: &ElementStyle, font_size: f32) -> ElementMetrics;
}

/// Metrics proportional to the font size.
///
/// Wide (CJK) characters advance by a full em, every other character by
/// `advance_ratio` of the font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMeasure {
    /// Advance of narrow characters as a fraction of the font size
    pub advance_ratio: f32,
    /// Ascent as a fraction of the font size
    pub ascent_ratio: f32,
    /// Descent as a fraction of the font size
    pub descent_ratio: f32,
}

impl FixedMeasure {
    /// Create a measurer with the given advance ratio.
    pub fn new(advance_ratio: f32) -> Self {
        Self {
            advance_ratio,
            ..Self::default()
        }
    }
}

impl Default for FixedMeasure {
    fn default() -> Self {
        Self {
            advance_ratio: 0.5,
            ascent_ratio: 0.8,
            descent_ratio: 0.2,
        }
    }
}

impl TextMeasure for FixedMeasure {
    fn measure_char(&self, ch: char, style: &ElementStyle, font_size: f32) -> ElementMetrics {
        let advance = if is_wide(ch) {
            font_size
        } else {
            font_size * self.advance_ratio
        };
        let width = advance + style.letter_spacing.unwrap_or(0.0);
        ElementMetrics {
            width,
            height: font_size * (self.ascent_ratio + self.descent_ratio),
            bounding_box_ascent: font_size * self.ascent_ratio,
            bounding_box_descent: font_size * self.descent_ratio,
        }
    }
}

fn is_wide(ch: char) -> bool {
    matches!(ch,
        '\u{1100}'..='\u{115F}'
        | '\u{2E80}'..='\u{A4CF}'
        | '\u{AC00}'..='\u{D7A3}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FE30}'..='\u{FE4F}'
        | '\u{FF00}'..='\u{FF60}'
        | '\u{FFE0}'..='\u{FFE6}')
}
