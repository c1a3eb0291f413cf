//! Position records produced by layout.

use serde::{Deserialize, Serialize};

/// A point in page pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Bounding quad of a rendered unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Top-left corner
    pub left_top: Point,
    /// Bottom-left corner
    pub left_bottom: Point,
    /// Top-right corner
    pub right_top: Point,
    /// Bottom-right corner
    pub right_bottom: Point,
}

impl Coordinate {
    /// Axis-aligned quad from origin and size.
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            left_top: Point::new(x, y),
            left_bottom: Point::new(x, y + height),
            right_top: Point::new(x + width, y),
            right_bottom: Point::new(x + width, y + height),
        }
    }

    /// Width along the top edge.
    pub fn width(&self) -> f32 {
        self.right_top.x - self.left_top.x
    }

    /// Height along the left edge.
    pub fn height(&self) -> f32 {
        self.left_bottom.y - self.left_top.y
    }

    /// Move the quad by the given offset.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        for point in [
            &mut self.left_top,
            &mut self.left_bottom,
            &mut self.right_top,
            &mut self.right_bottom,
        ] {
            point.x += dx;
            point.y += dy;
        }
    }
}

/// Measured size of a unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementMetrics {
    /// Advance width
    pub width: f32,
    /// Total height
    pub height: f32,
    /// Distance from baseline to top
    pub bounding_box_ascent: f32,
    /// Distance from baseline to bottom
    pub bounding_box_descent: f32,
}

/// Resolved page and geometry of one rendered unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPosition {
    /// Page number (0-indexed)
    pub page_no: usize,
    /// Index of this record in its position sequence
    pub index: usize,
    /// Unit text (placeholder units use U+200B)
    pub value: String,
    /// Line index within the laid out sequence
    pub row_index: usize,
    /// Line index within the page
    pub row_no: usize,
    /// Line ascent
    pub ascent: f32,
    /// Line height
    pub line_height: f32,
    /// Offset from the line's start
    pub left: f32,
    /// Unit metrics
    pub metrics: ElementMetrics,
    /// First unit of its line
    pub is_first_letter: bool,
    /// Last unit of its line
    pub is_last_letter: bool,
    /// Bounding quad
    pub coordinate: Coordinate,
}

impl ElementPosition {
    /// Move the record to a page and offset.
    pub fn relocate(&mut self, dx: f32, dy: f32, page_no: usize) {
        self.coordinate.translate(dx, dy);
        self.page_no = page_no;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_from_rect() {
        let quad = Coordinate::from_rect(10.0, 20.0, 5.0, 8.0);
        assert_eq!(quad.width(), 5.0);
        assert_eq!(quad.height(), 8.0);
        assert_eq!(quad.right_bottom, Point::new(15.0, 28.0));
    }

    #[test]
    fn test_relocate() {
        let mut position = ElementPosition {
            coordinate: Coordinate::from_rect(0.0, 0.0, 4.0, 4.0),
            ..Default::default()
        };
        position.relocate(100.0, 50.0, 2);
        assert_eq!(position.page_no, 2);
        assert_eq!(position.coordinate.left_top, Point::new(100.0, 50.0));
        assert_eq!(position.coordinate.width(), 4.0);
    }
}
