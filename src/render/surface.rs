//! Drawing surface abstraction.

use serde::Serialize;

/// The subset of a 2D canvas context highlight rendering needs.
///
/// `save` and `restore` bracket state changes the way a canvas state stack
/// does; implementations restore alpha and fill style on `restore`.
pub trait Surface {
    /// Push the current drawing state.
    fn save(&mut self);

    /// Pop the most recently saved drawing state.
    fn restore(&mut self);

    /// Set the opacity of subsequent fills.
    fn set_global_alpha(&mut self, alpha: f32);

    /// Set the color of subsequent fills.
    fn set_fill_style(&mut self, color: &str);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    /// State pushed
    Save,
    /// State popped
    Restore,
    /// Opacity changed
    GlobalAlpha {
        /// New opacity
        alpha: f32,
    },
    /// Fill color changed
    FillStyle {
        /// New color
        color: String,
    },
    /// Rectangle filled
    FillRect {
        /// Left edge
        x: f32,
        /// Top edge
        y: f32,
        /// Width
        width: f32,
        /// Height
        height: f32,
    },
}

/// A surface that records every call instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    /// Create an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded calls in order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Filled rectangles as `(x, y, width, height)`.
    pub fn rects(&self) -> Vec<(f32, f32, f32, f32)> {
        self.commands
            .iter()
            .filter_map(|c| match *c {
                DrawCommand::FillRect {
                    x,
                    y,
                    width,
                    height,
                } => Some((x, y, width, height)),
                _ => None,
            })
            .collect()
    }

    /// Consume the recording.
    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::GlobalAlpha { alpha });
    }

    fn set_fill_style(&mut self, color: &str) {
        self.commands.push(DrawCommand::FillStyle {
            color: color.to_string(),
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
        });
    }
}
