//! Rendering of search highlights onto a drawing surface.
//!
//! The pixel backend is not part of the crate. [`Surface`] is the seam a host
//! canvas implements; [`RecordingSurface`] captures the calls for inspection.

mod highlight;
mod surface;

pub use highlight::{resolve_position, MatchRenderer};
pub use surface::{DrawCommand, RecordingSurface, Surface};
