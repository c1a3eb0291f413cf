//! Search over the element list.
//!
//! Tables break the page text into independent per-cell text spaces, so the
//! element list is first grouped into page and table segments and each text
//! space is searched on its own.

mod engine;
mod group;

pub use engine::{MatchGroupId, MatchLocation, NavigateInfo, SearchEngine, SearchMatch};
pub use group::{group_elements, Segment, SegmentKind};
