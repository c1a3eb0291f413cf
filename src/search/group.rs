//! Grouping pass: splits an element list into page and table segments.

use crate::model::Element;

/// Kind of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Run of page-level, non-table elements
    Page,
    /// A single table element
    Table,
}

/// A contiguous slice of the element list.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    /// Segment kind
    pub kind: SegmentKind,
    /// Elements of the segment (exactly one table for [`SegmentKind::Table`])
    pub elements: &'a [Element],
    /// Index of the first element in the full list
    pub start_index: usize,
    /// Unit offset of the first element in the full list's text space
    pub start_offset: usize,
}

impl Segment<'_> {
    /// Check if this is a table segment.
    pub fn is_table(&self) -> bool {
        self.kind == SegmentKind::Table
    }
}

/// Partition `elements` into maximal non-table runs and singleton table segments.
///
/// Segments come out in document order and never empty. Concatenating their
/// slices reproduces `elements`.
pub fn group_elements(elements: &[Element]) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut start_offset = 0;

    for (index, element) in elements.iter().enumerate() {
        if !element.is_table() {
            continue;
        }
        if index > start {
            let run = &elements[start..index];
            segments.push(Segment {
                kind: SegmentKind::Page,
                elements: run,
                start_index: start,
                start_offset,
            });
            start_offset += run.iter().map(Element::unit_len).sum::<usize>();
        }
        segments.push(Segment {
            kind: SegmentKind::Table,
            elements: &elements[index..=index],
            start_index: index,
            start_offset,
        });
        start = index + 1;
        start_offset += 1;
    }

    if start < elements.len() {
        segments.push(Segment {
            kind: SegmentKind::Page,
            elements: &elements[start..],
            start_index: start,
            start_offset,
        });
    }
    segments
}
