//! Search engine: exact substring matching over segment text spaces.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use super::group::{group_elements, Segment, SegmentKind};
use crate::model::{text_space, Element};

/// Identifier shared by every character of one occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MatchGroupId(Uuid);

impl MatchGroupId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MatchGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a matched character lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchLocation {
    /// Page-level text; `index` is the global unit offset
    Page {
        /// Offset into the page-level position sequence
        index: usize,
    },
    /// Text inside a table cell; `index` is the cell-local unit offset
    Table {
        /// Element index of the table
        table_index: usize,
        /// Row index within the table
        row_index: usize,
        /// Cell index within the row
        cell_index: usize,
        /// Id of the cell at search time
        cell_id: String,
        /// Offset into the cell's position sequence
        index: usize,
    },
}

/// One matched character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    /// Occurrence this character belongs to
    pub group_id: MatchGroupId,
    /// Location of the character
    #[serde(flatten)]
    pub location: MatchLocation,
}

impl SearchMatch {
    /// Segment kind the match was found in.
    pub fn kind(&self) -> SegmentKind {
        match self.location {
            MatchLocation::Page { .. } => SegmentKind::Page,
            MatchLocation::Table { .. } => SegmentKind::Table,
        }
    }

    /// Unit offset of the character within its position sequence.
    pub fn index(&self) -> usize {
        match self.location {
            MatchLocation::Page { index } | MatchLocation::Table { index, .. } => index,
        }
    }
}

/// Position of the active group among all groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigateInfo {
    /// Zero-based index of the active group
    pub index: usize,
    /// Number of match groups
    pub count: usize,
}

/// Holds the match list of the most recent search.
#[derive(Debug, Default, Clone)]
pub struct SearchEngine {
    matches: Vec<SearchMatch>,
    groups: Vec<MatchGroupId>,
    query: Option<String>,
    active: Option<usize>,
}

impl SearchEngine {
    /// Create an engine with no matches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Search `elements` for `query`, replacing the held match list.
    ///
    /// An empty query clears the engine.
    pub fn compute(&mut self, elements: &[Element], query: &str) {
        if query.is_empty() {
            self.clear();
            return;
        }

        let needle: Vec<char> = query.chars().collect();
        let mut matches = Vec::new();
        for segment in group_elements(elements) {
            match segment.kind {
                SegmentKind::Page => search_page(&segment, &needle, &mut matches),
                SegmentKind::Table => search_table(&segment, &needle, &mut matches),
            }
        }

        let mut groups: Vec<MatchGroupId> = Vec::new();
        for m in &matches {
            if groups.last() != Some(&m.group_id) {
                groups.push(m.group_id);
            }
        }
        log::debug!(
            "search {:?}: {} groups, {} characters",
            query,
            groups.len(),
            matches.len()
        );

        self.matches = matches;
        self.groups = groups;
        self.query = Some(query.to_string());
        self.active = None;
    }

    /// Matches of the last search, one per character, in document order.
    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    /// Query of the last search.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Drop all match state.
    pub fn clear(&mut self) {
        self.matches.clear();
        self.groups.clear();
        self.query = None;
        self.active = None;
    }

    /// Check if the last search found nothing.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Number of occurrences.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Occurrence ids in document order.
    pub fn group_ids(&self) -> &[MatchGroupId] {
        &self.groups
    }

    /// Characters of one occurrence.
    pub fn group(&self, id: MatchGroupId) -> impl Iterator<Item = &SearchMatch> {
        self.matches.iter().filter(move |m| m.group_id == id)
    }

    /// Activate the next occurrence, wrapping to the first.
    pub fn navigate_next(&mut self) -> Option<MatchGroupId> {
        let count = self.groups.len();
        if count == 0 {
            return None;
        }
        let next = self.active.map_or(0, |i| (i + 1) % count);
        self.active = Some(next);
        self.active_group()
    }

    /// Activate the previous occurrence, wrapping to the last.
    pub fn navigate_prev(&mut self) -> Option<MatchGroupId> {
        let count = self.groups.len();
        if count == 0 {
            return None;
        }
        let prev = self.active.map_or(count - 1, |i| (i + count - 1) % count);
        self.active = Some(prev);
        self.active_group()
    }

    /// The active occurrence, if navigation has started.
    pub fn active_group(&self) -> Option<MatchGroupId> {
        self.active.and_then(|i| self.groups.get(i)).copied()
    }

    /// Index of the active occurrence and the occurrence count.
    pub fn navigate_info(&self) -> Option<NavigateInfo> {
        self.active.map(|index| NavigateInfo {
            index,
            count: self.groups.len(),
        })
    }
}

fn search_page(segment: &Segment<'_>, needle: &[char], out: &mut Vec<SearchMatch>) {
    let haystack = text_space(segment.elements);
    for start in find_all(&haystack, needle) {
        let group_id = MatchGroupId::generate();
        out.extend((0..needle.len()).map(|i| SearchMatch {
            group_id,
            location: MatchLocation::Page {
                index: segment.start_offset + start + i,
            },
        }));
    }
}

fn search_table(segment: &Segment<'_>, needle: &[char], out: &mut Vec<SearchMatch>) {
    let Some(table) = segment.elements.first().and_then(Element::as_table) else {
        return;
    };
    for (row_index, row) in table.rows.iter().enumerate() {
        for (cell_index, cell) in row.cells.iter().enumerate() {
            let haystack = text_space(&cell.elements);
            for start in find_all(&haystack, needle) {
                let group_id = MatchGroupId::generate();
                out.extend((0..needle.len()).map(|i| SearchMatch {
                    group_id,
                    location: MatchLocation::Table {
                        table_index: segment.start_index,
                        row_index,
                        cell_index,
                        cell_id: cell.id.clone(),
                        index: start + i,
                    },
                }));
            }
        }
    }
}

/// Start offsets of every occurrence of `needle`, overlapping ones included.
fn find_all(haystack: &[char], needle: &[char]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(|(_, window)| *window == needle)
        .map(|(start, _)| start)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ControlComponent, Table, TableCell, TableRow};

    fn page_groups(engine: &SearchEngine) -> Vec<Vec<usize>> {
        engine
            .group_ids()
            .iter()
            .map(|id| engine.group(*id).map(SearchMatch::index).collect())
            .collect()
    }

    #[test]
    fn test_repeated_text() {
        let mut engine = SearchEngine::new();
        engine.compute(&[Element::text("abcabc")], "abc");
        assert_eq!(page_groups(&engine), vec![vec![0, 1, 2], vec![3, 4, 5]]);
        assert!(engine.matches().iter().all(|m| m.kind() == SegmentKind::Page));
    }

    #[test]
    fn test_overlapping_occurrences() {
        let mut engine = SearchEngine::new();
        engine.compute(&[Element::text("aaa")], "aa");
        assert_eq!(page_groups(&engine), vec![vec![0, 1], vec![1, 2]]);
        assert_ne!(engine.group_ids()[0], engine.group_ids()[1]);
    }

    #[test]
    fn test_case_sensitive() {
        let mut engine = SearchEngine::new();
        engine.compute(&[Element::text("Abc abc")], "abc");
        assert_eq!(page_groups(&engine), vec![vec![4, 5, 6]]);
    }

    #[test]
    fn test_match_across_elements() {
        let mut engine = SearchEngine::new();
        engine.compute(&[Element::text("ab"), Element::text("cd")], "bc");
        assert_eq!(page_groups(&engine), vec![vec![1, 2]]);
    }

    #[test]
    fn test_checkbox_is_one_unit() {
        let elements = vec![
            Element::text("a"),
            Element::control("[unchecked-long-payload]", ControlComponent::Checkbox),
            Element::text("b"),
        ];
        let mut engine = SearchEngine::new();
        engine.compute(&elements, "b");
        assert_eq!(page_groups(&engine), vec![vec![2]]);

        engine.compute(&elements, &format!("a{}b", crate::model::ZERO));
        assert_eq!(page_groups(&engine), vec![vec![0, 1, 2]]);

        engine.compute(&elements, "unchecked");
        assert!(engine.is_empty());
    }

    #[test]
    fn test_table_cells_are_independent() {
        let table = Table::new(
            vec![
                TableRow::from_strings(["ab", "c"]),
                TableRow::new(vec![TableCell::text("xbc").with_id("cell-3")]),
            ],
            [40.0, 40.0],
        );
        let elements = vec![Element::text("b"), Element::table(table), Element::text("bc")];
        let mut engine = SearchEngine::new();
        engine.compute(&elements, "bc");

        // "ab" | "c" never forms "bc"
        let locations: Vec<&MatchLocation> = engine.matches().iter().map(|m| &m.location).collect();
        assert_eq!(locations.len(), 4);
        assert_eq!(
            locations[0],
            &MatchLocation::Table {
                table_index: 1,
                row_index: 1,
                cell_index: 0,
                cell_id: "cell-3".to_string(),
                index: 1,
            }
        );
        // page text "b" + table slot + "bc"
        assert_eq!(locations[2], &MatchLocation::Page { index: 2 });
        assert_eq!(locations[3], &MatchLocation::Page { index: 3 });
    }

    #[test]
    fn test_idempotent() {
        let elements = vec![Element::text("one two one")];
        let mut engine = SearchEngine::new();
        engine.compute(&elements, "one");
        let first: Vec<MatchLocation> = engine.matches().iter().map(|m| m.location.clone()).collect();
        let first_groups = page_groups(&engine);
        engine.compute(&elements, "one");
        let second: Vec<MatchLocation> = engine.matches().iter().map(|m| m.location.clone()).collect();
        assert_eq!(first, second);
        assert_eq!(first_groups, page_groups(&engine));
    }

    #[test]
    fn test_empty_query_clears() {
        let mut engine = SearchEngine::new();
        engine.compute(&[Element::text("abc")], "b");
        engine.navigate_next();
        engine.compute(&[Element::text("abc")], "");
        assert!(engine.is_empty());
        assert_eq!(engine.query(), None);
        assert_eq!(engine.active_group(), None);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut engine = SearchEngine::new();
        engine.compute(&[Element::text("x-x-x")], "x");
        assert_eq!(engine.navigate_info(), None);

        let first = engine.navigate_next();
        assert_eq!(first, Some(engine.group_ids()[0]));
        engine.navigate_next();
        engine.navigate_next();
        assert_eq!(engine.navigate_info(), Some(NavigateInfo { index: 2, count: 3 }));
        assert_eq!(engine.navigate_next(), first);
        assert_eq!(engine.navigate_prev(), Some(engine.group_ids()[2]));
    }

    #[test]
    fn test_navigation_without_matches() {
        let mut engine = SearchEngine::new();
        engine.compute(&[Element::text("abc")], "z");
        assert_eq!(engine.navigate_next(), None);
        assert_eq!(engine.navigate_prev(), None);
    }
}
