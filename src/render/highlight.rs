//! Search match highlighting.

use super::surface::Surface;
use crate::model::{Element, ElementPosition};
use crate::options::EditorOptions;
use crate::search::{MatchGroupId, MatchLocation, SearchMatch};

/// Paints translucent rectangles over matched characters of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRenderer {
    /// Fill color of ordinary matches
    pub match_color: String,
    /// Fill color of the active match group
    pub navigate_color: String,
    /// Fill opacity
    pub alpha: f32,
}

impl MatchRenderer {
    /// Create a renderer using the colors configured in `options`.
    pub fn new(options: &EditorOptions) -> Self {
        Self {
            match_color: options.search_match_color.clone(),
            navigate_color: options.search_navigate_match_color.clone(),
            alpha: options.search_match_alpha,
        }
    }

    /// Draw the matches lying on `page_no`.
    ///
    /// Matches whose position cannot be resolved (stale after an edit) and
    /// matches on other pages are skipped. Returns the number of filled
    /// rectangles.
    pub fn render(
        &self,
        surface: &mut dyn Surface,
        page_no: usize,
        matches: &[SearchMatch],
        active_group: Option<MatchGroupId>,
        elements: &[Element],
        positions: &[ElementPosition],
    ) -> usize {
        if matches.is_empty() {
            return 0;
        }

        let mut drawn = 0;
        let mut color: Option<&str> = None;
        surface.save();
        surface.set_global_alpha(self.alpha);

        for m in matches {
            let Some(position) = resolve_position(elements, positions, m) else {
                log::debug!("skipping stale search match {:?}", m.location);
                continue;
            };
            if position.page_no != page_no {
                continue;
            }

            let fill = if Some(m.group_id) == active_group {
                self.navigate_color.as_str()
            } else {
                self.match_color.as_str()
            };
            if color != Some(fill) {
                surface.set_fill_style(fill);
                color = Some(fill);
            }

            let quad = &position.coordinate;
            surface.fill_rect(
                quad.left_top.x,
                quad.left_top.y,
                quad.right_top.x - quad.left_top.x,
                quad.left_bottom.y - quad.left_top.y,
            );
            drawn += 1;
        }

        surface.restore();
        log::trace!("page {}: {} match rects", page_no, drawn);
        drawn
    }
}

/// Look up the position record a match refers to.
///
/// Table matches resolve through the table's rows and cells; a cell whose id
/// changed since the search counts as stale.
pub fn resolve_position<'a>(
    elements: &'a [Element],
    positions: &'a [ElementPosition],
    m: &SearchMatch,
) -> Option<&'a ElementPosition> {
    match &m.location {
        MatchLocation::Page { index } => positions.get(*index),
        MatchLocation::Table {
            table_index,
            row_index,
            cell_index,
            cell_id,
            index,
        } => {
            let cell = elements
                .get(*table_index)?
                .as_table()?
                .cell(*row_index, *cell_index)?;
            if &cell.id != cell_id {
                return None;
            }
            cell.positions.get(*index)
        }
    }
}
