//! Context predicates and the table context menu.

use serde::Serialize;

/// Editor state the context menu is evaluated against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContextMenuContext {
    /// Editing is disabled
    pub is_readonly: bool,
    /// The cursor is inside a table cell
    pub is_in_table: bool,
    /// The cell selection spans more than one row or column
    pub is_cross_row_col: bool,
}

/// Structural table edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableCommand {
    /// Insert a row above the cursor
    InsertRowAbove,
    /// Insert a row below the cursor
    InsertRowBelow,
    /// Insert a column left of the cursor
    InsertColumnLeft,
    /// Insert a column right of the cursor
    InsertColumnRight,
    /// Delete the cursor's row
    DeleteRow,
    /// Delete the cursor's column
    DeleteColumn,
    /// Delete the whole table
    DeleteTable,
    /// Merge the selected cells
    MergeCells,
    /// Split the cell under the cursor
    CancelMerge,
}

/// Visibility predicate of a menu entry.
pub type MenuPredicate = fn(&ContextMenuContext) -> bool;

/// One entry of a context menu.
#[derive(Debug, Clone)]
pub struct ContextMenu {
    /// Display name
    pub name: &'static str,
    /// Icon key
    pub icon: Option<&'static str>,
    /// Renders as a separator line
    pub is_divider: bool,
    /// Shown when this returns true
    pub when: MenuPredicate,
    /// Command run on activation
    pub command: Option<TableCommand>,
    /// Submenu entries
    pub children: Vec<ContextMenu>,
}

impl ContextMenu {
    fn item(name: &'static str, icon: &'static str, when: MenuPredicate) -> Self {
        Self {
            name,
            icon: Some(icon),
            is_divider: false,
            when,
            command: None,
            children: Vec::new(),
        }
    }

    fn divider() -> Self {
        Self {
            name: "",
            icon: None,
            is_divider: true,
            when: always,
            command: None,
            children: Vec::new(),
        }
    }

    fn with_command(mut self, command: TableCommand) -> Self {
        self.command = Some(command);
        self
    }

    fn with_children(mut self, children: Vec<ContextMenu>) -> Self {
        self.children = children;
        self
    }

    /// Check if the entry is shown in `context`.
    pub fn is_visible(&self, context: &ContextMenuContext) -> bool {
        (self.when)(context)
    }

    /// Copy of the entry keeping only submenu entries visible in `context`.
    pub fn filtered(&self, context: &ContextMenuContext) -> ContextMenu {
        let mut menu = self.clone();
        menu.children = visible_menus(&self.children, context);
        menu
    }
}

/// Entries of `menus` visible in `context`, submenus filtered too.
pub fn visible_menus(menus: &[ContextMenu], context: &ContextMenuContext) -> Vec<ContextMenu> {
    menus
        .iter()
        .filter(|menu| menu.is_visible(context))
        .map(|menu| menu.filtered(context))
        .collect()
}

fn always(_: &ContextMenuContext) -> bool {
    true
}

fn editable_in_table(context: &ContextMenuContext) -> bool {
    !context.is_readonly && context.is_in_table
}

fn editable_cross_row_col(context: &ContextMenuContext) -> bool {
    !context.is_readonly && context.is_cross_row_col
}

/// The table context menu.
pub fn table_menus() -> Vec<ContextMenu> {
    vec![
        ContextMenu::divider(),
        ContextMenu::item("Insert row/column", "insert-row-col", editable_in_table).with_children(vec![
            ContextMenu::item("Insert row above", "insert-top-row", always)
                .with_command(TableCommand::InsertRowAbove),
            ContextMenu::item("Insert row below", "insert-bottom-row", always)
                .with_command(TableCommand::InsertRowBelow),
            ContextMenu::item("Insert column left", "insert-left-col", always)
                .with_command(TableCommand::InsertColumnLeft),
            ContextMenu::item("Insert column right", "insert-right-col", always)
                .with_command(TableCommand::InsertColumnRight),
        ]),
        ContextMenu::item("Delete row/column", "delete-row-col", editable_in_table).with_children(vec![
            ContextMenu::item("Delete row", "delete-row", always).with_command(TableCommand::DeleteRow),
            ContextMenu::item("Delete column", "delete-col", always)
                .with_command(TableCommand::DeleteColumn),
            ContextMenu::item("Delete table", "delete-table", always)
                .with_command(TableCommand::DeleteTable),
        ]),
        ContextMenu::item("Merge cells", "merge-cell", editable_cross_row_col)
            .with_command(TableCommand::MergeCells),
        ContextMenu::item("Cancel merge", "merge-cancel-cell", editable_in_table)
            .with_command(TableCommand::CancelMerge),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(menus: &[ContextMenu]) -> Vec<&'static str> {
        menus.iter().filter(|m| !m.is_divider).map(|m| m.name).collect()
    }

    #[test]
    fn test_menus_outside_table() {
        let context = ContextMenuContext::default();
        assert!(names(&visible_menus(&table_menus(), &context)).is_empty());
    }

    #[test]
    fn test_menus_in_table() {
        let context = ContextMenuContext {
            is_in_table: true,
            ..Default::default()
        };
        let menus = visible_menus(&table_menus(), &context);
        assert_eq!(
            names(&menus),
            vec!["Insert row/column", "Delete row/column", "Cancel merge"]
        );
        assert_eq!(menus[1].children.len(), 4);
    }

    #[test]
    fn test_merge_needs_cross_selection() {
        let context = ContextMenuContext {
            is_in_table: true,
            is_cross_row_col: true,
            is_readonly: false,
        };
        let menus = visible_menus(&table_menus(), &context);
        assert!(menus
            .iter()
            .any(|m| m.command == Some(TableCommand::MergeCells)));
    }

    #[test]
    fn test_readonly_hides_everything() {
        let context = ContextMenuContext {
            is_readonly: true,
            is_in_table: true,
            is_cross_row_col: true,
        };
        assert!(names(&visible_menus(&table_menus(), &context)).is_empty());
    }
}
