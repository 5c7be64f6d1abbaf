//! Filter state: selected category values per filterable column.

use std::collections::HashSet;

use crate::columns::FilterColumn;
use crate::dataset::Row;

/// Selected filter values for the Position, Type and Priority columns.
///
/// The governing rule: an empty selection means no restriction. Rows
/// are only held back by columns with at least one selected value.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    position: HashSet<String>,
    equip_type: HashSet<String>,
    priority: HashSet<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self, column: FilterColumn) -> &HashSet<String> {
        match column {
            FilterColumn::Position => &self.position,
            FilterColumn::Type => &self.equip_type,
            FilterColumn::Priority => &self.priority,
        }
    }

    fn selected_mut(&mut self, column: FilterColumn) -> &mut HashSet<String> {
        match column {
            FilterColumn::Position => &mut self.position,
            FilterColumn::Type => &mut self.equip_type,
            FilterColumn::Priority => &mut self.priority,
        }
    }

    /// Add the value to the column's selection, or remove it when
    /// already selected.
    pub fn toggle(&mut self, column: FilterColumn, value: &str) {
        let set = self.selected_mut(column);
        if !set.remove(value) {
            set.insert(value.to_string());
        }
    }

    pub fn is_selected(&self, column: FilterColumn, value: &str) -> bool {
        self.selected(column).contains(value)
    }

    /// Drop every selection, returning all columns to "no restriction".
    pub fn clear(&mut self) {
        self.position.clear();
        self.equip_type.clear();
        self.priority.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty() && self.equip_type.is_empty() && self.priority.is_empty()
    }

    /// Whether a cell passes one column's filter. An empty selection
    /// means no restriction, so everything passes it.
    pub fn column_allows(&self, column: FilterColumn, cell: &str) -> bool {
        let set = self.selected(column);
        set.is_empty() || set.contains(cell)
    }

    /// Whether a row passes all three column filters.
    pub fn allows(&self, row: &Row) -> bool {
        FilterColumn::ALL
            .iter()
            .all(|&column| self.column_allows(column, row.cell(column.index())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        Row::new(cells.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_empty_selection_passes_everything() {
        let filters = FilterState::new();
        assert!(filters.allows(&row(&["FW", "シューズ", "1", "x", "VSストア"])));
        assert!(filters.allows(&row(&["??", "??", "??"])));
        assert!(filters.allows(&row(&[])));
    }

    #[test]
    fn test_toggle_adds_and_removes() {
        let mut filters = FilterState::new();
        filters.toggle(FilterColumn::Position, "FW");
        assert!(filters.is_selected(FilterColumn::Position, "FW"));
        filters.toggle(FilterColumn::Position, "FW");
        assert!(!filters.is_selected(FilterColumn::Position, "FW"));
        assert!(filters.is_empty());
    }

    #[test]
    fn test_single_column_restriction() {
        let mut filters = FilterState::new();
        filters.toggle(FilterColumn::Position, "FW");
        assert!(filters.allows(&row(&["FW", "シューズ", "1"])));
        assert!(!filters.allows(&row(&["GK", "シューズ", "1"])));
    }

    #[test]
    fn test_columns_combine_with_and() {
        let mut filters = FilterState::new();
        filters.toggle(FilterColumn::Position, "FW");
        filters.toggle(FilterColumn::Type, "シューズ");
        assert!(filters.allows(&row(&["FW", "シューズ", "1"])));
        assert!(!filters.allows(&row(&["FW", "ミサンガ", "1"])));
        assert!(!filters.allows(&row(&["GK", "シューズ", "1"])));
    }

    #[test]
    fn test_adding_a_value_widens_the_selection() {
        let mut filters = FilterState::new();
        filters.toggle(FilterColumn::Position, "FW");
        let fw = row(&["FW", "シューズ", "1"]);
        let gk = row(&["GK", "シューズ", "1"]);
        assert!(filters.allows(&fw));
        assert!(!filters.allows(&gk));

        filters.toggle(FilterColumn::Position, "GK");
        assert!(filters.allows(&fw));
        assert!(filters.allows(&gk));

        // removing the last selected value restores no-restriction
        filters.toggle(FilterColumn::Position, "FW");
        filters.toggle(FilterColumn::Position, "GK");
        assert!(filters.allows(&row(&["DMF", "?", "?"])));
    }

    #[test]
    fn test_priority_selection_restricts_like_the_others() {
        let mut filters = FilterState::new();
        filters.toggle(FilterColumn::Priority, "1");
        assert!(filters.allows(&row(&["FW", "シューズ", "1"])));
        assert!(!filters.allows(&row(&["FW", "シューズ", "2"])));
        filters.clear();
        assert!(filters.allows(&row(&["FW", "シューズ", "2"])));
    }
}
