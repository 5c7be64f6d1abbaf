//! Column layout of the equipment table and the game-defined value orders.

/// Column indices fixed by the soubi_clean.csv layout.
pub const POSITION_COL: usize = 0;
pub const TYPE_COL: usize = 1;
pub const PRIORITY_COL: usize = 2;
pub const SHOP_COL: usize = 4;

/// Columns offered as sort targets, in table order.
pub const SORTABLE_COLS: [usize; 4] = [POSITION_COL, TYPE_COL, PRIORITY_COL, SHOP_COL];

/// Position ranking, attackers before defenders.
pub const POSITION_ORDER: [&str; 6] = ["FW", "AMF", "DMF", "ADF", "DDF", "GK"];

/// Shop ranking.
pub const SHOP_ORDER: [&str; 3] = ["クロニクル百貨店", "VSストア", "スピリット交換所"];

/// Equipment type ranking, also the tie-break order within a shop.
pub const TYPE_ORDER: [&str; 4] = ["シューズ", "ミサンガ", "ペンダント", "スペシャル"];

/// Whether a column can be activated as a sort key from the UI.
pub fn is_sortable(col: usize) -> bool {
    SORTABLE_COLS.contains(&col)
}

/// The columns that can be filtered by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterColumn {
    Position,
    Type,
    Priority,
}

impl FilterColumn {
    pub const ALL: [FilterColumn; 3] = [
        FilterColumn::Position,
        FilterColumn::Type,
        FilterColumn::Priority,
    ];

    pub fn index(self) -> usize {
        match self {
            FilterColumn::Position => POSITION_COL,
            FilterColumn::Type => TYPE_COL,
            FilterColumn::Priority => PRIORITY_COL,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterColumn::Position => "Position",
            FilterColumn::Type => "Type",
            FilterColumn::Priority => "Priority",
        }
    }

    /// Fixed value list for the column's filter group. Empty for Priority,
    /// whose candidates come from the loaded data.
    pub fn known_values(self) -> &'static [&'static str] {
        match self {
            FilterColumn::Position => &POSITION_ORDER,
            FilterColumn::Type => &TYPE_ORDER,
            FilterColumn::Priority => &[],
        }
    }
}
