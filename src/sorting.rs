//! Sort state: the ordered key stack and per-column directions.

use std::collections::HashMap;

use crate::columns::{POSITION_COL, PRIORITY_COL, SHOP_COL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

/// Active sort keys, most recently activated first, plus remembered
/// directions. A column with no remembered direction is ascending;
/// entries are never pruned when a key leaves the stack, so a column
/// comes back with the direction it last had.
#[derive(Debug, Clone, Default)]
pub struct SortState {
    keys: Vec<usize>,
    directions: HashMap<usize, Direction>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key columns in priority order, primary first.
    pub fn keys(&self) -> &[usize] {
        &self.keys
    }

    pub fn is_active(&self) -> bool {
        !self.keys.is_empty()
    }

    pub fn primary(&self) -> Option<usize> {
        self.keys.first().copied()
    }

    /// Position of a column in the key stack, 0 for the primary.
    pub fn rank_of(&self, col: usize) -> Option<usize> {
        self.keys.iter().position(|&k| k == col)
    }

    pub fn direction_of(&self, col: usize) -> Direction {
        self.directions.get(&col).copied().unwrap_or_default()
    }

    /// Header activation: the current primary toggles its direction,
    /// any other column moves to the front of the stack keeping its
    /// remembered direction (ascending when it has none).
    pub fn activate(&mut self, col: usize) {
        if self.primary() == Some(col) {
            self.directions.insert(col, self.direction_of(col).toggled());
        } else {
            self.keys.retain(|&k| k != col);
            self.keys.insert(0, col);
            self.directions.entry(col).or_default();
        }
    }

    /// The quick-sort preset: priority, then shop, then position, all
    /// ascending, replacing whatever was active.
    pub fn quick_sort(&mut self) {
        self.keys = vec![PRIORITY_COL, SHOP_COL, POSITION_COL];
        self.directions = self
            .keys
            .iter()
            .map(|&k| (k, Direction::Ascending))
            .collect();
    }

    pub fn reset(&mut self) {
        self.keys.clear();
        self.directions.clear();
    }
}
