//! Cell and row comparison: numeric-aware Japanese collation plus the
//! game-defined column orders.

use std::cmp::Ordering;

use color_eyre::eyre::{eyre, Result};
use icu_collator::{Collator, CollatorOptions, Strength};
use icu_locid::locale;

use crate::columns::{POSITION_COL, POSITION_ORDER, SHOP_COL, SHOP_ORDER, TYPE_COL, TYPE_ORDER};
use crate::dataset::Row;
use crate::sorting::Direction;

/// Full-string float parse after trimming; NaN does not count.
/// Deliberately stricter than prefix parsing: "12a" is not a number
/// here and compares as text.
fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

fn directed(ord: Ordering, direction: Direction) -> Ordering {
    match direction {
        Direction::Ascending => ord,
        Direction::Descending => ord.reverse(),
    }
}

/// Row/cell ordering rules. Owns the Japanese collator, built once at
/// startup.
pub struct RowComparator {
    collator: Collator,
}

impl RowComparator {
    pub fn new() -> Result<Self> {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Tertiary);
        let collator = Collator::try_new(&locale!("ja").into(), options)
            .map_err(|e| eyre!("Failed to build Japanese collator: {e:?}"))?;
        Ok(Self { collator })
    }

    /// Numeric comparison when both cells are numbers, Japanese
    /// collation otherwise.
    pub fn compare_cells(&self, a: &str, b: &str) -> Ordering {
        match (parse_number(a), parse_number(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => self.collator.compare(a, b),
        }
    }

    /// Ascending rank by position in `order`. A value outside the table
    /// sorts after every value inside it; two outside values fall back
    /// to [`Self::compare_cells`].
    pub fn compare_by_order(&self, a: &str, b: &str, order: &[&str]) -> Ordering {
        self.by_order(a, b, order, Direction::Ascending)
    }

    /// Directed rank comparison. The direction reverses the order of
    /// two ranked values (or of two outside values compared
    /// generically); values outside the table stay pinned after ranked
    /// ones in either direction.
    fn by_order(&self, a: &str, b: &str, order: &[&str], direction: Direction) -> Ordering {
        let ia = order.iter().position(|v| *v == a);
        let ib = order.iter().position(|v| *v == b);
        match (ia, ib) {
            (Some(x), Some(y)) => directed(x.cmp(&y), direction),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => directed(self.compare_cells(a, b), direction),
        }
    }

    /// Comparison of two rows in one column under a sort direction.
    /// The Shop column breaks ties by Type order on the same rows,
    /// whether or not Type is an active sort key.
    pub fn compare_in_column(
        &self,
        a: &Row,
        b: &Row,
        col: usize,
        direction: Direction,
    ) -> Ordering {
        let va = a.cell(col);
        let vb = b.cell(col);
        match col {
            POSITION_COL => self.by_order(va, vb, &POSITION_ORDER, direction),
            TYPE_COL => self.by_order(va, vb, &TYPE_ORDER, direction),
            SHOP_COL => self.by_order(va, vb, &SHOP_ORDER, direction).then_with(|| {
                self.by_order(a.cell(TYPE_COL), b.cell(TYPE_COL), &TYPE_ORDER, direction)
            }),
            _ => directed(self.compare_cells(va, vb), direction),
        }
    }
}
