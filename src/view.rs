//! View computation: the filtered, sorted row indices shown in the table.

use std::cmp::Ordering;

use crate::compare::RowComparator;
use crate::dataset::Dataset;
use crate::filters::FilterState;
use crate::sorting::SortState;

/// Filters the dataset, then applies one stable multi-key sort.
/// Returns indices into `dataset.rows()` in display order; with no
/// active sort keys the filtered rows keep load order.
pub fn visible_rows(
    dataset: &Dataset,
    filters: &FilterState,
    sort: &SortState,
    comparator: &RowComparator,
) -> Vec<usize> {
    let rows = dataset.rows();
    let mut visible: Vec<usize> = (0..rows.len())
        .filter(|&i| filters.allows(&rows[i]))
        .collect();

    if !sort.is_active() {
        return visible;
    }

    visible.sort_by(|&ia, &ib| {
        let a = &rows[ia];
        let b = &rows[ib];
        sort.keys()
            .iter()
            .map(|&col| comparator.compare_in_column(a, b, col, sort.direction_of(col)))
            .find(|&ord| ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{FilterColumn, POSITION_COL, PRIORITY_COL, SHOP_COL, TYPE_COL};
    use crate::OpenOptions;

    const FIXTURE: &str = "\
ポジション,種類,優先度,名前,入手先
GK,ミサンガ,2,G1,スピリット交換所
FW,ペンダント,1,F1,VSストア
DMF,シューズ,3,D1,クロニクル百貨店
FW,シューズ,1,F2,VSストア
AMF,スペシャル,2,A1,クロニクル百貨店
";

    fn dataset(csv: &str) -> Dataset {
        Dataset::from_reader(csv.as_bytes(), &OpenOptions::default()).unwrap()
    }

    fn cell_values(ds: &Dataset, visible: &[usize], col: usize) -> Vec<String> {
        visible
            .iter()
            .map(|&i| ds.rows()[i].cell(col).to_string())
            .collect()
    }

    fn names(ds: &Dataset, visible: &[usize]) -> Vec<String> {
        cell_values(ds, visible, 3)
    }

    #[test]
    fn test_no_state_keeps_load_order() {
        let ds = dataset(FIXTURE);
        let cmp = RowComparator::new().unwrap();
        let visible = visible_rows(&ds, &FilterState::new(), &SortState::new(), &cmp);
        assert_eq!(visible, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_filter_only_keeps_load_order() {
        let ds = dataset(FIXTURE);
        let cmp = RowComparator::new().unwrap();
        let mut filters = FilterState::new();
        filters.toggle(FilterColumn::Position, "FW");
        let visible = visible_rows(&ds, &filters, &SortState::new(), &cmp);
        assert_eq!(names(&ds, &visible), vec!["F1", "F2"]);
    }

    #[test]
    fn test_position_order_example() {
        let ds = dataset("pos,type,pri,name,shop\nGK,a,1,g,s\nFW,a,1,f,s\nDMF,a,1,d,s\n");
        let cmp = RowComparator::new().unwrap();
        let mut sort = SortState::new();
        sort.activate(POSITION_COL);
        let visible = visible_rows(&ds, &FilterState::new(), &sort, &cmp);
        assert_eq!(cell_values(&ds, &visible, 0), vec!["FW", "DMF", "GK"]);
    }

    #[test]
    fn test_unknown_position_stays_last_in_both_directions() {
        let ds = dataset("pos,type,pri,name,shop\nGK,a,1,g,s\nLB,a,1,l,s\nFW,a,1,f,s\n");
        let cmp = RowComparator::new().unwrap();
        let mut sort = SortState::new();
        sort.activate(POSITION_COL);
        let visible = visible_rows(&ds, &FilterState::new(), &sort, &cmp);
        assert_eq!(cell_values(&ds, &visible, 0), vec!["FW", "GK", "LB"]);

        sort.activate(POSITION_COL);
        let visible = visible_rows(&ds, &FilterState::new(), &sort, &cmp);
        assert_eq!(cell_values(&ds, &visible, 0), vec!["GK", "FW", "LB"]);
    }

    #[test]
    fn test_equal_rows_keep_filtered_order() {
        let ds = dataset(FIXTURE);
        let cmp = RowComparator::new().unwrap();
        let mut sort = SortState::new();
        sort.activate(PRIORITY_COL);
        let visible = visible_rows(&ds, &FilterState::new(), &sort, &cmp);
        // F1 before F2 and G1 before A1, as loaded
        assert_eq!(names(&ds, &visible), vec!["F1", "F2", "G1", "A1", "D1"]);
    }

    #[test]
    fn test_shop_sort_groups_by_type_within_shop() {
        let ds = dataset(
            "pos,type,pri,name,shop\nFW,ペンダント,1,P,VSストア\nFW,シューズ,1,S,VSストア\n",
        );
        let cmp = RowComparator::new().unwrap();
        let mut sort = SortState::new();
        sort.activate(SHOP_COL);
        let visible = visible_rows(&ds, &FilterState::new(), &sort, &cmp);
        assert_eq!(names(&ds, &visible), vec!["S", "P"]);
    }

    #[test]
    fn test_quick_sort_overrides_prior_state() {
        let ds = dataset(FIXTURE);
        let cmp = RowComparator::new().unwrap();
        let mut sort = SortState::new();
        sort.activate(SHOP_COL);
        sort.activate(SHOP_COL);
        sort.quick_sort();
        let visible = visible_rows(&ds, &FilterState::new(), &sort, &cmp);
        // priority first, shop (with type tie-break) inside each
        // priority, position never consulted here
        assert_eq!(names(&ds, &visible), vec!["F2", "F1", "A1", "G1", "D1"]);
    }

    #[test]
    fn test_reset_restores_filtered_load_order() {
        let ds = dataset(FIXTURE);
        let cmp = RowComparator::new().unwrap();
        let mut filters = FilterState::new();
        filters.toggle(FilterColumn::Type, "シューズ");
        let mut sort = SortState::new();
        sort.quick_sort();
        sort.activate(TYPE_COL);
        sort.reset();
        let visible = visible_rows(&ds, &filters, &sort, &cmp);
        assert_eq!(names(&ds, &visible), vec!["D1", "F2"]);
    }

    #[test]
    fn test_multi_key_keeps_remembered_directions() {
        let ds = dataset(FIXTURE);
        let cmp = RowComparator::new().unwrap();
        let mut sort = SortState::new();
        sort.activate(SHOP_COL);
        sort.activate(SHOP_COL);
        sort.activate(PRIORITY_COL);
        assert_eq!(sort.keys(), &[PRIORITY_COL, SHOP_COL]);

        let visible = visible_rows(&ds, &FilterState::new(), &sort, &cmp);
        // shop stays descending as the secondary key: within priority 1
        // the VSストア tie reverses the type tie-break, within priority
        // 2 スピリット交換所 now precedes クロニクル百貨店
        assert_eq!(names(&ds, &visible), vec!["F1", "F2", "G1", "A1", "D1"]);
    }

    #[test]
    fn test_filter_and_sort_compose() {
        let ds = dataset(FIXTURE);
        let cmp = RowComparator::new().unwrap();
        let mut filters = FilterState::new();
        filters.toggle(FilterColumn::Type, "シューズ");
        let mut sort = SortState::new();
        sort.quick_sort();
        let visible = visible_rows(&ds, &filters, &sort, &cmp);
        assert_eq!(names(&ds, &visible), vec!["F2", "D1"]);
    }
}
