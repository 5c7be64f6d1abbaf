//! The equipment table widget and its view state.
//!
//! `EquipTableState` owns the loaded dataset together with the active
//! filter and sort state, and keeps `visible` as the filtered, ordered
//! list of row indices the widget draws from. Every mutation that can
//! change membership or order goes through [`EquipTableState::apply`].

use color_eyre::Result;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, StatefulWidget, Table, TableState, Widget};

use crate::columns::{self, FilterColumn};
use crate::compare::RowComparator;
use crate::dataset::Dataset;
use crate::filters::FilterState;
use crate::sorting::{Direction, SortState};
use crate::view;
use crate::OpenOptions;

pub struct EquipTableState {
    dataset: Dataset,
    source: String,
    pub filters: FilterState,
    pub sort: SortState,
    comparator: RowComparator,
    /// Indices into the dataset, filtered and ordered for display.
    visible: Vec<usize>,
    pub table_state: TableState,
    /// Offset of the first drawn row within `visible`.
    pub start_row: usize,
    /// Rows that fit in the viewport, set during render.
    pub visible_rows: usize,
    /// Leftmost drawn column, advanced to keep the cursor on screen.
    pub first_col: usize,
    /// Column the sort cursor is on.
    pub cursor_col: usize,
    row_numbers: bool,
    row_start_index: usize,
}

impl EquipTableState {
    pub fn new(dataset: Dataset, source: String, options: &OpenOptions) -> Result<Self> {
        let comparator = RowComparator::new()?;
        let mut state = Self {
            dataset,
            source,
            filters: FilterState::default(),
            sort: SortState::new(),
            comparator,
            visible: Vec::new(),
            table_state: TableState::default(),
            start_row: 0,
            visible_rows: 0,
            first_col: 0,
            cursor_col: 0,
            row_numbers: options.row_numbers,
            row_start_index: options.row_start_index,
        };
        state.apply();
        Ok(state)
    }

    /// Recompute `visible` from the current filter and sort state,
    /// then pull the window and selection back into range.
    pub fn apply(&mut self) {
        self.visible = view::visible_rows(&self.dataset, &self.filters, &self.sort, &self.comparator);
        self.clamp_window();
    }

    fn clamp_window(&mut self) {
        let max_start = self.visible.len().saturating_sub(self.visible_rows.max(1));
        self.start_row = self.start_row.min(max_start);
        if let Some(selected) = self.table_state.selected() {
            let in_window = self.window_len();
            if in_window == 0 {
                self.table_state.select(None);
            } else if selected >= in_window {
                self.table_state.select(Some(in_window - 1));
            }
        }
    }

    /// Rows of `visible` currently in the window.
    fn window_len(&self) -> usize {
        let cap = if self.visible_rows == 0 {
            self.visible.len()
        } else {
            self.visible_rows
        };
        self.visible.len().saturating_sub(self.start_row).min(cap)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn comparator(&self) -> &RowComparator {
        &self.comparator
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Filtered, ordered dataset row indices.
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    pub fn num_rows(&self) -> usize {
        self.dataset.num_rows()
    }

    pub fn num_visible(&self) -> usize {
        self.visible.len()
    }

    /// Dataset row under the selection, if any.
    pub fn selected_row(&self) -> Option<usize> {
        let selected = self.table_state.selected()?;
        self.visible.get(self.start_row + selected).copied()
    }

    pub fn select_next(&mut self) {
        match self.table_state.selected() {
            Some(selected) => {
                if selected + 1 < self.window_len() {
                    self.table_state.select(Some(selected + 1));
                } else if self.start_row + self.window_len() < self.visible.len() {
                    self.start_row += 1;
                }
            }
            None => {
                if !self.visible.is_empty() {
                    self.table_state.select(Some(0));
                }
            }
        }
    }

    pub fn select_previous(&mut self) {
        match self.table_state.selected() {
            Some(0) => {
                if self.start_row > 0 {
                    self.start_row -= 1;
                }
            }
            Some(selected) => self.table_state.select(Some(selected - 1)),
            None => {
                if !self.visible.is_empty() {
                    self.table_state.select(Some(0));
                }
            }
        }
    }

    pub fn page_down(&mut self) {
        let step = self.visible_rows.max(1);
        let max_start = self.visible.len().saturating_sub(step);
        self.start_row = (self.start_row + step).min(max_start);
        self.clamp_window();
    }

    pub fn page_up(&mut self) {
        let step = self.visible_rows.max(1);
        self.start_row = self.start_row.saturating_sub(step);
    }

    pub fn scroll_to_top(&mut self) {
        self.start_row = 0;
        if !self.visible.is_empty() {
            self.table_state.select(Some(0));
        }
    }

    pub fn scroll_to_end(&mut self) {
        self.start_row = self.visible.len().saturating_sub(self.visible_rows.max(1));
        let in_window = self.window_len();
        if in_window > 0 {
            self.table_state.select(Some(in_window - 1));
        }
    }

    pub fn cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
            if self.cursor_col < self.first_col {
                self.first_col = self.cursor_col;
            }
        }
    }

    pub fn cursor_right(&mut self) {
        if self.cursor_col + 1 < self.dataset.num_cols() {
            self.cursor_col += 1;
        }
    }

    /// Header activation on the cursor column.
    pub fn activate_sort(&mut self) {
        self.activate_sort_on(self.cursor_col);
    }

    /// Sort activation addressed by column index, the command form the
    /// app's event handling uses. Columns that are not sort targets
    /// ignore it.
    pub fn activate_sort_on(&mut self, col: usize) {
        if columns::is_sortable(col) {
            self.sort.activate(col);
            self.apply();
        }
    }

    pub fn quick_sort(&mut self) {
        self.sort.quick_sort();
        self.apply();
    }

    /// Drop back to load order. Filters are left alone, they have
    /// their own clear in the filter panel.
    pub fn reset_sort(&mut self) {
        self.sort.reset();
        self.apply();
    }

    pub fn toggle_filter(&mut self, column: FilterColumn, value: &str) {
        self.filters.toggle(column, value);
        self.apply();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.apply();
    }

    pub fn toggle_row_numbers(&mut self) {
        self.row_numbers = !self.row_numbers;
    }

    pub fn row_numbers(&self) -> bool {
        self.row_numbers
    }

    pub fn row_start_index(&self) -> usize {
        self.row_start_index
    }
}

pub struct EquipTable {
    pub header_bg: Color,
    pub header_fg: Color,
    pub row_numbers_fg: Color,
    pub sort_indicator_fg: Color,
    pub table_cell_padding: u16,
}

impl Default for EquipTable {
    fn default() -> Self {
        Self {
            header_bg: Color::Indexed(236),
            header_fg: Color::White,
            row_numbers_fg: Color::DarkGray,
            sort_indicator_fg: Color::Yellow,
            table_cell_padding: 1,
        }
    }
}

impl EquipTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_colors(
        mut self,
        header_bg: Color,
        header_fg: Color,
        row_numbers_fg: Color,
        sort_indicator_fg: Color,
    ) -> Self {
        self.header_bg = header_bg;
        self.header_fg = header_fg;
        self.row_numbers_fg = row_numbers_fg;
        self.sort_indicator_fg = sort_indicator_fg;
        self
    }

    /// Header line for one column: the name, a direction arrow when the
    /// column is a sort key (with its rank when several keys are active),
    /// and an underline on the cursor column.
    fn header_line<'a>(
        &self,
        dataset: &'a Dataset,
        sort: &SortState,
        cursor_col: usize,
        col: usize,
    ) -> Line<'a> {
        let mut name_style = Style::default();
        if col == cursor_col {
            name_style = name_style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
        }
        let mut line = Line::from(Span::styled(dataset.header(col), name_style));
        if let Some(rank) = sort.rank_of(col) {
            let arrow = match sort.direction_of(col) {
                Direction::Ascending => "↑",
                Direction::Descending => "↓",
            };
            let indicator = if sort.keys().len() > 1 {
                format!(" {}{}", arrow, rank + 1)
            } else {
                format!(" {}", arrow)
            };
            line.push_span(Span::styled(
                indicator,
                Style::default().fg(self.sort_indicator_fg),
            ));
        }
        line
    }

    fn render_row_numbers(&self, area: Rect, buf: &mut Buffer, state: &EquipTableState) {
        let header_style = if self.header_bg == Color::Reset {
            Style::default().fg(self.header_fg)
        } else {
            Style::default().bg(self.header_bg).fg(self.header_fg)
        };
        let header_fill = " ".repeat(area.width as usize);
        Paragraph::new(header_fill).style(header_style).render(
            Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: 1,
            },
            buf,
        );

        let rows_to_render = state.window_len();
        if rows_to_render == 0 {
            return;
        }

        let max_row_num = state.start_row + rows_to_render - 1 + state.row_start_index;
        let max_width = max_row_num.to_string().len();

        for row_idx in 0..rows_to_render.min(area.height.saturating_sub(1) as usize) {
            let row_num = state.start_row + row_idx + state.row_start_index;
            let text = format!("{:>width$}", row_num, width = max_width);
            let fg = if state.table_state.selected() == Some(row_idx) {
                Color::Reset
            } else {
                self.row_numbers_fg
            };
            let y = area.y + row_idx as u16 + 1;
            if y < area.y + area.height {
                buf.set_string(area.x, y, text, Style::default().fg(fg));
            }
        }
    }
}

impl StatefulWidget for EquipTable {
    type State = EquipTableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        state.visible_rows = area.height.saturating_sub(1) as usize;
        state.clamp_window();

        let row_num_width = if state.row_numbers {
            let max_row_num =
                state.start_row + state.window_len().saturating_sub(1) + state.row_start_index;
            max_row_num.to_string().len().max(1) as u16 + 1
        } else {
            0
        };

        let table_area = Rect {
            x: area.x + row_num_width,
            y: area.y,
            width: area.width.saturating_sub(row_num_width),
            height: area.height,
        };

        if state.row_numbers {
            self.render_row_numbers(
                Rect {
                    x: area.x,
                    y: area.y,
                    width: row_num_width,
                    height: area.height,
                },
                buf,
                state,
            );
        }

        let num_cols = state.dataset.num_cols();
        if num_cols == 0 {
            return;
        }
        state.first_col = state.first_col.min(state.cursor_col);

        let window_start = state.start_row;
        let window_end = window_start + state.window_len();
        let cursor_col = state.cursor_col;

        let EquipTableState {
            dataset,
            sort,
            visible,
            table_state,
            first_col,
            ..
        } = state;
        let window = &visible[window_start..window_end];

        // Fit columns from `first_col`, sliding the window right until the
        // cursor column is drawn. Widths come from the rendered text so
        // double-width characters measure correctly.
        let mut widths: Vec<u16> = Vec::new();
        loop {
            widths.clear();
            let mut used_width = 0u16;
            let mut last_col = *first_col;
            for col in *first_col..num_cols {
                let mut max_len = self.header_line(dataset, sort, cursor_col, col).width() as u16;
                for &row_idx in window {
                    if let Some(row) = dataset.row(row_idx) {
                        max_len = max_len.max(Line::from(row.cell(col)).width() as u16);
                    }
                }
                if used_width + max_len > table_area.width && !widths.is_empty() {
                    break;
                }
                last_col = col;
                widths.push(max_len.min(table_area.width));
                used_width += max_len + self.table_cell_padding;
            }
            if cursor_col <= last_col || *first_col >= cursor_col {
                break;
            }
            *first_col += 1;
        }

        let shown_cols = *first_col..*first_col + widths.len();

        let header_row_style = if self.header_bg == Color::Reset {
            Style::default().fg(self.header_fg)
        } else {
            Style::default().bg(self.header_bg).fg(self.header_fg)
        };
        let header: Vec<Cell> = shown_cols
            .clone()
            .map(|col| Cell::from(self.header_line(dataset, sort, cursor_col, col)))
            .collect();

        let rows: Vec<Row> = window
            .iter()
            .map(|&row_idx| {
                let cells: Vec<Cell> = shown_cols
                    .clone()
                    .map(|col| {
                        let text = dataset.row(row_idx).map(|row| row.cell(col)).unwrap_or("");
                        Cell::from(Line::from(text))
                    })
                    .collect();
                Row::new(cells)
            })
            .collect();

        let table = Table::new(rows, widths)
            .column_spacing(self.table_cell_padding)
            .header(Row::new(header).style(header_row_style))
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        StatefulWidget::render(table, table_area, buf, table_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{POSITION_COL, PRIORITY_COL, SHOP_COL};

    const FIXTURE: &str = "\
ポジション,種類,優先度,名前,入手先
GK,ペンダント,3,鉄壁のお守り,VSストア
FW,シューズ,1,韋駄天スパイク,クロニクル百貨店
DMF,ミサンガ,2,疾風のミサンガ,スピリット交換所
FW,スペシャル,1,豪炎の腕輪,クロニクル百貨店
AMF,シューズ,5,司令塔のスパイク,VSストア
";

    fn state() -> EquipTableState {
        let dataset =
            Dataset::from_reader(FIXTURE.as_bytes(), &OpenOptions::default()).unwrap();
        EquipTableState::new(dataset, "fixture.csv".to_string(), &OpenOptions::default())
            .unwrap()
    }

    #[test]
    fn test_new_state_shows_load_order() {
        let state = state();
        assert_eq!(state.visible(), &[0, 1, 2, 3, 4]);
        assert_eq!(state.num_visible(), 5);
        assert_eq!(state.num_rows(), 5);
    }

    #[test]
    fn test_selection_slides_window() {
        let mut state = state();
        state.visible_rows = 2;
        state.select_next();
        assert_eq!(state.table_state.selected(), Some(0));
        state.select_next();
        assert_eq!(state.table_state.selected(), Some(1));
        assert_eq!(state.start_row, 0);
        state.select_next();
        assert_eq!(state.table_state.selected(), Some(1));
        assert_eq!(state.start_row, 1);

        state.select_previous();
        assert_eq!(state.table_state.selected(), Some(0));
        state.select_previous();
        assert_eq!(state.start_row, 0);
    }

    #[test]
    fn test_window_stops_at_end() {
        let mut state = state();
        state.visible_rows = 2;
        for _ in 0..20 {
            state.select_next();
        }
        assert_eq!(state.start_row, 3);
        assert_eq!(state.table_state.selected(), Some(1));
        assert_eq!(state.selected_row(), Some(4));
    }

    #[test]
    fn test_paging_clamps() {
        let mut state = state();
        state.visible_rows = 2;
        state.page_down();
        assert_eq!(state.start_row, 2);
        state.page_down();
        state.page_down();
        assert_eq!(state.start_row, 3);
        state.page_up();
        state.page_up();
        assert_eq!(state.start_row, 0);
    }

    #[test]
    fn test_scroll_to_end_selects_last_row() {
        let mut state = state();
        state.visible_rows = 3;
        state.scroll_to_end();
        assert_eq!(state.start_row, 2);
        assert_eq!(state.selected_row(), Some(4));
        state.scroll_to_top();
        assert_eq!(state.start_row, 0);
        assert_eq!(state.selected_row(), Some(0));
    }

    #[test]
    fn test_cursor_stays_in_columns() {
        let mut state = state();
        state.cursor_left();
        assert_eq!(state.cursor_col, 0);
        for _ in 0..10 {
            state.cursor_right();
        }
        assert_eq!(state.cursor_col, 4);
    }

    #[test]
    fn test_cursor_left_pulls_first_col_back() {
        let mut state = state();
        state.cursor_col = 3;
        state.first_col = 2;
        state.cursor_left();
        assert_eq!(state.cursor_col, 2);
        assert_eq!(state.first_col, 2);
        state.cursor_left();
        assert_eq!(state.first_col, 1);
    }

    #[test]
    fn test_activate_sort_on_cursor_column() {
        let mut state = state();
        state.cursor_col = PRIORITY_COL;
        state.activate_sort();
        assert_eq!(state.sort.keys(), &[PRIORITY_COL]);
        // rows 1 and 3 tie on priority and keep load order
        assert_eq!(state.visible(), &[1, 3, 2, 0, 4]);
    }

    #[test]
    fn test_activate_sort_ignores_name_column() {
        let mut state = state();
        state.cursor_col = 3;
        state.activate_sort();
        assert!(!state.sort.is_active());
        assert_eq!(state.visible(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_quick_sort_and_reset() {
        let mut state = state();
        state.cursor_col = SHOP_COL;
        state.activate_sort();
        state.quick_sort();
        assert_eq!(state.sort.keys(), &[PRIORITY_COL, SHOP_COL, POSITION_COL]);
        state.reset_sort();
        assert!(!state.sort.is_active());
        assert_eq!(state.visible(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_filter_narrows_and_clears() {
        let mut state = state();
        state.toggle_filter(FilterColumn::Position, "FW");
        assert_eq!(state.visible(), &[1, 3]);
        state.toggle_filter(FilterColumn::Position, "GK");
        assert_eq!(state.visible(), &[0, 1, 3]);
        state.clear_filters();
        assert_eq!(state.num_visible(), 5);
    }

    #[test]
    fn test_selection_clamped_when_view_shrinks() {
        let mut state = state();
        state.visible_rows = 4;
        for _ in 0..4 {
            state.select_next();
        }
        assert_eq!(state.table_state.selected(), Some(3));
        state.toggle_filter(FilterColumn::Position, "FW");
        assert_eq!(state.table_state.selected(), Some(1));
        assert_eq!(state.selected_row(), Some(3));
    }
}
