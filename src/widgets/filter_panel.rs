//! Right-side filter panel: one value group per filterable column,
//! toggled with Space. The panel owns its candidate lists so the group
//! contents stay put while filters narrow the table.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Block, Borders, Clear, List, ListItem, ListState, Paragraph, StatefulWidget, Widget,
};

use crate::columns::FilterColumn;
use crate::filters::FilterState;
use crate::widgets::table::EquipTableState;

#[derive(Default)]
pub struct FilterPanelState {
    pub active: bool,
    /// Index into [`FilterColumn::ALL`].
    pub group: usize,
    pub list_state: ListState,
    candidates: Vec<Vec<String>>,
}

impl FilterPanelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the candidate lists from the loaded table and show the
    /// panel. Position and Type lead with the game's fixed value lists
    /// and append anything else the file contains; Priority is whatever
    /// the file contains. Observed values are listed in comparison
    /// order.
    pub fn open(&mut self, table: &EquipTableState) {
        self.candidates = FilterColumn::ALL
            .iter()
            .map(|&column| {
                let mut values: Vec<String> = column
                    .known_values()
                    .iter()
                    .map(|v| v.to_string())
                    .collect();
                let mut observed = table.dataset().distinct_values(column.index());
                observed.sort_by(|a, b| table.comparator().compare_cells(a, b));
                for value in observed {
                    if !values.contains(&value) {
                        values.push(value);
                    }
                }
                values
            })
            .collect();
        self.active = true;
        self.group = 0;
        self.list_state.select(Some(0));
    }

    pub fn close(&mut self) {
        self.active = false;
    }

    pub fn next_group(&mut self) {
        self.group = (self.group + 1) % FilterColumn::ALL.len();
        self.list_state.select(Some(0));
    }

    pub fn prev_group(&mut self) {
        self.group = (self.group + FilterColumn::ALL.len() - 1) % FilterColumn::ALL.len();
        self.list_state.select(Some(0));
    }

    pub fn select_next(&mut self) {
        let len = self.group_len();
        if len == 0 {
            return;
        }
        let next = match self.list_state.selected() {
            Some(selected) => (selected + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        let previous = match self.list_state.selected() {
            Some(selected) => selected.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(previous));
    }

    /// The value under the cursor, with its column.
    pub fn current(&self) -> Option<(FilterColumn, &str)> {
        let column = FilterColumn::ALL[self.group];
        let value = self
            .candidates
            .get(self.group)?
            .get(self.list_state.selected()?)?;
        Some((column, value.as_str()))
    }

    pub fn candidates(&self, group: usize) -> &[String] {
        self.candidates.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    fn group_len(&self) -> usize {
        self.candidates.get(self.group).map(Vec::len).unwrap_or(0)
    }
}

pub struct FilterPanel<'a> {
    filters: &'a FilterState,
    pub border_fg: Color,
    pub active_border_fg: Color,
}

impl<'a> FilterPanel<'a> {
    pub fn new(filters: &'a FilterState) -> Self {
        Self {
            filters,
            border_fg: Color::Cyan,
            active_border_fg: Color::Yellow,
        }
    }

    pub fn with_colors(mut self, border_fg: Color, active_border_fg: Color) -> Self {
        self.border_fg = border_fg;
        self.active_border_fg = active_border_fg;
        self
    }
}

impl StatefulWidget for FilterPanel<'_> {
    type State = FilterPanelState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Filter")
            .border_style(Style::default().fg(self.border_fg));
        let inner_area = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Length(1),
            ])
            .split(inner_area);

        for (group, column) in FilterColumn::ALL.into_iter().enumerate() {
            let selected_count = self.filters.selected(column).len();
            let title = if selected_count > 0 {
                format!("{} ({})", column.label(), selected_count)
            } else {
                column.label().to_string()
            };
            let border_style = if group == state.group {
                Style::default().fg(self.active_border_fg)
            } else {
                Style::default()
            };

            let items: Vec<ListItem> = state
                .candidates(group)
                .iter()
                .map(|value| {
                    let marker = if self.filters.is_selected(column, value) {
                        "[x]"
                    } else {
                        "[ ]"
                    };
                    ListItem::new(format!("{} {}", marker, value))
                })
                .collect();
            let list = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(title)
                        .border_style(border_style),
                )
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

            if group == state.group {
                StatefulWidget::render(list, chunks[group], buf, &mut state.list_state);
            } else {
                Widget::render(list, chunks[group], buf);
            }
        }

        Paragraph::new("Space Toggle  Tab Group  c Clear  Esc Close")
            .style(Style::default().fg(Color::DarkGray))
            .render(chunks[3], buf);
    }
}
