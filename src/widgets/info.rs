//! Info panel: where the table came from and what is shaping it.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::Stylize;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use crate::columns::FilterColumn;
use crate::sorting::Direction as SortDirection;
use crate::widgets::table::EquipTableState;

pub struct TableInfo<'a> {
    pub state: &'a EquipTableState,
    pub border_color: Color,
}

impl<'a> TableInfo<'a> {
    pub fn new(state: &'a EquipTableState) -> Self {
        Self {
            state,
            border_color: Color::Cyan,
        }
    }

    pub fn with_border_color(mut self, color: Color) -> Self {
        self.border_color = color;
        self
    }

    /// One line per active sort key, primary first.
    fn sort_lines(&self) -> Vec<String> {
        let sort = &self.state.sort;
        if !sort.is_active() {
            return vec!["(load order)".to_string()];
        }
        sort.keys()
            .iter()
            .enumerate()
            .map(|(rank, &col)| {
                let arrow = match sort.direction_of(col) {
                    SortDirection::Ascending => "↑",
                    SortDirection::Descending => "↓",
                };
                format!("{}. {} {}", rank + 1, self.state.dataset().header(col), arrow)
            })
            .collect()
    }

    /// One line per filter group with selected values, skipping empty
    /// groups entirely.
    fn filter_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = FilterColumn::ALL
            .iter()
            .filter_map(|&column| {
                let set = self.state.filters.selected(column);
                if set.is_empty() {
                    return None;
                }
                let mut values: Vec<&str> = set.iter().map(String::as_str).collect();
                values.sort_unstable();
                Some(format!("{}: {}", column.label(), values.join(", ")))
            })
            .collect();
        if lines.is_empty() {
            lines.push("(none)".to_string());
        }
        lines
    }
}

fn label_value_row(label: &str, value: &str, area: Rect, buf: &mut Buffer, label_w: u16) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(label_w), Constraint::Min(1)])
        .split(area);
    Paragraph::new(label).render(chunks[0], buf);
    Paragraph::new(value).render(chunks[1], buf);
}

fn format_int(n: usize) -> String {
    let s = n.to_string();
    let mut out = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.insert(0, ',');
        }
        out.insert(0, c);
    }
    out
}

impl<'a> Widget for TableInfo<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        const LABEL_WIDTH: u16 = 10;

        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Info")
            .border_style(Style::default().fg(self.border_color));
        let inner = block.inner(area);
        block.render(area, buf);

        let pairs = [
            ("Source:", self.state.source().to_string()),
            (
                "Rows:",
                format!(
                    "{} of {}",
                    format_int(self.state.num_visible()),
                    format_int(self.state.num_rows())
                ),
            ),
            ("Columns:", self.state.dataset().num_cols().to_string()),
        ];

        let mut y = inner.y;
        let bottom = inner.y + inner.height;
        for (label, value) in &pairs {
            if y >= bottom {
                return;
            }
            let row = Rect {
                x: inner.x,
                y,
                width: inner.width,
                height: 1,
            };
            label_value_row(label, value, row, buf, LABEL_WIDTH);
            y += 1;
        }

        let sections = [
            ("Sort keys", self.sort_lines()),
            ("Filters", self.filter_lines()),
        ];
        for (heading, items) in sections {
            y += 1; // blank separator
            if y >= bottom {
                return;
            }
            Paragraph::new(heading).bold().render(
                Rect {
                    x: inner.x,
                    y,
                    width: inner.width,
                    height: 1,
                },
                buf,
            );
            y += 1;
            for item in items {
                if y >= bottom {
                    return;
                }
                Paragraph::new(item).render(
                    Rect {
                        x: inner.x + 2,
                        y,
                        width: inner.width.saturating_sub(2),
                        height: 1,
                    },
                    buf,
                );
                y += 1;
            }
        }
    }
}
