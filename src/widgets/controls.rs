use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    prelude::Stylize,
    style::{Color, Style},
    widgets::{Paragraph, Widget},
};

#[derive(Default)]
pub struct Controls {
    pub row_counts: Option<(usize, usize)>,
    pub dimmed: bool,
    pub sort_active: bool,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row_counts(visible: usize, total: usize) -> Self {
        Self {
            row_counts: Some((visible, total)),
            dimmed: false,
            sort_active: false,
        }
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    pub fn with_sort_active(mut self, sort_active: bool) -> Self {
        self.sort_active = sort_active;
        self
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        const CONTROLS: [(&str, &str); 8] = [
            ("s", "Sort"),
            ("S", "Quick"),
            ("R", "Reset"),
            ("f", "Filter"),
            ("i", "Info"),
            ("N", "Numbers"),
            ("?", "Help"),
            ("q", "Quit"),
        ];

        let mut constraints = CONTROLS.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });

        // Add space for row counts if available
        if self.row_counts.is_some() {
            constraints.push(Constraint::Length(20)); // Space for "Rows: 123/456"
        }
        constraints.push(Constraint::Fill(1)); // Fill the remaining space

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);
        let color = Color::DarkGray;

        let base_style = if self.dimmed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        // iterate over the controls and render them
        for (i, (key, action)) in CONTROLS.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.bold())
                .centered()
                .render(layout[j], buf);
            // Make "Sort" label cyan while a sort is active
            let action_style = if *action == "Sort" && self.sort_active {
                base_style.bg(color).fg(Color::Cyan)
            } else {
                base_style.bg(color)
            };
            Paragraph::new(*action)
                .style(action_style)
                .render(layout[j + 1], buf);
        }

        // Render row counts if available
        let mut fill_start_idx = CONTROLS.len() * 2;
        if let Some((visible, total)) = self.row_counts {
            let row_count_text = if visible == total {
                format!("Rows: {}", total)
            } else {
                format!("Rows: {}/{}", visible, total)
            };
            Paragraph::new(row_count_text)
                .style(base_style.bg(color).fg(if self.dimmed {
                    Color::DarkGray
                } else {
                    Color::White
                }))
                .right_aligned()
                .render(layout[fill_start_idx], buf);
            fill_start_idx += 1;
        }

        Paragraph::new("")
            .style(base_style.bg(color))
            .render(layout[fill_start_idx], buf);
    }
}
