use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::mpsc::Sender;

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, StatefulWidget, Widget};

pub mod columns;
pub mod compare;
pub mod config;
pub mod dataset;
pub mod filters;
pub mod sorting;
pub mod source;
pub mod view;
pub mod widgets;

pub use config::{
    rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, ConfigManager, Theme,
};
pub use soubitui_cli::Args;

use columns::FilterColumn;
use dataset::Dataset;
use widgets::controls::Controls;
use widgets::debug::DebugState;
use widgets::filter_panel::{FilterPanel, FilterPanelState};
use widgets::info::TableInfo;
use widgets::table::{EquipTable, EquipTableState};

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "soubitui";

/// The published soubi_clean.csv dataset, fetched when neither the
/// command line nor the config names a source.
pub const DEFAULT_SOURCE: &str =
    "https://raw.githubusercontent.com/tempolin/IEtool/refs/heads/main/CSV/soubi_clean.csv";

/// Pick the CSV source: CLI argument, then `[data] source` from the
/// config, then the published dataset.
pub fn resolve_source(cli_source: Option<&str>, config: &AppConfig) -> String {
    cli_source
        .map(str::to_string)
        .or_else(|| config.data.source.clone())
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string())
}

#[derive(Clone, Debug)]
pub struct OpenOptions {
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
    pub row_numbers: bool,
    pub row_start_index: usize,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: None,
            row_numbers: false,
            row_start_index: 1,
        }
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = Some(has_header);
        self
    }

    /// Create OpenOptions from CLI args and config, with CLI args taking precedence
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Self {
        let mut opts = OpenOptions::new();

        opts.delimiter = args.delimiter.or(config.file_loading.delimiter);

        // The --no-header flag overrides whatever the config says
        opts.has_header = if args.no_header {
            Some(false)
        } else {
            config.file_loading.has_header
        };

        opts.row_numbers = args.row_numbers || config.display.row_numbers;
        opts.row_start_index = args
            .row_start_index
            .unwrap_or(config.display.row_start_index);

        opts
    }
}

impl From<&Args> for OpenOptions {
    fn from(args: &Args) -> Self {
        // Use default config if creating from args alone
        let config = AppConfig::default();
        Self::from_args_and_config(args, &config)
    }
}

pub enum AppEvent {
    Key(KeyEvent),
    Open(String, OpenOptions),
    DoLoad(String, OpenOptions), // Internal event to actually perform loading after UI update
    ToggleFilter(FilterColumn, String),
    ActivateSort(usize),
    QuickSort,
    ResetSort,
    ClearFilters,
    Exit,
    Crash(String),
    Resize(u16, u16), // resized (width, height)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Filtering,
}

#[derive(Clone, Debug, Default)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading {
        source: String,
        current_phase: String, // e.g. "Opening source", "Parsing CSV"
        progress_percent: u16, // 0-100
    },
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading { .. })
    }

    fn phase(source: &str, current_phase: &str, progress_percent: u16) -> Self {
        LoadingState::Loading {
            source: source.to_string(),
            current_phase: current_phase.to_string(),
            progress_percent,
        }
    }
}

pub struct App {
    pub table: Option<EquipTableState>,
    events: Sender<AppEvent>,
    pub input_mode: InputMode,
    pub filter_panel: FilterPanelState,
    debug: DebugState,
    info_visible: bool,
    show_help: bool,
    help_scroll: usize,
    loading_state: LoadingState,
    theme: Theme,
}

impl App {
    pub fn new(events: Sender<AppEvent>) -> App {
        let theme = Theme::from_config(&AppConfig::default().theme).unwrap_or_else(|e| {
            eprintln!(
                "Warning: Failed to create default theme: {}. Using fallback.",
                e
            );
            Theme {
                colors: std::collections::HashMap::new(),
            }
        });

        Self::new_with_config(events, theme, AppConfig::default())
    }

    pub fn new_with_config(events: Sender<AppEvent>, theme: Theme, app_config: AppConfig) -> App {
        App {
            table: None,
            events,
            input_mode: InputMode::Normal,
            filter_panel: FilterPanelState::new(),
            debug: DebugState {
                enabled: app_config.debug.enabled,
                ..DebugState::default()
            },
            info_visible: false,
            show_help: false,
            help_scroll: 0,
            loading_state: LoadingState::Idle,
            theme,
        }
    }

    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    /// Get a color from the theme by name
    fn color(&self, name: &str) -> Color {
        self.theme.get(name)
    }

    /// Resolve the source, read the CSV, and build the table state.
    /// Loading phases are recorded so the gauge reflects progress on
    /// the next frame.
    fn load(&mut self, source: &str, options: &OpenOptions) -> Result<()> {
        self.loading_state = LoadingState::phase(source, "Opening source", 30);
        let path = source::fetch(source)?;

        self.loading_state = LoadingState::phase(source, "Parsing CSV", 60);
        let dataset = Dataset::from_path(&path, options)?;

        self.loading_state = LoadingState::phase(source, "Rendering data", 90);
        let table = EquipTableState::new(dataset, source.to_string(), options)?;

        self.loading_state = LoadingState::Idle;
        self.table = Some(table);
        self.filter_panel = FilterPanelState::new();
        self.input_mode = InputMode::Normal;
        Ok(())
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(source, options) => {
                // Set loading state first, then trigger a render before actually loading
                self.loading_state = LoadingState::phase(source, "Opening source", 10);
                Some(AppEvent::DoLoad(source.clone(), options.clone()))
            }
            AppEvent::DoLoad(source, options) => match self.load(source, options) {
                Ok(()) => {
                    self.debug.last_action = "load".to_string();
                    None
                }
                Err(e) => {
                    self.loading_state = LoadingState::Idle;
                    Some(AppEvent::Crash(e.to_string()))
                }
            },
            AppEvent::ToggleFilter(column, value) => {
                if let Some(state) = &mut self.table {
                    state.toggle_filter(*column, value);
                }
                self.debug.last_action = "toggle_filter".to_string();
                None
            }
            AppEvent::ActivateSort(col) => {
                if let Some(state) = &mut self.table {
                    state.activate_sort_on(*col);
                }
                self.debug.last_action = "activate_sort".to_string();
                None
            }
            AppEvent::QuickSort => {
                if let Some(state) = &mut self.table {
                    state.quick_sort();
                }
                self.debug.last_action = "quick_sort".to_string();
                None
            }
            AppEvent::ResetSort => {
                if let Some(state) = &mut self.table {
                    state.reset_sort();
                }
                self.debug.last_action = "reset_sort".to_string();
                None
            }
            AppEvent::ClearFilters => {
                if let Some(state) = &mut self.table {
                    state.clear_filters();
                }
                self.debug.last_action = "clear_filters".to_string();
                None
            }
            // The table widget re-measures itself on every frame
            AppEvent::Resize(_cols, _rows) => None,
            _ => None,
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        self.debug.on_key(event);

        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppEvent::Exit);
        }

        if self.show_help {
            match event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                    self.help_scroll = 0;
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.help_scroll = self.help_scroll.saturating_add(1);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.help_scroll = self.help_scroll.saturating_sub(1);
                }
                KeyCode::PageDown => {
                    self.help_scroll = self.help_scroll.saturating_add(10);
                }
                KeyCode::PageUp => {
                    self.help_scroll = self.help_scroll.saturating_sub(10);
                }
                KeyCode::Home => {
                    self.help_scroll = 0;
                }
                _ => {}
            }
            return None;
        }

        if event.code == KeyCode::Char('?') {
            self.show_help = true;
            return None;
        }

        if self.input_mode == InputMode::Filtering {
            match event.code {
                KeyCode::Esc | KeyCode::Char('f') => {
                    self.filter_panel.close();
                    self.input_mode = InputMode::Normal;
                }
                KeyCode::Tab => self.filter_panel.next_group(),
                KeyCode::BackTab => self.filter_panel.prev_group(),
                KeyCode::Down | KeyCode::Char('j') => self.filter_panel.select_next(),
                KeyCode::Up | KeyCode::Char('k') => self.filter_panel.select_previous(),
                KeyCode::Char(' ') | KeyCode::Enter => {
                    if let Some((column, value)) = self.filter_panel.current() {
                        return Some(AppEvent::ToggleFilter(column, value.to_string()));
                    }
                }
                KeyCode::Char('c') => return Some(AppEvent::ClearFilters),
                _ => {}
            }
            return None;
        }

        match event.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Esc => {
                if self.info_visible {
                    self.info_visible = false;
                } else {
                    return Some(AppEvent::Exit);
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(state) = &mut self.table {
                    state.select_next();
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(state) = &mut self.table {
                    state.select_previous();
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if let Some(state) = &mut self.table {
                    state.cursor_left();
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if let Some(state) = &mut self.table {
                    state.cursor_right();
                }
            }
            KeyCode::PageDown => {
                if let Some(state) = &mut self.table {
                    state.page_down();
                }
            }
            KeyCode::PageUp => {
                if let Some(state) = &mut self.table {
                    state.page_up();
                }
            }
            KeyCode::Home => {
                if let Some(state) = &mut self.table {
                    state.scroll_to_top();
                }
            }
            KeyCode::End => {
                if let Some(state) = &mut self.table {
                    state.scroll_to_end();
                }
            }
            KeyCode::Char('s') | KeyCode::Enter => {
                if let Some(state) = &self.table {
                    return Some(AppEvent::ActivateSort(state.cursor_col));
                }
            }
            KeyCode::Char('S') => return Some(AppEvent::QuickSort),
            KeyCode::Char('R') => return Some(AppEvent::ResetSort),
            KeyCode::Char('f') => {
                if let Some(state) = &self.table {
                    self.filter_panel.open(state);
                    self.input_mode = InputMode::Filtering;
                }
            }
            KeyCode::Char('i') => self.info_visible = !self.info_visible,
            KeyCode::Char('N') => {
                if let Some(state) = &mut self.table {
                    state.toggle_row_numbers();
                }
            }
            _ => {}
        }
        None
    }

    fn render_loading_gauge(loading_state: &LoadingState, area: Rect, buf: &mut Buffer) {
        if let LoadingState::Loading {
            source,
            current_phase,
            progress_percent,
        } = loading_state
        {
            // Center the gauge in the area
            let gauge_width = (area.width as f64 * 0.5) as u16;
            let gauge_height = 5u16;

            let center_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Fill(1),
                    Constraint::Length(gauge_height),
                    Constraint::Fill(1),
                ])
                .split(area);

            let gauge_area_layout = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Fill(1),
                    Constraint::Length(gauge_width),
                    Constraint::Fill(1),
                ])
                .split(center_layout[1]);

            let gauge = Gauge::default()
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!("Loading {}", source)),
                )
                .percent(*progress_percent)
                .label(current_phase.clone());

            gauge.render(gauge_area_layout[1], buf);
        }
    }

    fn render_help(&self, area: Rect, buf: &mut Buffer) {
        const HELP_TEXT: &str = "\
Navigation:
  Up/Down (k/j):    Move the row selection
  Left/Right (h/l): Move the column cursor
  PgUp/PgDn:        Scroll pages
  Home/End:         Jump to top/bottom

Sorting:
  s / Enter:        Sort by the cursor column; again to reverse.
                    Earlier sort columns stay as tie-breaks.
  S:                Quick sort (Priority, then Shop, then Position)
  R:                Reset sort (back to load order)

Filter panel (f):
  Tab/Shift+Tab:    Switch value group
  Up/Down (k/j):    Move inside the group
  Space / Enter:    Toggle the highlighted value
  c:                Clear every selected value
  Esc / f:          Close the panel

Display:
  i:                Toggle the info panel
  N:                Toggle row numbers
  ?:                Toggle this help

Exit:
  q / Esc / Ctrl+C: Quit";

        let height = (HELP_TEXT.lines().count() as u16 + 2).min(area.height);
        let width = 60u16.min(area.width);
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(height),
                Constraint::Fill(1),
            ])
            .split(area);
        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(width),
                Constraint::Fill(1),
            ])
            .split(vertical[1]);
        let modal = horizontal[1];

        Clear.render(modal, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Help (Esc to close)")
            .border_style(Style::default().fg(self.color("panel_border")));
        let inner = block.inner(modal);
        block.render(modal, buf);

        Paragraph::new(HELP_TEXT)
            .scroll((self.help_scroll as u16, 0))
            .render(inner, buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        let background_color = self.color("background");
        Block::default()
            .style(Style::default().bg(background_color))
            .render(area, buf);

        let mut constraints = vec![Constraint::Fill(1), Constraint::Length(1)];
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let main_area = layout[0];
        let mut data_area = main_area;
        let mut panel_area = Rect::default();

        if self.input_mode == InputMode::Filtering {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(0), Constraint::Length(36)])
                .split(main_area);
            data_area = chunks[0];
            panel_area = chunks[1];
        }

        // Extract colors before mutable borrow to avoid borrow checker issues
        let table_header_bg_color = self.color("table_header_bg");
        let table_header_color = self.color("table_header");
        let dimmed_color = self.color("dimmed");
        let sort_indicator_color = self.color("sort_indicator");
        let panel_border_color = self.color("panel_border");
        let panel_border_active_color = self.color("panel_border_active");

        match &mut self.table {
            Some(state) => {
                let mut table_area = data_area;
                let mut info_area = Rect::default();
                if self.info_visible {
                    let info_layout = Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints([Constraint::Fill(1), Constraint::Max(44)])
                        .split(data_area);
                    table_area = info_layout[0];
                    info_area = info_layout[1];
                }

                EquipTable::new()
                    .with_colors(
                        table_header_bg_color,
                        table_header_color,
                        dimmed_color,
                        sort_indicator_color,
                    )
                    .render(table_area, buf, state);

                if self.info_visible {
                    TableInfo::new(state)
                        .with_border_color(panel_border_color)
                        .render(info_area, buf);
                }
            }
            None => {
                if self.loading_state.is_loading() {
                    App::render_loading_gauge(&self.loading_state, main_area, buf);
                } else {
                    Paragraph::new("No data loaded").render(main_area, buf);
                }
            }
        }

        if self.input_mode == InputMode::Filtering {
            if let Some(state) = &self.table {
                FilterPanel::new(&state.filters)
                    .with_colors(panel_border_color, panel_border_active_color)
                    .render(panel_area, buf, &mut self.filter_panel);
            }
        }

        let mut controls = Controls::new().with_dimmed(self.input_mode != InputMode::Normal);
        if let Some(state) = &self.table {
            controls = Controls::with_row_counts(state.num_visible(), state.num_rows())
                .with_dimmed(self.input_mode != InputMode::Normal)
                .with_sort_active(state.sort.is_active());
        }
        controls.render(layout[1], buf);

        if self.debug.enabled {
            self.debug.render(layout[layout.len() - 1], buf);
        }

        if self.show_help {
            self.render_help(area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::sync::mpsc::channel;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app() -> App {
        let (tx, _rx) = channel();
        App::new(tx)
    }

    fn app_with_table() -> App {
        let mut app = app();
        let dataset = Dataset::from_reader(
            "ポジション,種類,優先度,名前,入手先\nFW,シューズ,1,a,VSストア\n".as_bytes(),
            &OpenOptions::default(),
        )
        .unwrap();
        app.table = Some(
            EquipTableState::new(dataset, "test.csv".to_string(), &OpenOptions::default())
                .unwrap(),
        );
        app
    }

    #[test]
    fn test_resolve_source_precedence() {
        let mut config = AppConfig::default();
        assert_eq!(resolve_source(None, &config), DEFAULT_SOURCE);

        config.data.source = Some("from_config.csv".to_string());
        assert_eq!(resolve_source(None, &config), "from_config.csv");
        assert_eq!(
            resolve_source(Some("from_cli.csv"), &config),
            "from_cli.csv"
        );
    }

    #[test]
    fn test_open_options_cli_overrides_config() {
        let mut config = AppConfig::default();
        config.file_loading.delimiter = Some(b'\t');
        config.file_loading.has_header = Some(true);
        config.display.row_numbers = true;
        config.display.row_start_index = 0;

        let args = Args::parse_from(["soubitui", "--delimiter", "59", "--no-header"]);
        let opts = OpenOptions::from_args_and_config(&args, &config);
        assert_eq!(opts.delimiter, Some(b';'));
        assert_eq!(opts.has_header, Some(false));
        assert!(opts.row_numbers);
        assert_eq!(opts.row_start_index, 0);

        let args = Args::parse_from(["soubitui"]);
        let opts = OpenOptions::from_args_and_config(&args, &config);
        assert_eq!(opts.delimiter, Some(b'\t'));
        assert_eq!(opts.has_header, Some(true));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert!(matches!(
            app.event(&key(KeyCode::Char('q'))),
            Some(AppEvent::Exit)
        ));
        assert!(matches!(
            app.event(&AppEvent::Key(KeyEvent::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL
            ))),
            Some(AppEvent::Exit)
        ));
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let mut app = app();
        app.event(&key(KeyCode::Char('?')));
        assert!(app.show_help);
        // 'q' closes the overlay instead of quitting
        assert!(app.event(&key(KeyCode::Char('q'))).is_none());
        assert!(!app.show_help);
    }

    #[test]
    fn test_sort_keys_emit_commands() {
        let mut app = app_with_table();
        app.table.as_mut().unwrap().cursor_col = columns::SHOP_COL;

        match app.event(&key(KeyCode::Char('s'))) {
            Some(AppEvent::ActivateSort(col)) => assert_eq!(col, columns::SHOP_COL),
            _ => panic!("expected ActivateSort"),
        }
        assert!(matches!(
            app.event(&key(KeyCode::Char('S'))),
            Some(AppEvent::QuickSort)
        ));
        assert!(matches!(
            app.event(&key(KeyCode::Char('R'))),
            Some(AppEvent::ResetSort)
        ));
    }

    #[test]
    fn test_sort_commands_mutate_table() {
        let mut app = app_with_table();
        app.event(&AppEvent::ActivateSort(columns::SHOP_COL));
        assert_eq!(
            app.table.as_ref().unwrap().sort.keys(),
            &[columns::SHOP_COL]
        );
        app.event(&AppEvent::QuickSort);
        assert_eq!(
            app.table.as_ref().unwrap().sort.keys(),
            &[
                columns::PRIORITY_COL,
                columns::SHOP_COL,
                columns::POSITION_COL
            ]
        );
        app.event(&AppEvent::ResetSort);
        assert!(!app.table.as_ref().unwrap().sort.is_active());
    }

    #[test]
    fn test_filter_panel_mode() {
        let mut app = app_with_table();
        app.event(&key(KeyCode::Char('f')));
        assert_eq!(app.input_mode, InputMode::Filtering);
        assert!(app.filter_panel.active);

        // Space toggles the value under the cursor
        match app.event(&key(KeyCode::Char(' '))) {
            Some(AppEvent::ToggleFilter(column, value)) => {
                assert_eq!(column, FilterColumn::Position);
                app.event(&AppEvent::ToggleFilter(column, value));
            }
            _ => panic!("expected ToggleFilter"),
        }
        assert!(!app.table.as_ref().unwrap().filters.is_empty());

        assert!(matches!(
            app.event(&key(KeyCode::Char('c'))),
            Some(AppEvent::ClearFilters)
        ));

        app.event(&key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_open_stages_loading() {
        let mut app = app();
        let event = AppEvent::Open("missing.csv".to_string(), OpenOptions::default());
        let next = app.event(&event);
        assert!(app.loading_state.is_loading());
        match next {
            Some(AppEvent::DoLoad(source, _)) => assert_eq!(source, "missing.csv"),
            _ => panic!("expected DoLoad"),
        }
    }

    #[test]
    fn test_failed_load_crashes() {
        let mut app = app();
        let event = AppEvent::DoLoad("does/not/exist.csv".to_string(), OpenOptions::default());
        assert!(matches!(app.event(&event), Some(AppEvent::Crash(_))));
        assert!(!app.loading_state.is_loading());
        assert!(app.table.is_none());
    }
}
