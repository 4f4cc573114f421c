use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Paragraph, StatefulWidget, Widget},
};

pub mod cli;
pub mod config;
pub mod error_display;
pub mod plugin;
pub mod rows;
mod source;
pub mod widgets;

pub use cli::Args;
pub use config::{AppConfig, ConfigManager};
pub use plugin::Plugin;
pub use rows::{Column, Row};
pub use source::RowSource;
pub use widgets::datatable::{DataMode, DataTable, DataTableState, SortOrder};

use widgets::controls::Controls;
use widgets::search_input::{SearchInput, SearchInputEvent};

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "tabview";

/// Construction options for a table: where rows come from and how the first
/// page looks. CLI args and the config file both feed this, CLI winning.
#[derive(Clone, Debug)]
pub struct TableOptions {
    pub source: RowSource,
    /// Dotted path to the row list inside the response body.
    pub data_path: Option<String>,
    pub per_page: Option<usize>,
    /// Initial page (1-based); clamped against the acquired row count.
    pub page: Option<usize>,
    pub columns: Vec<Column>,
    pub plugins: Vec<Plugin>,
    pub search: Option<String>,
    pub sort: Option<(String, SortOrder)>,
    pub timeout_secs: u64,
}

impl TableOptions {
    pub fn new(source: RowSource) -> Self {
        Self {
            source,
            data_path: None,
            per_page: None,
            page: None,
            columns: Vec::new(),
            plugins: Vec::new(),
            search: None,
            sort: None,
            timeout_secs: 30,
        }
    }

    pub fn with_data_path(mut self, data_path: impl Into<String>) -> Self {
        self.data_path = Some(data_path.into());
        self
    }

    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_plugins(mut self, plugins: Vec<Plugin>) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Build options from CLI args and config, with CLI args taking precedence.
    pub fn from_args_and_config(args: &cli::Args, config: &AppConfig) -> Self {
        let mut row_source = source::classify_source(&args.source);
        if let RowSource::Remote { headers, .. } = &mut row_source {
            *headers = args.header.iter().filter_map(|h| cli::parse_header(h)).collect();
        }
        let mut opts = TableOptions::new(row_source);
        opts.data_path = args.data_path.clone();
        opts.per_page = Some(args.per_page.unwrap_or(config.display.per_page));
        opts.page = args.page;
        opts.search = args.search.clone();
        opts.timeout_secs = args.timeout;
        opts
    }
}

pub enum AppEvent {
    Key(KeyEvent),
    /// Debounce poll: applies the pending search when its window has elapsed.
    Tick,
    Open(TableOptions),
    /// Perform the blocking acquisition (next loop so "Loading" can render first).
    DoFetch,
    /// Re-acquire rows from the configured source, keeping view state.
    Refresh,
    Search(String),
    Sort(String, SortOrder),
    NextPage,
    PrevPage,
    SetPerPage(usize),
    Resize(u16, u16),
    Exit,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
}

/// Caller-supplied render step: receives the current page after every state
/// mutation, instead of the built-in table rendering.
pub type RenderFn = Box<dyn FnMut(&[Row])>;

pub struct App {
    pub input_mode: InputMode,
    pub table: Option<DataTableState>,
    pub search_input: SearchInput,
    pub busy: bool,
    config: AppConfig,
    options: Option<TableOptions>,
    pending_search: Option<(String, Instant)>,
    debounce: Duration,
    render_fn: Option<RenderFn>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let debounce = Duration::from_millis(config.search.debounce_ms);
        Self {
            input_mode: InputMode::Normal,
            table: None,
            search_input: SearchInput::new(),
            busy: false,
            config,
            options: None,
            pending_search: None,
            debounce,
            render_fn: None,
        }
    }

    /// Dispatch page data to this callback after every mutation instead of
    /// the built-in table rendering.
    pub fn with_render_fn(mut self, render_fn: RenderFn) -> Self {
        self.render_fn = Some(render_fn);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// True when a debounced search is waiting for its window to elapse; the
    /// run loop sends `Tick` while this holds.
    pub fn search_pending(&self) -> bool {
        self.pending_search.is_some()
    }

    /// Handle one event. May return a follow-up event for the run loop to
    /// re-enqueue (the deferred-event pattern: a busy frame draws before the
    /// blocking fetch runs).
    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => {
                let due = matches!(self.pending_search, Some((_, deadline)) if Instant::now() >= deadline);
                if due {
                    let (query, _) = self.pending_search.take()?;
                    Some(AppEvent::Search(query))
                } else {
                    None
                }
            }
            AppEvent::Open(options) => {
                self.options = Some(options.clone());
                self.busy = true;
                Some(AppEvent::DoFetch)
            }
            AppEvent::Refresh => {
                self.busy = true;
                Some(AppEvent::DoFetch)
            }
            AppEvent::DoFetch => {
                self.fetch();
                None
            }
            AppEvent::Search(query) => {
                if let Some(table) = self.table.as_mut() {
                    table.set_search(query.clone());
                }
                self.notify();
                None
            }
            AppEvent::Sort(field, order) => {
                if let Some(table) = self.table.as_mut() {
                    table.sort(field.clone(), *order);
                }
                self.notify();
                None
            }
            AppEvent::NextPage => {
                if let Some(table) = self.table.as_mut() {
                    table.next_page();
                }
                self.notify();
                None
            }
            AppEvent::PrevPage => {
                if let Some(table) = self.table.as_mut() {
                    table.prev_page();
                }
                self.notify();
                None
            }
            AppEvent::SetPerPage(per_page) => {
                if let Some(table) = self.table.as_mut() {
                    table.set_per_page(*per_page);
                }
                self.notify();
                None
            }
            AppEvent::Resize(_, _) => None,
            // The run loop intercepts this before it reaches the app.
            AppEvent::Exit => None,
        }
    }

    /// Blocking acquisition from the configured source. Failures degrade to
    /// an empty table with the error recorded, never to a crash.
    fn fetch(&mut self) {
        let Some(options) = self.options.clone() else {
            self.busy = false;
            return;
        };
        let acquired = source::acquire(
            &options.source,
            options.data_path.as_deref(),
            Duration::from_secs(options.timeout_secs),
        );
        match self.table.as_mut() {
            // Refresh path: keep search/sort/page, re-clamped to the new rows.
            Some(table) => {
                table.set_rows(acquired.rows);
                table.error = acquired.error;
            }
            None => {
                let per_page = options.per_page.unwrap_or(self.config.display.per_page);
                let page = options.page.unwrap_or(1);
                let mut table =
                    DataTableState::new(acquired.rows, options.columns.clone(), per_page, page);
                table.error = acquired.error;
                for plugin in &options.plugins {
                    table.register_plugin(plugin.clone());
                }
                if let Some((field, order)) = &options.sort {
                    table.sort(field.clone(), *order);
                }
                match &options.search {
                    Some(query) if !query.is_empty() => {
                        table.set_search(query.clone());
                        self.search_input.set_value(query.clone());
                    }
                    _ => {}
                }
                self.table = Some(table);
            }
        }
        self.busy = false;
        self.notify();
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        match self.input_mode {
            InputMode::Search => match self.search_input.handle_key(key) {
                SearchInputEvent::Changed => {
                    let deadline = Instant::now() + self.debounce;
                    self.pending_search = Some((self.search_input.value().to_string(), deadline));
                    None
                }
                SearchInputEvent::Submit => {
                    self.pending_search = None;
                    self.leave_search_input();
                    Some(AppEvent::Search(self.search_input.value().to_string()))
                }
                SearchInputEvent::Cancel => {
                    self.pending_search = None;
                    self.leave_search_input();
                    None
                }
                SearchInputEvent::None => None,
            },
            InputMode::Normal => match key.code {
                KeyCode::Char('/') => {
                    self.input_mode = InputMode::Search;
                    self.search_input.set_focused(true);
                    None
                }
                KeyCode::Char('q') => Some(AppEvent::Exit),
                KeyCode::Left | KeyCode::Char('h') => Some(AppEvent::PrevPage),
                KeyCode::Right | KeyCode::Char('l') => Some(AppEvent::NextPage),
                KeyCode::Char('+') | KeyCode::Char('=') => {
                    let table = self.table.as_ref()?;
                    let next = next_per_page(
                        &self.config.display.per_page_options,
                        table.per_page(),
                    );
                    Some(AppEvent::SetPerPage(next))
                }
                KeyCode::Char('s') => self.cycle_sort(),
                KeyCode::Char('o') => {
                    let table = self.table.as_ref()?;
                    let field = table.sort_field()?.to_string();
                    Some(AppEvent::Sort(field, table.sort_order().toggled()))
                }
                KeyCode::Char('r') => Some(AppEvent::Refresh),
                _ => None,
            },
        }
    }

    fn leave_search_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.search_input.set_focused(false);
    }

    /// Cycle the sort field through the sortable columns: none -> first ->
    /// ... -> last -> none again.
    fn cycle_sort(&mut self) -> Option<AppEvent> {
        let table = self.table.as_ref()?;
        let sortable: Vec<String> = table
            .columns()
            .iter()
            .filter(|c| c.sortable != Some(false))
            .map(|c| c.name.clone())
            .collect();
        if sortable.is_empty() {
            return None;
        }
        let next = match table.sort_field() {
            None => Some(sortable[0].clone()),
            Some(current) => {
                let position = sortable.iter().position(|name| name == current);
                match position {
                    Some(i) if i + 1 < sortable.len() => Some(sortable[i + 1].clone()),
                    _ => None,
                }
            }
        };
        match next {
            Some(field) => Some(AppEvent::Sort(field, SortOrder::Ascending)),
            None => {
                if let Some(table) = self.table.as_mut() {
                    table.clear_sort();
                }
                self.notify();
                None
            }
        }
    }

    /// Exactly one render step runs after a mutation: the caller's callback
    /// when one is set, otherwise the built-in widget on the next draw.
    fn notify(&mut self) {
        if let (Some(render_fn), Some(table)) = (self.render_fn.as_mut(), self.table.as_ref()) {
            render_fn(&table.page_rows());
        }
    }
}

fn next_per_page(options: &[usize], current: usize) -> usize {
    if options.is_empty() {
        return current;
    }
    match options.iter().position(|&n| n == current) {
        Some(i) => options[(i + 1) % options.len()],
        None => options[0],
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::new(
            Direction::Vertical,
            [
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
            ],
        )
        .split(area);

        (&self.search_input).render(chunks[0], buf);

        match self.table.as_mut() {
            Some(table) => {
                DataTable::from_theme(&self.config.theme).render(chunks[1], buf, table);
                let controls = Controls::from_theme(&self.config.theme)
                    .with_info(table.showing_info())
                    .with_busy(self.busy);
                (&controls).render(chunks[2], buf);
            }
            None => {
                Paragraph::new("Loading...").centered().render(chunks[1], buf);
                let controls = Controls::from_theme(&self.config.theme).with_busy(self.busy);
                (&controls).render(chunks[2], buf);
            }
        }
    }
}
