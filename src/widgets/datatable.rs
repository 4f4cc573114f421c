use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{
        Block, Borders, Cell, Padding, Paragraph, Row as TableRow, StatefulWidget, Table,
        TableState, Widget, Wrap,
    },
};

use crate::config::ThemeConfig;
use crate::plugin::{Plugin, PluginSet};
use crate::rows::{compare_rows, derive_columns, Column, Row};

/// Whether the table shows a page slice of all rows or of the rows matching
/// the active search query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DataMode {
    #[default]
    Paginated,
    Filtered,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// State for the paged table: the rows, the page cursor, the active search
/// query and sort, and the registered plugins. All mutations keep the current
/// page inside `1..=total_pages`.
pub struct DataTableState {
    rows: Vec<Row>,
    columns: Vec<Column>,
    /// True when the columns came from construction options rather than being
    /// derived from the first row; derived columns refresh on every set_rows.
    columns_fixed: bool,
    per_page: usize,
    current_page: usize,
    search_query: String,
    data_mode: DataMode,
    sort_field: Option<String>,
    sort_order: SortOrder,
    plugins: PluginSet,
    pub table_state: TableState,
    /// Non-fatal acquisition error shown in place of the table body.
    pub error: Option<String>,
}

impl DataTableState {
    pub fn new(rows: Vec<Row>, columns: Vec<Column>, per_page: usize, page: usize) -> Self {
        let columns_fixed = !columns.is_empty();
        let columns = if columns_fixed {
            columns
        } else {
            derive_columns(&rows)
        };
        let mut state = Self {
            rows,
            columns,
            columns_fixed,
            per_page: per_page.max(1),
            current_page: page.max(1),
            search_query: String::new(),
            data_mode: DataMode::Paginated,
            sort_field: None,
            sort_order: SortOrder::Ascending,
            plugins: PluginSet::default(),
            table_state: TableState::default(),
            error: None,
        };
        state.clamp_page();
        state
    }

    /// Replace the underlying rows (refetch or proxy-style data swap) and
    /// re-clamp the page so it never points outside the new row count.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        if !self.columns_fixed {
            self.columns = derive_columns(&self.rows);
        }
        self.clamp_page();
    }

    pub fn register_plugin(&mut self, plugin: Plugin) {
        self.plugins.register(plugin);
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn data_mode(&self) -> DataMode {
        self.data_mode
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn sort_field(&self) -> Option<&str> {
        self.sort_field.as_deref()
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Set the search query. A non-empty query switches to filtered mode and
    /// an empty one reverts to paginated mode; either way the page resets to 1.
    pub fn set_search(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query.is_empty() {
            self.data_mode = DataMode::Paginated;
            self.search_query.clear();
        } else {
            self.data_mode = DataMode::Filtered;
            self.search_query = query;
        }
        self.current_page = 1;
    }

    /// Select the sort field and direction.
    pub fn sort(&mut self, field: impl Into<String>, order: SortOrder) {
        self.sort_field = Some(field.into());
        self.sort_order = order;
    }

    pub fn clear_sort(&mut self) {
        self.sort_field = None;
        self.sort_order = SortOrder::Ascending;
    }

    /// Change the page size and reset to the first page. Zero is ignored.
    pub fn set_per_page(&mut self, per_page: usize) {
        if per_page == 0 {
            return;
        }
        self.per_page = per_page;
        self.current_page = 1;
    }

    /// Advance one page. A no-op on the last page.
    pub fn next_page(&mut self) -> bool {
        if self.current_page < self.total_pages() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page. A no-op on the first page.
    pub fn prev_page(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_items().div_ceil(self.per_page)
    }

    /// Rows visible under the current data mode, before paging.
    pub fn total_items(&self) -> usize {
        match self.data_mode {
            DataMode::Paginated => self.rows.len(),
            DataMode::Filtered => self.filtered().len(),
        }
    }

    /// All rows, ignoring the filter.
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    /// Human-readable summary of the visible slice, e.g.
    /// "Showing 1 to 10 of 25 items." In filtered mode the unfiltered total
    /// is appended: "... (filtered from 100 total items)."
    pub fn showing_info(&self) -> String {
        let total = self.total_items();
        let (start, end) = if total == 0 {
            (0, 0)
        } else {
            let start = (self.current_page - 1) * self.per_page + 1;
            let end = (start + self.per_page - 1).min(total);
            (start, end)
        };
        match self.data_mode {
            DataMode::Filtered => format!(
                "Showing {} to {} of {} items (filtered from {} total items).",
                start,
                end,
                total,
                self.rows.len()
            ),
            DataMode::Paginated => {
                format!("Showing {} to {} of {} items.", start, end, total)
            }
        }
    }

    fn filtered(&self) -> Vec<&Row> {
        let query = self.search_query.to_lowercase();
        self.rows.iter().filter(|row| row.matches(&query)).collect()
    }

    /// Rows of the current page: filter, stable sort, then the half-open
    /// slice `[(page-1)*per_page, page*per_page)`.
    fn visible(&self) -> Vec<&Row> {
        let mut rows: Vec<&Row> = match self.data_mode {
            DataMode::Paginated => self.rows.iter().collect(),
            DataMode::Filtered => self.filtered(),
        };
        if let Some(field) = &self.sort_field {
            rows.sort_by(|a, b| {
                let ordering = compare_rows(a, b, field, &self.columns);
                match self.sort_order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }
        let start = (self.current_page - 1) * self.per_page;
        let end = (start + self.per_page).min(rows.len());
        if start >= rows.len() {
            Vec::new()
        } else {
            rows[start..end].to_vec()
        }
    }

    /// The current page, cloned for render callbacks.
    pub fn page_rows(&self) -> Vec<Row> {
        self.visible().into_iter().cloned().collect()
    }

    /// Column labels for the header row.
    pub fn header_labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label.clone()).collect()
    }

    /// Display grid for the current page with plugins applied per cell.
    pub fn page_display(&self) -> Vec<Vec<String>> {
        let width = self.columns.len();
        self.visible()
            .into_iter()
            .map(|row| {
                (0..width.max(row.len()))
                    .map(|i| {
                        let text = row.display(i).into_owned();
                        if self.plugins.is_empty() {
                            text
                        } else {
                            self.plugins.apply(&row.field_key(i), text)
                        }
                    })
                    .collect()
            })
            .collect()
    }

    fn clamp_page(&mut self) {
        let total = self.total_pages();
        self.current_page = self.current_page.clamp(1, total.max(1));
    }
}

/// The built-in table rendering: header and body are rebuilt from the current
/// page on every draw.
pub struct DataTable {
    header_bg: Color,
    header_fg: Color,
    alternate_row_bg: Option<Color>,
    table_cell_padding: u16,
}

impl Default for DataTable {
    fn default() -> Self {
        Self {
            header_bg: Color::Indexed(236),
            header_fg: Color::White,
            alternate_row_bg: None,
            table_cell_padding: 1,
        }
    }
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header_colors(mut self, bg: Color, fg: Color) -> Self {
        self.header_bg = bg;
        self.header_fg = fg;
        self
    }

    pub fn with_alternate_row_bg(mut self, bg: Option<Color>) -> Self {
        self.alternate_row_bg = bg;
        self
    }

    pub fn from_theme(theme: &ThemeConfig) -> Self {
        Self::new()
            .with_header_colors(theme.header_bg(), theme.header_fg())
            .with_alternate_row_bg(theme.alternate_row_bg())
    }

    /// Column widths that fit header and page content, dropping columns past
    /// the available area. An explicit column width wins over content width.
    fn fit_widths(&self, columns: &[Column], grid: &[Vec<String>], area_width: u16) -> Vec<u16> {
        let mut widths = Vec::with_capacity(columns.len());
        let mut used: u16 = 0;
        for (i, column) in columns.iter().enumerate() {
            let content = grid
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count() as u16)
                .max()
                .unwrap_or(0);
            let width = column
                .width
                .unwrap_or_else(|| content.max(column.label.chars().count() as u16));
            // Use > not >= so the last column is shown when it fits exactly
            if !widths.is_empty() && used + width > area_width {
                break;
            }
            widths.push(width.min(area_width.saturating_sub(used)));
            used += width + self.table_cell_padding;
        }
        widths
    }
}

impl StatefulWidget for DataTable {
    type State = DataTableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if let Some(error) = state.error.as_ref() {
            Paragraph::new(format!("Error: {}", error))
                .centered()
                .block(
                    Block::default()
                        .borders(Borders::NONE)
                        .padding(Padding::top(area.height / 2)),
                )
                .wrap(Wrap { trim: true })
                .render(area, buf);
            return;
        }

        let grid = state.page_display();
        if grid.is_empty() {
            let message = match state.data_mode() {
                DataMode::Filtered => "No data was found!",
                DataMode::Paginated => "No data available!",
            };
            Paragraph::new(message)
                .centered()
                .block(
                    Block::default()
                        .borders(Borders::NONE)
                        .padding(Padding::top(area.height / 2)),
                )
                .render(area, buf);
            return;
        }

        let widths = self.fit_widths(state.columns(), &grid, area.width);
        let visible_columns = widths.len();

        let header_style = if self.header_bg == Color::Reset {
            Style::default().fg(self.header_fg)
        } else {
            Style::default().bg(self.header_bg).fg(self.header_fg)
        };
        let header: Vec<Cell> = state
            .header_labels()
            .into_iter()
            .take(visible_columns)
            .map(Cell::from)
            .collect();

        let rows: Vec<TableRow> = grid
            .into_iter()
            .enumerate()
            .map(|(row_index, mut cells)| {
                cells.truncate(visible_columns);
                let row_style = if row_index % 2 == 1 {
                    self.alternate_row_bg
                        .map(|c| Style::default().bg(c))
                        .unwrap_or_default()
                } else {
                    Style::default()
                };
                TableRow::new(cells.into_iter().map(|c| Cell::from(Line::from(c)))).style(row_style)
            })
            .collect();

        StatefulWidget::render(
            Table::new(rows, widths)
                .column_spacing(self.table_cell_padding)
                .header(TableRow::new(header).style(header_style)),
            area,
            buf,
            &mut state.table_state,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn people(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| match json!({"id": i + 1, "name": format!("person{}", i + 1)}) {
                serde_json::Value::Object(map) => Row::Fields(map),
                _ => unreachable!(),
            })
            .collect()
    }

    fn named(names: &[&str]) -> Vec<Row> {
        names
            .iter()
            .enumerate()
            .map(
                |(i, name)| match json!({"id": i + 1, "name": *name}) {
                    serde_json::Value::Object(map) => Row::Fields(map),
                    _ => unreachable!(),
                },
            )
            .collect()
    }

    #[test]
    fn total_pages_is_ceiling_division() {
        let state = DataTableState::new(people(25), Vec::new(), 10, 1);
        assert_eq!(state.total_pages(), 3);
        let state = DataTableState::new(people(30), Vec::new(), 10, 1);
        assert_eq!(state.total_pages(), 3);
        let state = DataTableState::new(Vec::new(), Vec::new(), 10, 1);
        assert_eq!(state.total_pages(), 0);
    }

    #[test]
    fn page_slice_is_half_open_and_clamped() {
        let state = DataTableState::new(people(25), Vec::new(), 10, 3);
        let page = state.page_rows();
        assert_eq!(page.len(), 5);
        assert_eq!(page[0].display(0), "21");
        assert_eq!(page[4].display(0), "25");
    }

    #[test]
    fn navigation_outside_range_is_a_no_op() {
        let mut state = DataTableState::new(people(25), Vec::new(), 10, 3);
        assert!(!state.next_page());
        assert_eq!(state.current_page(), 3);
        assert!(state.prev_page());
        assert_eq!(state.current_page(), 2);

        let mut state = DataTableState::new(people(5), Vec::new(), 10, 1);
        assert!(!state.prev_page());
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn construction_clamps_out_of_range_page() {
        let state = DataTableState::new(people(25), Vec::new(), 10, 9);
        assert_eq!(state.current_page(), 3);
        let state = DataTableState::new(people(25), Vec::new(), 10, 0);
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn search_filters_case_insensitively_and_resets_page() {
        let mut state = DataTableState::new(named(&["Alice", "Bob", "alina"]), Vec::new(), 10, 1);
        state.next_page();
        state.set_search("ali");
        assert_eq!(state.data_mode(), DataMode::Filtered);
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.total_items(), 2);
        assert_eq!(
            state.showing_info(),
            "Showing 1 to 2 of 2 items (filtered from 3 total items)."
        );
    }

    #[test]
    fn filtering_is_idempotent() {
        let mut state = DataTableState::new(named(&["Alice", "Bob", "alina"]), Vec::new(), 10, 1);
        state.set_search("ali");
        let once = state.page_rows();
        state.set_search("ali");
        assert_eq!(state.page_rows(), once);
    }

    #[test]
    fn clearing_search_reverts_to_paginated_mode() {
        let mut state = DataTableState::new(people(25), Vec::new(), 10, 1);
        state.set_search("person2");
        state.set_search("");
        assert_eq!(state.data_mode(), DataMode::Paginated);
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.total_items(), 25);

        // never panics on empty data
        let mut state = DataTableState::new(Vec::new(), Vec::new(), 10, 1);
        state.set_search("x");
        state.set_search("");
        assert_eq!(state.showing_info(), "Showing 0 to 0 of 0 items.");
    }

    #[test]
    fn sort_is_case_insensitive() {
        let mut state = DataTableState::new(
            named(&["Bob", "ann"]),
            Vec::new(),
            10,
            1,
        );
        state.sort("name", SortOrder::Ascending);
        let page = state.page_display();
        assert_eq!(page[0][1], "ann");
        assert_eq!(page[1][1], "Bob");
    }

    #[test]
    fn opposite_sort_directions_reverse_except_ties() {
        let mut state = DataTableState::new(named(&["carol", "ann", "bob"]), Vec::new(), 10, 1);
        state.sort("name", SortOrder::Ascending);
        let asc: Vec<String> = state.page_display().iter().map(|r| r[1].clone()).collect();
        state.sort("name", SortOrder::Descending);
        let mut desc: Vec<String> = state.page_display().iter().map(|r| r[1].clone()).collect();
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn sort_by_missing_field_keeps_order() {
        let mut state = DataTableState::new(named(&["carol", "ann"]), Vec::new(), 10, 1);
        state.sort("nope", SortOrder::Ascending);
        let page = state.page_display();
        assert_eq!(page[0][1], "carol");
        assert_eq!(page[1][1], "ann");
    }

    #[test]
    fn set_per_page_resets_to_first_page() {
        let mut state = DataTableState::new(people(25), Vec::new(), 10, 3);
        state.set_per_page(5);
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.total_pages(), 5);
        // zero is ignored
        state.set_per_page(0);
        assert_eq!(state.per_page(), 5);
    }

    #[test]
    fn set_rows_reclamps_page_and_rederives_columns() {
        let mut state = DataTableState::new(people(25), Vec::new(), 10, 3);
        state.set_rows(people(5));
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.columns().len(), 2);

        state.set_rows(Vec::new());
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.total_pages(), 0);
    }

    #[test]
    fn fixed_columns_survive_set_rows() {
        let cols = vec![Column::new("id").with_label("ID"), Column::new("name")];
        let mut state = DataTableState::new(people(3), cols.clone(), 10, 1);
        state.set_rows(people(2));
        assert_eq!(state.columns(), cols.as_slice());
    }

    #[test]
    fn showing_info_paginated() {
        let mut state = DataTableState::new(people(25), Vec::new(), 10, 1);
        assert_eq!(state.showing_info(), "Showing 1 to 10 of 25 items.");
        state.next_page();
        state.next_page();
        assert_eq!(state.showing_info(), "Showing 21 to 25 of 25 items.");
    }

    #[test]
    fn plugins_transform_display_values() {
        let mut state = DataTableState::new(named(&["ann"]), Vec::new(), 10, 1);
        state.register_plugin(Plugin::for_field("upper", "name", |v| v.to_uppercase()));
        state.register_plugin(Plugin::for_field("tag", "id", |v| format!("#{v}")));
        let page = state.page_display();
        assert_eq!(page[0][0], "#1");
        assert_eq!(page[0][1], "ANN");
    }

    #[test]
    fn cells_rows_use_synthetic_plugin_keys() {
        let rows = vec![Row::Cells(vec!["a".into(), "b".into()])];
        let mut state = DataTableState::new(rows, Vec::new(), 10, 1);
        state.register_plugin(Plugin::for_field("upper", "data2", |v| v.to_uppercase()));
        let page = state.page_display();
        assert_eq!(page[0][0], "a");
        assert_eq!(page[0][1], "B");
    }

    #[test]
    fn explicit_column_width_wins_over_content() {
        let cols = vec![
            Column::new("id").with_width(3),
            Column::new("name"),
        ];
        let grid = vec![vec!["123456789".to_string(), "ann".to_string()]];
        let widths = DataTable::new().fit_widths(&cols, &grid, 40);
        // explicit width, not the 9-char content
        assert_eq!(widths[0], 3);
        // derived from label vs content max
        assert_eq!(widths[1], 4);
    }

    #[test]
    fn fit_widths_drops_columns_past_the_area() {
        let cols = vec![
            Column::new("a").with_width(8),
            Column::new("b").with_width(8),
            Column::new("c").with_width(8),
        ];
        let grid = vec![vec!["x".to_string(), "y".to_string(), "z".to_string()]];
        let widths = DataTable::new().fit_widths(&cols, &grid, 20);
        assert_eq!(widths.len(), 2);
    }

    #[test]
    fn renders_error_instead_of_table() {
        let mut state = DataTableState::new(Vec::new(), Vec::new(), 10, 1);
        state.error = Some("Server returned 500.".to_string());
        let mut buf = Buffer::empty(Rect::new(0, 0, 40, 5));
        DataTable::new().render(Rect::new(0, 0, 40, 5), &mut buf, &mut state);
        let content: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Error: Server returned 500."));
    }

    #[test]
    fn renders_header_and_body() {
        let mut state = DataTableState::new(named(&["ann", "bob"]), Vec::new(), 10, 1);
        let mut buf = Buffer::empty(Rect::new(0, 0, 30, 6));
        DataTable::new().render(Rect::new(0, 0, 30, 6), &mut buf, &mut state);
        let content: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(content.contains("id"));
        assert!(content.contains("name"));
        assert!(content.contains("ann"));
        assert!(content.contains("bob"));
    }

    #[test]
    fn renders_empty_state_message_per_mode() {
        let mut state = DataTableState::new(Vec::new(), Vec::new(), 10, 1);
        let mut buf = Buffer::empty(Rect::new(0, 0, 30, 5));
        DataTable::new().render(Rect::new(0, 0, 30, 5), &mut buf, &mut state);
        let content: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(content.contains("No data available!"));

        state.set_search("zzz");
        let mut buf = Buffer::empty(Rect::new(0, 0, 30, 5));
        DataTable::new().render(Rect::new(0, 0, 30, 5), &mut buf, &mut state);
        let content: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(content.contains("No data was found!"));
    }
}
