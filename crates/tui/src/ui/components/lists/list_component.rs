//! Workflows, Executions and Extracted Data pages.
//!
//! Each page renders its single-fetch load state: `Loading...` first, then a
//! table (or JSON cards for extracted data), or a placeholder when the list
//! is empty. A failed fetch shows the placeholder with the error beneath.

use automator_engine::LoadState;
use automator_types::{Effect, Page, Route};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Cell, Paragraph, Row, Table, TableState, Wrap},
};

use crate::app::App;
use crate::ui::components::Component;
use crate::ui::theme::{Theme, theme_helpers as th};
use crate::ui::utils::{render_error, render_placeholder};
use crate::view_model::{self, EXECUTIONS_HEADER, WORKFLOWS_HEADER};

pub const LOADING: &str = "Loading...";

fn empty_placeholder(page: &Page) -> &'static str {
    match page {
        Page::Workflows => "No workflows yet",
        Page::Executions => "No executions yet",
        Page::Extracted | Page::ExecutionDetail(_) => "No extracted data yet",
    }
}

#[derive(Debug, Default)]
pub struct ListPageComponent;

impl ListPageComponent {
    /// Split the card into content and, when a fetch failed, an error row.
    fn split_for_error(area: Rect, has_error: bool) -> (Rect, Rect) {
        let [content, error] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(u16::from(has_error) * 2)]).areas(area);
        (content, error)
    }

    fn render_state<T>(
        frame: &mut Frame,
        area: Rect,
        theme: &dyn Theme,
        page: &Page,
        state: &LoadState<Vec<T>>,
        render_items: impl FnOnce(&mut Frame, Rect, &[T]),
    ) {
        let (content, error_area) = Self::split_for_error(area, state.error().is_some());
        match state {
            LoadState::NotLoaded | LoadState::Loading => render_placeholder(frame, content, theme, LOADING),
            LoadState::Ready(items) if items.is_empty() => render_placeholder(frame, content, theme, empty_placeholder(page)),
            LoadState::Ready(items) => render_items(frame, content, items),
            LoadState::Error(message) => {
                render_placeholder(frame, content, theme, empty_placeholder(page));
                render_error(frame, error_area, theme, message);
            }
        }
    }

    fn table<'a, const N: usize>(theme: &dyn Theme, header: [&'a str; N], rows: Vec<[String; N]>) -> Table<'a> {
        let widths = [Constraint::Fill(1); N];
        let header = Row::new(header.map(Cell::from)).style(th::table_header_row_style(theme));
        Table::new(rows.into_iter().map(Row::new), widths)
            .header(header)
            .column_spacing(2)
            .row_highlight_style(th::table_selected_style(theme))
    }

    fn extracted_cards(theme: &dyn Theme, records: &[automator_types::ExtractedRecord], selected: usize) -> (Text<'static>, u16) {
        let mut lines = Vec::new();
        let mut offset = 0u16;
        for (index, record) in records.iter().enumerate() {
            if index == selected {
                offset = u16::try_from(lines.len()).unwrap_or(u16::MAX);
            }
            let id_style = if index == selected {
                th::table_selected_style(theme)
            } else {
                theme.accent_primary_style()
            };
            lines.push(Line::from(Span::styled(record.workflow_id.clone(), id_style)));
            for json_line in view_model::pretty_json(&record.data).lines() {
                lines.push(Line::from(Span::styled(format!("  {json_line}"), theme.text_primary_style())));
            }
            lines.push(Line::default());
        }
        (Text::from(lines), offset)
    }
}

impl Component for ListPageComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let Some(page) = app.route.page() else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Up => app.selection.move_up(&page),
            KeyCode::Down => {
                let len = app.item_count(&page);
                app.selection.move_down(&page, len);
            }
            KeyCode::Enter if page == Page::Executions => {
                if let Some(workflow_id) = app.selected_execution_id() {
                    return vec![Effect::Navigate(Route::ExecutionDetail(workflow_id))];
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &App) {
        let Some(page) = app.route.page() else {
            return;
        };
        let theme = app.theme.as_ref();
        let block = th::block(theme, Some(page.title()), true);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        let selected = app.selection.get(&page);

        match &page {
            Page::Workflows => Self::render_state(frame, inner, theme, &page, app.store.workflows(), |frame, area, items| {
                let rows = items.iter().map(view_model::workflow_row).collect();
                let mut state = TableState::default().with_selected(Some(selected));
                frame.render_stateful_widget(Self::table(theme, WORKFLOWS_HEADER, rows), area, &mut state);
            }),
            Page::Executions => Self::render_state(frame, inner, theme, &page, app.store.executions(), |frame, area, items| {
                let rows = items.iter().map(view_model::execution_row).collect();
                let mut state = TableState::default().with_selected(Some(selected));
                frame.render_stateful_widget(Self::table(theme, EXECUTIONS_HEADER, rows), area, &mut state);
            }),
            Page::Extracted => Self::render_state(frame, inner, theme, &page, app.store.extracted(), |frame, area, items| {
                let (text, offset) = Self::extracted_cards(theme, items, selected);
                let cards = Paragraph::new(text).wrap(Wrap { trim: false }).scroll((offset, 0));
                frame.render_widget(cards, area);
            }),
            Page::ExecutionDetail(_) => {}
        }
    }
}
