//! Root view: routes keys and lays out the top bar, the active page and the
//! footer.

use automator_types::{Effect, Route};
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::App;
use crate::ui::components::{
    Component, DashboardComponent, ExecutionDetailComponent, ListPageComponent, TopBarComponent,
};
use crate::ui::theme::theme_helpers as th;

const HINTS: &str = "F1-F4 pages · Tab next field · Enter run/open · Esc back · Ctrl+C quit";

#[derive(Debug, Default)]
pub struct MainView {
    top_bar: TopBarComponent,
    dashboard: DashboardComponent,
    lists: ListPageComponent,
    detail: ExecutionDetailComponent,
}

impl MainView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Global keys first, then the component for the current route.
    pub fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Effect::Quit];
        }
        if let KeyCode::F(number) = key.code {
            let tabs = Route::tabs();
            return match tabs.get(usize::from(number).wrapping_sub(1)) {
                Some(route) => vec![Effect::Navigate(route.clone())],
                None => Vec::new(),
            };
        }
        if key.code == KeyCode::Esc {
            return app.back_route().map(Effect::Navigate).into_iter().collect();
        }

        match app.route {
            Route::Dashboard => self.dashboard.handle_key_events(app, key),
            Route::Workflows | Route::Executions | Route::Extracted => self.lists.handle_key_events(app, key),
            Route::ExecutionDetail(_) => Vec::new(),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, app: &App) {
        frame.render_widget(Paragraph::new("").style(th::panel_style(app.theme.as_ref())), area);
        let [top_area, content_area, footer_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1), Constraint::Length(1)]).areas(area);

        self.top_bar.render(frame, top_area, app);
        match app.route {
            Route::Dashboard => self.dashboard.render(frame, content_area, app),
            Route::Workflows | Route::Executions | Route::Extracted => self.lists.render(frame, content_area, app),
            Route::ExecutionDetail(_) => self.detail.render(frame, content_area, app),
        }
        self.render_footer(frame, footer_area, app);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.theme.as_ref();
        let mut spans = vec![Span::styled(HINTS, theme.text_muted_style())];
        spans.push(Span::styled(format!("  {}", app.api_base), theme.accent_secondary_style()));
        if let Some(updated) = app.controller.last_updated() {
            let local = updated.with_timezone(&Local);
            spans.push(Span::styled(
                format!("  updated {}", local.format("%H:%M:%S")),
                theme.text_muted_style(),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubApi;
    use crate::ui::theme::Theme;
    use ratatui::{Terminal, backend::TestBackend};
    use std::sync::Arc;
    use std::time::Duration;

    fn app() -> App {
        App::new(Arc::new(StubApi::default()), Duration::from_secs(1), "http://x").0
    }

    #[test]
    fn function_keys_map_to_tabs() {
        let mut app = app();
        let mut view = MainView::new();
        let effects = view.handle_key_events(&mut app, KeyEvent::new(KeyCode::F(4), KeyModifiers::NONE));
        assert_eq!(effects, vec![Effect::Navigate(Route::Extracted)]);
        let effects = view.handle_key_events(&mut app, KeyEvent::new(KeyCode::F(9), KeyModifiers::NONE));
        assert!(effects.is_empty());
    }

    #[test]
    fn footer_shows_api_base_in_secondary_accent() {
        let app = app();
        let mut view = MainView::new();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).expect("terminal");
        terminal.draw(|frame| view.render(frame, frame.area(), &app)).expect("draw");

        let buffer = terminal.backend().buffer();
        let y = buffer.area.height - 1;
        let row: Vec<&str> = (0..buffer.area.width).map(|x| buffer[(x, y)].symbol()).collect();
        let target: Vec<String> = "http://x".chars().map(String::from).collect();
        let x = row
            .windows(target.len())
            .position(|window| window.iter().zip(&target).all(|(cell, ch)| *cell == ch.as_str()))
            .expect("api base in footer");
        assert_eq!(buffer[(x as u16, y)].fg, app.theme.roles().accent_secondary);
    }

    #[test]
    fn escape_goes_back_and_ctrl_c_quits() {
        let mut app = app();
        let mut view = MainView::new();
        assert!(view.handle_key_events(&mut app, KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)).is_empty());
        let effects = view.handle_key_events(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(effects, vec![Effect::Quit]);
    }
}
