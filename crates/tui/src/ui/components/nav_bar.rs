//! Top bar: brand, page tabs, and the API health badge.

use automator_types::Route;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{App, HealthStatus};
use crate::ui::components::Component;
use crate::ui::theme::theme_helpers as th;

pub const BRAND: &str = "Workflow Automator";

#[derive(Debug, Default)]
pub struct TopBarComponent;

impl TopBarComponent {
    fn badge(health: HealthStatus) -> (&'static str, Option<bool>) {
        match health {
            HealthStatus::Checking => (" Checking API ", None),
            HealthStatus::Online => (" API Online ", Some(true)),
            HealthStatus::Offline => (" API Offline ", Some(false)),
        }
    }
}

impl Component for TopBarComponent {
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &App) {
        let theme = app.theme.as_ref();
        let (badge_text, healthy) = Self::badge(app.health);
        let [brand_area, tabs_area, badge_area] = Layout::horizontal([
            Constraint::Length(BRAND.len() as u16 + 4),
            Constraint::Fill(1),
            Constraint::Length(badge_text.len() as u16),
        ])
        .areas(rect);

        let brand = Line::from(vec![
            Span::styled("⚡ ", theme.status_warning()),
            Span::styled(BRAND, theme.accent_emphasis_style()),
        ]);
        frame.render_widget(Paragraph::new(brand), brand_area);

        let tabs = Route::tabs();
        let titles = tabs
            .iter()
            .enumerate()
            .map(|(index, route)| Span::raw(format!("F{} {}", index + 1, route.tab_label())))
            .collect();
        let selected = tabs
            .iter()
            .position(|route| route.tab_label() == app.route.tab_label())
            .unwrap_or(0);
        frame.render_widget(th::tabs(theme, titles, selected), tabs_area);

        let badge_style = match healthy {
            Some(healthy) => th::health_badge_style(theme, healthy),
            None => theme.text_muted_style(),
        };
        frame.render_widget(Paragraph::new(Span::styled(badge_text, badge_style)), badge_area);
    }
}
