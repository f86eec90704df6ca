//! Dashboard view: metrics, the New Workflow form, counters, and the
//! timeline of the current run.

use automator_types::Effect;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{List, ListItem, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use super::state::FormFocus;
use crate::app::App;
use crate::ui::components::{Component, text_field::TextField};
use crate::ui::theme::{Theme, theme_helpers as th};
use crate::ui::utils::{render_error, render_tiles};
use crate::view_model::{self, TIMELINE_EMPTY, TimelineEntry};

const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

#[derive(Debug, Default)]
pub struct DashboardComponent;

impl DashboardComponent {
    fn render_field(frame: &mut Frame, area: Rect, theme: &dyn Theme, title: &str, field: &TextField, focused: bool) {
        let shown = if field.is_masked() {
            view_model::mask(field.value())
        } else {
            field.value().to_string()
        };
        let paragraph = Paragraph::new(shown)
            .style(th::input_style(theme, focused))
            .block(th::block(theme, Some(title), focused));
        frame.render_widget(paragraph, area);

        if focused {
            let prefix: String = field.value().chars().take(field.cursor()).collect();
            let offset = if field.is_masked() {
                field.cursor()
            } else {
                UnicodeWidthStr::width(prefix.as_str())
            };
            let x = area.x.saturating_add(1).saturating_add(offset as u16);
            let max_x = area.right().saturating_sub(2);
            frame.set_cursor_position((x.min(max_x), area.y + 1));
        }
    }

    fn render_form(frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.theme.as_ref();
        let block = th::block(theme, Some("New Workflow"), false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [description_area, credentials_area, run_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Length(3), Constraint::Length(1)]).areas(inner);
        let [username_area, password_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).spacing(1).areas(credentials_area);

        let form = &app.dashboard;
        Self::render_field(
            frame,
            description_area,
            theme,
            "Description",
            &form.description,
            form.focus == FormFocus::Description,
        );
        Self::render_field(frame, username_area, theme, "Username", &form.username, form.focus == FormFocus::Username);
        Self::render_field(frame, password_area, theme, "Password", &form.password, form.focus == FormFocus::Password);

        let running = app.controller.is_running();
        let label = if running {
            format!(" {} Running ", SPINNER[app.spinner_frame % SPINNER.len()])
        } else {
            " + Run ".to_string()
        };
        let mut style = th::button_primary_style(theme, !running);
        if form.focus == FormFocus::Run && !running {
            style = style.add_modifier(ratatui::style::Modifier::UNDERLINED);
        }
        frame.render_widget(Paragraph::new(Span::styled(label, style)), run_area);
    }

    fn timeline_items<'a>(theme: &dyn Theme, entries: &'a [TimelineEntry]) -> Vec<ListItem<'a>> {
        entries
            .iter()
            .map(|entry| {
                let dot_style = if entry.done { theme.status_success() } else { theme.status_warning() };
                ListItem::new(Text::from(vec![
                    Line::from(vec![
                        Span::styled("● ", dot_style),
                        Span::styled(entry.title.as_str(), theme.text_primary_style()),
                    ]),
                    Line::from(Span::styled(format!("  {}", entry.subtitle), theme.text_muted_style())),
                ]))
            })
            .collect()
    }

    fn render_details(frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.theme.as_ref();
        let mut block = th::block(theme, Some("Execution Details"), false);
        if let Some(workflow_id) = app.controller.workflow_id() {
            block = block.title(Line::from(Span::styled(workflow_id.to_string(), theme.text_muted_style())).right_aligned());
        }
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let error = app.controller.error();
        let [timeline_area, error_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(u16::from(error.is_some()) * 2)]).areas(inner);

        let steps = view_model::dashboard_steps(app.controller.run(), app.controller.planned_steps());
        let entries = view_model::timeline(steps);
        if entries.is_empty() {
            frame.render_widget(Paragraph::new(Span::styled(TIMELINE_EMPTY, theme.text_muted_style())), timeline_area);
        } else {
            frame.render_widget(List::new(Self::timeline_items(theme, &entries)), timeline_area);
        }

        if let Some(message) = error {
            render_error(frame, error_area, theme, message);
        }
    }
}

impl Component for DashboardComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let form = &mut app.dashboard;
        match key.code {
            KeyCode::Tab => form.focus = form.focus.next(),
            KeyCode::BackTab => form.focus = form.focus.prev(),
            KeyCode::Enter => {
                if app.controller.is_running() {
                    return Vec::new();
                }
                return vec![form.submit_effect()];
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(field) = form.focused_field_mut() {
                    field.insert(ch);
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = form.focused_field_mut() {
                    field.backspace();
                }
            }
            KeyCode::Delete => {
                if let Some(field) = form.focused_field_mut() {
                    field.delete();
                }
            }
            KeyCode::Left => {
                if let Some(field) = form.focused_field_mut() {
                    field.move_left();
                }
            }
            KeyCode::Right => {
                if let Some(field) = form.focused_field_mut() {
                    field.move_right();
                }
            }
            KeyCode::Home => {
                if let Some(field) = form.focused_field_mut() {
                    field.move_home();
                }
            }
            KeyCode::End => {
                if let Some(field) = form.focused_field_mut() {
                    field.move_end();
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &App) {
        let theme = app.theme.as_ref();
        let [metrics_area, form_area, stats_area, details_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(9),
            Constraint::Length(3),
            Constraint::Min(4),
        ])
        .areas(rect);

        let run = app.controller.run();
        render_tiles(frame, metrics_area, theme, &view_model::metric_tiles(run));
        Self::render_form(frame, form_area, app);
        render_tiles(
            frame,
            stats_area,
            theme,
            &view_model::stat_tiles(run, app.controller.is_running()),
        );
        Self::render_details(frame, details_area, app);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubApi, buffer_lines};
    use crossterm::event::KeyEventKind;
    use ratatui::{Terminal, backend::TestBackend};
    use std::sync::Arc;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn app() -> App {
        App::new(Arc::new(StubApi::default()), Duration::from_secs(1), "http://x").0
    }

    #[test]
    fn idle_dashboard_renders_defaults() {
        let app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
        terminal
            .draw(|frame| DashboardComponent.render(frame, frame.area(), &app))
            .expect("draw");
        let screen = buffer_lines(terminal.backend().buffer()).join("\n");

        assert!(screen.contains("Progress"));
        assert!(screen.contains("0%"));
        assert!(screen.contains("idle"));
        assert!(screen.contains("New Workflow"));
        assert!(screen.contains("Total Steps"));
        assert!(screen.contains(TIMELINE_EMPTY));
    }

    #[test]
    fn password_is_masked_on_screen() {
        let mut app = app();
        let mut dashboard = DashboardComponent;
        dashboard.handle_key_events(&mut app, key(KeyCode::Tab));
        dashboard.handle_key_events(&mut app, key(KeyCode::Tab));
        for ch in "hunter2".chars() {
            dashboard.handle_key_events(&mut app, key(KeyCode::Char(ch)));
        }
        assert_eq!(app.dashboard.password.value(), "hunter2");

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
        terminal
            .draw(|frame| dashboard.render(frame, frame.area(), &app))
            .expect("draw");
        let screen = buffer_lines(terminal.backend().buffer()).join("\n");
        assert!(!screen.contains("hunter2"));
        assert!(screen.contains("•••••••"));
    }

    #[test]
    fn enter_emits_submission() {
        let mut app = app();
        let effects = DashboardComponent.handle_key_events(&mut app, key(KeyCode::Enter));
        assert!(matches!(effects.as_slice(), [Effect::SubmitWorkflow { .. }]));
    }

    #[tokio::test]
    async fn enter_is_ignored_while_running() {
        let mut app = app();
        app.controller.submit("busy", Default::default());
        let effects = DashboardComponent.handle_key_events(&mut app, key(KeyCode::Enter));
        assert!(effects.is_empty());
    }
}
