//! Detail page for one past execution, opened from the executions table.

use automator_engine::LoadState;
use automator_types::{Route, WorkflowRun};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph, Wrap},
};

use crate::app::App;
use crate::ui::components::Component;
use crate::ui::components::lists::LOADING;
use crate::ui::theme::{Theme, theme_helpers as th};
use crate::ui::utils::{render_error, render_placeholder, render_tiles};
use crate::view_model::{self, TIMELINE_EMPTY};

#[derive(Debug, Default)]
pub struct ExecutionDetailComponent;

impl ExecutionDetailComponent {
    fn render_run(frame: &mut Frame, area: Rect, theme: &dyn Theme, run: &WorkflowRun) {
        let result_height = if run.result.is_some() { 3 } else { 0 };
        let [tiles_area, steps_area, result_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(result_height),
        ])
        .areas(area);

        render_tiles(frame, tiles_area, theme, &view_model::metric_tiles(Some(run)));

        let entries = view_model::timeline(&run.steps);
        if entries.is_empty() {
            frame.render_widget(Paragraph::new(Span::styled(TIMELINE_EMPTY, theme.text_muted_style())), steps_area);
        } else {
            let items: Vec<ListItem> = entries
                .iter()
                .map(|entry| {
                    let dot_style = if entry.done { theme.status_success() } else { theme.status_warning() };
                    ListItem::new(Line::from(vec![
                        Span::styled("● ", dot_style),
                        Span::styled(entry.title.clone(), theme.text_primary_style()),
                        Span::styled(format!("  {}", entry.subtitle), theme.text_muted_style()),
                    ]))
                })
                .collect();
            frame.render_widget(List::new(items), steps_area);
        }

        if let Some(result) = &run.result {
            let paragraph = Paragraph::new(result.as_str())
                .wrap(Wrap { trim: true })
                .block(th::block(theme, Some("Result"), false));
            frame.render_widget(paragraph, result_area);
        }
    }
}

impl Component for ExecutionDetailComponent {
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &App) {
        let Route::ExecutionDetail(workflow_id) = &app.route else {
            return;
        };
        let theme = app.theme.as_ref();
        let title = format!("Execution {workflow_id}");
        let block = th::block(theme, Some(title.as_str()), true);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        match app.store.execution(workflow_id) {
            LoadState::NotLoaded | LoadState::Loading => render_placeholder(frame, inner, theme, LOADING),
            LoadState::Ready(run) => Self::render_run(frame, inner, theme, run),
            LoadState::Error(message) => render_error(frame, inner, theme, message),
        }
    }
}
