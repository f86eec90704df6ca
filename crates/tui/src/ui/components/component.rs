//! Component trait for the dashboard views.
//!
//! Components keep no long-lived data of their own: the state they render
//! lives on [`App`], and input handling returns `Effect`s for the runtime to
//! apply. This keeps side effects (submitting, page activation) in one place.

use automator_types::Effect;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use crate::app::App;

pub(crate) trait Component {
    /// Handle a key that the main view did not consume.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &App);
}
