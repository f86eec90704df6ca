use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use crate::ui::theme::{Theme, theme_helpers as th};
use crate::view_model::Tile;

/// Draw a row of equal-width tiles, each a bordered box titled by the tile.
pub fn render_tiles(frame: &mut Frame, area: Rect, theme: &dyn Theme, tiles: &[Tile]) {
    let constraints = tiles.iter().map(|_| Constraint::Fill(1));
    let cells = Layout::horizontal(constraints).spacing(1).split(area);
    for (tile, cell) in tiles.iter().zip(cells.iter()) {
        let value = Line::from(Span::styled(tile.value.as_str(), theme.accent_emphasis_style()));
        let paragraph = Paragraph::new(value).block(th::block(theme, Some(tile.title), false));
        frame.render_widget(paragraph, *cell);
    }
}

/// Centered pill such as `Loading...` or `No workflows yet`.
pub fn render_placeholder(frame: &mut Frame, area: Rect, theme: &dyn Theme, text: &str) {
    let [row] = Layout::vertical([Constraint::Length(1)]).flex(Flex::Center).areas(area);
    let pill = Line::from(Span::styled(
        format!(" {text} "),
        theme.selection_style().add_modifier(Modifier::BOLD),
    ))
    .centered();
    frame.render_widget(Paragraph::new(pill), row);
}

/// Request failure shown under page content.
pub fn render_error(frame: &mut Frame, area: Rect, theme: &dyn Theme, message: &str) {
    let paragraph = Paragraph::new(Line::from(Span::styled(message, theme.status_error())))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
