use ratatui::{
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders, Tabs},
};

use super::roles::{Theme, ThemeRoles};

/// Build a standard Block with theme surfaces and borders.
pub fn block<'a, T: Theme + ?Sized>(theme: &T, title: Option<&'a str>, focused: bool) -> Block<'a> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_style(focused))
        .style(panel_style(theme));
    if let Some(t) = title {
        block = block.title(Span::styled(t, theme.text_secondary_style().add_modifier(Modifier::BOLD)));
    }
    block
}

pub fn panel_style<T: Theme + ?Sized>(theme: &T) -> Style {
    let ThemeRoles { surface, text, .. } = *theme.roles();
    Style::default().bg(surface).fg(text)
}

pub fn table_header_row_style<T: Theme + ?Sized>(theme: &T) -> Style {
    Style::default()
        .bg(theme.roles().surface_muted)
        .fg(theme.roles().text_secondary)
        .add_modifier(Modifier::BOLD)
}

pub fn table_selected_style<T: Theme + ?Sized>(theme: &T) -> Style {
    theme.selection_style().add_modifier(Modifier::BOLD)
}

/// Build tabs with active/inactive styles.
pub fn tabs<'a, T: Theme + ?Sized>(theme: &T, titles: Vec<Span<'a>>, index: usize) -> Tabs<'a> {
    Tabs::new(titles)
        .select(index)
        .divider(Span::styled("│", theme.divider_style()))
        .highlight_style(
            theme
                .text_primary_style()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::UNDERLINED),
        )
        .style(theme.text_secondary_style())
}

/// Style for input fields; caller sets the block border based on focus.
pub fn input_style<T: Theme + ?Sized>(theme: &T, focused: bool) -> Style {
    let style = panel_style(theme);
    if focused { style.add_modifier(Modifier::BOLD) } else { style }
}

/// Primary button style (filled accent background).
pub fn button_primary_style<T: Theme + ?Sized>(theme: &T, enabled: bool) -> Style {
    let ThemeRoles {
        accent_primary,
        background,
        surface_muted,
        text_muted,
        ..
    } = *theme.roles();
    if enabled {
        Style::default().bg(accent_primary).fg(background).add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(surface_muted).fg(text_muted)
    }
}

/// Filled badge; green when healthy, red otherwise.
pub fn health_badge_style<T: Theme + ?Sized>(theme: &T, healthy: bool) -> Style {
    let ThemeRoles {
        success,
        error,
        background,
        ..
    } = *theme.roles();
    let bg = if healthy { success } else { error };
    Style::default().bg(bg).fg(background).add_modifier(Modifier::BOLD)
}
