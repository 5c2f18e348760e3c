/// Popup components layered over the active page by the shell.
pub mod change_username;
pub mod gift_code;
pub mod registration;
pub mod registration_modal;

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    symbols,
    widgets::{Block, Borders, Clear},
};

use crate::style::Theme;

/// Render a modal-style backdrop that visually separates a popup from the underlying page.
/// Terminals have no real transparency, so a solid dark fill stands in for a dim overlay.
pub fn render_backdrop(frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let backdrop = Block::default().style(Style::default().bg(theme.roles.background));
    frame.render_widget(backdrop, area);
}

/// Compute a centered rectangle with a fixed width/height clamped to the available `area`.
pub fn centered_rect_fixed(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);

    let x = area.x.saturating_add((area.width.saturating_sub(w)) / 2);
    let y = area.y.saturating_add((area.height.saturating_sub(h)) / 2);

    Rect {
        x,
        y,
        width: w,
        height: h,
    }
}

/// Draw a rounded, bordered popup shell with a title, clearing the area so
/// underlying content doesn't bleed through. Returns the inner area.
pub fn draw_popup_frame(
    frame: &mut Frame<'_>,
    area: Rect,
    title: impl Into<String>,
    theme: &Theme,
) -> Rect {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", title.into()))
        .borders(Borders::ALL)
        .border_set(symbols::border::ROUNDED)
        .style(Style::default().fg(theme.roles.text).bg(theme.roles.surface));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}
