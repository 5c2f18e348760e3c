use crossterm::event::KeyEvent;
use prompt::FieldState;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    symbols::border,
    text::Line,
    widgets::{Block, Paragraph},
};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler as _;

use crate::locale::translate;
use crate::style::Theme;

/// A single-line text input tied to a prompt field, rendered as a bordered
/// box with the inline validation message along the bottom edge.
pub struct TextField {
    pub id: &'static str,
    label: String,
    input: Input,
    masked: bool,
}

impl TextField {
    pub fn new(id: &'static str, label_key: &str) -> Self {
        Self {
            id,
            label: translate(label_key),
            input: Input::default(),
            masked: false,
        }
    }

    /// Obfuscate the value visually (passwords). Value kept plain in state.
    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn clear(&mut self) {
        self.input = Input::default();
    }

    /// Feed a key into the editor. Returns true when the value changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let before = self.input.value().to_string();
        self.input
            .handle_event(&crossterm::event::Event::Key(key));
        self.input.value() != before
    }

    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        focused: bool,
        theme: &Theme,
        state: Option<&FieldState>,
    ) {
        // keep 2 for borders and 1 for cursor
        let width = area.width.max(3) - 3;
        let scroll = self.input.visual_scroll(width as usize);

        let title_style = if focused {
            Style::default()
                .fg(theme.roles.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.roles.subtle_text)
        };
        let message = state.and_then(|s| s.message.as_deref());
        let pending = state.is_some_and(|s| s.remote.is_pending());
        let border_style = if message.is_some() {
            Style::default().fg(theme.roles.danger)
        } else if focused {
            Style::default().fg(theme.roles.primary)
        } else {
            Style::default().fg(theme.roles.muted)
        };
        let input_style = if focused {
            Style::default().fg(theme.roles.text)
        } else {
            Style::default().fg(theme.roles.subtle_text)
        };

        let mut block = Block::bordered()
            .title(self.label.as_str())
            .title_style(title_style)
            .border_set(border::ROUNDED)
            .border_style(border_style);
        if let Some(message) = message {
            block = block.title_bottom(
                Line::from(format!(" {message} ")).style(Style::default().fg(theme.roles.danger)),
            );
        } else if pending {
            block = block.title_bottom(
                Line::from(" checking availability… ")
                    .style(Style::default().fg(theme.roles.info)),
            );
        }

        let shown: String = if self.masked {
            self.input.value().chars().map(|_| '•').collect()
        } else {
            self.input.value().to_string()
        };
        let widget = Paragraph::new(shown)
            .scroll((0, scroll as u16))
            .style(input_style)
            .block(block);
        frame.render_widget(widget, area);

        if focused {
            // Ratatui hides the cursor unless it's explicitly set. Position the cursor past the
            // end of the input text and one line down from the border to the input line
            let x = self.input.visual_cursor().max(scroll) - scroll + 1;
            frame.set_cursor_position((area.x + x as u16, area.y + 1));
        }
    }
}
