use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    widgets::{Block, Paragraph},
};

use crate::action::{Action, PopupKind};
use crate::components::Component;
use crate::locale::translate;
use crate::style::{Role, Theme};
use crate::tui::EventResponse;

/// Post-login landing page: shows who is signed in and opens the gift-code
/// and change-username popups.
pub struct HomePage {
    theme: Theme,
    username: String,
}

impl HomePage {
    pub fn new() -> Self {
        Self {
            theme: crate::style::default_dark_theme(),
            username: String::new(),
        }
    }
}

impl Component for HomePage {
    fn register_theme(&mut self, theme: Theme) -> Result<()> {
        self.theme = theme;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "home"
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        match key.code {
            KeyCode::Char('g') => Ok(Some(EventResponse::Stop(Action::OpenPopup(
                PopupKind::GiftCode,
            )))),
            KeyCode::Char('u') => Ok(Some(EventResponse::Stop(Action::OpenPopup(
                PopupKind::ChangeUsername,
            )))),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::LoggedIn(username) | Action::UsernameChanged(username) => {
                self.username = username;
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let bg = Block::default()
            .style(ratatui::style::Style::default().bg(self.theme.roles.background));
        frame.render_widget(bg, area);

        let vertical = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ]);
        let [_, title, _, hints, _] = vertical.areas(area);

        frame.render_widget(
            Paragraph::new(format!("{}, {}", translate("home.title"), self.username))
                .centered()
                .style(self.theme.style(Role::Primary)),
            title,
        );
        frame.render_widget(
            Paragraph::new(translate("home.hints"))
                .centered()
                .style(self.theme.style(Role::SubtleText)),
            hints,
        );
        Ok(())
    }
}
