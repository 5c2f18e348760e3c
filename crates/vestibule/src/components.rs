use color_eyre::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::{action::Action, style::Theme, tui::Event, tui::EventResponse};

pub mod fields;
pub mod home;
pub mod login;
pub mod popups;

/// `Component` is a trait that represents a visual and interactive element of the user interface.
///
/// Implementors can be registered as a page or popup of the main application
/// loop and will receive events, process actions, and be rendered on screen.
pub trait Component {
    fn register_action_handler(&mut self, _tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    fn register_theme(&mut self, _theme: Theme) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str;

    fn handle_events(&mut self, event: Option<Event>) -> Result<Option<EventResponse<Action>>> {
        match event {
            Some(Event::Key(key)) => self.handle_key_event(key),
            Some(Event::Mouse(mouse)) => self.handle_mouse_event(mouse),
            _ => Ok(None),
        }
    }

    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        Ok(None)
    }

    fn handle_mouse_event(&mut self, _mouse: MouseEvent) -> Result<Option<EventResponse<Action>>> {
        Ok(None)
    }

    fn update(&mut self, _action: Action) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Minimum popup size, when rendered as a popup.
    fn popup_min_size(&self) -> Option<(u16, u16)> {
        None
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()>;
}
