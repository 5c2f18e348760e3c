use crossterm::event::{KeyCode, KeyEvent};
use prompt::{NavLocks, ShellSignal};
use tracing::debug;

use crate::components::Component;

/// Navigation shell: the popup slot layered over the active page, plus the
/// shared navigation-lock registry. User-triggered navigation (quit, close)
/// is suppressed application-wide while any lock is held; programmatic
/// closes issued by the forms themselves are always honored.
pub struct Shell {
    popup: Option<Box<dyn Component>>,
    locks: NavLocks,
}

impl Shell {
    pub fn new(locks: NavLocks) -> Self {
        Self { popup: None, locks }
    }

    pub fn popup_mut(&mut self) -> Option<&mut (dyn Component + 'static)> {
        self.popup.as_deref_mut()
    }

    pub fn is_popup_open(&self) -> bool {
        self.popup.is_some()
    }

    pub fn open(&mut self, popup: Box<dyn Component>) {
        debug!(name = popup.name(), "opening popup");
        self.popup = Some(popup);
    }

    /// Tear down the current popup. Dropping the component disposes its
    /// prompt, which cancels timers and releases any held lock.
    pub fn close(&mut self) {
        if let Some(popup) = self.popup.take() {
            debug!(name = popup.name(), "closing popup");
        }
    }

    /// Whether a user-triggered screen transition may proceed right now.
    pub fn allows_user_navigation(&self) -> bool {
        !self.locks.is_locked()
    }

    /// Map a key press onto the cancel/confirm broadcasts dialogs listen to.
    pub fn signal_for_key(key: &KeyEvent) -> Option<ShellSignal> {
        match key.code {
            KeyCode::Esc => Some(ShellSignal::AttemptCancel),
            KeyCode::Enter => Some(ShellSignal::AttemptConfirm),
            _ => None,
        }
    }
}
