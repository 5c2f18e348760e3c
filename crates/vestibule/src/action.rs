use serde::{Deserialize, Serialize};
use strum::Display;

/// Which popup the shell should open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopupKind {
    Registration,
    RegistrationModal,
    GiftCode,
    ChangeUsername,
}

#[derive(Debug, Clone, PartialEq, Serialize, Display, Deserialize)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    Error(String),
    OpenPopup(PopupKind),
    ClosePopup,
    Navigate(usize),
    /// A login or registration flow finished; carries the username.
    LoggedIn(String),
    /// The change-username dialog finished; carries the new username.
    UsernameChanged(String),
}
