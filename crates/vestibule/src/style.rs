/*!
Semantic color roles for the vestibule TUI.

Widgets request colors by role instead of hard-coding RGB values, so a theme
swap stays a single-file change.
*/

use ratatui::style::{Color, Style};

/// Semantic roles used by widgets and pages to request colors independent of a specific theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Role {
    Background,
    Surface,
    Text,
    SubtleText,
    Selection,

    Primary,
    Accent,
    Success,
    Warning,
    Danger,
    Info,
    Muted,
}

/// A mapping from semantic roles to colors for a given Theme.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RoleColors {
    pub background: Color,
    pub surface: Color,
    pub text: Color,
    pub subtle_text: Color,
    pub selection: Color,

    pub primary: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub info: Color,
    pub muted: Color,
}

impl RoleColors {
    pub fn color(&self, role: Role) -> Color {
        match role {
            Role::Background => self.background,
            Role::Surface => self.surface,
            Role::Text => self.text,
            Role::SubtleText => self.subtle_text,
            Role::Selection => self.selection,

            Role::Primary => self.primary,
            Role::Accent => self.accent,
            Role::Success => self.success,
            Role::Warning => self.warning,
            Role::Danger => self.danger,
            Role::Info => self.info,
            Role::Muted => self.muted,
        }
    }
}

/// A full theme containing semantic role colors.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Theme {
    pub name: String,
    pub roles: RoleColors,
}

impl Theme {
    /// Convenience method to turn a role into a ratatui `Style`.
    pub fn style(&self, role: Role) -> Style {
        Style::default().fg(self.roles.color(role))
    }
}

pub fn default_dark_theme() -> Theme {
    let roles = RoleColors {
        background: Color::Rgb(20, 18, 28),
        surface: Color::Rgb(28, 28, 34),
        text: Color::Rgb(220, 220, 220),
        subtle_text: Color::Rgb(130, 130, 130),
        selection: Color::Rgb(58, 91, 156),

        primary: Color::Rgb(129, 161, 255),
        accent: Color::Rgb(99, 205, 218),
        success: Color::Rgb(102, 187, 106),
        warning: Color::Rgb(255, 214, 102),
        danger: Color::Rgb(239, 83, 80),
        info: Color::Rgb(144, 202, 249),
        muted: Color::Rgb(120, 120, 128),
    };
    Theme {
        name: "vestibule-dark".into(),
        roles,
    }
}
