use std::collections::HashMap;
use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use prompt::{
    Feedback, FieldDef, FormHooks, FormPrompt, NavLocks, PromptConfig, PromptEvent, SubmitFuture,
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    widgets::{Block, Paragraph},
};
use session::AccountStore;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::action::{Action, PopupKind};
use crate::components::Component;
use crate::components::fields::TextField;
use crate::locale::translate;
use crate::style::{Role, Theme};
use crate::tui::EventResponse;
use crate::validate;

struct LoginHooks {
    accounts: AccountStore,
}

impl FormHooks for LoginHooks {
    fn fields(&self) -> Vec<FieldDef> {
        vec![
            FieldDef::new("username", validate::login_username_rule),
            FieldDef::new("password", validate::login_password_rule),
        ]
    }

    fn submit(&mut self, values: &HashMap<String, String>) -> SubmitFuture {
        let accounts = self.accounts.clone();
        let username = values.get("username").cloned().unwrap_or_default();
        let password = values.get("password").cloned().unwrap_or_default();
        Box::pin(async move {
            match accounts.login(username.trim(), &password) {
                Ok(account) => Ok(serde_json::json!({ "username": account.username })),
                Err(err) => Err(err.to_string()),
            }
        })
    }
}

/// The sign-in page. Also the entry point into both registration popups.
pub struct LoginPage {
    tx: Option<UnboundedSender<Action>>,
    theme: Theme,
    prompt: FormPrompt,
    events: UnboundedReceiver<PromptEvent>,
    username: TextField,
    password: TextField,
    focus_password: bool,
    banner: Option<(String, Role)>,
}

impl LoginPage {
    pub fn new(accounts: AccountStore, locks: NavLocks, feedback: Arc<dyn Feedback>) -> Self {
        let (event_tx, events) = unbounded_channel();
        let prompt = FormPrompt::new(
            Box::new(LoginHooks { accounts }),
            PromptConfig::new("login"),
            locks,
            feedback,
            event_tx,
        );
        Self {
            tx: None,
            theme: crate::style::default_dark_theme(),
            prompt,
            events,
            username: TextField::new("username", "login.username_label"),
            password: TextField::new("password", "login.password_label").masked(),
            focus_password: false,
            banner: Some((translate("login.instructions"), Role::Info)),
        }
    }

    fn send(&self, action: Action) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(action);
        }
    }

    fn focused_field(&mut self) -> &mut TextField {
        if self.focus_password {
            &mut self.password
        } else {
            &mut self.username
        }
    }

    fn drain_prompt_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                PromptEvent::Wake(msg) => self.prompt.wake(msg),
                PromptEvent::SubmittingStarted => {
                    self.banner = Some((translate("form.submitting"), Role::Info));
                }
                PromptEvent::SubmitBusy => {
                    self.banner = Some((translate("form.busy"), Role::Warning));
                }
                PromptEvent::SubmitRejected | PromptEvent::FieldsUpdated => {}
                PromptEvent::Succeeded => {
                    self.banner = Some((translate("login.success"), Role::Success));
                }
                PromptEvent::Failed(message) => {
                    self.banner = Some((message, Role::Danger));
                }
                PromptEvent::ReturnedToEditing(_) => {
                    self.banner = Some((translate("login.instructions"), Role::Info));
                }
                PromptEvent::Completed(payload) => {
                    let username = payload
                        .get("username")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string();
                    self.username.clear();
                    self.password.clear();
                    self.banner = Some((translate("login.instructions"), Role::Info));
                    self.send(Action::LoggedIn(username));
                }
            }
        }
    }
}

impl Component for LoginPage {
    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.tx = Some(tx);
        Ok(())
    }

    fn register_theme(&mut self, theme: Theme) -> Result<()> {
        self.theme = theme;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "login"
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                let blurred = if self.focus_password {
                    "password"
                } else {
                    "username"
                };
                self.prompt.handle_field_blurred(blurred);
                self.focus_password = !self.focus_password;
                Ok(Some(EventResponse::Stop(Action::Render)))
            }
            KeyCode::Enter => {
                self.prompt.attempt_submit();
                Ok(Some(EventResponse::Stop(Action::Render)))
            }
            KeyCode::F(2) => Ok(Some(EventResponse::Stop(Action::OpenPopup(
                PopupKind::Registration,
            )))),
            KeyCode::F(3) => Ok(Some(EventResponse::Stop(Action::OpenPopup(
                PopupKind::RegistrationModal,
            )))),
            _ => {
                let changed = self.focused_field().handle_key(key);
                if changed {
                    let (id, value) = if self.focus_password {
                        ("password", self.password.value().to_string())
                    } else {
                        ("username", self.username.value().to_string())
                    };
                    self.prompt.handle_field_changed(id, value);
                    // Edits want a redraw but other shortcuts may still apply.
                    return Ok(Some(EventResponse::Continue(Action::Render)));
                }
                Ok(None)
            }
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if matches!(action, Action::Tick | Action::Render) {
            self.drain_prompt_events();
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let bg = Block::default().style(ratatui::style::Style::default().bg(self.theme.roles.background));
        frame.render_widget(bg, area);

        let horizontal = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(50),
            Constraint::Fill(1),
        ])
        .split(area);
        let vertical = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1), // Title
            Constraint::Length(1),
            Constraint::Length(2), // Banner
            Constraint::Length(3), // Username
            Constraint::Length(1),
            Constraint::Length(3), // Password
            Constraint::Length(1),
            Constraint::Length(1), // Hint
            Constraint::Fill(1),
        ]);
        let [_, title, _, banner, username, _, password, _, hint, _] =
            vertical.areas(horizontal[1]);

        frame.render_widget(
            Paragraph::new(translate("login.title"))
                .centered()
                .style(self.theme.style(Role::Primary)),
            title,
        );
        if let Some((message, role)) = &self.banner {
            frame.render_widget(
                Paragraph::new(message.as_str())
                    .centered()
                    .style(self.theme.style(*role)),
                banner,
            );
        }
        self.username.render(
            frame,
            username,
            !self.focus_password,
            &self.theme,
            self.prompt.field_state("username"),
        );
        self.password.render(
            frame,
            password,
            self.focus_password,
            &self.theme,
            self.prompt.field_state("password"),
        );
        frame.render_widget(
            Paragraph::new(translate("login.register_hint"))
                .centered()
                .style(self.theme.style(Role::SubtleText)),
            hint,
        );
        Ok(())
    }
}
