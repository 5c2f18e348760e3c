use std::sync::{Arc, RwLock};

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use prompt::{
    DialogDirective, DialogPrompt, Feedback, FormPrompt, NavLocks, PromptConfig, PromptEvent,
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    widgets::Paragraph,
};
use session::AccountStore;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::action::Action;
use crate::components::Component;
use crate::components::fields::TextField;
use crate::components::popups::draw_popup_frame;
use crate::components::popups::registration::RegistrationHooks;
use crate::locale::translate;
use crate::shell::Shell;
use crate::style::{Role, Theme};
use crate::tui::EventResponse;

/// Compact registration modal: no referral field, and the username
/// availability check gates validity, an unresolved check blocks submission.
pub struct RegistrationModalPopup {
    tx: Option<UnboundedSender<Action>>,
    theme: Theme,
    prompt: DialogPrompt,
    events: UnboundedReceiver<PromptEvent>,
    password_mirror: Arc<RwLock<String>>,
    fields: [TextField; 3],
    focus: usize,
    banner: Option<(String, Role)>,
}

impl RegistrationModalPopup {
    pub fn new(accounts: AccountStore, locks: NavLocks, feedback: Arc<dyn Feedback>) -> Self {
        let (event_tx, events) = unbounded_channel();
        let password_mirror = Arc::new(RwLock::new(String::new()));
        let hooks = RegistrationHooks::new(accounts, password_mirror.clone(), true, false);
        let inner = FormPrompt::new(
            Box::new(hooks),
            PromptConfig::new("registration_modal"),
            locks,
            feedback,
            event_tx,
        );
        Self {
            tx: None,
            theme: crate::style::default_dark_theme(),
            prompt: DialogPrompt::new(inner),
            events,
            password_mirror,
            fields: [
                TextField::new("username", "registration.username_label"),
                TextField::new("password", "registration.password_label").masked(),
                TextField::new("password_confirm", "registration.password_confirm_label").masked(),
            ],
            focus: 0,
            banner: None,
        }
    }

    fn send(&self, action: Action) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(action);
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let blurred = self.fields[self.focus].id;
        self.prompt.handle_field_blurred(blurred);
        let len = self.fields.len();
        self.focus = if forward {
            (self.focus + 1) % len
        } else {
            (self.focus + len - 1) % len
        };
    }

    fn drain_prompt_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            if let PromptEvent::Wake(msg) = event {
                self.prompt.wake(msg);
                continue;
            }
            if let Some(DialogDirective::Close) = self.prompt.observe(&event) {
                self.send(Action::ClosePopup);
            }
            match event {
                PromptEvent::SubmittingStarted => {
                    self.banner = Some((translate("form.submitting"), Role::Info));
                }
                PromptEvent::SubmitBusy => {
                    self.banner = Some((translate("form.busy"), Role::Warning));
                }
                PromptEvent::Succeeded => {
                    self.banner = Some((translate("registration.success"), Role::Success));
                }
                PromptEvent::Failed(message) => {
                    self.banner = Some((message, Role::Danger));
                }
                PromptEvent::ReturnedToEditing(_) => {
                    self.banner = None;
                }
                PromptEvent::Completed(payload) => {
                    if let Some(username) = payload.get("username").and_then(|v| v.as_str()) {
                        self.send(Action::LoggedIn(username.to_string()));
                    }
                }
                _ => {}
            }
        }
    }
}

impl Component for RegistrationModalPopup {
    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.tx = Some(tx);
        Ok(())
    }

    fn register_theme(&mut self, theme: Theme) -> Result<()> {
        self.theme = theme;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "registration_modal"
    }

    fn popup_min_size(&self) -> Option<(u16, u16)> {
        Some((54, 18))
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        if let Some(signal) = Shell::signal_for_key(&key) {
            if let Some(DialogDirective::Close) = self.prompt.on_shell_signal(signal) {
                self.send(Action::ClosePopup);
            }
            return Ok(Some(EventResponse::Stop(Action::Render)));
        }
        match key.code {
            KeyCode::Tab => {
                self.move_focus(true);
                Ok(Some(EventResponse::Stop(Action::Render)))
            }
            KeyCode::BackTab => {
                self.move_focus(false);
                Ok(Some(EventResponse::Stop(Action::Render)))
            }
            _ => {
                if self.fields[self.focus].handle_key(key) {
                    let id = self.fields[self.focus].id;
                    let value = self.fields[self.focus].value().to_string();
                    if id == "password" {
                        if let Ok(mut mirror) = self.password_mirror.write() {
                            *mirror = value.clone();
                        }
                    }
                    self.prompt.handle_field_changed(id, value);
                }
                Ok(Some(EventResponse::Stop(Action::Render)))
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
        let inner = draw_popup_frame(frame, area, translate("registration.title"), &self.theme);
        let vertical = Layout::vertical([
            Constraint::Length(2), // Banner
            Constraint::Length(3), // Username
            Constraint::Length(1),
            Constraint::Length(3), // Password
            Constraint::Length(1),
            Constraint::Length(3), // Confirm
            Constraint::Length(1), // Hint
        ]);
        let [banner, username, _, password, _, confirm, hint] = vertical.areas(inner);

        if let Some((message, role)) = &self.banner {
            frame.render_widget(
                Paragraph::new(message.as_str())
                    .centered()
                    .style(self.theme.style(*role)),
                banner,
            );
        }
        for (index, area) in [username, password, confirm].into_iter().enumerate() {
            let field = &self.fields[index];
            field.render(
                frame,
                area,
                index == self.focus,
                &self.theme,
                self.prompt.field_state(field.id),
            );
        }
        let hint_text = if self.prompt.cancel_hidden() {
            "enter submit"
        } else {
            "enter submit · esc cancel · tab next field"
        };
        frame.render_widget(
            Paragraph::new(hint_text)
                .centered()
                .style(self.theme.style(Role::SubtleText)),
            hint,
        );
        Ok(())
    }
}
