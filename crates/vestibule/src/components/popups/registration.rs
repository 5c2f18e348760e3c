use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use futures::FutureExt;
use prompt::{
    Feedback, FieldDef, FormHooks, FormPrompt, NavLocks, PromptConfig, PromptEvent, SubmitFuture,
    route_by_field_ids,
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
use crate::locale::translate;
use crate::style::{Role, Theme};
use crate::tui::EventResponse;
use crate::validate;

/// Shared hook set for both registration variants.
///
/// The confirm rule compares against a mirror of the password field that the
/// hosting component keeps current, since rules only see their own value.
pub(crate) struct RegistrationHooks {
    accounts: AccountStore,
    password_mirror: Arc<RwLock<String>>,
    gate_on_availability: bool,
    with_referral: bool,
}

impl RegistrationHooks {
    pub(crate) fn new(
        accounts: AccountStore,
        password_mirror: Arc<RwLock<String>>,
        gate_on_availability: bool,
        with_referral: bool,
    ) -> Self {
        Self {
            accounts,
            password_mirror,
            gate_on_availability,
            with_referral,
        }
    }
}

impl FormHooks for RegistrationHooks {
    fn fields(&self) -> Vec<FieldDef> {
        let accounts = self.accounts.clone();
        let mut username = FieldDef::new("username", validate::username_rule).availability(
            move |value: String| {
                let accounts = accounts.clone();
                async move { accounts.is_username_available(value.trim()).unwrap_or(false) }
                    .boxed()
            },
            translate("registration.registration_username_taken"),
        );
        if !self.gate_on_availability {
            username = username.advisory();
        }

        let mirror = self.password_mirror.clone();
        let confirm_rule = move |value: &str| {
            let expected = mirror.read().map(|g| g.clone()).unwrap_or_default();
            if value == expected {
                Ok(())
            } else {
                Err(translate(
                    "registration.registration_validation_password_confirm_mismatch",
                ))
            }
        };

        let mut fields = vec![
            username,
            FieldDef::new("password", validate::registration_password_rule),
            FieldDef::new("password_confirm", confirm_rule),
        ];
        if self.with_referral {
            // Optional field, any content accepted.
            fields.push(FieldDef::new("referral", |_: &str| Ok(())));
        }
        fields
    }

    fn submit(&mut self, values: &HashMap<String, String>) -> SubmitFuture {
        let accounts = self.accounts.clone();
        let username = values.get("username").cloned().unwrap_or_default();
        let password = values.get("password").cloned().unwrap_or_default();
        let referral = values.get("referral").cloned().unwrap_or_default();
        Box::pin(async move {
            match accounts.register(username.trim(), &password) {
                Ok(account) => Ok(serde_json::json!({
                    "username": account.username,
                    "referral": referral,
                })),
                Err(err) => Err(err.to_string()),
            }
        })
    }

    fn route_error(&self, message: &str) -> Option<String> {
        route_by_field_ids(message, &["username", "password"])
    }
}

/// Full registration form: username, password, confirmation and an optional
/// friend referral code. The availability check is advisory here, it does
/// not block submission while unresolved.
pub struct RegistrationPopup {
    tx: Option<UnboundedSender<Action>>,
    theme: Theme,
    prompt: FormPrompt,
    events: UnboundedReceiver<PromptEvent>,
    password_mirror: Arc<RwLock<String>>,
    fields: [TextField; 4],
    focus: usize,
    banner: Option<(String, Role)>,
}

impl RegistrationPopup {
    pub fn new(accounts: AccountStore, locks: NavLocks, feedback: Arc<dyn Feedback>) -> Self {
        let (event_tx, events) = unbounded_channel();
        let password_mirror = Arc::new(RwLock::new(String::new()));
        let hooks = RegistrationHooks::new(accounts, password_mirror.clone(), false, true);
        let prompt = FormPrompt::new(
            Box::new(hooks),
            PromptConfig::new("registration"),
            locks,
            feedback,
            event_tx,
        );
        Self {
            tx: None,
            theme: crate::style::default_dark_theme(),
            prompt,
            events,
            password_mirror,
            fields: [
                TextField::new("username", "registration.username_label"),
                TextField::new("password", "registration.password_label").masked(),
                TextField::new("password_confirm", "registration.password_confirm_label").masked(),
                TextField::new("referral", "registration.referral_label"),
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
                    self.banner = Some((translate("registration.success"), Role::Success));
                }
                PromptEvent::Failed(message) => {
                    self.banner = Some((message, Role::Danger));
                }
                PromptEvent::ReturnedToEditing(_) => {
                    self.banner = None;
                }
                PromptEvent::Completed(payload) => {
                    // Fresh accounts go straight into a session.
                    if let Some(username) = payload.get("username").and_then(|v| v.as_str()) {
                        self.send(Action::LoggedIn(username.to_string()));
                    }
                    self.send(Action::ClosePopup);
                }
            }
        }
    }
}

impl Component for RegistrationPopup {
    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.tx = Some(tx);
        Ok(())
    }

    fn register_theme(&mut self, theme: Theme) -> Result<()> {
        self.theme = theme;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "registration"
    }

    fn popup_min_size(&self) -> Option<(u16, u16)> {
        Some((54, 22))
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        match key.code {
            KeyCode::Esc => {
                if self.prompt.cancel() {
                    self.send(Action::ClosePopup);
                }
                Ok(Some(EventResponse::Stop(Action::Render)))
            }
            KeyCode::Enter => {
                self.prompt.attempt_submit();
                Ok(Some(EventResponse::Stop(Action::Render)))
            }
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
            Constraint::Length(1),
            Constraint::Length(3), // Referral
            Constraint::Length(1), // Hint
        ]);
        let [banner, username, _, password, _, confirm, _, referral, hint] = vertical.areas(inner);

        if let Some((message, role)) = &self.banner {
            frame.render_widget(
                Paragraph::new(message.as_str())
                    .centered()
                    .style(self.theme.style(*role)),
                banner,
            );
        }
        for (index, area) in [username, password, confirm, referral].into_iter().enumerate() {
            let field = &self.fields[index];
            field.render(
                frame,
                area,
                index == self.focus,
                &self.theme,
                self.prompt.field_state(field.id),
            );
        }
        let hint_text = if self.prompt.is_submitting() {
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
