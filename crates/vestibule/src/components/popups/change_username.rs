use std::collections::HashMap;
use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use futures::FutureExt;
use prompt::{
    DialogDirective, DialogPrompt, Feedback, FieldDef, FormHooks, FormPrompt, NavLocks,
    PromptConfig, PromptEvent, SubmitFuture, route_by_field_ids,
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
use crate::shell::Shell;
use crate::style::{Role, Theme};
use crate::tui::EventResponse;
use crate::validate;

struct ChangeUsernameHooks {
    accounts: AccountStore,
    current: String,
}

impl FormHooks for ChangeUsernameHooks {
    fn fields(&self) -> Vec<FieldDef> {
        let current = self.current.clone();
        let accounts = self.accounts.clone();
        vec![
            FieldDef::new("username", move |value: &str| {
                validate::username_rule(value)?;
                if value.trim().eq_ignore_ascii_case(&current) {
                    return Err(translate("change_username.change_username_same_username"));
                }
                Ok(())
            })
            .availability(
                move |value: String| {
                    let accounts = accounts.clone();
                    async move { accounts.is_username_available(value.trim()).unwrap_or(false) }
                        .boxed()
                },
                translate("change_username.change_username_taken"),
            ),
        ]
    }

    fn submit(&mut self, values: &HashMap<String, String>) -> SubmitFuture {
        let accounts = self.accounts.clone();
        let current = self.current.clone();
        let new_username = values.get("username").cloned().unwrap_or_default();
        Box::pin(async move {
            match accounts.change_username(&current, new_username.trim()) {
                Ok(account) => Ok(serde_json::json!({ "username": account.username })),
                Err(err) => Err(err.to_string()),
            }
        })
    }

    fn route_error(&self, message: &str) -> Option<String> {
        route_by_field_ids(message, &["username"])
    }
}

/// Change-username dialog. Auto-focused on open, closes itself on success.
pub struct ChangeUsernamePopup {
    tx: Option<UnboundedSender<Action>>,
    theme: Theme,
    prompt: DialogPrompt,
    events: UnboundedReceiver<PromptEvent>,
    field: TextField,
    banner: Option<(String, Role)>,
}

impl ChangeUsernamePopup {
    pub fn new(
        accounts: AccountStore,
        current: String,
        locks: NavLocks,
        feedback: Arc<dyn Feedback>,
    ) -> Self {
        let (event_tx, events) = unbounded_channel();
        let inner = FormPrompt::new(
            Box::new(ChangeUsernameHooks { accounts, current }),
            PromptConfig::new("change_username"),
            locks,
            feedback,
            event_tx,
        );
        Self {
            tx: None,
            theme: crate::style::default_dark_theme(),
            prompt: DialogPrompt::new(inner),
            events,
            field: TextField::new("username", "change_username.username_label"),
            banner: None,
        }
    }

    fn send(&self, action: Action) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(action);
        }
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
                    self.banner = Some((translate("change_username.success"), Role::Success));
                }
                PromptEvent::Failed(message) => {
                    self.banner = Some((message, Role::Danger));
                }
                PromptEvent::ReturnedToEditing(_) => {
                    self.banner = None;
                }
                PromptEvent::Completed(payload) => {
                    if let Some(username) = payload.get("username").and_then(|v| v.as_str()) {
                        self.send(Action::UsernameChanged(username.to_string()));
                    }
                }
                _ => {}
            }
        }
    }
}

impl Component for ChangeUsernamePopup {
    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.tx = Some(tx);
        Ok(())
    }

    fn register_theme(&mut self, theme: Theme) -> Result<()> {
        self.theme = theme;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "change_username"
    }

    fn popup_min_size(&self) -> Option<(u16, u16)> {
        Some((54, 11))
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        if let Some(signal) = Shell::signal_for_key(&key) {
            if let Some(DialogDirective::Close) = self.prompt.on_shell_signal(signal) {
                self.send(Action::ClosePopup);
            }
            return Ok(Some(EventResponse::Stop(Action::Render)));
        }
        if key.code == KeyCode::Tab || key.code == KeyCode::BackTab {
            self.prompt.handle_field_blurred("username");
            return Ok(Some(EventResponse::Stop(Action::Render)));
        }
        if self.field.handle_key(key) {
            let value = self.field.value().to_string();
            self.prompt.handle_field_changed("username", value);
        }
        Ok(Some(EventResponse::Stop(Action::Render)))
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if matches!(action, Action::Tick | Action::Render) {
            self.drain_prompt_events();
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let inner = draw_popup_frame(frame, area, translate("change_username.title"), &self.theme);
        let vertical = Layout::vertical([
            Constraint::Length(2), // Banner
            Constraint::Length(3), // Username input
            Constraint::Length(1),
            Constraint::Length(1), // Hint
        ]);
        let [banner, field, _, hint] = vertical.areas(inner);

        if let Some((message, role)) = &self.banner {
            frame.render_widget(
                Paragraph::new(message.as_str())
                    .centered()
                    .style(self.theme.style(*role)),
                banner,
            );
        }
        self.field.render(
            frame,
            field,
            true,
            &self.theme,
            self.prompt.field_state("username"),
        );
        let hint_text = if self.prompt.cancel_hidden() {
            "enter submit"
        } else {
            "enter submit · esc cancel"
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
