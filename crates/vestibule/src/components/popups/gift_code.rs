use std::collections::HashMap;
use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use prompt::{
    DialogDirective, DialogPrompt, Feedback, FieldDef, FormHooks, FormPrompt, NavLocks,
    PromptConfig, PromptEvent, SubmitFuture,
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    widgets::Paragraph,
};
use session::{GiftCodeLedger, GiftCodeRequest};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::action::Action;
use crate::components::Component;
use crate::components::fields::TextField;
use crate::components::popups::draw_popup_frame;
use crate::locale::translate;
use crate::shell::Shell;
use crate::style::{Role, Theme};
use crate::tui::EventResponse;

struct GiftCodeHooks {
    ledger: GiftCodeLedger,
    username: String,
}

impl FormHooks for GiftCodeHooks {
    fn fields(&self) -> Vec<FieldDef> {
        vec![FieldDef::new("gift_code", crate::validate::gift_code_rule)]
    }

    fn submit(&mut self, values: &HashMap<String, String>) -> SubmitFuture {
        let ledger = self.ledger.clone();
        let username = self.username.clone();
        let request = GiftCodeRequest {
            gift_code: values.get("gift_code").cloned().unwrap_or_default(),
        };
        Box::pin(async move {
            match ledger.redeem(&request, &username) {
                Ok(response) => Ok(serde_json::to_value(response).unwrap_or_default()),
                Err(err) => Err(err.to_string()),
            }
        })
    }

    /// Redemption failures always concern the entered code.
    fn route_error(&self, _message: &str) -> Option<String> {
        Some("gift_code".into())
    }
}

/// Gift-code redemption dialog.
pub struct GiftCodePopup {
    tx: Option<UnboundedSender<Action>>,
    theme: Theme,
    prompt: DialogPrompt,
    events: UnboundedReceiver<PromptEvent>,
    field: TextField,
    banner: Option<(String, Role)>,
}

impl GiftCodePopup {
    pub fn new(
        ledger: GiftCodeLedger,
        username: String,
        locks: NavLocks,
        feedback: Arc<dyn Feedback>,
    ) -> Self {
        let (event_tx, events) = unbounded_channel();
        let inner = FormPrompt::new(
            Box::new(GiftCodeHooks { ledger, username }),
            PromptConfig::new("gift_code"),
            locks,
            feedback,
            event_tx,
        );
        Self {
            tx: None,
            theme: crate::style::default_dark_theme(),
            prompt: DialogPrompt::new(inner),
            events,
            field: TextField::new("gift_code", "gift_code.gift_code_label"),
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
                    self.banner = Some((translate("gift_code.success"), Role::Success));
                }
                PromptEvent::Failed(message) => {
                    self.banner = Some((message, Role::Danger));
                }
                PromptEvent::ReturnedToEditing(_) => {
                    self.banner = None;
                }
                _ => {}
            }
        }
    }
}

impl Component for GiftCodePopup {
    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.tx = Some(tx);
        Ok(())
    }

    fn register_theme(&mut self, theme: Theme) -> Result<()> {
        self.theme = theme;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "gift_code"
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
            self.prompt.handle_field_blurred("gift_code");
            return Ok(Some(EventResponse::Stop(Action::Render)));
        }
        if self.field.handle_key(key) {
            let value = self.field.value().to_string();
            self.prompt.handle_field_changed("gift_code", value);
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
        let inner = draw_popup_frame(frame, area, translate("gift_code.title"), &self.theme);
        let vertical = Layout::vertical([
            Constraint::Length(2), // Banner
            Constraint::Length(3), // Code input
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
            self.prompt.field_state("gift_code"),
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
