use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use prompt::{Feedback, NavLocks};
use ratatui::{Frame, prelude::Rect};
use session::{AccountStore, GiftCodeLedger};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, error, info};

use crate::action::{Action, PopupKind};
use crate::components::Component;
use crate::components::home::HomePage;
use crate::components::login::LoginPage;
use crate::components::popups::change_username::ChangeUsernamePopup;
use crate::components::popups::gift_code::GiftCodePopup;
use crate::components::popups::registration::RegistrationPopup;
use crate::components::popups::registration_modal::RegistrationModalPopup;
use crate::components::popups::{centered_rect_fixed, render_backdrop};
use crate::sfx::Sfx;
use crate::shell::Shell;
use crate::style::Theme;
use crate::tui::{Event, EventResponse, Tui};

const HOME_PAGE: usize = 1;

pub struct App {
    theme: Theme,
    accounts: AccountStore,
    ledger: GiftCodeLedger,
    locks: NavLocks,
    feedback: Arc<dyn Feedback>,
    shell: Shell,
    pages: Vec<Box<dyn Component>>,
    active_page: usize,
    session_user: Option<String>,
    should_quit: bool,
    should_suspend: bool,
}

impl App {
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        info!(?data_dir, "starting vestibule");
        let locks = NavLocks::default();
        let feedback: Arc<dyn Feedback> = Arc::new(Sfx);
        let accounts = AccountStore::new(&data_dir);
        let ledger = GiftCodeLedger::new(&data_dir);
        let theme = crate::style::default_dark_theme();

        let pages: Vec<Box<dyn Component>> = vec![
            Box::new(LoginPage::new(
                accounts.clone(),
                locks.clone(),
                feedback.clone(),
            )),
            Box::new(HomePage::new()),
        ];

        Ok(Self {
            theme,
            accounts,
            ledger,
            locks: locks.clone(),
            feedback,
            shell: Shell::new(locks),
            pages,
            active_page: 0,
            session_user: None,
            should_quit: false,
            should_suspend: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

        let mut tui = Tui::new()?;
        tui.enter()?;
        for page in self.pages.iter_mut() {
            page.register_action_handler(action_tx.clone())?;
            page.register_theme(self.theme.clone())?;
        }

        loop {
            if let Some(e) = tui.next().await {
                let mut stop_event_propagation = self
                    .shell
                    .popup_mut()
                    .and_then(|popup| popup.handle_events(Some(e.clone())).ok())
                    .map(|response| match response {
                        Some(EventResponse::Continue(action)) => {
                            action_tx.send(action).ok();
                            false
                        }
                        Some(EventResponse::Stop(action)) => {
                            action_tx.send(action).ok();
                            true
                        }
                        _ => false,
                    })
                    .unwrap_or(false);
                // Keys never fall through an open popup onto the page below.
                if self.shell.is_popup_open() && matches!(e, Event::Key(_)) {
                    stop_event_propagation = true;
                }

                if !stop_event_propagation {
                    stop_event_propagation = self
                        .pages
                        .get_mut(self.active_page)
                        .and_then(|page| page.handle_events(Some(e.clone())).ok())
                        .map(|response| match response {
                            Some(EventResponse::Continue(action)) => {
                                action_tx.send(action).ok();
                                false
                            }
                            Some(EventResponse::Stop(action)) => {
                                action_tx.send(action).ok();
                                true
                            }
                            _ => false,
                        })
                        .unwrap_or(false);
                }

                if !stop_event_propagation {
                    match e {
                        Event::Quit => {
                            action_tx.send(Action::Quit).ok();
                        }
                        Event::Tick => {
                            action_tx.send(Action::Tick).ok();
                        }
                        Event::Render => {
                            action_tx.send(Action::Render).ok();
                        }
                        Event::Resize(x, y) => {
                            action_tx.send(Action::Resize(x, y)).ok();
                        }
                        Event::Key(key)
                            if key.code == KeyCode::Char('z')
                                && key.modifiers.contains(KeyModifiers::CONTROL) =>
                        {
                            action_tx.send(Action::Suspend).ok();
                        }
                        _ => {}
                    }
                }
            }

            while let Ok(action) = action_rx.try_recv() {
                match action {
                    Action::Tick | Action::Render => {}
                    ref other => debug!("{other}"),
                }
                match &action {
                    Action::Quit => {
                        if self.shell.allows_user_navigation() {
                            self.should_quit = true;
                        } else {
                            debug!("quit suppressed while navigation is locked");
                        }
                    }
                    Action::Suspend => self.should_suspend = true,
                    Action::Resume => self.should_suspend = false,
                    Action::Resize(w, h) => {
                        tui.resize(Rect::new(0, 0, *w, *h))?;
                        tui.draw(|f| {
                            self.render(f).unwrap_or_else(|err| {
                                action_tx
                                    .send(Action::Error(format!("Failed to draw: {:?}", err)))
                                    .ok();
                            })
                        })?;
                    }
                    Action::Render => {
                        tui.draw(|f| {
                            self.render(f).unwrap_or_else(|err| {
                                action_tx
                                    .send(Action::Error(format!("Failed to draw: {:?}", err)))
                                    .ok();
                            })
                        })?;
                    }
                    Action::OpenPopup(kind) => {
                        if let Some(popup) = self.build_popup(*kind, &action_tx)? {
                            self.shell.open(popup);
                        }
                    }
                    Action::ClosePopup => self.shell.close(),
                    Action::LoggedIn(username) => {
                        self.session_user = Some(username.clone());
                        action_tx.send(Action::Navigate(HOME_PAGE)).ok();
                    }
                    Action::UsernameChanged(username) => {
                        self.session_user = Some(username.clone());
                    }
                    Action::Navigate(page) => self.active_page = *page,
                    Action::Error(message) => error!(message),
                    _ => {}
                }

                if let Some(popup) = self.shell.popup_mut() {
                    if let Some(next) = popup.update(action.clone())? {
                        action_tx.send(next).ok();
                    }
                }
                // Every page sees the action; session changes matter to pages
                // that are not currently active.
                for page in self.pages.iter_mut() {
                    if let Some(next) = page.update(action.clone())? {
                        action_tx.send(next).ok();
                    }
                }
            }

            if self.should_suspend {
                tui.suspend()?;
                action_tx.send(Action::Resume).ok();
                tui = Tui::new()?;
                tui.enter()?;
            } else if self.should_quit {
                tui.stop()?;
                break;
            }
        }
        tui.exit()?;
        Ok(())
    }

    fn build_popup(
        &self,
        kind: PopupKind,
        action_tx: &UnboundedSender<Action>,
    ) -> Result<Option<Box<dyn Component>>> {
        let mut popup: Box<dyn Component> = match kind {
            PopupKind::Registration => Box::new(RegistrationPopup::new(
                self.accounts.clone(),
                self.locks.clone(),
                self.feedback.clone(),
            )),
            PopupKind::RegistrationModal => Box::new(RegistrationModalPopup::new(
                self.accounts.clone(),
                self.locks.clone(),
                self.feedback.clone(),
            )),
            PopupKind::GiftCode => {
                let Some(user) = &self.session_user else {
                    return Ok(None);
                };
                Box::new(GiftCodePopup::new(
                    self.ledger.clone(),
                    user.clone(),
                    self.locks.clone(),
                    self.feedback.clone(),
                ))
            }
            PopupKind::ChangeUsername => {
                let Some(user) = &self.session_user else {
                    return Ok(None);
                };
                Box::new(ChangeUsernamePopup::new(
                    self.accounts.clone(),
                    user.clone(),
                    self.locks.clone(),
                    self.feedback.clone(),
                ))
            }
        };
        popup.register_action_handler(action_tx.clone())?;
        popup.register_theme(self.theme.clone())?;
        Ok(Some(popup))
    }

    fn render(&mut self, frame: &mut Frame<'_>) -> Result<()> {
        let area = frame.area();
        if let Some(page) = self.pages.get_mut(self.active_page) {
            page.draw(frame, area)?;
        }
        let theme = self.theme.clone();
        if let Some(popup) = self.shell.popup_mut() {
            render_backdrop(frame, area, &theme);
            let (min_w, min_h) = popup.popup_min_size().unwrap_or((60, 10));
            let w = min_w.min(area.width);
            let h = min_h.min(area.height);
            let dialog = centered_rect_fixed(area, w, h);
            popup.draw(frame, dialog)?;
        }
        Ok(())
    }
}
