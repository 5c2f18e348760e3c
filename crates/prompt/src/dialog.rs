use std::ops::{Deref, DerefMut};

use crate::feedback::{CANCEL_SFX_PRIORITY, EffectKind};
use crate::lifecycle::{FormPrompt, PromptEvent};
use crate::state::PromptState;

/// Shell broadcasts a dialog listens to while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellSignal {
    /// The user tried to back out (Esc, cancel key).
    AttemptCancel,
    /// The user tried to confirm (Enter, confirm key).
    AttemptConfirm,
}

/// Instruction for the hosting navigation shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogDirective {
    /// Tear the dialog down.
    Close,
}

/// Dialog behavior layered over the base lifecycle by composition.
///
/// Adds what a modal dialog needs on top of [`FormPrompt`]: shell cancel and
/// confirm broadcasts are mapped onto the lifecycle, the cancel affordance is
/// hidden while submitting and restored when an error resolution re-enables
/// the form, and a successful completion asks the shell to close the dialog.
///
/// Derefs to the wrapped [`FormPrompt`], so field events and accessors are
/// used directly.
pub struct DialogPrompt {
    inner: FormPrompt,
    cancel_hidden: bool,
}

impl DialogPrompt {
    pub fn new(inner: FormPrompt) -> Self {
        Self {
            inner,
            cancel_hidden: false,
        }
    }

    /// Whether the cancel affordance should currently be hidden.
    pub fn cancel_hidden(&self) -> bool {
        self.cancel_hidden
    }

    /// React to a shell broadcast.
    pub fn on_shell_signal(&mut self, signal: ShellSignal) -> Option<DialogDirective> {
        match signal {
            ShellSignal::AttemptCancel => self.cancel(),
            ShellSignal::AttemptConfirm => {
                self.inner.attempt_submit();
                None
            }
        }
    }

    /// Cancel request (button or shell broadcast). Ignored while submitting
    /// and during the success display, so the completion payload still
    /// reaches the host before the dialog closes.
    pub fn cancel(&mut self) -> Option<DialogDirective> {
        if matches!(
            self.inner.state(),
            PromptState::Submitting | PromptState::Success
        ) {
            return None;
        }
        self.inner
            .feedback()
            .play_effect(EffectKind::Cancel, CANCEL_SFX_PRIORITY);
        Some(DialogDirective::Close)
    }

    /// Observe a lifecycle event flowing to the host and derive dialog
    /// directives from it. The host still handles the event itself.
    pub fn observe(&mut self, event: &PromptEvent) -> Option<DialogDirective> {
        match event {
            PromptEvent::SubmittingStarted => {
                self.cancel_hidden = true;
                None
            }
            PromptEvent::ReturnedToEditing(_) => {
                self.cancel_hidden = false;
                None
            }
            PromptEvent::Completed(_) => Some(DialogDirective::Close),
            _ => None,
        }
    }
}

impl Deref for DialogPrompt {
    type Target = FormPrompt;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for DialogPrompt {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
