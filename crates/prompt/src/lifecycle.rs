/*!
The form prompt lifecycle state machine.

A [`FormPrompt`] drives one form through `Editing -> Submitting ->
Success/Error` and back. All asynchronous work it starts (debounce timer,
availability checks, the submit action, the success/error display timers)
re-enters the machine as a [`WakeMsg`] sent over the prompt's event channel.
The hosting view routes those back via [`FormPrompt::wake`], exactly like
background task completions re-enter the main loop as actions elsewhere in
the client.

Every scheduled piece of work captures the prompt's generation counter at
schedule time. [`FormPrompt::dispose`] bumps the generation, so anything that
already fired but has not been processed yet is discarded on arrival. Display
timers are additionally aborted outright.
*/

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::debounce::{DEFAULT_DEBOUNCE, Debouncer};
use crate::feedback::{
    CANCEL_SFX_PRIORITY, CONFIRM_SFX_PRIORITY, ERROR_SFX_PRIORITY, EffectKind, Feedback,
};
use crate::field::{FieldState, RemoteStatus};
use crate::hooks::{FieldDef, FormHooks};
use crate::navlock::NavLocks;
use crate::state::PromptState;

/// Timing and identity configuration for one prompt.
#[derive(Debug, Clone)]
pub struct PromptConfig {
    /// Navigation lock owner key, unique per form class.
    pub owner_key: String,
    /// Quiet period after the last keystroke before re-validation.
    pub debounce: Duration,
    /// How long the success message stays on screen.
    pub success_duration: Duration,
    /// Error display window for short messages.
    pub error_duration: Duration,
    /// Error display window for messages longer than `long_error_threshold`.
    pub error_duration_long: Duration,
    /// Message length (in characters) above which the long window applies.
    pub long_error_threshold: usize,
}

impl PromptConfig {
    pub fn new(owner_key: impl Into<String>) -> Self {
        Self {
            owner_key: owner_key.into(),
            debounce: DEFAULT_DEBOUNCE,
            success_duration: Duration::from_secs(3),
            error_duration: Duration::from_secs(3),
            error_duration_long: Duration::from_secs(10),
            long_error_threshold: 30,
        }
    }
}

/// Deferred work re-entering the state machine.
///
/// Hosts receive these wrapped in [`PromptEvent::Wake`] and must feed them
/// back through [`FormPrompt::wake`].
#[derive(Debug, Clone)]
pub enum WakeMsg {
    DebounceElapsed {
        generation: u64,
    },
    AvailabilityResolved {
        generation: u64,
        field: String,
        value: String,
        available: bool,
    },
    SubmitSettled {
        generation: u64,
        result: Result<Value, String>,
    },
    SuccessDisplayElapsed {
        generation: u64,
    },
    ErrorDisplayElapsed {
        generation: u64,
        message: String,
    },
}

/// Events emitted by the lifecycle for the hosting view.
#[derive(Debug, Clone)]
pub enum PromptEvent {
    /// Deferred work; route back via [`FormPrompt::wake`].
    Wake(WakeMsg),
    /// Submit requested while already submitting; no state change happened.
    SubmitBusy,
    /// Submit requested while the form is invalid; no state change happened.
    SubmitRejected,
    /// The form entered `Submitting` and the submit action was started.
    SubmittingStarted,
    /// The submit action resolved; the success message is now displayed.
    Succeeded,
    /// The submit action rejected; the error message is now displayed.
    Failed(String),
    /// Success display finished; the flow is over and the view may close.
    Completed(Value),
    /// Error display finished; the form is editable again.
    ReturnedToEditing(String),
    /// A validation pass changed displayed field state; re-render.
    FieldsUpdated,
}

struct FieldSlot {
    def: FieldDef,
    value: String,
    state: FieldState,
}

/// The submit/success/error state machine shared by every account form.
pub struct FormPrompt {
    hooks: Box<dyn FormHooks>,
    config: PromptConfig,
    locks: NavLocks,
    feedback: Arc<dyn Feedback>,
    tx: UnboundedSender<PromptEvent>,

    state: PromptState,
    fields: Vec<FieldSlot>,
    form_error: Option<String>,
    success_payload: Option<Value>,

    debouncer: Debouncer,
    success_timer: Option<JoinHandle<()>>,
    error_timer: Option<JoinHandle<()>>,

    generation: u64,
    holding_lock: bool,
    disposed: bool,
}

impl FormPrompt {
    pub fn new(
        hooks: Box<dyn FormHooks>,
        config: PromptConfig,
        locks: NavLocks,
        feedback: Arc<dyn Feedback>,
        tx: UnboundedSender<PromptEvent>,
    ) -> Self {
        let fields = hooks
            .fields()
            .into_iter()
            .map(|def| FieldSlot {
                def,
                value: String::new(),
                state: FieldState::default(),
            })
            .collect();
        let debouncer = Debouncer::new(config.debounce);
        Self {
            hooks,
            config,
            locks,
            feedback,
            tx,
            state: PromptState::Editing,
            fields,
            form_error: None,
            success_payload: None,
            debouncer,
            success_timer: None,
            error_timer: None,
            generation: 0,
            holding_lock: false,
            disposed: false,
        }
    }

    // --- Accessors -----------------------------------------------------------------------------

    pub fn state(&self) -> PromptState {
        self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == PromptState::Submitting
    }

    /// Form-level error message, present while in the `Error` state.
    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn field_state(&self, id: &str) -> Option<&FieldState> {
        self.slot(id).map(|slot| &slot.state)
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.slot(id).map(|slot| slot.value.as_str())
    }

    /// Snapshot of all current field values.
    pub fn values(&self) -> HashMap<String, String> {
        self.fields
            .iter()
            .map(|slot| (slot.def.id.clone(), slot.value.clone()))
            .collect()
    }

    pub(crate) fn feedback(&self) -> &Arc<dyn Feedback> {
        &self.feedback
    }

    // --- Input events --------------------------------------------------------------------------

    /// The user changed a field. Marks it modified, drops any availability
    /// result tied to the previous input, and schedules a debounced
    /// validation pass. Ignored outside `Editing`: the form stays disabled
    /// through the submit and the success/error display windows.
    pub fn handle_field_changed(&mut self, id: &str, value: impl Into<String>) {
        if self.disposed || self.state != PromptState::Editing {
            return;
        }
        let Some(slot) = self.slot_mut(id) else {
            return;
        };
        slot.value = value.into();
        slot.state.modified = true;
        slot.state.remote = RemoteStatus::Idle;
        slot.state.message = None;

        let tx = self.tx.clone();
        let generation = self.generation;
        self.debouncer.schedule(move || {
            let _ = tx.send(PromptEvent::Wake(WakeMsg::DebounceElapsed { generation }));
        });
    }

    /// Focus left a field: validate immediately, without debouncing.
    /// Ignored outside `Editing`, like [`Self::handle_field_changed`].
    pub fn handle_field_blurred(&mut self, _id: &str) {
        if self.disposed || self.state != PromptState::Editing {
            return;
        }
        self.revalidate();
    }

    // --- Validation ----------------------------------------------------------------------------

    /// Run every field's synchronous rule, issue availability checks where
    /// needed, and return overall validity.
    ///
    /// Idempotent: repeated passes over unchanged input reproduce the same
    /// displayed messages and never issue a duplicate availability check for
    /// a value that is already pending or settled.
    pub fn revalidate(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        let mut all_valid = true;
        let mut to_check: Vec<(usize, String)> = Vec::new();

        for (index, slot) in self.fields.iter_mut().enumerate() {
            if let Err(message) = slot.def.check_rule(&slot.value) {
                slot.state.valid = false;
                slot.state.message = slot.state.modified.then_some(message);
                all_valid = false;
                continue;
            }
            if !slot.def.has_availability() {
                slot.state.valid = true;
                slot.state.message = None;
                continue;
            }

            let gating = slot.def.gates_on_availability();
            match &slot.state.remote {
                RemoteStatus::Available(checked) if *checked == slot.value => {
                    slot.state.valid = true;
                    slot.state.message = None;
                }
                RemoteStatus::Taken(checked) if *checked == slot.value => {
                    slot.state.valid = false;
                    slot.state.message = Some(slot.def.unavailable_message().to_string());
                    all_valid = false;
                }
                RemoteStatus::Pending(checked) if *checked == slot.value => {
                    // A check for this exact value is already in flight.
                    slot.state.valid = !gating;
                    slot.state.message = None;
                    all_valid &= !gating;
                }
                _ => {
                    slot.state.remote = RemoteStatus::Pending(slot.value.clone());
                    slot.state.valid = !gating;
                    slot.state.message = None;
                    all_valid &= !gating;
                    to_check.push((index, slot.value.clone()));
                }
            }
        }

        for (index, value) in to_check {
            self.issue_availability(index, value);
        }
        let _ = self.tx.send(PromptEvent::FieldsUpdated);
        all_valid
    }

    fn issue_availability(&mut self, index: usize, value: String) {
        let slot = &self.fields[index];
        let Some(check) = slot.def.availability_check(value.clone()) else {
            return;
        };
        let field = slot.def.id.clone();
        let tx = self.tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let available = check.await;
            let _ = tx.send(PromptEvent::Wake(WakeMsg::AvailabilityResolved {
                generation,
                field,
                value,
                available,
            }));
        });
    }

    // --- Submission ----------------------------------------------------------------------------

    /// Attempt to submit the form.
    ///
    /// `Submitting` is only ever entered from `Editing`: while a submit is
    /// in flight or a success/error message is still displayed this is a
    /// no-op with error feedback (busy guard), which also keeps the
    /// navigation lock from being acquired twice under the same key. An
    /// invalid form is rejected the same way. Otherwise the navigation lock
    /// is acquired, the state moves to `Submitting` and the specialization's
    /// submit action is started.
    pub fn attempt_submit(&mut self) {
        if self.disposed {
            return;
        }
        if self.state != PromptState::Editing {
            self.feedback.play_effect(EffectKind::Error, ERROR_SFX_PRIORITY);
            let _ = self.tx.send(PromptEvent::SubmitBusy);
            return;
        }
        if !self.revalidate() {
            self.feedback.play_effect(EffectKind::Error, ERROR_SFX_PRIORITY);
            let _ = self.tx.send(PromptEvent::SubmitRejected);
            return;
        }

        self.debouncer.cancel();
        self.locks.acquire(&self.config.owner_key);
        self.holding_lock = true;
        self.state = PromptState::Submitting;
        self.feedback
            .play_effect(EffectKind::Confirm, CONFIRM_SFX_PRIORITY);
        let _ = self.tx.send(PromptEvent::SubmittingStarted);

        let values = self.values();
        let future = self.hooks.submit(&values);
        let tx = self.tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = future.await;
            let _ = tx.send(PromptEvent::Wake(WakeMsg::SubmitSettled { generation, result }));
        });
    }

    /// Cancel request from the hosting view. Ignored while submitting and
    /// during the success display: the outcome already persisted, so the
    /// flow must run to completion and deliver its payload. Cancel during
    /// the error display is honored (disposal releases the lock).
    /// Returns true when the cancel was accepted (the host should close).
    pub fn cancel(&mut self) -> bool {
        if self.disposed
            || matches!(self.state, PromptState::Submitting | PromptState::Success)
        {
            return false;
        }
        self.feedback
            .play_effect(EffectKind::Cancel, CANCEL_SFX_PRIORITY);
        true
    }

    // --- Deferred work -------------------------------------------------------------------------

    /// Process a deferred wake message. Stale messages (scheduled before the
    /// last `dispose`, or superseded by newer input) are discarded.
    pub fn wake(&mut self, msg: WakeMsg) {
        if self.disposed {
            return;
        }
        match msg {
            WakeMsg::DebounceElapsed { generation } => {
                if generation != self.generation || self.state != PromptState::Editing {
                    return;
                }
                self.revalidate();
            }
            WakeMsg::AvailabilityResolved {
                generation,
                field,
                value,
                available,
            } => {
                if generation != self.generation {
                    return;
                }
                self.on_availability_resolved(&field, value, available);
            }
            WakeMsg::SubmitSettled { generation, result } => {
                if generation != self.generation || self.state != PromptState::Submitting {
                    return;
                }
                match result {
                    Ok(payload) => self.on_submit_success(payload),
                    Err(message) => self.on_submit_failure(message),
                }
            }
            WakeMsg::SuccessDisplayElapsed { generation } => {
                if generation != self.generation || self.state != PromptState::Success {
                    return;
                }
                self.on_success_complete();
            }
            WakeMsg::ErrorDisplayElapsed {
                generation,
                message,
            } => {
                if generation != self.generation || self.state != PromptState::Error {
                    return;
                }
                self.on_error_complete(message);
            }
        }
    }

    fn on_availability_resolved(&mut self, field: &str, value: String, available: bool) {
        let Some(slot) = self.slot_mut(field) else {
            return;
        };
        // Discard resolutions for anything but the value currently pending;
        // the user kept typing and a newer check (or none) is authoritative.
        match &slot.state.remote {
            RemoteStatus::Pending(checked) if *checked == value && slot.value == value => {}
            _ => {
                debug!(field, "discarded stale availability resolution");
                return;
            }
        }
        slot.state.remote = if available {
            RemoteStatus::Available(value)
        } else {
            RemoteStatus::Taken(value)
        };
        self.revalidate();
    }

    fn on_submit_success(&mut self, payload: Value) {
        self.state = PromptState::Success;
        self.success_payload = Some(payload);
        let _ = self.tx.send(PromptEvent::Succeeded);

        let tx = self.tx.clone();
        let generation = self.generation;
        let duration = self.config.success_duration;
        self.success_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = tx.send(PromptEvent::Wake(WakeMsg::SuccessDisplayElapsed { generation }));
        }));
    }

    fn on_submit_failure(&mut self, message: String) {
        self.state = PromptState::Error;
        self.form_error = Some(message.clone());
        let _ = self.tx.send(PromptEvent::Failed(message.clone()));

        let duration = if message.chars().count() > self.config.long_error_threshold {
            self.config.error_duration_long
        } else {
            self.config.error_duration
        };
        let tx = self.tx.clone();
        let generation = self.generation;
        self.error_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = tx.send(PromptEvent::Wake(WakeMsg::ErrorDisplayElapsed {
                generation,
                message,
            }));
        }));
    }

    fn on_success_complete(&mut self) {
        let payload = self.success_payload.take().unwrap_or(Value::Null);
        self.hooks.on_success_complete(&payload);
        self.release_lock();
        let _ = self.tx.send(PromptEvent::Completed(payload));
    }

    fn on_error_complete(&mut self, message: String) {
        self.hooks.on_error_complete(&message);
        self.release_lock();
        self.state = PromptState::Editing;
        self.form_error = None;
        // Pin the server's message onto the offending field where possible.
        if let Some(field) = self.hooks.route_error(&message) {
            if let Some(slot) = self.slot_mut(&field) {
                slot.state.valid = false;
                slot.state.message = Some(message.clone());
            }
        }
        let _ = self.tx.send(PromptEvent::ReturnedToEditing(message));
    }

    // --- Teardown ------------------------------------------------------------------------------

    /// Cancel all pending timers, invalidate in-flight async work, and
    /// release a held navigation lock. Safe to call multiple times.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.generation = self.generation.wrapping_add(1);
        self.debouncer.cancel();
        if let Some(handle) = self.success_timer.take() {
            handle.abort();
        }
        if let Some(handle) = self.error_timer.take() {
            handle.abort();
        }
        self.release_lock();
    }

    fn release_lock(&mut self) {
        if self.holding_lock {
            self.locks.release(&self.config.owner_key);
            self.holding_lock = false;
        }
    }

    fn slot(&self, id: &str) -> Option<&FieldSlot> {
        self.fields.iter().find(|slot| slot.def.id == id)
    }

    fn slot_mut(&mut self, id: &str) -> Option<&mut FieldSlot> {
        self.fields.iter_mut().find(|slot| slot.def.id == id)
    }
}

impl Drop for FormPrompt {
    fn drop(&mut self) {
        self.dispose();
    }
}
