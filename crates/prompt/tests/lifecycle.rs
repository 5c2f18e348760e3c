//! Lifecycle contract tests: debounce coalescing, the busy guard, display
//! timer durations, lock release, disposal, and availability staleness.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use futures::FutureExt;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

use prompt::{
    DialogDirective, DialogPrompt, EffectKind, Feedback, FieldDef, FormHooks, FormPrompt,
    NavLocks, PromptConfig, PromptEvent, PromptState, RemoteStatus, ShellSignal, SubmitFuture,
};

/// Counts effects instead of playing them.
#[derive(Default)]
struct CountingFeedback {
    errors: AtomicUsize,
    confirms: AtomicUsize,
    cancels: AtomicUsize,
}

impl Feedback for CountingFeedback {
    fn play_effect(&self, kind: EffectKind, _priority: u8) {
        let counter = match kind {
            EffectKind::Confirm => &self.confirms,
            EffectKind::Error => &self.errors,
            EffectKind::Cancel => &self.cancels,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// Scripted form: username (3+ alphanumeric, optional availability check)
/// and password (8+ characters). The submit action resolves immediately with
/// a canned outcome; `futures::future::pending` keeps it in flight forever.
struct ScriptedForm {
    outcome: Option<Result<Value, String>>,
    submit_calls: Arc<AtomicUsize>,
    rule_calls: Arc<AtomicUsize>,
    check_calls: Arc<AtomicUsize>,
    with_availability: bool,
    advisory_availability: bool,
    available: Arc<AtomicBool>,
}

impl ScriptedForm {
    fn new(outcome: Option<Result<Value, String>>) -> Self {
        Self {
            outcome,
            submit_calls: Arc::new(AtomicUsize::new(0)),
            rule_calls: Arc::new(AtomicUsize::new(0)),
            check_calls: Arc::new(AtomicUsize::new(0)),
            with_availability: false,
            advisory_availability: false,
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    fn with_availability(mut self) -> Self {
        self.with_availability = true;
        self
    }
}

impl FormHooks for ScriptedForm {
    fn fields(&self) -> Vec<FieldDef> {
        let rule_calls = self.rule_calls.clone();
        let mut username = FieldDef::new("username", move |value: &str| {
            rule_calls.fetch_add(1, Ordering::SeqCst);
            if value.len() >= 3 && value.chars().all(|c| c.is_ascii_alphanumeric()) {
                Ok(())
            } else {
                Err("username must be 3-18 letters or numbers".to_string())
            }
        });
        if self.with_availability {
            let check_calls = self.check_calls.clone();
            let available = self.available.clone();
            username = username.availability(
                move |_value| {
                    check_calls.fetch_add(1, Ordering::SeqCst);
                    let available = available.clone();
                    async move { available.load(Ordering::SeqCst) }.boxed()
                },
                "username already exists",
            );
            if self.advisory_availability {
                username = username.advisory();
            }
        }
        let password = FieldDef::new("password", |value: &str| {
            if value.len() >= 8 {
                Ok(())
            } else {
                Err("password must be at least 8 characters".to_string())
            }
        });
        vec![username, password]
    }

    fn submit(&mut self, _values: &HashMap<String, String>) -> SubmitFuture {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome.clone() {
            Some(outcome) => async move { outcome }.boxed(),
            None => futures::future::pending().boxed(),
        }
    }

    fn route_error(&self, message: &str) -> Option<String> {
        prompt::route_by_field_ids(message, &["username", "password"])
    }
}

struct Harness {
    prompt: FormPrompt,
    rx: UnboundedReceiver<PromptEvent>,
    locks: NavLocks,
    feedback: Arc<CountingFeedback>,
}

fn harness(form: ScriptedForm, owner: &str) -> Harness {
    let (tx, rx) = unbounded_channel();
    let locks = NavLocks::new();
    let feedback = Arc::new(CountingFeedback::default());
    let prompt = FormPrompt::new(
        Box::new(form),
        PromptConfig::new(owner),
        locks.clone(),
        feedback.clone(),
        tx,
    );
    Harness {
        prompt,
        rx,
        locks,
        feedback,
    }
}

impl Harness {
    /// Receive the next host-facing event, routing wake messages back into
    /// the prompt along the way.
    async fn next_event(&mut self) -> PromptEvent {
        loop {
            let event = self.rx.recv().await.expect("event channel closed");
            if let PromptEvent::Wake(msg) = event {
                self.prompt.wake(msg);
                continue;
            }
            return event;
        }
    }

    /// Drive until an event matches `pred`, discarding everything else.
    async fn event_matching(&mut self, pred: fn(&PromptEvent) -> bool) -> PromptEvent {
        loop {
            let event = self.next_event().await;
            if pred(&event) {
                return event;
            }
        }
    }

    fn fill_valid(&mut self) {
        self.prompt.handle_field_changed("username", "alice123");
        self.prompt.handle_field_changed("password", "longenough1");
    }

    /// Drain queued events without waiting, routing wakes.
    fn drain(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            if let PromptEvent::Wake(msg) = event {
                self.prompt.wake(msg);
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn debounce_coalesces_changes_into_one_validation_pass() {
    let form = ScriptedForm::new(Some(Ok(json!({}))));
    let rule_calls = form.rule_calls.clone();
    let mut h = harness(form, "test-debounce");

    h.prompt.handle_field_changed("username", "a");
    tokio::time::advance(Duration::from_millis(100)).await;
    h.prompt.handle_field_changed("username", "al");
    tokio::time::advance(Duration::from_millis(100)).await;
    h.prompt.handle_field_changed("username", "ali");

    h.event_matching(|e| matches!(e, PromptEvent::FieldsUpdated)).await;
    assert_eq!(rule_calls.load(Ordering::SeqCst), 1);

    // Nothing else pending: exactly one pass per settled burst.
    tokio::time::sleep(Duration::from_secs(2)).await;
    h.drain();
    assert_eq!(rule_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn busy_guard_never_reinvokes_submit_action() {
    let form = ScriptedForm::new(None); // submit never settles
    let submit_calls = form.submit_calls.clone();
    let mut h = harness(form, "test-busy");

    h.fill_valid();
    h.prompt.attempt_submit();
    assert_eq!(h.prompt.state(), PromptState::Submitting);

    h.prompt.attempt_submit();
    h.prompt.attempt_submit();
    let event = h.event_matching(|e| matches!(e, PromptEvent::SubmitBusy)).await;
    assert!(matches!(event, PromptEvent::SubmitBusy));
    assert_eq!(submit_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.feedback.errors.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn resubmit_during_error_display_is_busy_and_lock_still_clears() {
    let form = ScriptedForm::new(Some(Err("bad credentials".to_string())));
    let submit_calls = form.submit_calls.clone();
    let mut h = harness(form, "test-error-resubmit");

    h.fill_valid();
    h.prompt.attempt_submit();
    h.event_matching(|e| matches!(e, PromptEvent::Failed(_))).await;
    assert_eq!(h.prompt.state(), PromptState::Error);

    // Submitting is only entered from Editing: Enter during the error
    // display window is busy, not a second episode.
    h.prompt.attempt_submit();
    let event = h.event_matching(|e| matches!(e, PromptEvent::SubmitBusy)).await;
    assert!(matches!(event, PromptEvent::SubmitBusy));
    assert_eq!(h.prompt.state(), PromptState::Error);
    assert_eq!(submit_calls.load(Ordering::SeqCst), 1);

    // The single acquisition is fully released when the display ends.
    h.event_matching(|e| matches!(e, PromptEvent::ReturnedToEditing(_))).await;
    assert!(!h.locks.is_locked());
}

#[tokio::test(start_paused = true)]
async fn resubmit_during_success_display_is_busy_and_lock_still_clears() {
    let form = ScriptedForm::new(Some(Ok(json!({"username": "alice123"}))));
    let submit_calls = form.submit_calls.clone();
    let mut h = harness(form, "test-success-resubmit");

    h.fill_valid();
    h.prompt.attempt_submit();
    h.event_matching(|e| matches!(e, PromptEvent::Succeeded)).await;
    assert_eq!(h.prompt.state(), PromptState::Success);

    h.prompt.attempt_submit();
    let event = h.event_matching(|e| matches!(e, PromptEvent::SubmitBusy)).await;
    assert!(matches!(event, PromptEvent::SubmitBusy));
    assert_eq!(submit_calls.load(Ordering::SeqCst), 1);

    h.event_matching(|e| matches!(e, PromptEvent::Completed(_))).await;
    assert!(!h.locks.is_locked());
}

#[tokio::test(start_paused = true)]
async fn short_error_message_returns_to_editing_after_three_seconds() {
    let form = ScriptedForm::new(Some(Err("bad credentials".to_string())));
    let mut h = harness(form, "test-error-short");

    h.fill_valid();
    h.prompt.attempt_submit();
    let started = tokio::time::Instant::now();
    h.event_matching(|e| matches!(e, PromptEvent::ReturnedToEditing(_))).await;
    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert_eq!(h.prompt.state(), PromptState::Editing);
}

#[tokio::test(start_paused = true)]
async fn long_error_message_returns_to_editing_after_ten_seconds() {
    let message = "the account service rejected this request, try again later";
    assert!(message.len() > 30);
    let form = ScriptedForm::new(Some(Err(message.to_string())));
    let mut h = harness(form, "test-error-long");

    h.fill_valid();
    h.prompt.attempt_submit();
    let started = tokio::time::Instant::now();
    h.event_matching(|e| matches!(e, PromptEvent::ReturnedToEditing(_))).await;
    assert_eq!(started.elapsed(), Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn navigation_lock_held_during_submit_released_on_completion() {
    let form = ScriptedForm::new(Some(Ok(json!({"username": "alice123"}))));
    let mut h = harness(form, "test-lock");

    h.fill_valid();
    h.prompt.attempt_submit();
    assert!(h.locks.is_held("test-lock"));

    h.event_matching(|e| matches!(e, PromptEvent::Completed(_))).await;
    assert!(!h.locks.is_locked());

    // Disposal after completion must not release anything twice.
    h.prompt.dispose();
    assert!(!h.locks.is_locked());
}

#[tokio::test(start_paused = true)]
async fn error_resolution_releases_lock_and_reenables_form() {
    let form = ScriptedForm::new(Some(Err("bad credentials".to_string())));
    let mut h = harness(form, "test-lock-error");

    h.fill_valid();
    h.prompt.attempt_submit();
    assert!(h.locks.is_held("test-lock-error"));
    h.event_matching(|e| matches!(e, PromptEvent::ReturnedToEditing(_))).await;
    assert!(!h.locks.is_locked());
    assert_eq!(h.prompt.state(), PromptState::Editing);
}

#[tokio::test(start_paused = true)]
async fn dispose_mid_error_display_stops_all_timers_and_releases_lock() {
    let form = ScriptedForm::new(Some(Err("bad credentials".to_string())));
    let mut h = harness(form, "test-dispose");

    h.fill_valid();
    h.prompt.attempt_submit();
    h.event_matching(|e| matches!(e, PromptEvent::Failed(_))).await;
    assert_eq!(h.prompt.state(), PromptState::Error);

    h.prompt.dispose();
    assert!(!h.locks.is_locked());

    // The display timer was cancelled; no further state mutation may happen.
    tokio::time::sleep(Duration::from_secs(20)).await;
    h.drain();
    assert_eq!(h.prompt.state(), PromptState::Error);

    // Idempotent.
    h.prompt.dispose();
}

#[tokio::test(start_paused = true)]
async fn dispose_cancels_pending_debounce() {
    let form = ScriptedForm::new(Some(Ok(json!({}))));
    let rule_calls = form.rule_calls.clone();
    let mut h = harness(form, "test-dispose-debounce");

    h.prompt.handle_field_changed("username", "alice123");
    h.prompt.dispose();
    tokio::time::sleep(Duration::from_secs(2)).await;
    h.drain();
    assert_eq!(rule_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn corrected_field_clears_its_message() {
    let form = ScriptedForm::new(Some(Ok(json!({}))));
    let mut h = harness(form, "test-roundtrip");

    h.prompt.handle_field_changed("password", "short");
    h.prompt.handle_field_blurred("password");
    let state = h.prompt.field_state("password").unwrap();
    assert!(!state.valid);
    assert_eq!(
        state.message.as_deref(),
        Some("password must be at least 8 characters")
    );

    h.prompt.handle_field_changed("password", "longenough1");
    h.prompt.handle_field_blurred("password");
    let state = h.prompt.field_state("password").unwrap();
    assert!(state.valid);
    assert_eq!(state.message, None);
}

#[tokio::test(start_paused = true)]
async fn unmodified_field_shows_no_premature_message() {
    let form = ScriptedForm::new(Some(Ok(json!({}))));
    let mut h = harness(form, "test-premature");

    // First render: everything invalid (empty), but nothing is displayed.
    assert!(!h.prompt.revalidate());
    let state = h.prompt.field_state("username").unwrap();
    assert!(!state.valid);
    assert_eq!(state.message, None);
}

#[tokio::test(start_paused = true)]
async fn too_short_username_never_issues_availability_check() {
    let form = ScriptedForm::new(Some(Ok(json!({})))).with_availability();
    let check_calls = form.check_calls.clone();
    let mut h = harness(form, "test-no-check");

    h.prompt.handle_field_changed("username", "ab");
    h.prompt.handle_field_blurred("username");
    assert_eq!(check_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn stale_availability_resolution_is_discarded() {
    let mut form = ScriptedForm::new(Some(Ok(json!({})))).with_availability();
    form.available = Arc::new(AtomicBool::new(false)); // "alice123" is taken
    let mut h = harness(form, "test-stale");

    h.prompt.handle_field_changed("username", "alice123");
    h.prompt.handle_field_blurred("username");
    assert!(h.prompt.field_state("username").unwrap().remote.is_pending());

    // The user keeps typing before the check resolves.
    h.prompt.handle_field_changed("username", "alice124");

    // The resolution for "alice123" arrives now and must be discarded: no
    // message appears for "alice124" and no settled status is recorded.
    tokio::time::sleep(Duration::from_millis(1)).await;
    h.drain();
    let state = h.prompt.field_state("username").unwrap();
    assert_eq!(state.message, None);
    assert_eq!(state.remote, RemoteStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn taken_username_blocks_submit_until_changed() {
    let mut form = ScriptedForm::new(Some(Ok(json!({})))).with_availability();
    form.available = Arc::new(AtomicBool::new(false));
    let submit_calls = form.submit_calls.clone();
    let mut h = harness(form, "test-taken");

    h.prompt.handle_field_changed("username", "alice123");
    h.prompt.handle_field_changed("password", "longenough1");
    h.prompt.handle_field_blurred("username");
    tokio::time::sleep(Duration::from_millis(1)).await;
    h.drain(); // settle the availability check

    let state = h.prompt.field_state("username").unwrap();
    assert_eq!(state.message.as_deref(), Some("username already exists"));

    h.prompt.attempt_submit();
    h.drain();
    assert_eq!(submit_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.prompt.state(), PromptState::Editing);
}

#[tokio::test(start_paused = true)]
async fn pending_availability_counts_invalid_when_gating() {
    let form = ScriptedForm::new(Some(Ok(json!({})))).with_availability();
    let check_calls = form.check_calls.clone();
    let mut h = harness(form, "test-gating");

    h.prompt.handle_field_changed("username", "alice123");
    h.prompt.handle_field_changed("password", "longenough1");
    assert!(!h.prompt.revalidate());
    assert_eq!(check_calls.load(Ordering::SeqCst), 1);

    // A second pass for the same value does not re-issue the check.
    assert!(!h.prompt.revalidate());
    assert_eq!(check_calls.load(Ordering::SeqCst), 1);

    // Once the check settles "available", the form is valid.
    tokio::time::sleep(Duration::from_millis(1)).await;
    h.drain();
    assert!(h.prompt.revalidate());
}

#[tokio::test(start_paused = true)]
async fn advisory_availability_does_not_block_submission() {
    let mut form = ScriptedForm::new(Some(Ok(json!({})))).with_availability();
    form.advisory_availability = true;
    let submit_calls = form.submit_calls.clone();
    let mut h = harness(form, "test-advisory");

    h.prompt.handle_field_changed("username", "alice123");
    h.prompt.handle_field_changed("password", "longenough1");
    // Submit while the availability check is still pending.
    h.prompt.attempt_submit();
    assert_eq!(h.prompt.state(), PromptState::Submitting);
    assert_eq!(submit_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn invalid_form_never_invokes_submit_action() {
    let form = ScriptedForm::new(Some(Ok(json!({}))));
    let submit_calls = form.submit_calls.clone();
    let mut h = harness(form, "test-invalid-submit");

    h.prompt.handle_field_changed("username", "alice123");
    h.prompt.handle_field_changed("password", "short1"); // under 8 chars
    h.prompt.attempt_submit();

    let event = h
        .event_matching(|e| matches!(e, PromptEvent::SubmitRejected | PromptEvent::SubmittingStarted))
        .await;
    assert!(matches!(event, PromptEvent::SubmitRejected));
    assert_eq!(submit_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.feedback.errors.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn routed_error_message_lands_on_the_named_field() {
    let form = ScriptedForm::new(Some(Err("Username is already in use".to_string())));
    let mut h = harness(form, "test-routing");

    h.fill_valid();
    h.prompt.attempt_submit();
    h.event_matching(|e| matches!(e, PromptEvent::ReturnedToEditing(_))).await;

    let state = h.prompt.field_state("username").unwrap();
    assert!(!state.valid);
    assert_eq!(state.message.as_deref(), Some("Username is already in use"));
}

#[tokio::test(start_paused = true)]
async fn field_events_are_ignored_while_submitting() {
    let form = ScriptedForm::new(None);
    let mut h = harness(form, "test-frozen");

    h.fill_valid();
    h.prompt.attempt_submit();
    h.prompt.handle_field_changed("username", "changed");
    assert_eq!(h.prompt.value("username"), Some("alice123"));
}

#[tokio::test(start_paused = true)]
async fn field_events_are_ignored_during_error_display() {
    let form = ScriptedForm::new(Some(Err("bad credentials".to_string())));
    let mut h = harness(form, "test-frozen-error");

    h.fill_valid();
    h.prompt.attempt_submit();
    h.event_matching(|e| matches!(e, PromptEvent::Failed(_))).await;

    // The form stays disabled until the error display window ends.
    h.prompt.handle_field_changed("username", "changed");
    h.prompt.handle_field_blurred("username");
    assert_eq!(h.prompt.value("username"), Some("alice123"));
    assert_eq!(h.prompt.state(), PromptState::Error);
}

#[tokio::test(start_paused = true)]
async fn cancel_is_suppressed_during_success_display_until_completion() {
    let form = ScriptedForm::new(Some(Ok(json!({"username": "alicia"}))));
    let mut h = harness(form, "test-cancel-success");

    h.fill_valid();
    h.prompt.attempt_submit();
    h.event_matching(|e| matches!(e, PromptEvent::Succeeded)).await;

    // The outcome already persisted; closing now would swallow the payload.
    assert!(!h.prompt.cancel());

    let event = h.event_matching(|e| matches!(e, PromptEvent::Completed(_))).await;
    let PromptEvent::Completed(payload) = event else {
        unreachable!()
    };
    assert_eq!(payload, json!({"username": "alicia"}));
}

#[tokio::test(start_paused = true)]
async fn cancel_is_honored_during_error_display() {
    let form = ScriptedForm::new(Some(Err("bad credentials".to_string())));
    let mut h = harness(form, "test-cancel-error");

    h.fill_valid();
    h.prompt.attempt_submit();
    h.event_matching(|e| matches!(e, PromptEvent::Failed(_))).await;

    assert!(h.prompt.cancel());
    h.prompt.dispose();
    assert!(!h.locks.is_locked());
}

// --- Dialog behavior ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn dialog_cancel_is_ignored_while_submitting() {
    let (tx, _rx) = unbounded_channel();
    let mut dialog = DialogPrompt::new(FormPrompt::new(
        Box::new(ScriptedForm::new(None)), // submit never settles
        PromptConfig::new("test-dialog-cancel"),
        NavLocks::new(),
        Arc::new(CountingFeedback::default()),
        tx,
    ));
    dialog.handle_field_changed("username", "alice123");
    dialog.handle_field_changed("password", "longenough1");

    assert_eq!(
        dialog.on_shell_signal(ShellSignal::AttemptCancel),
        Some(DialogDirective::Close)
    );
    dialog.on_shell_signal(ShellSignal::AttemptConfirm);
    assert!(dialog.is_submitting());
    assert_eq!(dialog.on_shell_signal(ShellSignal::AttemptCancel), None);
}

#[tokio::test(start_paused = true)]
async fn dialog_hides_cancel_while_submitting_and_restores_it_on_error() {
    let form = ScriptedForm::new(Some(Err("bad credentials".to_string())));
    let (tx, mut rx) = unbounded_channel();
    let locks = NavLocks::new();
    let mut dialog = DialogPrompt::new(FormPrompt::new(
        Box::new(form),
        PromptConfig::new("test-dialog-affordance"),
        locks,
        Arc::new(CountingFeedback::default()),
        tx,
    ));
    dialog.handle_field_changed("username", "alice123");
    dialog.handle_field_changed("password", "longenough1");
    dialog.attempt_submit();

    let mut closed = false;
    loop {
        let event = rx.recv().await.expect("event channel closed");
        if let PromptEvent::Wake(msg) = event {
            dialog.wake(msg);
            continue;
        }
        if let Some(DialogDirective::Close) = dialog.observe(&event) {
            closed = true;
        }
        match event {
            PromptEvent::SubmittingStarted => assert!(dialog.cancel_hidden()),
            PromptEvent::ReturnedToEditing(_) => {
                assert!(!dialog.cancel_hidden());
                break;
            }
            _ => {}
        }
    }
    assert!(!closed);
}

#[tokio::test(start_paused = true)]
async fn dialog_closes_after_success_completion() {
    let form = ScriptedForm::new(Some(Ok(json!({"ok": true}))));
    let (tx, mut rx) = unbounded_channel();
    let mut dialog = DialogPrompt::new(FormPrompt::new(
        Box::new(form),
        PromptConfig::new("test-dialog-close"),
        NavLocks::new(),
        Arc::new(CountingFeedback::default()),
        tx,
    ));
    dialog.handle_field_changed("username", "alice123");
    dialog.handle_field_changed("password", "longenough1");
    dialog.on_shell_signal(ShellSignal::AttemptConfirm);

    loop {
        let event = rx.recv().await.expect("event channel closed");
        if let PromptEvent::Wake(msg) = event {
            dialog.wake(msg);
            continue;
        }
        if let Some(DialogDirective::Close) = dialog.observe(&event) {
            break;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn dialog_cancel_is_ignored_during_success_display() {
    let form = ScriptedForm::new(Some(Ok(json!({"username": "alicia"}))));
    let (tx, mut rx) = unbounded_channel();
    let mut dialog = DialogPrompt::new(FormPrompt::new(
        Box::new(form),
        PromptConfig::new("test-dialog-cancel-success"),
        NavLocks::new(),
        Arc::new(CountingFeedback::default()),
        tx,
    ));
    dialog.handle_field_changed("username", "alice123");
    dialog.handle_field_changed("password", "longenough1");
    dialog.on_shell_signal(ShellSignal::AttemptConfirm);

    let mut completed_payload = None;
    loop {
        let event = rx.recv().await.expect("event channel closed");
        if let PromptEvent::Wake(msg) = event {
            dialog.wake(msg);
            continue;
        }
        let directive = dialog.observe(&event);
        match event {
            PromptEvent::Succeeded => {
                // Esc while the success message shows must not tear the
                // dialog down before the completion payload is delivered.
                assert_eq!(dialog.on_shell_signal(ShellSignal::AttemptCancel), None);
            }
            PromptEvent::Completed(payload) => {
                assert_eq!(directive, Some(DialogDirective::Close));
                completed_payload = Some(payload);
                break;
            }
            _ => {}
        }
    }
    assert_eq!(completed_payload, Some(json!({"username": "alicia"})));
}
