/*!
Form prompt lifecycle core.

Every account form in the client (login, registration, gift-code redemption,
username change) shares the same submit/success/error progression. This crate
owns that shared behavior so the concrete forms only supply field rules and a
submit action:

- [`Debouncer`]: delays re-validation until input pauses.
- [`FieldState`]: per-field validity, displayed message, and the status of an
  outstanding remote availability check.
- [`FormPrompt`]: the lifecycle state machine. Owns the display timers for
  success/error messages and coordinates the navigation lock while a submit
  is in flight.
- [`DialogPrompt`]: composition wrapper adding dialog behavior (cancel and
  confirm broadcasts, auto-close on success, cancel-affordance hiding).
- [`FormHooks`]: the contract a concrete form implements.
- [`NavLocks`]: refcounted registry suppressing user-triggered navigation
  while any form is submitting.

The crate performs no rendering and no I/O of its own besides tokio timers
and task spawns. Asynchronous work (timers, availability checks, the submit
action) re-enters the machine as [`WakeMsg`] values delivered through the
prompt's event channel; the hosting view routes them back via
[`FormPrompt::wake`]. A generation counter makes anything scheduled before
[`FormPrompt::dispose`] a no-op, so a torn-down view can never be mutated by
a late timer or a stale network resolution.
*/

mod debounce;
mod dialog;
mod feedback;
mod field;
mod hooks;
mod lifecycle;
mod navlock;
mod state;

pub use debounce::Debouncer;
pub use dialog::{DialogDirective, DialogPrompt, ShellSignal};
pub use feedback::{
    CANCEL_SFX_PRIORITY, CONFIRM_SFX_PRIORITY, ERROR_SFX_PRIORITY, EffectKind, Feedback,
    NullFeedback,
};
pub use field::{FieldState, RemoteStatus};
pub use hooks::{AvailabilityCheck, FieldDef, FormHooks, SubmitFuture, SyncRule, route_by_field_ids};
pub use lifecycle::{FormPrompt, PromptConfig, PromptEvent, WakeMsg};
pub use navlock::NavLocks;
pub use state::PromptState;
