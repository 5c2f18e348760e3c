use std::collections::HashMap;

use futures::future::BoxFuture;
use serde_json::Value;

/// Synchronous validation rule for a single field.
///
/// Receives the current field value and returns `Ok(())` or the message to
/// display inline.
pub type SyncRule = Box<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// Asynchronous availability-style check (e.g. username uniqueness).
///
/// Receives the value to check and resolves to `true` when it is available.
pub type AvailabilityCheck = Box<dyn Fn(String) -> BoxFuture<'static, bool> + Send + Sync>;

/// Future returned by a form's submit action: success payload or a
/// human-readable failure message.
pub type SubmitFuture = BoxFuture<'static, Result<Value, String>>;

/// Declarative description of a tracked form field.
pub struct FieldDef {
    pub id: String,
    rule: SyncRule,
    availability: Option<AvailabilityCheck>,
    unavailable_message: String,
    /// When true (the default), an unresolved or failed availability check
    /// keeps the field invalid. The full registration form relaxes this: it
    /// checks availability but does not block submission on a pending check.
    gates_on_availability: bool,
}

impl FieldDef {
    pub fn new(
        id: impl Into<String>,
        rule: impl Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            rule: Box::new(rule),
            availability: None,
            unavailable_message: String::new(),
            gates_on_availability: true,
        }
    }

    /// Attach a remote availability check. `unavailable_message` is displayed
    /// when the check resolves to "taken".
    pub fn availability(
        mut self,
        check: impl Fn(String) -> BoxFuture<'static, bool> + Send + Sync + 'static,
        unavailable_message: impl Into<String>,
    ) -> Self {
        self.availability = Some(Box::new(check));
        self.unavailable_message = unavailable_message.into();
        self
    }

    /// Run the availability check advisorily: a pending check does not count
    /// against form validity, only a settled "taken" result does.
    pub fn advisory(mut self) -> Self {
        self.gates_on_availability = false;
        self
    }

    pub(crate) fn check_rule(&self, value: &str) -> Result<(), String> {
        (self.rule)(value)
    }

    pub(crate) fn availability_check(&self, value: String) -> Option<BoxFuture<'static, bool>> {
        self.availability.as_ref().map(|check| check(value))
    }

    pub(crate) fn has_availability(&self) -> bool {
        self.availability.is_some()
    }

    pub(crate) fn unavailable_message(&self) -> &str {
        &self.unavailable_message
    }

    pub(crate) fn gates_on_availability(&self) -> bool {
        self.gates_on_availability
    }
}

/// Contract a concrete form supplies to the shared lifecycle.
///
/// Only `fields` and `submit` are mandatory; the completion hooks default to
/// no-ops beyond the lifecycle's own lock release and event signalling.
pub trait FormHooks: Send {
    /// Field definitions, queried once when the prompt is created.
    fn fields(&self) -> Vec<FieldDef>;

    /// The network/domain submit action. Receives the current field values.
    fn submit(&mut self, values: &HashMap<String, String>) -> SubmitFuture;

    /// Invoked after the success message display window has elapsed.
    fn on_success_complete(&mut self, _payload: &Value) {}

    /// Invoked after the error message display window has elapsed.
    fn on_error_complete(&mut self, _message: &str) {}

    /// Route a submission error message to a specific field. Unrouted
    /// messages are displayed as a form-level error instead.
    fn route_error(&self, _message: &str) -> Option<String> {
        None
    }
}

/// Case-insensitive substring routing: returns the first of `field_ids`
/// mentioned in `message`.
///
/// This mirrors how the registration forms pin a server-side "username
/// already exists" style rejection onto the offending input.
pub fn route_by_field_ids(message: &str, field_ids: &[&str]) -> Option<String> {
    let lowered = message.to_lowercase();
    field_ids
        .iter()
        .find(|id| lowered.contains(&id.to_lowercase()))
        .map(|id| id.to_string())
}
