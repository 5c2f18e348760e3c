/// Lifecycle state of a single form prompt.
///
/// Exactly one state is active at a time. `Submitting` is only reachable from
/// `Editing` (and only while the form is valid); `Success` and `Error` are
/// only reachable from `Submitting`. After a timed display window `Error`
/// returns to `Editing` and `Success` exits the flow via a completion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    Editing,
    Submitting,
    Success,
    Error,
}

impl PromptState {
    /// Human-readable label (useful for logs and status lines).
    pub fn label(&self) -> &'static str {
        match self {
            PromptState::Editing => "editing",
            PromptState::Submitting => "submitting",
            PromptState::Success => "success",
            PromptState::Error => "error",
        }
    }
}
