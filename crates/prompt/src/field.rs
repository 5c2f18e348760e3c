/// Status of a field's remote availability check.
///
/// The checked input value is carried alongside the status so a resolution
/// arriving after the user kept typing can be recognized as stale and
/// discarded: an old "available" result must never validate newer, unchecked
/// input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RemoteStatus {
    /// No check outstanding and no settled result for the current value.
    #[default]
    Idle,
    /// A check for this exact input value is in flight.
    Pending(String),
    /// The service confirmed this value as available.
    Available(String),
    /// The service rejected this value as taken.
    Taken(String),
}

impl RemoteStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, RemoteStatus::Pending(_))
    }
}

/// Validation state of a single tracked field.
#[derive(Debug, Clone, Default)]
pub struct FieldState {
    /// Message currently displayed next to the field, if any.
    pub message: Option<String>,
    /// Result of the most recent validation pass.
    pub valid: bool,
    /// Set once the user has changed the field at least once. Error messages
    /// are suppressed until then so a freshly rendered form does not open
    /// covered in red.
    pub modified: bool,
    /// Remote availability status for fields backed by a server-side check.
    pub remote: RemoteStatus,
}
