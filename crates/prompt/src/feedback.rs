/// Interaction sound priorities, mirroring the client's audio configuration.
pub const CONFIRM_SFX_PRIORITY: u8 = 2;
pub const ERROR_SFX_PRIORITY: u8 = 3;
pub const CANCEL_SFX_PRIORITY: u8 = 1;

/// Kind of interaction feedback to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Confirm,
    Error,
    Cancel,
}

/// Fire-and-forget interaction feedback sink (confirm/error/cancel sounds).
///
/// Nothing in the lifecycle depends on the outcome of playback; implementors
/// are free to drop effects entirely.
pub trait Feedback: Send + Sync {
    fn play_effect(&self, kind: EffectKind, priority: u8);
}

/// Feedback sink that swallows every effect. Useful in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFeedback;

impl Feedback for NullFeedback {
    fn play_effect(&self, _kind: EffectKind, _priority: u8) {}
}
