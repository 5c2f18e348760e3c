use prompt::{EffectKind, Feedback};
use tracing::debug;

/// Interaction feedback sink. There is no audio backend in the terminal
/// client; effects are traced so the lifecycle's feedback contract stays
/// observable.
#[derive(Debug, Default)]
pub struct Sfx;

impl Feedback for Sfx {
    fn play_effect(&self, kind: EffectKind, priority: u8) {
        debug!(?kind, priority, "play effect");
    }
}
