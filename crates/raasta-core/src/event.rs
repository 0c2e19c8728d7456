// ── Change notifications ──
//
// Renderers subscribe to these instead of reaching into the controller.
// `Alert` is the one modal shape for notices and errors alike.

use std::time::Duration;

use serde::Serialize;

use crate::model::SkillStatus;
use crate::session::SessionState;

/// A titled message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Everything the controller announces to its consumers.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The store now holds a different roadmap (generation, load, restore).
    RoadmapReplaced { name: String, progress: u8 },
    /// A skill's completion flipped.
    SkillToggled {
        id: String,
        status: SkillStatus,
        progress: u8,
    },
    /// Progress reached 100% for the first time on this roadmap instance,
    /// either by a toggle or because the adopted document was already complete.
    CompletionReached,
    SessionChanged(SessionState),
    /// The session deadline is within the warning lead time.
    ExpiryWarning { remaining: Duration },
    /// The session deadline passed; interaction is blocked until reload.
    SessionExpired,
    Alert(Alert),
    /// All local state was cleared (logout or reload).
    Reset,
}
