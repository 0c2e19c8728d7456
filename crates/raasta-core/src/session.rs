// ── Session tracker ──
//
// The server issues the session deadline; the client only watches the
// clock against it. `tick` is pure state-machine logic so the monitor
// task and tests drive it the same way.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

use crate::clock::duration_ms;

/// Where the current identity stands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Guest,
    Authenticated {
        email: String,
        /// Epoch-millisecond deadline, when the server sent one.
        expires_at: Option<i64>,
    },
    /// The expiry warning has been shown; still authenticated.
    WarningIssued { email: String, expires_at: i64 },
    /// Terminal until reload.
    Expired { email: String },
}

impl SessionState {
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Guest => None,
            Self::Authenticated { email, .. }
            | Self::WarningIssued { email, .. }
            | Self::Expired { email } => Some(email),
        }
    }

    /// Identity usable for remote calls.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. } | Self::WarningIssued { .. })
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }

    pub fn expires_at(&self) -> Option<i64> {
        match self {
            Self::Authenticated { expires_at, .. } => *expires_at,
            Self::WarningIssued { expires_at, .. } => Some(*expires_at),
            Self::Guest | Self::Expired { .. } => None,
        }
    }
}

/// A transition produced by [`SessionTracker::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTransition {
    Warning { remaining_ms: i64 },
    Expired,
}

/// Session state behind a `watch` channel.
pub struct SessionTracker {
    state: watch::Sender<SessionState>,
    warning_lead_ms: i64,
}

impl SessionTracker {
    pub fn new(warning_lead: Duration) -> Self {
        let (state, _) = watch::channel(SessionState::Guest);
        Self {
            state,
            warning_lead_ms: duration_ms(warning_lead),
        }
    }

    pub fn authenticate(&self, email: impl Into<String>, expires_at: Option<i64>) {
        let email = email.into();
        info!(%email, ?expires_at, "session authenticated");
        self.state
            .send_replace(SessionState::Authenticated { email, expires_at });
    }

    /// Back to guest. Used by logout and reload.
    pub fn reset(&self) {
        self.state.send_replace(SessionState::Guest);
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Advance the state machine to `now_ms`.
    ///
    /// Each transition is reported once: the warning only from
    /// `Authenticated`, expiry only from a non-expired state.
    pub fn tick(&self, now_ms: i64) -> Option<SessionTransition> {
        let mut transition = None;
        let lead = self.warning_lead_ms;

        self.state.send_if_modified(|state| {
            let Some(expires_at) = state.expires_at() else {
                return false;
            };
            let remaining = expires_at.saturating_sub(now_ms);

            if remaining <= 0 {
                let email = state.email().unwrap_or_default().to_owned();
                *state = SessionState::Expired { email };
                transition = Some(SessionTransition::Expired);
                return true;
            }

            if remaining <= lead {
                if let SessionState::Authenticated { email, .. } = state {
                    let email = std::mem::take(email);
                    *state = SessionState::WarningIssued { email, expires_at };
                    transition = Some(SessionTransition::Warning {
                        remaining_ms: remaining,
                    });
                    return true;
                }
            }
            false
        });

        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;
    const LEAD: Duration = Duration::from_secs(600);

    #[test]
    fn warning_then_expiry_fire_once_each() {
        let tracker = SessionTracker::new(LEAD);
        tracker.authenticate("sana@example.pk", Some(NOW + 601_000));

        assert_eq!(tracker.tick(NOW), None);
        assert_eq!(
            tracker.tick(NOW + 1_000),
            Some(SessionTransition::Warning {
                remaining_ms: 600_000
            })
        );
        assert_eq!(tracker.tick(NOW + 2_000), None);
        assert!(matches!(tracker.state(), SessionState::WarningIssued { .. }));

        assert_eq!(tracker.tick(NOW + 601_000), Some(SessionTransition::Expired));
        assert!(tracker.state().is_expired());
        assert_eq!(tracker.tick(NOW + 700_000), None);
    }

    #[test]
    fn already_past_deadline_expires_without_warning() {
        let tracker = SessionTracker::new(LEAD);
        tracker.authenticate("a@b.pk", Some(NOW - 1));
        assert_eq!(tracker.tick(NOW), Some(SessionTransition::Expired));
    }

    #[test]
    fn no_deadline_never_transitions() {
        let tracker = SessionTracker::new(LEAD);
        tracker.authenticate("a@b.pk", None);
        assert_eq!(tracker.tick(i64::MAX), None);
        assert!(tracker.state().is_authenticated());
    }

    #[test]
    fn guest_ignores_ticks() {
        let tracker = SessionTracker::new(LEAD);
        assert_eq!(tracker.tick(NOW), None);
        assert_eq!(tracker.state(), SessionState::Guest);
    }

    #[test]
    fn expired_keeps_email_and_blocks_identity() {
        let tracker = SessionTracker::new(LEAD);
        tracker.authenticate("a@b.pk", Some(NOW));
        tracker.tick(NOW);
        let state = tracker.state();
        assert_eq!(state.email(), Some("a@b.pk"));
        assert!(!state.is_authenticated());
    }
}
