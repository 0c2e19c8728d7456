//! State controller between `raasta-api` and UI consumers (CLI today).
//!
//! This crate owns the domain model and every piece of client-side state
//! the roadmap product keeps:
//!
//! - **[`Controller`]**: The single application-state object. Owns the
//!   roadmap store, session tracker, rate limiter, and sync client, runs
//!   the generation and login flows, and arms the 1 Hz session-expiry
//!   monitor.
//!
//! - **[`RoadmapStore`]**: The current roadmap behind a `watch` channel.
//!   Loads (unwrapping nested documents), toggles skill completion, and
//!   computes progress with a once-per-load completion latch.
//!
//! - **[`SessionTracker`]**: `Guest → Authenticated → WarningIssued →
//!   Expired` driven by the server-issued deadline.
//!
//! - **[`RateLimiter`]**: Rolling-window cap on generations, ledger kept
//!   in a [`SettingsStore`].
//!
//! - **[`AppEvent`]**: Change notifications broadcast to renderers; every
//!   user-facing failure maps to a single [`Alert`] shape.

pub mod auth;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod generation;
pub mod limiter;
pub mod model;
pub mod prefs;
pub mod session;
pub mod settings;
pub mod store;
pub mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth::{LoginFlow, LoginState, OtpRequested};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ClientConfig, RateLimitPolicy};
pub use controller::Controller;
pub use error::CoreError;
pub use event::{Alert, AppEvent};
pub use limiter::RateLimiter;
pub use model::{
    GenerationRequest, Milestone, Resource, Roadmap, Skill, SkillStatus, StarRating,
};
pub use prefs::{Preferences, Theme};
pub use session::{SessionState, SessionTracker, SessionTransition};
pub use settings::{MemorySettings, SettingsStore};
pub use store::{RoadmapStore, ToggleOutcome};
