// ── Core error types ──
//
// User-facing errors from raasta-core. Consumers never see HTTP status
// codes or JSON parse failures directly: the `From<raasta_api::Error>`
// impl translates transport-layer errors, and the orchestrators replace
// them with flow-specific variants where the message matters.

use thiserror::Error;

use crate::event::Alert;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the roadmap service: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Request to the roadmap service timed out")]
    Timeout,

    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Login failed: {message}")]
    LoginFailed { message: String },

    #[error("Session expired -- reload to continue")]
    SessionExpired,

    // ── Roadmap errors ───────────────────────────────────────────────
    #[error("{message}")]
    GenerationFailed { message: String },

    #[error("Generation limit reached: {limit} roadmaps per hour")]
    RateLimited { limit: usize },

    #[error("Invalid roadmap: {reason}")]
    InvalidRoadmap { reason: String },

    #[error("No roadmap loaded")]
    NoRoadmap,

    #[error("Skill not found: {id}")]
    SkillNotFound { id: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("{action} is already in progress")]
    Busy { action: &'static str },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Persistence errors ───────────────────────────────────────────
    #[error("Settings error: {message}")]
    Settings { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The single modal shape every user-facing failure is routed through.
    pub fn alert(&self) -> Alert {
        match self {
            Self::LoginFailed { message } | Self::AuthenticationFailed { message } => {
                Alert::new("Login Error", message.clone())
            }
            Self::RateLimited { limit } => Alert::new(
                "Limit Reached",
                format!(
                    "You can generate up to {limit} roadmaps per hour. Please try again later."
                ),
            ),
            Self::InvalidRoadmap { .. } => Alert::new(
                "Invalid File",
                "The selected file is not a valid roadmap.",
            ),
            Self::SessionExpired => Alert::new(
                "Session Expired",
                "Your session has expired. Please reload and sign in again.",
            ),
            Self::ConnectionFailed { .. } | Self::Timeout => Alert::new(
                "Connection Error",
                "Could not reach the server. Check your connection and try again.",
            ),
            Self::GenerationFailed { message } | Self::ValidationFailed { message } => {
                Alert::new("Error", message.clone())
            }
            _ => Alert::new("Error", self.to_string()),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<raasta_api::Error> for CoreError {
    fn from(err: raasta_api::Error) -> Self {
        match err {
            raasta_api::Error::Authentication { message } => CoreError::AuthenticationFailed {
                message: message.unwrap_or_else(|| "Your session is no longer valid.".into()),
            },
            raasta_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            raasta_api::Error::InvalidUrl(e) => CoreError::ConnectionFailed {
                reason: format!("invalid service URL: {e}"),
            },
            raasta_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            raasta_api::Error::Api { status, message } => CoreError::Api {
                message: message.unwrap_or_else(|| format!("HTTP {status}")),
                status: Some(status),
            },
            raasta_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Internal(format!("JSON error: {err}"))
    }
}
