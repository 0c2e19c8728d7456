//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use raasta_config::ConfigError;
use raasta_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const RATE_LIMITED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the roadmap service")]
    #[diagnostic(
        code(raasta::connection_failed),
        help(
            "Check your internet connection.\n\
             Reason: {reason}\n\
             Use --server to point at a different service."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(raasta::timeout),
        help("Generation can take a while. Increase the limit with --timeout.")
    )]
    Timeout,

    // ── Session ──────────────────────────────────────────────────────
    #[error("Login failed: {message}")]
    #[diagnostic(code(raasta::login_failed), help("Check the email and code, then run: raasta login"))]
    LoginFailed { message: String },

    #[error("Not signed in")]
    #[diagnostic(code(raasta::not_signed_in), help("Run: raasta login"))]
    NotSignedIn,

    #[error("Your session has expired")]
    #[diagnostic(
        code(raasta::session_expired),
        help("Sign in again with: raasta login")
    )]
    SessionExpired,

    // ── Roadmap ──────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(raasta::generation_failed))]
    GenerationFailed { message: String },

    #[error("Generation limit reached ({limit} per hour)")]
    #[diagnostic(
        code(raasta::rate_limited),
        help("See when the next slot opens with: raasta usage")
    )]
    RateLimited { limit: usize },

    #[error("The selected file is not a valid roadmap")]
    #[diagnostic(
        code(raasta::invalid_roadmap),
        help("A roadmap file needs a `milestones` array.\nDetails: {reason}")
    )]
    InvalidRoadmap { reason: String },

    #[error("No roadmap loaded")]
    #[diagnostic(
        code(raasta::no_roadmap),
        help(
            "Generate one with: raasta generate --goal \"...\"\n\
             Or work on a file with --file."
        )
    )]
    NoRoadmap,

    #[error("Skill '{id}' not found")]
    #[diagnostic(code(raasta::not_found), help("Run: raasta show to see skill IDs"))]
    SkillNotFound { id: String },

    #[error("{action} is already in progress")]
    #[diagnostic(code(raasta::busy))]
    Busy { action: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(raasta::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(raasta::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(raasta::config),
        help("Check the config file at: {path}")
    )]
    Config { message: String, path: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(raasta::json))]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(raasta::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::LoginFailed { .. } | Self::NotSignedIn | Self::SessionExpired => exit_code::AUTH,
            Self::RateLimited { .. } => exit_code::RATE_LIMITED,
            Self::NoRoadmap | Self::SkillNotFound { .. } => exit_code::NOT_FOUND,
            Self::InvalidRoadmap { .. } | Self::Validation { .. } | Self::Config { .. } => {
                exit_code::USAGE
            }
            Self::Busy { .. } => exit_code::CONFLICT,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },
            CoreError::Timeout => CliError::Timeout,
            CoreError::AuthenticationFailed { message } | CoreError::LoginFailed { message } => {
                CliError::LoginFailed { message }
            }
            CoreError::SessionExpired => CliError::SessionExpired,
            CoreError::GenerationFailed { message } => CliError::GenerationFailed { message },
            CoreError::RateLimited { limit } => CliError::RateLimited { limit },
            CoreError::InvalidRoadmap { reason } => CliError::InvalidRoadmap { reason },
            CoreError::NoRoadmap => CliError::NoRoadmap,
            CoreError::SkillNotFound { id } => CliError::SkillNotFound { id },
            CoreError::Busy { action } => CliError::Busy {
                action: action.to_owned(),
            },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Api { message, .. } => CliError::ApiError { message },
            CoreError::Settings { message } => CliError::Config {
                message,
                path: raasta_config::config_path().display().to_string(),
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
                path: raasta_config::config_path().display().to_string(),
            },
        }
    }
}
