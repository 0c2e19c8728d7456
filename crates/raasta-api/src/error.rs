use thiserror::Error;

/// Failures talking to the Smart Raasta backend.
///
/// `raasta-core` turns these into alerts; the server's own `error` text is
/// preserved so it can be shown verbatim.
#[derive(Debug, Error)]
pub enum Error {
    /// 401 from an identity-bearing endpoint. `message` is the server's
    /// `error` field when the body carried one.
    #[error(
        "Authentication failed: {}",
        .message.as_deref().unwrap_or("no active session")
    )]
    Authentication { message: Option<String> },

    /// The request never produced a response (refused, DNS, timeout).
    #[error("Could not reach the server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Bad server address: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Custom CA could not be loaded or the client could not be built.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Any other non-2xx status.
    #[error(
        "Server returned HTTP {status}: {}",
        .message.as_deref().unwrap_or("no message")
    )]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// A 2xx body that did not match the expected shape. `body` keeps the
    /// raw payload for `-vv` logging.
    #[error("Unexpected response body: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// The message the server attached to a failed response, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } | Self::Authentication { message } => message.as_deref(),
            _ => None,
        }
    }

    /// Session cookie missing, expired, or refused.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}
