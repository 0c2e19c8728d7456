// Wire types for the roadmap service.
//
// These mirror the JSON bodies exactly. Roadmap documents themselves
// stay as `serde_json::Value` here; shape validation and unwrapping
// belong to raasta-core.

use serde::{Deserialize, Serialize};

/// `GET /load` response: session probe plus any saved roadmap.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadResponse {
    /// Absent on older deployments; only an explicit `false` means guest.
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub email: Option<String>,
    /// Absolute session deadline in epoch milliseconds.
    #[serde(default, rename = "expiresAt")]
    pub expires_at: Option<i64>,
    /// Saved roadmap, possibly nested under `roadmap` / `career_roadmap`.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl LoadResponse {
    /// The authenticated email, unless the probe reported failure.
    pub fn identity(&self) -> Option<&str> {
        if self.success == Some(false) {
            return None;
        }
        self.email.as_deref().filter(|e| !e.trim().is_empty())
    }
}

/// `POST /send-otp` response. Development deployments echo the code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendOtpResponse {
    #[serde(default)]
    pub dev_otp: Option<String>,
}

/// `POST /verify-otp` response.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpResponse {
    pub email: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: i64,
}

/// `POST /generate` request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub goal: String,
    pub interests: String,
    pub education: String,
    pub location: String,
    pub lang: String,
}

/// Error body shape shared by every endpoint: `{"error": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.error.or(self.message).filter(|m| !m.trim().is_empty())
    }
}
