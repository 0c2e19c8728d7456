// Session endpoints
//
// Email + one-time-code login, the `/load` session probe, and logout.
// `/verify-otp` sets the session cookie in the client's jar; every
// later request carries it automatically.

use serde_json::json;
use tracing::debug;

use crate::client::RaastaClient;
use crate::error::Error;
use crate::models::{LoadResponse, SendOtpResponse, VerifyOtpResponse};

impl RaastaClient {
    /// Probe the current session and fetch any saved roadmap.
    ///
    /// `GET /load`
    pub async fn load(&self) -> Result<LoadResponse, Error> {
        debug!("probing session");
        self.get("load").await
    }

    /// Ask the service to email a one-time code.
    ///
    /// `POST /send-otp` with `{"email": ...}`. Development deployments
    /// echo the code back as `dev_otp`.
    pub async fn send_otp(&self, email: &str) -> Result<SendOtpResponse, Error> {
        debug!(email, "requesting one-time code");
        self.post_lenient("send-otp", &json!({ "email": email }))
            .await
    }

    /// Verify the emailed code and open a session.
    ///
    /// `POST /verify-otp` with `{"email": ..., "otp": ...}`.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<VerifyOtpResponse, Error> {
        debug!(email, "verifying one-time code");
        let resp: VerifyOtpResponse = self
            .post("verify-otp", &json!({ "email": email, "otp": otp }))
            .await?;
        debug!(expires_at = resp.expires_at, "session opened");
        Ok(resp)
    }

    /// End the current session and clear the cookie server-side.
    ///
    /// `POST /logout`
    pub async fn logout(&self) -> Result<(), Error> {
        debug!("logging out");
        self.post_no_response("logout", None::<&serde_json::Value>)
            .await?;
        debug!("logout complete");
        Ok(())
    }
}
