// ── Email + one-time-code login ──
//
// `LoginFlow` is the per-attempt state machine; the controller methods
// below drive it against the service. A failed step never advances the
// flow: a bad code leaves the attempt waiting for another code.

use std::time::Duration;

use raasta_api::Error as ApiError;
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::controller::{ActionGuard, Controller};
use crate::error::CoreError;
use crate::event::{Alert, AppEvent};
use crate::session::SessionState;
use crate::sync::best_effort;

const SEND_FAILED: &str = "Could not send a login code. Please try again.";
const VERIFY_FAILED: &str = "Could not verify email. Please try again.";

/// Where the current login attempt stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoginState {
    #[default]
    EmailEntry,
    /// A code was sent; the email is frozen until cancel.
    OtpPending { email: String },
    Verified { email: String },
}

/// A successful code request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRequested {
    pub email: String,
    /// Echoed by development deployments only.
    pub dev_otp: Option<String>,
}

/// Login attempt state machine. Pure: no I/O.
#[derive(Debug, Default)]
pub struct LoginFlow {
    state: LoginState,
}

impl LoginFlow {
    pub fn state(&self) -> &LoginState {
        &self.state
    }

    /// Validate an email for a code request and return it trimmed.
    ///
    /// While a code is pending only the same email may ask again.
    pub fn begin(&self, email: &str) -> Result<String, CoreError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "Please enter a valid email.".into(),
            });
        }
        if let LoginState::OtpPending { email: pending } = &self.state {
            if pending != email {
                return Err(CoreError::ValidationFailed {
                    message: format!(
                        "A code was already sent to {pending}. Cancel to use a different email."
                    ),
                });
            }
        }
        Ok(email.to_owned())
    }

    pub fn code_sent(&mut self, email: String) {
        self.state = LoginState::OtpPending { email };
    }

    /// The email awaiting a code.
    pub fn pending_email(&self) -> Result<String, CoreError> {
        match &self.state {
            LoginState::OtpPending { email } => Ok(email.clone()),
            _ => Err(CoreError::ValidationFailed {
                message: "Request a login code first.".into(),
            }),
        }
    }

    pub fn verified(&mut self, email: String) {
        self.state = LoginState::Verified { email };
    }

    pub fn cancel(&mut self) {
        self.state = LoginState::EmailEntry;
    }
}

fn login_failure(err: &ApiError, fallback: &str) -> CoreError {
    warn!(error = %err, "login step failed");
    CoreError::LoginFailed {
        message: err
            .server_message()
            .map_or_else(|| fallback.to_owned(), str::to_owned),
    }
}

impl Controller {
    pub async fn login_state(&self) -> LoginState {
        self.inner.login.lock().await.state().clone()
    }

    /// Ask the service to email a one-time code.
    pub async fn request_login_code(&self, email: &str) -> Result<OtpRequested, CoreError> {
        self.ensure_interactive()?;
        let _guard = ActionGuard::acquire(&self.inner.guards.login, "login")?;

        let email = self.inner.login.lock().await.begin(email)?;
        let resp = self
            .inner
            .client
            .send_otp(&email)
            .await
            .map_err(|e| login_failure(&e, SEND_FAILED))?;

        self.inner.login.lock().await.code_sent(email.clone());
        info!(%email, "login code sent");
        if resp.dev_otp.is_some() {
            debug!("service echoed a development code");
        }
        Ok(OtpRequested {
            email,
            dev_otp: resp.dev_otp,
        })
    }

    /// Verify the emailed code and adopt the new session.
    ///
    /// A roadmap already in memory is saved to the account; otherwise the
    /// account's saved roadmap (if any) is loaded.
    pub async fn verify_login_code(&self, code: &str) -> Result<SessionState, CoreError> {
        self.ensure_interactive()?;
        let _guard = ActionGuard::acquire(&self.inner.guards.login, "login")?;

        let code = code.trim();
        if code.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "Please enter the code from your email.".into(),
            });
        }
        let email = self.inner.login.lock().await.pending_email()?;

        let resp = self
            .inner
            .client
            .verify_otp(&email, code)
            .await
            .map_err(|e| login_failure(&e, VERIFY_FAILED))?;

        self.inner.login.lock().await.verified(resp.email.clone());
        self.adopt_session(&resp.email, Some(resp.expires_at)).await;

        if let Some(roadmap) = self.inner.store.current() {
            self.inner
                .sync
                .push_now(&self.session(), Some(roadmap))
                .await;
            self.emit(AppEvent::Alert(Alert::new(
                "Success",
                "Your roadmap is now saved!",
            )));
        } else {
            self.bootstrap().await;
        }
        Ok(self.session())
    }

    /// Abandon the current attempt.
    pub async fn cancel_login(&self) {
        self.inner.login.lock().await.cancel();
    }

    /// Record a server-issued identity and start watching its deadline.
    pub(crate) async fn adopt_session(&self, email: &str, expires_at: Option<i64>) {
        self.inner.session.authenticate(email, expires_at);
        if let Some(cookie) = self.inner.client.cookie_header() {
            self.inner.prefs.set_session_cookie(&SecretString::from(cookie));
        }
        if expires_at.is_some() {
            self.arm_monitor().await;
        }
        self.emit(AppEvent::SessionChanged(self.session()));
    }

    /// End the session remotely (best-effort) and reset all local state.
    pub async fn logout(&self) -> Result<(), CoreError> {
        let _guard = ActionGuard::acquire(&self.inner.guards.logout, "logout")?;
        best_effort("logout", self.inner.client.logout()).await;
        self.reset_local().await;
        info!("logged out");
        Ok(())
    }

    /// Time left before the session deadline, if one is known.
    pub fn session_remaining(&self) -> Option<Duration> {
        let expires_at = self.session().expires_at()?;
        let remaining = expires_at.saturating_sub(self.inner.clock.now_ms());
        Some(Duration::from_millis(u64::try_from(remaining).unwrap_or(0)))
    }
}
