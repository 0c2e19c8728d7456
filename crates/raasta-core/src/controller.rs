// ── Controller ──
//
// The single application-state object. Owns the roadmap store, session
// tracker, rate limiter and sync client, and runs the session-expiry
// monitor. Login lives in `auth.rs`, generation and restore in
// `generation.rs`; both are inherent impls on `Controller`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use raasta_api::{RaastaClient, TlsMode, TransportConfig};
use secrecy::ExposeSecret;
use serde_json::Value;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::LoginFlow;
use crate::clock::{Clock, SystemClock};
use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::event::{Alert, AppEvent};
use crate::limiter::RateLimiter;
use crate::model::{Roadmap, Skill};
use crate::prefs::Preferences;
use crate::session::{SessionState, SessionTracker, SessionTransition};
use crate::settings::SettingsStore;
use crate::store::{RoadmapStore, ToggleOutcome};
use crate::sync::{SyncClient, best_effort};

const EVENT_CHANNEL_SIZE: usize = 64;

// ── Single-flight guards ─────────────────────────────────────────

#[derive(Debug, Default)]
pub(crate) struct ActionGuards {
    pub(crate) generation: AtomicBool,
    pub(crate) login: AtomicBool,
    pub(crate) logout: AtomicBool,
    pub(crate) restore: AtomicBool,
}

/// Holds an action's in-progress flag; clears it on drop.
pub(crate) struct ActionGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ActionGuard<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool, action: &'static str) -> Result<Self, CoreError> {
        if flag.swap(true, Ordering::SeqCst) {
            return Err(CoreError::Busy { action });
        }
        Ok(Self { flag })
    }
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Every operation that
/// changes state announces it on the [`AppEvent`] broadcast channel.
#[derive(Clone)]
pub struct Controller {
    pub(crate) inner: Arc<ControllerInner>,
}

pub(crate) struct ControllerInner {
    pub(crate) config: ClientConfig,
    pub(crate) client: RaastaClient,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) prefs: Preferences,
    pub(crate) store: RoadmapStore,
    pub(crate) session: SessionTracker,
    pub(crate) limiter: RateLimiter,
    pub(crate) sync: SyncClient,
    pub(crate) login: Mutex<LoginFlow>,
    pub(crate) guards: ActionGuards,
    event_tx: broadcast::Sender<AppEvent>,
    cancel: CancellationToken,
    /// Running expiry monitor: its own token plus the task handle.
    monitor: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl Controller {
    /// Build a controller talking to `config.url`.
    ///
    /// A session cookie persisted by an earlier run is seeded into the
    /// client's jar. Does no network I/O; call
    /// [`bootstrap()`](Self::bootstrap) to probe the session.
    pub fn new(config: ClientConfig, settings: Arc<dyn SettingsStore>) -> Result<Self, CoreError> {
        let tls = config
            .ca_cert
            .clone()
            .map_or(TlsMode::System, TlsMode::CustomCa);
        let transport = TransportConfig {
            tls,
            ..TransportConfig::default()
        }
        .with_timeout(config.timeout)
        .with_cookie_jar();

        let client = RaastaClient::new(&config.url, &transport)?;
        let controller = Self::from_parts(config, client, settings, Arc::new(SystemClock));

        if let Some(cookie) = controller.inner.prefs.session_cookie() {
            controller
                .inner
                .client
                .restore_cookie_header(cookie.expose_secret());
        }
        Ok(controller)
    }

    /// Assemble a controller from pre-built collaborators.
    pub fn from_parts(
        config: ClientConfig,
        client: RaastaClient,
        settings: Arc<dyn SettingsStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let limiter = RateLimiter::new(
            config.rate_limit,
            Arc::clone(&settings),
            Arc::clone(&clock),
            config.admin_override,
        );
        let session = SessionTracker::new(config.expiry_warning_lead);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

        Self {
            inner: Arc::new(ControllerInner {
                prefs: Preferences::new(settings),
                sync: SyncClient::new(client.clone()),
                store: RoadmapStore::new(),
                login: Mutex::new(LoginFlow::default()),
                guards: ActionGuards::default(),
                cancel: CancellationToken::new(),
                monitor: Mutex::new(None),
                config,
                client,
                clock,
                session,
                limiter,
                event_tx,
            }),
        }
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &RaastaClient {
        &self.inner.client
    }

    pub fn store(&self) -> &RoadmapStore {
        &self.inner.store
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.inner.limiter
    }

    pub fn prefs(&self) -> &Preferences {
        &self.inner.prefs
    }

    pub fn session(&self) -> SessionState {
        self.inner.session.state()
    }

    pub fn roadmap(&self) -> Option<Arc<Roadmap>> {
        self.inner.store.current()
    }

    pub fn find_skill(&self, id: &str) -> Option<Skill> {
        self.inner.store.find_skill(id)
    }

    pub fn progress(&self) -> u8 {
        self.inner.store.progress()
    }

    // ── Subscriptions ────────────────────────────────────────────

    pub fn events(&self) -> broadcast::Receiver<AppEvent> {
        self.inner.event_tx.subscribe()
    }

    pub fn session_changes(&self) -> watch::Receiver<SessionState> {
        self.inner.session.subscribe()
    }

    pub fn roadmap_changes(&self) -> watch::Receiver<Option<Arc<Roadmap>>> {
        self.inner.store.subscribe()
    }

    pub(crate) fn emit(&self, event: AppEvent) {
        // No receivers is fine.
        let _ = self.inner.event_tx.send(event);
    }

    /// Fails once the session has expired, until [`reload`](Self::reload).
    pub(crate) fn ensure_interactive(&self) -> Result<(), CoreError> {
        if self.session().is_expired() {
            return Err(CoreError::SessionExpired);
        }
        Ok(())
    }

    // ── Session lifecycle ────────────────────────────────────────

    /// Probe the service for an existing session and saved roadmap.
    ///
    /// Never fails: a guest, an unreachable service, or a saved document
    /// that doesn't parse all leave the controller usable.
    pub async fn bootstrap(&self) -> SessionState {
        let resp = match self.inner.client.load().await {
            Ok(resp) => resp,
            Err(e) if e.is_auth_expired() => {
                debug!("no active session");
                self.inner.prefs.clear_session_cookie();
                return self.session();
            }
            Err(e) => {
                warn!(error = %e, "session probe failed (non-fatal)");
                return self.session();
            }
        };

        match resp.identity() {
            Some(email) => {
                // A probe without `expiresAt` keeps the deadline already held for this account.
                let current = self.session();
                let expires_at = resp.expires_at.or_else(|| {
                    (current.email() == Some(email))
                        .then(|| current.expires_at())
                        .flatten()
                });
                self.adopt_session(email, expires_at).await;
            }
            None => debug!("session probe returned a guest"),
        }

        if let Some(data) = resp.data.filter(|d| !d.is_null()) {
            match Roadmap::from_document(data) {
                Ok(roadmap) => {
                    let roadmap = self.adopt_roadmap(roadmap);
                    info!(name = %roadmap.name, "saved roadmap loaded");
                }
                Err(e) => debug!(error = %e, "saved roadmap ignored"),
            }
        }
        self.session()
    }

    /// Clear everything and probe again. The only way out of `Expired`.
    pub async fn reload(&self) -> SessionState {
        self.reset_local().await;
        self.bootstrap().await
    }

    /// Drop identity and roadmap without talking to the service.
    pub(crate) async fn reset_local(&self) {
        self.stop_monitor().await;
        self.inner.session.reset();
        self.inner.store.clear();
        self.inner.login.lock().await.cancel();
        self.inner.prefs.clear_session_cookie();
        self.emit(AppEvent::SessionChanged(SessionState::Guest));
        self.emit(AppEvent::Reset);
    }

    /// Advance the session state machine to the current time.
    ///
    /// Called every second by the monitor; public so callers without a
    /// running monitor can drive it.
    pub async fn check_session(&self) -> Option<SessionTransition> {
        let transition = self.inner.session.tick(self.inner.clock.now_ms())?;

        match transition {
            SessionTransition::Warning { remaining_ms } => {
                let remaining = Duration::from_millis(u64::try_from(remaining_ms).unwrap_or(0));
                info!(remaining_secs = remaining.as_secs(), "session expiring soon");
                self.emit(AppEvent::SessionChanged(self.session()));
                self.emit(AppEvent::ExpiryWarning { remaining });
                self.emit(AppEvent::Alert(Alert::new(
                    "Session Expiring",
                    format!(
                        "Your session expires in {} minutes. Save your work and sign in again.",
                        remaining.as_secs().div_ceil(60)
                    ),
                )));
            }
            SessionTransition::Expired => {
                info!("session expired");
                self.stop_monitor().await;
                self.emit(AppEvent::SessionChanged(self.session()));
                self.emit(AppEvent::SessionExpired);
                self.emit(AppEvent::Alert(CoreError::SessionExpired.alert()));
                best_effort("logout", self.inner.client.logout()).await;
                self.inner.prefs.clear_session_cookie();
            }
        }
        Some(transition)
    }

    pub(crate) async fn arm_monitor(&self) {
        let mut slot = self.inner.monitor.lock().await;
        if let Some((token, _)) = slot.take() {
            token.cancel();
        }
        let token = self.inner.cancel.child_token();
        let handle = tokio::spawn(session_monitor_task(
            self.clone(),
            self.inner.config.monitor_interval,
            token.clone(),
        ));
        *slot = Some((token, handle));
        debug!("session monitor armed");
    }

    async fn stop_monitor(&self) {
        let monitor = self.inner.monitor.lock().await.take();
        if let Some((token, _handle)) = monitor {
            token.cancel();
            debug!("session monitor stopped");
        }
    }

    pub async fn is_monitoring(&self) -> bool {
        self.inner
            .monitor
            .lock()
            .await
            .as_ref()
            .is_some_and(|(token, _)| !token.is_cancelled())
    }

    // ── Roadmap interaction ──────────────────────────────────────

    /// Flip a skill's completion and sync the result.
    pub async fn toggle_skill(&self, id: &str) -> Result<ToggleOutcome, CoreError> {
        self.ensure_interactive()?;
        let outcome = self.inner.store.toggle_completion(id)?;

        self.emit(AppEvent::SkillToggled {
            id: outcome.skill_id.clone(),
            status: outcome.status,
            progress: outcome.progress,
        });
        if outcome.completion_reached {
            info!("roadmap completed");
            self.emit(AppEvent::CompletionReached);
        }
        self.inner
            .sync
            .push(&self.session(), self.inner.store.current())
            .await;
        Ok(outcome)
    }

    /// Load a raw document without syncing. Used for local files.
    pub fn open_document(&self, doc: Value) -> Result<Arc<Roadmap>, CoreError> {
        Ok(self.adopt_roadmap(Roadmap::from_document(doc)?))
    }

    // ── Teardown ─────────────────────────────────────────────────

    /// Wait for outstanding sync pushes.
    pub async fn flush_sync(&self) {
        self.inner.sync.flush().await;
    }

    /// Stop background work and wait for pending pushes.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let monitor = self.inner.monitor.lock().await.take();
        if let Some((_, handle)) = monitor {
            let _ = handle.await;
        }
        self.flush_sync().await;
        debug!("controller shut down");
    }
}

// ── Background tasks ─────────────────────────────────────────────

async fn session_monitor_task(controller: Controller, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if controller.check_session().await == Some(SessionTransition::Expired) {
                    break;
                }
            }
        }
    }
}
