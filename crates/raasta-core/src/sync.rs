// ── Account sync ──
//
// Mirrors the current roadmap to the signed-in account. Pushes are
// fire-and-forget: no retry, no ordering, failures only logged.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use raasta_api::RaastaClient;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::model::Roadmap;
use crate::session::SessionState;

/// Run a remote call whose failure must not affect local state.
pub(crate) async fn best_effort<T, E: Display>(
    what: &str,
    fut: impl Future<Output = Result<T, E>>,
) -> Option<T> {
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "{what} failed (non-fatal)");
            None
        }
    }
}

/// Best-effort `/save` pusher.
pub struct SyncClient {
    client: RaastaClient,
    tasks: Mutex<JoinSet<()>>,
}

impl SyncClient {
    pub fn new(client: RaastaClient) -> Self {
        Self {
            client,
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Spawn a background push. Returns whether one was started.
    pub async fn push(&self, session: &SessionState, roadmap: Option<Arc<Roadmap>>) -> bool {
        let Some(roadmap) = Self::eligible(session, roadmap) else {
            return false;
        };
        let client = self.client.clone();

        let mut tasks = self.tasks.lock().await;
        // Reap finished pushes so the set doesn't grow unbounded.
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            best_effort("roadmap sync", client.save(roadmap.as_ref())).await;
        });
        true
    }

    /// Push and wait for the result. Returns whether the save succeeded.
    pub async fn push_now(&self, session: &SessionState, roadmap: Option<Arc<Roadmap>>) -> bool {
        let Some(roadmap) = Self::eligible(session, roadmap) else {
            return false;
        };
        best_effort("roadmap sync", self.client.save(roadmap.as_ref()))
            .await
            .is_some()
    }

    /// Wait for every outstanding push.
    pub async fn flush(&self) {
        let mut tasks = std::mem::take(&mut *self.tasks.lock().await);
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "sync task panicked");
            }
        }
    }

    fn eligible(session: &SessionState, roadmap: Option<Arc<Roadmap>>) -> Option<Arc<Roadmap>> {
        if !session.is_authenticated() {
            debug!("not signed in, sync skipped");
            return None;
        }
        if roadmap.is_none() {
            debug!("no roadmap, sync skipped");
        }
        roadmap
    }
}
