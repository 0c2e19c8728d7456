// ── Roadmap generation, restore, and export ──

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::controller::{ActionGuard, Controller};
use crate::error::CoreError;
use crate::event::AppEvent;
use crate::model::{GenerationRequest, Roadmap};

const GENERATION_FAILED: &str = "Generation failed";
const UNREACHABLE: &str = "Something went wrong.";
const INVALID_STRUCTURE: &str = "Invalid structure";

impl Controller {
    /// Ask the service for a new roadmap and make it current.
    ///
    /// The rate limiter is checked before any network call and charged
    /// only on success. On failure the current roadmap is untouched.
    pub async fn generate(&self, request: GenerationRequest) -> Result<Arc<Roadmap>, CoreError> {
        self.ensure_interactive()?;
        let _guard = ActionGuard::acquire(&self.inner.guards.generation, "generation")?;

        if !self.inner.limiter.check_usage_limit() {
            return Err(CoreError::RateLimited {
                limit: self.inner.limiter.policy().max_generations,
            });
        }

        let lang = self
            .inner
            .prefs
            .lang()
            .unwrap_or_else(|| self.inner.config.lang.clone());
        let wire = request.into_wire(&lang);
        info!(goal = %wire.goal, lang = %wire.lang, "generating roadmap");

        let doc = self.inner.client.generate(&wire).await.map_err(|e| {
            warn!(error = %e, "generation request failed");
            let message = match &e {
                raasta_api::Error::Api { message, .. } => {
                    message.as_deref().unwrap_or(GENERATION_FAILED)
                }
                other => other.server_message().unwrap_or(UNREACHABLE),
            };
            CoreError::GenerationFailed {
                message: message.to_owned(),
            }
        })?;

        let roadmap = Roadmap::from_document(doc).map_err(|e| {
            warn!(error = %e, "generated document rejected");
            CoreError::GenerationFailed {
                message: INVALID_STRUCTURE.into(),
            }
        })?;

        self.inner.limiter.record_generation();
        let roadmap = self.adopt_roadmap(roadmap);
        self.inner
            .sync
            .push(&self.session(), Some(Arc::clone(&roadmap)))
            .await;
        Ok(roadmap)
    }

    /// Replace the current roadmap with a previously exported document.
    pub async fn restore(&self, doc: Value) -> Result<Arc<Roadmap>, CoreError> {
        self.ensure_interactive()?;
        let _guard = ActionGuard::acquire(&self.inner.guards.restore, "restore")?;

        let roadmap = self.adopt_roadmap(Roadmap::from_document(doc)?);
        self.inner
            .sync
            .push(&self.session(), Some(Arc::clone(&roadmap)))
            .await;
        Ok(roadmap)
    }

    /// [`restore`](Self::restore) from raw file contents.
    pub async fn restore_from_str(&self, raw: &str) -> Result<Arc<Roadmap>, CoreError> {
        let doc: Value = serde_json::from_str(raw).map_err(|e| CoreError::InvalidRoadmap {
            reason: e.to_string(),
        })?;
        self.restore(doc).await
    }

    /// The current roadmap as standalone pretty JSON.
    pub fn export_json(&self) -> Result<String, CoreError> {
        self.inner
            .store
            .current()
            .ok_or(CoreError::NoRoadmap)?
            .to_pretty_json()
    }

    pub(crate) fn adopt_roadmap(&self, roadmap: Roadmap) -> Arc<Roadmap> {
        let roadmap = self.inner.store.replace(roadmap);
        let progress = roadmap.progress();
        self.emit(AppEvent::RoadmapReplaced {
            name: roadmap.name.clone(),
            progress,
        });
        if progress == 100 {
            info!(name = %roadmap.name, "roadmap arrived complete");
            self.emit(AppEvent::CompletionReached);
        }
        roadmap
    }
}
