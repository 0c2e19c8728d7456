// ── Roadmap store ──
//
// Holds the one roadmap the client is working on. The current value sits
// behind a `watch` channel so renderers can subscribe to replacements and
// toggles without polling. Mutation is synchronous: whole-document
// replace, or a status flip.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tokio::sync::watch;
use tracing::debug;

use crate::error::CoreError;
use crate::model::{Roadmap, Skill, SkillStatus};

/// Result of a successful toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub skill_id: String,
    pub status: SkillStatus,
    pub progress: u8,
    /// True the first time this roadmap instance reaches 100%.
    pub completion_reached: bool,
}

/// The current roadmap plus its completion latch.
pub struct RoadmapStore {
    current: watch::Sender<Option<Arc<Roadmap>>>,
    /// Set once completion has been announced. Each replace re-arms it from
    /// the new document's progress.
    completion_latch: AtomicBool,
}

impl Default for RoadmapStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RoadmapStore {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current,
            completion_latch: AtomicBool::new(false),
        }
    }

    /// Validate and adopt a raw document. On error the store is unchanged.
    pub fn load(&self, doc: Value) -> Result<Arc<Roadmap>, CoreError> {
        let roadmap = Roadmap::from_document(doc)?;
        Ok(self.replace(roadmap))
    }

    /// Adopt an already-parsed roadmap. A document that arrives at 100%
    /// counts as its completion, so later toggles won't announce it again.
    pub fn replace(&self, roadmap: Roadmap) -> Arc<Roadmap> {
        let roadmap = Arc::new(roadmap);
        debug!(
            name = %roadmap.name,
            skills = roadmap.skill_count(),
            "roadmap replaced"
        );
        self.completion_latch
            .store(roadmap.progress() == 100, Ordering::SeqCst);
        self.current.send_replace(Some(Arc::clone(&roadmap)));
        roadmap
    }

    /// Drop the current roadmap.
    pub fn clear(&self) {
        self.completion_latch.store(false, Ordering::SeqCst);
        self.current.send_replace(None);
    }

    /// Cheap snapshot of the current roadmap.
    pub fn current(&self) -> Option<Arc<Roadmap>> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Roadmap>>> {
        self.current.subscribe()
    }

    pub fn find_skill(&self, id: &str) -> Option<Skill> {
        self.current.borrow().as_ref()?.find_skill(id).cloned()
    }

    pub fn progress(&self) -> u8 {
        self.current.borrow().as_ref().map_or(0, |r| r.progress())
    }

    /// Flip a skill between completed and incomplete.
    ///
    /// The first skill with `id` in each milestone is flipped; the outcome
    /// reports the earliest one. Subscribers are notified only when
    /// something actually changed.
    pub fn toggle_completion(&self, id: &str) -> Result<ToggleOutcome, CoreError> {
        let mut result = Err(CoreError::NoRoadmap);

        self.current.send_if_modified(|slot| {
            let Some(roadmap) = slot.as_mut() else {
                return false;
            };
            let roadmap = Arc::make_mut(roadmap);
            let Some(status) = roadmap.toggle_status(id) else {
                result = Err(CoreError::SkillNotFound { id: id.to_owned() });
                return false;
            };
            result = Ok((status, roadmap.progress()));
            true
        });

        let (status, progress) = result?;
        let completion_reached =
            progress == 100 && !self.completion_latch.swap(true, Ordering::SeqCst);

        Ok(ToggleOutcome {
            skill_id: id.to_owned(),
            status,
            progress,
            completion_reached,
        })
    }
}
