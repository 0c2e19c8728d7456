// ── Domain model ──
//
// The roadmap document as the client holds it, plus the generation
// questionnaire. Everything here is plain data with no I/O.

pub mod rating;
pub mod request;
pub mod roadmap;

// ── Re-exports ──────────────────────────────────────────────────────

pub use rating::StarRating;
pub use request::GenerationRequest;
pub use roadmap::{Milestone, Resource, Roadmap, Skill, SkillStatus};
