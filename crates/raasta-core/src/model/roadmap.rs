// ── Roadmap document ──
//
// Server documents vary: ids and salaries arrive as strings or numbers,
// skills may lack a status, and whole documents may be wrapped under
// `roadmap` or `career_roadmap`. Parsing is lenient about all of that but
// strict about one thing: there must be a `milestones` array.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Keys a document may be wrapped under.
const WRAPPER_KEYS: [&str; 2] = ["roadmap", "career_roadmap"];

/// How many wrapper levels are peeled before giving up.
const MAX_UNWRAP_DEPTH: usize = 2;

/// A generated career roadmap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub summary: String,
    pub milestones: Vec<Milestone>,
    /// Fields this client doesn't model, kept for save/export.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Display-only; never parsed.
    #[serde(default, deserialize_with = "string_or_number")]
    pub salary_pkr: String,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub future_growth_rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_opportunities: Option<Vec<String>>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub status: SkillStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Skill {
    /// Job roles for display, falling back to "General".
    pub fn job_roles(&self) -> Vec<&str> {
        match self.job_opportunities.as_deref() {
            Some(roles) if !roles.is_empty() => roles.iter().map(String::as_str).collect(),
            _ => vec!["General"],
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == SkillStatus::Completed
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

// ── SkillStatus ─────────────────────────────────────────────────────

/// Completion state of a skill. Anything other than `"completed"` on the
/// wire reads as incomplete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SkillStatus {
    #[default]
    Incomplete,
    Completed,
}

impl SkillStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::Completed => "completed",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Incomplete => Self::Completed,
            Self::Completed => Self::Incomplete,
        }
    }
}

impl fmt::Display for SkillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SkillStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SkillStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value.as_str() {
            Some(s) if s.eq_ignore_ascii_case("completed") => Self::Completed,
            _ => Self::Incomplete,
        })
    }
}

// ── Roadmap operations ──────────────────────────────────────────────

impl Roadmap {
    /// Parse a server or file document, peeling wrapper objects until a
    /// `milestones` array turns up.
    pub fn from_document(doc: Value) -> Result<Self, CoreError> {
        let doc = unwrap_document(doc);
        match doc.get("milestones") {
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(CoreError::InvalidRoadmap {
                    reason: "`milestones` is not an array".into(),
                });
            }
            None => {
                return Err(CoreError::InvalidRoadmap {
                    reason: "no `milestones` found".into(),
                });
            }
        }
        serde_json::from_value(doc).map_err(|e| CoreError::InvalidRoadmap {
            reason: e.to_string(),
        })
    }

    /// Parse a JSON string (e.g. an exported file).
    pub fn from_json_str(raw: &str) -> Result<Self, CoreError> {
        let doc: Value = serde_json::from_str(raw).map_err(|e| CoreError::InvalidRoadmap {
            reason: e.to_string(),
        })?;
        Self::from_document(doc)
    }

    /// Standalone pretty JSON, suitable for export.
    pub fn to_pretty_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// All skills in milestone order.
    pub fn skills(&self) -> impl Iterator<Item = &Skill> {
        self.milestones.iter().flat_map(|m| m.skills.iter())
    }

    /// First skill with the given id. Ids are not guaranteed unique.
    pub fn find_skill(&self, id: &str) -> Option<&Skill> {
        self.skills().find(|s| s.id == id)
    }

    /// Flip the first skill with `id` in every milestone. Returns the new
    /// status of the earliest one, or `None` when no milestone has it.
    pub fn toggle_status(&mut self, id: &str) -> Option<SkillStatus> {
        let mut first = None;
        for milestone in &mut self.milestones {
            if let Some(skill) = milestone.skills.iter_mut().find(|s| s.id == id) {
                skill.status = skill.status.toggled();
                if first.is_none() {
                    first = Some(skill.status);
                }
            }
        }
        first
    }

    pub fn skill_count(&self) -> usize {
        self.milestones.iter().map(|m| m.skills.len()).sum()
    }

    pub fn completed_count(&self) -> usize {
        self.skills().filter(|s| s.is_completed()).count()
    }

    /// Completion percentage, rounded half-up. Zero when there are no skills.
    pub fn progress(&self) -> u8 {
        let total = self.skill_count();
        if total == 0 {
            return 0;
        }
        let done = self.completed_count();
        let pct = (done * 200 + total) / (total * 2);
        u8::try_from(pct).unwrap_or(100)
    }
}

fn unwrap_document(mut doc: Value) -> Value {
    for _ in 0..MAX_UNWRAP_DEPTH {
        if doc.get("milestones").is_some() {
            break;
        }
        let mut map = match doc {
            Value::Object(map) => map,
            other => return other,
        };
        let inner = WRAPPER_KEYS
            .iter()
            .find_map(|key| map.remove(*key).filter(Value::is_object));
        match inner {
            Some(inner) => doc = inner,
            None => return Value::Object(map),
        }
    }
    doc
}

// ── Lenient field parsers ───────────────────────────────────────────

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn lenient_rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let rating = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0.0,
    };
    Ok(rating)
}
