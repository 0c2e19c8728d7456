// ── Generation questionnaire ──

use raasta_api::GenerateRequest;
use serde::{Deserialize, Serialize};

/// What the user asked for. `lang` is optional here; the controller fills
/// it from preferences or config before sending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub goal: String,
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl GenerationRequest {
    pub(crate) fn into_wire(self, fallback_lang: &str) -> GenerateRequest {
        let lang = self
            .lang
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| fallback_lang.to_owned());
        GenerateRequest {
            goal: self.goal,
            interests: self.interests,
            education: self.education,
            location: self.location,
            lang,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_lang_wins() {
        let req = GenerationRequest {
            goal: "Data Science".into(),
            lang: Some("ur".into()),
            ..Default::default()
        };
        assert_eq!(req.into_wire("en").lang, "ur");
    }

    #[test]
    fn blank_lang_falls_back() {
        let req = GenerationRequest {
            lang: Some(" ".into()),
            ..Default::default()
        };
        assert_eq!(req.into_wire("en").lang, "en");
    }
}
