// ── Typed view over the settings store ──

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use tracing::warn;

use crate::settings::{SettingsStore, keys};

/// Colour theme preference. Renderers decide what it means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Preferences and small flags backed by a [`SettingsStore`].
///
/// Writes are best-effort: a failed write is logged and the in-process
/// behaviour continues unchanged.
#[derive(Clone)]
pub struct Preferences {
    settings: Arc<dyn SettingsStore>,
}

impl Preferences {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    pub fn theme(&self) -> Theme {
        self.get_str(keys::THEME)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.put(keys::THEME, Value::String(theme.to_string()));
    }

    /// Stored language code, if the user picked one.
    pub fn lang(&self) -> Option<String> {
        self.get_str(keys::LANG).filter(|l| !l.trim().is_empty())
    }

    pub fn set_lang(&self, lang: &str) {
        self.put(keys::LANG, Value::String(lang.to_owned()));
    }

    pub fn visited_before(&self) -> bool {
        self.settings
            .get(keys::VISITED_BEFORE)
            .is_some_and(|v| v.as_bool() == Some(true) || v.as_str() == Some("true"))
    }

    pub fn mark_visited(&self) {
        self.put(keys::VISITED_BEFORE, Value::Bool(true));
    }

    pub fn session_cookie(&self) -> Option<SecretString> {
        self.get_str(keys::SESSION_COOKIE).map(SecretString::from)
    }

    pub fn set_session_cookie(&self, cookie: &SecretString) {
        self.put(
            keys::SESSION_COOKIE,
            Value::String(cookie.expose_secret().to_owned()),
        );
    }

    pub fn clear_session_cookie(&self) {
        if let Err(e) = self.settings.remove(keys::SESSION_COOKIE) {
            warn!(error = %e, "failed to clear session cookie");
        }
    }

    fn get_str(&self, key: &str) -> Option<String> {
        self.settings
            .get(key)
            .and_then(|v| v.as_str().map(str::to_owned))
    }

    fn put(&self, key: &str, value: Value) {
        if let Err(e) = self.settings.set(key, value) {
            warn!(key, error = %e, "failed to persist setting");
        }
    }
}
