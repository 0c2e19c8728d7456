// ── Persisted client settings ──
//
// Simple key-value storage for everything the client keeps between runs:
// preferences, the "visited before" flag, the rate-limit ledger, and the
// session cookie. Core never touches disk itself; raasta-config provides
// the file-backed implementation.

use dashmap::DashMap;

use crate::error::CoreError;

/// Well-known setting keys.
pub mod keys {
    pub const THEME: &str = "theme";
    pub const LANG: &str = "lang";
    pub const VISITED_BEFORE: &str = "visitedBefore";
    /// JSON array of epoch-millisecond generation timestamps.
    pub const GENERATION_LEDGER: &str = "generationTimestamps";
    pub const SESSION_COOKIE: &str = "sessionCookie";
}

/// Key-value settings persisted on the client.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<serde_json::Value>;

    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), CoreError>;

    fn remove(&self, key: &str) -> Result<(), CoreError>;
}

/// In-memory settings. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: DashMap<String, serde_json::Value>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.values.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), CoreError> {
        self.values.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn set_get_remove() {
        let settings = MemorySettings::new();
        assert!(settings.get(keys::THEME).is_none());

        settings.set(keys::THEME, json!("light")).expect("set");
        assert_eq!(settings.get(keys::THEME), Some(json!("light")));

        settings.remove(keys::THEME).expect("remove");
        assert!(settings.get(keys::THEME).is_none());
    }
}
