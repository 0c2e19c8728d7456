// ── File-backed settings store ──
//
// One small JSON object in the data directory. Every write rewrites the
// whole file through a temp file + rename, so a crash never leaves a
// half-written document behind.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use raasta_core::{CoreError, SettingsStore};

use crate::ConfigError;

/// Settings persisted as a JSON object on disk.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl FileSettings {
    /// Open (or lazily create) the settings file at `path`.
    ///
    /// An unreadable or corrupt file is logged and treated as empty; the
    /// next write replaces it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match read_map(&path) {
            Ok(values) => values,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
                Map::new()
            }
        };
        debug!(path = %path.display(), keys = values.len(), "settings loaded");
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, values: &Map<String, Value>) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut Map<String, Value>)) -> Result<(), CoreError> {
        let mut values = self.values.lock().map_err(|_| CoreError::Settings {
            message: "settings lock poisoned".into(),
        })?;
        f(&mut values);
        self.write(&values).map_err(|e| CoreError::Settings {
            message: format!("{}: {e}", self.path.display()),
        })
    }
}

fn read_map(path: &Path) -> Result<Map<String, Value>, ConfigError> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let raw = std::fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    Ok(serde_json::from_str(&raw)?)
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), CoreError> {
        self.update(|values| {
            values.insert(key.to_owned(), value);
        })
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.update(|values| {
            values.remove(key);
        })
    }
}
