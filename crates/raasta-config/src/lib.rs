//! Configuration and persisted settings for Smart Raasta clients.
//!
//! A TOML config file (plus `RAASTA_*` environment overrides) says which
//! service to use and how; [`FileSettings`] keeps the small pieces of
//! state the client remembers between runs. The CLI layers its flags on
//! top and translates the result into `raasta_core::ClientConfig`.

mod settings;

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use raasta_core::ClientConfig;
use raasta_core::config::{DEFAULT_LANG, DEFAULT_SERVER_URL};

pub use settings::FileSettings;

const ENV_PREFIX: &str = "RAASTA_";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("could not load config: {0}")]
    Figment(Box<figment::Error>),

    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Roadmap service base URL.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Generation language when none is stored in preferences.
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Output format used when `--output` is not given.
    #[serde(default = "default_output")]
    pub output: String,

    /// Color mode used when `--color` is not given: "auto", "always", or "never".
    #[serde(default = "default_color")]
    pub color: String,

    /// Extra CA certificate to trust.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Where persisted settings live. Defaults to the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            timeout: default_timeout(),
            lang: default_lang(),
            output: default_output(),
            color: default_color(),
            ca_cert: None,
            data_dir: None,
        }
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.into()
}
fn default_timeout() -> u64 {
    60
}
fn default_lang() -> String {
    DEFAULT_LANG.into()
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

impl Config {
    /// Directory holding `settings.json`.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir().join(SETTINGS_FILE)
    }

    /// Translate into the runtime config the controller takes.
    pub fn to_client_config(&self) -> Result<ClientConfig, ConfigError> {
        let url: url::Url = self
            .server_url
            .parse()
            .map_err(|e| ConfigError::Validation {
                field: "server_url".into(),
                reason: format!("invalid URL '{}': {e}", self.server_url),
            })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: "server_url".into(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }

        Ok(ClientConfig {
            url,
            timeout: Duration::from_secs(self.timeout),
            lang: self.lang.clone(),
            ca_cert: self.ca_cert.clone(),
            ..ClientConfig::default()
        })
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("pk", "smartraasta", "raasta")
}

/// `config.toml` under the platform config dir (XDG on Linux).
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn default_data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn home_fallback(sub: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(sub);
    p.push("raasta");
    p
}

/// Load config from the canonical path plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` plus environment. A missing file is fine.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).only(&[
            "server_url",
            "timeout",
            "lang",
            "output",
            "color",
            "ca_cert",
            "data_dir",
        ]));

    let config: Config = figment.extract()?;
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.server_url, DEFAULT_SERVER_URL);
        assert_eq!(cfg.lang, "en");
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "server_url = \"http://localhost:8787\"\ntimeout = 5\nlang = \"ur\"\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.server_url, "http://localhost:8787");
        assert_eq!(cfg.timeout, 5);
        assert_eq!(cfg.output, "table");

        let client = cfg.to_client_config().unwrap();
        assert_eq!(client.url.as_str(), "http://localhost:8787/");
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(client.lang, "ur");
        assert!(!client.admin_override);
    }

    #[test]
    fn display_and_data_dir_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let data = dir.path().join("data");
        std::fs::write(
            &path,
            format!(
                "output = \"json\"\ncolor = \"never\"\ndata_dir = {:?}\n",
                data.display().to_string()
            ),
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.output, "json");
        assert_eq!(cfg.color, "never");
        assert_eq!(cfg.settings_path(), data.join("settings.json"));
    }

    #[test]
    fn invalid_url_rejected() {
        let cfg = Config {
            server_url: "not a url".into(),
            ..Config::default()
        };
        assert!(matches!(
            cfg.to_client_config(),
            Err(ConfigError::Validation { ref field, .. }) if field == "server_url"
        ));

        let ftp = Config {
            server_url: "ftp://example.org".into(),
            ..Config::default()
        };
        assert!(ftp.to_client_config().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let cfg = Config {
            timeout: 0,
            ..Config::default()
        };
        assert!(cfg.to_client_config().is_err());
    }
}
