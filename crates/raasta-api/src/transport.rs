//! HTTP client construction for the Smart Raasta service.
//!
//! Generation calls can run for most of a minute, so the default timeout is
//! generous. The cookie jar carries the `session` cookie between calls.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;

use crate::error::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str = concat!("raasta/", env!("CARGO_PKG_VERSION"));

/// Which roots the client trusts.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    #[default]
    System,
    /// Bundled roots plus one extra PEM certificate, e.g. a self-hosted
    /// backend behind a private CA.
    CustomCa(PathBuf),
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::default(),
            timeout: DEFAULT_TIMEOUT,
            cookie_jar: None,
        }
    }
}

fn load_ca(path: &Path) -> Result<reqwest::Certificate, Error> {
    let pem = std::fs::read(path)
        .map_err(|e| Error::Tls(format!("cannot read {}: {e}", path.display())))?;
    reqwest::Certificate::from_pem(&pem)
        .map_err(|e| Error::Tls(format!("{} is not a PEM certificate: {e}", path.display())))
}

impl TransportConfig {
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let extra_root = match &self.tls {
            TlsMode::System => None,
            TlsMode::CustomCa(path) => Some(load_ca(path)?),
        };

        let builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout);
        let builder = extra_root
            .into_iter()
            .fold(builder, reqwest::ClientBuilder::add_root_certificate);
        let builder = match &self.cookie_jar {
            Some(jar) => builder.cookie_provider(Arc::clone(jar)),
            None => builder,
        };

        builder
            .build()
            .map_err(|e| Error::Tls(format!("cannot initialise HTTP client: {e}")))
    }

    /// Attach an empty cookie jar, replacing any existing one.
    #[must_use]
    pub fn with_cookie_jar(self) -> Self {
        Self {
            cookie_jar: Some(Arc::new(Jar::default())),
            ..self
        }
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }
}
