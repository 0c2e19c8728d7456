// ── Runtime client configuration ──
//
// Describes which service to talk to and the enforced client-side limits.
// Never touches disk: the CLI builds a `ClientConfig` from raasta-config
// and its own flags, then hands it to `Controller`.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// The hosted roadmap service.
pub const DEFAULT_SERVER_URL: &str = "https://smartrasta.timespace.workers.dev";

/// Fallback language for generation requests.
pub const DEFAULT_LANG: &str = "en";

/// Rolling-window cap on roadmap generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_generations: usize,
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_generations: 50,
            window: Duration::from_secs(60 * 60),
        }
    }
}

/// Configuration for a single client session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service base URL.
    pub url: Url,
    /// Request timeout.
    pub timeout: Duration,
    /// Language sent with generation requests when no preference is stored.
    pub lang: String,
    /// Bypass the generation rate limit. Runtime only, never persisted.
    pub admin_override: bool,
    pub rate_limit: RateLimitPolicy,
    /// How long before the deadline the expiry warning fires.
    pub expiry_warning_lead: Duration,
    /// Session monitor tick.
    pub monitor_interval: Duration,
    /// Extra CA certificate (PEM) to trust.
    pub ca_cert: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_SERVER_URL).expect("default server URL is valid"),
            timeout: Duration::from_secs(60),
            lang: DEFAULT_LANG.into(),
            admin_override: false,
            rate_limit: RateLimitPolicy::default(),
            expiry_warning_lead: Duration::from_secs(10 * 60),
            monitor_interval: Duration::from_secs(1),
            ca_cert: None,
        }
    }
}
