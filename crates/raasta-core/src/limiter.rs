// ── Generation rate limiter ──
//
// A rolling-window cap kept entirely on the client. The ledger of past
// generation times lives in the settings store so it survives restarts.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::clock::{Clock, duration_ms};
use crate::config::RateLimitPolicy;
use crate::settings::{SettingsStore, keys};

/// Client-side generation quota.
pub struct RateLimiter {
    policy: RateLimitPolicy,
    settings: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    /// Runtime-only bypass.
    admin_override: bool,
}

impl RateLimiter {
    pub fn new(
        policy: RateLimitPolicy,
        settings: Arc<dyn SettingsStore>,
        clock: Arc<dyn Clock>,
        admin_override: bool,
    ) -> Self {
        Self {
            policy,
            settings,
            clock,
            admin_override,
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    pub fn is_admin(&self) -> bool {
        self.admin_override
    }

    /// Whether another generation is allowed right now.
    ///
    /// Prunes and persists the ledger as a side effect.
    pub fn check_usage_limit(&self) -> bool {
        if self.admin_override {
            return true;
        }
        let ledger = self.pruned_ledger();
        ledger.len() < self.policy.max_generations
    }

    /// Record a successful generation at the current time.
    pub fn record_generation(&self) {
        if self.admin_override {
            return;
        }
        let mut ledger = self.pruned_ledger();
        ledger.push(self.clock.now_ms());
        self.persist(&ledger);
        debug!(used = ledger.len(), "generation recorded");
    }

    /// Generations left in the current window. `None` in admin mode.
    pub fn remaining(&self) -> Option<usize> {
        if self.admin_override {
            return None;
        }
        Some(
            self.policy
                .max_generations
                .saturating_sub(self.pruned_ledger().len()),
        )
    }

    /// Time until the oldest entry leaves the window, when the cap is hit.
    pub fn next_slot_in(&self) -> Option<Duration> {
        if self.check_usage_limit() {
            return None;
        }
        // Ledger values come from disk and may be arbitrary.
        let oldest = self.pruned_ledger().into_iter().min()?;
        let wait_ms = oldest
            .saturating_add(duration_ms(self.policy.window))
            .saturating_sub(self.clock.now_ms());
        u64::try_from(wait_ms).ok().map(Duration::from_millis)
    }

    // ── Ledger persistence ───────────────────────────────────────────

    fn pruned_ledger(&self) -> Vec<i64> {
        let cutoff = self
            .clock
            .now_ms()
            .saturating_sub(duration_ms(self.policy.window));
        let ledger = self.read_ledger();
        let before = ledger.len();
        let pruned: Vec<i64> = ledger.into_iter().filter(|t| *t > cutoff).collect();
        if pruned.len() != before {
            self.persist(&pruned);
        }
        pruned
    }

    fn read_ledger(&self) -> Vec<i64> {
        match self.settings.get(keys::GENERATION_LEDGER) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_i64).collect(),
            Some(other) => {
                warn!(value = %other, "ignoring malformed generation ledger");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn persist(&self, ledger: &[i64]) {
        let value = Value::Array(ledger.iter().map(|t| Value::from(*t)).collect());
        if let Err(e) = self.settings.set(keys::GENERATION_LEDGER, value) {
            warn!(error = %e, "failed to persist generation ledger");
        }
    }
}
