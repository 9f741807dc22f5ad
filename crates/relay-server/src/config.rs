//! Server configuration from environment.

use std::env;
use std::time::Duration;

use relay_core::{BackoffPolicy, MonitorConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub feed_url: String,
    pub feed_auth_token: String,
    pub feeds: Vec<String>,
    pub webhook_url: Option<String>,
    pub poll_interval_secs: u64,
    pub abort_base_ms: u64,
    pub http_base_ms: u64,
    pub generic_base_ms: u64,
    pub backoff_growth: u32,
    pub backoff_ceiling_ms: u64,
    pub backoff_cooldown_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env_parse("RELAY_PORT", 3000),
            feed_url: env::var("FEED_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            feed_auth_token: env::var("FEED_AUTH_TOKEN").unwrap_or_default(),
            feeds: env::var("RELAY_FEEDS")
                .unwrap_or_else(|_| "news".to_string())
                .split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
            webhook_url: env::var("RELAY_WEBHOOK_URL")
                .ok()
                .filter(|value| !value.trim().is_empty()),
            poll_interval_secs: env_parse("RELAY_POLL_SECS", 30),
            abort_base_ms: env_parse("RELAY_ABORT_BASE_MS", 0),
            http_base_ms: env_parse("RELAY_HTTP_BASE_MS", 180_000),
            generic_base_ms: env_parse("RELAY_GENERIC_BASE_MS", 30_000),
            backoff_growth: env_parse("RELAY_BACKOFF_GROWTH", 2),
            backoff_ceiling_ms: env_parse("RELAY_BACKOFF_CEILING_MS", 900_000),
            backoff_cooldown_ms: env_parse("RELAY_BACKOFF_COOLDOWN_MS", 900_000),
        }
    }

    /// Backoff tuning for the process-wide failure monitor.
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            abort: self.policy(self.abort_base_ms),
            http: self.policy(self.http_base_ms),
            generic: self.policy(self.generic_base_ms),
        }
    }

    fn policy(&self, base_ms: u64) -> BackoffPolicy {
        BackoffPolicy {
            base_timeout: Duration::from_millis(base_ms),
            growth: self.backoff_growth,
            ceiling: Duration::from_millis(self.backoff_ceiling_ms),
            cooldown: Duration::from_millis(self.backoff_cooldown_ms),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
