//! Environment-driven configuration.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use quizhub_room::{PacingConfig, RegistryConfig};

/// Server configuration, read from the environment with sensible
/// defaults for local development.
#[derive(Debug, Clone)]
pub struct Config {
    /// Realtime websocket listener address (`QUIZHUB_WS_ADDR`).
    pub ws_addr: String,
    /// HTTP API address (`QUIZHUB_HTTP_ADDR`).
    pub http_addr: SocketAddr,
    /// How often empty rooms are swept (`QUIZHUB_SWEEP_INTERVAL_SECS`).
    pub sweep_interval: Duration,
    /// Grace delay between quorum and advancement
    /// (`QUIZHUB_ADVANCE_GRACE_MS`).
    pub advance_grace: Duration,
    /// Slack added to each question's time limit before the hard
    /// per-question deadline fires (`QUIZHUB_DEADLINE_SLACK_MS`).
    pub deadline_slack: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            ws_addr: env::var("QUIZHUB_WS_ADDR").unwrap_or_else(|_| "0.0.0.0:8081".to_string()),
            http_addr: parse_env("QUIZHUB_HTTP_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080))),
            sweep_interval: Duration::from_secs(parse_env("QUIZHUB_SWEEP_INTERVAL_SECS", 60)),
            advance_grace: Duration::from_millis(parse_env("QUIZHUB_ADVANCE_GRACE_MS", 2_000)),
            deadline_slack: Duration::from_millis(parse_env("QUIZHUB_DEADLINE_SLACK_MS", 2_000)),
        }
    }

    /// Registry tuning derived from this config.
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            pacing: PacingConfig {
                advance_grace: self.advance_grace,
                deadline_slack: self.deadline_slack,
            },
            ..RegistryConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ws_addr: "0.0.0.0:8081".to_string(),
            http_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            sweep_interval: Duration::from_secs(60),
            advance_grace: Duration::from_millis(2_000),
            deadline_slack: Duration::from_millis(2_000),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, raw = %raw, "unparseable value, using default");
            default
        }),
        Err(_) => default,
    }
}
