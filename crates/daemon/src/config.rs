// SPDX-License-Identifier: MIT

//! Environment-driven configuration (spec.md §6 "Configuration"), grounded
//! on the teacher's `daemon::env` accessor style and `mntogether`'s
//! `Config::from_env` + `dotenvy` shape.

use std::time::Duration;

/// Every knob the daemon needs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub amqp_url: String,
    pub workflow_exchange: String,
    pub log_name: String,
    pub reconnect_interval: Duration,
    pub heartbeat_interval: Duration,
    pub zombie_threshold: Duration,
    pub offline_contents_dir: std::path::PathBuf,
}

impl Config {
    /// Loads `.env` if present (development convenience), then reads the
    /// environment. Required variables error out; everything else falls
    /// back to the values the teacher's builtins assume.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: require_env("DATABASE_URL")?,
            amqp_url: require_env("GOBW_AMQP_URL")?,
            workflow_exchange: std::env::var("GOBW_WORKFLOW_EXCHANGE").unwrap_or_else(|_| "workflow".to_string()),
            log_name: std::env::var("GOBW_LOG_NAME").unwrap_or_else(|_| "gobworkflow".to_string()),
            reconnect_interval: duration_secs_env("GOBW_RECONNECT_INTERVAL", 60),
            heartbeat_interval: duration_secs_env("GOBW_HEARTBEAT_INTERVAL", 30),
            zombie_threshold: duration_secs_env("GOBW_ZOMBIE_THRESHOLD", 60),
            offline_contents_dir: std::env::var("GOBW_OFFLINE_CONTENTS_DIR")
                .map(std::path::PathBuf::from)
                .unwrap_or_else(|_| std::path::PathBuf::from("/var/lib/gobworkflow/offline")),
        })
    }
}

fn require_env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).map_err(|_| anyhow::anyhow!("{name} must be set"))
}

fn duration_secs_env(name: &str, default_secs: u64) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
