// SPDX-License-Identifier: MIT

//! Service (worker process) and ServiceTask (thread) liveness records
//! (spec.md §3, §4.2).

use crate::id::{ServiceId, ServiceTaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A live worker process, keyed by `(host, name)` — the key tolerates a
/// `None` host for backward compatibility (spec.md §4.2 step 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub host: Option<String>,
    pub pid: i64,
    pub is_alive: bool,
    pub timestamp: DateTime<Utc>,
}

impl Service {
    pub fn matches_key(&self, host: Option<&str>, name: &str) -> bool {
        self.name == name && self.host.as_deref() == host
    }

    /// Δ = now − timestamp, used against the dead/removed thresholds.
    pub fn silence(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.timestamp
    }

    pub fn is_dead(&self, now: DateTime<Utc>, heartbeat_interval: chrono::Duration) -> bool {
        self.silence(now) > heartbeat_interval * 2
    }

    pub fn should_be_removed(&self, now: DateTime<Utc>, heartbeat_interval: chrono::Duration) -> bool {
        self.silence(now) > heartbeat_interval * 60
    }
}

/// A thread within a [`Service`]. Detached (`service_id = None`) when its
/// owning service is removed, then reaped by a separate sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceTask {
    pub id: ServiceTaskId,
    pub service_id: Option<ServiceId>,
    pub name: String,
    pub is_alive: bool,
}

impl ServiceTask {
    pub fn detach(&mut self) {
        self.service_id = None;
    }

    pub fn is_detached(&self) -> bool {
        self.service_id.is_none()
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
