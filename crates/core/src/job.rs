// SPDX-License-Identifier: MIT

//! Job identifier and state (spec.md §3 "Job").

use crate::envelope::Header;
use crate::id::JobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Status of a [`Job`]. Transitions `Started -> {Ended | Rejected | Failed}`
/// and never returns (spec.md §3 invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Started,
    Ended,
    Rejected,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Started)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Started => "started",
            JobStatus::Ended => "ended",
            JobStatus::Rejected => "rejected",
            JobStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// One execution of a named workflow (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    pub job_type: String,
    #[serde(default)]
    pub arguments: Vec<String>,
    pub catalogue: Option<String>,
    pub collection: Option<String>,
    pub attribute: Option<String>,
    pub application: Option<String>,
    pub user: Option<String>,
    pub process_id: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub status: JobStatus,
    #[serde(default)]
    pub log_counts: HashMap<String, u64>,
    /// Free-form arguments used in duplicate detection (spec.md §4.1
    /// `{destination, entity_id, source}`).
    #[serde(default)]
    pub args: HashMap<String, String>,
}

impl Job {
    /// Compose the job name and process_id from a header, per spec.md §4.4:
    /// `name = type + '.' + '.'.join(str(v) for k, v in header if k != 'workflow')`.
    pub fn compose_name(job_type: &str, header: &Header) -> String {
        let mut parts = vec![job_type.to_string()];
        parts.extend(header.name_parts());
        parts.join(".")
    }

    /// `process_id = header.process_id` if present, else `<epoch>.<name>`.
    pub fn compose_process_id(name: &str, header: &Header, epoch_ms: u64) -> String {
        header
            .process_id
            .clone()
            .unwrap_or_else(|| format!("{epoch_ms}.{name}"))
    }

    pub fn new(
        id: JobId,
        job_type: String,
        name: String,
        process_id: String,
        header: &Header,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            job_type,
            arguments: header.name_parts(),
            catalogue: header.catalogue.clone(),
            collection: header.collection.clone(),
            attribute: header.attribute.clone(),
            application: header.application.clone(),
            user: header.user.clone(),
            process_id,
            start: now,
            end: None,
            status: JobStatus::Started,
            log_counts: HashMap::new(),
            args: header.fingerprint_args(),
        }
    }

    /// A zombie is a running job whose last heartbeat predates `threshold`
    /// relative to `now` (spec.md §4.1; threshold resolved by the monitor's
    /// service-liveness table, surfaced here via an explicit parameter).
    pub fn is_zombie(&self, last_heartbeat: Option<DateTime<Utc>>, now: DateTime<Utc>, threshold: chrono::Duration) -> bool {
        if self.status != JobStatus::Started {
            return false;
        }
        match last_heartbeat {
            None => true,
            Some(hb) => now - hb > threshold,
        }
    }

    pub fn accumulate_log_counts(&mut self, counts: &HashMap<String, u64>) {
        for (severity, count) in counts {
            *self.log_counts.entry(severity.clone()).or_insert(0) += count;
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
