// SPDX-License-Identifier: MIT

//! Job step execution record (spec.md §3 "JobStep").

use crate::id::{JobId, StepId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a [`JobStep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Scheduled,
    Started,
    Ok,
    Fail,
    Rejected,
}

impl StepStatus {
    /// OK/FAIL/REJECTED all close the step out.
    pub fn is_final(self) -> bool {
        matches!(self, StepStatus::Ok | StepStatus::Fail | StepStatus::Rejected)
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepStatus::Scheduled => "scheduled",
            StepStatus::Started => "started",
            StepStatus::Ok => "ok",
            StepStatus::Fail => "fail",
            StepStatus::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

/// One node execution within a job (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStep {
    pub id: StepId,
    pub jobid: JobId,
    pub name: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub status: StepStatus,
}

impl JobStep {
    pub fn new_scheduled(id: StepId, jobid: JobId, name: String) -> Self {
        Self {
            id,
            jobid,
            name,
            start: None,
            end: None,
            status: StepStatus::Scheduled,
        }
    }

    /// Apply a status transition, stamping `start`/`end` per spec.md §4.4.
    pub fn apply_status(&mut self, status: StepStatus, now: DateTime<Utc>) {
        match status {
            StepStatus::Started => self.start = Some(now),
            StepStatus::Ok | StepStatus::Fail | StepStatus::Rejected => self.end = Some(now),
            StepStatus::Scheduled => {}
        }
        self.status = status;
    }

    /// Duration of the step, truncated to seconds, once both ends are set
    /// (used for progress-log messages, spec.md §4.7).
    pub fn duration_secs(&self) -> Option<i64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((end - start).num_seconds()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
