// SPDX-License-Identifier: MIT

//! Task: one leaf of work inside a job step (spec.md §3 "Task").

use crate::envelope::Summary;
use crate::id::{JobId, StepId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    New,
    Queued,
    Completed,
    Aborted,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Aborted | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::New => "new",
            TaskStatus::Queued => "queued",
            TaskStatus::Completed => "completed",
            TaskStatus::Aborted => "aborted",
            TaskStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// One leaf of work inside a [`crate::step::JobStep`] (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub jobid: JobId,
    pub stepid: StepId,
    pub name: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub status: TaskStatus,
    /// Advisory mutex: epoch-seconds when locked, `None` when free.
    pub lock: Option<i64>,
    pub key_prefix: String,
    pub process_id: String,
    #[serde(default)]
    pub extra_msg: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub extra_header: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub summary: Summary,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(
        id: TaskId,
        jobid: JobId,
        stepid: StepId,
        name: String,
        dependencies: Vec<String>,
        key_prefix: String,
        process_id: String,
        extra_msg: HashMap<String, serde_json::Value>,
        extra_header: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            id,
            jobid,
            stepid,
            name,
            dependencies,
            status: TaskStatus::New,
            lock: None,
            key_prefix,
            process_id,
            extra_msg,
            extra_header,
            summary: Summary::default(),
            start: None,
            end: None,
        }
    }

    /// True once every dependency name appears, completed, among `completed`.
    pub fn dependencies_satisfied(&self, completed: &std::collections::HashSet<String>) -> bool {
        self.dependencies.iter().all(|d| completed.contains(d))
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
