// SPDX-License-Identifier: MIT

//! Append-only `Log` and `AuditLog` rows (spec.md §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        };
        write!(f, "{s}")
    }
}

/// A single log line associated with a job (spec.md §3 "Log").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    pub timestamp: DateTime<Utc>,
    pub jobid: Option<String>,
    pub level: LogLevel,
    pub name: String,
    pub msg: String,
}

/// An audit trail row (spec.md §3 "AuditLog").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub destination: String,
    pub audit_type: String,
    pub data: serde_json::Value,
    pub request_uuid: String,
}
