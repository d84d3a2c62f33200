// SPDX-License-Identifier: MIT

//! Append-only Log/AuditLog persistence (spec.md §4.1 "log_save tolerates a
//! foreign-key violation").

use crate::error::StorageError;
use crate::gateway::StorageGateway;
use gobw_core::{AuditLog, Log, LogLevel};
use tracing::warn;

/// Inserts a log row. A foreign-key violation — the owning job was deleted
/// out from under a concurrent writer — is swallowed and logged instead of
/// propagated (spec.md §4.1).
pub async fn log_save(gateway: &StorageGateway, log: &Log) -> Result<(), StorageError> {
    let result = gateway
        .with_reconnect(|pool| async move {
            sqlx::query(
                r#"INSERT INTO logs (timestamp, jobid, level, name, msg) VALUES ($1, $2, $3, $4, $5)"#,
            )
            .bind(log.timestamp)
            .bind(&log.jobid)
            .bind(log.level.to_string())
            .bind(&log.name)
            .bind(&log.msg)
            .execute(&pool)
            .await?;
            Ok(())
        })
        .await;

    match result {
        Err(e) if e.is_foreign_key_violation() => {
            warn!(jobid = ?log.jobid, "log_save: job no longer exists, dropping log line");
            Ok(())
        }
        other => other,
    }
}

pub async fn audit_log_save(gateway: &StorageGateway, entry: &AuditLog) -> Result<(), StorageError> {
    gateway
        .with_reconnect(|pool| async move {
            sqlx::query(
                r#"
                INSERT INTO audit_logs (timestamp, source, destination, audit_type, data, request_uuid)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(entry.timestamp)
            .bind(&entry.source)
            .bind(&entry.destination)
            .bind(&entry.audit_type)
            .bind(&entry.data)
            .bind(&entry.request_uuid)
            .execute(&pool)
            .await?;
            Ok(())
        })
        .await
}

/// Parses a level string back from persisted rows; unused by the write path
/// above but kept alongside it for the read-side tooling external UIs use
/// (spec.md §3 "read by external UIs").
pub fn parse_level(s: &str) -> Option<LogLevel> {
    match s {
        "DEBUG" => Some(LogLevel::Debug),
        "INFO" => Some(LogLevel::Info),
        "WARNING" => Some(LogLevel::Warning),
        "ERROR" => Some(LogLevel::Error),
        _ => None,
    }
}

#[cfg(test)]
#[path = "logs_tests.rs"]
mod tests;
