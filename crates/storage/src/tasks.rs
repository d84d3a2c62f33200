// SPDX-License-Identifier: MIT

//! Task persistence, advisory locking, and dependency queries (spec.md §4.1, §4.6).

use crate::error::StorageError;
use crate::gateway::StorageGateway;
use chrono::{DateTime, Utc};
use gobw_core::{Envelope, JobId, StepId, Summary, Task, TaskId, TaskStatus};
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::HashMap;

#[derive(FromRow)]
struct TaskRow {
    id: String,
    jobid: String,
    stepid: String,
    name: String,
    dependencies: Json<Vec<String>>,
    status: String,
    lock: Option<i64>,
    key_prefix: String,
    process_id: String,
    extra_msg: Json<HashMap<String, serde_json::Value>>,
    extra_header: Json<HashMap<String, serde_json::Value>>,
    summary: Json<Summary>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

fn parse_status(s: &str) -> Result<TaskStatus, StorageError> {
    match s {
        "new" => Ok(TaskStatus::New),
        "queued" => Ok(TaskStatus::Queued),
        "completed" => Ok(TaskStatus::Completed),
        "aborted" => Ok(TaskStatus::Aborted),
        "failed" => Ok(TaskStatus::Failed),
        other => Err(StorageError::Core(gobw_core::CoreError::InvalidEnvelope(
            format!("unknown task status: {other}"),
        ))),
    }
}

impl TryFrom<TaskRow> for Task {
    type Error = StorageError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: TaskId::new(row.id),
            jobid: JobId::new(row.jobid),
            stepid: StepId::new(row.stepid),
            name: row.name,
            dependencies: row.dependencies.0,
            status: parse_status(&row.status)?,
            lock: row.lock,
            key_prefix: row.key_prefix,
            process_id: row.process_id,
            extra_msg: row.extra_msg.0,
            extra_header: row.extra_header.0,
            summary: row.summary.0,
            start: row.start,
            end: row.end,
        })
    }
}

pub async fn task_save(gateway: &StorageGateway, task: &Task) -> Result<(), StorageError> {
    gateway
        .with_reconnect(|pool| async move {
            sqlx::query(
                r#"
                INSERT INTO tasks
                    (id, jobid, stepid, name, dependencies, status, lock, key_prefix,
                     process_id, extra_msg, extra_header, summary, start, "end")
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                "#,
            )
            .bind(task.id.as_str())
            .bind(task.jobid.as_str())
            .bind(task.stepid.as_str())
            .bind(&task.name)
            .bind(Json(&task.dependencies))
            .bind(task.status.to_string())
            .bind(task.lock)
            .bind(&task.key_prefix)
            .bind(&task.process_id)
            .bind(Json(&task.extra_msg))
            .bind(Json(&task.extra_header))
            .bind(Json(&task.summary))
            .bind(task.start)
            .bind(task.end)
            .execute(&pool)
            .await?;
            Ok(())
        })
        .await
}

pub async fn task_update(gateway: &StorageGateway, task: &Task) -> Result<(), StorageError> {
    gateway
        .with_reconnect(|pool| async move {
            sqlx::query(
                r#"
                UPDATE tasks SET status = $1, lock = $2, summary = $3, start = $4, "end" = $5
                WHERE id = $6
                "#,
            )
            .bind(task.status.to_string())
            .bind(task.lock)
            .bind(Json(&task.summary))
            .bind(task.start)
            .bind(task.end)
            .bind(task.id.as_str())
            .execute(&pool)
            .await?;
            Ok(())
        })
        .await
}

pub async fn task_get(gateway: &StorageGateway, id: &TaskId) -> Result<Option<Task>, StorageError> {
    let id = id.as_str().to_string();
    let row: Option<TaskRow> = gateway
        .with_reconnect(|pool| {
            let id = id.clone();
            async move {
                sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&pool)
                    .await
            }
        })
        .await?;
    row.map(Task::try_from).transpose()
}

pub async fn tasks_for_step(gateway: &StorageGateway, stepid: &StepId) -> Result<Vec<Task>, StorageError> {
    let stepid = stepid.as_str().to_string();
    let rows: Vec<TaskRow> = gateway
        .with_reconnect(|pool| {
            let stepid = stepid.clone();
            async move {
                sqlx::query_as("SELECT * FROM tasks WHERE stepid = $1 ORDER BY name")
                    .bind(stepid)
                    .fetch_all(&pool)
                    .await
            }
        })
        .await?;
    rows.into_iter().map(Task::try_from).collect()
}

/// Atomically locks a task: `UPDATE ... SET lock = now WHERE id = ? AND lock
/// IS NULL`. Returns whether the lock was won (spec.md §4.1).
pub async fn task_lock(gateway: &StorageGateway, id: &TaskId, now: DateTime<Utc>) -> Result<bool, StorageError> {
    let id_str = id.as_str().to_string();
    let epoch = now.timestamp();
    let rows_affected = gateway
        .with_reconnect(|pool| {
            let id_str = id_str.clone();
            async move {
                sqlx::query("UPDATE tasks SET lock = $1 WHERE id = $2 AND lock IS NULL")
                    .bind(epoch)
                    .bind(id_str)
                    .execute(&pool)
                    .await
                    .map(|r| r.rows_affected())
            }
        })
        .await?;
    Ok(rows_affected > 0)
}

/// Releases a lock acquired via [`task_lock`]. Errors if the row was not
/// found locked (spec.md §4.1 "it must find the row locked").
pub async fn task_unlock(gateway: &StorageGateway, id: &TaskId) -> Result<(), StorageError> {
    let id_str = id.as_str().to_string();
    let rows_affected = gateway
        .with_reconnect(|pool| {
            let id_str = id_str.clone();
            async move {
                sqlx::query("UPDATE tasks SET lock = NULL WHERE id = $1 AND lock IS NOT NULL")
                    .bind(id_str)
                    .execute(&pool)
                    .await
                    .map(|r| r.rows_affected())
            }
        })
        .await?;
    if rows_affected == 0 {
        return Err(StorageError::NotLocked(id.to_string()));
    }
    Ok(())
}

/// Marks every completed dependency name of `stepid`, for the engine's
/// `dependencies_satisfied` check (spec.md §4.6).
pub async fn completed_task_names(gateway: &StorageGateway, stepid: &StepId) -> Result<Vec<String>, StorageError> {
    Ok(tasks_for_step(gateway, stepid)
        .await?
        .into_iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .map(|t| t.name)
        .collect())
}

/// Accumulates the summary carried by a completed task's result envelope
/// into the task row.
pub fn merge_envelope_summary(task: &mut Task, envelope: &Envelope) {
    if let Some(summary) = &envelope.summary {
        task.summary.warnings.extend(summary.warnings.iter().cloned());
        task.summary.errors.extend(summary.errors.iter().cloned());
    }
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
