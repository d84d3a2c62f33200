// SPDX-License-Identifier: MIT

//! JobStep persistence and status transitions (spec.md §4.4).

use crate::error::StorageError;
use crate::gateway::StorageGateway;
use chrono::{DateTime, Utc};
use gobw_core::{JobId, JobStep, StepId, StepStatus};
use sqlx::FromRow;

#[derive(FromRow)]
struct StepRow {
    id: String,
    jobid: String,
    name: String,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    status: String,
}

fn parse_status(s: &str) -> Result<StepStatus, StorageError> {
    match s {
        "scheduled" => Ok(StepStatus::Scheduled),
        "started" => Ok(StepStatus::Started),
        "ok" => Ok(StepStatus::Ok),
        "fail" => Ok(StepStatus::Fail),
        "rejected" => Ok(StepStatus::Rejected),
        other => Err(StorageError::Core(gobw_core::CoreError::InvalidEnvelope(
            format!("unknown step status: {other}"),
        ))),
    }
}

impl TryFrom<StepRow> for JobStep {
    type Error = StorageError;

    fn try_from(row: StepRow) -> Result<Self, Self::Error> {
        Ok(JobStep {
            id: StepId::new(row.id),
            jobid: JobId::new(row.jobid),
            name: row.name,
            start: row.start,
            end: row.end,
            status: parse_status(&row.status)?,
        })
    }
}

/// Persists a new step at `status=scheduled` (spec.md §4.4 `step_start`).
pub async fn step_save(gateway: &StorageGateway, step: &JobStep) -> Result<(), StorageError> {
    gateway
        .with_reconnect(|pool| async move {
            sqlx::query(
                r#"INSERT INTO job_steps (id, jobid, name, start, "end", status)
                   VALUES ($1, $2, $3, $4, $5, $6)"#,
            )
            .bind(step.id.as_str())
            .bind(step.jobid.as_str())
            .bind(&step.name)
            .bind(step.start)
            .bind(step.end)
            .bind(step.status.to_string())
            .execute(&pool)
            .await?;
            Ok(())
        })
        .await
}

pub async fn step_update(gateway: &StorageGateway, step: &JobStep) -> Result<(), StorageError> {
    gateway
        .with_reconnect(|pool| async move {
            sqlx::query(r#"UPDATE job_steps SET start = $1, "end" = $2, status = $3 WHERE id = $4"#)
                .bind(step.start)
                .bind(step.end)
                .bind(step.status.to_string())
                .bind(step.id.as_str())
                .execute(&pool)
                .await?;
            Ok(())
        })
        .await
}

pub async fn step_get(gateway: &StorageGateway, id: &StepId) -> Result<Option<JobStep>, StorageError> {
    let id = id.as_str().to_string();
    let row: Option<StepRow> = gateway
        .with_reconnect(|pool| {
            let id = id.clone();
            async move {
                sqlx::query_as("SELECT * FROM job_steps WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&pool)
                    .await
            }
        })
        .await?;
    row.map(JobStep::try_from).transpose()
}

/// Applies a status transition and persists it (spec.md §4.4 `step_status`).
pub async fn step_status(
    gateway: &StorageGateway,
    id: &StepId,
    status: StepStatus,
    now: DateTime<Utc>,
) -> Result<JobStep, StorageError> {
    let mut step = step_get(gateway, id)
        .await?
        .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
    step.apply_status(status, now);
    step_update(gateway, &step).await?;
    Ok(step)
}

#[cfg(test)]
#[path = "steps_tests.rs"]
mod tests;
