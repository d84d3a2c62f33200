// SPDX-License-Identifier: MIT

//! Job persistence and duplicate/zombie detection (spec.md §4.1).

use crate::error::StorageError;
use crate::gateway::StorageGateway;
use chrono::{DateTime, Utc};
use gobw_core::{Job, JobId, JobStatus};
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::HashMap;

#[derive(FromRow)]
struct JobRow {
    id: String,
    name: String,
    job_type: String,
    arguments: Json<Vec<String>>,
    catalogue: Option<String>,
    collection: Option<String>,
    attribute: Option<String>,
    application: Option<String>,
    user: Option<String>,
    process_id: String,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    status: String,
    log_counts: Json<HashMap<String, u64>>,
    args: Json<HashMap<String, String>>,
}

fn parse_status(s: &str) -> Result<JobStatus, StorageError> {
    match s {
        "started" => Ok(JobStatus::Started),
        "ended" => Ok(JobStatus::Ended),
        "rejected" => Ok(JobStatus::Rejected),
        "failed" => Ok(JobStatus::Failed),
        other => Err(StorageError::Core(gobw_core::CoreError::InvalidEnvelope(
            format!("unknown job status: {other}"),
        ))),
    }
}

impl TryFrom<JobRow> for Job {
    type Error = StorageError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(Job {
            id: JobId::new(row.id),
            name: row.name,
            job_type: row.job_type,
            arguments: row.arguments.0,
            catalogue: row.catalogue,
            collection: row.collection,
            attribute: row.attribute,
            application: row.application,
            user: row.user,
            process_id: row.process_id,
            start: row.start,
            end: row.end,
            status: parse_status(&row.status)?,
            log_counts: row.log_counts.0,
            args: row.args.0,
        })
    }
}

/// Inserts a new job row.
pub async fn job_save(gateway: &StorageGateway, job: &Job) -> Result<(), StorageError> {
    gateway
        .with_reconnect(|pool| async move {
            sqlx::query(
                r#"
                INSERT INTO jobs
                    (id, name, job_type, arguments, catalogue, collection, attribute,
                     application, "user", process_id, start, "end", status, log_counts, args)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                "#,
            )
            .bind(job.id.as_str())
            .bind(&job.name)
            .bind(&job.job_type)
            .bind(Json(&job.arguments))
            .bind(&job.catalogue)
            .bind(&job.collection)
            .bind(&job.attribute)
            .bind(&job.application)
            .bind(&job.user)
            .bind(&job.process_id)
            .bind(job.start)
            .bind(job.end)
            .bind(job.status.to_string())
            .bind(Json(&job.log_counts))
            .bind(Json(&job.args))
            .execute(&pool)
            .await?;
            Ok(())
        })
        .await
}

/// Updates `end`, `status`, and `log_counts` on an existing job.
pub async fn job_update(gateway: &StorageGateway, job: &Job) -> Result<(), StorageError> {
    gateway
        .with_reconnect(|pool| async move {
            sqlx::query(
                r#"UPDATE jobs SET "end" = $1, status = $2, log_counts = $3 WHERE id = $4"#,
            )
            .bind(job.end)
            .bind(job.status.to_string())
            .bind(Json(&job.log_counts))
            .bind(job.id.as_str())
            .execute(&pool)
            .await?;
            Ok(())
        })
        .await
}

pub async fn job_get(gateway: &StorageGateway, id: &JobId) -> Result<Option<Job>, StorageError> {
    let id = id.as_str().to_string();
    let row: Option<JobRow> = gateway
        .with_reconnect(|pool| {
            let id = id.clone();
            async move {
                sqlx::query_as("SELECT * FROM jobs WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&pool)
                    .await
            }
        })
        .await?;
    row.map(Job::try_from).transpose()
}

/// Finds the most recent running job matching `job_type` and the header's
/// `{catalogue, collection, attribute, application}` scope whose `args`
/// contains the current `{destination, entity_id, source}` fingerprint
/// (spec.md §4.1 `job_runs`).
pub async fn job_runs(
    gateway: &StorageGateway,
    job_type: &str,
    scope: (Option<&str>, Option<&str>, Option<&str>, Option<&str>),
    fingerprint: &HashMap<String, String>,
    exclude_id: &JobId,
) -> Result<Option<Job>, StorageError> {
    let (catalogue, collection, attribute, application) = scope;
    let job_type = job_type.to_string();
    let catalogue = catalogue.map(str::to_string);
    let collection = collection.map(str::to_string);
    let attribute = attribute.map(str::to_string);
    let application = application.map(str::to_string);
    let fingerprint = Json(fingerprint.clone());
    let exclude_id = exclude_id.as_str().to_string();

    let row: Option<JobRow> = gateway
        .with_reconnect(|pool| {
            let job_type = job_type.clone();
            let catalogue = catalogue.clone();
            let collection = collection.clone();
            let attribute = attribute.clone();
            let application = application.clone();
            let fingerprint = fingerprint.clone();
            let exclude_id = exclude_id.clone();
            async move {
                sqlx::query_as(
                    r#"
                    SELECT * FROM jobs
                    WHERE job_type = $1
                      AND catalogue IS NOT DISTINCT FROM $2
                      AND collection IS NOT DISTINCT FROM $3
                      AND attribute IS NOT DISTINCT FROM $4
                      AND application IS NOT DISTINCT FROM $5
                      AND args @> $6
                      AND "end" IS NULL
                      AND id != $7
                    ORDER BY start DESC
                    LIMIT 1
                    "#,
                )
                .bind(job_type)
                .bind(catalogue)
                .bind(collection)
                .bind(attribute)
                .bind(application)
                .bind(fingerprint)
                .bind(exclude_id)
                .fetch_optional(&pool)
                .await
            }
        })
        .await?;
    row.map(Job::try_from).transpose()
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
