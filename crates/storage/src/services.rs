// SPDX-License-Identifier: MIT

//! Service/ServiceTask persistence and the dead/removed sweep (spec.md §4.2).

use crate::error::StorageError;
use crate::gateway::StorageGateway;
use chrono::{DateTime, Utc};
use gobw_core::{Service, ServiceId, ServiceTask, ServiceTaskId};
use sqlx::FromRow;

#[derive(FromRow)]
struct ServiceRow {
    id: String,
    name: String,
    host: Option<String>,
    pid: i64,
    is_alive: bool,
    timestamp: DateTime<Utc>,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Service {
            id: ServiceId::new(row.id),
            name: row.name,
            host: row.host,
            pid: row.pid,
            is_alive: row.is_alive,
            timestamp: row.timestamp,
        }
    }
}

#[derive(FromRow)]
struct ServiceTaskRow {
    id: String,
    service_id: Option<String>,
    name: String,
    is_alive: bool,
}

impl From<ServiceTaskRow> for ServiceTask {
    fn from(row: ServiceTaskRow) -> Self {
        ServiceTask {
            id: ServiceTaskId::new(row.id),
            service_id: row.service_id.map(ServiceId::new),
            name: row.name,
            is_alive: row.is_alive,
        }
    }
}

/// Upserts the Service row keyed by `(host, name)`, tolerating a `None`
/// host (spec.md §4.2 step 1).
pub async fn service_update(gateway: &StorageGateway, service: &Service) -> Result<ServiceId, StorageError> {
    let row: (String,) = gateway
        .with_reconnect(|pool| async move {
            sqlx::query_as(
                r#"
                INSERT INTO services (id, name, host, pid, is_alive, timestamp)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (COALESCE(host, ''), name)
                DO UPDATE SET pid = EXCLUDED.pid, is_alive = EXCLUDED.is_alive, timestamp = EXCLUDED.timestamp
                RETURNING id
                "#,
            )
            .bind(service.id.as_str())
            .bind(&service.name)
            .bind(&service.host)
            .bind(service.pid)
            .bind(service.is_alive)
            .bind(service.timestamp)
            .fetch_one(&pool)
            .await
        })
        .await?;
    Ok(ServiceId::new(row.0))
}

pub async fn services_all(gateway: &StorageGateway) -> Result<Vec<Service>, StorageError> {
    let rows: Vec<ServiceRow> = gateway
        .with_reconnect(|pool| async move { sqlx::query_as("SELECT * FROM services").fetch_all(&pool).await })
        .await?;
    Ok(rows.into_iter().map(Service::from).collect())
}

/// Marks a service dead and detaches all of its threads (spec.md §4.2 step 3).
pub async fn mark_service_dead(gateway: &StorageGateway, id: &ServiceId) -> Result<(), StorageError> {
    let id_str = id.as_str().to_string();
    gateway
        .with_reconnect(|pool| {
            let id_str = id_str.clone();
            async move {
                let mut tx = pool.begin().await?;
                sqlx::query("UPDATE services SET is_alive = false WHERE id = $1")
                    .bind(&id_str)
                    .execute(&mut *tx)
                    .await?;
                sqlx::query("UPDATE service_tasks SET service_id = NULL WHERE service_id = $1")
                    .bind(&id_str)
                    .execute(&mut *tx)
                    .await?;
                tx.commit().await
            }
        })
        .await
}

/// Removes a long-silent service row (spec.md §4.2 step 3).
pub async fn remove_service(gateway: &StorageGateway, id: &ServiceId) -> Result<(), StorageError> {
    let id_str = id.as_str().to_string();
    gateway
        .with_reconnect(|pool| {
            let id_str = id_str.clone();
            async move {
                sqlx::query("DELETE FROM services WHERE id = $1")
                    .bind(id_str)
                    .execute(&pool)
                    .await
                    .map(|_| ())
            }
        })
        .await
}

/// Reconciles the ServiceTasks of `service_id` against the names reported in
/// the latest heartbeat: inserts missing rows, updates `is_alive`, and
/// detaches any row not present in `reported` (spec.md §4.2 step 2).
pub async fn reconcile_service_tasks(
    gateway: &StorageGateway,
    service_id: &ServiceId,
    reported: &[(String, bool)],
    id_gen: &dyn gobw_core::IdGen,
) -> Result<(), StorageError> {
    let existing: Vec<ServiceTaskRow> = gateway
        .with_reconnect(|pool| async move {
            sqlx::query_as("SELECT * FROM service_tasks WHERE service_id = $1")
                .bind(service_id.as_str())
                .fetch_all(&pool)
                .await
        })
        .await?;

    let existing_names: std::collections::HashSet<&str> = existing.iter().map(|r| r.name.as_str()).collect();

    for (name, is_alive) in reported {
        if existing_names.contains(name.as_str()) {
            gateway
                .with_reconnect(|pool| async move {
                    sqlx::query("UPDATE service_tasks SET is_alive = $1 WHERE service_id = $2 AND name = $3")
                        .bind(*is_alive)
                        .bind(service_id.as_str())
                        .bind(name)
                        .execute(&pool)
                        .await
                        .map(|_| ())
                })
                .await?;
        } else {
            let new_id = id_gen.next();
            gateway
                .with_reconnect(|pool| {
                    let new_id = new_id.clone();
                    async move {
                        sqlx::query("INSERT INTO service_tasks (id, service_id, name, is_alive) VALUES ($1, $2, $3, $4)")
                            .bind(new_id)
                            .bind(service_id.as_str())
                            .bind(name)
                            .bind(*is_alive)
                            .execute(&pool)
                            .await
                            .map(|_| ())
                    }
                })
                .await?;
        }
    }

    let reported_names: std::collections::HashSet<&str> = reported.iter().map(|(n, _)| n.as_str()).collect();
    for row in existing.iter().filter(|r| !reported_names.contains(r.name.as_str())) {
        let row_id = row.id.clone();
        gateway
            .with_reconnect(|pool| {
                let row_id = row_id.clone();
                async move {
                    sqlx::query("UPDATE service_tasks SET service_id = NULL WHERE id = $1")
                        .bind(row_id)
                        .execute(&pool)
                        .await
                        .map(|_| ())
                }
            })
            .await?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod tests;
