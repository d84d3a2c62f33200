// SPDX-License-Identifier: MIT

//! Heartbeat ingestion and the dead/removed sweep (spec.md §4.2).

use chrono::{DateTime, Duration, Utc};
use gobw_core::{IdGen, Service, ServiceId};
use gobw_storage::{mark_service_dead, reconcile_service_tasks, remove_service, service_update, services_all, StorageError};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Wire shape of a heartbeat message (spec.md §4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatMessage {
    pub name: String,
    pub host: Option<String>,
    pub pid: i64,
    pub is_alive: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub threads: Vec<ThreadStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadStatus {
    pub name: String,
    pub is_alive: bool,
}

/// Default heartbeat cadence; dead/removed thresholds scale off of this
/// (spec.md §4.2, Open Question: zombie threshold mirrors the dead threshold).
pub const HEARTBEAT_INTERVAL: Duration = Duration::seconds(30);

/// Ingests one heartbeat: upserts the Service, reconciles its ServiceTasks,
/// then sweeps every Service for the dead/removed thresholds (spec.md §4.2).
/// Object-deletion races are logged, not raised (step 4).
pub async fn ingest_heartbeat(
    gateway: &gobw_storage::StorageGateway,
    id_gen: &dyn IdGen,
    message: &HeartbeatMessage,
    heartbeat_interval: Duration,
) -> Result<(), StorageError> {
    let service = Service {
        id: ServiceId::new(id_gen.next()),
        name: message.name.clone(),
        host: message.host.clone(),
        pid: message.pid,
        is_alive: message.is_alive,
        timestamp: message.timestamp,
    };
    let service_id = service_update(gateway, &service).await?;

    let reported: Vec<(String, bool)> = message
        .threads
        .iter()
        .map(|t| (t.name.clone(), t.is_alive))
        .collect();
    reconcile_service_tasks(gateway, &service_id, &reported, id_gen).await?;

    sweep(gateway, Utc::now(), heartbeat_interval).await
}

/// Marks services dead past `2 * heartbeat_interval` and removes them past
/// `60 * heartbeat_interval` (spec.md §4.2 step 3).
pub async fn sweep(gateway: &gobw_storage::StorageGateway, now: DateTime<Utc>, heartbeat_interval: Duration) -> Result<(), StorageError> {
    for service in services_all(gateway).await? {
        if service.should_be_removed(now, heartbeat_interval) {
            if let Err(e) = remove_service(gateway, &service.id).await {
                warn!(service_id = %service.id, error = %e, "remove_service race, ignoring");
            }
        } else if service.is_alive && service.is_dead(now, heartbeat_interval) {
            if let Err(e) = mark_service_dead(gateway, &service.id).await {
                warn!(service_id = %service.id, error = %e, "mark_service_dead race, ignoring");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
