// SPDX-License-Identifier: MIT

//! LOG_QUEUE / AUDIT_LOG_QUEUE: persists append-only log rows (spec.md §4.7).

use gobw_core::{AuditLog, Envelope, Log};
use gobw_engine::EngineContext;
use std::sync::Arc;

pub async fn log_save(ctx: Arc<EngineContext>, envelope: Envelope) -> anyhow::Result<()> {
    let contents = gobw_bus::load_message(&envelope)?.ok_or_else(|| anyhow::anyhow!("log message carries no contents"))?;
    let log: Log = serde_json::from_value(contents)?;
    gobw_storage::log_save(&ctx.gateway, &log).await?;
    Ok(())
}

pub async fn audit_log_save(ctx: Arc<EngineContext>, envelope: Envelope) -> anyhow::Result<()> {
    let contents = gobw_bus::load_message(&envelope)?.ok_or_else(|| anyhow::anyhow!("audit log message carries no contents"))?;
    let entry: AuditLog = serde_json::from_value(contents)?;
    gobw_storage::audit_log_save(&ctx.gateway, &entry).await?;
    Ok(())
}
