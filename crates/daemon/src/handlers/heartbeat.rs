// SPDX-License-Identifier: MIT

//! HEARTBEAT_QUEUE: feeds service heartbeats into the monitor sweep
//! (spec.md §4.2, §4.7).

use gobw_core::Envelope;
use gobw_engine::EngineContext;
use gobw_monitor::HeartbeatMessage;
use std::sync::Arc;

pub async fn ingest_heartbeat(ctx: Arc<EngineContext>, envelope: Envelope) -> anyhow::Result<()> {
    let contents = gobw_bus::load_message(&envelope)?.ok_or_else(|| anyhow::anyhow!("heartbeat message carries no contents"))?;
    let message: HeartbeatMessage = serde_json::from_value(contents)?;
    gobw_monitor::ingest_heartbeat(&ctx.gateway, ctx.id_gen.as_ref(), &message, ctx.heartbeat_interval).await?;
    Ok(())
}
