// SPDX-License-Identifier: MIT

//! PROGRESS_QUEUE: worker progress pings (spec.md §4.7, §6).

use gobw_core::Envelope;
use gobw_engine::{EngineContext, ProgressMessage};
use std::sync::Arc;

pub async fn on_workflow_progress(ctx: Arc<EngineContext>, envelope: Envelope) -> anyhow::Result<()> {
    let contents = gobw_bus::load_message(&envelope)?.ok_or_else(|| anyhow::anyhow!("progress message carries no contents"))?;
    let progress: ProgressMessage = serde_json::from_value(contents)?;
    gobw_engine::on_workflow_progress(&ctx, &progress).await?;
    Ok(())
}
