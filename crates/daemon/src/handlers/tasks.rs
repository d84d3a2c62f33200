// SPDX-License-Identifier: MIT

//! TASK_QUEUE / TASK_RESULT_QUEUE: thin wrappers over the task-queue engine
//! operations (spec.md §4.6, §4.7).

use gobw_core::Envelope;
use gobw_engine::EngineContext;
use std::sync::Arc;

pub async fn on_start_tasks(ctx: Arc<EngineContext>, envelope: Envelope) -> anyhow::Result<()> {
    gobw_engine::on_start_tasks(&ctx, &envelope).await?;
    Ok(())
}

pub async fn on_task_result(ctx: Arc<EngineContext>, envelope: Envelope) -> anyhow::Result<()> {
    gobw_engine::on_task_result(&ctx, &envelope).await?;
    Ok(())
}
