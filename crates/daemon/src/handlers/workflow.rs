// SPDX-License-Identifier: MIT

//! WORKFLOW_QUEUE: starts a workflow, or resumes `end_of_workflow` if
//! `msg.workflow` carries only a `workflow_name` (spec.md §4.5, §4.7).

use gobw_core::Envelope;
use gobw_engine::{EngineContext, Workflow};
use std::sync::Arc;

pub async fn start_workflow(ctx: Arc<EngineContext>, mut envelope: Envelope) -> anyhow::Result<()> {
    let workflow_ref = envelope
        .workflow
        .take()
        .ok_or_else(|| anyhow::anyhow!("workflow.request message carries no msg.workflow"))?;

    let workflow = Workflow::new(
        &ctx,
        &workflow_ref.workflow_name,
        workflow_ref.step_name.as_deref(),
        envelope.header.workflow.as_deref(),
    )?;

    match (workflow_ref.step_name.as_deref(), workflow_ref.retry_time) {
        (None, None) => workflow.end_of_workflow(&ctx, &mut envelope).await?,
        _ => workflow.start(&ctx, &mut envelope, workflow_ref.retry_time.unwrap_or(0)).await?,
    }
    Ok(())
}
