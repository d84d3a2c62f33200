// SPDX-License-Identifier: MIT

//! JOBSTEP_RESULT_QUEUE: `handle_result` (spec.md §4.5, §4.7). Checks the
//! external-hook short circuit first, then resumes the job's workflow at the
//! step named in the envelope header.

use gobw_core::{Envelope, JobId, StepId};
use gobw_engine::{check_result_hook, EngineContext, Workflow};
use std::sync::Arc;

pub async fn handle_result(ctx: Arc<EngineContext>, mut envelope: Envelope) -> anyhow::Result<()> {
    if check_result_hook(&ctx, &envelope).await? {
        return Ok(());
    }

    let jobid = envelope.header.jobid.clone().ok_or_else(|| anyhow::anyhow!("result message carries no jobid"))?;
    let stepid = envelope.header.stepid.clone().ok_or_else(|| anyhow::anyhow!("result message carries no stepid"))?;

    let job = gobw_storage::job_get(&ctx.gateway, &JobId::new(jobid.clone()))
        .await?
        .ok_or_else(|| anyhow::anyhow!("no job found with id {jobid}"))?;
    let step = gobw_storage::step_get(&ctx.gateway, &StepId::new(stepid.clone()))
        .await?
        .ok_or_else(|| anyhow::anyhow!("no jobstep found with id {stepid}"))?;

    let workflow = Workflow::new(&ctx, &job.job_type, Some(&step.name), envelope.header.workflow.as_deref())?;
    workflow.handle_result(&ctx, &mut envelope).await?;
    Ok(())
}
