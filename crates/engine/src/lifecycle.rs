// SPDX-License-Identifier: MIT

//! Job/step lifecycle management (spec.md §4.4).

use crate::context::EngineContext;
use crate::error::EngineError;
use chrono::Duration;
use gobw_core::{Envelope, Job, JobId, JobStatus, JobStep, StepId, StepStatus};
use tracing::{error, info};

/// Zombie threshold for duplicate-job detection (spec.md §9 open question:
/// "proposed 2x HEARTBEAT_INTERVAL, same as service dead threshold"). Kept
/// as its own constant rather than a dependency on `gobw-monitor`, whose
/// `HEARTBEAT_INTERVAL` this mirrors.
pub const ZOMBIE_THRESHOLD: Duration = Duration::seconds(60);

/// `job_start` (spec.md §4.4): composes the job name and process_id from
/// the header, persists the job, and injects `jobid`/`process_id` back into
/// the envelope's header.
pub async fn job_start(
    ctx: &EngineContext,
    job_type: &str,
    envelope: &mut Envelope,
) -> Result<Job, EngineError> {
    let name = Job::compose_name(job_type, &envelope.header);
    let now = ctx.clock.now();
    let process_id = Job::compose_process_id(&name, &envelope.header, now.timestamp_millis() as u64);
    let id = JobId::new(ctx.id_gen.next());

    let job = Job::new(id, job_type.to_string(), name, process_id, &envelope.header, now);
    gobw_storage::job_save(&ctx.gateway, &job).await?;

    envelope.header.jobid = Some(job.id.to_string());
    envelope.header.process_id = Some(job.process_id.clone());

    info!(job_id = %job.id, job_type, "job started");
    Ok(job)
}

/// `job_end` (spec.md §4.4): sets `end=now, status=status` if the job id is
/// present. No-ops (rather than erroring) when the job is already ended, per
/// spec.md §9's note that a second orchestrator racing a fail message
/// should observe the already-ended job and no-op.
pub async fn job_end(ctx: &EngineContext, jobid: &JobId, status: JobStatus) -> Result<(), EngineError> {
    let Some(mut job) = gobw_storage::job_get(&ctx.gateway, jobid).await? else {
        return Ok(());
    };
    if job.status.is_terminal() {
        return Ok(());
    }
    job.end = Some(ctx.clock.now());
    job.status = status;
    gobw_storage::job_update(&ctx.gateway, &job).await?;
    info!(job_id = %jobid, %status, "job ended");
    Ok(())
}

/// `step_start` (spec.md §4.4): persists a step at `status=scheduled` and
/// injects `stepid` into the envelope's header.
pub async fn step_start(
    ctx: &EngineContext,
    name: &str,
    envelope: &mut Envelope,
) -> Result<JobStep, EngineError> {
    let jobid = envelope
        .header
        .jobid
        .clone()
        .map(JobId::new)
        .ok_or(EngineError::MissingJobId)?;
    let id = StepId::new(ctx.id_gen.next());
    let step = JobStep::new_scheduled(id, jobid, name.to_string());
    gobw_storage::step_save(&ctx.gateway, &step).await?;
    envelope.header.stepid = Some(step.id.to_string());
    Ok(step)
}

/// `step_status` (spec.md §4.4): STARTED sets `start`; OK/FAIL/REJECTED set
/// `end`; FAIL additionally ends the job as failed and logs the duration
/// and error message.
pub async fn step_status(
    ctx: &EngineContext,
    stepid: &StepId,
    status: StepStatus,
    error_message: Option<&str>,
) -> Result<JobStep, EngineError> {
    let now = ctx.clock.now();
    let step = gobw_storage::step_status(&ctx.gateway, stepid, status, now).await?;

    if status == StepStatus::Fail {
        job_end(ctx, &step.jobid, JobStatus::Failed).await?;
        error!(
            job_id = %step.jobid,
            step_id = %stepid,
            step = %step.name,
            duration_secs = step.duration_secs(),
            error = error_message.unwrap_or("<no message>"),
            "step failed"
        );
    }

    Ok(step)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
