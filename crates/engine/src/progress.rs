// SPDX-License-Identifier: MIT

//! `on_workflow_progress` (spec.md §4.7): the PROGRESS_QUEUE handler that
//! turns a worker's progress ping into a step-status transition plus
//! duration logging.

use crate::context::EngineContext;
use crate::error::EngineError;
use gobw_core::{JobId, StepId, StepStatus};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Wire shape of a progress message (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressMessage {
    pub jobid: String,
    pub stepid: String,
    pub status: ProgressStatus,
    #[serde(default)]
    pub info_msg: Option<String>,
}

/// `status ∈ {STARTED, OK, FAIL, SCHEDULED, REJECTED, END}` (spec.md §6).
/// `End` carries no step transition of its own — it marks that this step's
/// result ended the whole workflow, logged but not persisted as a
/// [`StepStatus`] (the closed step-status set has no such variant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProgressStatus {
    Scheduled,
    Started,
    Ok,
    Fail,
    Rejected,
    End,
}

impl ProgressStatus {
    fn as_step_status(self) -> Option<StepStatus> {
        match self {
            ProgressStatus::Scheduled => Some(StepStatus::Scheduled),
            ProgressStatus::Started => Some(StepStatus::Started),
            ProgressStatus::Ok => Some(StepStatus::Ok),
            ProgressStatus::Fail => Some(StepStatus::Fail),
            ProgressStatus::Rejected => Some(StepStatus::Rejected),
            ProgressStatus::End => None,
        }
    }
}

/// Sets the step's status; on OK/FAIL also logs the step's duration
/// (truncated to seconds). FAIL's duration and error logging, and ending
/// the owning job, already happen inside [`crate::lifecycle::step_status`].
/// `End` logs "End of workflow" without touching step state. Fires the
/// `on_progress` external hook in every case.
pub async fn on_workflow_progress(ctx: &EngineContext, progress: &ProgressMessage) -> Result<(), EngineError> {
    let jobid = JobId::new(progress.jobid.clone());
    let stepid = StepId::new(progress.stepid.clone());

    let Some(status) = progress.status.as_step_status() else {
        info!(job_id = %jobid, step_id = %stepid, "End of workflow");
        ctx.hooks.on_progress(&jobid, &stepid, progress.status);
        return Ok(());
    };

    let step = crate::lifecycle::step_status(ctx, &stepid, status, progress.info_msg.as_deref()).await?;

    if status == StepStatus::Ok {
        if let Some(secs) = step.duration_secs() {
            info!(job_id = %jobid, step_id = %stepid, duration_secs = secs, "step finished");
        }
    }

    ctx.hooks.on_progress(&jobid, &stepid, progress.status);
    Ok(())
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
