// SPDX-License-Identifier: MIT

//! External notification hooks (spec.md §4.5, §4.7 "fire external hooks").
//!
//! The original source leaves this as an unspecified pluggable point for
//! Slack/monitoring integrations invoked around `handle_result` and
//! `on_workflow_progress`. We implement the seam and a logging-only default
//! without inventing the concrete integration.

use crate::context::EngineContext;
use crate::error::EngineError;
use crate::progress::ProgressStatus;
use gobw_core::{Envelope, JobId, StepId};
use gobw_workflow::WORKFLOW_EXCHANGE;

/// Notified at the points spec.md §4.5/§4.7 describe as "fire external
/// hooks". Implementations must not block the dispatch loop for long.
pub trait WorkflowHooks: Send + Sync {
    fn on_step_result(&self, _jobid: &JobId, _stepid: &StepId, _envelope: &Envelope) {}

    fn on_workflow_end(&self, _jobid: &JobId, _envelope: &Envelope) {}

    fn on_progress(&self, _jobid: &JobId, _stepid: &StepId, _status: ProgressStatus) {}
}

/// Default hook set: logs at debug level and does nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl WorkflowHooks for NoopHooks {
    fn on_step_result(&self, jobid: &JobId, stepid: &StepId, _envelope: &Envelope) {
        tracing::debug!(job_id = %jobid, step_id = %stepid, "on_step_result hook (noop)");
    }

    fn on_workflow_end(&self, jobid: &JobId, _envelope: &Envelope) {
        tracing::debug!(job_id = %jobid, "on_workflow_end hook (noop)");
    }

    fn on_progress(&self, jobid: &JobId, stepid: &StepId, status: ProgressStatus) {
        tracing::debug!(job_id = %jobid, step_id = %stepid, ?status, "on_progress hook (noop)");
    }
}

/// `has_hooks`/`handle_result`'s hook pre-check (spec.md §4.7): if
/// `header.result_key` is set, the message is re-published to that key on
/// the workflow exchange and the caller must skip its normal handler.
/// Returns `true` when the short-circuit fired.
pub async fn check_result_hook(ctx: &EngineContext, envelope: &Envelope) -> Result<bool, EngineError> {
    let Some(key) = &envelope.header.result_key else {
        return Ok(false);
    };
    ctx.bus.publish(WORKFLOW_EXCHANGE, key, envelope).await?;
    Ok(true)
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
