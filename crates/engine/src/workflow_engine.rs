// SPDX-License-Identifier: MIT

//! Interprets a built workflow tree against incoming step results
//! (spec.md §4.5).

use crate::context::EngineContext;
use crate::error::EngineError;
use crate::lifecycle::{job_end, job_start, step_start, step_status};
use gobw_core::{DynamicStepSpec, Envelope, JobId, JobStatus, StepId, StepStatus, WorkflowRef};
use gobw_workflow::{build_dynamic_tree, build_tree, Node, StepAction, WORKFLOW_EXCHANGE};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use tracing::{error, info, warn};

/// Historical sentinel: in the original source a step function that starts
/// a nested workflow returns this value so the *current* workflow ends
/// cleanly. Our step functions are a closed `StepAction` enum rather than
/// arbitrary code, so nothing here returns it directly; it is kept for
/// callers (e.g. the dispatch loop) that need to express the same "handed
/// off to another workflow, stop here" outcome explicitly.
pub const END_OF_WORKFLOW: &str = "END_OF_WORKFLOW";

/// One in-flight interpretation of a workflow tree, positioned at a
/// particular node (spec.md §4.5).
#[derive(Clone)]
pub struct Workflow {
    workflow_name: String,
    step: Node,
    /// Set when the constructor couldn't find `step_name` in the current
    /// tree (schema drift): the next `handle_result` restarts from the root
    /// instead of resuming the orphaned node.
    workflow_changed: bool,
}

impl Workflow {
    /// Resolves the starting node for `(workflow_name, step_name)`. With no
    /// `step_name`, starts at the tree root. With `dynamic_steps`, builds a
    /// synthesized tree instead of looking `workflow_name` up in the
    /// registry.
    pub fn new(
        ctx: &EngineContext,
        workflow_name: &str,
        step_name: Option<&str>,
        dynamic_steps: Option<&[DynamicStepSpec]>,
    ) -> Result<Self, EngineError> {
        let tree = match dynamic_steps {
            Some(specs) if !specs.is_empty() => {
                build_dynamic_tree(&ctx.registry, specs)?.ok_or(EngineError::EmptyDynamicWorkflow)?
            }
            _ => build_tree(&ctx.registry, workflow_name)?,
        };

        let (step, workflow_changed) = match step_name {
            None => (tree.clone(), false),
            Some(name) => match tree.get_node(name) {
                Some(node) => (node.clone(), false),
                None => {
                    warn!(workflow = workflow_name, step = name, "unknown step, restarting from root");
                    (tree.clone(), true)
                }
            },
        };

        Ok(Self {
            workflow_name: workflow_name.to_string(),
            step,
            workflow_changed,
        })
    }

    pub fn step_name(&self) -> &str {
        &self.step.name
    }

    /// `start` (spec.md §4.5): starts a job for this workflow unless the
    /// envelope already carries a `jobid`, rejects duplicates, and otherwise
    /// executes the starting step.
    pub async fn start(&self, ctx: &EngineContext, envelope: &mut Envelope, retry_time: u64) -> Result<(), EngineError> {
        apply_header_parameters(envelope, &self.step.header_parameters);

        if envelope.header.jobid.is_none() {
            job_start(ctx, &self.workflow_name, envelope).await?;
        }
        let jobid = envelope.header.jobid.clone().ok_or(EngineError::MissingJobId)?;
        let job = gobw_storage::job_get(&ctx.gateway, &JobId::new(jobid))
            .await?
            .ok_or_else(|| EngineError::UnknownJob(envelope.header.jobid.clone().unwrap_or_default()))?;

        let scope = envelope.header.job_type_scope();
        let fingerprint = envelope.header.fingerprint_args();
        let duplicate = gobw_storage::job_runs(&ctx.gateway, &self.workflow_name, scope, &fingerprint, &job.id).await?;

        if let Some(running) = duplicate {
            let is_zombie = running.is_zombie(Some(running.start), ctx.clock.now(), ctx.zombie_threshold);
            if !ctx.allow_parallel_zombie || !is_zombie {
                info!(job_id = %job.id, duplicate_of = %running.id, "rejecting duplicate job");
                self.reject(ctx, envelope, retry_time).await?;
                return Ok(());
            }
        }

        self.function(ctx, envelope).await
    }

    /// `reject` (spec.md §4.5 step 3, §7 "Duplicate job"): starts and
    /// immediately rejects an "accept" step, ends the job as rejected, and
    /// optionally resubmits a deep copy of the original message after a
    /// delay via the bus (no in-process sleeps; redelivery is the retry
    /// mechanism so the dispatch loop stays non-blocking).
    async fn reject(&self, ctx: &EngineContext, envelope: &mut Envelope, retry_time: u64) -> Result<(), EngineError> {
        let accept = step_start(ctx, "accept", envelope).await?;
        step_status(ctx, &accept.id, StepStatus::Started, None).await?;
        step_status(ctx, &accept.id, StepStatus::Rejected, None).await?;

        let jobid = envelope.header.jobid.clone().ok_or(EngineError::MissingJobId)?;
        job_end(ctx, &JobId::new(jobid), JobStatus::Rejected).await?;

        if retry_time > 0 {
            let mut retry_envelope = envelope.clone();
            retry_envelope.header.jobid = None;
            retry_envelope.workflow = Some(WorkflowRef {
                workflow_name: self.workflow_name.clone(),
                step_name: None,
                retry_time: Some(retry_time),
            });
            ctx.bus.publish(WORKFLOW_EXCHANGE, "workflow.request", &retry_envelope).await?;
            info!(retry_time, "rejected job scheduled for delayed retry");
        } else {
            error!(workflow = %self.workflow_name, "rejected duplicate job, no retry requested");
        }
        Ok(())
    }

    /// `_function(step)` (spec.md §4.5): applies header parameters, opens a
    /// new step record, clears the summary, and interprets the step's
    /// action. `Start` recurses in-process (no bus round trip); `Publish`
    /// sends the augmented envelope to the bus.
    fn function<'a>(
        &'a self,
        ctx: &'a EngineContext,
        envelope: &'a mut Envelope,
    ) -> Pin<Box<dyn Future<Output = Result<(), EngineError>> + Send + 'a>> {
        Box::pin(async move {
            apply_header_parameters(envelope, &self.step.header_parameters);
            let step = step_start(ctx, &self.step.name, envelope).await?;
            step_status(ctx, &step.id, StepStatus::Started, None).await?;
            envelope.summary = None;

            match &self.step.action {
                StepAction::Noop => Ok(()),
                StepAction::Publish { exchange, key } => {
                    ctx.bus.publish(exchange, key, envelope).await?;
                    Ok(())
                }
                StepAction::Start { sub_step } => {
                    let next = self
                        .step
                        .get_node(sub_step)
                        .cloned()
                        .ok_or_else(|| EngineError::UnknownStep(sub_step.clone()))?;
                    let inner = Workflow {
                        workflow_name: self.workflow_name.clone(),
                        step: next,
                        workflow_changed: false,
                    };
                    inner.function(ctx, envelope).await
                }
            }
        })
    }

    /// `handle_result` (spec.md §4.5): accumulates log counts, then either
    /// restarts from the root (`workflow_changed`) or evaluates this step's
    /// `next` edges in order and dispatches the first match; with no match,
    /// the workflow ends.
    pub async fn handle_result(&self, ctx: &EngineContext, envelope: &mut Envelope) -> Result<(), EngineError> {
        let jobid = envelope.header.jobid.clone().ok_or(EngineError::MissingJobId)?;
        let jobid = JobId::new(jobid);

        if let Some(mut job) = gobw_storage::job_get(&ctx.gateway, &jobid).await? {
            if let Some(summary) = &envelope.summary {
                if let Some(counts) = &summary.log_counts {
                    job.accumulate_log_counts(counts);
                    gobw_storage::job_update(&ctx.gateway, &job).await?;
                }
            }
        }

        if let Some(stepid) = envelope.header.stepid.clone() {
            ctx.hooks.on_step_result(&jobid, &StepId::new(stepid), envelope);
        }

        if self.workflow_changed {
            let root = Workflow {
                workflow_name: self.workflow_name.clone(),
                step: self.step.clone(),
                workflow_changed: false,
            };
            return root.function(ctx, envelope).await;
        }

        for edge in &self.step.next {
            if edge.condition.evaluate(envelope, &ctx.predicates) {
                let next = Workflow {
                    workflow_name: self.workflow_name.clone(),
                    step: edge.node.clone(),
                    workflow_changed: false,
                };
                return next.function(ctx, envelope).await;
            }
        }

        self.end_of_workflow(ctx, envelope).await
    }

    /// `end_of_workflow` (spec.md §4.5): publishes to `on_workflow_complete`
    /// if present and well-formed, logs, and ends the job.
    pub async fn end_of_workflow(&self, ctx: &EngineContext, envelope: &mut Envelope) -> Result<(), EngineError> {
        let jobid = envelope.header.jobid.clone().ok_or(EngineError::MissingJobId)?;
        let jobid = JobId::new(jobid);

        match envelope.on_workflow_complete() {
            Ok(Some(owc)) => {
                ctx.bus.publish(&owc.exchange, &owc.key, envelope).await?;
            }
            Ok(None) => {}
            Err(e) => error!(job_id = %jobid, error = %e, "malformed on_workflow_complete, skipping publish"),
        }

        info!(job_id = %jobid, workflow = %self.workflow_name, "end of workflow");
        ctx.hooks.on_workflow_end(&jobid, envelope);
        job_end(ctx, &jobid, JobStatus::Ended).await
    }
}

fn apply_header_parameters(envelope: &mut Envelope, header_parameters: &HashMap<String, serde_json::Value>) {
    envelope.header.extra.extend(header_parameters.iter().map(|(k, v)| (k.clone(), v.clone())));
}

/// `start_workflow` helper (spec.md §4.5): sets `msg.workflow` and publishes
/// a `workflow.request`, so the orchestrator's own `start_workflow`
/// dispatch binding instantiates a fresh [`Workflow`] with these
/// parameters. The invoking step should end cleanly after this call
/// (the historical [`END_OF_WORKFLOW`] sentinel).
pub async fn start_workflow(
    ctx: &EngineContext,
    workflow_name: &str,
    step_name: Option<&str>,
    mut envelope: Envelope,
) -> Result<(), EngineError> {
    envelope.workflow = Some(WorkflowRef {
        workflow_name: workflow_name.to_string(),
        step_name: step_name.map(str::to_string),
        retry_time: None,
    });
    ctx.bus.publish(WORKFLOW_EXCHANGE, "workflow.request", &envelope).await?;
    Ok(())
}

#[cfg(test)]
#[path = "workflow_engine_tests.rs"]
mod tests;
