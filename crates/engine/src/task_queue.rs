// SPDX-License-Identifier: MIT

//! Task queue: cuts a jobstep into dependency-ordered tasks (spec.md §4.6),
//! grounded on `gobworkflow/task/queue.py`'s `TaskQueue`.

use crate::context::EngineContext;
use crate::error::EngineError;
use gobw_core::{Envelope, JobId, StepId, Task, TaskId, TaskStatus};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tracing::info;

const TASK_KEY: &str = ".task.request";
const COMPLETE_KEY: &str = ".task.complete";

#[derive(Debug, Deserialize)]
struct TaskSpec {
    task_name: String,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    extra_msg: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StartTasksContents {
    tasks: Vec<TaskSpec>,
    key_prefix: String,
    #[serde(default)]
    extra_msg: HashMap<String, serde_json::Value>,
}

/// `on_start_tasks` (spec.md §4.6): loads the (possibly offloaded) task
/// batch, validates it, creates the task rows, and queues whichever tasks
/// have no unmet dependency.
pub async fn on_start_tasks(ctx: &EngineContext, envelope: &Envelope) -> Result<(), EngineError> {
    let jobid = envelope.header.jobid.clone().ok_or(EngineError::MissingJobId)?;
    let stepid = envelope.header.stepid.clone().ok_or(EngineError::MissingJobId)?;
    let jobid = JobId::new(jobid);
    let stepid = StepId::new(stepid);

    gobw_storage::step_get(&ctx.gateway, &stepid)
        .await?
        .ok_or_else(|| EngineError::UnknownStep(stepid.to_string()))?;

    let contents = gobw_bus::load_message(envelope)?
        .ok_or_else(|| EngineError::Core(gobw_core::CoreError::InvalidEnvelope("on_start_tasks message carries no contents".into())))?;
    let contents: StartTasksContents = serde_json::from_value(contents).map_err(|e| {
        EngineError::Core(gobw_core::CoreError::InvalidEnvelope(format!("malformed task batch: {e}")))
    })?;

    validate_dependencies(&contents.tasks)?;
    create_tasks(ctx, &jobid, &stepid, &contents, &envelope.header.extra).await?;
    queue_free_tasks(ctx, &stepid).await?;
    Ok(())
}

/// Task names unique, and every dependency appears strictly earlier in the
/// batch (topological prefix) — spec.md §4.6 step 3.
fn validate_dependencies(tasks: &[TaskSpec]) -> Result<(), EngineError> {
    let mut seen = HashSet::new();
    for task in tasks {
        if !seen.insert(task.task_name.clone()) {
            return Err(EngineError::DuplicateTaskName(task.task_name.clone()));
        }
    }

    let mut done = HashSet::new();
    for task in tasks {
        for dependency in &task.dependencies {
            if !done.contains(dependency) {
                return Err(EngineError::DanglingDependency {
                    task: task.task_name.clone(),
                    dependency: dependency.clone(),
                });
            }
        }
        done.insert(task.task_name.clone());
    }
    Ok(())
}

async fn create_tasks(
    ctx: &EngineContext,
    jobid: &JobId,
    stepid: &StepId,
    contents: &StartTasksContents,
    header_extra: &HashMap<String, serde_json::Value>,
) -> Result<(), EngineError> {
    let existing = gobw_storage::tasks_for_step(&ctx.gateway, stepid).await?;
    if !existing.is_empty() {
        return Err(EngineError::TasksAlreadyExist(stepid.to_string()));
    }

    let process_id = jobid.to_string();
    for spec in &contents.tasks {
        let mut extra_msg = contents.extra_msg.clone();
        extra_msg.extend(spec.extra_msg.iter().map(|(k, v)| (k.clone(), v.clone())));

        let task = Task::new(
            TaskId::new(ctx.id_gen.next()),
            jobid.clone(),
            stepid.clone(),
            spec.task_name.clone(),
            spec.dependencies.clone(),
            contents.key_prefix.clone(),
            process_id.clone(),
            extra_msg,
            header_extra.clone(),
        );
        gobw_storage::task_save(&ctx.gateway, &task).await?;
    }
    Ok(())
}

/// Locks and publishes every new task whose dependencies are all completed
/// (spec.md §4.6 step 5). Re-reads the task after winning the lock in case
/// another worker transitioned it first.
async fn queue_free_tasks(ctx: &EngineContext, stepid: &StepId) -> Result<(), EngineError> {
    let tasks = gobw_storage::tasks_for_step(&ctx.gateway, stepid).await?;
    let completed: HashSet<String> = gobw_storage::completed_task_names(&ctx.gateway, stepid)
        .await?
        .into_iter()
        .collect();

    for task in tasks.into_iter().filter(|t| t.status == TaskStatus::New) {
        if !task.dependencies_satisfied(&completed) {
            continue;
        }
        let now = ctx.clock.now();
        if !gobw_storage::task_lock(&ctx.gateway, &task.id, now).await? {
            continue;
        }

        if let Some(mut locked) = gobw_storage::task_get(&ctx.gateway, &task.id).await? {
            if locked.status == TaskStatus::New {
                publish_task(ctx, &locked).await?;
                locked.status = TaskStatus::Queued;
                locked.start = Some(now);
                gobw_storage::task_update(&ctx.gateway, &locked).await?;
            }
        }
        gobw_storage::task_unlock(&ctx.gateway, &task.id).await?;
    }
    Ok(())
}

async fn publish_task(ctx: &EngineContext, task: &Task) -> Result<(), EngineError> {
    let mut header = gobw_core::Header {
        jobid: Some(task.jobid.to_string()),
        stepid: Some(task.stepid.to_string()),
        process_id: Some(task.process_id.clone()),
        extra: task.extra_header.clone(),
        ..Default::default()
    };
    header.extra.insert("task_name".to_string(), serde_json::Value::String(task.name.clone()));
    header.extra.insert("taskid".to_string(), serde_json::Value::String(task.id.to_string()));

    let mut envelope = Envelope::new(header);
    envelope.header.extra.extend(task.extra_msg.iter().map(|(k, v)| (k.clone(), v.clone())));

    ctx.bus
        .publish(gobw_workflow::WORKFLOW_EXCHANGE, &format!("{}{}", task.key_prefix, TASK_KEY), &envelope)
        .await?;
    Ok(())
}

/// `on_task_result` (spec.md §4.6): classifies the result, aborts the
/// sibling group on failure, otherwise re-queues newly-free tasks and
/// publishes completion once every task for the step is completed.
pub async fn on_task_result(ctx: &EngineContext, envelope: &Envelope) -> Result<(), EngineError> {
    let taskid = envelope
        .header
        .extra
        .get("taskid")
        .and_then(|v| v.as_str())
        .map(TaskId::new)
        .ok_or(EngineError::MissingJobId)?;

    let mut task = gobw_storage::task_get(&ctx.gateway, &taskid)
        .await?
        .ok_or_else(|| EngineError::UnknownTask(taskid.to_string()))?;

    let failed = !envelope.has_no_errors();
    gobw_storage::merge_envelope_summary(&mut task, envelope);
    task.status = if failed { TaskStatus::Failed } else { TaskStatus::Completed };
    task.end = Some(ctx.clock.now());
    gobw_storage::task_update(&ctx.gateway, &task).await?;

    if failed {
        info!(task_id = %taskid, step_id = %task.stepid, "task failed, aborting sibling group");
        abort_tasks(ctx, &task.stepid).await?;
        publish_complete(ctx, &task).await?;
    } else {
        queue_free_tasks(ctx, &task.stepid).await?;
        let all = gobw_storage::tasks_for_step(&ctx.gateway, &task.stepid).await?;
        if !all.is_empty() && all.iter().all(|t| t.status == TaskStatus::Completed) {
            publish_complete(ctx, &task).await?;
        }
    }
    Ok(())
}

/// Aborts every still-`new` sibling task (spec.md §4.6 "abort the group").
async fn abort_tasks(ctx: &EngineContext, stepid: &StepId) -> Result<(), EngineError> {
    let tasks = gobw_storage::tasks_for_step(&ctx.gateway, stepid).await?;
    for mut task in tasks.into_iter().filter(|t| t.status == TaskStatus::New) {
        let now = ctx.clock.now();
        if gobw_storage::task_lock(&ctx.gateway, &task.id, now).await? {
            task.status = TaskStatus::Aborted;
            gobw_storage::task_update(&ctx.gateway, &task).await?;
            gobw_storage::task_unlock(&ctx.gateway, &task.id).await?;
        }
    }
    Ok(())
}

/// Publishes `{key_prefix}.complete` with the concatenated warnings/errors
/// across every task in the step (spec.md §4.6 "Group completion
/// publication").
async fn publish_complete(ctx: &EngineContext, template: &Task) -> Result<(), EngineError> {
    let all = gobw_storage::tasks_for_step(&ctx.gateway, &template.stepid).await?;
    let warnings: Vec<String> = all.iter().flat_map(|t| t.summary.warnings.clone()).collect();
    let errors: Vec<String> = all.iter().flat_map(|t| t.summary.errors.clone()).collect();

    let header = gobw_core::Header {
        jobid: Some(template.jobid.to_string()),
        stepid: Some(template.stepid.to_string()),
        extra: template.extra_header.clone(),
        ..Default::default()
    };
    let mut envelope = Envelope::new(header);
    envelope.summary = Some(gobw_core::Summary {
        warnings,
        errors,
        log_counts: None,
    });
    envelope.header.extra.extend(template.extra_msg.iter().map(|(k, v)| (k.clone(), v.clone())));

    ctx.bus
        .publish(
            gobw_workflow::WORKFLOW_EXCHANGE,
            &format!("{}{}", template.key_prefix, COMPLETE_KEY),
            &envelope,
        )
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "task_queue_tests.rs"]
mod tests;
