// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Storage(#[from] gobw_storage::StorageError),

    #[error(transparent)]
    Workflow(#[from] gobw_workflow::WorkflowError),

    #[error(transparent)]
    Core(#[from] gobw_core::CoreError),

    #[error(transparent)]
    Bus(#[from] gobw_bus::BusError),

    #[error("dynamic workflow specification produced no steps")]
    EmptyDynamicWorkflow,

    #[error("message header carries no jobid")]
    MissingJobId,

    #[error("no job found with id {0}")]
    UnknownJob(String),

    #[error("no jobstep found with id {0}")]
    UnknownStep(String),

    #[error("no task found with id {0}")]
    UnknownTask(String),

    #[error("jobstep {0} already has tasks")]
    TasksAlreadyExist(String),

    #[error("duplicate task name within step: {0}")]
    DuplicateTaskName(String),

    #[error("task {task} depends on {dependency}, which is not declared earlier in the batch")]
    DanglingDependency { task: String, dependency: String },
}
