// SPDX-License-Identifier: MIT

//! Shared error type for malformed envelopes and invariant violations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("message header missing required field: {0}")]
    MissingHeaderField(&'static str),

    #[error("duplicate task name within step: {0}")]
    DuplicateTaskName(String),

    #[error("task {task} depends on {dependency}, which is not declared earlier in the batch")]
    DanglingDependency { task: String, dependency: String },

    #[error("malformed on_workflow_complete spec: {0}")]
    MalformedWorkflowComplete(String),

    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),
}
