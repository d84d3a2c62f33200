// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("unknown workflow: {0}")]
    UnknownWorkflow(String),
    #[error("unknown step `{step}` in workflow `{workflow}`")]
    UnknownStep { workflow: String, step: String },
    #[error("next entry on step `{0}` names neither a step nor a workflow")]
    MalformedNext(String),
    #[error("duplicate workflow name: {0}")]
    DuplicateWorkflow(String),
    #[error("failed to parse workflow definitions: {0}")]
    Parse(#[from] toml::de::Error),
}
