// SPDX-License-Identifier: MIT

//! The workflow registry: the Rust analogue of the module-level `WORKFLOWS`
//! dict in `gobworkflow/workflow/config.py`.
//!
//! Workflows are typically registered once at process start via
//! [`WorkflowRegistry::with_builtins`], populated by hand the way the
//! original module-level dict is. Operators who want to add a workflow
//! without a rebuild can additionally load definitions from a TOML file with
//! [`WorkflowRegistry::load_toml`] — config-driven registration the way the
//! teacher's runbook crate treats a job as data.

use crate::condition::Condition;
use crate::step_action::StepAction;
use crate::WorkflowError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `workflow[step_name]` either names another step directly (`Step`) or is a
/// bare string alias for another step in the same workflow (`Alias`) —
/// mirrors the original's `isinstance(step, str)` dereference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepDef {
    Alias(String),
    Step {
        #[serde(default)]
        action: StepAction,
        #[serde(default)]
        next: Vec<NextDef>,
        #[serde(default)]
        header_parameters: HashMap<String, serde_json::Value>,
    },
}

/// One `next` entry: either a same-workflow step reference or a foreign
/// workflow to graft in whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<String>,
    #[serde(default)]
    pub condition: Condition,
}

impl NextDef {
    pub fn to_step(step: impl Into<String>) -> Self {
        NextDef {
            step: Some(step.into()),
            workflow: None,
            condition: Condition::default(),
        }
    }

    pub fn to_step_with_condition(step: impl Into<String>, condition: Condition) -> Self {
        NextDef {
            step: Some(step.into()),
            workflow: None,
            condition,
        }
    }

    pub fn graft_workflow(workflow: impl Into<String>) -> Self {
        NextDef {
            step: None,
            workflow: Some(workflow.into()),
            condition: Condition::default(),
        }
    }
}

/// `{START: first_step_name, step_name: StepDef, ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDef {
    #[serde(skip)]
    pub name: String,
    pub start: String,
    pub steps: IndexMap<String, StepDef>,
}

/// The set of workflows known to the process.
#[derive(Debug, Clone, Default)]
pub struct WorkflowRegistry {
    workflows: HashMap<String, WorkflowDef>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, mut def: WorkflowDef) -> Result<(), WorkflowError> {
        let name = name.into();
        if self.workflows.contains_key(&name) {
            return Err(WorkflowError::DuplicateWorkflow(name));
        }
        def.name = name.clone();
        self.workflows.insert(name, def);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&WorkflowDef> {
        self.workflows.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.workflows.keys().map(String::as_str)
    }

    /// Parses a TOML document of the form:
    ///
    /// ```toml
    /// [workflows.export]
    /// start = "generate"
    /// [workflows.export.steps.generate]
    /// action = { type = "publish", exchange = "workflow", key = "export.request" }
    /// ```
    pub fn load_toml(&mut self, toml_str: &str) -> Result<(), WorkflowError> {
        #[derive(Deserialize)]
        struct File {
            workflows: HashMap<String, WorkflowDef>,
        }
        let file: File = toml::from_str(toml_str)?;
        for (name, def) in file.workflows {
            self.register(name, def)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
