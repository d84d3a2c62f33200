// SPDX-License-Identifier: MIT

//! Compile-time-populated workflows, the Rust analogue of the module-level
//! `WORKFLOWS` dict in `gobworkflow/workflow/config.py`.

use crate::condition::Condition;
use crate::registry::{NextDef, StepDef, WorkflowDef, WorkflowRegistry};
use crate::step_action::StepAction;
use crate::WorkflowError;
use indexmap::IndexMap;

const WORKFLOW_EXCHANGE: &str = "workflow";

fn publish(key: &str) -> StepAction {
    StepAction::Publish {
        exchange: WORKFLOW_EXCHANGE.to_string(),
        key: key.to_string(),
    }
}

fn step(action: StepAction, next: Vec<NextDef>) -> StepDef {
    StepDef::Step {
        action,
        next,
        header_parameters: Default::default(),
    }
}

/// Registers the built-in workflows known at process start. Returns an
/// error only if two built-ins collide, which would be a programming
/// mistake caught immediately on startup.
pub fn register_builtins(registry: &mut WorkflowRegistry) -> Result<(), WorkflowError> {
    registry.register("update_model", update_model())?;
    registry.register("import", import())?;
    registry.register("export", export())?;
    registry.register("relate", relate())?;
    Ok(())
}

fn update_model() -> WorkflowDef {
    let mut steps = IndexMap::new();
    steps.insert("update_model".to_string(), step(publish("apply.request"), vec![]));
    WorkflowDef {
        name: String::new(),
        start: "update_model".to_string(),
        steps,
    }
}

fn import() -> WorkflowDef {
    let mut steps = IndexMap::new();
    steps.insert(
        "prepare".to_string(),
        step(publish("prepare.request"), vec![NextDef::to_step("import_workflows")]),
    );
    steps.insert(
        "import_workflows".to_string(),
        step(publish("import_workflows.request"), vec![]),
    );
    steps.insert(
        "read".to_string(),
        step(publish("import.request"), vec![NextDef::to_step("update_model")]),
    );
    steps.insert(
        "update_model".to_string(),
        step(publish("apply.request"), vec![NextDef::to_step("compare")]),
    );
    steps.insert(
        "compare".to_string(),
        step(publish("compare.request"), vec![NextDef::to_step("upload")]),
    );
    steps.insert(
        "upload".to_string(),
        step(publish("fullupdate.request"), vec![NextDef::to_step("apply_events")]),
    );
    steps.insert("apply_events".to_string(), step(publish("apply.request"), vec![]));
    WorkflowDef {
        name: String::new(),
        start: "read".to_string(),
        steps,
    }
}

fn export() -> WorkflowDef {
    let mut steps = IndexMap::new();
    steps.insert("generate".to_string(), step(publish("export.request"), vec![]));
    steps.insert("test".to_string(), step(publish("export_test.request"), vec![]));
    WorkflowDef {
        name: String::new(),
        start: "generate".to_string(),
        steps,
    }
}

fn relate() -> WorkflowDef {
    let mut steps = IndexMap::new();
    steps.insert(
        "relate".to_string(),
        step(
            publish("relate.request"),
            vec![NextDef::to_step_with_condition("check", Condition::AlwaysTrue)],
        ),
    );
    steps.insert("check".to_string(), step(publish("check_relation.request"), vec![]));
    WorkflowDef {
        name: String::new(),
        start: "relate".to_string(),
        steps,
    }
}

#[cfg(test)]
#[path = "builtins_tests.rs"]
mod tests;
