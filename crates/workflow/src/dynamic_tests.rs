use super::*;
use crate::registry::{StepDef, WorkflowDef};
use indexmap::IndexMap;
use serde_json::json;

fn registry_with_apply() -> WorkflowRegistry {
    let mut registry = WorkflowRegistry::new();
    let mut steps = IndexMap::new();
    steps.insert(
        "apply".to_string(),
        StepDef::Step {
            action: StepAction::Publish {
                exchange: WORKFLOW_EXCHANGE.into(),
                key: "apply.request".into(),
            },
            next: vec![],
            header_parameters: Default::default(),
        },
    );
    registry
        .register(
            "apply",
            WorkflowDef {
                name: String::new(),
                start: "apply".to_string(),
                steps,
            },
        )
        .unwrap();
    registry
}

#[test]
fn empty_spec_list_yields_no_tree() {
    let registry = WorkflowRegistry::new();
    let tree = build_dynamic_tree(&registry, &[]).unwrap();
    assert!(tree.is_none());
}

#[test]
fn workflow_step_synthesizes_publish_action() {
    let registry = WorkflowRegistry::new();
    let specs = vec![DynamicStepSpec::WorkflowStep {
        step_name: "import".to_string(),
        header: Default::default(),
    }];
    let tree = build_dynamic_tree(&registry, &specs).unwrap().unwrap();

    assert_eq!(tree.name, "import_0");
    match &tree.action {
        StepAction::Publish { exchange, key } => {
            assert_eq!(exchange, WORKFLOW_EXCHANGE);
            assert_eq!(key, "import.request");
        }
        other => panic!("unexpected action: {other:?}"),
    }
}

#[test]
fn workflow_entry_grafts_full_tree_and_applies_header() {
    let registry = registry_with_apply();
    let mut header = std::collections::HashMap::new();
    header.insert("catalogue".to_string(), json!("meetbouten"));

    let specs = vec![DynamicStepSpec::Workflow {
        workflow: "apply".to_string(),
        header,
    }];
    let tree = build_dynamic_tree(&registry, &specs).unwrap().unwrap();

    assert_eq!(tree.name, "apply_0");
    assert_eq!(
        tree.header_parameters.get("catalogue"),
        Some(&json!("meetbouten"))
    );
}

#[test]
fn repeated_same_workflow_gets_distinct_indexed_names() {
    let registry = registry_with_apply();
    let specs = vec![
        DynamicStepSpec::Workflow {
            workflow: "apply".to_string(),
            header: Default::default(),
        },
        DynamicStepSpec::Workflow {
            workflow: "apply".to_string(),
            header: Default::default(),
        },
    ];
    let tree = build_dynamic_tree(&registry, &specs).unwrap().unwrap();

    assert_eq!(tree.name, "apply_0");
    let leafs = tree.get_leafs();
    assert_eq!(leafs.len(), 1);
    assert_eq!(leafs[0].name, "apply_1");
}

#[test]
fn unknown_workflow_in_spec_list_errors() {
    let registry = WorkflowRegistry::new();
    let specs = vec![DynamicStepSpec::Workflow {
        workflow: "nope".to_string(),
        header: Default::default(),
    }];
    assert!(build_dynamic_tree(&registry, &specs).is_err());
}
