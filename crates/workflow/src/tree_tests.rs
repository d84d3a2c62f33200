use super::*;
use crate::registry::{NextDef, StepDef, WorkflowDef, WorkflowRegistry};
use indexmap::IndexMap;

fn publish(exchange: &str, key: &str) -> StepAction {
    StepAction::Publish {
        exchange: exchange.into(),
        key: key.into(),
    }
}

/// Mirrors the shape of the IMPORT workflow: prepare -> (graft import_workflows) ...
fn registry_with_import() -> WorkflowRegistry {
    let mut registry = WorkflowRegistry::new();

    let mut update_model_steps = IndexMap::new();
    update_model_steps.insert(
        "update_model".to_string(),
        StepDef::Step {
            action: publish("workflow", "apply.request"),
            next: vec![],
            header_parameters: HashMap::new(),
        },
    );
    registry
        .register(
            "update_model",
            WorkflowDef {
                name: String::new(),
                start: "update_model".to_string(),
                steps: update_model_steps,
            },
        )
        .unwrap();

    let mut import_steps = IndexMap::new();
    import_steps.insert(
        "read".to_string(),
        StepDef::Step {
            action: publish("workflow", "import.request"),
            next: vec![NextDef::to_step("apply")],
            header_parameters: HashMap::new(),
        },
    );
    import_steps.insert(
        "apply".to_string(),
        StepDef::Step {
            action: publish("workflow", "apply.request"),
            next: vec![NextDef::graft_workflow("update_model")],
            header_parameters: HashMap::new(),
        },
    );
    import_steps.insert("alias_to_read".to_string(), StepDef::Alias("read".to_string()));
    registry
        .register(
            "import",
            WorkflowDef {
                name: String::new(),
                start: "read".to_string(),
                steps: import_steps,
            },
        )
        .unwrap();

    registry
}

#[test]
fn build_tree_resolves_foreign_workflow_grafts() {
    let registry = registry_with_import();
    let root = build_tree(&registry, "import").unwrap();

    assert_eq!(root.name, "read");
    let apply = root.get_node("apply").unwrap();
    assert_eq!(apply.next.len(), 1);
    assert_eq!(apply.next[0].node.name, "update_model");
}

#[test]
fn build_tree_resolves_alias() {
    let registry = registry_with_import();
    let node = build_node(&registry, registry.get("import").unwrap(), "alias_to_read").unwrap();
    assert_eq!(node.name, "read");
}

#[test]
fn get_node_depth_first() {
    let registry = registry_with_import();
    let root = build_tree(&registry, "import").unwrap();
    assert!(root.get_node("update_model").is_some());
    assert!(root.get_node("nonexistent").is_none());
}

#[test]
fn get_leafs_returns_terminal_nodes() {
    let registry = registry_with_import();
    let root = build_tree(&registry, "import").unwrap();
    let leafs = root.get_leafs();
    assert_eq!(leafs.len(), 1);
    assert_eq!(leafs[0].name, "update_model");
}

#[test]
fn append_node_adds_edge() {
    let mut root = Node::leaf("start");
    assert!(root.get_leafs().len() == 1);
    root.append_node(Node::leaf("next"), Condition::AlwaysTrue);
    assert_eq!(root.next.len(), 1);
    assert_eq!(root.get_leafs()[0].name, "next");
}

#[test]
fn append_to_names_renames_whole_subtree() {
    let mut root = Node::leaf("a");
    root.append_node(Node::leaf("b"), Condition::default());
    root.append_to_names("1");

    assert_eq!(root.name, "a_1");
    assert_eq!(root.next[0].node.name, "b_1");
}

#[test]
fn unknown_workflow_is_an_error() {
    let registry = WorkflowRegistry::new();
    assert!(matches!(
        build_tree(&registry, "nope"),
        Err(WorkflowError::UnknownWorkflow(name)) if name == "nope"
    ));
}
