use super::*;
use crate::tree::build_tree;

#[test]
fn register_builtins_populates_all_four_workflows() {
    let mut registry = WorkflowRegistry::new();
    register_builtins(&mut registry).unwrap();

    let names: Vec<_> = registry.names().collect();
    for expected in ["update_model", "import", "export", "relate"] {
        assert!(names.contains(&expected), "missing workflow {expected}");
    }
}

#[test]
fn import_tree_walks_read_to_apply_events() {
    let mut registry = WorkflowRegistry::new();
    register_builtins(&mut registry).unwrap();

    let root = build_tree(&registry, "import").unwrap();
    assert_eq!(root.name, "read");
    let leafs = root.get_leafs();
    assert_eq!(leafs.len(), 1);
    assert_eq!(leafs[0].name, "apply_events");
}

#[test]
fn register_builtins_is_idempotent_error_on_double_registration() {
    let mut registry = WorkflowRegistry::new();
    register_builtins(&mut registry).unwrap();
    assert!(register_builtins(&mut registry).is_err());
}
