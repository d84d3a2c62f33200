use super::*;
use std::collections::HashSet;

fn task(name: &str, deps: &[&str]) -> Task {
    Task::new(
        TaskId::new(format!("t-{name}")),
        JobId::new("j1"),
        StepId::new("s1"),
        name.into(),
        deps.iter().map(|s| s.to_string()).collect(),
        "p".into(),
        "pid".into(),
        HashMap::new(),
        HashMap::new(),
    )
}

#[test]
fn new_task_has_no_dependencies_satisfied_trivially() {
    let t = task("a", &[]);
    assert!(t.dependencies_satisfied(&HashSet::new()));
}

#[test]
fn dependencies_satisfied_requires_all_present() {
    let t = task("c", &["a", "b"]);
    let mut completed = HashSet::new();
    completed.insert("a".to_string());
    assert!(!t.dependencies_satisfied(&completed));
    completed.insert("b".to_string());
    assert!(t.dependencies_satisfied(&completed));
}

#[test]
fn new_task_status_is_new_and_unlocked() {
    let t = task("a", &[]);
    assert_eq!(t.status, TaskStatus::New);
    assert!(t.lock.is_none());
}

#[test]
fn terminal_statuses_are_completed_aborted_failed() {
    assert!(TaskStatus::Completed.is_terminal());
    assert!(TaskStatus::Aborted.is_terminal());
    assert!(TaskStatus::Failed.is_terminal());
    assert!(!TaskStatus::New.is_terminal());
    assert!(!TaskStatus::Queued.is_terminal());
}
