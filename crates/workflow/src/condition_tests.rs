use super::*;
use gobw_core::{Envelope, Header, Summary};

fn envelope_with_errors(errors: Vec<&str>) -> Envelope {
    let mut e = Envelope::new(Header::default());
    e.summary = Some(Summary {
        errors: errors.into_iter().map(String::from).collect(),
        ..Default::default()
    });
    e
}

#[test]
fn no_errors_condition_matches_has_no_errors() {
    let registry = PredicateRegistry::new();
    assert!(Condition::NoErrors.evaluate(&envelope_with_errors(vec![]), &registry));
    assert!(!Condition::NoErrors.evaluate(&envelope_with_errors(vec!["boom"]), &registry));
}

#[test]
fn always_true_ignores_errors() {
    let registry = PredicateRegistry::new();
    assert!(Condition::AlwaysTrue.evaluate(&envelope_with_errors(vec!["boom"]), &registry));
}

#[test]
fn predicate_dispatches_by_name() {
    let mut registry = PredicateRegistry::new();
    registry.register("is_retry", |e: &Envelope| e.header.jobid.is_some());

    let cond = Condition::Predicate {
        name: "is_retry".to_string(),
    };

    let mut e = envelope_with_errors(vec![]);
    assert!(!cond.evaluate(&e, &registry));

    e.header.jobid = Some("job-1".to_string());
    assert!(cond.evaluate(&e, &registry));
}

#[test]
fn unknown_predicate_is_false_not_panic() {
    let registry = PredicateRegistry::new();
    let cond = Condition::Predicate {
        name: "nonexistent".to_string(),
    };
    assert!(!cond.evaluate(&envelope_with_errors(vec![]), &registry));
}

#[test]
fn default_condition_is_no_errors() {
    assert_eq!(Condition::default(), Condition::NoErrors);
}
