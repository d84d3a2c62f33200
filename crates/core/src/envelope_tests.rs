use super::*;

#[test]
fn has_no_errors_true_when_summary_absent() {
    let env = Envelope::new(Header::default());
    assert!(env.has_no_errors());
}

#[test]
fn has_no_errors_true_when_errors_empty() {
    let mut env = Envelope::new(Header::default());
    env.summary_mut().warnings.push("careful".into());
    assert!(env.has_no_errors());
}

#[test]
fn has_no_errors_false_when_errors_present() {
    let mut env = Envelope::new(Header::default());
    env.summary_mut().errors.push("boom".into());
    assert!(!env.has_no_errors());
}

#[test]
fn fingerprint_args_only_includes_the_three_keys() {
    let header = Header {
        destination: Some("dst".into()),
        entity_id: Some("eid".into()),
        source: Some("src".into()),
        catalogue: Some("cat".into()),
        ..Default::default()
    };
    let args = header.fingerprint_args();
    assert_eq!(args.len(), 3);
    assert_eq!(args.get("destination"), Some(&"dst".to_string()));
    assert_eq!(args.get("entity_id"), Some(&"eid".to_string()));
    assert_eq!(args.get("source"), Some(&"src".to_string()));
}

#[test]
fn name_parts_skips_unset_fields() {
    let header = Header {
        catalogue: Some("meetbouten".into()),
        ..Default::default()
    };
    assert_eq!(header.name_parts(), vec!["meetbouten".to_string()]);
}

#[test]
fn malformed_on_workflow_complete_is_rejected() {
    let mut header = Header::default();
    header.on_workflow_complete = Some(OnWorkflowComplete {
        exchange: String::new(),
        key: "k".into(),
    });
    let env = Envelope::new(header);
    assert!(env.on_workflow_complete().is_err());
}

#[test]
fn well_formed_on_workflow_complete_is_returned() {
    let mut header = Header::default();
    header.on_workflow_complete = Some(OnWorkflowComplete {
        exchange: "gob.workflow".into(),
        key: "done".into(),
    });
    let env = Envelope::new(header);
    let owc = env.on_workflow_complete().unwrap().unwrap();
    assert_eq!(owc.key, "done");
}

#[test]
fn dynamic_step_spec_round_trips_through_json() {
    let spec = DynamicStepSpec::WorkflowStep {
        step_name: "import".into(),
        header: HashMap::new(),
    };
    let json = serde_json::to_string(&spec).unwrap();
    let back: DynamicStepSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(spec, back);
}

#[test]
fn contents_offline_ref_round_trips() {
    let contents = Contents::Offline(OfflineRef {
        offline_path: "/var/gobw/contents/abc.json".into(),
    });
    let json = serde_json::to_value(&contents).unwrap();
    assert_eq!(json["offline_path"], "/var/gobw/contents/abc.json");
    let back: Contents = serde_json::from_value(json).unwrap();
    assert!(back.is_offline());
}

#[test]
fn contents_inline_round_trips() {
    let contents = Contents::inline(serde_json::json!({"tasks": []}));
    let json = serde_json::to_value(&contents).unwrap();
    let back: Contents = serde_json::from_value(json).unwrap();
    assert!(!back.is_offline());
}
