use super::*;
use gobw_core::Header;
use serde_json::json;
use tempfile::tempdir;

#[test]
fn small_payload_stays_inline() {
    let mut envelope = Envelope::new(Header::default());
    let dir = tempdir().unwrap();
    save_message(&mut envelope, json!({"hello": "world"}), dir.path()).unwrap();

    assert!(matches!(envelope.contents, Some(Contents::Inline(_))));
    assert_eq!(load_message(&envelope).unwrap(), Some(json!({"hello": "world"})));
}

#[test]
fn large_payload_offloads_and_resolves() {
    let mut envelope = Envelope::new(Header::default());
    let dir = tempdir().unwrap();
    let big = json!({ "data": "x".repeat(OFFLOAD_THRESHOLD_BYTES + 1) });
    save_message(&mut envelope, big.clone(), dir.path()).unwrap();

    assert!(matches!(envelope.contents, Some(Contents::Offline(_))));
    assert_eq!(load_message(&envelope).unwrap(), Some(big));
}

#[test]
fn missing_contents_resolves_to_none() {
    let envelope = Envelope::new(Header::default());
    assert_eq!(load_message(&envelope).unwrap(), None);
}
