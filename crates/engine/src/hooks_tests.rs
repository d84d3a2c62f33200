use super::*;
use gobw_bus::FakeMessageBus;
use gobw_core::{Header, SystemClock};
use gobw_workflow::{PredicateRegistry, WorkflowRegistry};
use std::sync::Arc;

async fn test_context(bus: Arc<FakeMessageBus>) -> EngineContext {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for this test");
    let gateway = gobw_storage::StorageGateway::connect(&url, true).await.unwrap();
    EngineContext {
        gateway,
        bus,
        clock: Arc::new(SystemClock),
        id_gen: Arc::new(gobw_core::SequentialIdGen::new("hk")),
        registry: Arc::new(WorkflowRegistry::new()),
        predicates: Arc::new(PredicateRegistry::new()),
        hooks: Arc::new(NoopHooks),
        allow_parallel_zombie: true,
        zombie_threshold: crate::lifecycle::ZOMBIE_THRESHOLD,
        heartbeat_interval: gobw_monitor::HEARTBEAT_INTERVAL,
    }
}

#[tokio::test]
#[ignore] // Requires database
async fn result_key_short_circuits_and_republishes() {
    let bus = Arc::new(FakeMessageBus::new());
    let ctx = test_context(bus.clone()).await;
    let mut header = Header::default();
    header.result_key = Some("hooked.result".to_string());
    let envelope = Envelope::new(header);

    let skipped = check_result_hook(&ctx, &envelope).await.unwrap();

    assert!(skipped);
    let published = bus.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].1, "hooked.result");
}

#[tokio::test]
#[ignore] // Requires database
async fn no_result_key_does_not_publish() {
    let bus = Arc::new(FakeMessageBus::new());
    let ctx = test_context(bus.clone()).await;
    let envelope = Envelope::new(Header::default());

    let skipped = check_result_hook(&ctx, &envelope).await.unwrap();

    assert!(!skipped);
    assert!(bus.published().is_empty());
}
