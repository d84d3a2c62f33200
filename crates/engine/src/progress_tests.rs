use super::*;
use crate::lifecycle::{job_start, step_start};
use gobw_bus::FakeMessageBus;
use gobw_core::{Envelope, Header, SystemClock};
use gobw_workflow::{PredicateRegistry, WorkflowRegistry};
use std::sync::Arc;

async fn test_context(bus: Arc<FakeMessageBus>) -> EngineContext {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for this test");
    let gateway = gobw_storage::StorageGateway::connect(&url, true).await.unwrap();
    EngineContext {
        gateway,
        bus,
        clock: Arc::new(SystemClock),
        id_gen: Arc::new(gobw_core::SequentialIdGen::new("pr")),
        registry: Arc::new(WorkflowRegistry::new()),
        predicates: Arc::new(PredicateRegistry::new()),
        hooks: Arc::new(crate::hooks::NoopHooks),
        allow_parallel_zombie: true,
        zombie_threshold: crate::lifecycle::ZOMBIE_THRESHOLD,
        heartbeat_interval: gobw_monitor::HEARTBEAT_INTERVAL,
    }
}

#[tokio::test]
#[ignore] // Requires database
async fn ok_status_closes_step_and_logs_duration() {
    let ctx = test_context(Arc::new(FakeMessageBus::new())).await;
    let mut envelope = Envelope::new(Header::default());
    job_start(&ctx, "prepare", &mut envelope).await.unwrap();
    let step = step_start(&ctx, "prepare", &mut envelope).await.unwrap();

    let progress = ProgressMessage {
        jobid: envelope.header.jobid.clone().unwrap(),
        stepid: step.id.to_string(),
        status: ProgressStatus::Started,
        info_msg: None,
    };
    on_workflow_progress(&ctx, &progress).await.unwrap();

    let progress = ProgressMessage {
        status: ProgressStatus::Ok,
        ..progress
    };
    on_workflow_progress(&ctx, &progress).await.unwrap();

    let reloaded = gobw_storage::step_get(&ctx.gateway, &step.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, StepStatus::Ok);
    assert!(reloaded.end.is_some());
}

#[tokio::test]
#[ignore] // Requires database
async fn end_status_does_not_touch_step_state() {
    let ctx = test_context(Arc::new(FakeMessageBus::new())).await;
    let mut envelope = Envelope::new(Header::default());
    job_start(&ctx, "prepare", &mut envelope).await.unwrap();
    let step = step_start(&ctx, "prepare", &mut envelope).await.unwrap();

    let progress = ProgressMessage {
        jobid: envelope.header.jobid.clone().unwrap(),
        stepid: step.id.to_string(),
        status: ProgressStatus::End,
        info_msg: None,
    };
    on_workflow_progress(&ctx, &progress).await.unwrap();

    let reloaded = gobw_storage::step_get(&ctx.gateway, &step.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, StepStatus::Scheduled);
}
