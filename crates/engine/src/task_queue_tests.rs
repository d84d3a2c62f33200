use super::*;
use crate::context::EngineContext;
use crate::lifecycle::{job_start, step_start};
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
        id_gen: Arc::new(gobw_core::SequentialIdGen::new("tq")),
        registry: Arc::new(WorkflowRegistry::new()),
        predicates: Arc::new(PredicateRegistry::new()),
        hooks: Arc::new(crate::hooks::NoopHooks),
        allow_parallel_zombie: true,
        zombie_threshold: crate::lifecycle::ZOMBIE_THRESHOLD,
        heartbeat_interval: gobw_monitor::HEARTBEAT_INTERVAL,
    }
}

fn batch_contents() -> serde_json::Value {
    serde_json::json!({
        "tasks": [
            {"task_name": "A", "dependencies": []},
            {"task_name": "B", "dependencies": ["A"]},
            {"task_name": "C", "dependencies": ["A", "B"]},
        ],
        "key_prefix": "p",
        "extra_msg": {},
    })
}

async fn started_step(ctx: &EngineContext) -> (gobw_core::JobId, gobw_core::StepId, Envelope) {
    let mut envelope = Envelope::new(Header::default());
    let job = job_start(ctx, "prepare", &mut envelope).await.unwrap();
    let step = step_start(ctx, "prepare", &mut envelope).await.unwrap();
    envelope.contents = Some(gobw_core::Contents::inline(batch_contents()));
    (job.id, step.id, envelope)
}

#[tokio::test]
#[ignore] // Requires database
async fn on_start_tasks_queues_only_the_free_task() {
    let bus = Arc::new(FakeMessageBus::new());
    let ctx = test_context(bus.clone()).await;
    let (_, stepid, envelope) = started_step(&ctx).await;

    on_start_tasks(&ctx, &envelope).await.unwrap();

    let tasks = gobw_storage::tasks_for_step(&ctx.gateway, &stepid).await.unwrap();
    let queued: Vec<_> = tasks.iter().filter(|t| t.status == TaskStatus::Queued).collect();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].name, "A");

    let published = bus.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].1, "p.task.request");
}

#[tokio::test]
#[ignore] // Requires database
async fn rejects_duplicate_task_names() {
    let bus = Arc::new(FakeMessageBus::new());
    let ctx = test_context(bus).await;
    let (_, _, mut envelope) = started_step(&ctx).await;
    envelope.contents = Some(gobw_core::Contents::inline(serde_json::json!({
        "tasks": [
            {"task_name": "A", "dependencies": []},
            {"task_name": "A", "dependencies": []},
        ],
        "key_prefix": "p",
        "extra_msg": {},
    })));

    let err = on_start_tasks(&ctx, &envelope).await.unwrap_err();
    assert!(matches!(err, EngineError::DuplicateTaskName(_)));
}

#[tokio::test]
#[ignore] // Requires database
async fn task_failure_aborts_remaining_group() {
    let bus = Arc::new(FakeMessageBus::new());
    let ctx = test_context(bus.clone()).await;
    let (_, stepid, envelope) = started_step(&ctx).await;
    on_start_tasks(&ctx, &envelope).await.unwrap();

    let tasks = gobw_storage::tasks_for_step(&ctx.gateway, &stepid).await.unwrap();
    let task_a = tasks.iter().find(|t| t.name == "A").unwrap();

    let mut result_header = Header::default();
    result_header.extra.insert("taskid".to_string(), serde_json::Value::String(task_a.id.to_string()));
    let mut result = Envelope::new(result_header);
    result.summary = Some(gobw_core::Summary {
        warnings: vec![],
        errors: vec!["boom".to_string()],
        log_counts: None,
    });

    on_task_result(&ctx, &result).await.unwrap();

    let tasks = gobw_storage::tasks_for_step(&ctx.gateway, &stepid).await.unwrap();
    let b = tasks.iter().find(|t| t.name == "B").unwrap();
    let c = tasks.iter().find(|t| t.name == "C").unwrap();
    assert_eq!(b.status, TaskStatus::Aborted);
    assert_eq!(c.status, TaskStatus::Aborted);

    let published = bus.published();
    assert!(published.iter().any(|(_, key, _)| key == "p.task.complete"));
}
