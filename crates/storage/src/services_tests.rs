use super::*;
use gobw_core::SequentialIdGen;

async fn test_gateway() -> StorageGateway {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for this test");
    StorageGateway::connect(&url, true).await.unwrap()
}

fn sample_service(id: &str, host: &str) -> Service {
    Service {
        id: ServiceId::new(id),
        name: "importer".into(),
        host: Some(host.into()),
        pid: 42,
        is_alive: true,
        timestamp: Utc::now(),
    }
}

#[tokio::test]
#[ignore] // Requires database
async fn service_update_upserts_by_host_and_name() {
    let gateway = test_gateway().await;
    let service = sample_service("svc-1", "worker-1");
    let id = service_update(&gateway, &service).await.unwrap();

    let again = sample_service("svc-1", "worker-1");
    let id2 = service_update(&gateway, &again).await.unwrap();
    assert_eq!(id, id2);
}

#[tokio::test]
#[ignore] // Requires database
async fn reconcile_detaches_missing_threads() {
    let gateway = test_gateway().await;
    let service = sample_service("svc-2", "worker-2");
    service_update(&gateway, &service).await.unwrap();

    let id_gen = SequentialIdGen::new("svct");
    reconcile_service_tasks(
        &gateway,
        &service.id,
        &[("importer-main".to_string(), true)],
        &id_gen,
    )
    .await
    .unwrap();

    reconcile_service_tasks(&gateway, &service.id, &[], &id_gen)
        .await
        .unwrap();
}
