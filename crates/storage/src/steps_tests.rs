use super::*;

async fn test_gateway() -> StorageGateway {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for this test");
    StorageGateway::connect(&url, true).await.unwrap()
}

#[tokio::test]
#[ignore] // Requires database
async fn step_status_stamps_start_and_end() {
    let gateway = test_gateway().await;
    let step = JobStep::new_scheduled(StepId::new("step-1"), JobId::new("job-1"), "read".into());
    step_save(&gateway, &step).await.unwrap();

    let now = Utc::now();
    let started = step_status(&gateway, &step.id, StepStatus::Started, now).await.unwrap();
    assert_eq!(started.start, Some(now));

    let ended = step_status(&gateway, &step.id, StepStatus::Ok, now).await.unwrap();
    assert_eq!(ended.end, Some(now));
}
