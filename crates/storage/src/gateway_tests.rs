use super::*;
use std::time::Duration;

fn test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

#[tokio::test]
#[ignore] // Requires database
async fn connect_migrates_and_runs_select_one() {
    let url = test_database_url().expect("DATABASE_URL must be set for this test");
    let gateway = StorageGateway::connect(&url, false).await.unwrap();
    assert!(gateway.is_connected().await);
}

#[tokio::test]
#[ignore] // Requires database
async fn force_migrate_does_not_block_on_contention() {
    let url = test_database_url().expect("DATABASE_URL must be set for this test");
    let gateway = StorageGateway::connect(&url, true)
        .await
        .unwrap()
        .with_reconnect_interval(Duration::from_millis(50));
    assert!(gateway.is_connected().await);
}

#[tokio::test]
#[ignore] // Requires database
async fn with_reconnect_retries_transient_failures() {
    let url = test_database_url().expect("DATABASE_URL must be set for this test");
    let gateway = StorageGateway::connect(&url, false)
        .await
        .unwrap()
        .with_reconnect_interval(Duration::from_millis(10));

    let result: i32 = gateway
        .with_reconnect(|pool| async move {
            let (n,): (i32,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await?;
            Ok(n)
        })
        .await
        .unwrap();

    assert_eq!(result, 1);
}
