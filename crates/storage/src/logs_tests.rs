use super::*;
use chrono::Utc;

async fn test_gateway() -> StorageGateway {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for this test");
    StorageGateway::connect(&url, true).await.unwrap()
}

#[tokio::test]
#[ignore] // Requires database
async fn log_save_on_missing_job_does_not_error() {
    let gateway = test_gateway().await;
    let log = Log {
        timestamp: Utc::now(),
        jobid: Some("does-not-exist".into()),
        level: LogLevel::Error,
        name: "importer".into(),
        msg: "boom".into(),
    };
    log_save(&gateway, &log).await.unwrap();
}

#[test]
fn parse_level_round_trips_display() {
    for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Warning, LogLevel::Error] {
        assert_eq!(parse_level(&level.to_string()), Some(level));
    }
}
