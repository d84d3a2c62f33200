use super::*;
use chrono::TimeZone;

fn header_with_catalogue() -> Header {
    Header {
        catalogue: Some("meetbouten".into()),
        collection: Some("peilmerken".into()),
        ..Default::default()
    }
}

#[test]
fn compose_name_joins_type_and_header_parts() {
    let header = header_with_catalogue();
    let name = Job::compose_name("import", &header);
    assert_eq!(name, "import.meetbouten.peilmerken");
}

#[test]
fn compose_name_skips_workflow_key() {
    let mut header = header_with_catalogue();
    header.workflow = Some(vec![]);
    let name = Job::compose_name("import", &header);
    assert_eq!(name, "import.meetbouten.peilmerken");
}

#[test]
fn compose_process_id_uses_header_value_when_present() {
    let mut header = Header::default();
    header.process_id = Some("custom-pid".into());
    let pid = Job::compose_process_id("import.c", &header, 12345);
    assert_eq!(pid, "custom-pid");
}

#[test]
fn compose_process_id_falls_back_to_epoch_dot_name() {
    let header = Header::default();
    let pid = Job::compose_process_id("import.c", &header, 12345);
    assert_eq!(pid, "12345.import.c");
}

#[test]
fn new_job_starts_in_started_status_with_no_end() {
    let header = header_with_catalogue();
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let job = Job::new(
        JobId::new("j1"),
        "import".into(),
        "import.meetbouten.peilmerken".into(),
        "j1".into(),
        &header,
        now,
    );
    assert_eq!(job.status, JobStatus::Started);
    assert!(job.end.is_none());
    assert_eq!(job.start, now);
}

#[test]
fn zombie_detection_requires_started_status() {
    let header = Header::default();
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 1, 0, 0).unwrap();
    let mut job = Job::new(JobId::new("j1"), "import".into(), "import".into(), "j1".into(), &header, now);
    job.status = JobStatus::Ended;
    assert!(!job.is_zombie(None, now, chrono::Duration::minutes(1)));
}

#[test]
fn zombie_detection_true_when_no_heartbeat_ever_seen() {
    let header = Header::default();
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 1, 0, 0).unwrap();
    let job = Job::new(JobId::new("j1"), "import".into(), "import".into(), "j1".into(), &header, now);
    assert!(job.is_zombie(None, now, chrono::Duration::minutes(1)));
}

#[test]
fn zombie_detection_true_when_heartbeat_stale() {
    let header = Header::default();
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let job = Job::new(JobId::new("j1"), "import".into(), "import".into(), "j1".into(), &header, start);
    let heartbeat = start;
    let now = start + chrono::Duration::minutes(10);
    assert!(job.is_zombie(Some(heartbeat), now, chrono::Duration::minutes(2)));
}

#[test]
fn zombie_detection_false_when_heartbeat_recent() {
    let header = Header::default();
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let job = Job::new(JobId::new("j1"), "import".into(), "import".into(), "j1".into(), &header, start);
    let heartbeat = start + chrono::Duration::seconds(30);
    let now = start + chrono::Duration::minutes(1);
    assert!(!job.is_zombie(Some(heartbeat), now, chrono::Duration::minutes(2)));
}

#[test]
fn accumulate_log_counts_sums_across_calls() {
    let header = Header::default();
    let now = Utc::now();
    let mut job = Job::new(JobId::new("j1"), "import".into(), "import".into(), "j1".into(), &header, now);
    let mut counts = HashMap::new();
    counts.insert("warning".to_string(), 3u64);
    job.accumulate_log_counts(&counts);
    job.accumulate_log_counts(&counts);
    assert_eq!(job.log_counts.get("warning"), Some(&6));
}
