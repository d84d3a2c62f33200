use super::*;
use serial_test::serial;

fn clear_env() {
    for var in [
        "DATABASE_URL",
        "GOBW_AMQP_URL",
        "GOBW_WORKFLOW_EXCHANGE",
        "GOBW_LOG_NAME",
        "GOBW_RECONNECT_INTERVAL",
        "GOBW_HEARTBEAT_INTERVAL",
        "GOBW_ZOMBIE_THRESHOLD",
        "GOBW_OFFLINE_CONTENTS_DIR",
    ] {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn missing_database_url_errors() {
    clear_env();
    std::env::set_var("GOBW_AMQP_URL", "amqp://localhost");
    let err = Config::from_env().unwrap_err();
    assert!(err.to_string().contains("DATABASE_URL"));
    clear_env();
}

#[test]
#[serial]
fn defaults_fill_in_unset_knobs() {
    clear_env();
    std::env::set_var("DATABASE_URL", "postgres://localhost/gobw");
    std::env::set_var("GOBW_AMQP_URL", "amqp://localhost");
    let config = Config::from_env().unwrap();
    assert_eq!(config.workflow_exchange, "workflow");
    assert_eq!(config.reconnect_interval, std::time::Duration::from_secs(60));
    clear_env();
}
