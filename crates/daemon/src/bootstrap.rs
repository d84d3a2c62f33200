// SPDX-License-Identifier: MIT

//! Wires a [`Config`] into a running [`EngineContext`]: connects storage and
//! the bus, registers the built-in workflows, and binds the process clock
//! and id generator (spec.md §9 "mutable module-level session/engine ...
//! becomes an owned connection handle in an orchestrator value").

use crate::config::Config;
use gobw_bus::LapinBus;
use gobw_engine::EngineContext;
use gobw_storage::StorageGateway;
use gobw_workflow::{register_builtins, PredicateRegistry, WorkflowRegistry};
use std::sync::Arc;

pub async fn bootstrap(config: &Config) -> anyhow::Result<EngineContext> {
    let gateway = StorageGateway::connect(&config.database_url, false).await?;
    let bus = LapinBus::connect(&config.amqp_url, &config.workflow_exchange).await?;

    let mut registry = WorkflowRegistry::new();
    register_builtins(&mut registry)?;

    let mut ctx = EngineContext::new(
        gateway,
        Arc::new(bus) as Arc<dyn gobw_bus::MessageBus>,
        Arc::new(registry),
        Arc::new(PredicateRegistry::new()),
    );
    ctx.zombie_threshold = chrono::Duration::from_std(config.zombie_threshold)
        .unwrap_or(gobw_engine::ZOMBIE_THRESHOLD);
    ctx.heartbeat_interval = chrono::Duration::from_std(config.heartbeat_interval)
        .unwrap_or(gobw_monitor::HEARTBEAT_INTERVAL);
    Ok(ctx)
}
