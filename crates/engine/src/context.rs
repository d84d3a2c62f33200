// SPDX-License-Identifier: MIT

//! The owned set of collaborators every engine operation is handed
//! explicitly (spec.md §9 "mutable module-level session/engine ... becomes
//! an owned connection handle in an orchestrator value").

use crate::hooks::{NoopHooks, WorkflowHooks};
use crate::lifecycle::ZOMBIE_THRESHOLD;
use gobw_bus::MessageBus;
use gobw_core::{Clock, IdGen, SequentialIdGen, SystemClock, UuidIdGen};
use gobw_storage::StorageGateway;
use gobw_workflow::{PredicateRegistry, WorkflowRegistry};
use std::sync::Arc;

/// Collaborators shared by every lifecycle/workflow-engine/task-queue
/// operation. Cheap to clone: everything it owns is already an `Arc` or a
/// pool handle.
#[derive(Clone)]
pub struct EngineContext {
    pub gateway: StorageGateway,
    pub bus: Arc<dyn MessageBus>,
    pub clock: Arc<dyn Clock>,
    pub id_gen: Arc<dyn IdGen>,
    pub registry: Arc<WorkflowRegistry>,
    pub predicates: Arc<PredicateRegistry>,
    pub hooks: Arc<dyn WorkflowHooks>,
    /// Whether a running job found by `job_runs` is still treated as a
    /// duplicate when it looks like a zombie (spec.md §4.5 step 2).
    pub allow_parallel_zombie: bool,
    /// Duplicate-job zombie threshold (spec.md §9 open question, exposed as
    /// a config override rather than a fixed constant). Defaults to
    /// [`ZOMBIE_THRESHOLD`].
    pub zombie_threshold: chrono::Duration,
    /// Heartbeat cadence passed through to `gobw_monitor::ingest_heartbeat`'s
    /// dead/removed sweep (spec.md §4.2, §6 "Configuration"). Defaults to
    /// [`gobw_monitor::HEARTBEAT_INTERVAL`].
    pub heartbeat_interval: chrono::Duration,
}

impl EngineContext {
    pub fn new(
        gateway: StorageGateway,
        bus: Arc<dyn MessageBus>,
        registry: Arc<WorkflowRegistry>,
        predicates: Arc<PredicateRegistry>,
    ) -> Self {
        Self {
            gateway,
            bus,
            clock: Arc::new(SystemClock),
            id_gen: Arc::new(UuidIdGen),
            registry,
            predicates,
            hooks: Arc::new(NoopHooks),
            allow_parallel_zombie: true,
            zombie_threshold: ZOMBIE_THRESHOLD,
            heartbeat_interval: gobw_monitor::HEARTBEAT_INTERVAL,
        }
    }

    /// Builds a context wired for deterministic tests: sequential IDs, a
    /// caller-supplied clock, and no hooks beyond the logging default.
    pub fn for_tests(
        gateway: StorageGateway,
        bus: Arc<dyn MessageBus>,
        clock: Arc<dyn Clock>,
        registry: Arc<WorkflowRegistry>,
        predicates: Arc<PredicateRegistry>,
    ) -> Self {
        Self {
            gateway,
            bus,
            clock,
            id_gen: Arc::new(SequentialIdGen::new("e2e")),
            registry,
            predicates,
            hooks: Arc::new(NoopHooks),
            allow_parallel_zombie: true,
            zombie_threshold: ZOMBIE_THRESHOLD,
            heartbeat_interval: gobw_monitor::HEARTBEAT_INTERVAL,
        }
    }
}
