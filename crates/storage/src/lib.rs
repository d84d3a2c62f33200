// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gobw-storage: the Postgres-backed storage gateway (spec.md §4.1).

pub mod error;
pub mod gateway;
pub mod jobs;
pub mod logs;
pub mod services;
pub mod steps;
pub mod tasks;

pub use error::StorageError;
pub use gateway::{StorageGateway, RECONNECT_INTERVAL};
pub use jobs::{job_get, job_runs, job_save, job_update};
pub use logs::{audit_log_save, log_save};
pub use services::{mark_service_dead, reconcile_service_tasks, remove_service, service_update, services_all};
pub use steps::{step_get, step_save, step_status, step_update};
pub use tasks::{completed_task_names, merge_envelope_summary, task_get, task_lock, task_save, task_unlock, task_update, tasks_for_step};
