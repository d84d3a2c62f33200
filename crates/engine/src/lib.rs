// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gobw-engine: job/step lifecycle (C4), the workflow engine (C5), and the
//! task queue (C6) — spec.md §4.4, §4.5, §4.6.

pub mod context;
pub mod error;
pub mod hooks;
pub mod lifecycle;
pub mod progress;
pub mod task_queue;
pub mod workflow_engine;

pub use context::EngineContext;
pub use error::EngineError;
pub use hooks::{check_result_hook, NoopHooks, WorkflowHooks};
pub use lifecycle::{job_end, job_start, step_start, step_status, ZOMBIE_THRESHOLD};
pub use progress::{on_workflow_progress, ProgressMessage, ProgressStatus};
pub use task_queue::{on_start_tasks, on_task_result};
pub use workflow_engine::{start_workflow, Workflow, END_OF_WORKFLOW};
