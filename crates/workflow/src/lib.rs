// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gobw-workflow: the workflow tree, its registry, and the dynamic builder.

pub mod builtins;
pub mod condition;
pub mod dynamic;
pub mod error;
pub mod registry;
pub mod step_action;
pub mod tree;

pub use builtins::register_builtins;
pub use condition::{Condition, PredicateRegistry};
pub use dynamic::{build_dynamic_tree, WORKFLOW_EXCHANGE};
pub use error::WorkflowError;
pub use registry::{NextDef, StepDef, WorkflowDef, WorkflowRegistry};
pub use step_action::StepAction;
pub use tree::{build_tree, Edge, Node};
