// SPDX-License-Identifier: MIT

//! What a step does when the engine enters it.
//!
//! The original config expresses this as a Python lambda
//! (`lambda msg: publish(exchange, key, msg)`). Per the redesign notes this
//! becomes a closed, serializable variant the engine interprets directly.

use serde::{Deserialize, Serialize};

/// The action a tree node performs when the engine's `_function(step)`
/// wrapper invokes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepAction {
    /// Publish the (augmented) message to `exchange` under `key`.
    Publish { exchange: String, key: String },
    /// Immediately continue into another named step without a bus round trip.
    Start { sub_step: String },
    /// Do nothing. The default for a step with no declared function.
    #[default]
    Noop,
}
