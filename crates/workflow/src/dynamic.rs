// SPDX-License-Identifier: MIT

//! Dynamic workflows (spec.md §4.3): a tree synthesized at start-time from a
//! `header.workflow` list instead of looked up from the static registry.

use crate::condition::Condition;
use crate::step_action::StepAction;
use crate::tree::{build_tree, Node};
use crate::{WorkflowError, WorkflowRegistry};
use gobw_core::DynamicStepSpec;

/// `WORKFLOW_EXCHANGE`, the single topic exchange every step request and
/// result travels over (spec.md §4.7).
pub const WORKFLOW_EXCHANGE: &str = "workflow";

/// Builds a tree out of a dynamic step list: each entry is built or
/// synthesized, suffixed with its index to dodge name collisions when the
/// same workflow or step appears twice, and grafted onto every current leaf.
pub fn build_dynamic_tree(
    registry: &WorkflowRegistry,
    specs: &[DynamicStepSpec],
) -> Result<Option<Node>, WorkflowError> {
    let mut accumulator: Option<Node> = None;

    for (index, spec) in specs.iter().enumerate() {
        let mut subtree = match spec {
            DynamicStepSpec::Workflow { workflow, header } => {
                let mut node = build_tree(registry, workflow)?;
                apply_header(&mut node, header);
                node
            }
            DynamicStepSpec::WorkflowStep { step_name, header } => {
                let mut node = Node::leaf(step_name.clone());
                node.action = StepAction::Publish {
                    exchange: WORKFLOW_EXCHANGE.to_string(),
                    key: format!("{step_name}.request"),
                };
                apply_header(&mut node, header);
                node
            }
        };
        subtree.append_to_names(&index.to_string());

        accumulator = Some(match accumulator {
            None => subtree,
            Some(mut root) => {
                for leaf in root.get_leafs_mut() {
                    leaf.append_node(subtree.clone(), Condition::default());
                }
                root
            }
        });
    }

    Ok(accumulator)
}

fn apply_header(node: &mut Node, header: &std::collections::HashMap<String, serde_json::Value>) {
    node.header_parameters
        .extend(header.iter().map(|(k, v)| (k.clone(), v.clone())));
}

#[cfg(test)]
#[path = "dynamic_tests.rs"]
mod tests;
