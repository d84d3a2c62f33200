// SPDX-License-Identifier: MIT

//! Workflow trees (spec.md §4.3): the static graph a job walks step by step.

use crate::condition::Condition;
use crate::step_action::StepAction;
use crate::{WorkflowDef, WorkflowError, WorkflowRegistry};
use std::collections::HashMap;

/// One step in a built tree. Unlike the config it was built from, a `Node`
/// has no string indirection left: every reference has already been
/// dereferenced or grafted.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub action: StepAction,
    pub header_parameters: HashMap<String, serde_json::Value>,
    pub next: Vec<Edge>,
}

/// An outgoing edge: the condition that must hold for `node` to run next.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub condition: Condition,
    pub node: Node,
}

impl Node {
    pub(crate) fn leaf(name: impl Into<String>) -> Self {
        Node {
            name: name.into(),
            action: StepAction::default(),
            header_parameters: HashMap::new(),
            next: Vec::new(),
        }
    }

    /// Depth-first lookup by name.
    pub fn get_node(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.next.iter().find_map(|e| e.node.get_node(name))
    }

    /// Depth-first mutable lookup, used when splicing dynamic subtrees onto leafs.
    pub fn get_node_mut(&mut self, name: &str) -> Option<&mut Node> {
        if self.name == name {
            return Some(self);
        }
        self.next.iter_mut().find_map(|e| e.node.get_node_mut(name))
    }

    /// All terminal nodes (no outgoing edges), in tree order.
    pub fn get_leafs(&self) -> Vec<&Node> {
        if self.next.is_empty() {
            return vec![self];
        }
        self.next.iter().flat_map(|e| e.node.get_leafs()).collect()
    }

    /// Mutable terminal-node references, for attaching subtrees.
    pub fn get_leafs_mut(&mut self) -> Vec<&mut Node> {
        if self.next.is_empty() {
            return vec![self];
        }
        self.next
            .iter_mut()
            .flat_map(|e| e.node.get_leafs_mut())
            .collect()
    }

    /// Appends `node` as a new outgoing edge guarded by `condition`.
    pub fn append_node(&mut self, node: Node, condition: Condition) {
        self.next.push(Edge { condition, node });
    }

    /// Renames every node in this subtree by appending `_{suffix}`. Used to
    /// avoid name collisions when the same workflow is grafted in twice.
    pub fn append_to_names(&mut self, suffix: &str) {
        self.name = format!("{}_{}", self.name, suffix);
        for edge in &mut self.next {
            edge.node.append_to_names(suffix);
        }
    }
}

/// Builds the tree for `workflow_name` out of `registry`, starting at the
/// workflow's declared `start` step.
pub fn build_tree(registry: &WorkflowRegistry, workflow_name: &str) -> Result<Node, WorkflowError> {
    let def = registry
        .get(workflow_name)
        .ok_or_else(|| WorkflowError::UnknownWorkflow(workflow_name.to_string()))?;
    build_node(registry, def, &def.start)
}

fn build_node(registry: &WorkflowRegistry, def: &WorkflowDef, step_name: &str) -> Result<Node, WorkflowError> {
    let step = def.steps.get(step_name).ok_or_else(|| {
        WorkflowError::UnknownStep {
            workflow: def.name.clone(),
            step: step_name.to_string(),
        }
    })?;

    match step {
        crate::registry::StepDef::Alias(target) => build_node(registry, def, target),
        crate::registry::StepDef::Step {
            action,
            next,
            header_parameters,
        } => {
            let mut edges = Vec::with_capacity(next.len());
            for n in next {
                let node = if let Some(foreign) = &n.workflow {
                    build_tree(registry, foreign)?
                } else if let Some(step) = &n.step {
                    build_node(registry, def, step)?
                } else {
                    return Err(WorkflowError::MalformedNext(step_name.to_string()));
                };
                edges.push(Edge {
                    condition: n.condition.clone(),
                    node,
                });
            }
            Ok(Node {
                name: step_name.to_string(),
                action: action.clone(),
                header_parameters: header_parameters.clone(),
                next: edges,
            })
        }
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
