// SPDX-License-Identifier: MIT

//! The message envelope passed between bus handlers (spec.md §6).

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `on_workflow_complete`: where to publish the final message of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnWorkflowComplete {
    pub exchange: String,
    pub key: String,
}

/// One entry of a dynamic workflow specification (spec.md §4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DynamicStepSpec {
    /// Graft an entire named workflow.
    Workflow {
        workflow: String,
        #[serde(default)]
        header: HashMap<String, serde_json::Value>,
    },
    /// Synthesize a single step that publishes the named step request.
    WorkflowStep {
        step_name: String,
        #[serde(default)]
        header: HashMap<String, serde_json::Value>,
    },
}

/// `msg.header` — the envelope's routing and identity fields.
///
/// Header carries a fixed set of well-known fields (spec.md §6) plus a
/// free-form `extra` bag. Job-name composition (spec.md §4.4) iterates the
/// well-known fields in the declared order below, skipping `None`s — this is
/// a deliberate narrowing of the original's "iterate whatever keys are in
/// the dict" behavior, recorded in DESIGN.md.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stepid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalogue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Vec<DynamicStepSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_workflow_complete: Option<OnWorkflowComplete>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_key: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Header {
    /// The `{catalogue, collection, attribute, application}` tuple used to
    /// scope duplicate-job detection (spec.md §4.1).
    pub fn job_type_scope(&self) -> (Option<&str>, Option<&str>, Option<&str>, Option<&str>) {
        (
            self.catalogue.as_deref(),
            self.collection.as_deref(),
            self.attribute.as_deref(),
            self.application.as_deref(),
        )
    }

    /// The `{destination, entity_id, source}` argument set used as the
    /// duplicate-detection fingerprint (spec.md §4.1).
    pub fn fingerprint_args(&self) -> HashMap<String, String> {
        let mut args = HashMap::new();
        if let Some(v) = &self.destination {
            args.insert("destination".to_string(), v.clone());
        }
        if let Some(v) = &self.entity_id {
            args.insert("entity_id".to_string(), v.clone());
        }
        if let Some(v) = &self.source {
            args.insert("source".to_string(), v.clone());
        }
        args
    }

    /// Job-name parts in declared order, skipping unset fields and the
    /// `workflow` key (spec.md §4.4 step 1).
    pub fn name_parts(&self) -> Vec<String> {
        let mut parts = Vec::new();
        let known: [(&str, &Option<String>); 10] = [
            ("catalogue", &self.catalogue),
            ("collection", &self.collection),
            ("attribute", &self.attribute),
            ("application", &self.application),
            ("entity", &self.entity),
            ("source", &self.source),
            ("destination", &self.destination),
            ("entity_id", &self.entity_id),
            ("user", &self.user),
            ("process_id", &self.process_id),
        ];
        for (_, value) in known {
            if let Some(v) = value {
                parts.push(v.clone());
            }
        }
        for (_, v) in &self.extra {
            parts.push(v.to_string());
        }
        parts
    }
}

/// `msg.summary` — warnings/errors/log_counts accumulated by a step or task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_counts: Option<HashMap<String, u64>>,
}

impl Summary {
    /// `has_no_errors` (spec.md §4.3, R2): true iff `errors` is absent or empty.
    pub fn has_no_errors(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A reference to contents offloaded to a side file (spec.md §4.6 step 1,
/// §4.7 "offline-contents protocol").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineRef {
    pub offline_path: String,
}

/// `msg.contents` — either inline JSON or a reference to an offloaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Contents {
    Offline(OfflineRef),
    Inline(serde_json::Value),
}

impl Contents {
    pub fn inline(value: serde_json::Value) -> Self {
        Contents::Inline(value)
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, Contents::Offline(_))
    }
}

/// `msg.workflow` — present on `workflow.request` messages consumed by the
/// `start_workflow` handler (spec.md §4.7), distinct from `header.workflow`
/// (the dynamic-step list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRef {
    pub workflow_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_time: Option<u64>,
}

/// The full bus message envelope (spec.md §6).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub header: Header,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<Contents>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<WorkflowRef>,
}

impl Envelope {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            contents: None,
            summary: None,
            workflow: None,
        }
    }

    /// `msg.summary.errors` non-empty check, tolerant of a missing summary.
    pub fn has_no_errors(&self) -> bool {
        self.summary.as_ref().map(Summary::has_no_errors).unwrap_or(true)
    }

    pub fn summary_mut(&mut self) -> &mut Summary {
        self.summary.get_or_insert_with(Summary::default)
    }

    /// Reject a malformed `on_workflow_complete` with a typed error rather
    /// than silently guessing (spec.md §7 "Unknown on_workflow_complete").
    pub fn on_workflow_complete(&self) -> Result<Option<&OnWorkflowComplete>, CoreError> {
        match &self.header.on_workflow_complete {
            None => Ok(None),
            Some(owc) if owc.exchange.is_empty() || owc.key.is_empty() => Err(
                CoreError::MalformedWorkflowComplete(format!("{:?}", owc)),
            ),
            Some(owc) => Ok(Some(owc)),
        }
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
