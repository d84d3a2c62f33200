// SPDX-License-Identifier: MIT

//! Guards that decide whether a `next` edge is eligible once a step ends.
//!
//! The original config passes a bare Python callable as `condition`. Per the
//! redesign notes these become a closed enum the engine evaluates directly
//! instead of invoking arbitrary code.

use gobw_core::Envelope;
use serde::{Deserialize, Serialize};

/// Returns true iff `envelope.summary.errors` is absent or empty.
pub fn has_no_errors(envelope: &Envelope) -> bool {
    envelope.has_no_errors()
}

/// A guard evaluated against the envelope a step just produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Always eligible, regardless of the envelope's contents.
    AlwaysTrue,
    /// Eligible iff the step ended without errors. The default condition.
    #[default]
    NoErrors,
    /// Eligible iff the named predicate, registered by the caller, returns true.
    Predicate { name: String },
}

impl Condition {
    /// Evaluates this condition against `envelope`. `Predicate` is resolved
    /// through `predicates`, a lookup supplied by the caller since the
    /// engine has no access to arbitrary code at tree-build time.
    pub fn evaluate(&self, envelope: &Envelope, predicates: &PredicateRegistry) -> bool {
        match self {
            Condition::AlwaysTrue => true,
            Condition::NoErrors => has_no_errors(envelope),
            Condition::Predicate { name } => predicates.eval(name, envelope),
        }
    }
}

/// Maps predicate names to the closures that implement them.
///
/// Unknown predicate names evaluate to `false` rather than panicking: a
/// dangling predicate reference is a workflow authoring mistake, not
/// grounds for taking the process down mid-dispatch.
#[derive(Default)]
pub struct PredicateRegistry {
    predicates: std::collections::HashMap<String, Box<dyn Fn(&Envelope) -> bool + Send + Sync>>,
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        predicate: impl Fn(&Envelope) -> bool + Send + Sync + 'static,
    ) {
        self.predicates.insert(name.into(), Box::new(predicate));
    }

    fn eval(&self, name: &str, envelope: &Envelope) -> bool {
        self.predicates
            .get(name)
            .map(|f| f(envelope))
            .unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "condition_tests.rs"]
mod tests;
