//! Typed structs for the evaluator response JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Index into [`EvaluationResponse::event_ids`].
pub type EventIndex = usize;
/// Index into [`EvaluationResponse::object_ids`].
pub type ObjectIndex = usize;

/// One assignment of in-scope variables to concrete events and objects.
///
/// Keys are variable indices; values index the shared id tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    #[serde(default)]
    pub event_map: BTreeMap<u32, EventIndex>,
    #[serde(default)]
    pub object_map: BTreeMap<u32, ObjectIndex>,
}

impl Binding {
    pub fn is_empty(&self) -> bool {
        self.event_map.is_empty() && self.object_map.is_empty()
    }
}

/// Why a situation violated its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationReason {
    TooFewMatchingEvents(usize),
    TooManyMatchingEvents(usize),
    NoChildrenOfORSatisfied,
    LeftChildOfANDUnsatisfied,
    RightChildOfANDUnsatisfied,
    BothChildrenOfANDUnsatisfied,
    ChildrenOfNOTSatisfied,
    ChildNotSatisfied,
    ConstraintNotSatisfied(usize),
    UnknownChildSet,
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationReason::TooFewMatchingEvents(n) => {
                write!(f, "too few matching events ({})", n)
            }
            ViolationReason::TooManyMatchingEvents(n) => {
                write!(f, "too many matching events ({})", n)
            }
            ViolationReason::NoChildrenOfORSatisfied => write!(f, "no child of OR satisfied"),
            ViolationReason::LeftChildOfANDUnsatisfied => {
                write!(f, "left child of AND unsatisfied")
            }
            ViolationReason::RightChildOfANDUnsatisfied => {
                write!(f, "right child of AND unsatisfied")
            }
            ViolationReason::BothChildrenOfANDUnsatisfied => {
                write!(f, "both children of AND unsatisfied")
            }
            ViolationReason::ChildrenOfNOTSatisfied => write!(f, "child of NOT satisfied"),
            ViolationReason::ChildNotSatisfied => write!(f, "child not satisfied"),
            ViolationReason::ConstraintNotSatisfied(i) => {
                write!(f, "constraint {} not satisfied", i)
            }
            ViolationReason::UnknownChildSet => write!(f, "unknown child set"),
        }
    }
}

/// A binding and, if it violated the node, the reason.
pub type Situation = (Binding, Option<ViolationReason>);

/// Evaluation outcome for one plan entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeEvaluationResult {
    pub situation_count: usize,
    pub situation_violated_count: usize,
    #[serde(default)]
    pub situations: Vec<Situation>,
}

impl NodeEvaluationResult {
    pub fn violations(&self) -> impl Iterator<Item = (&Binding, ViolationReason)> {
        self.situations
            .iter()
            .filter_map(|(binding, reason)| reason.map(|r| (binding, r)))
    }
}

/// Everything one evaluator call returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    pub evaluation_results: Vec<NodeEvaluationResult>,
    #[serde(default)]
    pub event_ids: Vec<String>,
    #[serde(default)]
    pub object_ids: Vec<String>,
}

impl EvaluationResponse {
    pub fn len(&self) -> usize {
        self.evaluation_results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluation_results.is_empty()
    }

    pub fn event_id(&self, index: EventIndex) -> Option<&str> {
        self.event_ids.get(index).map(String::as_str)
    }

    pub fn object_id(&self, index: ObjectIndex) -> Option<&str> {
        self.object_ids.get(index).map(String::as_str)
    }
}
