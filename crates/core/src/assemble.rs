//! Constraint assembly: authored node and edge data to the finite,
//! transmission-ready payload of a [`TreeNode`].
//!
//! The evaluator works on finite integers, so every unbounded bound is
//! written as the largest (or smallest) integer a double can represent
//! exactly. [`Limit::from_wire`] maps those sentinels back to ∞.

use crate::model::{
    ConstraintType, CountRange, EdgeConstraint, Filter, GateKind, Limit, Node, NodeKind,
    Occurrence, TimeWindow,
};
use crate::scope::ResolvedVariables;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel for +∞ (`Number.MAX_SAFE_INTEGER`).
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;
/// Sentinel for -∞ (`Number.MIN_SAFE_INTEGER`).
pub const MIN_SAFE_INTEGER: i64 = -9_007_199_254_740_991;

impl Limit {
    pub fn to_wire(self) -> i64 {
        match self {
            Limit::NegInfinity => MIN_SAFE_INTEGER,
            Limit::Finite(n) => n,
            Limit::PosInfinity => MAX_SAFE_INTEGER,
        }
    }

    /// Anything at or beyond a sentinel reads as unbounded.
    pub fn from_wire(value: i64) -> Self {
        if value >= MAX_SAFE_INTEGER {
            Limit::PosInfinity
        } else if value <= MIN_SAFE_INTEGER {
            Limit::NegInfinity
        } else {
            Limit::Finite(value)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRange {
    pub min: i64,
    pub max: i64,
}

impl From<CountRange> for WireRange {
    fn from(range: CountRange) -> Self {
        WireRange {
            min: range.min.to_wire(),
            max: range.max.to_wire(),
        }
    }
}

impl From<WireRange> for CountRange {
    fn from(wire: WireRange) -> Self {
        CountRange::new(Limit::from_wire(wire.min), Limit::from_wire(wire.max))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTimeWindow {
    pub min_seconds: i64,
    pub max_seconds: i64,
}

impl From<TimeWindow> for WireTimeWindow {
    fn from(window: TimeWindow) -> Self {
        WireTimeWindow {
            min_seconds: window.min_seconds.to_wire(),
            max_seconds: window.max_seconds.to_wire(),
        }
    }
}

impl From<WireTimeWindow> for TimeWindow {
    fn from(wire: WireTimeWindow) -> Self {
        TimeWindow::new(
            Limit::from_wire(wire.min_seconds),
            Limit::from_wire(wire.max_seconds),
        )
    }
}

/// Dependency data of one edge as seen from either endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(rename = "type")]
    pub constraint_type: ConstraintType,
    pub time_constraint: WireTimeWindow,
}

/// One parent or child entry of a [`TreeNode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNodeConnection {
    pub connection: Connection,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

/// Finite constraint data of an event-type node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypePayload {
    pub count_constraint: WireRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_or_last_event_of_type: Option<Occurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_time_constraint: Option<WireTimeWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_qualified_objects_constraint: Option<BTreeMap<String, WireRange>>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub constraints: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nodeType", rename_all = "camelCase")]
pub enum NodeConstraints {
    EventType(EventTypePayload),
    #[serde(rename_all = "camelCase")]
    Gate { gate_type: GateKind },
}

/// Compiled form of a node, ready for transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    pub parents: Vec<TreeNodeConnection>,
    pub children: Vec<TreeNodeConnection>,
    pub variables: ResolvedVariables,
    #[serde(flatten)]
    pub constraints: NodeConstraints,
}

/// Rewrite a node's authored constraints into their finite wire form.
pub fn assemble(node: &Node) -> NodeConstraints {
    match &node.kind {
        NodeKind::EventType(data) => NodeConstraints::EventType(EventTypePayload {
            count_constraint: data.count_constraint.into(),
            first_or_last_event_of_type: data.first_or_last_event_of_type,
            waiting_time_constraint: data.waiting_time_constraint.map(WireTimeWindow::from),
            num_qualified_objects_constraint: data.num_qualified_objects_constraint.as_ref().map(
                |per_qualifier| {
                    per_qualifier
                        .iter()
                        .map(|(qualifier, range)| (qualifier.clone(), WireRange::from(*range)))
                        .collect()
                },
            ),
            filters: data.filters.clone(),
            constraints: data.constraints.clone(),
        }),
        NodeKind::Gate(g) => NodeConstraints::Gate { gate_type: g.gate },
    }
}

pub fn assemble_connection(data: &EdgeConstraint) -> Connection {
    Connection {
        constraint_type: data.constraint_type,
        time_constraint: data.time_constraint.into(),
    }
}

/// Combine assembled constraints with the links and scope the compiler found.
pub fn assemble_tree_node(
    node: &Node,
    parents: Vec<TreeNodeConnection>,
    children: Vec<TreeNodeConnection>,
    variables: ResolvedVariables,
) -> TreeNode {
    TreeNode {
        id: node.id.clone(),
        event_type: node.label().map(str::to_owned),
        parents,
        children,
        variables,
        constraints: assemble(node),
    }
}
