//! Variable scope resolution.
//!
//! A variable is visible at a node when the node introduces it or when it
//! is visible at the node's parent. Gates introduce nothing and pass their
//! parent's scope through. The parent is the source of the first linked
//! edge targeting the node (see [`Graph::is_linked`]).

use crate::model::{Graph, NodeKind, Variable, VariableKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Both variable lists visible at one node, each ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolvedVariables {
    pub event: Vec<u32>,
    pub object: Vec<u32>,
}

impl ResolvedVariables {
    pub fn is_empty(&self) -> bool {
        self.event.is_empty() && self.object.is_empty()
    }

    pub fn of_kind(&self, kind: VariableKind) -> &[u32] {
        match kind {
            VariableKind::Event => &self.event,
            VariableKind::Object => &self.object,
        }
    }

    pub fn contains(&self, variable: Variable) -> bool {
        self.of_kind(variable.kind())
            .binary_search(&variable.index())
            .is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = Variable> + '_ {
        self.event
            .iter()
            .map(|i| Variable::Event(*i))
            .chain(self.object.iter().map(|i| Variable::Object(*i)))
    }
}

/// Indices of `kind` visible at `node_id`, sorted ascending.
///
/// Unknown ids resolve to nothing. The walk stops when it revisits a node,
/// so a cyclic parent chain still terminates.
pub fn resolve_scope(graph: &Graph, node_id: &str, kind: VariableKind) -> Vec<u32> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut indices: BTreeSet<u32> = BTreeSet::new();
    let mut current = Some(node_id);

    while let Some(id) = current {
        if !visited.insert(id) {
            break;
        }
        let Some(node) = graph.node(id) else {
            tracing::debug!(node = id, "scope lookup for unknown node");
            break;
        };
        if let NodeKind::EventType(data) = &node.kind {
            indices.extend(data.introduced(kind));
        }
        current = graph.first_parent(id);
    }

    indices.into_iter().collect()
}

pub fn resolve_variables(graph: &Graph, node_id: &str) -> ResolvedVariables {
    ResolvedVariables {
        event: resolve_scope(graph, node_id, VariableKind::Event),
        object: resolve_scope(graph, node_id, VariableKind::Object),
    }
}
