//! Graph editing as commands applied by a reducer.
//!
//! Every user edit on the canvas arrives as a [`GraphCommand`]. Commands
//! are validated before anything is touched: a rejected command leaves the
//! graph exactly as it was. Edge insertion runs the connection pre-check,
//! which keeps the edge set acyclic and gate slots single-use.

use crate::compile::{compile, Compilation};
use crate::error::{EditError, ReplayError};
use crate::model::{
    ConstraintType, CountRange, Edge, EdgeConstraint, EventTypeNode, Filter, GateKind, Graph,
    Node, NodeKind, Occurrence, TimeWindow, Variable,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum GraphCommand {
    AddNode { node: Node },
    AddEdge { edge: Edge },
    DeleteNode { id: String },
    DeleteEdge { id: String },
    UpdateNode { id: String, update: NodeUpdate },
    UpdateEdge { id: String, update: EdgeUpdate },
    ReplaceGraph { graph: Graph },
}

/// In-place change to one field of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "camelCase")]
pub enum NodeUpdate {
    EventType {
        value: Option<String>,
    },
    CountConstraint {
        value: CountRange,
    },
    FirstOrLastEventOfType {
        value: Option<Occurrence>,
    },
    WaitingTimeConstraint {
        value: Option<TimeWindow>,
    },
    /// `None` drops the qualifier's constraint.
    QualifiedObjectCount {
        qualifier: String,
        value: Option<CountRange>,
    },
    AddVariable {
        variable: Variable,
        #[serde(default)]
        types: BTreeSet<String>,
    },
    RemoveVariable {
        variable: Variable,
    },
    Filters {
        value: Vec<Filter>,
    },
    Constraints {
        value: Vec<Filter>,
    },
    GateKind {
        value: GateKind,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "camelCase")]
pub enum EdgeUpdate {
    ConstraintType { value: ConstraintType },
    TimeConstraint { value: TimeWindow },
    Color { value: String },
}

/// Owned graph plus the reducer that edits it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphState {
    graph: Graph,
}

impl GraphState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_graph(graph: Graph) -> Self {
        GraphState { graph }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    pub fn compile(&self) -> Compilation {
        compile(&self.graph)
    }

    pub fn apply(&mut self, command: GraphCommand) -> Result<(), EditError> {
        match command {
            GraphCommand::AddNode { node } => {
                if self.graph.node(&node.id).is_some() {
                    return Err(EditError::DuplicateNode(node.id));
                }
                tracing::debug!(node = %node.id, "node added");
                self.graph.nodes.push(node);
            }
            GraphCommand::AddEdge { mut edge } => {
                check_connection(&self.graph, &edge)?;
                if edge.data.is_none() {
                    edge.data = Some(EdgeConstraint::default());
                }
                tracing::debug!(edge = %edge.id, "edge added");
                self.graph.edges.push(edge);
            }
            GraphCommand::DeleteNode { id } => {
                if self.graph.node(&id).is_none() {
                    return Err(EditError::UnknownNode(id));
                }
                self.graph.nodes.retain(|n| n.id != id);
                self.graph
                    .edges
                    .retain(|e| e.source != id && e.target != id);
                tracing::debug!(node = %id, "node deleted with its edges");
            }
            GraphCommand::DeleteEdge { id } => {
                if self.graph.edge(&id).is_none() {
                    return Err(EditError::UnknownEdge(id));
                }
                self.graph.edges.retain(|e| e.id != id);
            }
            GraphCommand::UpdateNode { id, update } => {
                let node = self
                    .graph
                    .node_mut(&id)
                    .ok_or_else(|| EditError::UnknownNode(id.clone()))?;
                update_node(node, update)?;
            }
            GraphCommand::UpdateEdge { id, update } => {
                let edge = self
                    .graph
                    .edge_mut(&id)
                    .ok_or_else(|| EditError::UnknownEdge(id.clone()))?;
                if let EdgeUpdate::TimeConstraint { value } = &update {
                    if !value.is_well_formed() {
                        return Err(EditError::InvalidRange {
                            min: value.min_seconds,
                            max: value.max_seconds,
                        });
                    }
                }
                let data = edge.data.get_or_insert_with(EdgeConstraint::default);
                match update {
                    EdgeUpdate::ConstraintType { value } => data.constraint_type = value,
                    EdgeUpdate::TimeConstraint { value } => data.time_constraint = value,
                    EdgeUpdate::Color { value } => data.color = value,
                }
            }
            GraphCommand::ReplaceGraph { graph } => {
                tracing::debug!(
                    nodes = graph.nodes.len(),
                    edges = graph.edges.len(),
                    "graph replaced"
                );
                self.graph = graph;
            }
        }
        Ok(())
    }

    /// Apply `commands` in order. Either all of them apply or, on the
    /// first rejection, none do.
    pub fn replay<I>(&mut self, commands: I) -> Result<(), ReplayError>
    where
        I: IntoIterator<Item = GraphCommand>,
    {
        let mut scratch = self.clone();
        for (index, command) in commands.into_iter().enumerate() {
            scratch
                .apply(command)
                .map_err(|error| ReplayError { index, error })?;
        }
        *self = scratch;
        Ok(())
    }
}

fn update_node(node: &mut Node, update: NodeUpdate) -> Result<(), EditError> {
    let id = node.id.clone();
    match (&mut node.kind, update) {
        (NodeKind::Gate(gate), NodeUpdate::GateKind { value }) => {
            if !gate.gate.can_become(value) {
                return Err(EditError::IncompatibleGate {
                    node: id,
                    from: gate.gate,
                    to: value,
                });
            }
            gate.gate = value;
            Ok(())
        }
        (NodeKind::Gate(_), _) => Err(EditError::NotAnEventNode(id)),
        (NodeKind::EventType(_), NodeUpdate::GateKind { .. }) => Err(EditError::NotAGate(id)),
        (NodeKind::EventType(data), update) => update_event_node(id, data, update),
    }
}

fn update_event_node(
    id: String,
    data: &mut EventTypeNode,
    update: NodeUpdate,
) -> Result<(), EditError> {
    match update {
        NodeUpdate::EventType { value } => data.event_type = value,
        NodeUpdate::CountConstraint { value } => {
            check_range(&value)?;
            data.count_constraint = value;
        }
        NodeUpdate::FirstOrLastEventOfType { value } => data.first_or_last_event_of_type = value,
        NodeUpdate::WaitingTimeConstraint { value } => {
            if let Some(window) = value.filter(|w| !w.is_well_formed()) {
                return Err(EditError::InvalidRange {
                    min: window.min_seconds,
                    max: window.max_seconds,
                });
            }
            data.waiting_time_constraint = value;
        }
        NodeUpdate::QualifiedObjectCount { qualifier, value } => match value {
            Some(range) => {
                check_range(&range)?;
                data.num_qualified_objects_constraint
                    .get_or_insert_with(Default::default)
                    .insert(qualifier, range);
            }
            None => {
                if let Some(per_qualifier) = data.num_qualified_objects_constraint.as_mut() {
                    per_qualifier.remove(&qualifier);
                    if per_qualifier.is_empty() {
                        data.num_qualified_objects_constraint = None;
                    }
                }
            }
        },
        NodeUpdate::AddVariable { variable, types } => {
            let vars = data.variables_mut(variable.kind());
            if vars.contains_key(&variable.index()) {
                return Err(EditError::DuplicateVariable { node: id, variable });
            }
            vars.insert(variable.index(), types);
        }
        NodeUpdate::RemoveVariable { variable } => {
            if data
                .variables_mut(variable.kind())
                .remove(&variable.index())
                .is_none()
            {
                return Err(EditError::UnknownVariable { node: id, variable });
            }
        }
        NodeUpdate::Filters { value } => data.filters = value,
        NodeUpdate::Constraints { value } => data.constraints = value,
        NodeUpdate::GateKind { .. } => return Err(EditError::NotAGate(id)),
    }
    Ok(())
}

fn check_range(range: &CountRange) -> Result<(), EditError> {
    if range.is_well_formed() {
        Ok(())
    } else {
        Err(EditError::InvalidRange {
            min: range.min,
            max: range.max,
        })
    }
}

/// Pre-check for a new edge. The graph is not modified.
pub fn check_connection(graph: &Graph, edge: &Edge) -> Result<(), EditError> {
    let source = graph
        .node(&edge.source)
        .ok_or_else(|| EditError::UnknownNode(edge.source.clone()))?;
    let target = graph
        .node(&edge.target)
        .ok_or_else(|| EditError::UnknownNode(edge.target.clone()))?;
    let (Some(source_handle), Some(target_handle)) = (&edge.source_handle, &edge.target_handle)
    else {
        return Err(EditError::MissingHandle(edge.id.clone()));
    };
    if !source.source_handles().contains(source_handle) {
        return Err(EditError::InvalidHandle {
            node: source.id.clone(),
            handle: source_handle.clone(),
        });
    }
    if *target_handle != target.target_handle() {
        return Err(EditError::InvalidHandle {
            node: target.id.clone(),
            handle: target_handle.clone(),
        });
    }

    let duplicate = graph.edges.iter().any(|e| {
        e.id == edge.id
            || (e.source_handle.as_ref() == Some(source_handle)
                && e.target_handle.as_ref() == Some(target_handle))
    });
    if duplicate {
        return Err(EditError::DuplicateEdge(edge.id.clone()));
    }

    if edge.source == edge.target || graph.ancestors(&edge.source).contains(edge.target.as_str()) {
        tracing::warn!(
            from = %edge.source,
            to = %edge.target,
            "invalid connection: loops are forbidden"
        );
        return Err(EditError::WouldCreateCycle {
            from: edge.source.clone(),
            to: edge.target.clone(),
        });
    }

    if matches!(source.kind, NodeKind::Gate(_))
        && graph
            .edges
            .iter()
            .any(|e| e.source_handle.as_ref() == Some(source_handle))
    {
        return Err(EditError::SlotOccupied {
            node: source.id.clone(),
            handle: source_handle.clone(),
        });
    }
    if matches!(target.kind, NodeKind::Gate(_))
        && graph.edges.iter().any(|e| e.target == target.id)
    {
        return Err(EditError::SlotOccupied {
            node: target.id.clone(),
            handle: target_handle.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Limit;

    fn state() -> GraphState {
        let mut s = GraphState::new();
        for id in ["a", "b", "c"] {
            s.apply(GraphCommand::AddNode {
                node: Node::event_type(id, EventTypeNode::new(id)),
            })
            .unwrap();
        }
        s
    }

    fn add_edge(s: &mut GraphState, from: &str, to: &str) -> Result<(), EditError> {
        s.apply(GraphCommand::AddEdge {
            edge: Edge::new(from, to),
        })
    }

    #[test]
    fn duplicate_node_is_rejected() {
        let mut s = state();
        let err = s
            .apply(GraphCommand::AddNode {
                node: Node::gate("a", GateKind::And),
            })
            .unwrap_err();
        assert_eq!(err, EditError::DuplicateNode("a".into()));
        assert_eq!(s.graph().nodes.len(), 3);
    }

    #[test]
    fn edge_closing_a_loop_is_rejected() {
        let mut s = state();
        add_edge(&mut s, "a", "b").unwrap();
        add_edge(&mut s, "b", "c").unwrap();
        let before = s.graph().clone();
        let err = add_edge(&mut s, "c", "a").unwrap_err();
        assert_eq!(
            err,
            EditError::WouldCreateCycle {
                from: "c".into(),
                to: "a".into()
            }
        );
        assert_eq!(s.graph(), &before);
        assert!(add_edge(&mut s, "a", "a").is_err());
    }

    #[test]
    fn duplicate_edge_is_rejected() {
        let mut s = state();
        add_edge(&mut s, "a", "b").unwrap();
        assert_eq!(
            add_edge(&mut s, "a", "b").unwrap_err(),
            EditError::DuplicateEdge("a-source|||b-target".into())
        );
    }

    #[test]
    fn edge_to_unknown_node_is_rejected() {
        let mut s = state();
        assert_eq!(
            add_edge(&mut s, "a", "zzz").unwrap_err(),
            EditError::UnknownNode("zzz".into())
        );
    }

    #[test]
    fn handles_must_belong_to_endpoints() {
        let mut s = state();
        let edge = Edge::between_handles("a", "b-source", "c", "c-target");
        assert!(matches!(
            s.apply(GraphCommand::AddEdge { edge }),
            Err(EditError::InvalidHandle { .. })
        ));
        let mut edge = Edge::new("a", "c");
        edge.target_handle = None;
        assert!(matches!(
            s.apply(GraphCommand::AddEdge { edge }),
            Err(EditError::MissingHandle(_))
        ));
    }

    #[test]
    fn gate_slots_take_one_edge_each() {
        let mut s = state();
        s.apply(GraphCommand::AddNode {
            node: Node::gate("g", GateKind::And),
        })
        .unwrap();
        add_edge(&mut s, "a", "g").unwrap();
        assert!(matches!(
            add_edge(&mut s, "b", "g"),
            Err(EditError::SlotOccupied { .. })
        ));
        let left = Edge::between_handles("g", "g-left-source", "b", "b-target");
        s.apply(GraphCommand::AddEdge { edge: left }).unwrap();
        let again = Edge::between_handles("g", "g-left-source", "c", "c-target");
        assert!(matches!(
            s.apply(GraphCommand::AddEdge { edge: again }),
            Err(EditError::SlotOccupied { .. })
        ));
        let right = Edge::between_handles("g", "g-right-source", "c", "c-target");
        s.apply(GraphCommand::AddEdge { edge: right }).unwrap();
    }

    #[test]
    fn deleting_node_removes_touching_edges() {
        let mut s = state();
        add_edge(&mut s, "a", "b").unwrap();
        add_edge(&mut s, "b", "c").unwrap();
        add_edge(&mut s, "a", "c").unwrap();
        s.apply(GraphCommand::DeleteNode { id: "b".into() }).unwrap();
        assert_eq!(s.graph().nodes.len(), 2);
        assert_eq!(s.graph().edges.len(), 1);
        assert_eq!(s.graph().edges[0].id, "a-source|||c-target");
    }

    #[test]
    fn count_update_rejects_inverted_range() {
        let mut s = state();
        let err = s
            .apply(GraphCommand::UpdateNode {
                id: "a".into(),
                update: NodeUpdate::CountConstraint {
                    value: CountRange::new(5, 2),
                },
            })
            .unwrap_err();
        assert!(matches!(err, EditError::InvalidRange { .. }));

        s.apply(GraphCommand::UpdateNode {
            id: "a".into(),
            update: NodeUpdate::CountConstraint {
                value: CountRange::new(1, Limit::PosInfinity),
            },
        })
        .unwrap();
        let data = s.graph().node("a").unwrap().as_event_type().unwrap();
        assert_eq!(data.count_constraint, CountRange::at_least(1));
    }

    #[test]
    fn variables_are_added_once_and_removed() {
        let mut s = state();
        let add = GraphCommand::UpdateNode {
            id: "a".into(),
            update: NodeUpdate::AddVariable {
                variable: Variable::Object(0),
                types: ["orders".to_string()].into_iter().collect(),
            },
        };
        s.apply(add.clone()).unwrap();
        assert!(matches!(
            s.apply(add),
            Err(EditError::DuplicateVariable { .. })
        ));
        s.apply(GraphCommand::UpdateNode {
            id: "a".into(),
            update: NodeUpdate::RemoveVariable {
                variable: Variable::Object(0),
            },
        })
        .unwrap();
        assert!(s
            .graph()
            .node("a")
            .unwrap()
            .as_event_type()
            .unwrap()
            .new_object_vars
            .is_empty());
    }

    #[test]
    fn not_gate_keeps_its_kind() {
        let mut s = state();
        s.apply(GraphCommand::AddNode {
            node: Node::gate("n", GateKind::Not),
        })
        .unwrap();
        s.apply(GraphCommand::AddNode {
            node: Node::gate("o", GateKind::Or),
        })
        .unwrap();
        assert!(matches!(
            s.apply(GraphCommand::UpdateNode {
                id: "n".into(),
                update: NodeUpdate::GateKind {
                    value: GateKind::And
                },
            }),
            Err(EditError::IncompatibleGate { .. })
        ));
        s.apply(GraphCommand::UpdateNode {
            id: "o".into(),
            update: NodeUpdate::GateKind {
                value: GateKind::And,
            },
        })
        .unwrap();
        assert_eq!(s.graph().node("o").unwrap(), &Node::gate("o", GateKind::And));
        assert!(matches!(
            s.apply(GraphCommand::UpdateNode {
                id: "o".into(),
                update: NodeUpdate::EventType { value: None },
            }),
            Err(EditError::NotAnEventNode(_))
        ));
    }

    #[test]
    fn edge_update_fills_missing_data() {
        let mut s = state();
        let mut edge = Edge::new("a", "b");
        edge.data = None;
        s.apply(GraphCommand::AddEdge { edge }).unwrap();
        s.apply(GraphCommand::UpdateEdge {
            id: "a-source|||b-target".into(),
            update: EdgeUpdate::ConstraintType {
                value: ConstraintType::NonResponse,
            },
        })
        .unwrap();
        let data = s.graph().edges[0].data.as_ref().unwrap();
        assert_eq!(data.constraint_type, ConstraintType::NonResponse);
        assert_eq!(data.color, crate::model::DEFAULT_EDGE_COLOR);
    }

    #[test]
    fn replay_is_all_or_nothing() {
        let mut s = state();
        let err = s
            .replay(vec![
                GraphCommand::AddEdge {
                    edge: Edge::new("a", "b"),
                },
                GraphCommand::AddEdge {
                    edge: Edge::new("b", "a"),
                },
            ])
            .unwrap_err();
        assert_eq!(err.index, 1);
        assert!(s.graph().edges.is_empty());

        s.replay(vec![GraphCommand::AddEdge {
            edge: Edge::new("a", "b"),
        }])
        .unwrap();
        assert_eq!(s.graph().edges.len(), 1);
    }

    #[test]
    fn commands_parse_from_json() {
        let json = r##"[
            {"command": "addNode", "node": {"id": "g", "type": "gate", "gate": "not"}},
            {"command": "updateNode", "id": "a", "update": {"field": "countConstraint", "value": {"min": 0, "max": null}}},
            {"command": "updateEdge", "id": "e", "update": {"field": "color", "value": "#ff0000"}},
            {"command": "deleteNode", "id": "g"}
        ]"##;
        let commands: Vec<GraphCommand> = serde_json::from_str(json).unwrap();
        assert_eq!(commands.len(), 4);
        assert_eq!(
            commands[1],
            GraphCommand::UpdateNode {
                id: "a".into(),
                update: NodeUpdate::CountConstraint {
                    value: CountRange::at_least(0)
                }
            }
        );
    }
}
