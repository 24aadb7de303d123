//! Graph validation and topological compilation.
//!
//! `compile` links every node to its parents and children, orders the
//! connected part with a priority scan (a node is emitted only once all of
//! its parents have been), and assembles the ordered nodes into the plan
//! the evaluator consumes. Structural problems are collected into
//! diagnostics in a single pass; `Compilation::into_plan` refuses to hand
//! out a plan while any of them is an error.

use crate::assemble::{assemble_connection, assemble_tree_node, TreeNode, TreeNodeConnection};
use crate::diagnostic::{Diagnostic, SkipReason};
use crate::error::CompileError;
use crate::model::{Graph, Node, Variable, VariableKind};
use crate::scope::resolve_variables;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap, VecDeque};

/// One variable introduced somewhere in the graph, with the types it may
/// bind to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDeclaration {
    pub variable: Variable,
    pub types: BTreeSet<String>,
    pub node_id: String,
}

/// Request body for the evaluator. Position in `nodes_order` is the key
/// the response is matched back by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub variables: Vec<VariableDeclaration>,
    pub nodes_order: Vec<TreeNode>,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.nodes_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes_order.is_empty()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes_order.iter().map(|n| n.id.as_str())
    }
}

/// Everything one compile produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compilation {
    /// Disconnected nodes, then the connected nodes parents first.
    pub order: Vec<String>,
    /// Assembled nodes with a non-empty scope, in `order`. Empty when any
    /// error diagnostic fired.
    pub nodes: Vec<TreeNode>,
    pub variables: Vec<VariableDeclaration>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    pub fn into_plan(self) -> Result<Plan, CompileError> {
        if self.has_errors() {
            return Err(CompileError::from_diagnostics(self.diagnostics));
        }
        Ok(Plan {
            variables: self.variables,
            nodes_order: self.nodes,
        })
    }
}

/// Compile and return the plan, or every diagnostic if the graph is
/// structurally invalid.
pub fn compile_plan(graph: &Graph) -> Result<Plan, CompileError> {
    compile(graph).into_plan()
}

#[derive(Debug, Clone, Copy)]
struct Link {
    node: usize,
    edge: usize,
}

#[derive(Debug, Default)]
struct Links {
    parents: Vec<Link>,
    children: Vec<Link>,
}

pub fn compile(graph: &Graph) -> Compilation {
    let mut diagnostics = Vec::new();

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut nodes: Vec<&Node> = Vec::new();
    for node in &graph.nodes {
        if index.contains_key(node.id.as_str()) {
            diagnostics.push(Diagnostic::duplicate_node(&node.id));
            continue;
        }
        index.insert(node.id.as_str(), nodes.len());
        nodes.push(node);
    }

    let mut links: Vec<Links> = nodes.iter().map(|_| Links::default()).collect();
    for (edge_index, edge) in graph.edges.iter().enumerate() {
        let endpoints = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        );
        // Scope walks the same linked edges, so the plan's parents and
        // variables agree.
        let (source, target) = match endpoints {
            (Some(&s), Some(&t)) if graph.is_linked(edge) => (s, t),
            _ => {
                let reason = if edge.source_handle.is_none() || edge.target_handle.is_none() {
                    SkipReason::MissingHandle
                } else if edge.data.is_none() {
                    SkipReason::MissingData
                } else {
                    SkipReason::UnknownEndpoint
                };
                tracing::warn!(edge = %edge.id, %reason, "skipping edge");
                diagnostics.push(Diagnostic::skipped_edge(&edge.id, reason));
                continue;
            }
        };
        links[target].parents.push(Link {
            node: source,
            edge: edge_index,
        });
        links[source].children.push(Link {
            node: target,
            edge: edge_index,
        });
    }

    let mut disconnected = Vec::new();
    let mut roots = Vec::new();
    let mut connected = Vec::new();
    for (i, l) in links.iter().enumerate() {
        match (l.parents.is_empty(), l.children.is_empty()) {
            (true, true) => disconnected.push(i),
            (true, false) => roots.push(i),
            _ => connected.push(i),
        }
    }

    let (reachable, stuck) = priority_order(&links, &roots);

    let cyclic = cyclic_nodes(&links);
    if stuck || !cyclic.is_empty() {
        let ids = if cyclic.is_empty() {
            // Unreached nodes are all that is left to point at.
            unreached(&links, &reachable)
        } else {
            cyclic
        };
        diagnostics.push(Diagnostic::cycle_detected(
            ids.iter().map(|&i| nodes[i].id.clone()).collect(),
        ));
    }

    let mut reached = vec![false; nodes.len()];
    for &i in &reachable {
        reached[i] = true;
    }
    let unreachable: Vec<String> = connected
        .iter()
        .filter(|&&i| !reached[i])
        .map(|&i| nodes[i].id.clone())
        .collect();
    if !unreachable.is_empty() {
        diagnostics.push(Diagnostic::unreachable_nodes(unreachable));
    }

    let order: Vec<usize> = disconnected.into_iter().chain(reachable).collect();
    tracing::debug!(
        nodes = nodes.len(),
        ordered = order.len(),
        "topological order computed"
    );

    for node in &nodes {
        let Some(data) = node.as_event_type() else {
            continue;
        };
        let scope = resolve_variables(graph, &node.id);
        let mut reported = BTreeSet::new();
        for variable in data.predicates().flat_map(|p| p.involved_variables()) {
            if !scope.contains(variable) && reported.insert(variable) {
                diagnostics.push(Diagnostic::out_of_scope_variable(&node.id, variable));
            }
        }
    }

    let variables = declarations(&order, &nodes);

    let has_errors = diagnostics.iter().any(Diagnostic::is_error);
    let tree_nodes = if has_errors {
        Vec::new()
    } else {
        order
            .iter()
            .filter_map(|&i| {
                let scope = resolve_variables(graph, &nodes[i].id);
                if scope.is_empty() {
                    return None;
                }
                let parents = connections(graph, &nodes, &links[i].parents);
                let children = connections(graph, &nodes, &links[i].children);
                Some(assemble_tree_node(nodes[i], parents, children, scope))
            })
            .collect()
    };

    Compilation {
        order: order.iter().map(|&i| nodes[i].id.clone()).collect(),
        nodes: tree_nodes,
        variables,
        diagnostics,
    }
}

/// Priority scan from the roots. Returns the visit order and whether the
/// scan got stuck with nodes still queued.
fn priority_order(links: &[Links], roots: &[usize]) -> (Vec<usize>, bool) {
    let mut queue: Vec<usize> = roots.to_vec();
    let mut reached = vec![false; links.len()];
    let mut order = Vec::new();

    while !queue.is_empty() {
        let ready = queue
            .iter()
            .position(|&i| links[i].parents.iter().all(|p| reached[p.node]));
        let Some(pos) = ready else {
            return (order, true);
        };
        let next = queue.remove(pos);
        if !reached[next] {
            reached[next] = true;
            order.push(next);
            queue.extend(links[next].children.iter().map(|c| c.node));
        }
        queue.sort_by_key(|&i| Reverse(links[i].parents.len()));
    }

    (order, false)
}

/// Kahn's algorithm over the linked edges. Whatever keeps a non-zero
/// indegree lies on, or downstream of, a cycle.
fn cyclic_nodes(links: &[Links]) -> Vec<usize> {
    let mut indegree: Vec<usize> = links.iter().map(|l| l.parents.len()).collect();
    let mut ready: VecDeque<usize> = (0..links.len()).filter(|&i| indegree[i] == 0).collect();

    while let Some(i) = ready.pop_front() {
        for child in &links[i].children {
            indegree[child.node] -= 1;
            if indegree[child.node] == 0 {
                ready.push_back(child.node);
            }
        }
    }

    (0..links.len()).filter(|&i| indegree[i] > 0).collect()
}

fn unreached(links: &[Links], reachable: &[usize]) -> Vec<usize> {
    (0..links.len())
        .filter(|i| !links[*i].parents.is_empty() && !reachable.contains(i))
        .collect()
}

fn connections(graph: &Graph, nodes: &[&Node], links: &[Link]) -> Vec<TreeNodeConnection> {
    links
        .iter()
        .filter_map(|link| {
            let data = graph.edges[link.edge].data.as_ref()?;
            let neighbor = nodes[link.node];
            Some(TreeNodeConnection {
                connection: assemble_connection(data),
                id: neighbor.id.clone(),
                event_type: neighbor.label().map(str::to_owned),
            })
        })
        .collect()
}

fn declarations(order: &[usize], nodes: &[&Node]) -> Vec<VariableDeclaration> {
    let mut out = Vec::new();
    for &i in order {
        let Some(data) = nodes[i].as_event_type() else {
            continue;
        };
        for kind in [VariableKind::Event, VariableKind::Object] {
            let vars = match kind {
                VariableKind::Event => &data.new_event_vars,
                VariableKind::Object => &data.new_object_vars,
            };
            for (index, types) in vars {
                out.push(VariableDeclaration {
                    variable: Variable::of_kind(kind, *index),
                    types: types.clone(),
                    node_id: nodes[i].id.clone(),
                });
            }
        }
    }
    out
}
