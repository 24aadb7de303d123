//! Compiler diagnostics.
//!
//! Structural problems (cycles, unreachable nodes, duplicate ids) are
//! errors and block transmission. Skipped edges and out-of-scope variable
//! references are warnings.

use crate::model::Variable;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Why an edge was left out of the compiled graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingHandle,
    MissingData,
    UnknownEndpoint,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingHandle => write!(f, "no source or target handle"),
            SkipReason::MissingData => write!(f, "no constraint data"),
            SkipReason::UnknownEndpoint => write!(f, "an endpoint is not a node of the graph"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    CycleDetected { node_ids: Vec<String> },
    UnreachableNodes { node_ids: Vec<String> },
    DuplicateNode { node_id: String },
    SkippedEdge { edge_id: String, reason: SkipReason },
    OutOfScopeVariable { node_id: String, variable: Variable },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn cycle_detected(node_ids: Vec<String>) -> Self {
        let message = format!(
            "invalid requirements: cycle detected involving {}",
            node_ids.join(", ")
        );
        Diagnostic {
            severity: Severity::Error,
            kind: DiagnosticKind::CycleDetected { node_ids },
            message,
        }
    }

    pub fn unreachable_nodes(node_ids: Vec<String>) -> Self {
        let message = format!("nodes not reachable from root: {}", node_ids.join(", "));
        Diagnostic {
            severity: Severity::Error,
            kind: DiagnosticKind::UnreachableNodes { node_ids },
            message,
        }
    }

    pub fn duplicate_node(node_id: &str) -> Self {
        Diagnostic {
            severity: Severity::Error,
            kind: DiagnosticKind::DuplicateNode {
                node_id: node_id.to_string(),
            },
            message: format!("node id '{}' is used more than once", node_id),
        }
    }

    pub fn skipped_edge(edge_id: &str, reason: SkipReason) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            kind: DiagnosticKind::SkippedEdge {
                edge_id: edge_id.to_string(),
                reason,
            },
            message: format!("edge '{}' ignored: {}", edge_id, reason),
        }
    }

    pub fn out_of_scope_variable(node_id: &str, variable: Variable) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            kind: DiagnosticKind::OutOfScopeVariable {
                node_id: node_id.to_string(),
                variable,
            },
            message: format!(
                "node '{}' references {}, which is not in scope there",
                node_id, variable
            ),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// JSON form for CLI and HTTP output.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({ "message": self.message }))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}
