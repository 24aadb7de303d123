use crate::diagnostic::Diagnostic;
use crate::model::{GateKind, Limit, Variable};

/// A graph edit the reducer refused. The graph is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("node '{0}' already exists")]
    DuplicateNode(String),

    #[error("node '{0}' not found")]
    UnknownNode(String),

    #[error("edge '{0}' already exists")]
    DuplicateEdge(String),

    #[error("edge '{0}' not found")]
    UnknownEdge(String),

    #[error("edge '{0}' needs both a source and a target handle")]
    MissingHandle(String),

    #[error("handle '{handle}' does not belong to node '{node}'")]
    InvalidHandle { node: String, handle: String },

    #[error("slot '{handle}' of gate '{node}' is already connected")]
    SlotOccupied { node: String, handle: String },

    #[error("invalid connection: loops are forbidden ('{from}' -> '{to}')")]
    WouldCreateCycle { from: String, to: String },

    #[error("node '{0}' is not an event-type node")]
    NotAnEventNode(String),

    #[error("node '{0}' is not a gate")]
    NotAGate(String),

    #[error("gate '{node}' cannot change from {from} to {to}")]
    IncompatibleGate {
        node: String,
        from: GateKind,
        to: GateKind,
    },

    #[error("{variable} is already introduced at node '{node}'")]
    DuplicateVariable { node: String, variable: Variable },

    #[error("{variable} is not introduced at node '{node}'")]
    UnknownVariable { node: String, variable: Variable },

    #[error("invalid range: minimum {min} exceeds maximum {max}")]
    InvalidRange { min: Limit, max: Limit },
}

/// A compile that produced at least one error diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid requirements: {summary}")]
pub struct CompileError {
    pub summary: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileError {
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let summary = diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| d.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        CompileError {
            summary,
            diagnostics,
        }
    }
}

/// A replayed command that was rejected, with its position in the log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("command {index} rejected: {error}")]
pub struct ReplayError {
    pub index: usize,
    #[source]
    pub error: EditError,
}
