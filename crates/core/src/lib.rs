//! ocgraph-core: constraint-graph compiler for object-centric event logs.
//!
//! Turns an authored graph of event-type and gate nodes into an ordered,
//! infinity-safe plan for an external evaluator.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`Graph`], [`Node`], [`Edge`] -- the authored graph
//! - [`GraphState`] and [`GraphCommand`] -- editing through a reducer
//! - [`compile()`] -- validate and order a graph into a [`Compilation`]
//! - [`resolve_scope()`] -- variables visible at a node
//! - [`Plan`] -- the evaluator request body
//! - [`Diagnostic`], [`CompileError`], [`EditError`]

pub mod assemble;
pub mod compile;
pub mod diagnostic;
pub mod edit;
pub mod error;
pub mod model;
pub mod scope;

// ── Convenience re-exports: key types ────────────────────────────────

pub use assemble::{TreeNode, TreeNodeConnection, MAX_SAFE_INTEGER, MIN_SAFE_INTEGER};
pub use compile::{Compilation, Plan, VariableDeclaration};
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use edit::{EdgeUpdate, GraphCommand, GraphState, NodeUpdate};
pub use error::{CompileError, EditError, ReplayError};
pub use model::{
    ConstraintType, CountRange, Edge, EdgeConstraint, EventTypeNode, Filter, GateKind, Graph,
    Limit, Node, NodeKind, Variable, VariableKind,
};
pub use scope::ResolvedVariables;

// ── Convenience re-exports: entry points ─────────────────────────────

pub use assemble::assemble;
pub use compile::{compile, compile_plan};
pub use edit::check_connection;
pub use scope::{resolve_scope, resolve_variables};
