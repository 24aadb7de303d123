//! Evaluator abstraction: something that takes a plan and returns the raw
//! response JSON.
//!
//! - [`http::HttpEvaluator`] -- POSTs to a remote evaluation service
//! - [`static_evaluator::StaticEvaluator`] -- answers with a canned response
//!
//! Responses are returned unparsed; the [`Orchestrator`](crate::Orchestrator)
//! validates them before anything is stored.

#[cfg(feature = "http")]
pub mod http;
pub mod static_evaluator;

use crate::error::EvalError;
use async_trait::async_trait;
use ocgraph_core::Plan;

/// Runs a plan against event data somewhere else.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn check_constraints(&self, plan: &Plan) -> Result<serde_json::Value, EvalError>;

    /// Returns this evaluator's identifier (e.g. "http", "static").
    fn evaluator_id(&self) -> &str;
}
