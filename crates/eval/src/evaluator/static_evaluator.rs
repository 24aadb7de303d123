//! Static evaluator. Answers every plan with the same response.
//!
//! Used for dry runs against a saved response and by tests.

use super::Evaluator;
use crate::error::EvalError;
use async_trait::async_trait;
use ocgraph_core::Plan;
use ocgraph_interchange::EvaluationResponse;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct StaticEvaluator {
    response: serde_json::Value,
    calls: AtomicUsize,
}

impl StaticEvaluator {
    pub fn new(response: serde_json::Value) -> Self {
        StaticEvaluator {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn from_response(response: &EvaluationResponse) -> Self {
        Self::new(serde_json::to_value(response).unwrap_or_default())
    }

    /// A response with one empty result per plan entry is built on every
    /// call when the canned value is `null`.
    pub fn empty() -> Self {
        Self::new(serde_json::Value::Null)
    }

    /// Number of plans this evaluator has been asked to check.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Evaluator for StaticEvaluator {
    async fn check_constraints(&self, plan: &Plan) -> Result<serde_json::Value, EvalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.response.is_null() {
            let empty = EvaluationResponse {
                evaluation_results: vec![Default::default(); plan.len()],
                event_ids: vec![],
                object_ids: vec![],
            };
            return serde_json::to_value(empty)
                .map_err(|e| EvalError::transport("static", e.to_string()));
        }
        Ok(self.response.clone())
    }

    fn evaluator_id(&self) -> &str {
        "static"
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
