//! Evaluation orchestrator.
//!
//! Owns the evaluator handle and the latest applied results. One
//! evaluation may be outstanding at a time; a second request while one
//! is in flight is rejected rather than queued. `clear` bumps the
//! generation, and a response belonging to an older generation is
//! discarded when it arrives.
//!
//! The evaluator call runs on its own task. Dropping an `evaluate` future
//! does not cancel a request the evaluator is already working on, so the
//! in-flight flag stays set until that task finishes.

use crate::error::EvalError;
use crate::evaluator::Evaluator;
use crate::view::ResultsView;
use ocgraph_core::Plan;
use ocgraph_interchange::from_response;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
    /// The response was validated and is now the current view.
    Applied(ResultsView),
    /// Results were cleared while the request was outstanding.
    Stale,
}

pub struct Orchestrator {
    evaluator: Arc<dyn Evaluator>,
    in_flight: Arc<AtomicBool>,
    generation: AtomicU64,
    results: RwLock<Option<ResultsView>>,
}

/// Releases the in-flight flag when the last holder goes away.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Orchestrator {
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        Orchestrator {
            evaluator,
            in_flight: Arc::new(AtomicBool::new(false)),
            generation: AtomicU64::new(0),
            results: RwLock::new(None),
        }
    }

    pub fn evaluator_id(&self) -> &str {
        self.evaluator.evaluator_id()
    }

    pub fn is_evaluating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Send `plan`, validate the answer and make it the current view.
    ///
    /// On any error the previous view is left untouched and the same plan
    /// can be sent again.
    pub async fn evaluate(&self, plan: &Plan) -> Result<EvaluationOutcome, EvalError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("evaluation requested while one is in flight");
            return Err(EvalError::InProgress);
        }
        let guard = Arc::new(InFlight(Arc::clone(&self.in_flight)));
        let generation = self.generation();

        let call = {
            let evaluator = Arc::clone(&self.evaluator);
            let plan = plan.clone();
            let guard = Arc::clone(&guard);
            tokio::spawn(async move {
                let raw = evaluator.check_constraints(&plan).await;
                drop(guard);
                raw
            })
        };
        let raw = call
            .await
            .map_err(|e| {
                EvalError::transport(self.evaluator_id(), format!("evaluation task failed: {}", e))
            })
            .and_then(|raw| raw)
            .map_err(|e| {
                tracing::warn!(evaluator = self.evaluator_id(), error = %e, "evaluation failed");
                e
            })?;

        if self.generation() != generation {
            tracing::debug!(generation, "dropping response for cleared results");
            return Ok(EvaluationOutcome::Stale);
        }

        let response = from_response(&raw)?;
        if response.len() != plan.len() {
            return Err(EvalError::LengthMismatch {
                expected: plan.len(),
                actual: response.len(),
            });
        }

        let view = ResultsView::new(plan, response);
        let mut current = self.results.write().await;
        // A clear may have landed between the checks above and the lock.
        if self.generation() != generation {
            return Ok(EvaluationOutcome::Stale);
        }
        *current = Some(view.clone());
        tracing::info!(
            nodes = plan.len(),
            violations = view.total_violations(),
            "evaluation applied"
        );
        Ok(EvaluationOutcome::Applied(view))
    }

    pub async fn results(&self) -> Option<ResultsView> {
        self.results.read().await.clone()
    }

    /// Drop displayed results and invalidate any outstanding response.
    pub async fn clear(&self) {
        let mut current = self.results.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        *current = None;
    }
}
