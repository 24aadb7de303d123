//! ocgraph evaluation orchestrator -- sends a compiled plan to an external
//! evaluator and keeps the latest results keyed by node id.
//!
//! The evaluator sees only the plan; results come back positionally and
//! are zipped onto the plan's node ids here. At most one evaluation is in
//! flight per [`Orchestrator`]; clearing bumps a generation counter so a
//! response that arrives afterwards is dropped.

pub mod error;
pub mod evaluator;
pub mod orchestrator;
pub mod view;

pub use error::EvalError;
#[cfg(feature = "http")]
pub use evaluator::http::HttpEvaluator;
pub use evaluator::static_evaluator::StaticEvaluator;
pub use evaluator::Evaluator;
pub use orchestrator::{EvaluationOutcome, Orchestrator};
pub use view::{violation_percentage, NodeResult, ResolvedBinding, ResultsView};
