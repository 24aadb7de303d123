//! Application state shared across request handlers.

use ocgraph_core::GraphState;
use ocgraph_eval::Orchestrator;
use tokio::sync::RwLock;

pub(crate) struct AppState {
    /// The graph being edited. Every mutation goes through the reducer.
    pub(crate) graph: RwLock<GraphState>,
    /// Evaluation round trips and the latest applied results.
    pub(crate) orchestrator: Orchestrator,
}

impl AppState {
    pub(crate) fn new(orchestrator: Orchestrator) -> Self {
        AppState {
            graph: RwLock::new(GraphState::new()),
            orchestrator,
        }
    }
}
