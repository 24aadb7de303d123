//! `ocgraph serve` -- HTTP JSON API for the canvas layer.
//!
//! Holds one graph in memory, applies edits through the reducer and runs
//! evaluations against the configured evaluator.
//!
//! Endpoints:
//! - GET    /health                   - Server status
//! - GET    /graph                    - Current graph
//! - PUT    /graph                    - Replace the whole graph
//! - POST   /graph/commands           - Apply one command or a list of them
//! - GET    /graph/compile            - Order, plan and diagnostics
//! - GET    /graph/nodes/{id}/scope   - Variables visible at a node (`?kind=event|object`)
//! - POST   /evaluate                 - Compile and evaluate the current graph
//! - GET    /evaluation               - Latest applied results
//! - DELETE /evaluation               - Clear results; a late response is dropped
//!
//! All responses use Content-Type: application/json.

mod handlers;
mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use ocgraph_eval::{HttpEvaluator, Orchestrator};
use tower_http::cors::{Any, CorsLayer};

use self::handlers::{
    handle_apply_commands, handle_clear_evaluation, handle_compile, handle_evaluate,
    handle_get_evaluation, handle_get_graph, handle_health, handle_not_found, handle_put_graph,
    handle_scope,
};
use self::state::AppState;
use crate::config::EvaluatorConfig;

/// Maximum request body size: 10 MB.
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

fn router(state: Arc<AppState>) -> Router {
    // CORS: the canvas is served from another origin during development.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/graph", get(handle_get_graph).put(handle_put_graph))
        .route("/graph/commands", post(handle_apply_commands))
        .route("/graph/compile", get(handle_compile))
        .route("/graph/nodes/{id}/scope", get(handle_scope))
        .route("/evaluate", post(handle_evaluate))
        .route(
            "/evaluation",
            get(handle_get_evaluation).delete(handle_clear_evaluation),
        )
        .fallback(handle_not_found)
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

/// Start the HTTP server on the given port with an empty graph.
pub async fn start_server(
    port: u16,
    evaluator: EvaluatorConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = Orchestrator::new(Arc::new(
        HttpEvaluator::new(&evaluator.url).with_timeout(evaluator.timeout()),
    ));
    let state = Arc::new(AppState::new(orchestrator));
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(port, evaluator = %evaluator.url, "ocgraph listening");
    eprintln!("ocgraph listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    eprintln!("\nServer shut down.");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    eprintln!("\nReceived shutdown signal...");
}
