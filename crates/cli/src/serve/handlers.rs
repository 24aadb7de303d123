//! HTTP route handlers: graph editing, compilation, scope and evaluation.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use ocgraph_core::{Graph, GraphCommand, VariableKind};
use ocgraph_eval::{EvalError, EvaluationOutcome};
use serde::Deserialize;

use super::json_error;
use super::state::AppState;

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "evaluator": state.orchestrator.evaluator_id(),
    });
    (StatusCode::OK, Json(response))
}

/// GET /graph
pub(crate) async fn handle_get_graph(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let graph = state.graph.read().await;
    (StatusCode::OK, Json(graph.graph().clone()))
}

/// PUT /graph
pub(crate) async fn handle_put_graph(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let graph: Graph = match serde_json::from_value(body) {
        Ok(g) => g,
        Err(e) => {
            return json_error(StatusCode::BAD_REQUEST, &format!("invalid graph: {}", e))
                .into_response()
        }
    };

    let mut current = state.graph.write().await;
    if let Err(e) = current.apply(GraphCommand::ReplaceGraph { graph }) {
        return json_error(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()).into_response();
    }
    (StatusCode::OK, Json(current.graph().clone())).into_response()
}

/// POST /graph/commands
///
/// Accepts a single command object or an array. An array is replayed
/// all-or-nothing; the response names the index of the rejected command.
pub(crate) async fn handle_apply_commands(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let commands: Vec<GraphCommand> = if body.is_array() {
        match serde_json::from_value(body) {
            Ok(c) => c,
            Err(e) => {
                return json_error(StatusCode::BAD_REQUEST, &format!("invalid commands: {}", e))
                    .into_response()
            }
        }
    } else {
        match serde_json::from_value(body) {
            Ok(c) => vec![c],
            Err(e) => {
                return json_error(StatusCode::BAD_REQUEST, &format!("invalid command: {}", e))
                    .into_response()
            }
        }
    };

    let count = commands.len();
    let mut current = state.graph.write().await;
    if let Err(e) = current.replay(commands) {
        tracing::warn!(index = e.index, error = %e.error, "graph command rejected");
        let response = serde_json::json!({
            "error": e.error.to_string(),
            "index": e.index,
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(response)).into_response();
    }

    let response = serde_json::json!({
        "applied": count,
        "graph": current.graph(),
    });
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /graph/compile
pub(crate) async fn handle_compile(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let compilation = state.graph.read().await.compile();
    let order = compilation.order.clone();
    let diagnostics = compilation.diagnostics.clone();
    let plan = compilation.into_plan().ok();

    let response = serde_json::json!({
        "ok": plan.is_some(),
        "order": order,
        "plan": plan,
        "diagnostics": diagnostics,
    });
    (StatusCode::OK, Json(response))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScopeQuery {
    kind: Option<String>,
}

/// GET /graph/nodes/{id}/scope
pub(crate) async fn handle_scope(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> impl IntoResponse {
    let kind = match query.kind.as_deref().map(str::parse::<VariableKind>) {
        None => None,
        Some(Ok(k)) => Some(k),
        Some(Err(e)) => return json_error(StatusCode::BAD_REQUEST, &e).into_response(),
    };

    let current = state.graph.read().await;
    let graph = current.graph();
    if graph.node(&id).is_none() {
        return json_error(StatusCode::NOT_FOUND, &format!("node '{}' not found", id))
            .into_response();
    }

    let resolved = ocgraph_core::resolve_variables(graph, &id);
    let mut response = serde_json::Map::new();
    response.insert("node".to_string(), serde_json::json!(id));
    for k in [VariableKind::Event, VariableKind::Object] {
        if kind.is_none() || kind == Some(k) {
            response.insert(k.to_string(), serde_json::json!(resolved.of_kind(k)));
        }
    }
    (StatusCode::OK, Json(serde_json::Value::Object(response))).into_response()
}

/// POST /evaluate
///
/// Compiles the current graph and sends the plan. Compile failures are
/// reported with every diagnostic; nothing is sent in that case.
pub(crate) async fn handle_evaluate(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let compilation = state.graph.read().await.compile();
    let plan = match compilation.into_plan() {
        Ok(p) => p,
        Err(e) => {
            let response = serde_json::json!({
                "error": e.to_string(),
                "diagnostics": e.diagnostics,
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(response)).into_response();
        }
    };

    match state.orchestrator.evaluate(&plan).await {
        Ok(EvaluationOutcome::Applied(view)) => {
            let response = serde_json::json!({
                "status": "applied",
                "summary": view.summary(),
                "results": view,
            });
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(EvaluationOutcome::Stale) => {
            let response = serde_json::json!({ "status": "stale" });
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let status = match &e {
                EvalError::InProgress => StatusCode::CONFLICT,
                EvalError::Transport { .. }
                | EvalError::Malformed(_)
                | EvalError::LengthMismatch { .. } => StatusCode::BAD_GATEWAY,
            };
            json_error(status, &e.to_string()).into_response()
        }
    }
}

/// GET /evaluation
pub(crate) async fn handle_get_evaluation(
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let response = serde_json::json!({
        "evaluating": state.orchestrator.is_evaluating(),
        "generation": state.orchestrator.generation(),
        "results": state.orchestrator.results().await,
    });
    (StatusCode::OK, Json(response))
}

/// DELETE /evaluation
pub(crate) async fn handle_clear_evaluation(
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    state.orchestrator.clear().await;
    tracing::info!(generation = state.orchestrator.generation(), "evaluation cleared");
    let response = serde_json::json!({
        "status": "cleared",
        "generation": state.orchestrator.generation(),
    });
    (StatusCode::OK, Json(response))
}
