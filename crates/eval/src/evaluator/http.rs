//! HTTP evaluator: POSTs the plan to `{base_url}/ocel/check-constraints`.
//!
//! Uses `ureq` (sync) wrapped in `tokio::task::spawn_blocking` to avoid
//! blocking the async runtime.

use super::Evaluator;
use crate::error::EvalError;
use async_trait::async_trait;
use ocgraph_core::Plan;
use std::time::Duration;

/// Path appended to the base URL.
pub const CHECK_CONSTRAINTS_PATH: &str = "ocel/check-constraints";

/// Default request timeout. Evaluating a large log can take a while.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub struct HttpEvaluator {
    base_url: String,
    timeout: Duration,
}

impl HttpEvaluator {
    pub fn new(base_url: &str) -> Self {
        HttpEvaluator {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, CHECK_CONSTRAINTS_PATH)
    }
}

#[async_trait]
impl Evaluator for HttpEvaluator {
    async fn check_constraints(&self, plan: &Plan) -> Result<serde_json::Value, EvalError> {
        let body = serde_json::to_value(plan)
            .map_err(|e| EvalError::transport("http", format!("failed to encode plan: {}", e)))?;
        let url = self.endpoint();
        let timeout = self.timeout;

        tracing::info!(url = %url, nodes = plan.len(), "sending plan to evaluator");

        tokio::task::spawn_blocking(move || {
            let config = ureq::Agent::config_builder()
                .timeout_global(Some(timeout))
                .build();
            let agent = ureq::Agent::new_with_config(config);

            let response = agent
                .post(&url)
                .send_json(&body)
                .map_err(|e| EvalError::transport("http", e.to_string()))?;

            response
                .into_body()
                .read_json::<serde_json::Value>()
                .map_err(|e| {
                    EvalError::transport(
                        "http",
                        format!("failed to parse response as JSON: {}", e),
                    )
                })
        })
        .await
        .map_err(|e| EvalError::transport("http", format!("task join error: {}", e)))?
    }

    fn evaluator_id(&self) -> &str {
        "http"
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
