//! Deserialization and validation of evaluator responses.
//!
//! The main entry point is [`from_response`], which takes a
//! `&serde_json::Value` and produces a checked [`EvaluationResponse`].

use crate::types::*;

/// Errors while reading an evaluator response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterchangeError {
    /// The response is missing a required top-level field.
    #[error("response missing required field: '{field}'")]
    MissingField { field: String },

    /// The response does not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A node reports more violated situations than situations.
    #[error("result {node}: {violated} violated of {total} situations")]
    InconsistentCounts {
        node: usize,
        violated: usize,
        total: usize,
    },

    /// A binding points past the end of an id table.
    #[error("result {node}: {table} index {index} out of range (table has {len})")]
    BindingOutOfRange {
        node: usize,
        table: &'static str,
        index: usize,
        len: usize,
    },
}

/// Parse a response body.
pub fn parse_response(body: &str) -> Result<EvaluationResponse, InterchangeError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| InterchangeError::InvalidResponse(e.to_string()))?;
    from_response(&value)
}

/// Deserialize an evaluator response and validate it.
pub fn from_response(value: &serde_json::Value) -> Result<EvaluationResponse, InterchangeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| InterchangeError::InvalidResponse("expected a JSON object".to_string()))?;
    if !obj.contains_key("evaluationResults") {
        return Err(InterchangeError::MissingField {
            field: "evaluationResults".to_string(),
        });
    }

    let response: EvaluationResponse = serde_json::from_value(value.clone())
        .map_err(|e| InterchangeError::InvalidResponse(e.to_string()))?;
    validate(&response)?;
    Ok(response)
}

/// Check counts and binding indices against the id tables.
pub fn validate(response: &EvaluationResponse) -> Result<(), InterchangeError> {
    for (node, result) in response.evaluation_results.iter().enumerate() {
        if result.situation_violated_count > result.situation_count {
            return Err(InterchangeError::InconsistentCounts {
                node,
                violated: result.situation_violated_count,
                total: result.situation_count,
            });
        }
        for (binding, _) in &result.situations {
            check_indices(node, "event", binding.event_map.values(), response.event_ids.len())?;
            check_indices(
                node,
                "object",
                binding.object_map.values(),
                response.object_ids.len(),
            )?;
        }
    }
    Ok(())
}

fn check_indices<'a>(
    node: usize,
    table: &'static str,
    indices: impl Iterator<Item = &'a usize>,
    len: usize,
) -> Result<(), InterchangeError> {
    for &index in indices {
        if index >= len {
            return Err(InterchangeError::BindingOutOfRange {
                node,
                table,
                index,
                len,
            });
        }
    }
    Ok(())
}
