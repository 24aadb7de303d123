use ocgraph_interchange::InterchangeError;

/// Failure of an evaluation round trip. Prior results are kept whenever
/// one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("evaluation failed: an evaluation is already in progress")]
    InProgress,

    /// The evaluator could not be reached or answered with an error status.
    #[error("evaluation failed: {evaluator} transport error: {message}")]
    Transport { evaluator: String, message: String },

    #[error("evaluation failed: malformed response: {0}")]
    Malformed(#[from] InterchangeError),

    /// Results are matched to plan entries by position, so the counts must agree.
    #[error("evaluation failed: expected {expected} results, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

impl EvalError {
    pub fn transport(evaluator: &str, message: impl Into<String>) -> Self {
        EvalError::Transport {
            evaluator: evaluator.to_string(),
            message: message.into(),
        }
    }
}
