//! ocgraph-interchange: evaluator response types and validation.
//!
//! Provides typed structs for the JSON the external evaluator returns for
//! a plan, and a single `from_response()` entry point that deserializes a
//! `serde_json::Value` into an `EvaluationResponse` and checks that every
//! binding points into the returned id tables.
//!
//! This crate does not depend on the compiler. Results are positional:
//! entry `i` belongs to entry `i` of the plan that was sent, and matching
//! them up is left to the consumer.

pub mod deserialize;
pub mod types;

pub use deserialize::{from_response, parse_response, validate, InterchangeError};
pub use types::*;
