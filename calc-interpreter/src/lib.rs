//! Calc interpreter: the environment chain, the tree walks (substitution,
//! validation, type inference, evaluation), the statement parser and the
//! per-statement session pipeline.

pub mod environment;
pub mod error;
pub mod evaluator;
pub mod session;
pub mod statement;

#[cfg(test)]
#[path = "tests/mod.rs"]
pub mod tests;

// Re-export public API
pub use environment::{Binding, Environment, Scope};
pub use error::{EnvironmentError, Result};
pub use evaluator::{eval, replace_vars, type_of, validate, Reporting};
pub use session::{Session, SessionConfig, StatementOutcome, Verbosity};
pub use statement::parse;

/// Evaluate a single statement in a fresh session and return its value
pub fn evaluate_from_string(source: &str) -> Option<calc_parser::Value> {
    Session::default().evaluate(source).value
}
