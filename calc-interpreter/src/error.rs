//! Error types for the calc interpreter.
//!
//! Language-level failures are diagnostics, not errors; see
//! [`calc_parser::CalcDiagnostic`]. This module covers misuse of the
//! interpreter's own data structures.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by scope management
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("Cannot pop the root scope")]
    #[diagnostic(
        code(calc::environment::root_scope),
        help("Every pushed scope must be popped exactly once")
    )]
    CannotPopRootScope,
}

/// Result type for environment operations
pub type Result<T> = std::result::Result<T, EnvironmentError>;
