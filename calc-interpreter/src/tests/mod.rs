//! Acceptance tests for the calc interpreter
//!
//! These drive whole statements through [`crate::Session`], the same path
//! the REPL and file mode take.
