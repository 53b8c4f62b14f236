// Calc Parser Library
// Incremental, precedence-aware expression tree construction for the calc language

pub mod diagnostics;
pub mod expression;
pub mod fragment;
pub mod operator;
pub mod render;
pub mod tokenizer;
pub mod tree;
pub mod value;

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;

pub use diagnostics::{CalcDiagnostic, DiagnosticContext, Diagnostics, Severity};
pub use expression::{parse_expression, parse_expression_str};
pub use fragment::FragmentStack;
pub use operator::{Operator, Precedence, RelationalOperator};
pub use tokenizer::{Keyword, Span, Token, Tokenizer};
pub use tree::{binds_tighter_than, ExpressionTree, Node, NodeId};
pub use value::{format_number, Kind, Value};

/// Parse a single expression (no `let`/`where`) straight to its tree
pub fn parse_tree(source: &str, diagnostics: &mut Diagnostics) -> Option<ExpressionTree> {
    parse_expression_str(source, diagnostics).to_ast(diagnostics)
}

// Version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
