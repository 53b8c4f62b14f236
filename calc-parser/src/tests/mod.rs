//! Unit tests for tree construction, fragment stacking, expression reading and rendering

pub mod test_diagnostics_unit;
pub mod test_expression_reader;

use crate::tree::{ExpressionTree, NodeId};
use crate::value::{format_number, Value};

/// Prefix notation of a tree: `(+ 2 (* 3 4))`, `_` for a missing child
pub(crate) fn sexpr(tree: &ExpressionTree) -> String {
    fn token(value: &Value) -> String {
        match value {
            Value::Number(n) => format_number(*n),
            Value::String(s) => format!("{s:?}"),
            Value::Operator(op) if op.is_grouping() => "group".to_string(),
            other => other.to_string(),
        }
    }

    fn node(tree: &ExpressionTree, id: NodeId) -> String {
        match (tree.left(id), tree.right(id)) {
            (None, None) => token(tree.value(id)),
            (left, right) => format!(
                "({} {} {})",
                token(tree.value(id)),
                left.map_or_else(|| "_".to_string(), |l| node(tree, l)),
                right.map_or_else(|| "_".to_string(), |r| node(tree, r)),
            ),
        }
    }

    tree.root().map(|root| node(tree, root)).unwrap_or_default()
}
