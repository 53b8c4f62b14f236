// Calc Rendering
// Infix text for trees: compact (re-parseable) and fully parenthesized

use crate::tokenizer::escape_string;
use crate::tree::{ExpressionTree, NodeId};
use crate::value::{format_number, Value};
use std::fmt;

impl ExpressionTree {
    /// Compact infix form, e.g. `(2 + 3) * 4`
    pub fn to_compact_string(&self) -> String {
        self.root()
            .map(|root| compact(self, root))
            .unwrap_or_default()
    }

    /// Every node wrapped in parentheses, e.g. `((2) + ((3) * (4)))`
    pub fn to_verbose_string(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root() {
            verbose(self, root, &mut out);
        }
        out
    }
}

impl fmt::Display for ExpressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_compact_string())
    }
}

/// Text of a single node value as it appears inside rendered trees
fn token_text(value: &Value) -> String {
    match value {
        // No unary minus in the grammar
        Value::Number(n) if *n < 0.0 => format!("(0 - {})", format_number(-*n)),
        Value::Number(n) => format_number(*n),
        Value::String(s) => format!("\"{}\"", escape_string(s)),
        Value::Boolean(true) => "<True>".to_string(),
        Value::Boolean(false) => "<False>".to_string(),
        Value::VariableRef(name) => name.clone(),
        Value::Operator(op) => op.glyph().to_string(),
        Value::RelationalOperator(rop) => rop.symbol().to_string(),
        Value::None | Value::Invalid => String::new(),
    }
}

fn compact(tree: &ExpressionTree, id: NodeId) -> String {
    let value = tree.value(id);
    let left = tree.left(id).map(|left| compact(tree, left));
    let right = tree.right(id).map(|right| compact(tree, right));

    if value.is_grouping() {
        let inner = format!("({})", right.unwrap_or_default());
        return match left {
            Some(left) => format!("{left} {inner}"),
            None => inner,
        };
    }

    [left, Some(token_text(value)), right]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn verbose(tree: &ExpressionTree, id: NodeId, out: &mut String) {
    let value = tree.value(id);
    out.push('(');
    if let Some(left) = tree.left(id) {
        verbose(tree, left, out);
    }

    if value.is_grouping() {
        if let Some(right) = tree.right(id) {
            verbose(tree, right, out);
        }
        out.push(')');
        return;
    }

    if value.is_operator() {
        out.push(' ');
        out.push_str(&token_text(value));
        out.push(' ');
    } else {
        out.push_str(&token_text(value));
    }

    if let Some(right) = tree.right(id) {
        verbose(tree, right, out);
    }
    out.push(')');
}
