//! Tree walks over a finished expression: variable substitution, structural
//! validation, type inference and evaluation.
//!
//! None of these fail. Problems are reported to the [`Diagnostics`]
//! collector and the walk yields a sentinel (`false`, `Kind::None`,
//! `Kind::Invalid`, `Value::None`) for the affected subtree.

use crate::environment::{self, Environment};
use calc_parser::{CalcDiagnostic, Diagnostics, ExpressionTree, Kind, NodeId, Operator, Value};

/// Whether type checking reports arithmetic mismatches or only computes the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reporting {
    #[default]
    Report,
    Silent,
}

/// Replace every name bound in `environment` by a copy of its value.
/// Unbound names stay in place. Returns the number of replacements.
pub fn replace_vars(tree: &mut ExpressionTree, environment: &Environment) -> usize {
    let replaced = tree.substitute(|name| environment.lookup(name).cloned());
    tracing::trace!(replaced, "substituted bound names");
    replaced
}

/// Check the structure of a tree.
///
/// Literals must be leaves. A name that is still in the tree is unbound: it
/// is reported but does not fail validation. Missing operands and empty
/// parentheses are reported.
pub fn validate(tree: &ExpressionTree, diagnostics: &mut Diagnostics) -> bool {
    validate_node(tree, tree.root(), diagnostics)
}

fn validate_node(tree: &ExpressionTree, id: Option<NodeId>, diagnostics: &mut Diagnostics) -> bool {
    let Some(id) = id else {
        return false;
    };
    let node = tree.node(id);

    match &node.value {
        Value::None | Value::Invalid => false,
        Value::VariableRef(name) => {
            diagnostics.report(CalcDiagnostic::UnboundName { name: name.clone() });
            true
        }
        Value::Number(_) | Value::String(_) | Value::Boolean(_) => node.is_leaf(),
        Value::RelationalOperator(_) => {
            let left = validate_node(tree, node.left, diagnostics);
            let right = validate_node(tree, node.right, diagnostics);
            left && right
        }
        Value::Operator(Operator::Grouping) => {
            if node.right.is_none() {
                diagnostics.report(CalcDiagnostic::EmptyGroup);
            }
            validate_node(tree, node.right, diagnostics)
        }
        Value::Operator(operator) => {
            if node.left.is_none() || node.right.is_none() {
                diagnostics.report(CalcDiagnostic::MissingOperand {
                    operator: operator.glyph(),
                });
            }
            let left = validate_node(tree, node.left, diagnostics);
            let right = validate_node(tree, node.right, diagnostics);
            left && right
        }
    }
}

/// Infer the kind a tree evaluates to.
///
/// Names are looked up in `environment`; an unresolved name or a missing
/// operand has kind `None`. Operand kinds must match, so `None` against a
/// literal is a mismatch. Mismatches yield `Invalid` with a diagnostic;
/// [`Reporting::Silent`] drops the arithmetic ones, relational mismatches
/// are always reported. An `Invalid` operand was reported where it arose
/// and is passed up as is.
pub fn type_of(
    tree: &ExpressionTree,
    environment: Option<&Environment>,
    diagnostics: &mut Diagnostics,
    reporting: Reporting,
) -> Kind {
    let mut checker = TypeChecker {
        tree,
        environment,
        diagnostics,
        reporting,
    };
    checker.kind_of(tree.root())
}

struct TypeChecker<'a> {
    tree: &'a ExpressionTree,
    environment: Option<&'a Environment>,
    diagnostics: &'a mut Diagnostics,
    reporting: Reporting,
}

impl TypeChecker<'_> {
    fn kind_of(&mut self, id: Option<NodeId>) -> Kind {
        let Some(id) = id else {
            return Kind::None;
        };
        let tree = self.tree;
        let node = tree.node(id);

        match &node.value {
            Value::None | Value::Invalid => node.value.kind(),
            Value::VariableRef(name) => {
                if !node.is_leaf() {
                    return Kind::Invalid;
                }
                environment::find(self.environment, name, self.diagnostics).kind()
            }
            Value::Number(_) | Value::String(_) | Value::Boolean(_) => {
                if node.is_leaf() {
                    node.value.kind()
                } else {
                    Kind::Invalid
                }
            }
            Value::RelationalOperator(relation) => {
                let lhs = self.kind_of(node.left);
                let rhs = self.kind_of(node.right);
                if lhs == Kind::Invalid || rhs == Kind::Invalid {
                    return Kind::Invalid;
                }
                if lhs != rhs {
                    self.diagnostics.report(CalcDiagnostic::RelationalTypeMismatch {
                        operator: relation.symbol(),
                        lhs,
                        rhs,
                    });
                    return Kind::Invalid;
                }
                if lhs.is_literal() {
                    Kind::Boolean
                } else {
                    Kind::Invalid
                }
            }
            Value::Operator(Operator::Grouping) => self.kind_of(node.right),
            Value::Operator(operator) => {
                let lhs = self.kind_of(node.left);
                let rhs = self.kind_of(node.right);
                if lhs == Kind::Invalid || rhs == Kind::Invalid {
                    return Kind::Invalid;
                }

                let mismatch = CalcDiagnostic::OperatorTypeMismatch {
                    operator: operator.glyph(),
                    lhs,
                    rhs,
                };
                if lhs != rhs {
                    self.report(mismatch);
                    return Kind::Invalid;
                }
                match (operator, lhs) {
                    (Operator::Sum, Kind::Number | Kind::String | Kind::None) => lhs,
                    (_, Kind::Number) => Kind::Number,
                    // Two absent operands say nothing worth reporting
                    (_, Kind::None) => Kind::Invalid,
                    _ => {
                        self.report(mismatch);
                        Kind::Invalid
                    }
                }
            }
        }
    }

    /// Report an arithmetic mismatch unless checking silently
    fn report(&mut self, diagnostic: CalcDiagnostic) {
        if self.reporting == Reporting::Report {
            self.diagnostics.report(diagnostic);
        }
    }
}

/// Evaluate a tree whose names have been substituted.
///
/// Operand kinds that do not combine yield `Value::None`; so does integer
/// division by zero, which is also reported.
pub fn eval(tree: &ExpressionTree, diagnostics: &mut Diagnostics) -> Value {
    eval_node(tree, tree.root(), diagnostics)
}

fn eval_node(tree: &ExpressionTree, id: Option<NodeId>, diagnostics: &mut Diagnostics) -> Value {
    let Some(id) = id else {
        return Value::None;
    };
    let node = tree.node(id);

    match &node.value {
        Value::Operator(Operator::Grouping) => eval_node(tree, node.right, diagnostics),
        Value::Operator(operator) => {
            let lhs = eval_node(tree, node.left, diagnostics);
            let rhs = eval_node(tree, node.right, diagnostics);
            if *operator == Operator::IntegerDivide
                && lhs.kind() == Kind::Number
                && is_integer_zero(&rhs)
            {
                diagnostics.report(CalcDiagnostic::IntegerDivisionByZero);
                return Value::None;
            }
            lhs.combine(*operator, &rhs)
        }
        Value::RelationalOperator(relation) => {
            let lhs = eval_node(tree, node.left, diagnostics);
            let rhs = eval_node(tree, node.right, diagnostics);
            lhs.relate(*relation, &rhs)
        }
        terminal => terminal.clone(),
    }
}

/// A number that truncates to integer zero
fn is_integer_zero(value: &Value) -> bool {
    matches!(value, Value::Number(n) if *n as i64 == 0)
}
