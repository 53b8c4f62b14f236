//! Statement parser: `let` bindings, plain expressions, and trailing
//! `where` / `and` clauses.
//!
//! ```text
//! statement := "let" NAME "=" statement
//!            | expression [ clause ]
//! clause    := ("where" | "and") NAME "=" expression [ clause ]
//! ```

use crate::environment::Environment;
use crate::evaluator::{eval, replace_vars, type_of, validate, Reporting};
use calc_parser::tokenizer::{
    is_leading_keyword, is_non_leading_keyword, is_number, is_operator_glyph, is_relational_start,
    ASSIGN, QUOTE,
};
use calc_parser::{
    parse_expression, CalcDiagnostic, Diagnostics, ExpressionTree, FragmentStack, Keyword, Token,
    Tokenizer, Value,
};

/// Parse one input line into a fragment stack.
///
/// `let` statements are evaluated and bound here; the returned stack then
/// holds just the bound value. `where` clauses are bound in a child scope
/// that is substituted into the expression and discarded before returning.
pub fn parse(line: &str, environment: &mut Environment, diagnostics: &mut Diagnostics) -> FragmentStack {
    let mut tokens = Tokenizer::new(line);
    parse_statement(&mut tokens, environment, diagnostics)
}

fn parse_statement(
    tokens: &mut Tokenizer<'_>,
    environment: &mut Environment,
    diagnostics: &mut Diagnostics,
) -> FragmentStack {
    let Some(first) = tokens.next_token() else {
        return FragmentStack::new();
    };

    if Keyword::from_word(first.text) == Some(Keyword::Let) {
        let mut stack = FragmentStack::new();
        stack.insert(let_binding(tokens, first, environment, diagnostics));
        return stack;
    }

    if is_non_leading_keyword(first.text) {
        diagnostics.report(CalcDiagnostic::syntax(
            format!("Expected an expression before [{}]", first.text),
            Some(first.span),
        ));
        return FragmentStack::new();
    }

    let mut stack = parse_expression(tokens, first, diagnostics);
    if let Some(keyword) = tokens.next_token() {
        where_binding(tokens, keyword, &mut stack, environment, diagnostics);
    }
    stack
}

/// Whether a token can be bound to
fn is_name(text: &str) -> bool {
    !(is_number(text)
        || is_operator_glyph(text)
        || is_relational_start(text)
        || text.starts_with(QUOTE)
        || is_leading_keyword(text)
        || is_non_leading_keyword(text))
}

/// `let NAME = statement`: evaluate the right side and bind it in the
/// current scope. Returns the bound value, or `None` when nothing was bound.
fn let_binding(
    tokens: &mut Tokenizer<'_>,
    keyword: Token<'_>,
    environment: &mut Environment,
    diagnostics: &mut Diagnostics,
) -> Value {
    let name = tokens.next_token();
    let assign = tokens.next_token();

    let name = match (name, assign) {
        (Some(name), Some(assign)) if is_name(name.text) && assign.text == ASSIGN => name,
        (name, _) => {
            let span = name.map_or(keyword.span, |token| token.span);
            diagnostics.report(CalcDiagnostic::syntax(
                "Expected `let NAME = expression`",
                Some(span),
            ));
            return Value::None;
        }
    };

    let mut stack = parse_statement(tokens, environment, diagnostics);
    let Some(mut tree) = stack.to_ast(diagnostics) else {
        diagnostics.report(CalcDiagnostic::syntax(
            format!("Expected an expression to bind to [{}]", name.text),
            Some(name.span),
        ));
        return Value::None;
    };

    replace_vars(&mut tree, environment);
    validate(&tree, diagnostics);
    type_of(&tree, Some(environment), diagnostics, Reporting::Report);

    let value = eval(&tree, diagnostics);
    environment.bind(name.text, value.clone(), diagnostics);
    value
}

/// A clause whose body could not be typed yet
struct DeferredClause {
    name: String,
    tree: ExpressionTree,
}

/// Bind a chain of `where` / `and` clauses in a child scope, then
/// substitute them into every fragment of `stack`.
fn where_binding(
    tokens: &mut Tokenizer<'_>,
    keyword: Token<'_>,
    stack: &mut FragmentStack,
    environment: &mut Environment,
    diagnostics: &mut Diagnostics,
) {
    environment.push_scope();
    bind_clauses(tokens, keyword, environment, diagnostics);

    for fragment in stack.fragments_mut() {
        replace_vars(fragment, environment);
    }

    if let Err(error) = environment.pop_scope() {
        tracing::error!(%error, "where clause scope already popped");
    }
}

/// Bind clauses left to right.
///
/// A clause whose names all resolve is bound immediately, so later clauses
/// can use it. A clause that still mentions an unbound name after
/// substitution is deferred and bound after every later clause, the last
/// deferred clause first.
fn bind_clauses(
    tokens: &mut Tokenizer<'_>,
    first_keyword: Token<'_>,
    environment: &mut Environment,
    diagnostics: &mut Diagnostics,
) {
    let mut deferred = Vec::new();
    let mut keyword = Some(first_keyword);

    while let Some(current) = keyword.take() {
        let Some((name, mut tree)) = read_clause(tokens, current, diagnostics) else {
            break;
        };

        replace_vars(&mut tree, environment);

        if has_unbound_names(&tree) {
            tracing::debug!(name = %name, "deferring clause");
            deferred.push(DeferredClause { name, tree });
        } else {
            type_of(&tree, Some(environment), diagnostics, Reporting::Silent);
            let value = eval(&tree, diagnostics);
            environment.bind(&name, value, diagnostics);
        }

        keyword = tokens.next_token();
    }

    for DeferredClause { name, mut tree } in deferred.into_iter().rev() {
        replace_vars(&mut tree, environment);
        let value = eval(&tree, diagnostics);
        environment.bind(&name, value, diagnostics);
    }
}

/// Whether substitution left any name in the tree
fn has_unbound_names(tree: &ExpressionTree) -> bool {
    tree.values()
        .into_iter()
        .any(|value| matches!(value, Value::VariableRef(_)))
}

/// Read `NAME = expression` after a clause keyword
fn read_clause(
    tokens: &mut Tokenizer<'_>,
    keyword: Token<'_>,
    diagnostics: &mut Diagnostics,
) -> Option<(String, ExpressionTree)> {
    if !is_non_leading_keyword(keyword.text) {
        diagnostics.report(CalcDiagnostic::expected_bindings(Some(keyword.span)));
        return None;
    }

    let name = tokens.next_token();
    let assign = tokens.next_token();
    let name = match (name, assign) {
        (Some(name), Some(assign)) if is_name(name.text) && assign.text == ASSIGN => name,
        _ => {
            diagnostics.report(CalcDiagnostic::expected_bindings(Some(keyword.span)));
            return None;
        }
    };

    let body = match tokens.next_token() {
        Some(token) if !is_non_leading_keyword(token.text) => token,
        other => {
            if let Some(token) = other {
                tokens.rewind_to(token.span.start);
            }
            diagnostics.report(CalcDiagnostic::expected_bindings(Some(name.span)));
            return None;
        }
    };

    let mut stack = parse_expression(tokens, body, diagnostics);
    match stack.to_ast(diagnostics) {
        Some(tree) => Some((name.text.to_string(), tree)),
        None => {
            diagnostics.report(CalcDiagnostic::expected_bindings(Some(name.span)));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(line: &str, environment: &mut Environment) -> (Value, Diagnostics) {
        let mut diagnostics = Diagnostics::detached();
        let mut stack = parse(line, environment, &mut diagnostics);
        let value = match stack.to_ast(&mut diagnostics) {
            Some(mut tree) => {
                replace_vars(&mut tree, environment);
                eval(&tree, &mut diagnostics)
            }
            None => Value::None,
        };
        (value, diagnostics)
    }

    #[test]
    fn test_let_binds_in_root_scope() {
        let mut env = Environment::new();
        let (value, diagnostics) = run("let x = 5", &mut env);

        assert_eq!(value, Value::Number(5.0));
        assert!(!diagnostics.has_diagnostics());
        assert_eq!(env.find("x"), Value::Number(5.0));
        assert_eq!(run("x + 1", &mut env).0, Value::Number(6.0));
    }

    #[test]
    fn test_let_with_where_clause() {
        let mut env = Environment::new();
        let (value, _) = run("let area = w * h where w = 3 and h = 4", &mut env);

        assert_eq!(value, Value::Number(12.0));
        assert_eq!(env.find("area"), Value::Number(12.0));
        assert_eq!(env.find("w"), Value::None);
        assert_eq!(env.scope_depth(), 0);
    }

    #[test]
    fn test_nested_let() {
        let mut env = Environment::new();
        let (value, _) = run("let a = let b = 2", &mut env);

        assert_eq!(value, Value::Number(2.0));
        assert_eq!(env.find("a"), Value::Number(2.0));
        assert_eq!(env.find("b"), Value::Number(2.0));
    }

    #[test]
    fn test_where_scope_is_discarded() {
        let mut env = Environment::new();
        let (value, diagnostics) = run("y where y = 2 and z = y + 1", &mut env);

        assert_eq!(value, Value::Number(2.0));
        assert!(!diagnostics.has_diagnostics());
        assert_eq!(env.find("y"), Value::None);
        assert_eq!(env.find("z"), Value::None);
        assert_eq!(env.scope_depth(), 0);
    }

    #[test]
    fn test_later_clauses_see_earlier_ones() {
        let mut env = Environment::new();
        let (value, _) = run("z where y = 2 and z = y + 1", &mut env);
        assert_eq!(value, Value::Number(3.0));
    }

    #[test]
    fn test_clause_may_refer_to_later_clause() {
        let mut env = Environment::new();
        let (value, _) = run("x where x = y * 2 and y = 3", &mut env);
        assert_eq!(value, Value::Number(6.0));

        let (value, _) = run("a where a = b + 1 and b = c + 1 and c = 1", &mut env);
        assert_eq!(value, Value::Number(3.0));
    }

    #[test]
    fn test_relational_clause_may_refer_to_later_clause() {
        let mut env = Environment::new();
        let (value, diagnostics) = run("ok where ok = n < 5 and n = 2", &mut env);

        assert_eq!(value, Value::Boolean(true));
        assert!(!diagnostics.has_diagnostics());
    }

    #[test]
    fn test_where_shadows_session_binding() {
        let mut env = Environment::new();
        run("let x = 10", &mut env);

        assert_eq!(run("x where x = 1", &mut env).0, Value::Number(1.0));
        assert_eq!(run("x", &mut env).0, Value::Number(10.0));
    }

    #[test]
    fn test_missing_bindings_are_reported() {
        let mut env = Environment::new();
        for line in ["x where", "x where y", "x where y =", "x where y = 1 and"] {
            let (_, diagnostics) = run(line, &mut env);
            assert!(
                diagnostics.contains(|d| matches!(d, CalcDiagnostic::ExpectedBindings { .. })),
                "{line:?}"
            );
            assert_eq!(env.scope_depth(), 0);
        }
    }

    #[test]
    fn test_malformed_let_is_reported() {
        let mut env = Environment::new();
        for line in ["let", "let x", "let x 5", "let 5 = 5", "let x ="] {
            let (value, diagnostics) = run(line, &mut env);
            assert_eq!(value, Value::None, "{line:?}");
            assert!(diagnostics.has_errors(), "{line:?}");
        }
        assert_eq!(env.binding_count(), 0);
    }

    #[test]
    fn test_let_binds_strings_and_booleans() {
        let mut env = Environment::new();
        run(r#"let s = "ab" + "cd""#, &mut env);
        run("let b = 1 < 2", &mut env);

        assert_eq!(env.find("s"), Value::from("abcd"));
        assert_eq!(env.find("b"), Value::Boolean(true));
    }

    #[test]
    fn test_let_of_unbound_name_binds_nothing() {
        let mut env = Environment::new();
        let (value, diagnostics) = run("let x = y", &mut env);

        assert_eq!(value, Value::VariableRef("y".to_string()));
        assert_eq!(env.binding_count(), 0);
        assert!(diagnostics.contains(|d| matches!(d, CalcDiagnostic::UnboundName { .. })));
    }

    #[test]
    fn test_leading_clause_keyword_is_an_error() {
        let mut env = Environment::new();
        let (value, diagnostics) = run("where x = 1", &mut env);
        assert_eq!(value, Value::None);
        assert!(diagnostics.has_errors());
    }
}
