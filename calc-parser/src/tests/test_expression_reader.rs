use super::sexpr;
use crate::diagnostics::{CalcDiagnostic, Diagnostics};
use crate::expression::{parse_expression, parse_expression_str};
use crate::parse_tree;
use crate::tokenizer::{Span, Tokenizer};
use pretty_assertions::assert_eq;

fn read(source: &str) -> (String, Diagnostics) {
    let mut diagnostics = Diagnostics::detached();
    let shape = parse_tree(source, &mut diagnostics)
        .map(|tree| sexpr(&tree))
        .unwrap_or_default();
    (shape, diagnostics)
}

fn shape(source: &str) -> String {
    let (shape, diagnostics) = read(source);
    assert!(
        !diagnostics.has_diagnostics(),
        "unexpected diagnostics for {source:?}: {:?}",
        diagnostics.diagnostics()
    );
    shape
}

#[test]
fn test_precedence_from_text() {
    assert_eq!(shape("2 + 3 * 4"), "(+ 2 (* 3 4))");
    assert_eq!(shape("2+3*4"), "(+ 2 (* 3 4))");
    assert_eq!(shape("10 - 3 % 2"), "(- 10 (% 3 2))");
    assert_eq!(shape("10 \\ 3 % 2"), "(% (\\ 10 3) 2)");
    assert_eq!(shape("2 ^ 3 ^ 2"), "(^ 2 (^ 3 2))");
}

#[test]
fn test_parentheses_override_precedence() {
    assert_eq!(shape("(2 + 3) * 4"), "(* (group _ (+ 2 3)) 4)");
    assert_eq!(shape("(2 ^ 3) ^ 2"), "(^ (group _ (^ 2 3)) 2)");
    assert_eq!(shape("8 - (3 - 2)"), "(- 8 (group _ (- 3 2)))");
}

#[test]
fn test_implicit_multiplication() {
    assert_eq!(shape("2(3)"), "(* 2 (group _ 3))");
    assert_eq!(shape("(2)(3)"), "(* (group _ 2) (group _ 3))");
    assert_eq!(shape("(2)x"), "(* (group _ 2) x)");
    assert_eq!(shape("x(2)"), "(* x (group _ 2))");
    assert_eq!(shape("(2)3"), "(* (group _ 2) 3)");
}

#[test]
fn test_relational_symbols() {
    assert_eq!(shape("a <= b"), "(<= a b)");
    assert_eq!(shape("a>=b"), "(>= a b)");
    assert_eq!(shape("a != b"), "(!= a b)");
    assert_eq!(shape("a = b"), "(= a b)");
    assert_eq!(shape("1 + 2 < 2 * 3"), "(< (+ 1 2) (* 2 3))");
}

#[test]
fn test_lone_bang_is_a_syntax_error() {
    let (shape, diagnostics) = read("!a");
    assert_eq!(shape, "a");
    assert_eq!(
        diagnostics.diagnostics(),
        &[CalcDiagnostic::syntax(
            "Unknown relational operator [!]",
            Some(Span::new(0, 1))
        )]
    );
}

#[test]
fn test_string_literals() {
    assert_eq!(shape(r#""ab" + "cd""#), r#"(+ "ab" "cd")"#);
    assert_eq!(shape(r#""a b" = "a\"b""#), r#"(= "a b" "a\"b")"#);
}

#[test]
fn test_unterminated_string_is_reported() {
    let (shape, diagnostics) = read(r#""ab"#);
    assert_eq!(shape, "");
    assert!(diagnostics.contains(|d| matches!(d, CalcDiagnostic::UnterminatedString { .. })));
}

#[test]
fn test_unmatched_close_paren_keeps_going() {
    let (shape, diagnostics) = read("2 + 3) * 4");
    assert_eq!(shape, "(+ 2 (* 3 4))");
    assert_eq!(
        diagnostics.diagnostics(),
        &[CalcDiagnostic::unmatched_close_paren(Some(Span::new(5, 6)))]
    );
}

#[test]
fn test_unclosed_paren_is_a_warning() {
    let (shape, diagnostics) = read("(2 + 3");
    assert_eq!(shape, "(group _ (+ 2 3))");
    assert_eq!(diagnostics.warning_count(), 1);
    assert_eq!(diagnostics.error_count(), 0);
}

#[test]
fn test_names_and_numbers() {
    assert_eq!(shape("inf"), "inf");
    assert_eq!(shape(".5 + x1"), "(+ 0.5 x1)");
    assert_eq!(shape("1e3"), "1000");
}

#[test]
fn test_stops_before_clause_keyword() {
    let source = "x + 1 where x = 2";
    let mut tokens = Tokenizer::new(source);
    let first = tokens.next_token().unwrap();
    let mut diagnostics = Diagnostics::detached();

    let mut stack = parse_expression(&mut tokens, first, &mut diagnostics);
    assert_eq!(tokens.rest(), "where x = 2");

    let tree = stack.to_ast(&mut diagnostics).unwrap();
    assert_eq!(sexpr(&tree), "(+ x 1)");
}

#[test]
fn test_empty_source_yields_empty_stack() {
    let mut diagnostics = Diagnostics::detached();
    let stack = parse_expression_str("   ", &mut diagnostics);
    assert!(stack.top().is_empty());
    assert_eq!(stack.height(), 1);
}
