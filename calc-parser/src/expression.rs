// Calc Expression Reader
// Feeds tokens into a fragment stack until the end of input or a non-leading keyword

use crate::diagnostics::{CalcDiagnostic, Diagnostics};
use crate::fragment::FragmentStack;
use crate::operator::{Operator, RelationalOperator};
use crate::tokenizer::{
    is_non_leading_keyword, is_number, is_operator_glyph, is_relational_start, Token, Tokenizer,
    QUOTE,
};
use crate::value::Value;

/// What the previous token was, for implicit multiplication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Previous {
    Nothing,
    Number,
    Name,
    OpenParen,
    CloseParen,
    Operator,
    Relational,
    String,
}

/// Read one expression starting at `first`.
///
/// Stops before a `where`/`and` keyword, leaving the tokenizer positioned
/// on it. A product operator is implied between `)` and a following
/// number, name or `(`, and between a number or name and a following `(`.
pub fn parse_expression(
    tokens: &mut Tokenizer<'_>,
    first: Token<'_>,
    diagnostics: &mut Diagnostics,
) -> FragmentStack {
    let mut stack = FragmentStack::new();
    let mut previous = Previous::Nothing;
    let mut token = first;

    loop {
        previous = read_token(&mut stack, tokens, token, previous, diagnostics);

        let Some(next) = tokens.next_token() else {
            break;
        };
        if is_non_leading_keyword(next.text) {
            tokens.rewind_to(next.span.start);
            break;
        }
        token = next;
    }

    stack
}

/// Read a whole string as one expression, ignoring any trailing clauses
pub fn parse_expression_str(source: &str, diagnostics: &mut Diagnostics) -> FragmentStack {
    let mut tokens = Tokenizer::new(source);
    match tokens.next_token() {
        Some(first) => parse_expression(&mut tokens, first, diagnostics),
        None => FragmentStack::new(),
    }
}

fn read_token(
    stack: &mut FragmentStack,
    tokens: &mut Tokenizer<'_>,
    token: Token<'_>,
    previous: Previous,
    diagnostics: &mut Diagnostics,
) -> Previous {
    let text = token.text;

    if is_number(text) {
        if previous == Previous::CloseParen {
            stack.insert(Value::Operator(Operator::Product));
        }
        // is_number already checked that the text parses
        let number = text.parse::<f64>().unwrap_or(f64::NAN);
        stack.insert(Value::Number(number));
        return Previous::Number;
    }

    if is_operator_glyph(text) {
        return match text {
            "(" => {
                if matches!(
                    previous,
                    Previous::CloseParen | Previous::Number | Previous::Name
                ) {
                    stack.insert(Value::Operator(Operator::Product));
                }
                stack.insert(Value::Operator(Operator::Grouping));
                stack.open_group();
                Previous::OpenParen
            }
            ")" => {
                stack.close_group(Some(token.span), diagnostics);
                Previous::CloseParen
            }
            _ => {
                if let Some(operator) = text.chars().next().and_then(Operator::from_glyph) {
                    stack.insert(Value::Operator(operator));
                }
                Previous::Operator
            }
        };
    }

    if text.starts_with(QUOTE) {
        match tokens.read_string_literal() {
            Ok(literal) => stack.insert(Value::String(literal)),
            Err(error) => diagnostics.report(CalcDiagnostic::unterminated_string(error.span)),
        }
        return Previous::String;
    }

    if is_relational_start(text) {
        let symbol = if text != "=" && tokens.eat_char('=') {
            format!("{text}=")
        } else {
            text.to_string()
        };

        match RelationalOperator::from_symbol(&symbol) {
            Some(relation) => stack.insert(Value::RelationalOperator(relation)),
            None => diagnostics.report(CalcDiagnostic::syntax(
                format!("Unknown relational operator [{symbol}]"),
                Some(token.span),
            )),
        }
        return Previous::Relational;
    }

    if previous == Previous::CloseParen {
        stack.insert(Value::Operator(Operator::Product));
    }
    stack.insert(Value::VariableRef(text.to_string()));
    Previous::Name
}
