// Calc Values
// Tagged data carried by tree nodes, the sentinels, and the numeric/string combinators

use crate::operator::{Operator, RelationalOperator};
use std::fmt;

/// Kind tag of a [`Value`]; also the result of type checking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Absence: nothing to compute, or an unresolved name
    None,
    /// Type failure
    Invalid,
    Number,
    String,
    Boolean,
    VariableRef,
    Operator,
    RelationalOperator,
}

impl Kind {
    /// Kinds that can be stored in an environment and printed as a result
    pub fn is_literal(self) -> bool {
        matches!(self, Kind::Number | Kind::String | Kind::Boolean)
    }

    pub fn is_sentinel(self) -> bool {
        matches!(self, Kind::None | Kind::Invalid)
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::None => "NONE",
            Kind::Invalid => "INVALID",
            Kind::Number => "NUMBER",
            Kind::String => "STRING",
            Kind::Boolean => "BOOLEAN",
            Kind::VariableRef => "VARIABLE",
            Kind::Operator => "OPERATOR",
            Kind::RelationalOperator => "RELATIONAL_OPERATOR",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single datum: a literal, a name, an operator token, or a sentinel
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Invalid,
    Number(f64),
    String(String),
    Boolean(bool),
    VariableRef(String),
    Operator(Operator),
    RelationalOperator(RelationalOperator),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::None => Kind::None,
            Value::Invalid => Kind::Invalid,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Boolean(_) => Kind::Boolean,
            Value::VariableRef(_) => Kind::VariableRef,
            Value::Operator(_) => Kind::Operator,
            Value::RelationalOperator(_) => Kind::RelationalOperator,
        }
    }

    /// Leaf kinds: these never carry children in a well-formed tree
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Value::Number(_) | Value::String(_) | Value::Boolean(_) | Value::VariableRef(_)
        )
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn is_grouping(&self) -> bool {
        matches!(self, Value::Operator(Operator::Grouping))
    }

    /// Operator or relational operator, grouping included
    pub fn is_operator(&self) -> bool {
        matches!(self, Value::Operator(_) | Value::RelationalOperator(_))
    }

    /// Combine two operands with an arithmetic operator.
    ///
    /// Numbers use the operator's numeric meaning; strings only support
    /// `Sum` (concatenation). Any other pairing yields `Value::None`.
    pub fn combine(&self, operator: Operator, other: &Value) -> Value {
        match (self, other) {
            (Value::Number(lhs), Value::Number(rhs)) => operator
                .apply(*lhs, *rhs)
                .map(Value::Number)
                .unwrap_or(Value::None),
            (Value::String(lhs), Value::String(rhs)) if operator == Operator::Sum => {
                let mut joined = String::with_capacity(lhs.len() + rhs.len());
                joined.push_str(lhs);
                joined.push_str(rhs);
                Value::String(joined)
            }
            _ => Value::None,
        }
    }

    /// Compare two operands: numeric ordering, lexicographic string order,
    /// or `false < true` for booleans. Mismatched kinds yield `Value::None`.
    pub fn relate(&self, relation: RelationalOperator, other: &Value) -> Value {
        match (self, other) {
            (Value::Number(lhs), Value::Number(rhs)) => Value::Boolean(relation.holds(lhs, rhs)),
            (Value::String(lhs), Value::String(rhs)) => {
                Value::Boolean(relation.holds(lhs.as_str(), rhs.as_str()))
            }
            (Value::Boolean(lhs), Value::Boolean(rhs)) => Value::Boolean(relation.holds(lhs, rhs)),
            _ => Value::None,
        }
    }

    /// Result form shown after `= ` in the REPL
    pub fn to_display_string(&self) -> String {
        match self {
            Value::String(s) => format!("\"{s}\""),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "NONE"),
            Value::Invalid => write!(f, "INVALID"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{s}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::VariableRef(name) => write!(f, "{name}"),
            Value::Operator(op) => write!(f, "{op}"),
            Value::RelationalOperator(rop) => write!(f, "{rop}"),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

/// Significant digits used for number output
const SIGNIFICANT_DIGITS: i32 = 15;

/// Format a number with 15 significant digits, `%g` style: trailing zeros
/// dropped, exponent notation outside `1e-4 ..= 1e15`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if n == 0.0 {
        return if n.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rounding to the requested precision may bump the exponent (9.99.. -> 10),
    // so read the exponent back from the rounded scientific form.
    let scientific = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, n);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= SIGNIFICANT_DIGITS {
        let mantissa = trim_fraction(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    } else {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        trim_fraction(&format!("{n:.decimals$}")).to_string()
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_matches_percent_g() {
        assert_eq!(format_number(14.0), "14");
        assert_eq!(format_number(512.0), "512");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(-3.5), "-3.5");
        assert_eq!(format_number(1.0 / 3.0), "0.333333333333333");
        assert_eq!(format_number(1e15), "1e+15");
        assert_eq!(format_number(123456789012345.0), "123456789012345");
        assert_eq!(format_number(0.0001), "0.0001");
        assert_eq!(format_number(0.00001), "1e-05");
        assert_eq!(format_number(f64::INFINITY), "inf");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn test_combine_numbers() {
        let two = Value::Number(2.0);
        let three = Value::Number(3.0);
        assert_eq!(two.combine(Operator::Exponent, &three), Value::Number(8.0));
        assert_eq!(two.combine(Operator::Difference, &three), Value::Number(-1.0));
        assert_eq!(
            two.combine(Operator::IntegerDivide, &Value::Number(0.0)),
            Value::None
        );
    }

    #[test]
    fn test_combine_strings_only_concatenates() {
        let ab = Value::from("ab");
        let cd = Value::from("cd");
        assert_eq!(ab.combine(Operator::Sum, &cd), Value::from("abcd"));
        assert_eq!(ab.combine(Operator::Difference, &cd), Value::None);
        assert_eq!(ab.combine(Operator::Product, &cd), Value::None);
    }

    #[test]
    fn test_combine_mismatched_kinds_is_none() {
        assert_eq!(
            Value::Number(1.0).combine(Operator::Sum, &Value::from("x")),
            Value::None
        );
        assert_eq!(
            Value::VariableRef("x".into()).combine(Operator::Sum, &Value::Number(1.0)),
            Value::None
        );
    }

    #[test]
    fn test_relate() {
        assert_eq!(
            Value::Number(3.0).relate(RelationalOperator::LessThan, &Value::Number(5.0)),
            Value::Boolean(true)
        );
        assert_eq!(
            Value::from("a").relate(RelationalOperator::GreaterThan, &Value::from("b")),
            Value::Boolean(false)
        );
        assert_eq!(
            Value::Boolean(true).relate(RelationalOperator::Equal, &Value::Boolean(true)),
            Value::Boolean(true)
        );
        assert_eq!(
            Value::Boolean(true).relate(RelationalOperator::Equal, &Value::Number(1.0)),
            Value::None
        );
    }

    #[test]
    fn test_kind_classification() {
        assert!(Kind::Number.is_literal());
        assert!(!Kind::VariableRef.is_literal());
        assert!(Kind::Invalid.is_sentinel());
        assert!(Value::VariableRef("x".into()).is_terminal());
        assert!(!Value::Operator(Operator::Sum).is_terminal());
        assert_eq!(Value::Operator(Operator::Sum).kind(), Kind::Operator);
        assert_eq!(Kind::VariableRef.to_string(), "VARIABLE");
    }

    #[test]
    fn test_display_string_quotes_strings() {
        assert_eq!(Value::from("hi").to_display_string(), "\"hi\"");
        assert_eq!(Value::Number(6.0).to_display_string(), "6");
        assert_eq!(Value::Boolean(true).to_display_string(), "true");
    }
}
