// Calc Operators
// Arithmetic and relational operator glyphs plus the fixed priority table used by tree insertion

use std::fmt;

/// Arithmetic operators, including the grouping pseudo-operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Parenthesized group: only ever has a right child
    Grouping,
    Exponent,
    Logarithm,
    Modulus,
    IntegerDivide,
    Product,
    Quotient,
    Sum,
    Difference,
}

/// Relational operators; always the outermost (loosest) nodes of a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationalOperator {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
}

/// Priority tiers, tightest first.
///
/// `Literal` is the tier of every terminal node; it is never the tier of an
/// operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    Literal,
    Grouping,
    Exponent,
    Logarithm,
    Modulus,
    IntegerDivide,
    Product,
    Quotient,
    Sum,
    Difference,
}

/// Every arithmetic glyph recognised by the tokenizer, `(` and `)` included
pub const OPERATOR_GLYPHS: &str = "()^|%\\*/+-";

impl Operator {
    /// Map a single glyph onto its operator. Both parentheses map to `Grouping`.
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '(' | ')' => Some(Operator::Grouping),
            '^' => Some(Operator::Exponent),
            '|' => Some(Operator::Logarithm),
            '%' => Some(Operator::Modulus),
            '\\' => Some(Operator::IntegerDivide),
            '*' => Some(Operator::Product),
            '/' => Some(Operator::Quotient),
            '+' => Some(Operator::Sum),
            '-' => Some(Operator::Difference),
            _ => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Operator::Grouping => '(',
            Operator::Exponent => '^',
            Operator::Logarithm => '|',
            Operator::Modulus => '%',
            Operator::IntegerDivide => '\\',
            Operator::Product => '*',
            Operator::Quotient => '/',
            Operator::Sum => '+',
            Operator::Difference => '-',
        }
    }

    /// Long-form name used in diagnostics and `/vars` style listings
    pub fn name(self) -> &'static str {
        match self {
            Operator::Grouping => "PARENTHESIZED GROUP",
            Operator::Exponent => "EXPONENTIATION",
            Operator::Logarithm => "LOGARITHM",
            Operator::Modulus => "MODULUS",
            Operator::IntegerDivide => "INTEGER DIVISION",
            Operator::Product => "PRODUCT",
            Operator::Quotient => "QUOTIENT",
            Operator::Sum => "SUM",
            Operator::Difference => "DIFFERENCE",
        }
    }

    pub fn precedence(self) -> Precedence {
        match self {
            Operator::Grouping => Precedence::Grouping,
            Operator::Exponent => Precedence::Exponent,
            Operator::Logarithm => Precedence::Logarithm,
            Operator::Modulus => Precedence::Modulus,
            Operator::IntegerDivide => Precedence::IntegerDivide,
            Operator::Product => Precedence::Product,
            Operator::Quotient => Precedence::Quotient,
            Operator::Sum => Precedence::Sum,
            Operator::Difference => Precedence::Difference,
        }
    }

    pub fn is_grouping(self) -> bool {
        self == Operator::Grouping
    }

    /// Apply the operator to two numbers.
    ///
    /// Returns `None` for the grouping operator and for an integer division
    /// whose truncated divisor is zero.
    pub fn apply(self, lhs: f64, rhs: f64) -> Option<f64> {
        match self {
            Operator::Grouping => None,
            Operator::Exponent => Some(lhs.powf(rhs)),
            Operator::Logarithm => Some(lhs.ln() / rhs.ln()),
            Operator::Modulus => Some(lhs % rhs),
            Operator::IntegerDivide => {
                // Both operands are truncated first; large magnitudes saturate.
                let divisor = rhs as i64;
                if divisor == 0 {
                    return None;
                }
                Some((lhs as i64).wrapping_div(divisor) as f64)
            }
            Operator::Product => Some(lhs * rhs),
            Operator::Quotient => Some(lhs / rhs),
            Operator::Sum => Some(lhs + rhs),
            Operator::Difference => Some(lhs - rhs),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

impl RelationalOperator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(RelationalOperator::Equal),
            "!=" => Some(RelationalOperator::NotEqual),
            "<" => Some(RelationalOperator::LessThan),
            ">" => Some(RelationalOperator::GreaterThan),
            "<=" => Some(RelationalOperator::LessThanOrEqual),
            ">=" => Some(RelationalOperator::GreaterThanOrEqual),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            RelationalOperator::Equal => "=",
            RelationalOperator::NotEqual => "!=",
            RelationalOperator::LessThan => "<",
            RelationalOperator::GreaterThan => ">",
            RelationalOperator::LessThanOrEqual => "<=",
            RelationalOperator::GreaterThanOrEqual => ">=",
        }
    }

    /// Compare two ordered operands. Unordered pairs (NaN) satisfy only `!=`.
    pub fn holds<T: PartialOrd + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            RelationalOperator::Equal => lhs == rhs,
            RelationalOperator::NotEqual => lhs != rhs,
            RelationalOperator::LessThan => lhs < rhs,
            RelationalOperator::GreaterThan => lhs > rhs,
            RelationalOperator::LessThanOrEqual => lhs <= rhs,
            RelationalOperator::GreaterThanOrEqual => lhs >= rhs,
        }
    }
}

impl fmt::Display for RelationalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Precedence {
    /// Priority comparison between two tiers.
    ///
    /// A lower tier binds tighter. Paired tiers (Exponent/Logarithm,
    /// Modulus/IntegerDivide, Product/Quotient, Sum/Difference) share a
    /// priority and associate to the left, so neither member binds tighter
    /// than the other. Exponent is right-associative and binds tighter than
    /// itself.
    pub fn binds_tighter_than(self, other: Precedence) -> bool {
        if self == other {
            return self == Precedence::Exponent;
        }

        match self {
            Precedence::Literal => true,
            Precedence::Exponent => self < other && other != Precedence::Logarithm,
            Precedence::Modulus => self < other && other != Precedence::IntegerDivide,
            Precedence::Product => self < other && other != Precedence::Quotient,
            Precedence::Sum => self < other && other != Precedence::Difference,
            _ => self < other,
        }
    }
}
