// Calc Diagnostics
// Diagnostic types, severity levels, and the per-statement diagnostic collector

use crate::tokenizer::Span;
use crate::value::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::fmt;
use thiserror::Error;

/// Severity level for diagnostic messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Structure was repaired or something looks off; processing continues
    Warning,
    /// The statement (or part of it) cannot produce a value
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Everything the parser, checker and evaluator can report.
///
/// None of these abort processing: the reporting component returns a
/// sentinel and the statement continues with whatever structure it has.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum CalcDiagnostic {
    #[error("Syntax error: {message}")]
    #[diagnostic(code(calc::syntax::error), severity(Error))]
    Syntax {
        message: String,
        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("Syntax error: Expected additional bindings")]
    #[diagnostic(
        code(calc::syntax::expected_bindings),
        severity(Error),
        help("Local bindings look like `where name = expression and other = expression`")
    )]
    ExpectedBindings {
        #[label("binding expected here")]
        span: Option<SourceSpan>,
    },

    #[error("Syntax error: Unterminated string literal")]
    #[diagnostic(code(calc::syntax::unterminated_string), severity(Error))]
    UnterminatedString {
        #[label("string starts here")]
        span: Option<SourceSpan>,
    },

    #[error("Unmatched closing parenthesis")]
    #[diagnostic(code(calc::structure::unmatched_paren), severity(Error))]
    UnmatchedCloseParen {
        #[label("no group to close")]
        span: Option<SourceSpan>,
    },

    #[error("Unclosed parenthesis: {count} group(s) closed at end of statement")]
    #[diagnostic(code(calc::structure::unclosed_paren), severity(Warning))]
    UnclosedParen { count: usize },

    #[error("Chained onto non-operator [{found}]")]
    #[diagnostic(code(calc::structure::chained_onto_non_operator), severity(Warning))]
    ChainedOntoNonOperator { found: String },

    #[error("Runtime error: Name [{name}] not bound")]
    #[diagnostic(
        code(calc::runtime::unbound_name),
        severity(Error),
        help("Bind it first with `let {name} = ...` or a `where` clause")
    )]
    UnboundName { name: String },

    #[error("Runtime error: Operator [{operator}] expects two arguments")]
    #[diagnostic(code(calc::runtime::missing_operand), severity(Error))]
    MissingOperand { operator: char },

    #[error("Runtime error: Parentheses must not be empty")]
    #[diagnostic(code(calc::runtime::empty_group), severity(Error))]
    EmptyGroup,

    #[error("Runtime error: Integer division by zero")]
    #[diagnostic(code(calc::runtime::integer_division_by_zero), severity(Error))]
    IntegerDivisionByZero,

    #[error("Runtime error: Cannot bind [{name}] to a value of type [{kind}]")]
    #[diagnostic(code(calc::runtime::unbindable_value), severity(Error))]
    UnbindableValue { name: String, kind: Kind },

    #[error("Environment lookup of [{name}] without an environment")]
    #[diagnostic(code(calc::runtime::missing_environment), severity(Error))]
    MissingEnvironment { name: String },

    #[error(
        "Type mismatch: Operator [{operator}] cannot operate on arguments of type [{lhs}] and [{rhs}]"
    )]
    #[diagnostic(code(calc::types::operator_mismatch), severity(Error))]
    OperatorTypeMismatch { operator: char, lhs: Kind, rhs: Kind },

    #[error(
        "Type mismatch: Relational operator [{operator}] cannot operate on arguments of type [{lhs}] and [{rhs}]"
    )]
    #[diagnostic(code(calc::types::relational_mismatch), severity(Error))]
    RelationalTypeMismatch {
        operator: &'static str,
        lhs: Kind,
        rhs: Kind,
    },

    #[error("Incomplete expression!")]
    #[diagnostic(code(calc::structure::incomplete), severity(Warning))]
    IncompleteExpression,

    #[error("Invalid expression")]
    #[diagnostic(code(calc::types::invalid_expression), severity(Error))]
    InvalidExpression,

    #[error("Expression is not well-typed/well-formed")]
    #[diagnostic(code(calc::types::ill_formed), severity(Error))]
    IllFormedExpression,
}

impl CalcDiagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            CalcDiagnostic::UnclosedParen { .. }
            | CalcDiagnostic::ChainedOntoNonOperator { .. }
            | CalcDiagnostic::IncompleteExpression => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Location within the statement, for diagnostics raised while tokenizing
    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            CalcDiagnostic::Syntax { span, .. }
            | CalcDiagnostic::ExpectedBindings { span }
            | CalcDiagnostic::UnterminatedString { span }
            | CalcDiagnostic::UnmatchedCloseParen { span } => *span,
            _ => None,
        }
    }

    pub fn syntax(message: impl Into<String>, span: Option<Span>) -> Self {
        CalcDiagnostic::Syntax {
            message: message.into(),
            span: span.map(Into::into),
        }
    }

    pub fn expected_bindings(span: Option<Span>) -> Self {
        CalcDiagnostic::ExpectedBindings {
            span: span.map(Into::into),
        }
    }

    pub fn unterminated_string(span: Span) -> Self {
        CalcDiagnostic::UnterminatedString {
            span: Some(span.into()),
        }
    }

    pub fn unmatched_close_paren(span: Option<Span>) -> Self {
        CalcDiagnostic::UnmatchedCloseParen {
            span: span.map(Into::into),
        }
    }
}

/// Where a statement came from: replaces a global "current file, current line"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticContext {
    pub source_name: String,
    pub line: usize,
}

impl DiagnosticContext {
    pub const STANDARD_INPUT: &'static str = "Standard Input";

    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            line: 0,
        }
    }

    /// Context for the next statement of the same source
    pub fn next_line(&mut self) -> usize {
        self.line += 1;
        self.line
    }
}

impl Default for DiagnosticContext {
    fn default() -> Self {
        Self::new(Self::STANDARD_INPUT)
    }
}

impl fmt::Display for DiagnosticContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [Line {}]", self.source_name, self.line)
    }
}

/// Diagnostic collector for a single statement
#[derive(Debug, Clone)]
pub struct Diagnostics {
    context: DiagnosticContext,
    /// Statement text, used as the source code of labelled reports
    source: String,
    diagnostics: Vec<CalcDiagnostic>,
}

impl Diagnostics {
    pub fn new(context: DiagnosticContext, source: impl Into<String>) -> Self {
        Self {
            context,
            source: source.into(),
            diagnostics: Vec::new(),
        }
    }

    /// Collector with a default context, for callers that only inspect the entries
    pub fn detached() -> Self {
        Self::new(DiagnosticContext::default(), String::new())
    }

    pub fn report(&mut self, diagnostic: CalcDiagnostic) {
        tracing::debug!(
            source = %self.context.source_name,
            line = self.context.line,
            severity = %diagnostic.severity(),
            "{diagnostic}"
        );
        self.diagnostics.push(diagnostic);
    }

    pub fn context(&self) -> &DiagnosticContext {
        &self.context
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn diagnostics(&self) -> &[CalcDiagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<CalcDiagnostic> {
        self.diagnostics
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity() == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
            .count()
    }

    pub fn contains(&self, predicate: impl Fn(&CalcDiagnostic) -> bool) -> bool {
        self.diagnostics.iter().any(predicate)
    }

    /// One line per diagnostic: `Standard Input [Line 3]: Runtime error: ...`
    pub fn plain_messages(&self) -> Vec<String> {
        self.diagnostics
            .iter()
            .map(|d| format!("{}: {d}", self.context))
            .collect()
    }

    /// Create miette reports. Labelled diagnostics point into the statement
    /// text; the rest are wrapped with the source name and line number.
    pub fn create_reports(&self) -> Vec<miette::Report> {
        let named_source = NamedSource::new(self.context.to_string(), self.source.clone());

        self.diagnostics
            .iter()
            .map(|diagnostic| {
                let report = miette::Report::new(diagnostic.clone());
                if diagnostic.span().is_some() {
                    report.with_source_code(named_source.clone())
                } else {
                    report.wrap_err(self.context.to_string())
                }
            })
            .collect()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::detached()
    }
}
