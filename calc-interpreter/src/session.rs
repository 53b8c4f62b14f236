//! Per-statement pipeline shared by the interactive REPL and file mode.

use crate::environment::Environment;
use crate::evaluator::{eval, replace_vars, type_of, validate, Reporting};
use crate::statement::parse;
use calc_parser::{CalcDiagnostic, DiagnosticContext, Diagnostics, Kind, Value};

/// How much the session reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Skip validation and echo; silence type, "invalid" and "ill-formed" diagnostics
    Quiet,
    #[default]
    Normal,
    /// Echo fully parenthesized trees and flag incomplete expressions
    Verbose,
}

/// Session options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub verbosity: Verbosity,
    /// Print the parsed expression before its value
    pub echo: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Normal,
            echo: true,
        }
    }
}

/// Everything produced by one statement
#[derive(Debug, Clone)]
pub struct StatementOutcome {
    pub line: usize,
    /// Rendering of the parsed expression, when echo applies
    pub echo: Option<String>,
    /// Inferred kind; `None` for an empty statement
    pub kind: Option<Kind>,
    pub value: Option<Value>,
    pub diagnostics: Diagnostics,
}

impl StatementOutcome {
    /// `= 14`, `= "text"`, `= true`
    pub fn result_line(&self) -> Option<String> {
        self.value
            .as_ref()
            .map(|value| format!("= {}", value.to_display_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && !self.diagnostics.has_diagnostics()
    }
}

/// Interpreter session: the root environment plus the diagnostic context
/// of the input being read.
#[derive(Debug, Clone)]
pub struct Session {
    environment: Environment,
    config: SessionConfig,
    context: DiagnosticContext,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_source_name(config, DiagnosticContext::STANDARD_INPUT)
    }

    /// Session whose diagnostics name `source_name` (a file path, usually)
    pub fn with_source_name(config: SessionConfig, source_name: impl Into<String>) -> Self {
        Self {
            environment: Environment::new(),
            config,
            context: DiagnosticContext::new(source_name),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn context(&self) -> &DiagnosticContext {
        &self.context
    }

    /// Drop every binding made so far
    pub fn clear_bindings(&mut self) {
        self.environment.clear();
    }

    /// Run one statement through parse, finalize, substitute, validate,
    /// type check and evaluate.
    pub fn evaluate(&mut self, line: &str) -> StatementOutcome {
        let line_number = self.context.next_line();
        let mut diagnostics = Diagnostics::new(self.context.clone(), line);
        let mut outcome = StatementOutcome {
            line: line_number,
            echo: None,
            kind: None,
            value: None,
            diagnostics: Diagnostics::detached(),
        };

        if line.trim().is_empty() {
            outcome.diagnostics = diagnostics;
            return outcome;
        }

        let mut stack = parse(line, &mut self.environment, &mut diagnostics);
        let Some(mut tree) = stack.to_ast(&mut diagnostics) else {
            outcome.diagnostics = diagnostics;
            return outcome;
        };
        replace_vars(&mut tree, &self.environment);

        let quiet = self.config.verbosity == Verbosity::Quiet;
        let verbose = self.config.verbosity == Verbosity::Verbose;

        if !quiet && !validate(&tree, &mut diagnostics) && verbose {
            diagnostics.report(CalcDiagnostic::IncompleteExpression);
        }

        let kind = if quiet {
            // Relational mismatches are reported even when silent
            let mut discarded = Diagnostics::detached();
            type_of(&tree, Some(&self.environment), &mut discarded, Reporting::Silent)
        } else {
            type_of(&tree, Some(&self.environment), &mut diagnostics, Reporting::Report)
        };
        tracing::debug!(line = line_number, kind = %kind, "statement checked");

        match kind {
            kind if kind.is_literal() => {
                let echo_root = tree.root_value().is_some_and(Value::is_operator);
                if self.config.echo && !quiet && echo_root {
                    outcome.echo = Some(if verbose {
                        tree.to_verbose_string()
                    } else {
                        tree.to_compact_string()
                    });
                }

                let value = eval(&tree, &mut diagnostics);
                if value.kind().is_literal() {
                    outcome.value = Some(value);
                }
            }
            Kind::Invalid if !quiet => diagnostics.report(CalcDiagnostic::InvalidExpression),
            Kind::None if !quiet => diagnostics.report(CalcDiagnostic::IllFormedExpression),
            _ => {}
        }

        outcome.kind = Some(kind);
        outcome.diagnostics = diagnostics;
        outcome
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
