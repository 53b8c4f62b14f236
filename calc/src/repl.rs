//! REPL (Read-Eval-Print Loop) for the calc language
//!
//! Each line is one statement. Results go to stdout, diagnostics are
//! rendered through miette to stderr. Lines starting with `/` are REPL
//! commands.

use calc_interpreter::{Session, StatementOutcome, Verbosity};
use miette::Diagnostic;
use rustyline::{DefaultEditor, error::ReadlineError};
use thiserror::Error;

/// Errors that can occur in the REPL
#[derive(Debug, Error, Diagnostic)]
pub enum ReplError {
    #[error("IO error: {source}")]
    #[diagnostic(code(calc::repl::io))]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Readline error: {source}")]
    #[diagnostic(code(calc::repl::readline))]
    Readline {
        #[from]
        source: ReadlineError,
    },

    #[error("REPL command error: {message}")]
    #[diagnostic(code(calc::repl::command), help("Type /help for available commands"))]
    Command { message: String },
}

/// Interactive session: line editor plus interpreter state
pub struct ReplSession {
    /// Interactive line editor with history
    editor: DefaultEditor,

    /// Interpreter session holding the root environment
    session: Session,

    /// REPL configuration
    config: ReplConfig,

    /// Session statistics
    stats: ReplStats,
}

/// REPL configuration options
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Prompt string for input
    pub prompt: String,

    /// Enable history persistence
    pub persist_history: bool,

    /// History file path
    pub history_file: Option<String>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: ">>> ".to_string(),
            persist_history: true,
            history_file: Some(".calc_history".to_string()),
        }
    }
}

/// REPL session statistics
#[derive(Debug, Clone, Default)]
pub struct ReplStats {
    /// Number of non-empty statements evaluated
    pub statements_evaluated: usize,

    /// Number of bindings added to the session
    pub variables_bound: usize,

    /// Number of error diagnostics reported
    pub errors_encountered: usize,

    /// Total REPL commands executed
    pub commands_executed: usize,
}

impl ReplStats {
    /// Account for one evaluated statement
    pub fn record(&mut self, outcome: &StatementOutcome, bindings_added: usize) {
        if !outcome.is_empty() {
            self.statements_evaluated += 1;
        }
        self.variables_bound += bindings_added;
        self.errors_encountered += outcome.diagnostics.error_count();
    }
}

/// Result of evaluating a line in the REPL
#[derive(Debug)]
pub enum ReplResult {
    /// A statement ran (possibly producing only diagnostics)
    Statement(StatementOutcome),

    /// Executed a REPL command
    Command { message: String },

    /// Empty line
    Empty,

    /// Exit request
    Exit,
}

impl ReplSession {
    /// Create a REPL around an interpreter session
    pub fn with_config(session: Session, config: ReplConfig) -> Result<Self, ReplError> {
        let mut editor = DefaultEditor::new()?;

        if config.persist_history {
            if let Some(ref history_file) = config.history_file {
                let _ = editor.load_history(history_file); // Missing on first run
            }
        }

        Ok(Self {
            editor,
            session,
            config,
            stats: ReplStats::default(),
        })
    }

    fn is_quiet(&self) -> bool {
        self.session.config().verbosity == Verbosity::Quiet
    }

    /// Start the REPL main loop
    pub fn run(&mut self) -> Result<(), ReplError> {
        if !self.is_quiet() {
            self.print_welcome();
        }

        while let Some(line) = self.read_line()? {
            match self.evaluate_line(&line) {
                Ok(ReplResult::Exit) => break,
                Ok(result) => self.display_result(result),
                Err(error) => {
                    self.stats.errors_encountered += 1;
                    eprintln!("{:?}", miette::Report::new(error));
                }
            }
        }

        self.save_history()?;
        Ok(())
    }

    /// Read one line; `None` at end of input
    fn read_line(&mut self) -> Result<Option<String>, ReplError> {
        let prompt = if self.is_quiet() {
            ""
        } else {
            self.config.prompt.as_str()
        };

        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                Ok(Some(String::new()))
            }
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(ReplError::Readline { source: err }),
        }
    }

    /// Evaluate a line of input
    pub fn evaluate_line(&mut self, line: &str) -> Result<ReplResult, ReplError> {
        let trimmed = line.trim();
        if trimmed.starts_with('/') {
            return self.execute_command(trimmed);
        }

        let bindings_before = self.session.environment().binding_count();
        let outcome = self.session.evaluate(line);
        let bindings_after = self.session.environment().binding_count();
        self.stats
            .record(&outcome, bindings_after.saturating_sub(bindings_before));

        if outcome.is_empty() {
            Ok(ReplResult::Empty)
        } else {
            Ok(ReplResult::Statement(outcome))
        }
    }

    /// Execute a REPL command
    fn execute_command(&mut self, command: &str) -> Result<ReplResult, ReplError> {
        self.stats.commands_executed += 1;

        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(ReplResult::Empty);
        }

        match parts[0] {
            "/help" | "/h" => Ok(ReplResult::Command {
                message: self.help_message(),
            }),

            "/vars" | "/variables" => Ok(ReplResult::Command {
                message: self.format_variables(),
            }),

            "/clear" => {
                self.session.clear_bindings();
                Ok(ReplResult::Command {
                    message: "Bindings cleared".to_string(),
                })
            }

            "/stats" => Ok(ReplResult::Command {
                message: self.format_stats(),
            }),

            "/quit" | "/q" | "/exit" => Ok(ReplResult::Exit),

            unknown => Err(ReplError::Command {
                message: format!("Unknown command: {unknown}. Type /help for available commands."),
            }),
        }
    }

    /// Display the result of evaluation
    fn display_result(&self, result: ReplResult) {
        match result {
            ReplResult::Statement(outcome) => print_outcome(&outcome),
            ReplResult::Command { message } => println!("{message}"),
            ReplResult::Empty => {}
            ReplResult::Exit => {} // Handled by caller
        }
    }

    fn print_welcome(&self) {
        println!("calc v{}", env!("CARGO_PKG_VERSION"));
        println!("Type /help for commands, /quit to exit");
        println!();
    }

    /// Save history to file
    fn save_history(&mut self) -> Result<(), ReplError> {
        if self.config.persist_history {
            if let Some(ref history_file) = self.config.history_file {
                self.editor.save_history(history_file)?;
            }
        }
        Ok(())
    }

    fn help_message(&self) -> String {
        r#"calc REPL Commands:
  /help, /h           Show this help message
  /vars, /variables   List every binding, innermost scope first
  /clear              Drop all bindings
  /stats              Show session statistics
  /quit, /q, /exit    Exit the REPL

Examples:
  2 + 3 * 4                    # = 14
  2 ^ 3 ^ 2                    # = 512
  let x = 5                    # Bind a name for the rest of the session
  x * y where y = 2            # Local binding for one statement
  "ab" + "cd"                  # String concatenation
  3 < 5                        # = true

Operators: ^ | % \ * / + -  and  = != < > <= >=

Use Ctrl+C to interrupt, Ctrl+D to exit."#
            .to_string()
    }

    /// Format current bindings for display
    fn format_variables(&self) -> String {
        let bindings = self.session.environment().all_bindings();
        if bindings.is_empty() {
            return "No variables defined".to_string();
        }

        let mut lines = vec!["Variables:".to_string()];
        for (_, binding) in bindings {
            lines.push(format!(
                "  [{}] --> [{}]",
                binding.name,
                binding.value.to_display_string()
            ));
        }
        lines.join("\n")
    }

    fn format_stats(&self) -> String {
        format!(
            r#"Session Statistics:
  Statements evaluated: {}
  Variables bound: {}
  Errors encountered: {}
  Commands executed: {}"#,
            self.stats.statements_evaluated,
            self.stats.variables_bound,
            self.stats.errors_encountered,
            self.stats.commands_executed
        )
    }
}

/// Print a statement's diagnostics (stderr), echo and value (stdout)
pub fn print_outcome(outcome: &StatementOutcome) {
    for report in outcome.diagnostics.create_reports() {
        eprintln!("{report:?}");
    }
    if let Some(echo) = &outcome.echo {
        println!("{echo}");
    }
    if let Some(result) = outcome.result_line() {
        println!("{result}");
    }
}
