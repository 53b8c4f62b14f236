use calc_interpreter::{Session, SessionConfig, Verbosity};
use clap::Parser;
use miette::MietteHandlerOpts;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

mod repl;

use repl::{ReplConfig, ReplError, ReplSession, print_outcome};

#[derive(Parser, Debug)]
#[command(
    name = "calc",
    version,
    about = "Interactive evaluator for a small expression language",
    long_about = "Evaluates arithmetic, string concatenation and comparisons, one statement per line.\n\
                  Names are bound with `let NAME = expression` for the rest of the session, or with\n\
                  `expression where NAME = expression and NAME = expression` for a single statement."
)]
struct Cli {
    /// Quiet: suppress prompts, echo and most diagnostics
    #[arg(short, long, overrides_with = "verbose")]
    quiet: bool,

    /// Verbose: fully parenthesized echo and extra diagnostics
    #[arg(short, long, overrides_with = "quiet")]
    verbose: bool,

    /// Don't echo the parsed expression
    #[arg(long)]
    no_echo: bool,

    /// Read statements from FILE instead of the terminal
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Anything after FILE is ignored
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    ignored: Vec<String>,
}

impl Cli {
    fn session_config(&self) -> SessionConfig {
        let verbosity = if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        SessionConfig {
            verbosity,
            echo: !self.no_echo,
        }
    }
}

fn main() {
    setup_miette_handler();
    init_tracing();

    let cli = Cli::parse();
    if let Some(first) = cli.ignored.first() {
        eprintln!("Ignoring options specified after filename: the first is [{first}]");
    }

    let config = cli.session_config();
    let result = match &cli.file {
        Some(path) => run_file(path, config),
        None => run_interactive(config),
    };

    if let Err(error) = result {
        eprintln!("{:?}", miette::Report::new(error));
        process::exit(1);
    }
}

/// Configure miette for error reporting
fn setup_miette_handler() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .tab_width(4)
                .with_cause_chain()
                .build(),
        )
    }))
    .ok();
}

/// Install a tracing subscriber, only when RUST_LOG asks for one
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run_interactive(config: SessionConfig) -> Result<(), ReplError> {
    let mut repl = ReplSession::with_config(Session::new(config), ReplConfig::default())?;
    repl.run()
}

/// Evaluate every line of a file, as if typed at an empty prompt
fn run_file(path: &Path, config: SessionConfig) -> Result<(), ReplError> {
    let source = fs::read_to_string(path)?;
    let mut session = Session::with_source_name(config, path.display().to_string());

    tracing::debug!(file = %path.display(), "running file");
    for line in source.lines() {
        print_outcome(&session.evaluate(line));
    }
    Ok(())
}
