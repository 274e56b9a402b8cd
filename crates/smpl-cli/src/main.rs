//! `smpl`: run or check SMPL programs.
//!
//! `smpl run <file>` executes a program with the standard library and exits
//! with status 1 on a runtime failure. A `return`, `break` or `continue` that
//! escapes the program is reported on stdout, any other failure on stderr. `smpl check <file>` only lexes and
//! parses, printing diagnostics as text or JSON.
//!
//! Logging is off unless `SMPL_LOG` or `RUST_LOG` holds a filter, e.g.
//! `SMPL_LOG=smpl_eval=debug`.

mod render;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Once;

use clap::{Parser as ClapParser, Subcommand};
use colored::Colorize;
use smpl_eval::{EvalConfig, Interpreter, StdConsole};
use smpl_parser::{parse_source, ParseResult};
use smpl_stdlib::Stdlib;
use smpl_types::SourceFile;

#[derive(ClapParser, Debug)]
#[command(
    name = "smpl",
    about = "SMPL: a small dynamically typed scripting language",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
#[command(arg_required_else_help = true)]
enum Commands {
    /// Run an SMPL program
    Run {
        /// Path to the .smpl file
        file: PathBuf,

        /// Let errors raised inside function calls fail the run instead of
        /// turning the call into null (also enabled by SMPL_STRICT=1)
        #[arg(long)]
        strict: bool,
    },

    /// Parse a program and report syntax errors without running it
    Check {
        /// Path to the .smpl file
        file: PathBuf,

        /// Print diagnostics as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

static TRACING_INIT: Once = Once::new();

/// Install the log subscriber when `SMPL_LOG` or `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_env("SMPL_LOG").or_else(|_| EnvFilter::try_from_default_env());
        if let Ok(filter) = filter {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

fn strict_from_env() -> bool {
    std::env::var("SMPL_STRICT").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let ok = match cli.command {
        Commands::Run { file, strict } => run(&file, strict || strict_from_env()),
        Commands::Check { file, json } => check(&file, json),
    };
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn load(path: &Path) -> Option<SourceFile> {
    match fs::read_to_string(path) {
        Ok(source) => Some(SourceFile::new(path.display().to_string(), source)),
        Err(err) => {
            eprintln!(
                "{}: cannot read {}: {err}",
                "error".red().bold(),
                path.display()
            );
            None
        }
    }
}

fn run(path: &Path, strict: bool) -> bool {
    let Some(source) = load(path) else {
        return false;
    };
    let ParseResult { program, errors } = parse_source(&source);
    let program = match program {
        Some(program) if !errors.has_errors() => program,
        _ => {
            eprint!("{}", render::diagnostics(&errors));
            return false;
        }
    };

    let config = if strict {
        EvalConfig::strict()
    } else {
        EvalConfig::new()
    };
    let console = Rc::new(StdConsole::new());
    let globals = match Stdlib::new(console.clone()).globals() {
        Ok(globals) => globals,
        Err(err) => {
            eprintln!("{}", render::runtime_error(&err.into()));
            return false;
        }
    };

    let _span = tracing::info_span!("smpl_run", file = %path.display(), strict).entered();
    let mut interpreter = Interpreter::new(globals, console).with_config(config);
    match interpreter.run(&program) {
        Ok(()) => true,
        // Escaped control signals are part of the program's output.
        Err(err) if err.is_stray_signal() => {
            println!("{}", render::runtime_error(&err));
            false
        }
        Err(err) => {
            eprintln!("{}", render::runtime_error(&err));
            false
        }
    }
}

fn check(path: &Path, json: bool) -> bool {
    let Some(source) = load(path) else {
        return false;
    };
    let result = parse_source(&source);
    let ok = !result.errors.has_errors();

    if json {
        match serde_json::to_string_pretty(&result.errors) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("{}: {err}", "error".red().bold());
                return false;
            }
        }
    } else if ok {
        println!("{}: {}", source.name, "ok".green().bold());
    } else {
        eprint!("{}", render::diagnostics(&result.errors));
    }
    tracing::debug!(file = %source.name, errors = result.errors.total, "checked");
    ok
}
