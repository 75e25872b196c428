//! Read, validate, re-render and lint MT101 message files.
//!
//! Usage:
//!   mt101 [--lenient] parse [FILE ...]     dump pages
//!   mt101 [--lenient] check [FILE ...]     validate, report `path:line: error: message`
//!   mt101 [--lenient] fmt [FILE ...]       print canonical message text
//!   mt101 lint [--fix] [--human] [FILE ...]
//!
//! With no files, reads stdin. Exit code 1 if any input fails.
//! Log verbosity follows `RUST_LOG` (default `warn`), written to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use swiftmt::dump::page_to_dump;
use swiftmt::lint::{lint, lint_fix, LintMessage, Severity};
use swiftmt::{read_pages, Page, ParseError, ReaderConfig};

#[derive(Parser)]
#[command(name = "mt101")]
#[command(about = "Read, validate and lint SWIFT MT101 message text")]
struct Cli {
    /// Accept pages that start with `:21:` (no sender's reference)
    #[arg(long, global = true)]
    lenient: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a readable dump of every page
    Parse { files: Vec<PathBuf> },
    /// Validate pages and report the first error per input
    Check { files: Vec<PathBuf> },
    /// Re-render pages as canonical message text
    Fmt { files: Vec<PathBuf> },
    /// Line-level lint of message text
    Lint {
        /// Rewrite files (or print fixed stdin) with whitespace findings removed
        #[arg(short, long)]
        fix: bool,
        /// Human-readable output
        #[arg(short = 'H', long)]
        human: bool,
        files: Vec<PathBuf>,
    },
}

/// One input: display name and text.
struct Input {
    name: String,
    path: Option<PathBuf>,
    text: String,
}

fn read_inputs(files: &[PathBuf]) -> anyhow::Result<Vec<Input>> {
    if files.is_empty() {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).context("reading stdin")?;
        return Ok(vec![Input {
            name: "<stdin>".to_string(),
            path: None,
            text,
        }]);
    }
    files
        .iter()
        .map(|path| -> anyhow::Result<Input> {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            Ok(Input {
                name: path.display().to_string(),
                path: Some(path.clone()),
                text,
            })
        })
        .collect()
}

fn pages_or_report(input: &Input, config: ReaderConfig) -> Option<Vec<Page>> {
    match read_pages(&input.text, config) {
        Ok(pages) => Some(pages),
        Err(e) => {
            report(&input.name, &e);
            None
        }
    }
}

fn report(name: &str, e: &ParseError) {
    eprintln!("{}:{}: error: {}", name, e.line(), e);
}

fn print_lint_message(path: &str, m: &LintMessage, human: bool) {
    let severity_str = match m.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    };
    if human {
        println!("  {} {}:{}: {}", path, m.line, m.column, m.message);
        println!("    rule: {}", m.rule.id());
    } else {
        println!(
            "{}:{}:{}: {}: {} [{}]",
            path,
            m.line,
            m.column,
            severity_str,
            m.message,
            m.rule.id()
        );
    }
}

fn run_lint(files: &[PathBuf], fix: bool, human: bool) -> anyhow::Result<bool> {
    let mut ok = true;
    let mut total_errors = 0usize;
    let mut total_warnings = 0usize;
    for input in read_inputs(files)? {
        let text = if fix { lint_fix(&input.text) } else { input.text.clone() };
        if fix {
            match &input.path {
                Some(path) if text != input.text => {
                    std::fs::write(path, &text).with_context(|| format!("writing {}", path.display()))?;
                    eprintln!("{}: fixed", input.name);
                }
                Some(_) => {}
                None => {
                    io::stdout().write_all(text.as_bytes())?;
                    continue;
                }
            }
        }
        for m in lint(&text) {
            match m.severity {
                Severity::Error => {
                    total_errors += 1;
                    ok = false;
                }
                Severity::Warning => total_warnings += 1,
            }
            print_lint_message(&input.name, &m, human);
        }
    }
    if total_errors > 0 || total_warnings > 0 {
        eprintln!("lint: {} error(s), {} warning(s)", total_errors, total_warnings);
    }
    Ok(ok)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = ReaderConfig {
        allow_missing_senders_reference: cli.lenient,
    };

    let ok = match cli.command {
        Command::Parse { files } => {
            let mut ok = true;
            for input in read_inputs(&files)? {
                match pages_or_report(&input, config) {
                    Some(pages) => {
                        for page in &pages {
                            println!("{}", page_to_dump(page));
                        }
                    }
                    None => ok = false,
                }
            }
            ok
        }
        Command::Check { files } => {
            let mut ok = true;
            for input in read_inputs(&files)? {
                match pages_or_report(&input, config) {
                    Some(pages) => eprintln!("{}: {} page(s) ok", input.name, pages.len()),
                    None => ok = false,
                }
            }
            ok
        }
        Command::Fmt { files } => {
            let mut ok = true;
            let mut stdout = io::stdout().lock();
            for input in read_inputs(&files)? {
                match pages_or_report(&input, config) {
                    Some(pages) => {
                        for page in &pages {
                            writeln!(stdout, "{}", page)?;
                        }
                    }
                    None => ok = false,
                }
            }
            ok
        }
        Command::Lint { fix, human, files } => run_lint(&files, fix, human)?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
