//! jsonmatch CLI: driving adapter for the jsonmatch predicate engine.
//!
//! Subcommands:
//! - `eval <predicate> <document>... [--trace]`: evaluate against each document
//! - `check <predicate>`: validate a predicate file
//! - `fmt <predicate> [--pretty]`: print the canonical JSON form
//!
//! Files ending in `.json` are read as JSON, everything else as YAML.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jsonmatch::{JsonPredicate, ParseOptions};
use serde_json::Value;
use tracing::{debug, info};

/// Evaluate JSON predicates against JSON documents
#[derive(Parser, Debug)]
#[command(name = "jsonmatch")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Parse options file (JSON or YAML): scope_mode, max_depth, max_children
    #[arg(long = "options", value_name = "FILE", global = true)]
    options: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error (RUST_LOG takes precedence)
    #[arg(
        short = 'l',
        long = "log-level",
        value_name = "LEVEL",
        env = "JSONMATCH_LOG_LEVEL",
        default_value = "warn",
        global = true
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a predicate against one or more documents
    Eval {
        /// Predicate file
        predicate: PathBuf,
        /// Document files
        #[arg(required = true)]
        documents: Vec<PathBuf>,
        /// Print the evaluation trace for each document
        #[arg(long)]
        trace: bool,
    },
    /// Validate a predicate file
    Check {
        /// Predicate file
        predicate: PathBuf,
    },
    /// Print a predicate in canonical JSON form
    Fmt {
        /// Predicate file
        predicate: PathBuf,
        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(&cli, &mut io::stdout().lock()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// Returns `Ok(false)` when `eval` saw at least one non-matching document.
fn run(cli: &Cli, out: &mut impl Write) -> Result<bool> {
    let options = load_options(cli.options.as_deref())?;
    debug!(?options, "parse options loaded");

    match &cli.command {
        Commands::Eval {
            predicate,
            documents,
            trace,
        } => {
            let predicate = load_predicate(predicate, &options)?;
            let documents = documents
                .iter()
                .map(|path| Ok((path.display().to_string(), load_value(path)?)))
                .collect::<Result<Vec<_>>>()?;
            cmd_eval(&predicate, &documents, *trace, out)
        }
        Commands::Check { predicate } => {
            cmd_check(&load_predicate(predicate, &options)?, out)?;
            Ok(true)
        }
        Commands::Fmt { predicate, pretty } => {
            cmd_fmt(&load_predicate(predicate, &options)?, *pretty, out)?;
            Ok(true)
        }
    }
}

fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_eval(
    predicate: &JsonPredicate,
    documents: &[(String, Value)],
    trace: bool,
    out: &mut impl Write,
) -> Result<bool> {
    let mut all_matched = true;
    for (name, document) in documents {
        let matched = if trace {
            let trace = predicate.evaluate_with_trace(document);
            writeln!(out, "{name}: {}", verdict(trace.matched()))?;
            write!(out, "{trace}")?;
            trace.matched()
        } else {
            let matched = predicate.apply(document);
            writeln!(out, "{name}: {}", verdict(matched))?;
            matched
        };
        all_matched &= matched;
    }
    info!(documents = documents.len(), all_matched, "evaluation finished");
    Ok(all_matched)
}

fn cmd_check(predicate: &JsonPredicate, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Predicate valid (depth {})", predicate.depth())?;
    Ok(())
}

fn cmd_fmt(predicate: &JsonPredicate, pretty: bool, out: &mut impl Write) -> Result<()> {
    let json = predicate.to_json();
    let text = if pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    writeln!(out, "{text}")?;
    Ok(())
}

fn verdict(matched: bool) -> &'static str {
    if matched {
        "match"
    } else {
        "no match"
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// File loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_predicate(path: &Path, options: &ParseOptions) -> Result<JsonPredicate> {
    let value = load_value(path)?;
    JsonPredicate::parse_with(&value, options)
        .with_context(|| format!("invalid predicate in \"{}\"", path.display()))
}

fn load_options(path: Option<&Path>) -> Result<ParseOptions> {
    let Some(path) = path else {
        return Ok(ParseOptions::default());
    };
    serde_json::from_value(load_value(path)?)
        .with_context(|| format!("invalid options in \"{}\"", path.display()))
}

fn load_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read \"{}\"", path.display()))?;
    parse_content(&content, is_json(path))
        .with_context(|| format!("failed to parse \"{}\"", path.display()))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn parse_content(content: &str, json: bool) -> Result<Value> {
    if json {
        Ok(serde_json::from_str(content)?)
    } else {
        // Default to YAML (handles .yaml and .yml)
        Ok(serde_yaml::from_str(content)?)
    }
}
