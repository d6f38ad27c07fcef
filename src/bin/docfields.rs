//! CLI binary for docfields.
//!
//! A thin shim over the library crate that loads a rule file, reads input
//! text (file or stdin), runs the extraction and prints the result as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use docfields::{extract_with, ExtractOptions, RuleSet};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Extract structured fields from OCR'd document text using a JSON rule file.
#[derive(Debug, Parser)]
#[command(name = "docfields", version, about)]
struct Cli {
    /// Path to the JSON rule file
    #[arg(short, long, env = "DOCFIELDS_RULES")]
    rules: PathBuf,

    /// Input text file; omit or pass '-' to read stdin
    input: Option<String>,

    /// Validate the rule file and exit without extracting
    #[arg(long)]
    check: bool,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,

    /// Join hyphenation-broken words before matching
    #[arg(long)]
    join_hyphenated: bool,

    /// Collapse in-line whitespace runs before matching
    /// (breaks multi-space column detection; avoid with table rules)
    #[arg(long)]
    collapse_spaces: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let rules_json = std::fs::read_to_string(&cli.rules)
        .with_context(|| format!("Failed to read rule file '{}'", cli.rules.display()))?;
    let ruleset = RuleSet::from_json(&rules_json)
        .with_context(|| format!("Invalid rule file '{}'", cli.rules.display()))?;

    if cli.check {
        let columns = ruleset.table().map_or(0, |t| t.columns().len());
        eprintln!(
            "OK: {} general fields, {} table columns (rule version {})",
            ruleset.fields().len(),
            columns,
            ruleset.version()
        );
        return Ok(());
    }

    let text = read_input(cli.input.as_deref())?;

    let options = ExtractOptions::default()
        .join_hyphenated(cli.join_hyphenated)
        .collapse_spaces(cli.collapse_spaces);
    let result = extract_with(&ruleset, &text, &options);

    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }
    .context("Failed to serialise result")?;
    println!("{json}");

    Ok(())
}

fn read_input(input: Option<&str>) -> Result<String> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file '{path}'")),
    }
}
