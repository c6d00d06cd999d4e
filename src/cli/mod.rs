//! CLI command definitions and handlers

pub(crate) mod analyze;
mod clean;
mod doctor;
mod findings;
mod init;
mod prompt;
mod rewrite;
mod status;
mod step;

use crate::document::Document;
use crate::models::Finding;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Stylometer - AI-text detection and rewriting
///
/// 100% LOCAL analysis - no document text leaves your machine unless you
/// explicitly run `rewrite`.
#[derive(Parser, Debug)]
#[command(name = "stylometer")]
#[command(
    version,
    about = "Detect AI-like uniformity in prose and rewrite it back to human",
    long_about = "Stylometer segments a document into sections, paragraphs, and sentences, \
then runs a six-step wizard measuring the variation human writers produce \
and generators flatten: section sizes, heading patterns, paragraph \
construction, sentence rhythm, and voice markers.\n\n\
Analysis is 100% LOCAL. Only the optional `rewrite` command calls an LLM, \
with your own API key (BYOK).",
    after_help = "\
Examples:
  stylometer analyze essay.md              Full analysis with terminal report
  stylometer analyze docs/ --format json   Batch-analyze a directory
  stylometer step essay.md                 Run the next wizard step only
  stylometer findings essay.md             List cached findings
  stylometer prompt essay.md 2             Print the rewrite prompt for finding 2
  stylometer rewrite essay.md 2 --apply    LLM-rewrite the flagged passage
  stylometer analyze essay.md --fail-on high   CI mode: exit 1 on high findings"
)]
pub struct Cli {
    /// Path to a document or directory (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a commented stylometer.toml config file
    Init,

    /// Run the full six-step analysis and print a report
    Analyze {
        /// Output format: text, json, markdown (or md). Default: text,
        /// or the project config's `defaults.format`.
        #[arg(long, short = 'f', value_parser = ["text", "json", "markdown", "md"])]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Minimum severity to report (critical, high, medium, low, info)
        #[arg(long, value_parser = ["critical", "high", "medium", "low", "info"])]
        severity: Option<String>,

        /// Maximum findings to show
        #[arg(long)]
        top: Option<usize>,

        /// Skip specific steps (repeatable)
        #[arg(long)]
        skip_step: Vec<String>,

        /// Exit with code 1 if findings at this severity or higher exist
        #[arg(long, value_parser = ["critical", "high", "medium", "low"])]
        fail_on: Option<String>,

        /// Disable ANSI colors (cleaner for CI logs)
        #[arg(long)]
        no_color: bool,

        /// Number of parallel workers (1-64, default: auto)
        #[arg(long, value_parser = parse_workers)]
        workers: Option<usize>,
    },

    /// Run the next pending wizard step and advance the session
    Step {
        /// Discard session progress and start over from step 1
        #[arg(long)]
        restart: bool,
    },

    /// Show wizard session progress
    Status,

    /// List cached findings, or show one in detail
    Findings {
        /// 1-based finding index for detail view
        #[arg(index = 2)]
        index: Option<usize>,

        /// Minimum severity to list
        #[arg(long, value_parser = ["critical", "high", "medium", "low", "info"])]
        severity: Option<String>,

        /// Maximum findings to list
        #[arg(long)]
        top: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the LLM rewrite prompt for a finding (no network)
    #[command(allow_missing_positional = true)]
    Prompt {
        /// 1-based finding index
        #[arg(index = 2)]
        index: usize,

        /// Write the prompt to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Generate (and optionally apply) an LLM rewrite for a finding
    #[command(allow_missing_positional = true)]
    Rewrite {
        /// 1-based finding index
        #[arg(index = 2)]
        index: usize,

        /// Apply the rewrite to the document file
        #[arg(long)]
        apply: bool,

        /// Show the proposal without touching the file (default)
        #[arg(long)]
        dry_run: bool,

        /// LLM backend: anthropic, openai, openrouter, ollama
        #[arg(long, default_value = "anthropic")]
        backend: String,

        /// Model override (default: backend's default model)
        #[arg(long)]
        model: Option<String>,
    },

    /// Check environment: config, cache, API keys
    Doctor,

    /// Remove cached session data for the document
    Clean {
        /// Show what would be removed without removing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Print version information
    Version,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Init) => init::run(&cli.path),

        Some(Commands::Analyze {
            format,
            output,
            severity,
            top,
            skip_step,
            fail_on,
            no_color,
            workers,
        }) => analyze::run(
            &cli.path,
            format.as_deref(),
            output.as_deref(),
            severity,
            top,
            skip_step,
            fail_on,
            no_color,
            workers.unwrap_or(0),
        ),

        Some(Commands::Step { restart }) => step::run(&cli.path, restart),

        Some(Commands::Status) => status::run(&cli.path),

        Some(Commands::Findings {
            index,
            severity,
            top,
            json,
        }) => findings::run(&cli.path, index, severity, top, json),

        Some(Commands::Prompt { index, output }) => {
            prompt::run(&cli.path, index, output.as_deref())
        }

        Some(Commands::Rewrite {
            index,
            apply,
            dry_run,
            backend,
            model,
        }) => rewrite::run(&cli.path, index, apply, dry_run, &backend, model),

        Some(Commands::Doctor) => doctor::run(&cli.path),

        Some(Commands::Clean { dry_run }) => clean::run(&cli.path, dry_run),

        Some(Commands::Version) => {
            println!("stylometer {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }

        // Bare `stylometer PATH` runs a default analysis
        None => analyze::run(
            &cli.path,
            None,
            None,
            None,
            None,
            Vec::new(),
            None,
            false,
            0,
        ),
    }
}

/// The passage a finding points at: its paragraph, else its section,
/// else the whole document text.
pub(crate) fn passage_for_finding(doc: &Document, finding: &Finding) -> String {
    if let Some(paragraph) = finding.paragraph.and_then(|i| doc.paragraph_at(i)) {
        return paragraph.text();
    }
    if let Some(text) = finding.section.and_then(|i| doc.section_text(i)) {
        return text;
    }
    doc.sections
        .iter()
        .flat_map(|s| s.paragraphs.iter())
        .map(|p| p.text())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_workers_bounds() {
        assert_eq!(parse_workers("4").unwrap(), 4);
        assert!(parse_workers("0").is_err());
        assert!(parse_workers("65").is_err());
        assert!(parse_workers("abc").is_err());
    }

    #[test]
    fn test_passage_prefers_paragraph() {
        let doc = Document::from_text(
            "t.md",
            "# One\n\nFirst paragraph here.\n\nSecond paragraph here.\n",
        );
        let finding = Finding {
            paragraph: Some(1),
            section: Some(0),
            ..Default::default()
        };
        assert_eq!(passage_for_finding(&doc, &finding), "Second paragraph here.");

        let doc_wide = Finding::default();
        assert!(passage_for_finding(&doc, &doc_wide).contains("First paragraph here."));
    }
}
