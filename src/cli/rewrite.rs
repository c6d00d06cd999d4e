//! Rewrite command - LLM-generate (and optionally apply) a fix
//!
//! This is the only command that sends document text over the network.
//! It uses your own API key (BYOK); analysis itself never leaves the
//! machine.

use crate::ai::{AiClient, AiConfig, LlmBackend, RewriteGenerator};
use crate::cli::passage_for_finding;
use crate::config;
use crate::document::Document;
use crate::session::SessionStore;
use anyhow::{bail, Context, Result};
use console::style;
use std::path::Path;

pub fn run(
    path: &Path,
    index: usize,
    apply: bool,
    dry_run: bool,
    backend: &str,
    model: Option<String>,
) -> Result<()> {
    let path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;
    if path.is_dir() {
        bail!("`rewrite` works on a single document; got a directory.");
    }

    let store = SessionStore::for_document(&path)?;
    let findings = store.load_findings()?;
    let finding = findings
        .get(index.checked_sub(1).context("Finding index is 1-based")?)
        .with_context(|| format!("No finding #{index}; {} cached", findings.len()))?;

    let doc = Document::load(&path)?;
    let config = config::load_project_config(&path);
    let passage = passage_for_finding(&doc, finding);

    let backend: LlmBackend = backend.parse().map_err(anyhow::Error::msg)?;
    let client = AiClient::from_env_with_config(AiConfig {
        backend,
        model,
        ..Default::default()
    })?;

    println!(
        "Rewriting finding #{index} ({}) via {} / {}...\n",
        finding.title,
        format!("{backend:?}").to_lowercase(),
        client.model()
    );

    let generator = RewriteGenerator::new(client);
    let proposal = generator.generate(finding, &passage, config.register)?;

    println!("{} {}", style("Proposal:").bold(), proposal.title);
    if !proposal.rationale.is_empty() {
        println!("{}\n", style(&proposal.rationale).dim());
    }
    print!("{}", proposal.diff());

    if apply && !dry_run {
        let applied = proposal.apply(&path)?;
        println!(
            "\n{} applied {applied} change(s) to {}",
            style("[OK]").green(),
            path.display()
        );
        println!("Re-run `stylometer analyze {}` to re-score.", path.display());
    } else {
        println!(
            "\nDry run; nothing written. Add --apply to update {}.",
            path.display()
        );
    }

    Ok(())
}
