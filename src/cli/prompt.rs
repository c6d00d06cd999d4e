//! Prompt command - print the rewrite prompt for a finding, no network

use crate::ai::RewritePromptBuilder;
use crate::cli::passage_for_finding;
use crate::config;
use crate::document::Document;
use crate::session::SessionStore;
use anyhow::{bail, Context, Result};
use std::path::Path;

pub fn run(path: &Path, index: usize, output: Option<&Path>) -> Result<()> {
    let path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;
    if path.is_dir() {
        bail!("`prompt` works on a single document; got a directory.");
    }

    let store = SessionStore::for_document(&path)?;
    let findings = store.load_findings()?;
    let finding = findings
        .get(index.checked_sub(1).context("Finding index is 1-based")?)
        .with_context(|| format!("No finding #{index}; {} cached", findings.len()))?;

    let doc = Document::load(&path)?;
    let config = config::load_project_config(&path);
    let passage = passage_for_finding(&doc, finding);

    let prompt = RewritePromptBuilder::new(finding.clone(), config.register)
        .passage(passage)
        .build();

    match output {
        Some(out) => {
            std::fs::write(out, &prompt)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Prompt written to {}", out.display());
        }
        None => println!("{prompt}"),
    }

    Ok(())
}
