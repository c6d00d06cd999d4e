//! Step command - run the next pending wizard step and advance

use crate::config;
use crate::document::Document;
use crate::models::Finding;
use crate::session::SessionStore;
use crate::steps::{default_steps, StepContext};
use anyhow::{bail, Context, Result};
use console::style;
use std::path::Path;

pub fn run(path: &Path, restart: bool) -> Result<()> {
    let path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;
    if path.is_dir() {
        bail!("`step` works on a single document; got a directory. Use `analyze` for batches.");
    }

    let doc = Document::load(&path)?;
    let config = config::load_project_config(&path);
    let store = SessionStore::for_document(&path)?;
    let mut session = store.load_or_create(&path)?;

    if restart {
        let hash = session.content_hash.clone();
        session.reset(hash);
        println!("{} session restarted from step 1\n", style("[>>]").cyan());
    }

    let Some(pending) = session.next_pending() else {
        println!(
            "{} All 6 steps complete. Run `stylometer findings {}` to review, \
or `stylometer step {} --restart` to start over.",
            style("[OK]").green(),
            path.display(),
            path.display()
        );
        return Ok(());
    };
    let number = pending.number;

    let steps = default_steps();
    let step = steps
        .iter()
        .find(|s| s.number() == number)
        .context("Session references an unknown step")?;

    println!(
        "{} {}/6: {}",
        style("Step").bold(),
        number,
        style(step.title()).bold()
    );
    println!("{}\n", style(step.description()).dim());

    // Dependent steps see everything earlier steps have cached
    let prior: Vec<Finding> = if step.is_dependent() {
        store.load_findings().unwrap_or_default()
    } else {
        Vec::new()
    };

    let ctx = StepContext {
        config: config.step_config(step.name()),
        prior_findings: &prior,
    };
    let result = step.analyze(&doc, &ctx);

    match result {
        Ok(findings) => {
            if findings.is_empty() {
                println!("{} no issues found", style("[OK]").green());
            } else {
                for finding in &findings {
                    let tag = match finding.severity {
                        crate::models::Severity::Critical | crate::models::Severity::High => {
                            style(format!("[{}]", finding.severity)).red()
                        }
                        crate::models::Severity::Medium => {
                            style(format!("[{}]", finding.severity)).yellow()
                        }
                        _ => style(format!("[{}]", finding.severity)).dim(),
                    };
                    println!("  {tag} {}", finding.title);
                    println!("      {}", style(&finding.description).dim());
                }
            }

            session.record_step(number, true, findings.len());

            // Merge into the cached findings, replacing this step's old ones
            let mut cached = store.load_findings().unwrap_or_default();
            cached.retain(|f| f.step != step.name());
            cached.extend(findings);
            cached.sort_by(|a, b| b.severity.cmp(&a.severity));
            store.save_findings(&cached)?;
        }
        Err(e) => {
            println!("{} step failed: {e}", style("[XX]").red());
            session.record_step(number, false, 0);
        }
    }

    store.save_session(&session)?;

    if session.is_complete() {
        println!(
            "\n{} Wizard complete. Run `stylometer analyze {}` for the scored report.",
            style("[OK]").green(),
            path.display()
        );
    } else if let Some(next) = session.next_pending() {
        println!(
            "\nNext: step {}/6 ({}). Run `stylometer step {}` to continue.",
            next.number,
            next.name,
            path.display()
        );
    }

    Ok(())
}
