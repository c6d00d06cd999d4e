//! Status command - show wizard session progress

use crate::session::{SessionStore, StepStatus};
use anyhow::{bail, Context, Result};
use console::style;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;
    if path.is_dir() {
        bail!("`status` works on a single document; got a directory.");
    }

    let store = SessionStore::for_document(&path)?;
    let Ok(session) = store.load_session() else {
        println!(
            "No session for {}. Run `stylometer analyze {}` or `stylometer step {}` to start.",
            path.display(),
            path.display(),
            path.display()
        );
        return Ok(());
    };

    println!("{}", style("Wizard Session").bold());
    println!("  document: {}", session.document.display());
    println!("  cache:    {}", store.dir().display());
    println!(
        "  updated:  {}\n",
        session.updated_at.format("%Y-%m-%d %H:%M UTC")
    );

    for state in &session.steps {
        let (tag, name) = match state.status {
            StepStatus::Completed => (
                style("[OK]").green(),
                style(state.name.clone()),
            ),
            StepStatus::Failed => (style("[XX]").red(), style(state.name.clone()).red()),
            StepStatus::Pending => (style("[--]").dim(), style(state.name.clone()).dim()),
        };
        let findings = match state.status {
            StepStatus::Completed if state.findings > 0 => {
                format!("{} findings", state.findings)
            }
            StepStatus::Completed => "clean".to_string(),
            _ => String::new(),
        };
        println!("  {tag} {}. {:<20} {}", state.number, name, style(findings).dim());
    }

    if session.is_complete() {
        println!(
            "\nAll steps complete. `stylometer findings {}` lists the results.",
            path.display()
        );
    } else if let Some(next) = session.next_pending() {
        println!(
            "\nNext: step {}/6 ({}). Run `stylometer step {}`.",
            next.number,
            next.name,
            path.display()
        );
    }

    Ok(())
}
