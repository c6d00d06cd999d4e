//! Clean command - remove cached session data

use crate::document::walk_documents;
use crate::session::SessionStore;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub fn run(path: &Path, dry_run: bool) -> Result<()> {
    let path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    let targets: Vec<_> = if path.is_dir() {
        walk_documents(&path)?
    } else {
        vec![path.clone()]
    };

    let mut removed = 0;
    for doc in &targets {
        let store = SessionStore::for_document(doc)?;
        if !store.dir().exists() {
            continue;
        }
        if dry_run {
            println!("would remove {}", store.dir().display());
        } else {
            store.clean()?;
            println!("removed {}", store.dir().display());
        }
        removed += 1;
    }

    if removed == 0 {
        println!("No cached sessions for {}.", path.display());
    } else if dry_run {
        println!(
            "\n{} session(s) would be removed. Re-run without --dry-run.",
            removed
        );
    } else {
        println!("\n{} {removed} session(s) removed.", style("[OK]").green());
    }

    Ok(())
}
