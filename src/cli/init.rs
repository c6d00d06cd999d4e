//! Init command - write a commented starter config

use anyhow::{bail, Context, Result};
use console::style;
use std::path::Path;

const STARTER_CONFIG: &str = r#"# stylometer.toml - project configuration
#
# Placed next to the documents you analyze. All settings are optional.

# Document register: selects the rewrite prompt voice.
# One of: essay, blog, technical, generic
register = "generic"

# Per-step overrides. Step names: section-uniformity, section-roles,
# paragraph-roles, sentence-length, human-features, validation.
#
# [steps.sentence-length]
# enabled = true
# thresholds = { very_low_cv = 0.18, natural_cv = 0.35 }
#
# [steps.human-features]
# severity = "high"

# Pillar weights for the authenticity score (normalized if they
# don't sum to 1.0).
[scoring]
pillar_weights = { structure = 0.4, rhythm = 0.3, voice = 0.3 }

# Default CLI flags.
[defaults]
format = "text"
# severity = "low"
# workers = 4
# top = 10
# skip_steps = []
# fail_on = "high"
"#;

pub fn run(path: &Path) -> Result<()> {
    let dir = if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| Path::new(".").to_path_buf())
    };

    let target = dir.join("stylometer.toml");
    if target.exists() {
        bail!(
            "{} already exists; remove it first if you want a fresh one",
            target.display()
        );
    }

    std::fs::write(&target, STARTER_CONFIG)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    println!(
        "{} wrote {}",
        style("[OK]").green(),
        target.display()
    );
    println!("Edit it, then run `stylometer analyze` in this directory.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_config_parses() {
        let config: crate::config::ProjectConfig = toml::from_str(STARTER_CONFIG).unwrap();
        assert!(config.scoring.pillar_weights.is_valid());
        assert_eq!(config.defaults.format.as_deref(), Some("text"));
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(run(tmp.path()).is_ok());
        assert!(run(tmp.path()).is_err());
    }
}
