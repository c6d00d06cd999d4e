//! Doctor command - check the environment before a run

use crate::ai::LlmBackend;
use crate::session;
use anyhow::Result;
use console::style;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    println!("{}\n", style("Stylometer Doctor").bold());

    check("document path exists", path.exists(), &path.display().to_string());

    let dir = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(Path::new("."))
    };
    let toml = dir.join("stylometer.toml");
    let json = dir.join(".stylometerrc.json");
    let config_found = toml.exists() || json.exists();
    check(
        "project config",
        config_found,
        if config_found {
            "found"
        } else {
            "none (defaults apply; `stylometer init` writes one)"
        },
    );

    match session::cache_root() {
        Ok(root) => {
            let writable = std::fs::create_dir_all(&root).is_ok();
            check("cache directory writable", writable, &root.display().to_string());
        }
        Err(e) => check("cache directory writable", false, &e.to_string()),
    }

    println!("\n{}", style("LLM backends (rewrite only)").bold());
    for backend in [
        LlmBackend::Anthropic,
        LlmBackend::OpenAi,
        LlmBackend::OpenRouter,
    ] {
        let key = backend.env_key();
        let present = std::env::var(key).is_ok();
        let detail = if present {
            format!("{key} set")
        } else {
            format!("{key} not set ({})", backend.signup_url())
        };
        check_soft(&format!("{backend:?}").to_lowercase(), present, &detail);
    }
    check_soft(
        "ollama",
        true,
        "no key needed; set OLLAMA_MODEL to pick a model",
    );

    println!("\nAnalysis itself is 100% local and needs no key.");
    Ok(())
}

fn check(label: &str, ok: bool, detail: &str) {
    let tag = if ok {
        style("[OK]").green()
    } else {
        style("[XX]").red()
    };
    println!("  {tag} {label:<26} {}", style(detail).dim());
}

/// Like `check` but a miss is informational, not an error
fn check_soft(label: &str, ok: bool, detail: &str) {
    let tag = if ok {
        style("[OK]").green()
    } else {
        style("[--]").dim()
    };
    println!("  {tag} {label:<26} {}", style(detail).dim());
}
