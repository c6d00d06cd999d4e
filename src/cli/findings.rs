//! Findings command - list or inspect cached findings

use crate::cli::analyze::parse_severity;
use crate::models::Finding;
use crate::session::SessionStore;
use anyhow::{bail, Context, Result};
use console::style;
use std::path::Path;

pub fn run(
    path: &Path,
    index: Option<usize>,
    severity: Option<String>,
    top: Option<usize>,
    json: bool,
) -> Result<()> {
    let path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;
    if path.is_dir() {
        bail!("`findings` works on a single document; got a directory.");
    }

    let store = SessionStore::for_document(&path)?;
    let mut findings = store.load_findings()?;

    // Detail view indexes into the full cached list, before filters
    if let Some(index) = index {
        let finding = findings
            .get(index.checked_sub(1).context("Finding index is 1-based")?)
            .with_context(|| format!("No finding #{index}; {} cached", findings.len()))?;
        if json {
            println!("{}", serde_json::to_string_pretty(finding)?);
        } else {
            print_detail(index, finding);
        }
        return Ok(());
    }

    if let Some(min) = parse_severity(severity.as_deref())? {
        findings.retain(|f| f.severity >= min);
    }
    if let Some(top) = top {
        findings.truncate(top);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&findings)?);
        return Ok(());
    }

    if findings.is_empty() {
        println!("No findings cached for {}.", path.display());
        return Ok(());
    }

    println!("{} ({})\n", style("Findings").bold(), findings.len());
    for (i, finding) in findings.iter().enumerate() {
        let tag = severity_tag(finding);
        println!(
            "  {:>3}. {tag} {:<45} {}",
            i + 1,
            finding.title,
            style(&finding.step).dim()
        );
    }
    println!(
        "\n`stylometer findings {} N` shows one in detail.",
        path.display()
    );

    Ok(())
}

fn severity_tag(finding: &Finding) -> console::StyledObject<String> {
    let tag = format!("[{:>8}]", finding.severity.to_string());
    match finding.severity {
        crate::models::Severity::Critical | crate::models::Severity::High => style(tag).red(),
        crate::models::Severity::Medium => style(tag).yellow(),
        crate::models::Severity::Low => style(tag).cyan(),
        crate::models::Severity::Info => style(tag).dim(),
    }
}

fn print_detail(index: usize, finding: &Finding) {
    println!(
        "{} {} {}",
        style(format!("#{index}")).bold(),
        severity_tag(finding),
        style(&finding.title).bold()
    );
    println!("  step: {}  id: {}", finding.step, finding.id);
    if let Some(line) = finding.line {
        println!("  line: {line}");
    }
    println!("\n{}", finding.description);
    if let Some(why) = &finding.why_it_matters {
        println!("\n{} {why}", style("Why it matters:").bold());
    }
    if let Some(fix) = &finding.suggested_fix {
        println!("\n{} {fix}", style("Suggested fix:").bold());
    }
    if !finding.metrics.is_empty() {
        println!("\n{}", style("Metrics:").bold());
        for (k, v) in &finding.metrics {
            println!("  {k} = {v}");
        }
    }
}
