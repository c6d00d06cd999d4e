//! Analyze command - run the full wizard pipeline and report

use crate::config::{self, ProjectConfig};
use crate::document::{walk_documents, Document};
use crate::models::{AnalysisReport, Severity};
use crate::reporters::{self, OutputFormat};
use crate::scoring;
use crate::session::SessionStore;
use crate::steps::{default_steps, StepEngine};
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::debug;

#[allow(clippy::too_many_arguments)]
pub fn run(
    path: &Path,
    format: Option<&str>,
    output: Option<&Path>,
    severity: Option<String>,
    top: Option<usize>,
    skip_steps: Vec<String>,
    fail_on: Option<String>,
    no_color: bool,
    workers: usize,
) -> Result<()> {
    let path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    let mut config = config::load_project_config(&path);
    config
        .defaults
        .skip_steps
        .extend(skip_steps.iter().cloned());

    // Flags the user left unset fall back to project-config defaults
    let format: OutputFormat = format
        .or(config.defaults.format.as_deref())
        .unwrap_or("text")
        .parse()?;
    let min_severity = parse_severity(
        severity.as_deref().or(config.defaults.severity.as_deref()),
    )?;
    let fail_threshold = parse_severity(
        fail_on.as_deref().or(config.defaults.fail_on.as_deref()),
    )?;
    let top = top.or(config.defaults.top);
    let workers = if workers == 0 {
        config.defaults.workers.unwrap_or(0)
    } else {
        workers
    };

    let failed = if path.is_dir() {
        run_batch(&path, &config, format, fail_threshold, no_color, workers)?
    } else {
        let report = analyze_document(&path, &config, workers)?;
        emit(&filtered_for_display(&report, min_severity, top), format, output, no_color)?;
        // Fail threshold and score come from the full set, not the view
        trips_threshold(&report, fail_threshold)
    };

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Analyze one document: run the engine, score, persist the session.
/// Scores and persists the complete findings set; display filters are
/// the caller's concern (`filtered_for_display`).
pub(crate) fn analyze_document(
    path: &Path,
    config: &ProjectConfig,
    workers: usize,
) -> Result<AnalysisReport> {
    let doc = Document::load(path)?;
    debug!(
        "Analyzing {} ({} words, {} sections)",
        doc.name, doc.word_count, doc.sections.len()
    );

    let mut engine = StepEngine::new(workers);
    engine.register_all(default_steps());

    let (results, _summary) = engine.run(&doc, config)?;
    let findings = engine.collect_findings(&results);

    let report = scoring::score(&doc, findings, &config.scoring.pillar_weights);

    // Persist the session so findings/prompt/rewrite/status can reuse it
    let store = SessionStore::for_document(path)?;
    let mut session = store.load_or_create(path)?;
    for result in &results {
        session.record_step(result.number, result.success, result.findings.len());
    }
    store.save_session(&session)?;
    store.save_findings(&report.findings)?;
    store.save_report(&report)?;

    Ok(report)
}

/// Restrict the listed findings to the severity/top view the user asked
/// for. Scores, grade, and the summary counts stay those of the full set.
fn filtered_for_display(
    report: &AnalysisReport,
    min_severity: Option<Severity>,
    top: Option<usize>,
) -> AnalysisReport {
    let mut shown = report.clone();
    if let Some(min) = min_severity {
        shown.findings.retain(|f| f.severity >= min);
    }
    if let Some(top) = top {
        shown.findings.truncate(top);
    }
    shown
}

/// Batch mode: analyze every document under a directory with a progress
/// bar, print one summary line per file. Returns whether any file
/// tripped the fail threshold.
fn run_batch(
    dir: &Path,
    config: &ProjectConfig,
    format: OutputFormat,
    fail_threshold: Option<Severity>,
    no_color: bool,
    workers: usize,
) -> Result<bool> {
    let files = walk_documents(dir)?;
    if files.is_empty() {
        println!(
            "No documents found under {} (looking for .md, .markdown, .txt)",
            dir.display()
        );
        return Ok(false);
    }

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .expect("valid progress template"),
    );

    let mut failed = false;
    let mut reports = Vec::new();
    for file in &files {
        bar.set_message(
            file.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        );

        match analyze_document(file, config, workers) {
            Ok(report) => {
                failed |= trips_threshold(&report, fail_threshold);
                reports.push((file.clone(), report));
            }
            Err(e) => {
                bar.suspend(|| eprintln!("  {} {}: {e}", style("[!!]").red(), file.display()));
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if format == OutputFormat::Json {
        let lines: Vec<serde_json::Value> = reports
            .iter()
            .map(|(file, r)| {
                serde_json::json!({
                    "path": file.display().to_string(),
                    "authenticity_score": r.authenticity_score,
                    "grade": r.grade,
                    "risk": r.risk,
                    "findings": r.findings_summary.total,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&lines)?);
        return Ok(failed);
    }

    println!("\n{}", style("Stylometer Batch Analysis").bold());
    for (file, report) in &reports {
        let grade = match report.grade.as_str() {
            "A" | "B" => style(report.grade.clone()).green(),
            "C" => style(report.grade.clone()).yellow(),
            _ => style(report.grade.clone()).red(),
        };
        let line = format!(
            "  {grade}  {:>5.1}  {:<3} findings  {}",
            report.authenticity_score,
            report.findings_summary.total,
            file.display()
        );
        if no_color {
            println!("{}", console::strip_ansi_codes(&line));
        } else {
            println!("{line}");
        }
    }
    println!("\n{} documents analyzed", reports.len());

    Ok(failed)
}

fn emit(
    report: &AnalysisReport,
    format: OutputFormat,
    output: Option<&Path>,
    no_color: bool,
) -> Result<()> {
    // Color only makes sense on a terminal
    let color = !no_color && output.is_none() && format == OutputFormat::Text;
    let rendered = reporters::render(report, format, color)?;

    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Report written to {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

pub(crate) fn parse_severity(s: Option<&str>) -> Result<Option<Severity>> {
    s.map(|s| s.parse::<Severity>().map_err(anyhow::Error::msg))
        .transpose()
}

fn trips_threshold(report: &AnalysisReport, threshold: Option<Severity>) -> bool {
    threshold.is_some_and(|t| report.findings.iter().any(|f| f.severity >= t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_severity() {
        assert_eq!(parse_severity(Some("high")).unwrap(), Some(Severity::High));
        assert_eq!(parse_severity(None).unwrap(), None);
        assert!(parse_severity(Some("bogus")).is_err());
    }

    fn report_with(findings: Vec<crate::models::Finding>) -> AnalysisReport {
        use crate::models::{DocumentSummary, FindingsSummary, RiskLevel};
        AnalysisReport {
            authenticity_score: 70.0,
            grade: "C".to_string(),
            risk: RiskLevel::Mixed,
            structure_score: 70.0,
            rhythm_score: 70.0,
            voice_score: 70.0,
            findings_summary: FindingsSummary::from_findings(&findings),
            findings,
            document: DocumentSummary::default(),
            symmetry: None,
        }
    }

    #[test]
    fn test_display_filters_leave_score_and_summary_alone() {
        use crate::models::Finding;
        let report = report_with(vec![
            Finding {
                severity: Severity::High,
                ..Default::default()
            },
            Finding {
                severity: Severity::Medium,
                ..Default::default()
            },
            Finding {
                severity: Severity::Low,
                ..Default::default()
            },
        ]);

        let shown = filtered_for_display(&report, Some(Severity::Medium), Some(1));
        assert_eq!(shown.findings.len(), 1);
        assert_eq!(shown.findings[0].severity, Severity::High);
        assert_eq!(shown.authenticity_score, report.authenticity_score);
        assert_eq!(shown.grade, report.grade);
        assert_eq!(shown.findings_summary.total, 3);

        // The full report still trips --fail-on even when the view is empty
        let hidden = filtered_for_display(&report, None, Some(0));
        assert!(hidden.findings.is_empty());
        assert!(trips_threshold(&report, Some(Severity::High)));
    }

    #[test]
    fn test_trips_threshold() {
        use crate::models::{DocumentSummary, Finding, FindingsSummary, RiskLevel};
        let findings = vec![Finding {
            severity: Severity::Medium,
            ..Default::default()
        }];
        let report = AnalysisReport {
            authenticity_score: 70.0,
            grade: "C".to_string(),
            risk: RiskLevel::Mixed,
            structure_score: 70.0,
            rhythm_score: 70.0,
            voice_score: 70.0,
            findings_summary: FindingsSummary::from_findings(&findings),
            findings,
            document: DocumentSummary::default(),
            symmetry: None,
        };

        assert!(!trips_threshold(&report, None));
        assert!(!trips_threshold(&report, Some(Severity::High)));
        assert!(trips_threshold(&report, Some(Severity::Medium)));
        assert!(trips_threshold(&report, Some(Severity::Low)));
    }
}
