//! Text (terminal) reporter with colors and formatting

use crate::models::{AnalysisReport, RiskLevel, Severity};
use anyhow::Result;

/// Grade colors (ANSI escape codes)
fn grade_color(grade: &str) -> &'static str {
    match grade {
        "A" => "\x1b[32m", // Green
        "B" => "\x1b[92m", // Light green
        "C" => "\x1b[33m", // Yellow
        "D" => "\x1b[91m", // Light red
        "F" => "\x1b[31m", // Red
        _ => "\x1b[0m",
    }
}

/// Severity colors
fn severity_color(severity: &Severity) -> &'static str {
    match severity {
        Severity::Critical => "\x1b[31m", // Red
        Severity::High => "\x1b[91m",     // Light red
        Severity::Medium => "\x1b[33m",   // Yellow
        Severity::Low => "\x1b[34m",      // Blue
        Severity::Info => "\x1b[90m",     // Gray
    }
}

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Severity tag
fn severity_tag(severity: &Severity) -> &'static str {
    match severity {
        Severity::Critical => "[C]",
        Severity::High => "[H]",
        Severity::Medium => "[M]",
        Severity::Low => "[L]",
        Severity::Info => "[I]",
    }
}

fn risk_color(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::LikelyHuman => "\x1b[32m",
        RiskLevel::Mixed => "\x1b[33m",
        RiskLevel::LikelyAi => "\x1b[31m",
    }
}

/// Render report as formatted terminal output
pub fn render(report: &AnalysisReport, color: bool) -> Result<String> {
    let rendered = render_colored(report)?;
    if color {
        Ok(rendered)
    } else {
        Ok(strip_ansi(&rendered))
    }
}

fn render_colored(report: &AnalysisReport) -> Result<String> {
    let mut out = String::new();

    // Header
    let grade_c = grade_color(&report.grade);
    let risk_c = risk_color(report.risk);
    out.push_str(&format!("\n{BOLD}Stylometer Analysis{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Authenticity: {BOLD}{:.1}/100{RESET}  Grade: {grade_c}{BOLD}{}{RESET}  Verdict: {risk_c}{}{RESET}\n",
        report.authenticity_score, report.grade, report.risk
    ));
    let doc = &report.document;
    out.push_str(&format!(
        "Sections: {}  Paragraphs: {}  Sentences: {}  Words: {}\n",
        doc.sections, doc.paragraphs, doc.sentences, doc.words
    ));
    if let Some(symmetry) = &report.symmetry {
        let marker = if symmetry.is_symmetric {
            " (suspicious)"
        } else {
            ""
        };
        out.push_str(&format!(
            "Layout symmetry: {}/100{marker}\n",
            symmetry.score
        ));
    }
    out.push('\n');

    // Pillar scores (compact)
    out.push_str(&format!("{BOLD}PILLARS{RESET}\n"));
    out.push_str(&format!(
        "  Structure: {}  Rhythm: {}  Voice: {}\n\n",
        format_score(report.structure_score),
        format_score(report.rhythm_score),
        format_score(report.voice_score)
    ));

    // Findings summary
    let fs = &report.findings_summary;
    out.push_str(&format!("{BOLD}FINDINGS{RESET} ({} total)\n", fs.total));

    let mut summary_parts = Vec::new();
    if fs.critical > 0 {
        summary_parts.push(format!("\x1b[31m{} critical{RESET}", fs.critical));
    }
    if fs.high > 0 {
        summary_parts.push(format!("\x1b[91m{} high{RESET}", fs.high));
    }
    if fs.medium > 0 {
        summary_parts.push(format!("\x1b[33m{} medium{RESET}", fs.medium));
    }
    if fs.low > 0 {
        summary_parts.push(format!("\x1b[34m{} low{RESET}", fs.low));
    }
    if fs.info > 0 {
        summary_parts.push(format!("\x1b[90m{} info{RESET}", fs.info));
    }
    if !summary_parts.is_empty() {
        out.push_str(&format!("  {}\n\n", summary_parts.join(" | ")));
    }

    // Top findings as table
    if !report.findings.is_empty() {
        out.push_str(&format!(
            "{DIM}  #   SEV   TITLE                                      STEP{RESET}\n"
        ));
        out.push_str(&format!(
            "{DIM}  ─────────────────────────────────────────────────────────────────{RESET}\n"
        ));

        for (i, finding) in report.findings.iter().take(10).enumerate() {
            let sev_c = severity_color(&finding.severity);
            let sev_tag = severity_tag(&finding.severity);

            // Truncate by chars to avoid splitting UTF-8
            let title = if finding.title.chars().count() > 40 {
                let short: String = finding.title.chars().take(37).collect();
                format!("{short}...")
            } else {
                finding.title.clone()
            };

            out.push_str(&format!(
                "  {:<3} {sev_c}{sev_tag}{RESET}   {:<42} {DIM}{}{}{RESET}\n",
                i + 1,
                title,
                finding.step,
                finding
                    .line
                    .map(|l| format!(":{l}"))
                    .unwrap_or_default()
            ));
        }

        if report.findings.len() > 10 {
            out.push_str(&format!(
                "{DIM}  ... and {} more (use `stylometer findings` to list all){RESET}\n",
                report.findings.len() - 10
            ));
        }
        out.push('\n');
    }

    // Grade-keyed closing tip
    out.push_str(&grade_tip(&report.grade));
    out.push('\n');

    Ok(out)
}

fn format_score(score: f64) -> String {
    let color = match score {
        s if s >= 80.0 => "\x1b[32m",
        s if s >= 60.0 => "\x1b[33m",
        _ => "\x1b[31m",
    };
    format!("{color}{score:.0}{RESET}")
}

fn grade_tip(grade: &str) -> String {
    let tip = match grade {
        "A" => "Reads as naturally human. Nothing worth rewriting.",
        "B" => "Mostly natural. Skim the findings for easy wins.",
        "C" => "Mixed signals. Work through the high-severity findings first.",
        "D" => "Strong uniformity patterns. Rewrite the flagged passages (try `stylometer rewrite`).",
        _ => "Reads as generated throughout. A surface edit won't be enough; rework it section by section.",
    };
    format!("{DIM}{tip}{RESET}\n")
}

/// Strip ANSI escape sequences for --no-color / piped output
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip to the terminating letter of the CSI sequence
            for n in chars.by_ref() {
                if n.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentSummary, Finding, FindingsSummary, SymmetryInfo};

    fn report() -> AnalysisReport {
        let findings = vec![Finding {
            id: "abc".to_string(),
            step: "sentence-length".to_string(),
            severity: Severity::High,
            title: "Flat sentence rhythm in paragraph 2".to_string(),
            description: "desc".to_string(),
            line: Some(12),
            ..Default::default()
        }];
        AnalysisReport {
            authenticity_score: 62.5,
            grade: "D".to_string(),
            risk: RiskLevel::Mixed,
            structure_score: 70.0,
            rhythm_score: 50.0,
            voice_score: 68.0,
            findings_summary: FindingsSummary::from_findings(&findings),
            findings,
            document: DocumentSummary {
                sections: 4,
                paragraphs: 12,
                sentences: 40,
                words: 800,
            },
            symmetry: Some(SymmetryInfo {
                score: 85,
                is_symmetric: true,
            }),
        }
    }

    #[test]
    fn test_render_contains_headline_numbers() {
        let out = render(&report(), true).unwrap();
        assert!(out.contains("62.5/100"));
        assert!(out.contains("Grade:"));
        assert!(out.contains("mixed signals"));
        assert!(out.contains("85/100 (suspicious)"));
        assert!(out.contains("Flat sentence rhythm"));
    }

    #[test]
    fn test_no_color_strips_ansi() {
        let out = render(&report(), false).unwrap();
        assert!(!out.contains('\x1b'));
        assert!(out.contains("62.5/100"));
    }
}
