//! Markdown reporter - shareable GitHub-flavored report

use crate::models::AnalysisReport;
use anyhow::Result;

/// Render the report as GitHub-flavored Markdown
pub fn render(report: &AnalysisReport) -> Result<String> {
    let mut out = String::new();

    out.push_str("# Stylometer Report\n\n");
    out.push_str(&format!(
        "**Authenticity: {:.1}/100 (grade {})** — {}\n\n",
        report.authenticity_score, report.grade, report.risk
    ));

    out.push_str("| Pillar | Score |\n|---|---|\n");
    out.push_str(&format!("| Structure | {:.0} |\n", report.structure_score));
    out.push_str(&format!("| Rhythm | {:.0} |\n", report.rhythm_score));
    out.push_str(&format!("| Voice | {:.0} |\n\n", report.voice_score));

    let doc = &report.document;
    out.push_str(&format!(
        "{} sections, {} paragraphs, {} sentences, {} words",
        doc.sections, doc.paragraphs, doc.sentences, doc.words
    ));
    if let Some(symmetry) = &report.symmetry {
        out.push_str(&format!(
            " · layout symmetry {}/100{}",
            symmetry.score,
            if symmetry.is_symmetric {
                " (suspicious)"
            } else {
                ""
            }
        ));
    }
    out.push_str("\n\n");

    if report.findings.is_empty() {
        out.push_str("No findings.\n");
        return Ok(out);
    }

    out.push_str(&format!(
        "## Findings ({})\n\n| # | Severity | Step | Title |\n|---|---|---|---|\n",
        report.findings.len()
    ));
    for (i, finding) in report.findings.iter().enumerate() {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            i + 1,
            finding.severity,
            finding.step,
            finding.title.replace('|', "\\|")
        ));
    }
    out.push('\n');

    for (i, finding) in report.findings.iter().enumerate() {
        out.push_str(&format!(
            "### {}. {} ({})\n\n{}\n",
            i + 1,
            finding.title,
            finding.severity,
            finding.description
        ));
        if let Some(fix) = &finding.suggested_fix {
            out.push_str(&format!("\n**Suggested fix:** {fix}\n"));
        }
        if !finding.metrics.is_empty() {
            let metrics: Vec<String> = finding
                .metrics
                .iter()
                .map(|(k, v)| format!("`{k}={v}`"))
                .collect();
            out.push_str(&format!("\n{}\n", metrics.join(" ")));
        }
        out.push('\n');
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DocumentSummary, Finding, FindingsSummary, RiskLevel, Severity,
    };

    #[test]
    fn test_markdown_structure() {
        let findings = vec![Finding {
            step: "human-features".to_string(),
            severity: Severity::Medium,
            title: "Prose avoids contractions".to_string(),
            description: "Only 0.5 per 1000 words.".to_string(),
            suggested_fix: Some("Contract where you'd speak it.".to_string()),
            ..Default::default()
        }];
        let report = AnalysisReport {
            authenticity_score: 74.0,
            grade: "C".to_string(),
            risk: RiskLevel::Mixed,
            structure_score: 80.0,
            rhythm_score: 70.0,
            voice_score: 70.0,
            findings_summary: FindingsSummary::from_findings(&findings),
            findings,
            document: DocumentSummary::default(),
            symmetry: None,
        };

        let md = render(&report).unwrap();
        assert!(md.starts_with("# Stylometer Report"));
        assert!(md.contains("| Structure | 80 |"));
        assert!(md.contains("## Findings (1)"));
        assert!(md.contains("**Suggested fix:**"));
    }
}
