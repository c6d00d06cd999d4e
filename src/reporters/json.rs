//! JSON reporter - machine-readable output for CI and tooling

use crate::models::AnalysisReport;
use anyhow::Result;

/// Render the full report as pretty-printed JSON
pub fn render(report: &AnalysisReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentSummary, FindingsSummary, RiskLevel};

    #[test]
    fn test_json_roundtrips() {
        let report = AnalysisReport {
            authenticity_score: 91.0,
            grade: "A".to_string(),
            risk: RiskLevel::LikelyHuman,
            structure_score: 95.0,
            rhythm_score: 88.0,
            voice_score: 90.0,
            findings: vec![],
            findings_summary: FindingsSummary::default(),
            document: DocumentSummary::default(),
            symmetry: None,
        };

        let json = render(&report).unwrap();
        let parsed: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.authenticity_score, 91.0);
        assert_eq!(parsed.risk, RiskLevel::LikelyHuman);

        // Wire names are stable snake_case
        assert!(json.contains("\"authenticity_score\""));
        assert!(json.contains("\"likely_human\""));
    }
}
