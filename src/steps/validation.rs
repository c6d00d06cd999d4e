//! Step 6: validation
//!
//! The wizard's exit gate. Runs after everything else, re-checks the
//! headline numbers against their targets, and emits a single pass/fail
//! summary finding listing each check. A passing document is ready for
//! export; a failing one names exactly what still needs work.

use crate::document::Document;
use crate::models::{deterministic_finding_id, Finding, Severity};
use crate::stats::{compute_variation_metrics, CvBands};
use crate::steps::base::{AnalysisStep, StepContext};
use crate::steps::sentence_length::{PARAGRAPH_CV_HIGH, PARAGRAPH_CV_TARGET};
use anyhow::Result;
use tracing::debug;

pub struct ValidationStep;

/// One named check with its verdict
struct Check {
    label: String,
    passed: bool,
}

impl AnalysisStep for ValidationStep {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn title(&self) -> &'static str {
        "Validation"
    }

    fn number(&self) -> u8 {
        6
    }

    fn description(&self) -> &'static str {
        "Final pass/fail gate over the accumulated results"
    }

    fn is_dependent(&self) -> bool {
        true
    }

    fn analyze(&self, doc: &Document, ctx: &StepContext<'_>) -> Result<Vec<Finding>> {
        let target_cv = ctx
            .config
            .threshold_f64("paragraph_target_cv", PARAGRAPH_CV_TARGET);

        let mut checks = Vec::new();

        // 1. Paragraph spread at or above target
        let bands = CvBands {
            severe: None,
            uniform: PARAGRAPH_CV_HIGH,
            natural: target_cv,
        };
        let spread = compute_variation_metrics(&doc.paragraph_word_counts(), &bands)?;
        checks.push(Check {
            label: format!(
                "paragraph length variation at target (CV {:.2}, target {:.2})",
                spread.cv, target_cv
            ),
            passed: spread.cv >= target_cv,
        });

        // 2. Sentence rhythm clean: no flagged paragraphs from step 4
        let rhythm_flags = ctx
            .prior_findings
            .iter()
            .filter(|f| f.step == "sentence-length" && f.severity >= Severity::Medium)
            .count();
        checks.push(Check {
            label: format!("sentence rhythm clean ({rhythm_flags} flagged)"),
            passed: rhythm_flags == 0,
        });

        // 3. No high or critical findings outstanding anywhere
        let outstanding = ctx
            .prior_findings
            .iter()
            .filter(|f| f.severity >= Severity::High)
            .count();
        checks.push(Check {
            label: format!("no high or critical findings ({outstanding} outstanding)"),
            passed: outstanding == 0,
        });

        let failed: Vec<&Check> = checks.iter().filter(|c| !c.passed).collect();
        debug!("Validation: {}/{} checks passed", checks.len() - failed.len(), checks.len());

        let checklist = checks
            .iter()
            .map(|c| format!("[{}] {}", if c.passed { "pass" } else { "FAIL" }, c.label))
            .collect::<Vec<_>>()
            .join("; ");

        let finding = if failed.is_empty() {
            let title = "Validation passed: ready for export";
            Finding {
                id: deterministic_finding_id(self.name(), None, None, title),
                step: self.name().to_string(),
                severity: Severity::Info,
                title: title.to_string(),
                description: format!("All {} checks passed: {checklist}.", checks.len()),
                ..Default::default()
            }
        } else {
            let title = "Validation failed";
            Finding {
                id: deterministic_finding_id(self.name(), None, None, title),
                step: self.name().to_string(),
                severity: Severity::Medium,
                title: title.to_string(),
                description: format!(
                    "{} of {} checks failed: {checklist}.",
                    failed.len(),
                    checks.len()
                ),
                suggested_fix: Some(
                    "Work through the outstanding findings, then re-run the analysis."
                        .to_string(),
                ),
                ..Default::default()
            }
        };

        Ok(vec![finding
            .with_metric("checks_total", checks.len())
            .with_metric("checks_failed", failed.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::base::StepContext;

    /// Paragraphs of 28, 4, and 13 words: CV well above 0.4
    const VARIED_DOC: &str = "\
A long opening paragraph that carries plenty of words across several clauses and keeps \
going until it has comfortably passed the thirty word mark for this test fixture.

Then a short one.

A middle-sized paragraph closes out the fixture with a dozen words in it.
";

    #[test]
    fn test_all_clean_passes() {
        let doc = crate::document::Document::from_text("t.md", VARIED_DOC);
        let findings = ValidationStep
            .analyze(&doc, &StepContext::default())
            .unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);
        assert!(findings[0].title.contains("ready for export"));
        assert_eq!(findings[0].metrics.get("checks_failed").unwrap(), "0");
    }

    #[test]
    fn test_outstanding_high_finding_fails() {
        let doc = crate::document::Document::from_text("t.md", VARIED_DOC);
        let prior = vec![Finding {
            step: "section-uniformity".to_string(),
            severity: Severity::High,
            title: "Suspiciously symmetric layout".to_string(),
            ..Default::default()
        }];
        let ctx = StepContext {
            prior_findings: &prior,
            ..Default::default()
        };

        let findings = ValidationStep.analyze(&doc, &ctx).unwrap();
        assert_eq!(findings[0].severity, Severity::Medium);
        assert!(findings[0].title.contains("failed"));
        assert!(findings[0].description.contains("1 outstanding"));
    }

    #[test]
    fn test_rhythm_flags_fail_their_check() {
        let doc = crate::document::Document::from_text("t.md", VARIED_DOC);
        let prior = vec![Finding {
            step: "sentence-length".to_string(),
            severity: Severity::Medium,
            title: "Low sentence variation in paragraph 2".to_string(),
            ..Default::default()
        }];
        let ctx = StepContext {
            prior_findings: &prior,
            ..Default::default()
        };

        let findings = ValidationStep.analyze(&doc, &ctx).unwrap();
        assert_eq!(findings[0].metrics.get("checks_failed").unwrap(), "1");
        assert!(findings[0].description.contains("sentence rhythm"));
    }

    #[test]
    fn test_uniform_paragraphs_fail_spread_check() {
        let doc = crate::document::Document::from_text(
            "t.md",
            "Five words sit right here.\n\nFive more words sit here.\n\nAnother five words rest here.\n",
        );
        let findings = ValidationStep
            .analyze(&doc, &StepContext::default())
            .unwrap();
        assert_eq!(findings[0].severity, Severity::Medium);
        assert_eq!(findings[0].metrics.get("checks_failed").unwrap(), "1");
    }
}
