//! Step 1: section uniformity
//!
//! Human writers produce sections of wildly different sizes; generated
//! text tends toward evenly portioned sections. This step measures the
//! coefficient of variation of paragraphs-per-section and
//! words-per-section and flags layouts that are too even, including a
//! combined 0-100 symmetry score.

use crate::document::Document;
use crate::models::{deterministic_finding_id, Finding, Severity, SymmetryInfo};
use crate::stats::{compute_variation_metrics, is_symmetric, symmetry_score, CvBands};
use crate::steps::base::{AnalysisStep, StepContext};
use anyhow::Result;
use tracing::debug;

/// CV below this means section sizes are suspiciously even
pub const SECTION_UNIFORMITY_CV: f64 = 0.3;

/// Symmetry needs at least this many sections to mean anything
pub const MIN_SECTIONS_FOR_SYMMETRY: usize = 3;

pub struct SectionUniformityStep;

impl AnalysisStep for SectionUniformityStep {
    fn name(&self) -> &'static str {
        "section-uniformity"
    }

    fn title(&self) -> &'static str {
        "Section Uniformity"
    }

    fn number(&self) -> u8 {
        1
    }

    fn description(&self) -> &'static str {
        "Checks whether sections are suspiciously even in size"
    }

    fn analyze(&self, doc: &Document, ctx: &StepContext<'_>) -> Result<Vec<Finding>> {
        let uniform_cv = ctx
            .config
            .threshold_f64("uniform_cv", SECTION_UNIFORMITY_CV);
        let min_sections = ctx
            .config
            .threshold_usize("min_sections", MIN_SECTIONS_FOR_SYMMETRY);
        let bands = CvBands::uniform_at(uniform_cv);

        let para_counts: Vec<f64> = doc
            .sections
            .iter()
            .map(|s| s.paragraphs.len() as f64)
            .collect();
        let word_counts: Vec<f64> = doc.sections.iter().map(|s| s.word_count() as f64).collect();

        let para_metrics = compute_variation_metrics(&para_counts, &bands)?;
        let word_metrics = compute_variation_metrics(&word_counts, &bands)?;

        debug!(
            "Section CVs: paragraphs {:.4}, words {:.4}",
            para_metrics.cv, word_metrics.cv
        );

        let mut findings = Vec::new();

        if para_metrics.classification.is_flagged() {
            let title = "Sections hold nearly identical paragraph counts";
            findings.push(
                Finding {
                    id: deterministic_finding_id(self.name(), None, None, title),
                    step: self.name().to_string(),
                    severity: Severity::Medium,
                    title: title.to_string(),
                    description: format!(
                        "Paragraphs per section vary by only {:.0}% around a mean of {:.1}. \
                         Human-organized sections rarely come this evenly portioned.",
                        para_metrics.cv * 100.0,
                        para_metrics.mean
                    ),
                    suggested_fix: Some(
                        "Merge or split sections so their sizes reflect the weight of their \
                         content instead of a fixed template."
                            .to_string(),
                    ),
                    why_it_matters: Some(
                        "Evenly portioned sections are a hallmark of outline-driven generation."
                            .to_string(),
                    ),
                    ..Default::default()
                }
                .with_metric("cv", format!("{:.4}", para_metrics.cv))
                .with_metric("mean", format!("{:.4}", para_metrics.mean))
                .with_metric("std_dev", format!("{:.4}", para_metrics.std_dev)),
            );
        }

        if word_metrics.classification.is_flagged() {
            let title = "Sections are nearly identical in length";
            findings.push(
                Finding {
                    id: deterministic_finding_id(self.name(), None, None, title),
                    step: self.name().to_string(),
                    severity: Severity::Medium,
                    title: title.to_string(),
                    description: format!(
                        "Words per section vary by only {:.0}% around a mean of {:.0} words.",
                        word_metrics.cv * 100.0,
                        word_metrics.mean
                    ),
                    suggested_fix: Some(
                        "Let important sections run long and minor ones stay short.".to_string(),
                    ),
                    ..Default::default()
                }
                .with_metric("cv", format!("{:.4}", word_metrics.cv))
                .with_metric("mean", format!("{:.4}", word_metrics.mean)),
            );
        }

        if doc.sections.len() >= min_sections {
            let score = symmetry_score(para_metrics.cv, word_metrics.cv);
            if is_symmetric(score) {
                let title = "Suspiciously symmetric layout";
                findings.push(
                    Finding {
                        id: deterministic_finding_id(self.name(), None, None, title),
                        step: self.name().to_string(),
                        severity: Severity::High,
                        title: title.to_string(),
                        description: format!(
                            "The document scores {}/100 for layout symmetry across {} sections. \
                             Sections match each other in both paragraph count and length.",
                            score,
                            doc.sections.len()
                        ),
                        suggested_fix: Some(
                            "Break the symmetry: expand one section with detail, collapse \
                             another to a sentence or two."
                                .to_string(),
                        ),
                        why_it_matters: Some(
                            "Symmetric layouts read as generated even when individual \
                             sentences do not."
                                .to_string(),
                        ),
                        ..Default::default()
                    }
                    .with_metric("symmetry_score", score)
                    .with_metric("paragraph_cv", format!("{:.4}", para_metrics.cv))
                    .with_metric("word_cv", format!("{:.4}", word_metrics.cv)),
                );
            }
        }

        Ok(findings)
    }
}

/// Layout symmetry for the report header; None below the section minimum.
pub fn layout_symmetry(doc: &Document) -> Option<SymmetryInfo> {
    if doc.sections.len() < MIN_SECTIONS_FOR_SYMMETRY {
        return None;
    }
    let bands = CvBands::uniform_at(SECTION_UNIFORMITY_CV);
    let para_counts: Vec<f64> = doc
        .sections
        .iter()
        .map(|s| s.paragraphs.len() as f64)
        .collect();
    let word_counts: Vec<f64> = doc.sections.iter().map(|s| s.word_count() as f64).collect();

    let para = compute_variation_metrics(&para_counts, &bands).ok()?;
    let words = compute_variation_metrics(&word_counts, &bands).ok()?;

    let score = symmetry_score(para.cv, words.cv);
    Some(SymmetryInfo {
        score,
        is_symmetric: is_symmetric(score),
    })
}

/// Natural-variation signals feeding the structure pillar bonus:
/// one per section-level sample whose CV clears the uniformity band.
pub fn structure_signals(doc: &Document) -> usize {
    let bands = CvBands::uniform_at(SECTION_UNIFORMITY_CV);
    let para_counts: Vec<f64> = doc
        .sections
        .iter()
        .map(|s| s.paragraphs.len() as f64)
        .collect();
    let word_counts: Vec<f64> = doc.sections.iter().map(|s| s.word_count() as f64).collect();

    [para_counts, word_counts]
        .iter()
        .filter(|sample| {
            compute_variation_metrics(sample, &bands)
                .map(|m| m.classification == crate::stats::UniformityClass::Natural)
                .unwrap_or(false)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Vec<Finding> {
        let doc = Document::from_text("t.md", text);
        SectionUniformityStep
            .analyze(&doc, &StepContext::default())
            .unwrap()
    }

    /// Four sections, each one paragraph of five words: maximal uniformity
    const UNIFORM_DOC: &str = "\
# Alpha

One two three four five.

# Beta

One two three four five.

# Gamma

One two three four five.

# Delta

One two three four five.
";

    #[test]
    fn test_uniform_layout_flags_and_scores_symmetric() {
        let findings = run(UNIFORM_DOC);

        assert!(findings
            .iter()
            .any(|f| f.title.contains("identical paragraph counts")));
        assert!(findings.iter().any(|f| f.title.contains("symmetric")));

        let symmetric = findings
            .iter()
            .find(|f| f.title.contains("symmetric"))
            .unwrap();
        assert_eq!(symmetric.severity, Severity::High);
        // Both CVs are 0, so the score is a perfect 100
        assert_eq!(symmetric.metrics.get("symmetry_score").unwrap(), "100");
    }

    #[test]
    fn test_varied_layout_is_clean() {
        let findings = run("\
# Short

One sentence only here.

# Long

This section runs much longer than the first one does. It keeps going with more material. \
And yet more words pile up in this paragraph.

Another paragraph follows in the same section with extra sentences. Plenty of words here too.

And a third paragraph, because this section truly earned its length in the outline.

# Medium

Two paragraphs live here with a moderate number of words in them.

The second one is fairly short.
");
        assert!(findings.is_empty());
    }

    #[test]
    fn test_two_sections_skip_symmetry() {
        // Uniform but only 2 sections: uniformity findings fire, symmetry does not
        let findings = run("\
# A

One two three four five.

# B

One two three four five.
");
        assert!(findings.iter().all(|f| !f.title.contains("symmetric")));
    }

    #[test]
    fn test_layout_symmetry_helper() {
        let doc = Document::from_text("t.md", UNIFORM_DOC);
        let info = layout_symmetry(&doc).unwrap();
        assert_eq!(info.score, 100);
        assert!(info.is_symmetric);

        let small = Document::from_text("t.md", "# One\n\nText here.\n");
        assert!(layout_symmetry(&small).is_none());
    }

    #[test]
    fn test_threshold_override() {
        let doc = Document::from_text("t.md", UNIFORM_DOC);
        let mut ctx = StepContext::default();
        ctx.config.thresholds.insert(
            "uniform_cv".to_string(),
            crate::config::ThresholdValue::Float(0.0),
        );
        // A zero band can never flag uniformity (cv >= 0 is never < 0)
        let findings = SectionUniformityStep.analyze(&doc, &ctx).unwrap();
        assert!(findings
            .iter()
            .all(|f| !f.title.contains("identical paragraph counts")));
    }
}
