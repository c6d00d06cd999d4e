//! Step 4: sentence length distribution
//!
//! The strongest rhythm signal. Human prose mixes short punches with
//! long winding sentences; generated prose settles into a narrow band.
//! Per paragraph this step classifies the sentence-length CV against
//! a three-cut band set; at document level it checks the spread of
//! paragraph lengths.

use crate::document::Document;
use crate::models::{deterministic_finding_id, Finding, Severity};
use crate::stats::{compute_variation_metrics, CvBands, UniformityClass};
use crate::steps::base::{AnalysisStep, StepContext};
use anyhow::Result;
use tracing::debug;

/// Sentence-length CV below this is high severity ("very low variation")
pub const SENTENCE_CV_VERY_LOW: f64 = 0.2;

/// Sentence-length CV below this is medium severity ("low variation")
pub const SENTENCE_CV_LOW: f64 = 0.25;

/// Sentence-length CV at or above this reads as natural rhythm
pub const SENTENCE_CV_NATURAL: f64 = 0.35;

/// Document paragraph-length CV below this is high risk
pub const PARAGRAPH_CV_HIGH: f64 = 0.3;

/// Document paragraph-length CV target; below it is still moderate risk
pub const PARAGRAPH_CV_TARGET: f64 = 0.4;

/// Paragraphs need this many sentences before their rhythm is judged
pub const MIN_SENTENCES: usize = 3;

/// Fraction of judged paragraphs in the moderate band that earns a note
pub const PERVASIVE_MODERATE_RATIO: f64 = 0.5;

pub struct SentenceLengthStep;

impl AnalysisStep for SentenceLengthStep {
    fn name(&self) -> &'static str {
        "sentence-length"
    }

    fn title(&self) -> &'static str {
        "Sentence Length"
    }

    fn number(&self) -> u8 {
        4
    }

    fn description(&self) -> &'static str {
        "Measures sentence and paragraph length variation"
    }

    fn analyze(&self, doc: &Document, ctx: &StepContext<'_>) -> Result<Vec<Finding>> {
        let sentence_bands = CvBands {
            severe: Some(ctx.config.threshold_f64("very_low_cv", SENTENCE_CV_VERY_LOW)),
            uniform: ctx.config.threshold_f64("low_cv", SENTENCE_CV_LOW),
            natural: ctx.config.threshold_f64("natural_cv", SENTENCE_CV_NATURAL),
        };
        let paragraph_bands = CvBands {
            severe: None,
            uniform: ctx.config.threshold_f64("paragraph_high_cv", PARAGRAPH_CV_HIGH),
            natural: ctx
                .config
                .threshold_f64("paragraph_target_cv", PARAGRAPH_CV_TARGET),
        };
        let min_sentences = ctx.config.threshold_usize("min_sentences", MIN_SENTENCES);

        let mut findings = Vec::new();
        let mut judged = 0usize;
        let mut moderate = 0usize;

        for (index, paragraph) in doc.paragraphs().enumerate() {
            if paragraph.sentences.len() < min_sentences {
                continue;
            }
            judged += 1;

            let lengths: Vec<f64> = paragraph
                .sentences
                .iter()
                .map(|s| s.word_count as f64)
                .collect();
            let metrics = compute_variation_metrics(&lengths, &sentence_bands)?;

            match metrics.classification {
                UniformityClass::SeverelyUniform => {
                    let title = format!("Flat sentence rhythm in paragraph {}", index + 1);
                    findings.push(
                        Finding {
                            id: deterministic_finding_id(self.name(), None, Some(index), &title),
                            step: self.name().to_string(),
                            severity: Severity::High,
                            title,
                            description: format!(
                                "Sentence lengths vary by only {:.0}% around {:.1} words \
                                 (CV {:.2}) across {} sentences.",
                                metrics.cv * 100.0,
                                metrics.mean,
                                metrics.cv,
                                paragraph.sentences.len()
                            ),
                            paragraph: Some(index),
                            line: Some(paragraph.line_start),
                            suggested_fix: Some(
                                "Cut one sentence to four words. Let another run to thirty. \
                                 The ear needs the contrast."
                                    .to_string(),
                            ),
                            why_it_matters: Some(
                                "Near-constant sentence length is the single most measurable \
                                 fingerprint of generated text."
                                    .to_string(),
                            ),
                            ..Default::default()
                        }
                        .with_metric("cv", format!("{:.4}", metrics.cv))
                        .with_metric("mean_words", format!("{:.4}", metrics.mean))
                        .with_metric("sentences", paragraph.sentences.len()),
                    );
                }
                UniformityClass::TooUniform => {
                    let title = format!("Low sentence variation in paragraph {}", index + 1);
                    findings.push(
                        Finding {
                            id: deterministic_finding_id(self.name(), None, Some(index), &title),
                            step: self.name().to_string(),
                            severity: Severity::Medium,
                            title,
                            description: format!(
                                "Sentence lengths cluster around {:.1} words (CV {:.2}).",
                                metrics.mean, metrics.cv
                            ),
                            paragraph: Some(index),
                            line: Some(paragraph.line_start),
                            suggested_fix: Some(
                                "Vary the cadence: split one long sentence, merge two short \
                                 ones."
                                    .to_string(),
                            ),
                            ..Default::default()
                        }
                        .with_metric("cv", format!("{:.4}", metrics.cv))
                        .with_metric("mean_words", format!("{:.4}", metrics.mean)),
                    );
                }
                UniformityClass::Moderate => moderate += 1,
                UniformityClass::Natural | UniformityClass::InsufficientData => {}
            }
        }

        debug!(
            "Sentence rhythm: {} paragraphs judged, {} moderate, {} flagged",
            judged,
            moderate,
            findings.len()
        );

        // A moderate band here and there is fine; everywhere is a pattern
        if judged > 0 && (moderate as f64 / judged as f64) >= PERVASIVE_MODERATE_RATIO {
            let title = "Sentence rhythm hovers below natural throughout";
            findings.push(
                Finding {
                    id: deterministic_finding_id(self.name(), None, None, title),
                    step: self.name().to_string(),
                    severity: Severity::Info,
                    title: title.to_string(),
                    description: format!(
                        "{moderate} of {judged} paragraphs sit in the moderate variation \
                         band (CV between {:.2} and {:.2}); none is flagged on its own, \
                         but the whole document runs at the same muted rhythm.",
                        sentence_bands.uniform, sentence_bands.natural
                    ),
                    ..Default::default()
                }
                .with_metric("moderate_paragraphs", moderate)
                .with_metric("judged_paragraphs", judged),
            );
        }

        findings.extend(self.check_paragraph_spread(doc, &paragraph_bands)?);

        Ok(findings)
    }
}

impl SentenceLengthStep {
    /// Document-level paragraph word-count spread against the 0.3 / 0.4 bands
    fn check_paragraph_spread(&self, doc: &Document, bands: &CvBands) -> Result<Vec<Finding>> {
        let lengths = doc.paragraph_word_counts();
        let metrics = compute_variation_metrics(&lengths, bands)?;

        let (severity, label) = match metrics.classification {
            UniformityClass::TooUniform => (Severity::High, "far below"),
            UniformityClass::Moderate => (Severity::Medium, "below"),
            _ => return Ok(Vec::new()),
        };

        let title = "Paragraph lengths are too even across the document";
        Ok(vec![Finding {
            id: deterministic_finding_id(self.name(), None, None, title),
            step: self.name().to_string(),
            severity,
            title: title.to_string(),
            description: format!(
                "Paragraph word counts vary with CV {:.2}, {} the {:.1} target. \
                 Mean paragraph length is {:.0} words over {} paragraphs.",
                metrics.cv,
                label,
                bands.natural,
                metrics.mean,
                lengths.len()
            ),
            suggested_fix: Some(
                "Add a one-line paragraph for emphasis and let one thought sprawl \
                 across a long one."
                    .to_string(),
            ),
            ..Default::default()
        }
        .with_metric("cv", format!("{:.4}", metrics.cv))
        .with_metric("target_cv", format!("{:.4}", bands.natural))
        .with_metric("mean_words", format!("{:.4}", metrics.mean))])
    }
}

/// Natural-variation signals feeding the rhythm pillar bonus: paragraphs
/// whose sentence rhythm clears the natural cut, plus one for a document
/// paragraph spread at or above target.
pub fn rhythm_signals(doc: &Document) -> usize {
    let sentence_bands = CvBands {
        severe: Some(SENTENCE_CV_VERY_LOW),
        uniform: SENTENCE_CV_LOW,
        natural: SENTENCE_CV_NATURAL,
    };

    let mut signals = doc
        .paragraphs()
        .filter(|p| p.sentences.len() >= MIN_SENTENCES)
        .filter(|p| {
            let lengths: Vec<f64> = p.sentences.iter().map(|s| s.word_count as f64).collect();
            compute_variation_metrics(&lengths, &sentence_bands)
                .map(|m| m.classification == UniformityClass::Natural)
                .unwrap_or(false)
        })
        .count();

    let paragraph_bands = CvBands {
        severe: None,
        uniform: PARAGRAPH_CV_HIGH,
        natural: PARAGRAPH_CV_TARGET,
    };
    if compute_variation_metrics(&doc.paragraph_word_counts(), &paragraph_bands)
        .map(|m| m.classification == UniformityClass::Natural)
        .unwrap_or(false)
    {
        signals += 1;
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Vec<Finding> {
        let doc = Document::from_text("t.md", text);
        SentenceLengthStep
            .analyze(&doc, &StepContext::default())
            .unwrap()
    }

    #[test]
    fn test_flat_rhythm_is_high_severity() {
        // Three sentences of exactly five words each: CV 0
        let findings = run(
            "One two three four five. Six seven eight nine ten. More words fill this out.\n",
        );
        let f = findings
            .iter()
            .find(|f| f.title.contains("Flat sentence rhythm"))
            .unwrap();
        assert_eq!(f.severity, Severity::High);
        assert_eq!(f.paragraph, Some(0));
        assert_eq!(f.metrics.get("cv").unwrap(), "0.0000");
    }

    #[test]
    fn test_short_paragraphs_not_judged() {
        // Two sentences: below the minimum, no rhythm verdict
        let findings = run("One two three four five. Six seven eight nine ten.\n");
        assert!(findings
            .iter()
            .all(|f| !f.title.contains("sentence") || !f.title.contains("paragraph 1")));
    }

    #[test]
    fn test_natural_rhythm_is_clean() {
        // Lengths 2, 9, 4, 15: plenty of spread
        let findings = run(
            "Short one. This sentence stretches out to nine words exactly here. \
             Then four more words. Finally a much longer sentence winds through sixteen \
             words before it reaches the end today.\n",
        );
        assert!(findings
            .iter()
            .all(|f| !f.title.contains("rhythm") && !f.title.contains("variation")));
    }

    #[test]
    fn test_document_paragraph_spread_flagged() {
        // Four paragraphs of identical word counts: document CV 0
        let findings = run("\
Short one. This sentence stretches out to nine words exactly here. Four more words now.

Short two. That sentence stretches out to nine words exactly there. Four more words again.

Short three. Some sentence stretches out to nine words exactly here. Four more words here.

Short four. Your sentence stretches out to nine words exactly then. Four more words also.
");
        let f = findings
            .iter()
            .find(|f| f.title.contains("Paragraph lengths"))
            .unwrap();
        assert_eq!(f.severity, Severity::High);
    }

    #[test]
    fn test_rhythm_signals_counted() {
        let doc = Document::from_text(
            "t.md",
            "Short one. This sentence stretches out to nine words exactly here. \
             Then four more words. Finally a much longer sentence winds through sixteen \
             words before it reaches the end today.\n\nTiny paragraph here.\n",
        );
        // First paragraph rhythm is natural; paragraph spread (30 vs 3 words)
        // clears the 0.4 target; the short paragraph is never judged.
        assert_eq!(rhythm_signals(&doc), 2);
    }
}
