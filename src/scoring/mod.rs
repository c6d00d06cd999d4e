//! Authenticity scoring - turns findings into a 0-100 score
//!
//! Three pillars mirror the analysis axes: structure (section findings),
//! rhythm (sentence and paragraph length findings), voice (human-feature
//! findings). Each pillar starts at 100, loses penalty per finding scaled
//! by document length, and earns back a bonus for natural-variation
//! signals, capped at half the penalty.

use crate::config::PillarWeights;
use crate::document::Document;
use crate::models::{AnalysisReport, Finding, FindingsSummary, RiskLevel, Severity};
use crate::steps::{human_features, section_uniformity, sentence_length};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Penalty scale applied per severity weight
const PENALTY_SCALE: f64 = 5.0;

/// Floor for a pillar before its bonus
const PILLAR_FLOOR: f64 = 25.0;

/// Points earned per natural-variation signal
const SIGNAL_BONUS: f64 = 2.0;

/// Short documents are scored as if they had at least this many kilowords,
/// so a single finding in a tweet-sized note does not crater the score
const MIN_KILOWORDS: f64 = 0.25;

/// Severity weight used in penalty calculation
fn severity_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 8.0,
        Severity::High => 4.0,
        Severity::Medium => 1.0,
        Severity::Low => 0.2,
        Severity::Info => 0.0,
    }
}

/// Which pillar a step's findings count against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pillar {
    Structure,
    Rhythm,
    Voice,
}

/// Map a step name to its pillar
pub fn pillar_for_step(step: &str) -> Pillar {
    match step {
        "section-uniformity" | "section-roles" => Pillar::Structure,
        "paragraph-roles" | "sentence-length" => Pillar::Rhythm,
        "human-features" => Pillar::Voice,
        // The validation gate summarizes structure-level readiness
        _ => Pillar::Structure,
    }
}

/// Natural-variation signal counts per pillar, used for the bonus
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NaturalSignals {
    pub structure: usize,
    pub rhythm: usize,
    pub voice: usize,
}

impl NaturalSignals {
    /// Collect signals from the document itself
    pub fn from_document(doc: &Document) -> Self {
        Self {
            structure: section_uniformity::structure_signals(doc),
            rhythm: sentence_length::rhythm_signals(doc),
            voice: human_features::voice_signals(doc),
        }
    }
}

/// One pillar's score: clamp(100 - penalty, 25, 100) + capped bonus
fn pillar_score(penalty: f64, signals: usize) -> f64 {
    let base = (100.0 - penalty).clamp(PILLAR_FLOOR, 100.0);
    let bonus = (signals as f64 * SIGNAL_BONUS).min(penalty * 0.5);
    (base + bonus).min(100.0)
}

/// Score the findings into a full report
pub fn score(doc: &Document, findings: Vec<Finding>, weights: &PillarWeights) -> AnalysisReport {
    let kilowords = (doc.word_count as f64 / 1000.0).max(MIN_KILOWORDS);
    let signals = NaturalSignals::from_document(doc);

    let mut penalties = [0.0f64; 3];
    for finding in &findings {
        let idx = match pillar_for_step(&finding.step) {
            Pillar::Structure => 0,
            Pillar::Rhythm => 1,
            Pillar::Voice => 2,
        };
        penalties[idx] += severity_weight(finding.severity) * PENALTY_SCALE / kilowords;
    }

    let structure_score = pillar_score(penalties[0], signals.structure);
    let rhythm_score = pillar_score(penalties[1], signals.rhythm);
    let voice_score = pillar_score(penalties[2], signals.voice);

    let mut weights = weights.clone();
    weights.normalize();
    let authenticity_score = structure_score * weights.structure
        + rhythm_score * weights.rhythm
        + voice_score * weights.voice;

    debug!(
        "Scores: structure {:.1}, rhythm {:.1}, voice {:.1} -> overall {:.1}",
        structure_score, rhythm_score, voice_score, authenticity_score
    );

    let findings_summary = FindingsSummary::from_findings(&findings);

    AnalysisReport {
        authenticity_score,
        grade: AnalysisReport::grade_from_score(authenticity_score),
        risk: RiskLevel::from_score(authenticity_score),
        structure_score,
        rhythm_score,
        voice_score,
        findings,
        findings_summary,
        document: doc.summary(),
        symmetry: section_uniformity::layout_symmetry(doc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    fn finding(step: &str, severity: Severity) -> Finding {
        Finding {
            step: step.to_string(),
            severity,
            ..Default::default()
        }
    }

    /// Human-looking fixture: varied paragraphs, contractions, a question
    fn varied_doc() -> Document {
        Document::from_text(
            "t.md",
            "I don't think the layout matters much here, honestly. Why would it? \
             This paragraph runs long enough to anchor one end of the spread with many words.\n\n\
             Short one.\n\n\
             A closing paragraph of middling size wraps the fixture up (more or less) cleanly.\n",
        )
    }

    #[test]
    fn test_clean_document_scores_high() {
        let doc = varied_doc();
        let report = score(&doc, vec![], &PillarWeights::default());

        assert!(report.authenticity_score >= 90.0);
        assert_eq!(report.grade, "A");
        assert_eq!(report.risk, RiskLevel::LikelyHuman);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_findings_drag_their_pillar() {
        let doc = varied_doc();
        let findings = vec![
            finding("sentence-length", Severity::High),
            finding("sentence-length", Severity::High),
        ];
        let report = score(&doc, findings, &PillarWeights::default());

        assert!(report.rhythm_score < report.structure_score);
        assert!(report.rhythm_score < report.voice_score);
    }

    #[test]
    fn test_info_findings_are_free() {
        let doc = varied_doc();
        let baseline = score(&doc, vec![], &PillarWeights::default());
        let with_info = score(
            &doc,
            vec![finding("validation", Severity::Info)],
            &PillarWeights::default(),
        );
        assert_eq!(
            baseline.authenticity_score,
            with_info.authenticity_score
        );
    }

    #[test]
    fn test_pillar_floor_holds() {
        let doc = varied_doc();
        // Enough critical findings to drive the raw penalty far past 75
        let findings: Vec<Finding> = (0..50)
            .map(|_| finding("human-features", Severity::Critical))
            .collect();
        let report = score(&doc, findings, &PillarWeights::default());

        // Floor plus at most the signal bonus
        assert!(report.voice_score >= PILLAR_FLOOR);
        assert!(report.voice_score <= PILLAR_FLOOR + 5.0 * SIGNAL_BONUS);
    }

    #[test]
    fn test_bonus_capped_by_penalty() {
        // Zero penalty means zero bonus: a clean pillar cannot exceed 100
        assert_eq!(pillar_score(0.0, 10), 100.0);
        // Small penalty: bonus capped at half of it
        let scored = pillar_score(2.0, 10);
        assert_eq!(scored, 98.0 + 1.0);
    }

    #[test]
    fn test_custom_weights_normalized() {
        let doc = varied_doc();
        let findings = vec![finding("human-features", Severity::High)];

        let lopsided = PillarWeights {
            structure: 0.0,
            rhythm: 0.0,
            voice: 10.0,
        };
        let report = score(&doc, findings, &lopsided);
        // All weight on voice: overall equals the voice pillar
        assert!((report.authenticity_score - report.voice_score).abs() < 1e-9);
    }

    #[test]
    fn test_severity_weights_ladder() {
        assert_eq!(severity_weight(Severity::Critical), 8.0);
        assert_eq!(severity_weight(Severity::High), 4.0);
        assert_eq!(severity_weight(Severity::Medium), 1.0);
        assert_eq!(severity_weight(Severity::Low), 0.2);
        assert_eq!(severity_weight(Severity::Info), 0.0);
    }
}
