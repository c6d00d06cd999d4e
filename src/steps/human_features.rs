//! Step 5: human feature analysis
//!
//! A list-driven lexical scan for the fingerprints humans leave and
//! generators avoid: contractions, first/second person, questions,
//! asides. The inverse list also runs: stock boilerplate phrases that
//! generators reach for ("delve into", "it is important to note").

use crate::document::Document;
use crate::models::{deterministic_finding_id, Finding, Severity};
use crate::steps::base::{AnalysisStep, StepContext};
use anyhow::Result;
use regex::Regex;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Contractions per 1000 words below this reads as scrubbed prose
pub const MIN_CONTRACTIONS_PER_KILOWORD: f64 = 2.0;

/// Stock-phrase hits at or above this escalate to high severity
pub const STOCK_PHRASE_HIGH_COUNT: usize = 3;

/// Documents shorter than this skip the density checks
pub const MIN_WORDS_FOR_VOICE: usize = 100;

/// First/second-person markers, matched as whole lowercase words
const PERSONAL_PRONOUNS: &[&str] = &[
    "i", "i'm", "i've", "i'll", "i'd", "we", "we're", "we've", "we'll", "we'd", "you", "you're",
    "you've", "you'll", "you'd", "my", "our", "your", "me", "us", "mine", "ours", "yours",
];

/// Boilerplate phrases characteristic of generated prose.
/// Matched case-insensitively as substrings of the document text.
const STOCK_PHRASES: &[&str] = &[
    "delve into",
    "delves into",
    "delving into",
    "it is important to note",
    "it's important to note",
    "it is worth noting",
    "in today's fast-paced world",
    "in the ever-evolving landscape",
    "plays a crucial role",
    "plays a pivotal role",
    "a testament to",
    "navigate the complexities",
    "unlock the potential",
    "harness the power",
    "at the end of the day",
    "when it comes to",
    "in the realm of",
    "a myriad of",
    "embark on a journey",
    "the digital age",
    "seamlessly integrate",
    "robust and scalable",
    "furthermore, it is",
    "in conclusion, it is clear",
];

fn contraction_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z]+'(?:t|s|re|ve|ll|d|m)\b").expect("valid regex")
    })
}

pub struct HumanFeaturesStep;

impl AnalysisStep for HumanFeaturesStep {
    fn name(&self) -> &'static str {
        "human-features"
    }

    fn title(&self) -> &'static str {
        "Human Features"
    }

    fn number(&self) -> u8 {
        5
    }

    fn description(&self) -> &'static str {
        "Scans for human voice markers and AI boilerplate phrases"
    }

    fn analyze(&self, doc: &Document, ctx: &StepContext<'_>) -> Result<Vec<Finding>> {
        let min_contractions = ctx
            .config
            .threshold_f64("min_contractions_per_kiloword", MIN_CONTRACTIONS_PER_KILOWORD);
        let min_words = ctx.config.threshold_usize("min_words", MIN_WORDS_FOR_VOICE);

        let text = document_text(doc);
        let features = scan_features(&text, doc.word_count);

        debug!(
            "Voice scan: {} contractions, {} pronouns, {} questions, {} asides, {} stock hits",
            features.contractions,
            features.personal_pronouns,
            features.questions,
            features.asides,
            features.stock_hits()
        );

        let mut findings = Vec::new();

        if doc.word_count >= min_words {
            if features.contractions_per_kiloword < min_contractions {
                let title = "Prose avoids contractions";
                findings.push(
                    Finding {
                        id: deterministic_finding_id(self.name(), None, None, title),
                        step: self.name().to_string(),
                        severity: Severity::Medium,
                        title: title.to_string(),
                        description: format!(
                            "Only {:.1} contractions per 1000 words ({} in {} words). \
                             Informal human writing averages far more.",
                            features.contractions_per_kiloword,
                            features.contractions,
                            doc.word_count
                        ),
                        suggested_fix: Some(
                            "Contract where you'd speak it: \"it is\" to \"it's\", \
                             \"do not\" to \"don't\"."
                                .to_string(),
                        ),
                        ..Default::default()
                    }
                    .with_metric(
                        "per_kiloword",
                        format!("{:.4}", features.contractions_per_kiloword),
                    )
                    .with_metric("contractions", features.contractions),
                );
            }

            if features.personal_pronouns == 0 {
                let title = "No first- or second-person voice";
                findings.push(
                    Finding {
                        id: deterministic_finding_id(self.name(), None, None, title),
                        step: self.name().to_string(),
                        severity: Severity::Medium,
                        title: title.to_string(),
                        description: "The document never says I, we, or you. Every claim \
                                      floats free of a speaker."
                            .to_string(),
                        suggested_fix: Some(
                            "Own one opinion per section: \"I think\", \"we found\", \
                             \"you'll notice\"."
                                .to_string(),
                        ),
                        ..Default::default()
                    }
                    .with_metric("pronouns", 0),
                );
            }

            if features.questions == 0 && features.asides == 0 {
                let title = "No questions or asides";
                findings.push(
                    Finding {
                        id: deterministic_finding_id(self.name(), None, None, title),
                        step: self.name().to_string(),
                        severity: Severity::Low,
                        title: title.to_string(),
                        description: "Nothing is asked and nothing is whispered in \
                                      parentheses; the register never breaks."
                            .to_string(),
                        suggested_fix: Some(
                            "Pose one real question. Tuck one aside into parentheses \
                             (like this)."
                                .to_string(),
                        ),
                        ..Default::default()
                    }
                    .with_metric("questions", 0)
                    .with_metric("asides", 0),
                );
            }
        }

        if !features.stock_phrases.is_empty() {
            let total_hits = features.stock_hits();
            let severity = if total_hits >= STOCK_PHRASE_HIGH_COUNT {
                Severity::High
            } else {
                Severity::Medium
            };

            let mut examples: Vec<(&str, usize)> = features
                .stock_phrases
                .iter()
                .map(|(p, c)| (*p, *c))
                .collect();
            examples.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
            let listed: Vec<String> = examples
                .iter()
                .take(5)
                .map(|(p, c)| format!("\"{p}\" x{c}"))
                .collect();

            let title = "Stock AI phrases present";
            findings.push(
                Finding {
                    id: deterministic_finding_id(self.name(), None, None, title),
                    step: self.name().to_string(),
                    severity,
                    title: title.to_string(),
                    description: format!(
                        "{total_hits} hits from the boilerplate list: {}.",
                        listed.join(", ")
                    ),
                    suggested_fix: Some(
                        "Replace each phrase with the specific thing it is hand-waving \
                         at, or delete the sentence."
                            .to_string(),
                    ),
                    why_it_matters: Some(
                        "These phrases appear orders of magnitude more often in \
                         generated text than in human corpora."
                            .to_string(),
                    ),
                    ..Default::default()
                }
                .with_metric("total_hits", total_hits)
                .with_metric("distinct_phrases", features.stock_phrases.len()),
            );
        }

        Ok(findings)
    }
}

/// Tallies from one pass over the document text
#[derive(Debug, Default)]
pub struct VoiceFeatures {
    pub contractions: usize,
    pub contractions_per_kiloword: f64,
    pub personal_pronouns: usize,
    pub questions: usize,
    pub asides: usize,
    pub stock_phrases: FxHashMap<&'static str, usize>,
}

impl VoiceFeatures {
    pub fn stock_hits(&self) -> usize {
        self.stock_phrases.values().sum()
    }
}

fn document_text(doc: &Document) -> String {
    doc.paragraphs()
        .map(|p| p.text())
        .collect::<Vec<_>>()
        .join("\n")
}

/// One pass over the text collecting every voice tally
pub fn scan_features(text: &str, word_count: usize) -> VoiceFeatures {
    let lower = text.to_lowercase();

    let contractions = contraction_regex().find_iter(text).count();
    let kilowords = (word_count as f64 / 1000.0).max(f64::EPSILON);

    let personal_pronouns = lower
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| PERSONAL_PRONOUNS.contains(w))
        .count();

    let questions = text.matches('?').count();
    // Asides: parenthetical remarks and dash interjections
    let asides = text.matches('(').count()
        + text.matches(" - ").count()
        + text.matches('\u{2014}').count();

    let mut stock_phrases = FxHashMap::default();
    for phrase in STOCK_PHRASES {
        let count = lower.matches(phrase).count();
        if count > 0 {
            stock_phrases.insert(*phrase, count);
        }
    }

    VoiceFeatures {
        contractions,
        contractions_per_kiloword: contractions as f64 / kilowords,
        personal_pronouns,
        questions,
        asides,
        stock_phrases,
    }
}

/// Natural-voice signals feeding the voice pillar bonus
pub fn voice_signals(doc: &Document) -> usize {
    let text = document_text(doc);
    let features = scan_features(&text, doc.word_count);

    let mut signals = 0;
    if features.contractions_per_kiloword >= MIN_CONTRACTIONS_PER_KILOWORD {
        signals += 1;
    }
    if features.personal_pronouns > 0 {
        signals += 1;
    }
    if features.questions > 0 {
        signals += 1;
    }
    if features.asides > 0 {
        signals += 1;
    }
    if features.stock_phrases.is_empty() {
        signals += 1;
    }
    signals
}
