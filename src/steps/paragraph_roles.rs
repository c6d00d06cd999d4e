//! Step 3: paragraph role detection
//!
//! Labels paragraphs (opening, topic, support, transition, closing,
//! question) from positional and lexical cues, then flags the patterns
//! generators fall into: stock transition openers on every other
//! paragraph, identical sentence counts everywhere, and a flow with no
//! questions or turns in it.

use crate::document::Document;
use crate::models::{deterministic_finding_id, Finding, Severity};
use crate::stats::{compute_variation_metrics, CvBands};
use crate::steps::base::{AnalysisStep, StepContext};
use anyhow::Result;
use tracing::debug;

/// Fraction of body paragraphs opening with a stock transition that flags
pub const TRANSITION_OPENER_RATIO: f64 = 0.5;

/// CV below this means paragraphs are built to the same sentence count
pub const PARAGRAPH_CONSTRUCTION_CV: f64 = 0.3;

/// Monotone flow needs at least this many paragraphs to be worth noting
pub const MIN_PARAGRAPHS_FOR_FLOW: usize = 6;

/// Stock transition words generators lean on to open paragraphs.
/// Matched case-insensitively against the start of the first sentence.
const STOCK_TRANSITIONS: &[&str] = &[
    "however",
    "furthermore",
    "moreover",
    "additionally",
    "in addition",
    "firstly",
    "secondly",
    "thirdly",
    "finally",
    "in conclusion",
    "on the other hand",
    "as a result",
    "therefore",
    "consequently",
    "overall",
    "in summary",
    "that being said",
    "with that in mind",
];

/// Role of a paragraph within the document flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphRole {
    Opening,
    Topic,
    Support,
    Transition,
    Closing,
    Question,
}

impl ParagraphRole {
    pub fn name(&self) -> &'static str {
        match self {
            ParagraphRole::Opening => "opening",
            ParagraphRole::Topic => "topic",
            ParagraphRole::Support => "support",
            ParagraphRole::Transition => "transition",
            ParagraphRole::Closing => "closing",
            ParagraphRole::Question => "question",
        }
    }
}

/// Whether a sentence opens with one of the stock transitions
pub fn opens_with_stock_transition(sentence: &str) -> bool {
    let lower = sentence.trim_start().to_lowercase();
    STOCK_TRANSITIONS.iter().any(|t| {
        lower.starts_with(t)
            && lower[t.len()..]
                .chars()
                .next()
                .map(|c| !c.is_alphanumeric())
                .unwrap_or(true)
    })
}

/// Classify one paragraph from its position and lexical cues.
///
/// `index` / `total` are document-wide paragraph positions;
/// `first_in_section` marks the paragraph right under a heading.
pub fn classify_paragraph(
    opening_sentence: Option<&str>,
    index: usize,
    total: usize,
    first_in_section: bool,
) -> ParagraphRole {
    if index == 0 {
        return ParagraphRole::Opening;
    }
    if total > 1 && index == total - 1 {
        return ParagraphRole::Closing;
    }
    if let Some(opening) = opening_sentence {
        if opening.trim_end().ends_with('?') {
            return ParagraphRole::Question;
        }
        if opens_with_stock_transition(opening) {
            return ParagraphRole::Transition;
        }
    }
    if first_in_section {
        ParagraphRole::Topic
    } else {
        ParagraphRole::Support
    }
}

pub struct ParagraphRolesStep;

impl AnalysisStep for ParagraphRolesStep {
    fn name(&self) -> &'static str {
        "paragraph-roles"
    }

    fn title(&self) -> &'static str {
        "Paragraph Roles"
    }

    fn number(&self) -> u8 {
        3
    }

    fn description(&self) -> &'static str {
        "Labels paragraphs and flags formulaic construction patterns"
    }

    fn analyze(&self, doc: &Document, ctx: &StepContext<'_>) -> Result<Vec<Finding>> {
        let opener_ratio = ctx
            .config
            .threshold_f64("transition_opener_ratio", TRANSITION_OPENER_RATIO);
        let uniform_cv = ctx
            .config
            .threshold_f64("uniform_cv", PARAGRAPH_CONSTRUCTION_CV);
        let min_paragraphs = ctx
            .config
            .threshold_usize("min_paragraphs", MIN_PARAGRAPHS_FOR_FLOW);

        let roles = label_paragraphs(doc);
        debug!(
            "Paragraph roles: {:?}",
            roles.iter().map(|r| r.name()).collect::<Vec<_>>()
        );

        let mut findings = Vec::new();
        findings.extend(self.check_transition_openers(doc, opener_ratio));
        findings.extend(self.check_uniform_construction(doc, uniform_cv)?);
        findings.extend(self.check_monotone_flow(&roles, min_paragraphs));
        Ok(findings)
    }
}

/// Roles for every paragraph in document order
pub fn label_paragraphs(doc: &Document) -> Vec<ParagraphRole> {
    let total = doc.paragraph_count();
    let mut roles = Vec::with_capacity(total);
    let mut index = 0usize;

    for section in &doc.sections {
        for (pos, paragraph) in section.paragraphs.iter().enumerate() {
            roles.push(classify_paragraph(
                paragraph.opening(),
                index,
                total,
                pos == 0,
            ));
            index += 1;
        }
    }
    roles
}

impl ParagraphRolesStep {
    /// Stock transitions opening most body paragraphs
    fn check_transition_openers(&self, doc: &Document, ratio_threshold: f64) -> Vec<Finding> {
        let total = doc.paragraph_count();
        if total < 3 {
            return Vec::new();
        }

        // Body = everything between the opener and the closer
        let body: Vec<_> = doc.paragraphs().skip(1).take(total - 2).collect();
        let stock: Vec<_> = body
            .iter()
            .filter(|p| p.opening().is_some_and(opens_with_stock_transition))
            .collect();

        let ratio = stock.len() as f64 / body.len() as f64;
        if ratio < ratio_threshold {
            return Vec::new();
        }

        let examples: Vec<String> = stock
            .iter()
            .take(3)
            .filter_map(|p| p.opening())
            .map(|s| {
                let first: String = s.split_whitespace().take(4).collect::<Vec<_>>().join(" ");
                format!("\"{first}...\"")
            })
            .collect();

        let title = "Formulaic transition openers";
        vec![Finding {
            id: deterministic_finding_id(self.name(), None, None, title),
            step: self.name().to_string(),
            severity: Severity::High,
            title: title.to_string(),
            description: format!(
                "{} of {} body paragraphs open with a stock transition ({}).",
                stock.len(),
                body.len(),
                examples.join(", ")
            ),
            suggested_fix: Some(
                "Drop most of the connective tissue. Start paragraphs with the point \
                 itself and let ordering carry the logic."
                    .to_string(),
            ),
            why_it_matters: Some(
                "'However / Furthermore / Moreover' chains are among the strongest \
                 lexical tells of generated prose."
                    .to_string(),
            ),
            ..Default::default()
        }
        .with_metric("stock_openers", stock.len())
        .with_metric("body_paragraphs", body.len())
        .with_metric("ratio", format!("{:.4}", ratio))]
    }

    /// Every paragraph built to the same sentence count
    fn check_uniform_construction(&self, doc: &Document, uniform_cv: f64) -> Result<Vec<Finding>> {
        let sentence_counts: Vec<f64> = doc
            .paragraphs()
            .map(|p| p.sentences.len() as f64)
            .collect();
        let bands = CvBands::uniform_at(uniform_cv);
        let metrics = compute_variation_metrics(&sentence_counts, &bands)?;

        if !metrics.classification.is_flagged() {
            return Ok(Vec::new());
        }

        let title = "Paragraphs built to a fixed sentence count";
        Ok(vec![Finding {
            id: deterministic_finding_id(self.name(), None, None, title),
            step: self.name().to_string(),
            severity: Severity::Medium,
            title: title.to_string(),
            description: format!(
                "All {} paragraphs contain about {:.1} sentences (CV {:.2}).",
                sentence_counts.len(),
                metrics.mean,
                metrics.cv
            ),
            suggested_fix: Some(
                "Mix one-sentence paragraphs in with long ones. Paragraph size should \
                 track the idea, not a quota."
                    .to_string(),
            ),
            ..Default::default()
        }
        .with_metric("cv", format!("{:.4}", metrics.cv))
        .with_metric("mean_sentences", format!("{:.4}", metrics.mean))])
    }

    /// No questions, no turns: the flow never changes register
    fn check_monotone_flow(&self, roles: &[ParagraphRole], min_paragraphs: usize) -> Vec<Finding> {
        if roles.len() < min_paragraphs {
            return Vec::new();
        }

        let has_variety = roles
            .iter()
            .any(|r| matches!(r, ParagraphRole::Question | ParagraphRole::Transition));
        if has_variety {
            return Vec::new();
        }

        let title = "Monotone paragraph flow";
        vec![Finding {
            id: deterministic_finding_id(self.name(), None, None, title),
            step: self.name().to_string(),
            severity: Severity::Low,
            title: title.to_string(),
            description: format!(
                "None of the {} paragraphs pose a question or pivot the argument; \
                 the flow never changes register.",
                roles.len()
            ),
            suggested_fix: Some(
                "Interrupt the march: ask a question, concede a point, take a detour."
                    .to_string(),
            ),
            ..Default::default()
        }
        .with_metric("paragraphs", roles.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Vec<Finding> {
        let doc = Document::from_text("t.md", text);
        ParagraphRolesStep
            .analyze(&doc, &StepContext::default())
            .unwrap()
    }

    #[test]
    fn test_stock_transition_detection() {
        assert!(opens_with_stock_transition("However, this is wrong."));
        assert!(opens_with_stock_transition("furthermore it continues"));
        assert!(opens_with_stock_transition("In addition, there is more."));
        assert!(!opens_with_stock_transition("Howevermore is not a word."));
        assert!(!opens_with_stock_transition("The plain start."));
    }

    #[test]
    fn test_classify_positions() {
        assert_eq!(
            classify_paragraph(Some("Start here."), 0, 5, true),
            ParagraphRole::Opening
        );
        assert_eq!(
            classify_paragraph(Some("The end."), 4, 5, false),
            ParagraphRole::Closing
        );
        assert_eq!(
            classify_paragraph(Some("But why does it matter?"), 2, 5, false),
            ParagraphRole::Question
        );
        assert_eq!(
            classify_paragraph(Some("However, consider this."), 2, 5, false),
            ParagraphRole::Transition
        );
        assert_eq!(
            classify_paragraph(Some("Under the heading."), 2, 5, true),
            ParagraphRole::Topic
        );
        assert_eq!(
            classify_paragraph(Some("More support."), 2, 5, false),
            ParagraphRole::Support
        );
    }

    #[test]
    fn test_transition_openers_flagged() {
        // 4 body paragraphs, 3 open with stock transitions
        let findings = run("\
The opening paragraph sets the scene with a few words here.

However, the second paragraph pivots immediately like clockwork.

Furthermore, the third paragraph stacks another connective on top.

A rare paragraph that just starts with its point for once.

Moreover, the fifth paragraph cannot resist the pattern either.

The closing paragraph wraps everything up at the end.
");
        let f = findings
            .iter()
            .find(|f| f.title.contains("transition openers"))
            .unwrap();
        assert_eq!(f.severity, Severity::High);
        assert_eq!(f.metrics.get("stock_openers").unwrap(), "3");
        assert_eq!(f.metrics.get("body_paragraphs").unwrap(), "4");
    }

    #[test]
    fn test_uniform_construction_flagged() {
        // Every paragraph is exactly two sentences
        let findings = run("\
First sentence here. Second sentence here.

Another first sentence. Another second sentence.

Yet another opener. Yet another follower.

Final pair begins. Final pair ends.
");
        assert!(findings
            .iter()
            .any(|f| f.title.contains("fixed sentence count")));
    }

    #[test]
    fn test_monotone_flow_flagged() {
        // Six paragraphs, no questions, no transitions
        let findings = run("\
One plain paragraph. It has two sentences of different sizes to stay clean elsewhere.

Two plain paragraphs now.

Three plain paragraphs follow each other. Each one states a fact. Nothing turns.

Four.

Five plain paragraphs and counting with several extra words in this one.

Six closes the piece without ever asking anything. The register never shifted once over the whole run.
");
        assert!(findings.iter().any(|f| f.title.contains("Monotone")));
    }

    #[test]
    fn test_varied_flow_is_clean() {
        let findings = run("\
An opening that sets things up with a couple of sentences. It runs a little long on purpose.

Why does any of this matter?

Because the details are where the argument actually lives. Here are three of them. Each carries weight.

Short one.

The closing paragraph lands the point and stops.
");
        assert!(findings.is_empty());
    }
}
