//! Step 2: section role identification
//!
//! Labels each section (introduction, body, conclusion, ...) from its
//! heading keywords and position, then looks for the classic generated
//! scaffold: an intro, a run of evenly sized bodies, and a conclusion,
//! often with headings phrased in lockstep.

use crate::document::Document;
use crate::models::{deterministic_finding_id, Finding, Severity};
use crate::stats::{compute_variation_metrics, CvBands};
use crate::steps::base::{AnalysisStep, StepContext};
use crate::steps::section_uniformity::SECTION_UNIFORMITY_CV;
use anyhow::Result;
use tracing::debug;

/// Minimum labeled headings before parallel-phrasing is judged
pub const MIN_HEADINGS_FOR_PARALLEL: usize = 3;

/// Above this fraction of Unknown sections, structure is unlabelable
pub const UNLABELABLE_RATIO: f64 = 0.5;

/// Role of a section within the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionRole {
    Introduction,
    Background,
    Body,
    Examples,
    Counterpoint,
    Conclusion,
    References,
    Summary,
    Unknown,
}

impl SectionRole {
    pub fn name(&self) -> &'static str {
        match self {
            SectionRole::Introduction => "introduction",
            SectionRole::Background => "background",
            SectionRole::Body => "body",
            SectionRole::Examples => "examples",
            SectionRole::Counterpoint => "counterpoint",
            SectionRole::Conclusion => "conclusion",
            SectionRole::References => "references",
            SectionRole::Summary => "summary",
            SectionRole::Unknown => "unknown",
        }
    }
}

/// Keyword table for heading-based role classification.
/// Matched as lowercase substrings of the heading text.
const ROLE_KEYWORDS: &[(SectionRole, &[&str])] = &[
    (
        SectionRole::Introduction,
        &["introduction", "intro", "overview", "getting started", "preface"],
    ),
    (
        SectionRole::Background,
        &["background", "context", "history", "motivation", "prior work"],
    ),
    (
        SectionRole::Examples,
        &["example", "case study", "case studies", "illustration", "demo"],
    ),
    (
        SectionRole::Counterpoint,
        &[
            "counterpoint",
            "counter-argument",
            "counterargument",
            "objection",
            "limitation",
            "criticism",
            "drawback",
        ],
    ),
    (
        SectionRole::Conclusion,
        &["conclusion", "closing", "final thoughts", "wrap up", "wrap-up"],
    ),
    (
        SectionRole::References,
        &["reference", "bibliography", "further reading", "sources", "citations"],
    ),
    (
        SectionRole::Summary,
        &["summary", "tl;dr", "tldr", "key takeaways", "recap", "in short"],
    ),
];

/// Classify a section from its heading and position.
///
/// Keyword matches win; otherwise the first section leans Introduction,
/// the last leans Conclusion, headed middles are Body, and unheaded
/// sections are Unknown.
pub fn classify_section(
    heading: Option<&str>,
    index: usize,
    total: usize,
) -> SectionRole {
    if let Some(heading) = heading {
        let lower = heading.to_lowercase();
        for (role, keywords) in ROLE_KEYWORDS {
            if keywords.iter().any(|k| lower.contains(k)) {
                return *role;
            }
        }
        if index == 0 {
            return SectionRole::Introduction;
        }
        if total > 1 && index == total - 1 {
            return SectionRole::Conclusion;
        }
        SectionRole::Body
    } else {
        // Unheaded preamble before the first heading still opens the piece
        if index == 0 && total > 1 {
            SectionRole::Introduction
        } else {
            SectionRole::Unknown
        }
    }
}

pub struct SectionRolesStep;

impl AnalysisStep for SectionRolesStep {
    fn name(&self) -> &'static str {
        "section-roles"
    }

    fn title(&self) -> &'static str {
        "Section Roles"
    }

    fn number(&self) -> u8 {
        2
    }

    fn description(&self) -> &'static str {
        "Labels sections and flags template-like scaffolding"
    }

    fn analyze(&self, doc: &Document, ctx: &StepContext<'_>) -> Result<Vec<Finding>> {
        let uniform_cv = ctx
            .config
            .threshold_f64("uniform_cv", SECTION_UNIFORMITY_CV);
        let min_headings = ctx
            .config
            .threshold_usize("min_headings", MIN_HEADINGS_FOR_PARALLEL);
        let bands = CvBands::uniform_at(uniform_cv);

        let total = doc.sections.len();
        let roles: Vec<SectionRole> = doc
            .sections
            .iter()
            .enumerate()
            .map(|(i, s)| classify_section(s.heading.as_deref(), i, total))
            .collect();

        debug!(
            "Section roles: {:?}",
            roles.iter().map(|r| r.name()).collect::<Vec<_>>()
        );

        let mut findings = Vec::new();

        findings.extend(self.check_template_scaffold(doc, &roles, &bands)?);
        findings.extend(self.check_parallel_headings(doc, &bands, min_headings)?);
        findings.extend(self.check_unlabelable(doc, &roles));

        Ok(findings)
    }
}

impl SectionRolesStep {
    /// Intro + evenly sized bodies + conclusion is the stock outline shape
    fn check_template_scaffold(
        &self,
        doc: &Document,
        roles: &[SectionRole],
        bands: &CvBands,
    ) -> Result<Vec<Finding>> {
        let has_intro = roles
            .first()
            .is_some_and(|r| matches!(r, SectionRole::Introduction));
        let has_conclusion = roles
            .iter()
            .any(|r| matches!(r, SectionRole::Conclusion | SectionRole::Summary));
        if !has_intro || !has_conclusion {
            return Ok(Vec::new());
        }

        let body_para_counts: Vec<f64> = roles
            .iter()
            .zip(&doc.sections)
            .filter(|(r, _)| {
                matches!(
                    r,
                    SectionRole::Body | SectionRole::Examples | SectionRole::Background
                )
            })
            .map(|(_, s)| s.paragraphs.len() as f64)
            .collect();

        let metrics = compute_variation_metrics(&body_para_counts, bands)?;
        if !metrics.classification.is_flagged() {
            return Ok(Vec::new());
        }

        let title = "Template scaffold: intro, uniform bodies, conclusion";
        Ok(vec![Finding {
            id: deterministic_finding_id(self.name(), None, None, title),
            step: self.name().to_string(),
            severity: Severity::High,
            title: title.to_string(),
            description: format!(
                "The document follows the stock outline shape with {} body sections \
                 of nearly identical paragraph counts (CV {:.2}).",
                body_para_counts.len(),
                metrics.cv
            ),
            suggested_fix: Some(
                "Reorder or merge body sections so the structure follows the argument \
                 rather than a template."
                    .to_string(),
            ),
            why_it_matters: Some(
                "Intro-bodies-conclusion with equal-weight bodies is the default shape \
                 of outline-driven generation."
                    .to_string(),
            ),
            ..Default::default()
        }
        .with_metric("body_sections", body_para_counts.len())
        .with_metric("body_paragraph_cv", format!("{:.4}", metrics.cv))])
    }

    /// Headings phrased in lockstep ("Understanding X", "Understanding Y", ...)
    fn check_parallel_headings(
        &self,
        doc: &Document,
        bands: &CvBands,
        min_headings: usize,
    ) -> Result<Vec<Finding>> {
        let heading_word_counts: Vec<f64> = doc
            .sections
            .iter()
            .filter_map(|s| s.heading.as_ref())
            .map(|h| h.split_whitespace().count() as f64)
            .collect();

        if heading_word_counts.len() < min_headings {
            return Ok(Vec::new());
        }

        let metrics = compute_variation_metrics(&heading_word_counts, bands)?;
        if !metrics.classification.is_flagged() {
            return Ok(Vec::new());
        }

        let title = "Headings are phrased in lockstep";
        Ok(vec![Finding {
            id: deterministic_finding_id(self.name(), None, None, title),
            step: self.name().to_string(),
            severity: Severity::Medium,
            title: title.to_string(),
            description: format!(
                "All {} headings are {:.1} words long on average with almost no \
                 variation (CV {:.2}).",
                heading_word_counts.len(),
                metrics.mean,
                metrics.cv
            ),
            suggested_fix: Some(
                "Vary heading length and form: a one-word heading next to a question \
                 next to a phrase."
                    .to_string(),
            ),
            ..Default::default()
        }
        .with_metric("headings", heading_word_counts.len())
        .with_metric("cv", format!("{:.4}", metrics.cv))])
    }

    /// Mostly-Unknown roles despite headings being present
    fn check_unlabelable(&self, doc: &Document, roles: &[SectionRole]) -> Vec<Finding> {
        let headed = doc.sections.iter().filter(|s| s.heading.is_some()).count();
        if headed == 0 || roles.len() < 2 {
            return Vec::new();
        }

        let unknown = roles
            .iter()
            .filter(|r| matches!(r, SectionRole::Unknown))
            .count();
        if (unknown as f64 / roles.len() as f64) < UNLABELABLE_RATIO {
            return Vec::new();
        }

        let title = "Most sections resist role labeling";
        vec![Finding {
            id: deterministic_finding_id(self.name(), None, None, title),
            step: self.name().to_string(),
            severity: Severity::Info,
            title: title.to_string(),
            description: format!(
                "{unknown} of {} sections could not be assigned a role from their \
                 headings or position.",
                roles.len()
            ),
            ..Default::default()
        }
        .with_metric("unknown_sections", unknown)
        .with_metric("total_sections", roles.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Vec<Finding> {
        let doc = Document::from_text("t.md", text);
        SectionRolesStep
            .analyze(&doc, &StepContext::default())
            .unwrap()
    }

    #[test]
    fn test_classify_by_keyword() {
        assert_eq!(
            classify_section(Some("Introduction"), 2, 5),
            SectionRole::Introduction
        );
        assert_eq!(
            classify_section(Some("Historical Background"), 1, 5),
            SectionRole::Background
        );
        assert_eq!(
            classify_section(Some("Key Takeaways"), 3, 5),
            SectionRole::Summary
        );
        assert_eq!(
            classify_section(Some("Further Reading"), 4, 5),
            SectionRole::References
        );
    }

    #[test]
    fn test_classify_by_position() {
        assert_eq!(
            classify_section(Some("Why Rust"), 0, 4),
            SectionRole::Introduction
        );
        assert_eq!(
            classify_section(Some("Where Next"), 3, 4),
            SectionRole::Conclusion
        );
        assert_eq!(
            classify_section(Some("The Borrow Checker"), 1, 4),
            SectionRole::Body
        );
        assert_eq!(classify_section(None, 0, 3), SectionRole::Introduction);
        assert_eq!(classify_section(None, 1, 3), SectionRole::Unknown);
    }

    #[test]
    fn test_template_scaffold_flagged() {
        let findings = run("\
# Introduction

Opening paragraph goes here with several words.

# First Topic

Body paragraph one sits here.

Body paragraph two sits here.

# Second Topic

Body paragraph one sits here.

Body paragraph two sits here.

# Third Topic

Body paragraph one sits here.

Body paragraph two sits here.

# Conclusion

Closing paragraph wraps it up neatly.
");
        assert!(findings
            .iter()
            .any(|f| f.title.contains("Template scaffold")));
        let scaffold = findings
            .iter()
            .find(|f| f.title.contains("Template scaffold"))
            .unwrap();
        assert_eq!(scaffold.severity, Severity::High);
        assert_eq!(scaffold.metrics.get("body_sections").unwrap(), "3");
    }

    #[test]
    fn test_parallel_headings_flagged() {
        // Four two-word headings: CV 0 on word counts
        let findings = run("\
# Understanding Ownership

Words in the first body paragraph here. A second sentence lengthens it considerably for balance.

# Understanding Borrowing

Short one.

# Understanding Lifetimes

A middle-length paragraph sits here with some more words. Another sentence follows it.

Another paragraph extends this section further than the others manage to reach.

# Understanding Traits

Medium text in this section only.
");
        assert!(findings.iter().any(|f| f.title.contains("lockstep")));
    }

    #[test]
    fn test_varied_structure_is_clean() {
        let findings = run("\
# Why

One short opener.

# The Long Middle Where Everything Happens

First paragraph with plenty of words to make this section substantially heavier. More filler words here.

Second paragraph continues at length with additional sentences and material to consider carefully.

Third paragraph exists too.

Fourth one as well, rounding out a heavy section.

# Aside

Quick note.
");
        assert!(findings.is_empty());
    }
}
