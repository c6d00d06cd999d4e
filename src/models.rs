//! Core data models for Stylometer
//!
//! These models are used throughout the codebase for representing
//! findings, reports, and analysis results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generate a deterministic finding ID based on content hash.
///
/// This ensures findings have stable IDs across runs, enabling:
/// - Matching rewrite proposals back to their finding
/// - Reliable deduplication when a step re-runs
///
/// The ID is a 16-character hex string derived from hashing:
/// - step name (which step found it)
/// - section / paragraph indexes (where it was found)
/// - title (what the issue is)
pub fn deterministic_finding_id(
    step: &str,
    section: Option<usize>,
    paragraph: Option<usize>,
    title: &str,
) -> String {
    // MD5 for stable cross-version hashing; DefaultHasher is intentionally
    // not stable across Rust/compiler versions.
    let input = format!(
        "{step}\n{}\n{}\n{title}",
        section.map(|s| s.to_string()).unwrap_or_default(),
        paragraph.map(|p| p.to_string()).unwrap_or_default(),
    );
    let digest = md5::compute(input.as_bytes());
    format!("{:x}", digest)[..16].to_string()
}

/// Severity levels for findings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!(
                "Unknown severity '{}'. Valid: info, low, medium, high, critical",
                s
            )),
        }
    }
}

/// A single issue surfaced by an analysis step
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Finding {
    #[serde(default)]
    pub id: String,
    /// Name of the step that produced this finding (e.g. "sentence-length")
    #[serde(default)]
    pub step: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Section index within the document (0-based), if localized
    #[serde(default)]
    pub section: Option<usize>,
    /// Paragraph index within the document (0-based), if localized
    #[serde(default)]
    pub paragraph: Option<usize>,
    /// Source line where the flagged passage starts
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub suggested_fix: Option<String>,
    #[serde(default)]
    pub why_it_matters: Option<String>,
    /// Step-specific metric values backing the finding (e.g. cv, mean).
    /// BTreeMap keeps serialization order deterministic.
    #[serde(default)]
    pub metrics: BTreeMap<String, String>,
}

impl Finding {
    /// Record a metric value on the finding (formatted to 4 decimals for floats)
    pub fn with_metric(mut self, key: &str, value: impl std::fmt::Display) -> Self {
        self.metrics.insert(key.to_string(), value.to_string());
        self
    }
}

/// Summary of findings by severity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindingsSummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
    pub total: usize,
}

impl FindingsSummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for f in findings {
            match f.severity {
                Severity::Critical => summary.critical += 1,
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
                Severity::Info => summary.info += 1,
            }
            summary.total += 1;
        }
        summary
    }
}

/// Where a document lands on the likely-AI / likely-human scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    LikelyAi,
    Mixed,
    LikelyHuman,
}

impl RiskLevel {
    /// Derive the risk level from the authenticity score
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            RiskLevel::LikelyHuman
        } else if score >= 55.0 {
            RiskLevel::Mixed
        } else {
            RiskLevel::LikelyAi
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::LikelyAi => write!(f, "likely AI"),
            RiskLevel::Mixed => write!(f, "mixed signals"),
            RiskLevel::LikelyHuman => write!(f, "likely human"),
        }
    }
}

/// Structural counts for the analyzed document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub sections: usize,
    pub paragraphs: usize,
    pub sentences: usize,
    pub words: usize,
}

/// Layout symmetry derived from section-level CVs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymmetryInfo {
    /// 0-100 score; higher means a more suspiciously even layout
    pub score: u32,
    pub is_symmetric: bool,
}

/// Overall authenticity report for a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// 0-100; higher means more human-like variation
    pub authenticity_score: f64,
    pub grade: String,
    pub risk: RiskLevel,
    pub structure_score: f64,
    pub rhythm_score: f64,
    pub voice_score: f64,
    pub findings: Vec<Finding>,
    pub findings_summary: FindingsSummary,
    pub document: DocumentSummary,
    pub symmetry: Option<SymmetryInfo>,
}

impl AnalysisReport {
    /// Calculate grade from score
    pub fn grade_from_score(score: f64) -> String {
        match score {
            s if s >= 90.0 => "A".to_string(),
            s if s >= 80.0 => "B".to_string(),
            s if s >= 70.0 => "C".to_string(),
            s if s >= 60.0 => "D".to_string(),
            _ => "F".to_string(),
        }
    }
}
