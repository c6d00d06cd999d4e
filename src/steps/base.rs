//! Base analysis step trait and types
//!
//! This module defines the core abstractions for the analysis pipeline:
//! - `AnalysisStep` trait that all wizard steps implement
//! - `StepResult` for capturing execution results
//! - `StepContext` carrying configuration and earlier findings

use crate::config::ThresholdValue;
use crate::document::Document;
use crate::models::{Finding, Severity};
use anyhow::Result;
use std::collections::HashMap;

/// Result from running a single analysis step
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Name of the step that produced these results
    pub step_name: String,
    /// Wizard position (1-6)
    pub number: u8,
    /// Findings produced by the step
    pub findings: Vec<Finding>,
    /// Execution time in milliseconds
    pub duration_ms: u64,
    /// Whether the step completed successfully
    pub success: bool,
    /// Error message if the step failed
    pub error: Option<String>,
}

impl StepResult {
    /// Create a successful result
    pub fn success(step_name: String, number: u8, findings: Vec<Finding>, duration_ms: u64) -> Self {
        Self {
            step_name,
            number,
            findings,
            duration_ms,
            success: true,
            error: None,
        }
    }

    /// Create a failed result
    pub fn failure(step_name: String, number: u8, error: String, duration_ms: u64) -> Self {
        Self {
            step_name,
            number,
            findings: Vec::new(),
            duration_ms,
            success: false,
            error: Some(error),
        }
    }
}

/// Configuration options for a step, resolved from project config
#[derive(Debug, Clone, Default)]
pub struct StepConfig {
    /// Maximum findings to return for this step
    pub max_findings: Option<usize>,
    /// Force every finding from this step to a fixed severity
    pub severity_override: Option<Severity>,
    /// Step-specific threshold overrides
    pub thresholds: HashMap<String, ThresholdValue>,
}

impl StepConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Threshold as f64, falling back to the step's named constant
    pub fn threshold_f64(&self, key: &str, default: f64) -> f64 {
        self.thresholds
            .get(key)
            .and_then(|v| v.as_f64())
            .unwrap_or(default)
    }

    /// Threshold as usize, falling back to the step's named constant
    pub fn threshold_usize(&self, key: &str, default: usize) -> usize {
        self.thresholds
            .get(key)
            .and_then(|v| v.as_i64())
            .map(|v| v.max(0) as usize)
            .unwrap_or(default)
    }
}

/// Execution context passed to every step
#[derive(Debug, Default)]
pub struct StepContext<'a> {
    /// Resolved configuration for this step
    pub config: StepConfig,
    /// Findings accumulated from earlier steps.
    /// Empty for independent steps; dependent steps see everything that
    /// ran before them.
    pub prior_findings: &'a [Finding],
}

/// Trait for all wizard analysis steps
///
/// Steps examine the segmented document and flag AI-like uniformity:
/// - Evenly sized sections
/// - Template scaffolding
/// - Flat sentence rhythm
/// - Missing human voice markers
pub trait AnalysisStep: Send + Sync {
    /// Unique kebab-case identifier (e.g. "sentence-length")
    fn name(&self) -> &'static str;

    /// Human-readable title shown in step output
    fn title(&self) -> &'static str;

    /// Wizard position, 1-6. Results are ordered by this for display.
    fn number(&self) -> u8;

    /// Human-readable description of what this step checks
    fn description(&self) -> &'static str;

    /// Run analysis and return findings
    fn analyze(&self, doc: &Document, ctx: &StepContext<'_>) -> Result<Vec<Finding>>;

    /// Whether this step consumes findings from earlier steps
    ///
    /// Dependent steps run sequentially after all independent steps
    /// have completed, with the accumulated findings in their context.
    ///
    /// Default: `false` (independent)
    fn is_dependent(&self) -> bool {
        false
    }
}

/// Progress callback for step execution: (step name, done, total)
pub type ProgressCallback = Box<dyn Fn(&str, usize, usize) + Send + Sync>;

/// Summary statistics from running the pipeline
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Total number of steps run
    pub steps_run: usize,
    /// Number of steps that succeeded
    pub steps_succeeded: usize,
    /// Number of steps that failed
    pub steps_failed: usize,
    /// Total findings across all steps
    pub total_findings: usize,
    /// Findings by severity
    pub by_severity: HashMap<Severity, usize>,
    /// Total execution time in milliseconds
    pub total_duration_ms: u64,
}

impl RunSummary {
    /// Update summary with a step result
    pub fn add_result(&mut self, result: &StepResult) {
        self.steps_run += 1;
        self.total_duration_ms += result.duration_ms;

        if result.success {
            self.steps_succeeded += 1;
            self.total_findings += result.findings.len();

            for finding in &result.findings {
                *self.by_severity.entry(finding.severity).or_insert(0) += 1;
            }
        } else {
            self.steps_failed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThresholdValue;

    #[test]
    fn test_step_config_thresholds() {
        let mut config = StepConfig::new();
        config
            .thresholds
            .insert("uniform_cv".to_string(), ThresholdValue::Float(0.25));
        config
            .thresholds
            .insert("min_sections".to_string(), ThresholdValue::Integer(4));

        assert_eq!(config.threshold_f64("uniform_cv", 0.3), 0.25);
        assert_eq!(config.threshold_f64("missing", 0.3), 0.3);
        assert_eq!(config.threshold_usize("min_sections", 3), 4);
    }

    #[test]
    fn test_step_result_success() {
        let result = StepResult::success("test-step".to_string(), 1, vec![], 100);
        assert!(result.success);
        assert!(result.error.is_none());
        assert_eq!(result.duration_ms, 100);
    }

    #[test]
    fn test_step_result_failure() {
        let result = StepResult::failure("test-step".to_string(), 1, "oops".to_string(), 50);
        assert!(!result.success);
        assert_eq!(result.error, Some("oops".to_string()));
    }

    #[test]
    fn test_run_summary() {
        let mut summary = RunSummary::default();

        let result1 = StepResult::success("s1".to_string(), 1, vec![], 100);
        let result2 = StepResult::failure("s2".to_string(), 2, "err".to_string(), 50);

        summary.add_result(&result1);
        summary.add_result(&result2);

        assert_eq!(summary.steps_run, 2);
        assert_eq!(summary.steps_succeeded, 1);
        assert_eq!(summary.steps_failed, 1);
        assert_eq!(summary.total_duration_ms, 150);
    }
}
