//! Step execution engine with parallel support
//!
//! The StepEngine orchestrates the six wizard steps:
//! - Runs independent steps in parallel using rayon
//! - Runs dependent steps sequentially afterwards with the accumulated
//!   findings in their context
//! - Collects and aggregates findings
//! - Reports progress through callbacks

use crate::config::ProjectConfig;
use crate::document::Document;
use crate::models::Finding;
use crate::steps::base::{AnalysisStep, ProgressCallback, RunSummary, StepContext, StepResult};
use anyhow::Result;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Maximum findings to keep to prevent unbounded output on huge documents
const MAX_FINDINGS_LIMIT: usize = 1_000;

/// Orchestrates analysis across all registered wizard steps
pub struct StepEngine {
    /// Registered steps
    steps: Vec<Arc<dyn AnalysisStep>>,
    /// Number of worker threads for parallel execution
    workers: usize,
    /// Maximum findings to return
    max_findings: usize,
    /// Progress callback for reporting execution status
    progress_callback: Option<ProgressCallback>,
}

impl StepEngine {
    /// Create a new engine
    ///
    /// # Arguments
    /// * `workers` - Number of worker threads (0 = auto-detect)
    pub fn new(workers: usize) -> Self {
        let actual_workers = if workers == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
                .min(8) // Six steps; more threads buy nothing
        } else {
            workers
        };

        Self {
            steps: Vec::new(),
            workers: actual_workers,
            max_findings: MAX_FINDINGS_LIMIT,
            progress_callback: None,
        }
    }

    /// Set the maximum number of findings to return
    pub fn with_max_findings(mut self, max: usize) -> Self {
        self.max_findings = max;
        self
    }

    /// Set a progress callback
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Register a step
    pub fn register(&mut self, step: Arc<dyn AnalysisStep>) {
        debug!("Registering step: {}", step.name());
        self.steps.push(step);
    }

    /// Register multiple steps at once
    pub fn register_all(&mut self, steps: impl IntoIterator<Item = Arc<dyn AnalysisStep>>) {
        for step in steps {
            self.register(step);
        }
    }

    /// Get the number of registered steps
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get names of all registered steps
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run all steps and return detailed per-step results plus a summary.
    ///
    /// Independent steps run on a rayon pool; dependent steps run
    /// sequentially afterwards with the accumulated findings. Results
    /// come back ordered by wizard number for display.
    pub fn run(
        &self,
        doc: &Document,
        config: &ProjectConfig,
    ) -> Result<(Vec<StepResult>, RunSummary)> {
        let start = Instant::now();
        info!(
            "Starting analysis with {} steps on {} workers",
            self.steps.len(),
            self.workers
        );

        let enabled: Vec<_> = self
            .steps
            .iter()
            .filter(|s| config.is_step_enabled(s.name()))
            .cloned()
            .collect();

        let skipped = self.steps.len() - enabled.len();
        if skipped > 0 {
            debug!("{} steps disabled by config", skipped);
        }

        // Partition steps into independent and dependent
        let (independent, dependent): (Vec<_>, Vec<_>) =
            enabled.iter().cloned().partition(|s| !s.is_dependent());

        // Progress tracking
        let completed = Arc::new(AtomicUsize::new(0));
        let total = enabled.len();

        // Run independent steps in parallel
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;

        let mut results: Vec<StepResult> = pool.install(|| {
            independent
                .par_iter()
                .map(|step| {
                    let result = self.run_single_step(step, doc, config, &[]);

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(ref callback) = self.progress_callback {
                        callback(step.name(), done, total);
                    }

                    result
                })
                .collect()
        });

        // Accumulated findings feed the dependent steps
        let mut accumulated: Vec<Finding> = results
            .iter()
            .filter(|r| r.success)
            .flat_map(|r| r.findings.iter().cloned())
            .collect();

        // Run dependent steps sequentially, in wizard order
        let mut dependent = dependent;
        dependent.sort_by_key(|s| s.number());
        for step in dependent {
            let result = self.run_single_step(&step, doc, config, &accumulated);

            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(ref callback) = self.progress_callback {
                callback(step.name(), done, total);
            }

            if result.success {
                accumulated.extend(result.findings.iter().cloned());
            } else if let Some(err) = &result.error {
                warn!("Step {} failed: {}", result.step_name, err);
            }
            results.push(result);
        }

        // Order by wizard number for display
        results.sort_by_key(|r| r.number);

        let mut summary = RunSummary::default();
        for result in &results {
            summary.add_result(result);
            if !result.success {
                if let Some(err) = &result.error {
                    warn!("Step {} failed: {}", result.step_name, err);
                }
            }
        }
        summary.total_duration_ms = start.elapsed().as_millis() as u64;

        let duration = start.elapsed();
        info!(
            "Analysis complete: {} findings from {}/{} steps in {:?}",
            summary.total_findings, summary.steps_succeeded, summary.steps_run, duration
        );

        Ok((results, summary))
    }

    /// Flatten step results into findings sorted by severity (highest
    /// first), capped at the engine limit.
    pub fn collect_findings(&self, results: &[StepResult]) -> Vec<Finding> {
        let mut findings: Vec<Finding> = results
            .iter()
            .filter(|r| r.success)
            .flat_map(|r| r.findings.iter().cloned())
            .collect();

        findings.sort_by(|a, b| b.severity.cmp(&a.severity));

        if findings.len() > self.max_findings {
            warn!(
                "Truncating findings from {} to {} (max limit)",
                findings.len(),
                self.max_findings
            );
            findings.truncate(self.max_findings);
        }

        findings
    }

    /// Run a single step with error handling and timing
    fn run_single_step(
        &self,
        step: &Arc<dyn AnalysisStep>,
        doc: &Document,
        config: &ProjectConfig,
        prior_findings: &[Finding],
    ) -> StepResult {
        let name = step.name().to_string();
        let number = step.number();
        let start = Instant::now();

        debug!("Running step {}: {}", number, name);

        let ctx = StepContext {
            config: config.step_config(step.name()),
            prior_findings,
        };
        let severity_override = ctx.config.severity_override;
        let max_findings = ctx.config.max_findings;

        // Wrap in catch_unwind so one panicking step doesn't sink the run
        let analyze_result =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| step.analyze(doc, &ctx)));

        match analyze_result {
            Ok(Ok(mut findings)) => {
                let duration = start.elapsed().as_millis() as u64;

                if let Some(severity) = severity_override {
                    for finding in &mut findings {
                        finding.severity = severity;
                    }
                }
                if let Some(max) = max_findings {
                    if findings.len() > max {
                        findings.truncate(max);
                    }
                }

                debug!(
                    "Step {} found {} findings in {}ms",
                    name,
                    findings.len(),
                    duration
                );

                StepResult::success(name, number, findings, duration)
            }
            Ok(Err(e)) => {
                let duration = start.elapsed().as_millis() as u64;
                debug!("Step {} failed: {}", name, e);
                StepResult::failure(name, number, e.to_string(), duration)
            }
            Err(panic_info) => {
                let duration = start.elapsed().as_millis() as u64;
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                error!("Step {} panicked: {}", name, panic_msg);
                StepResult::failure(name, number, format!("Panic: {}", panic_msg), duration)
            }
        }
    }
}

impl Default for StepEngine {
    fn default() -> Self {
        Self::new(0)
    }
}
