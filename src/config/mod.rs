//! Project-level configuration support
//!
//! Loads per-project configuration from `stylometer.toml` or
//! `.stylometerrc.json` next to the analyzed document (or in the
//! analyzed directory).
//!
//! # Configuration Format
//!
//! ```toml
//! # stylometer.toml
//!
//! register = "essay"
//!
//! [steps.sentence-length]
//! enabled = true
//! thresholds = { very_low_cv = 0.18 }
//!
//! [steps.human-features]
//! severity = "high"  # Override default severity
//!
//! [scoring]
//! pillar_weights = { structure = 0.4, rhythm = 0.3, voice = 0.3 }
//!
//! [defaults]
//! format = "text"
//! severity = "low"
//! workers = 4
//! ```

use crate::steps::StepConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Document register: selects the LLM system prompt used for rewrites
/// and is recorded in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentRegister {
    Essay,
    Blog,
    Technical,
    #[default]
    Generic,
}

impl DocumentRegister {
    pub fn name(&self) -> &'static str {
        match self {
            DocumentRegister::Essay => "essay",
            DocumentRegister::Blog => "blog",
            DocumentRegister::Technical => "technical",
            DocumentRegister::Generic => "generic",
        }
    }
}

/// Project-level configuration loaded from stylometer.toml or similar
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// Document register (essay, blog, technical, generic)
    #[serde(default)]
    pub register: DocumentRegister,

    /// Per-step configuration overrides
    #[serde(default)]
    pub steps: HashMap<String, StepConfigOverride>,

    /// Scoring configuration
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Default CLI flags
    #[serde(default)]
    pub defaults: CliDefaults,
}

/// Configuration override for a specific step
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StepConfigOverride {
    /// Whether the step is enabled (default: true)
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Override the default severity (critical, high, medium, low, info)
    #[serde(default)]
    pub severity: Option<String>,

    /// Step-specific threshold overrides.
    /// Keys depend on the step (e.g. uniform_cv, min_sections).
    #[serde(default)]
    pub thresholds: HashMap<String, ThresholdValue>,
}

/// A threshold value can be an integer, float, boolean, or string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ThresholdValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl ThresholdValue {
    /// Get as i64 (returns None for non-numeric types)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ThresholdValue::Integer(v) => Some(*v),
            ThresholdValue::Float(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Get as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ThresholdValue::Integer(v) => Some(*v as f64),
            ThresholdValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ThresholdValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ThresholdValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

/// Scoring configuration for the authenticity score
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScoringConfig {
    /// Weights for each pillar (should sum to 1.0; normalized otherwise)
    #[serde(default)]
    pub pillar_weights: PillarWeights,
}

/// Weights for the three scoring pillars
#[derive(Debug, Clone, Deserialize)]
pub struct PillarWeights {
    /// Weight for structure score (default: 0.4)
    #[serde(default = "default_structure_weight")]
    pub structure: f64,

    /// Weight for rhythm score (default: 0.3)
    #[serde(default = "default_rhythm_weight")]
    pub rhythm: f64,

    /// Weight for voice score (default: 0.3)
    #[serde(default = "default_voice_weight")]
    pub voice: f64,
}

impl Default for PillarWeights {
    fn default() -> Self {
        Self {
            structure: default_structure_weight(),
            rhythm: default_rhythm_weight(),
            voice: default_voice_weight(),
        }
    }
}

fn default_structure_weight() -> f64 {
    0.4
}
fn default_rhythm_weight() -> f64 {
    0.3
}
fn default_voice_weight() -> f64 {
    0.3
}

impl PillarWeights {
    /// Validate that weights sum to 1.0 (with tolerance)
    pub fn is_valid(&self) -> bool {
        let sum = self.structure + self.rhythm + self.voice;
        (sum - 1.0).abs() < 0.001
    }

    /// Normalize weights to sum to 1.0
    pub fn normalize(&mut self) {
        let sum = self.structure + self.rhythm + self.voice;
        if sum > 0.0 {
            self.structure /= sum;
            self.rhythm /= sum;
            self.voice /= sum;
        }
    }
}

/// Default CLI flags that can be set in project config
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CliDefaults {
    /// Default output format (text, json, markdown)
    #[serde(default)]
    pub format: Option<String>,

    /// Default minimum severity filter
    #[serde(default)]
    pub severity: Option<String>,

    /// Default number of workers
    #[serde(default)]
    pub workers: Option<usize>,

    /// Default maximum findings to show
    #[serde(default)]
    pub top: Option<usize>,

    /// Skip steps by default
    #[serde(default)]
    pub skip_steps: Vec<String>,

    /// Fail-on severity threshold for CI
    #[serde(default)]
    pub fail_on: Option<String>,
}

/// Load project configuration for a document or directory path.
///
/// Searches the directory containing the document (or the directory
/// itself) for, in order:
/// 1. `stylometer.toml`
/// 2. `.stylometerrc.json`
///
/// Returns default configuration if no config file is found.
pub fn load_project_config(path: &Path) -> ProjectConfig {
    let dir = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(Path::new("."))
    };

    // Try TOML first (preferred format)
    let toml_path = dir.join("stylometer.toml");
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    // Try JSON
    let json_path = dir.join(".stylometerrc.json");
    if json_path.exists() {
        match load_json_config(&json_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", json_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", json_path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

fn load_toml_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = toml::from_str(&content)?;
    Ok(config)
}

fn load_json_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = serde_json::from_str(&content)?;
    Ok(config)
}

impl ProjectConfig {
    /// Check if a step is enabled (defaults to true if not specified)
    pub fn is_step_enabled(&self, name: &str) -> bool {
        let normalized = normalize_step_name(name);

        self.steps
            .get(&normalized)
            .or_else(|| self.steps.get(name))
            .and_then(|c| c.enabled)
            .unwrap_or(true)
            && !self
                .defaults
                .skip_steps
                .iter()
                .any(|s| normalize_step_name(s) == normalized)
    }

    /// Severity override for a step (if any)
    pub fn severity_override(&self, name: &str) -> Option<&str> {
        let normalized = normalize_step_name(name);

        self.steps
            .get(&normalized)
            .or_else(|| self.steps.get(name))
            .and_then(|c| c.severity.as_deref())
    }

    /// Resolve the full step configuration passed into the engine
    pub fn step_config(&self, name: &str) -> StepConfig {
        let normalized = normalize_step_name(name);
        let overrides = self
            .steps
            .get(&normalized)
            .or_else(|| self.steps.get(name));

        let severity_override = overrides
            .and_then(|c| c.severity.as_deref())
            .and_then(|s| s.parse().ok());

        StepConfig {
            max_findings: None,
            severity_override,
            thresholds: overrides.map(|c| c.thresholds.clone()).unwrap_or_default(),
        }
    }
}

/// Normalize step name for config lookup (kebab/snake tolerant)
pub fn normalize_step_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace('_', "-")
        .trim_end_matches("-step")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_step_name() {
        assert_eq!(normalize_step_name("sentence_length"), "sentence-length");
        assert_eq!(normalize_step_name("Sentence-Length"), "sentence-length");
        assert_eq!(normalize_step_name("validation-step"), "validation");
    }

    #[test]
    fn test_step_enabled_default_true() {
        let config = ProjectConfig::default();
        assert!(config.is_step_enabled("sentence-length"));
    }

    #[test]
    fn test_toml_config_parses() {
        let config: ProjectConfig = toml::from_str(
            r#"
register = "essay"

[steps.sentence-length]
enabled = false
thresholds = { very_low_cv = 0.18, min_sentences = 3 }

[steps.human-features]
severity = "high"

[scoring]
pillar_weights = { structure = 0.5, rhythm = 0.25, voice = 0.25 }

[defaults]
format = "json"
skip_steps = ["section_roles"]
"#,
        )
        .unwrap();

        assert_eq!(config.register, DocumentRegister::Essay);
        assert!(!config.is_step_enabled("sentence_length"));
        assert!(!config.is_step_enabled("section-roles"));
        assert!(config.is_step_enabled("validation"));
        assert_eq!(config.severity_override("human-features"), Some("high"));
        assert!(config.scoring.pillar_weights.is_valid());

        let step_config = config.step_config("sentence-length");
        assert_eq!(step_config.threshold_f64("very_low_cv", 0.2), 0.18);
        assert_eq!(step_config.threshold_usize("min_sentences", 2), 3);
    }

    #[test]
    fn test_weights_normalize() {
        let mut weights = PillarWeights {
            structure: 2.0,
            rhythm: 1.0,
            voice: 1.0,
        };
        assert!(!weights.is_valid());
        weights.normalize();
        assert!(weights.is_valid());
        assert!((weights.structure - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_severity_override_parsed_into_step_config() {
        let config: ProjectConfig = toml::from_str(
            r#"
[steps.human-features]
severity = "critical"
"#,
        )
        .unwrap();
        let step_config = config.step_config("human-features");
        assert_eq!(
            step_config.severity_override,
            Some(crate::models::Severity::Critical)
        );
    }
}
