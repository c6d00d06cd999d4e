//! Variation metrics - the dispersion statistics behind every analysis step
//!
//! AI-generated prose tends to produce sections, paragraphs, and sentences
//! of very similar length. The coefficient of variation (CV = standard
//! deviation / mean) of those lengths is the heuristic every step uses to
//! flag that uniformity. This module owns the arithmetic; each step owns
//! its own threshold bands (the bands are empirically chosen per
//! granularity and are deliberately never unified).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for caller contract violations on sample input.
///
/// Empty samples and zero means are defined outcomes, not errors. Only
/// values that would poison the arithmetic with NaN or infinity reject.
#[derive(Error, Debug, PartialEq)]
pub enum StatsError {
    #[error("sample value at index {index} is negative ({value}); counts must be >= 0")]
    NegativeValue { index: usize, value: f64 },

    #[error("sample value at index {index} is not finite")]
    NonFiniteValue { index: usize },
}

pub type StatsResult<T> = Result<T, StatsError>;

/// Classification of a sample's relative dispersion against a band set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniformityClass {
    /// Fewer than 2 elements - not enough data to judge
    InsufficientData,
    /// CV below the severe cut (only band sets that define one)
    SeverelyUniform,
    /// CV below the uniform cut
    TooUniform,
    /// CV between the uniform cut and the natural cut
    Moderate,
    /// CV at or above the natural cut
    Natural,
}

impl UniformityClass {
    /// Whether this classification indicates a uniformity problem
    pub fn is_flagged(&self) -> bool {
        matches!(
            self,
            UniformityClass::SeverelyUniform | UniformityClass::TooUniform
        )
    }
}

impl std::fmt::Display for UniformityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniformityClass::InsufficientData => write!(f, "insufficient data"),
            UniformityClass::SeverelyUniform => write!(f, "severely uniform"),
            UniformityClass::TooUniform => write!(f, "too uniform"),
            UniformityClass::Moderate => write!(f, "moderate"),
            UniformityClass::Natural => write!(f, "natural variation"),
        }
    }
}

/// CV threshold bands for classifying a sample.
///
/// Bands differ per call site (section / paragraph / sentence level) and
/// each step keeps its own named constants. `severe` is optional; when
/// `uniform == natural` the Moderate band is empty and classification is
/// binary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CvBands {
    /// CV below this classifies as SeverelyUniform (None = no severe band)
    pub severe: Option<f64>,
    /// CV below this classifies as TooUniform
    pub uniform: f64,
    /// CV at or above this classifies as Natural
    pub natural: f64,
}

impl CvBands {
    /// Binary band set: below `threshold` is TooUniform, otherwise Natural.
    pub const fn uniform_at(threshold: f64) -> Self {
        Self {
            severe: None,
            uniform: threshold,
            natural: threshold,
        }
    }

    /// Classify a CV value against these bands
    pub fn classify(&self, cv: f64) -> UniformityClass {
        if let Some(severe) = self.severe {
            if cv < severe {
                return UniformityClass::SeverelyUniform;
            }
        }
        if cv < self.uniform {
            UniformityClass::TooUniform
        } else if cv < self.natural {
            UniformityClass::Moderate
        } else {
            UniformityClass::Natural
        }
    }
}

/// Descriptive statistics for one sample of per-unit counts.
///
/// Derived, immutable; computed fresh from each analysis pass and
/// discarded with it. `cv` is always >= 0 and never NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariationMetrics {
    pub mean: f64,
    pub std_dev: f64,
    pub cv: f64,
    pub classification: UniformityClass,
}

/// Compute mean, population standard deviation, and coefficient of
/// variation for a sample, classified against the given bands.
///
/// - Samples with fewer than 2 elements return `std_dev = 0`, `cv = 0`,
///   and `InsufficientData` (mean is the lone element, or 0 when empty).
/// - `mean == 0` forces `cv = 0` rather than dividing by zero.
/// - Standard deviation uses the population formula (divide by N, not N-1).
///
/// Negative or non-finite inputs are caller contract violations and fail
/// with a typed error naming the offending element.
pub fn compute_variation_metrics(sample: &[f64], bands: &CvBands) -> StatsResult<VariationMetrics> {
    validate_sample(sample)?;

    if sample.len() < 2 {
        return Ok(VariationMetrics {
            mean: sample.first().copied().unwrap_or(0.0),
            std_dev: 0.0,
            cv: 0.0,
            classification: UniformityClass::InsufficientData,
        });
    }

    let n = sample.len() as f64;
    let mean = sample.iter().sum::<f64>() / n;
    let variance = sample.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    let cv = if mean > 0.0 { std_dev / mean } else { 0.0 };

    Ok(VariationMetrics {
        mean,
        std_dev,
        cv,
        classification: bands.classify(cv),
    })
}

fn validate_sample(sample: &[f64]) -> StatsResult<()> {
    for (index, &value) in sample.iter().enumerate() {
        if !value.is_finite() {
            return Err(StatsError::NonFiniteValue { index });
        }
        if value < 0.0 {
            return Err(StatsError::NegativeValue { index, value });
        }
    }
    Ok(())
}

/// Symmetry score threshold above which a layout counts as suspiciously even
pub const SYMMETRIC_SCORE_THRESHOLD: u32 = 70;

/// Combine two CVs into a 0-100 "how evenly structured" score.
///
/// `round((1 - min(cv_a + cv_b, 2) / 2) * 100)`. Two near-zero CVs score
/// near 100 (perfectly even layout); large CVs bottom out at 0. This is a
/// fixed, reproducible contract, not a statistically principled measure.
pub fn symmetry_score(cv_a: f64, cv_b: f64) -> u32 {
    let combined = (cv_a + cv_b).min(2.0);
    ((1.0 - combined / 2.0) * 100.0).round() as u32
}

/// Whether a symmetry score flags the layout as suspiciously even
pub fn is_symmetric(score: u32) -> bool {
    score > SYMMETRIC_SCORE_THRESHOLD
}
