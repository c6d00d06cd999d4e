//! Analysis steps - the six-step detection wizard
//!
//! Each step examines one axis of the document (section layout, section
//! roles, paragraph roles, sentence rhythm, human voice markers) and the
//! final validation step gates on the accumulated results.

pub mod base;
pub mod engine;

pub mod human_features;
pub mod paragraph_roles;
pub mod section_roles;
pub mod section_uniformity;
pub mod sentence_length;
pub mod validation;

pub use base::{AnalysisStep, ProgressCallback, RunSummary, StepConfig, StepContext, StepResult};
pub use engine::StepEngine;

use std::sync::Arc;

/// All wizard steps in their canonical order
pub fn default_steps() -> Vec<Arc<dyn AnalysisStep>> {
    vec![
        Arc::new(section_uniformity::SectionUniformityStep),
        Arc::new(section_roles::SectionRolesStep),
        Arc::new(paragraph_roles::ParagraphRolesStep),
        Arc::new(sentence_length::SentenceLengthStep),
        Arc::new(human_features::HumanFeaturesStep),
        Arc::new(validation::ValidationStep),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_steps_ordered_and_unique() {
        let steps = default_steps();
        assert_eq!(steps.len(), 6);
        for (i, step) in steps.iter().enumerate() {
            assert_eq!(step.number() as usize, i + 1);
        }

        let names: std::collections::HashSet<_> = steps.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn test_only_validation_is_dependent() {
        for step in default_steps() {
            assert_eq!(step.is_dependent(), step.name() == "validation");
        }
    }
}
