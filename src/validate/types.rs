//! Validation result types and progress tracking

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::texture::TextureInfo;

/// Per-package validation result.
///
/// Produced fresh per run and never mutated afterward. `is_valid` is true iff
/// `errors` is empty; warnings never affect validity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Stable identifier of the package (directory name).
    pub model_id: String,
    /// Package base directory.
    pub model_path: PathBuf,
    /// True iff `errors` is empty.
    pub is_valid: bool,
    /// Fault descriptions, in check order.
    pub errors: Vec<String>,
    /// Non-fatal advisories.
    pub warnings: Vec<String>,
    /// Declared path -> existence, in declaration order.
    pub file_checks: IndexMap<String, bool>,
    /// Per-texture decode outcome.
    pub texture_info: IndexMap<String, TextureReport>,
    /// Group-declared vs. motion-used parameter ID comparison.
    pub parameter_checks: ParameterChecks,
}

impl ValidationResult {
    /// An empty result for a package about to be checked.
    pub fn empty(model_id: impl Into<String>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_id: model_id.into(),
            model_path: model_path.into(),
            is_valid: false,
            errors: Vec::new(),
            warnings: Vec::new(),
            file_checks: IndexMap::new(),
            texture_info: IndexMap::new(),
            parameter_checks: ParameterChecks::default(),
        }
    }
}

/// Decode outcome for one declared texture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextureReport {
    /// The texture decoded successfully.
    Decoded(TextureInfo),
    /// The texture exists but could not be decoded.
    Failed {
        /// Decoder failure message.
        error: String,
    },
}

/// Parameter IDs declared in groups vs. referenced by the sampled motion.
///
/// The motion side samples only the first motion file of the first non-empty
/// group in iteration order. That heuristic is deliberate; changing it to an
/// exhaustive scan changes validation behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterChecks {
    /// IDs declared by `Target == "Parameter"` groups, sorted.
    pub group_parameters: Vec<String>,
    /// IDs referenced by the sampled motion's parameter curves, sorted.
    pub motion_parameters: Vec<String>,
    /// Intersection of the two sets, sorted.
    pub common_parameters: Vec<String>,
    /// Declared but not used by the sampled motion.
    pub group_only_parameters: Vec<String>,
    /// Used by the sampled motion but not declared.
    pub motion_only_parameters: Vec<String>,
}

/// Phase of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPhase {
    /// Structural schema checks on the raw manifest.
    Schema,
    /// Moc reference existence.
    Moc,
    /// Texture existence and decode.
    Textures,
    /// Physics reference existence.
    Physics,
    /// Pose reference existence.
    Pose,
    /// Motion file existence and well-formedness.
    Motions,
    /// Expression file existence and well-formedness.
    Expressions,
    /// Parameter consistency sampling.
    Parameters,
    /// Run complete.
    Complete,
}

impl ValidationPhase {
    /// Human-readable description of this phase.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Schema => "Checking manifest schema",
            Self::Moc => "Checking moc reference",
            Self::Textures => "Checking textures",
            Self::Physics => "Checking physics reference",
            Self::Pose => "Checking pose reference",
            Self::Motions => "Checking motions",
            Self::Expressions => "Checking expressions",
            Self::Parameters => "Checking parameter consistency",
            Self::Complete => "Complete",
        }
    }
}

/// Progress information during validation.
#[derive(Debug, Clone)]
pub struct ValidationProgress {
    /// Current phase.
    pub phase: ValidationPhase,
    /// Current item number (1-indexed).
    pub current: usize,
    /// Total number of items.
    pub total: usize,
    /// Current file or package being processed, if applicable.
    pub current_file: Option<String>,
}

impl ValidationProgress {
    /// Create a new progress update.
    #[must_use]
    pub fn new(phase: ValidationPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: None,
        }
    }

    /// Create a progress update with a file/item name.
    #[must_use]
    pub fn with_file(
        phase: ValidationPhase,
        current: usize,
        total: usize,
        file: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: Some(file.into()),
        }
    }

    /// Get the progress percentage (0.0 - 1.0).
    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Progress callback type for validation runs.
pub type ValidationProgressCallback<'a> = &'a (dyn Fn(&ValidationProgress) + Sync + Send);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn phase_descriptions_are_distinct() {
        let phases = [
            ValidationPhase::Schema,
            ValidationPhase::Moc,
            ValidationPhase::Textures,
            ValidationPhase::Physics,
            ValidationPhase::Pose,
            ValidationPhase::Motions,
            ValidationPhase::Expressions,
            ValidationPhase::Parameters,
            ValidationPhase::Complete,
        ];
        let descriptions: HashSet<&str> = phases.iter().map(|p| p.as_str()).collect();
        assert_eq!(descriptions.len(), phases.len());
    }

    #[test]
    fn percentage_is_safe_on_zero_total() {
        let progress = ValidationProgress::new(ValidationPhase::Schema, 0, 0);
        assert!((progress.percentage() - 1.0).abs() < f32::EPSILON);

        let halfway = ValidationProgress::with_file(ValidationPhase::Textures, 1, 2, "tex.png");
        assert!((halfway.percentage() - 0.5).abs() < f32::EPSILON);
        assert_eq!(halfway.current_file.as_deref(), Some("tex.png"));
    }
}
