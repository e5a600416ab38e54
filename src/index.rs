//! Model index input
//!
//! The index is produced by an external directory scanner and is read-only to
//! this crate: it lists every known template package with its descriptor
//! summary. Keys are snake_case, matching the scanner's output.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::descriptor::{ExpressionRef, MotionRef};
use crate::error::{Error, Result};

/// The collaborator-produced model index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelIndex {
    /// All indexed template packages.
    #[serde(default)]
    pub models: Vec<ModelEntry>,
    /// Scanner metadata this crate does not interpret.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// One indexed template package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Stable identifier of the template package.
    pub model_id: String,
    /// Base directory of the package.
    pub model_path: PathBuf,
    #[serde(default)]
    pub textures: Vec<String>,
    #[serde(default)]
    pub texture_count: usize,
    #[serde(default)]
    pub motion_count: usize,
    #[serde(default)]
    pub expression_count: usize,
    #[serde(default)]
    pub motions: IndexMap<String, Vec<MotionRef>>,
    #[serde(default)]
    pub expressions: Vec<ExpressionRef>,
    #[serde(default)]
    pub physics_path: Option<String>,
    #[serde(default)]
    pub pose_path: Option<String>,
    #[serde(default)]
    pub character_name: Option<String>,
    /// Scanner fields this crate does not interpret (parameter IDs etc.).
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl ModelIndex {
    /// Load an index document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Look up an entry by model ID.
    pub fn find(&self, model_id: &str) -> Option<&ModelEntry> {
        self.models.iter().find(|m| m.model_id == model_id)
    }
}

impl ModelEntry {
    /// Whether the entry has at least one texture, motion, and expression.
    ///
    /// Random template selection prefers complete entries.
    pub fn is_complete(&self) -> bool {
        self.texture_count > 0 && self.motion_count > 0 && self.expression_count > 0
    }
}

/// An [`Error::ModelNotInIndex`] lookup that fails instead of returning `None`.
pub fn require_entry<'a>(index: &'a ModelIndex, model_id: &str) -> Result<&'a ModelEntry> {
    index
        .find(model_id)
        .ok_or_else(|| Error::ModelNotInIndex(model_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_scanner_output() {
        let index: ModelIndex = serde_json::from_str(
            r#"{
                "metadata": {"scan_version": "1.0"},
                "models": [{
                    "model_id": "100100",
                    "model_path": "data/models/100100",
                    "textures": ["textures/tex_00.png"],
                    "texture_count": 1,
                    "motion_count": 2,
                    "expression_count": 1,
                    "motions": {"Idle": [{"File": "mtn/idle.motion3.json"}]},
                    "expressions": [{"Name": "smile", "File": "exp/smile.exp3.json"}],
                    "physics_path": "model.physics3.json",
                    "character_name": "Hiyori",
                    "parameter_ids": ["ParamAngleX"]
                }]
            }"#,
        )
        .unwrap();

        let entry = index.find("100100").unwrap();
        assert!(entry.is_complete());
        assert_eq!(entry.physics_path.as_deref(), Some("model.physics3.json"));
        assert_eq!(entry.extra["parameter_ids"][0], "ParamAngleX");
        assert!(index.find("missing").is_none());
        assert!(require_entry(&index, "missing").is_err());
    }
}
