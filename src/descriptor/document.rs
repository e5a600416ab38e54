//! `model3.json` descriptor structures
//!
//! Field names follow the on-disk PascalCase convention. Unknown keys are
//! captured in flattened maps so that a load/save cycle round-trips sections
//! this crate does not interpret.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Suffix shared by all package manifests.
pub const MANIFEST_SUFFIX: &str = ".model3.json";

/// Fixed compatibility manifest name written alongside the canonical one.
pub const COMPAT_MANIFEST_NAME: &str = "model.model3.json";

/// A `model3.json` package descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModelDescriptor {
    /// Manifest format version (normally `3`).
    pub version: serde_json::Number,
    /// File references section - every path a package declares.
    pub file_references: FileReferences,
    /// Parameter groups; only `Target == "Parameter"` entries matter to validation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<ParameterGroup>,
    /// Declared hit areas.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hit_areas: Vec<HitArea>,
    /// Unknown top-level keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// The `FileReferences` section of a descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileReferences {
    /// Path to the binary moc data. Required.
    pub moc: String,
    /// Ordered texture paths. Order is the binding index and must be preserved.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub textures: Vec<String>,
    /// Optional physics settings file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physics: Option<String>,
    /// Optional pose file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<String>,
    /// Expression entries, unique by `File`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expressions: Vec<ExpressionRef>,
    /// Motion groups; each group is an ordered list unique by `File`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub motions: IndexMap<String, Vec<MotionRef>>,
    /// Unknown keys in this section, preserved verbatim.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// One motion entry inside a motion group.
///
/// `File` defaults to the empty string when absent so that malformed entries
/// survive parsing; the merge engine skips them and the validator flags them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MotionRef {
    /// Relative path to the `*.motion3.json` fragment. Dedup key.
    #[serde(default)]
    pub file: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Unknown keys (fade times etc.), preserved verbatim.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// One expression entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExpressionRef {
    /// Display name of the expression.
    #[serde(default)]
    pub name: String,
    /// Relative path to the `*.exp3.json` fragment. Dedup key.
    #[serde(default)]
    pub file: String,
    /// Unknown keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// A parameter group declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterGroup {
    /// Group target, e.g. `"Parameter"`.
    pub target: String,
    /// Semantic bucket name, e.g. `"EyeBlink"`.
    pub name: String,
    /// Parameter IDs belonging to this group.
    #[serde(default)]
    pub ids: Vec<String>,
}

/// A hit area declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HitArea {
    /// Artmesh ID backing the hit area.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

impl ModelDescriptor {
    /// Load a descriptor from a manifest file.
    ///
    /// # Errors
    /// Returns [`Error::ManifestParse`] when the file is not a structurally
    /// valid descriptor.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| Error::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the first manifest found in a package directory.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let manifest = find_manifest(dir)?;
        Self::load(&manifest)
    }

    /// Serialize this descriptor to pretty-printed JSON bytes.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Find the first `*.model3.json` manifest in a package directory.
///
/// Candidates are sorted by filename so the result is deterministic when a
/// package carries both a canonical and a compatibility manifest.
pub fn find_manifest(dir: &Path) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .is_some_and(|n| n.to_string_lossy().ends_with(MANIFEST_SUFFIX))
        })
        .collect();

    candidates.sort();
    candidates.into_iter().next().ok_or(Error::ManifestNotFound {
        dir: dir.to_path_buf(),
    })
}
