//! Asset fragment documents - `motion3.json`, `exp3.json`, `physics3.json`
//!
//! Fragments are produced by external generation backends. The validator only
//! cares about a handful of required fields per kind; everything else is
//! preserved in flattened maps so a copy or scale transform round-trips the
//! document losslessly.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

// ==================== Motion fragments ====================

/// A `*.motion3.json` motion fragment.
///
/// Required fields are modeled as `Option` so that a syntactically valid but
/// structurally incomplete fragment still parses; [`MotionDocument::structural_issues`]
/// reports what is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MotionDocument {
    /// Motion format version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<serde_json::Number>,
    /// Timing metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MotionMeta>,
    /// Animation curves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curves: Option<Vec<MotionCurve>>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// The `Meta` block of a motion fragment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MotionMeta {
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub fps: f64,
    #[serde(rename = "Loop", default)]
    pub loop_: Option<bool>,
    #[serde(default)]
    pub curve_count: Option<u64>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// One animation curve.
///
/// `Segments` is a leading `(t0, v0)` pair followed by repeated
/// `(1, t, v)` linear-segment triples.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MotionCurve {
    /// Curve target, e.g. `"Parameter"`.
    #[serde(default)]
    pub target: String,
    /// Parameter ID driven by this curve.
    #[serde(default)]
    pub id: String,
    /// Flattened segment encoding.
    #[serde(default)]
    pub segments: Vec<f64>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl MotionDocument {
    /// Load a motion fragment.
    pub fn load(path: &Path) -> Result<Self> {
        load_fragment(path, "motion")
    }

    /// Structural problems that make this fragment unusable as a motion.
    pub fn structural_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.version.is_none() {
            issues.push("missing Version".to_string());
        }
        if self.curves.is_none() {
            issues.push("missing Curves".to_string());
        }
        issues
    }

    /// Parameter IDs referenced by `Target == "Parameter"` curves.
    pub fn parameter_ids(&self) -> Vec<String> {
        self.curves
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|c| c.target == "Parameter" && !c.id.is_empty())
            .map(|c| c.id.clone())
            .collect()
    }
}

// ==================== Expression fragments ====================

/// A `*.exp3.json` expression fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExpressionDocument {
    /// Fragment type tag, normally `"Live2D Expression"`.
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub expression_type: Option<String>,
    #[serde(default)]
    pub fade_in_time: Option<f64>,
    #[serde(default)]
    pub fade_out_time: Option<f64>,
    /// Parameter offsets applied while the expression is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ExpressionParameter>>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// One parameter entry of an expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExpressionParameter {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub value: f64,
    /// Blend mode: `Add`, `Multiply`, or `Overwrite`.
    #[serde(default)]
    pub blend: Option<String>,
}

impl ExpressionDocument {
    /// Load an expression fragment.
    pub fn load(path: &Path) -> Result<Self> {
        load_fragment(path, "expression")
    }

    /// Structural problems that make this fragment unusable as an expression.
    pub fn structural_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.expression_type.is_none() {
            issues.push("missing Type".to_string());
        }
        if self.parameters.is_none() {
            issues.push("missing Parameters".to_string());
        }
        issues
    }
}

// ==================== Physics fragments ====================

/// A `*.physics3.json` physics fragment.
///
/// Only the numeric tuning fields are interpreted; the rest of the document
/// rides along in the flattened maps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PhysicsDocument {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub physics_settings: Vec<PhysicsSetting>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// One physics setting group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PhysicsSetting {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<PhysicsOutput>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub particles: Vec<PhysicsParticle>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Output tuning values of a physics setting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PhysicsOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Numeric in some exports, boolean in others; scaled only when numeric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflect: Option<Value>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Particle tuning values of a physics setting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PhysicsParticle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobility: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceleration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl PhysicsDocument {
    /// Load a physics fragment.
    pub fn load(path: &Path) -> Result<Self> {
        load_fragment(path, "physics")
    }

    /// Return a copy with every interpreted numeric tuning field multiplied
    /// by `factor`. Uninterpreted fields are untouched.
    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = self.clone();
        for setting in &mut out.physics_settings {
            for output in &mut setting.outputs {
                output.scale = output.scale.map(|v| v * factor);
                output.weight = output.weight.map(|v| v * factor);
                if let Some(reflect) = &mut output.reflect {
                    if let Some(v) = reflect.as_f64() {
                        if let Some(scaled) = serde_json::Number::from_f64(v * factor) {
                            *reflect = Value::Number(scaled);
                        }
                    }
                }
            }
            for particle in &mut setting.particles {
                particle.mobility = particle.mobility.map(|v| v * factor);
                particle.delay = particle.delay.map(|v| v * factor);
                particle.acceleration = particle.acceleration.map(|v| v * factor);
                particle.radius = particle.radius.map(|v| v * factor);
            }
        }
        out
    }

    /// Serialize to pretty-printed JSON bytes.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

fn load_fragment<T: serde::de::DeserializeOwned>(path: &Path, kind: &'static str) -> Result<T> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| Error::FragmentParse {
        kind,
        path: path.to_path_buf(),
        source,
    })
}
