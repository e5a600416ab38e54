//! Merge engine
//!
//! Combines a template descriptor with newly supplied asset fragments into a
//! new descriptor. Textures and physics are ownership transfers (wholesale
//! replace); motions and expressions are additive merges deduplicated by
//! `File`, never destructive.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::descriptor::{
    COMPAT_MANIFEST_NAME, ExpressionRef, MANIFEST_SUFFIX, ModelDescriptor, MotionRef,
};
use crate::error::Result;

/// Newly supplied asset fragments for one merge.
///
/// `None` means "leave the template's section untouched". `Some` transfers
/// ownership of the section (textures, physics) or merges additively into it
/// (motions, expressions).
#[derive(Debug, Clone, Default)]
pub struct MergeInputs {
    /// Replacement texture list. `Some(vec![])` empties the list.
    pub textures: Option<Vec<String>>,
    /// Replacement physics reference path.
    pub physics: Option<String>,
    /// Motion entries to append per group, deduplicated by `File`.
    pub motions: Option<IndexMap<String, Vec<MotionRef>>>,
    /// Expression entries to append, deduplicated by `File`.
    pub expressions: Option<Vec<ExpressionRef>>,
}

impl MergeInputs {
    /// Inputs that leave every section of the template untouched.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Merge asset fragments into a clone of the template descriptor.
///
/// The template itself is never mutated. Existing motion/expression entries
/// keep their position and their other fields even when an incoming entry
/// shares their `File`; incoming entries without a `File` are skipped.
pub fn merge(template: &ModelDescriptor, inputs: &MergeInputs) -> ModelDescriptor {
    let mut out = template.clone();
    let refs = &mut out.file_references;

    if let Some(textures) = &inputs.textures {
        refs.textures = textures.clone();
        info!(count = textures.len(), "replaced texture list");
    }

    if let Some(physics) = &inputs.physics {
        refs.physics = Some(physics.clone());
        info!(physics = %physics, "replaced physics reference");
    }

    if let Some(groups) = &inputs.motions {
        let mut appended = 0usize;
        for (group, entries) in groups {
            let slot = refs.motions.entry(group.clone()).or_default();
            let mut seen: HashSet<String> = slot.iter().map(|m| m.file.clone()).collect();
            for entry in entries {
                if entry.file.is_empty() {
                    // malformed input, not an error
                    continue;
                }
                if seen.insert(entry.file.clone()) {
                    slot.push(entry.clone());
                    appended += 1;
                } else {
                    debug!(group = %group, file = %entry.file, "duplicate motion suppressed");
                }
            }
        }
        info!(appended, "merged motions");
    }

    if let Some(expressions) = &inputs.expressions {
        let mut seen: HashSet<String> = refs
            .expressions
            .iter()
            .map(|e| e.file.clone())
            .collect();
        let mut appended = 0usize;
        for entry in expressions {
            if entry.file.is_empty() {
                continue;
            }
            if seen.insert(entry.file.clone()) {
                refs.expressions.push(entry.clone());
                appended += 1;
            } else {
                debug!(file = %entry.file, "duplicate expression suppressed");
            }
        }
        info!(appended, "merged expressions");
    }

    out
}

/// Outcome of writing a merged descriptor.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// The canonical `<name>.model3.json` path.
    pub canonical: PathBuf,
    /// The compatibility copy, when it was written.
    pub compat: Option<PathBuf>,
    /// Non-fatal problems (compat copy failure).
    pub warnings: Vec<String>,
}

/// Write a descriptor to its canonical path and the fixed compatibility name.
///
/// The canonical `<output_name>.model3.json` is authoritative; a failure to
/// write it is fatal. The `model.model3.json` compatibility copy exists for
/// consumers with fixed naming, and a failure to write it is only a warning.
pub fn write_descriptor(
    descriptor: &ModelDescriptor,
    out_dir: &Path,
    output_name: &str,
) -> Result<WriteOutcome> {
    fs::create_dir_all(out_dir)?;
    let bytes = descriptor.to_json_bytes()?;

    let canonical = out_dir.join(format!("{output_name}{MANIFEST_SUFFIX}"));
    fs::write(&canonical, &bytes)?;
    info!(path = %canonical.display(), "wrote manifest");

    let compat_path = out_dir.join(COMPAT_MANIFEST_NAME);
    let mut warnings = Vec::new();
    let compat = match fs::write(&compat_path, &bytes) {
        Ok(()) => Some(compat_path),
        Err(e) => {
            let message =
                format!("failed to write compatibility manifest {}: {e}", compat_path.display());
            warn!("{message}");
            warnings.push(message);
            None
        }
    };

    Ok(WriteOutcome {
        canonical,
        compat,
        warnings,
    })
}
