//! Reference resolver
//!
//! Resolves every file reference a descriptor declares against a base
//! directory and reports existence. Absence is data at this layer, never an
//! error; the validator decides severity.

use std::path::Path;

use indexmap::IndexMap;

use crate::descriptor::ModelDescriptor;

/// Existence of every declared reference, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedRefs {
    /// Declared path -> whether it exists under the base directory.
    pub checks: IndexMap<String, bool>,
}

impl ResolvedRefs {
    /// Existence of one declared path, if it was declared at all.
    pub fn exists(&self, path: &str) -> Option<bool> {
        self.checks.get(path).copied()
    }

    /// Declared paths that do not exist.
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.checks
            .iter()
            .filter(|(_, exists)| !**exists)
            .map(|(path, _)| path.as_str())
    }

    /// Whether every declared reference exists.
    pub fn all_exist(&self) -> bool {
        self.checks.values().all(|exists| *exists)
    }
}

/// Check one declared path against a base directory.
///
/// Absolute paths are self-contained; relative paths resolve under `base`.
pub fn check_file_exists(path: &str, base: &Path) -> bool {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        candidate.exists()
    } else {
        base.join(candidate).exists()
    }
}

/// Resolve every reference a descriptor declares.
///
/// Order: moc, textures, physics, pose, motions (group order), expressions.
/// Empty `File` entries are skipped; the validator reports those separately.
pub fn resolve(descriptor: &ModelDescriptor, base_dir: &Path) -> ResolvedRefs {
    let refs = &descriptor.file_references;
    let mut checks = IndexMap::new();

    let mut record = |path: &str| {
        if !path.is_empty() {
            checks.insert(path.to_string(), check_file_exists(path, base_dir));
        }
    };

    record(&refs.moc);
    for texture in &refs.textures {
        record(texture);
    }
    if let Some(physics) = &refs.physics {
        record(physics);
    }
    if let Some(pose) = &refs.pose {
        record(pose);
    }
    for entries in refs.motions.values() {
        for motion in entries {
            record(&motion.file);
        }
    }
    for expression in &refs.expressions {
        record(&expression.file);
    }

    ResolvedRefs { checks }
}
