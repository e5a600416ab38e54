//! Package validator
//!
//! Runs the fixed check sequence over a produced package: schema, moc,
//! textures, physics, pose, motions, expressions, parameter consistency,
//! aggregate. Checks never short-circuit; each appends its findings and the
//! later checks run against whatever best-effort data is present.
//!
//! The validator never returns `Err` for a package, whatever its state - a
//! missing manifest yields an invalid [`ValidationResult`] with one error so
//! batch validation can continue uninterrupted.

pub mod batch;
mod schema;
pub mod types;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::descriptor::{ExpressionDocument, MotionDocument, find_manifest};
use crate::resolver::check_file_exists;
use crate::texture;

use schema::SectionView;

pub use batch::{
    BatchProgress, REPORT_FILENAME, ReportMetadata, ValidationReport, ValidationStatistics,
    validate_from_index,
};
pub use types::{
    ParameterChecks, TextureReport, ValidationPhase, ValidationProgress,
    ValidationProgressCallback, ValidationResult,
};

/// Number of sequential check phases, for progress reporting.
const PHASE_COUNT: usize = 8;

/// Validate one package directory.
pub fn validate_package(model_dir: &Path) -> ValidationResult {
    validate_package_with_progress(model_dir, &|_| {})
}

/// Validate one package directory with a progress callback.
pub fn validate_package_with_progress(
    model_dir: &Path,
    progress: ValidationProgressCallback,
) -> ValidationResult {
    let model_id = model_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| model_dir.display().to_string());
    let mut result = ValidationResult::empty(model_id, model_dir);

    let manifest_path = match find_manifest(model_dir) {
        Ok(path) => path,
        Err(e) => {
            result.errors.push(e.to_string());
            return finish(result);
        }
    };

    let manifest: Value = match std::fs::read_to_string(&manifest_path)
        .map_err(|e| e.to_string())
        .and_then(|content| serde_json::from_str(&content).map_err(|e| e.to_string()))
    {
        Ok(value) => value,
        Err(e) => {
            result
                .errors
                .push(format!("failed to read manifest {}: {e}", manifest_path.display()));
            return finish(result);
        }
    };

    let phase = |p: ValidationPhase, n: usize| {
        debug!(step = n, total = PHASE_COUNT, "{}", p.as_str());
        progress(&ValidationProgress::new(p, n, PHASE_COUNT));
    };

    phase(ValidationPhase::Schema, 1);
    schema::check(&manifest, &mut result.errors);
    let view = SectionView::extract(&manifest);

    phase(ValidationPhase::Moc, 2);
    check_moc(&view, model_dir, &mut result);

    phase(ValidationPhase::Textures, 3);
    check_textures(&view, model_dir, &mut result);

    phase(ValidationPhase::Physics, 4);
    check_single_ref(view.physics.as_deref(), "physics", model_dir, &mut result);

    phase(ValidationPhase::Pose, 5);
    check_single_ref(view.pose.as_deref(), "pose", model_dir, &mut result);

    phase(ValidationPhase::Motions, 6);
    check_motions(&view, model_dir, &mut result);

    phase(ValidationPhase::Expressions, 7);
    check_expressions(&view, model_dir, &mut result);

    phase(ValidationPhase::Parameters, 8);
    check_parameter_consistency(&view, model_dir, &mut result);

    progress(&ValidationProgress::new(
        ValidationPhase::Complete,
        PHASE_COUNT,
        PHASE_COUNT,
    ));
    finish(result)
}

/// Aggregate: validity is decided by errors alone.
fn finish(mut result: ValidationResult) -> ValidationResult {
    result.is_valid = result.errors.is_empty();
    debug!(
        model_id = %result.model_id,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "validation finished"
    );
    result
}

fn resolve_path(rel: &str, base: &Path) -> PathBuf {
    let candidate = Path::new(rel);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    }
}

fn check_moc(view: &SectionView, base: &Path, result: &mut ValidationResult) {
    match view.moc.as_deref() {
        Some(moc) if !moc.is_empty() => {
            let exists = check_file_exists(moc, base);
            result.file_checks.insert(moc.to_string(), exists);
            if !exists {
                result.errors.push(format!("moc file not found: {moc}"));
            }
        }
        _ => result
            .errors
            .push("manifest declares no Moc reference".to_string()),
    }
}

fn check_textures(view: &SectionView, base: &Path, result: &mut ValidationResult) {
    if view.textures.is_empty() {
        result
            .warnings
            .push("model declares no textures".to_string());
        return;
    }

    for tex in &view.textures {
        let exists = check_file_exists(tex, base);
        result.file_checks.insert(tex.clone(), exists);
        if !exists {
            result.errors.push(format!("texture file not found: {tex}"));
            continue;
        }
        match texture::probe(&resolve_path(tex, base)) {
            Ok(info) => {
                result
                    .texture_info
                    .insert(tex.clone(), TextureReport::Decoded(info));
            }
            Err(e) => {
                result
                    .errors
                    .push(format!("failed to decode texture {tex}: {e}"));
                result.texture_info.insert(
                    tex.clone(),
                    TextureReport::Failed {
                        error: e.to_string(),
                    },
                );
            }
        }
    }
}

/// Declared-but-absent is always an error, even for optional references.
fn check_single_ref(rel: Option<&str>, kind: &str, base: &Path, result: &mut ValidationResult) {
    let Some(rel) = rel else { return };
    if rel.is_empty() {
        return;
    }
    let exists = check_file_exists(rel, base);
    result.file_checks.insert(rel.to_string(), exists);
    if !exists {
        result.errors.push(format!("{kind} file not found: {rel}"));
    }
}

fn check_motions(view: &SectionView, base: &Path, result: &mut ValidationResult) {
    for (group, files) in &view.motions {
        for file in files {
            let Some(file) = file.as_deref().filter(|f| !f.is_empty()) else {
                result
                    .errors
                    .push(format!("motion entry in group '{group}' has no File"));
                continue;
            };

            let exists = check_file_exists(file, base);
            result.file_checks.insert(file.to_string(), exists);
            if !exists {
                result.errors.push(format!("motion file not found: {file}"));
                continue;
            }

            match MotionDocument::load(&resolve_path(file, base)) {
                Ok(doc) => {
                    let issues = doc.structural_issues();
                    if !issues.is_empty() {
                        result.errors.push(format!(
                            "malformed motion file {file}: {}",
                            issues.join(", ")
                        ));
                    }
                }
                Err(e) => result
                    .errors
                    .push(format!("failed to read motion file {file}: {e}")),
            }
        }
    }
}

fn check_expressions(view: &SectionView, base: &Path, result: &mut ValidationResult) {
    for file in &view.expressions {
        let Some(file) = file.as_deref().filter(|f| !f.is_empty()) else {
            result
                .errors
                .push("expression entry has no File".to_string());
            continue;
        };

        let exists = check_file_exists(file, base);
        result.file_checks.insert(file.to_string(), exists);
        if !exists {
            result
                .errors
                .push(format!("expression file not found: {file}"));
            continue;
        }

        match ExpressionDocument::load(&resolve_path(file, base)) {
            Ok(doc) => {
                let issues = doc.structural_issues();
                if !issues.is_empty() {
                    result.errors.push(format!(
                        "malformed expression file {file}: {}",
                        issues.join(", ")
                    ));
                }
            }
            Err(e) => result
                .errors
                .push(format!("failed to read expression file {file}: {e}")),
        }
    }
}

/// Compare group-declared parameter IDs with those used by one sampled motion.
///
/// Only the first motion of the first group whose first entry carries a
/// usable `File` is sampled. The symmetric difference is surfaced as
/// warnings; it never affects validity.
fn check_parameter_consistency(view: &SectionView, base: &Path, result: &mut ValidationResult) {
    let mut group_params: BTreeSet<String> = BTreeSet::new();
    for (target, ids) in &view.groups {
        if target == "Parameter" {
            group_params.extend(ids.iter().cloned());
        }
    }

    let mut motion_params: BTreeSet<String> = BTreeSet::new();
    for (_, files) in &view.motions {
        let Some(first) = files.first() else { continue };
        let Some(file) = first.as_deref().filter(|f| !f.is_empty()) else {
            continue;
        };
        match MotionDocument::load(&resolve_path(file, base)) {
            Ok(doc) => motion_params.extend(doc.parameter_ids()),
            Err(_) => result
                .warnings
                .push(format!("could not read motion for parameter check: {file}")),
        }
        break;
    }

    let checks = &mut result.parameter_checks;
    checks.common_parameters = group_params.intersection(&motion_params).cloned().collect();
    checks.group_only_parameters = group_params.difference(&motion_params).cloned().collect();
    checks.motion_only_parameters = motion_params.difference(&group_params).cloned().collect();
    checks.group_parameters = group_params.into_iter().collect();
    checks.motion_parameters = motion_params.into_iter().collect();

    if !checks.group_only_parameters.is_empty() {
        let sample: Vec<&str> = checks
            .group_only_parameters
            .iter()
            .take(10)
            .map(String::as_str)
            .collect();
        result.warnings.push(format!(
            "parameters declared in groups but unused by the sampled motion: {sample:?}"
        ));
    }
    if !checks.motion_only_parameters.is_empty() {
        let sample: Vec<&str> = checks
            .motion_only_parameters
            .iter()
            .take(10)
            .map(String::as_str)
            .collect();
        result.warnings.push(format!(
            "parameters used by the sampled motion but not declared in groups: {sample:?}"
        ));
    }
}
