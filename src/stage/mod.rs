//! Asset copier
//!
//! Stages template-owned files into an output package directory. Each copy is
//! atomic for that one file (written to a temp sibling, then renamed) so a
//! partial write never corrupts other staged files. Missing sources are soft
//! warnings; staging always continues.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::descriptor::ModelDescriptor;
use crate::error::{Error, Result};
use crate::texture::{DEFAULT_PLACEHOLDER_SIZE, TextureSynthesizer};

/// Which template-owned single-file assets to stage.
///
/// Motions and expressions are always staged; they are not gated by options.
#[derive(Debug, Clone, Copy)]
pub struct StageOptions {
    pub copy_moc: bool,
    pub copy_physics: bool,
    pub copy_pose: bool,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            copy_moc: true,
            copy_physics: true,
            copy_pose: true,
        }
    }
}

/// What one staging pass did.
#[derive(Debug, Clone, Default)]
pub struct StageReport {
    /// Relative paths staged into the output directory.
    pub staged: Vec<String>,
    /// Soft failures: missing sources, per-file copy errors.
    pub warnings: Vec<String>,
}

impl StageReport {
    /// Fold another report into this one.
    pub fn absorb(&mut self, other: StageReport) {
        self.staged.extend(other.staged);
        self.warnings.extend(other.warnings);
    }
}

/// Stage the template's declared assets into `out_dir`.
///
/// Moc, physics, and pose are staged when the matching option is set, the
/// template declares the reference, and the source exists. Every declared
/// motion and expression file is staged unconditionally when its source
/// exists; each missing source adds a warning and staging continues.
pub fn stage(
    template: &ModelDescriptor,
    base_dir: &Path,
    out_dir: &Path,
    options: &StageOptions,
) -> Result<StageReport> {
    fs::create_dir_all(out_dir)?;
    let refs = &template.file_references;
    let mut report = StageReport::default();

    if options.copy_moc {
        stage_optional(&refs.moc, base_dir, out_dir, "moc", &mut report);
    }
    if options.copy_physics {
        if let Some(physics) = &refs.physics {
            stage_optional(physics, base_dir, out_dir, "physics", &mut report);
        }
    }
    if options.copy_pose {
        if let Some(pose) = &refs.pose {
            stage_optional(pose, base_dir, out_dir, "pose", &mut report);
        }
    }

    for entries in refs.motions.values() {
        for motion in entries {
            if motion.file.is_empty() {
                continue;
            }
            stage_optional(&motion.file, base_dir, out_dir, "motion", &mut report);
        }
    }
    for expression in &refs.expressions {
        if expression.file.is_empty() {
            continue;
        }
        stage_optional(&expression.file, base_dir, out_dir, "expression", &mut report);
    }

    Ok(report)
}

/// Stage the output descriptor's final texture list.
///
/// For each texture absent in `out_dir`: copy the template's matching
/// relative path when it exists (byte-for-byte, so dimensions are preserved).
/// A failed copy of an existing source is a warning, and nothing is
/// substituted for it. A placeholder is synthesized only when the template
/// has no source at all.
pub fn stage_textures(
    final_textures: &[String],
    base_dir: &Path,
    out_dir: &Path,
    synthesizer: &dyn TextureSynthesizer,
) -> Result<StageReport> {
    fs::create_dir_all(out_dir)?;
    let mut report = StageReport::default();

    for rel in final_textures {
        if rel.is_empty() {
            continue;
        }
        let dest = out_dir.join(rel);
        if dest.exists() {
            continue;
        }

        let src = base_dir.join(rel);
        if src.exists() {
            match stage_file(&src, &dest) {
                Ok(()) => {
                    info!(texture = %rel, "copied template texture");
                    report.staged.push(rel.clone());
                }
                Err(e) => {
                    let message = format!("failed to copy template texture {rel}: {e}");
                    warn!("{message}");
                    report.warnings.push(message);
                }
            }
            continue;
        }

        let (width, height) = DEFAULT_PLACEHOLDER_SIZE;
        synthesizer.synthesize(&dest, width, height)?;
        report.staged.push(rel.clone());
    }

    Ok(report)
}

/// Stage one declared reference if its source exists; warn otherwise.
fn stage_optional(rel: &str, base_dir: &Path, out_dir: &Path, kind: &str, report: &mut StageReport) {
    let src = base_dir.join(rel);
    if !src.exists() {
        let message = format!("template {kind} file missing: {rel}");
        warn!("{message}");
        report.warnings.push(message);
        return;
    }

    match stage_file(&src, &out_dir.join(rel)) {
        Ok(()) => {
            info!(kind, file = %rel, "staged");
            report.staged.push(rel.to_string());
        }
        Err(e) => {
            let message = format!("failed to stage {kind} file {rel}: {e}");
            warn!("{message}");
            report.warnings.push(message);
        }
    }
}

/// Copy `src` to `dest` atomically: temp sibling plus rename.
fn stage_file(src: &Path, dest: &Path) -> Result<()> {
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut reader = fs::File::open(src)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    std::io::copy(&mut reader, tmp.as_file_mut())?;
    tmp.persist(dest).map_err(|e| Error::CopyFailed {
        src: src.to_path_buf(),
        dest: dest.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::{PlaceholderSynthesizer, probe};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_template(dir: &Path) -> ModelDescriptor {
        fs::write(dir.join("model.moc3"), b"moc-bytes").unwrap();
        fs::write(dir.join("model.physics3.json"), b"{}").unwrap();
        fs::create_dir_all(dir.join("mtn")).unwrap();
        fs::write(dir.join("mtn/idle.motion3.json"), b"{}").unwrap();
        fs::create_dir_all(dir.join("exp")).unwrap();
        fs::write(dir.join("exp/smile.exp3.json"), b"{}").unwrap();

        serde_json::from_str(
            r#"{
                "Version": 3,
                "FileReferences": {
                    "Moc": "model.moc3",
                    "Physics": "model.physics3.json",
                    "Pose": "model.pose3.json",
                    "Motions": {
                        "Idle": [
                            {"File": "mtn/idle.motion3.json"},
                            {"File": "mtn/ghost.motion3.json"}
                        ]
                    },
                    "Expressions": [{"Name": "smile", "File": "exp/smile.exp3.json"}]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn stages_declared_assets_and_warns_on_missing_sources() {
        let template_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        let template = write_template(template_dir.path());

        let report = stage(
            &template,
            template_dir.path(),
            out_dir.path(),
            &StageOptions::default(),
        )
        .unwrap();

        assert!(out_dir.path().join("model.moc3").exists());
        assert!(out_dir.path().join("model.physics3.json").exists());
        assert!(out_dir.path().join("mtn/idle.motion3.json").exists());
        assert!(out_dir.path().join("exp/smile.exp3.json").exists());

        // declared pose and one motion are missing on disk: warnings, not aborts
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings.iter().any(|w| w.contains("model.pose3.json")));
        assert!(report.warnings.iter().any(|w| w.contains("mtn/ghost.motion3.json")));
        assert_eq!(
            fs::read(out_dir.path().join("model.moc3")).unwrap(),
            b"moc-bytes"
        );
    }

    #[test]
    fn options_gate_single_file_assets_but_not_motions() {
        let template_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        let template = write_template(template_dir.path());

        let options = StageOptions {
            copy_moc: false,
            copy_physics: false,
            copy_pose: false,
        };
        stage(&template, template_dir.path(), out_dir.path(), &options).unwrap();

        assert!(!out_dir.path().join("model.moc3").exists());
        assert!(!out_dir.path().join("model.physics3.json").exists());
        // motions/expressions are always staged
        assert!(out_dir.path().join("mtn/idle.motion3.json").exists());
        assert!(out_dir.path().join("exp/smile.exp3.json").exists());
    }

    #[test]
    fn texture_staging_copies_template_sources_first() {
        let template_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();

        let tex_dir = template_dir.path().join("textures");
        fs::create_dir_all(&tex_dir).unwrap();
        PlaceholderSynthesizer
            .synthesize(&tex_dir.join("tex_00.png"), 32, 32)
            .unwrap();

        let textures = vec![
            "textures/tex_00.png".to_string(),
            "textures/generated.png".to_string(),
        ];
        let report = stage_textures(
            &textures,
            template_dir.path(),
            out_dir.path(),
            &PlaceholderSynthesizer,
        )
        .unwrap();

        assert_eq!(report.staged.len(), 2);
        // template copy preserves bytes
        assert_eq!(
            fs::read(out_dir.path().join("textures/tex_00.png")).unwrap(),
            fs::read(tex_dir.join("tex_00.png")).unwrap()
        );
        // no template source: placeholder synthesized at the default size
        let info = probe(&out_dir.path().join("textures/generated.png")).unwrap();
        assert_eq!((info.width, info.height), DEFAULT_PLACEHOLDER_SIZE);
    }

    #[test]
    fn failed_copy_of_existing_source_warns_without_substituting_a_placeholder() {
        let template_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();

        // a directory where the source file should be makes the copy fail
        fs::create_dir_all(template_dir.path().join("textures/tex_00.png")).unwrap();

        let report = stage_textures(
            &["textures/tex_00.png".to_string()],
            template_dir.path(),
            out_dir.path(),
            &PlaceholderSynthesizer,
        )
        .unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("textures/tex_00.png"));
        assert!(report.staged.is_empty());
        assert!(!out_dir.path().join("textures/tex_00.png").is_file());
    }

    #[test]
    fn texture_staging_skips_files_already_present() {
        let template_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();

        let existing = out_dir.path().join("tex.png");
        fs::write(&existing, b"already generated").unwrap();

        let report = stage_textures(
            &["tex.png".to_string()],
            template_dir.path(),
            out_dir.path(),
            &PlaceholderSynthesizer,
        )
        .unwrap();

        assert!(report.staged.is_empty());
        assert_eq!(fs::read(&existing).unwrap(), b"already generated");
    }
}
