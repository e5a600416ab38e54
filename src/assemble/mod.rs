//! Assembly orchestrator
//!
//! Sequences one package build: select a template from the index, resolve the
//! per-asset plans, merge, stage, write the manifest, and optionally
//! validate. Each build is a self-contained unit writing only under its own
//! output directory, so the batch layer can run units concurrently without
//! shared state.

pub mod batch;

use std::fs;
use std::path::PathBuf;

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::descriptor::{ExpressionRef, ModelDescriptor, MotionRef};
use crate::error::{Error, Result};
use crate::index::{ModelEntry, ModelIndex, require_entry};
use crate::merge::{MergeInputs, merge, write_descriptor};
use crate::resolver;
use crate::stage::{StageOptions, stage, stage_textures};
use crate::texture::{PlaceholderSynthesizer, TextureSynthesizer};
use crate::validate::{ValidationResult, validate_package};

pub use batch::{AssemblyProgress, BatchAssembleResult, batch_assemble};

/// How to pick the template package for a build.
#[derive(Debug, Clone)]
pub enum TemplateSelection {
    /// Use the entry with this model ID.
    Specified(String),
    /// Pick a random entry, preferring complete ones.
    Random,
    /// Pick the entry whose texture count is closest to the target.
    SimilarTextureCount(usize),
}

/// Texture handling for one build.
///
/// Each variant carries exactly the data that mode needs; the merge engine
/// never sees a mode tag.
#[derive(Debug, Clone, Default)]
pub enum TexturePlan {
    /// Keep the template's texture list.
    #[default]
    Reuse,
    /// Transfer ownership of the texture list to this (generated) one.
    Replace(Vec<String>),
}

/// Motion handling for one build.
#[derive(Debug, Clone, Default)]
pub enum MotionPlan {
    /// Keep the template's motions.
    #[default]
    Reuse,
    /// Append these (generated) entries per group, deduplicated by `File`.
    Add(IndexMap<String, Vec<MotionRef>>),
}

/// Expression handling for one build.
#[derive(Debug, Clone, Default)]
pub enum ExpressionPlan {
    /// Keep the template's expressions.
    #[default]
    Reuse,
    /// Append these (generated) entries, deduplicated by `File`.
    Add(Vec<ExpressionRef>),
}

/// Physics handling for one build.
///
/// `Replace` points at a physics file the generation collaborator has already
/// written under the unit's output directory; staging of the template's
/// physics is skipped in that case.
#[derive(Debug, Clone, Default)]
pub enum PhysicsPlan {
    /// Keep and stage the template's physics.
    #[default]
    Reuse,
    /// Reference this (generated) physics file instead.
    Replace(String),
}

/// One package build request.
#[derive(Debug, Clone)]
pub struct AssemblyJob {
    /// Name of the output package (directory and canonical manifest stem).
    pub output_name: String,
    pub selection: TemplateSelection,
    pub textures: TexturePlan,
    pub motions: MotionPlan,
    pub expressions: ExpressionPlan,
    pub physics: PhysicsPlan,
}

impl AssemblyJob {
    /// A job that clones the selected template unchanged.
    pub fn clone_template(output_name: impl Into<String>, selection: TemplateSelection) -> Self {
        Self {
            output_name: output_name.into(),
            selection,
            textures: TexturePlan::default(),
            motions: MotionPlan::default(),
            expressions: ExpressionPlan::default(),
            physics: PhysicsPlan::default(),
        }
    }
}

/// Orchestrator configuration. Explicit, no ambient globals.
#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    /// Root under which each job gets its own `<output_name>/` directory.
    pub output_dir: PathBuf,
    pub copy_moc: bool,
    pub copy_physics: bool,
    pub copy_pose: bool,
    /// Run the validator over the finished package.
    pub enable_validation: bool,
}

impl AssemblyOptions {
    /// Default options writing under `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            copy_moc: true,
            copy_physics: true,
            copy_pose: true,
            enable_validation: true,
        }
    }
}

/// Outcome of one package build.
#[derive(Debug)]
pub struct AssemblyOutcome {
    /// Model ID of the selected template.
    pub template_id: String,
    /// The unit's output directory.
    pub output_dir: PathBuf,
    /// Canonical manifest path.
    pub manifest_path: PathBuf,
    /// Soft failures collected across resolve, stage, and write.
    pub warnings: Vec<String>,
    /// Validation result, when validation is enabled.
    pub validation: Option<ValidationResult>,
}

/// The single-package entry point handed to the batch layer.
pub struct Assembler {
    options: AssemblyOptions,
    synthesizer: Box<dyn TextureSynthesizer>,
}

impl Assembler {
    /// Build an assembler with the default placeholder synthesizer.
    pub fn new(options: AssemblyOptions) -> Self {
        Self::with_synthesizer(options, Box::new(PlaceholderSynthesizer))
    }

    /// Build an assembler with an injected texture synthesizer.
    pub fn with_synthesizer(
        options: AssemblyOptions,
        synthesizer: Box<dyn TextureSynthesizer>,
    ) -> Self {
        Self {
            options,
            synthesizer,
        }
    }

    /// Build one package.
    ///
    /// Terminal failures (unknown template ID, missing template directory or
    /// manifest) abort only this unit; sibling units in a batch are
    /// unaffected.
    pub fn assemble(&self, job: &AssemblyJob, index: &ModelIndex) -> Result<AssemblyOutcome> {
        let entry = select_template(index, &job.selection)?;
        info!(
            template = %entry.model_id,
            output = %job.output_name,
            "assembling package"
        );

        let template_dir = &entry.model_path;
        if !template_dir.exists() {
            return Err(Error::TemplateDirMissing(template_dir.clone()));
        }
        let template = ModelDescriptor::load_from_dir(template_dir)?;

        let mut warnings = Vec::new();
        let resolved = resolver::resolve(&template, template_dir);
        for missing in resolved.missing() {
            let message = format!("template reference missing on disk: {missing}");
            warn!(template = %entry.model_id, "{message}");
            warnings.push(message);
        }

        let out_dir = self.options.output_dir.join(&job.output_name);
        fs::create_dir_all(&out_dir)?;

        let inputs = MergeInputs {
            textures: match &job.textures {
                TexturePlan::Reuse => None,
                TexturePlan::Replace(list) => Some(list.clone()),
            },
            physics: match &job.physics {
                PhysicsPlan::Reuse => None,
                PhysicsPlan::Replace(path) => Some(path.clone()),
            },
            motions: match &job.motions {
                MotionPlan::Reuse => None,
                MotionPlan::Add(groups) => Some(groups.clone()),
            },
            expressions: match &job.expressions {
                ExpressionPlan::Reuse => None,
                ExpressionPlan::Add(entries) => Some(entries.clone()),
            },
        };
        let merged = merge(&template, &inputs);

        let stage_options = StageOptions {
            copy_moc: self.options.copy_moc,
            // a generated physics file supersedes the template's copy
            copy_physics: self.options.copy_physics
                && matches!(job.physics, PhysicsPlan::Reuse),
            copy_pose: self.options.copy_pose,
        };
        let mut report = stage(&template, template_dir, &out_dir, &stage_options)?;
        report.absorb(stage_textures(
            &merged.file_references.textures,
            template_dir,
            &out_dir,
            self.synthesizer.as_ref(),
        )?);
        warnings.extend(report.warnings);

        let write_outcome = write_descriptor(&merged, &out_dir, &job.output_name)?;
        warnings.extend(write_outcome.warnings);

        let validation = if self.options.enable_validation {
            let result = validate_package(&out_dir);
            if result.is_valid {
                info!(output = %job.output_name, "package validated");
            } else {
                warn!(
                    output = %job.output_name,
                    errors = result.errors.len(),
                    "package failed validation"
                );
            }
            Some(result)
        } else {
            None
        };

        Ok(AssemblyOutcome {
            template_id: entry.model_id.clone(),
            output_dir: out_dir,
            manifest_path: write_outcome.canonical,
            warnings,
            validation,
        })
    }
}

/// Resolve a template selection against the index.
fn select_template<'a>(
    index: &'a ModelIndex,
    selection: &TemplateSelection,
) -> Result<&'a ModelEntry> {
    if index.models.is_empty() {
        return Err(Error::EmptyIndex);
    }

    match selection {
        TemplateSelection::Specified(model_id) => require_entry(index, model_id),
        TemplateSelection::Random => {
            let mut pool: Vec<&ModelEntry> =
                index.models.iter().filter(|m| m.is_complete()).collect();
            if pool.is_empty() {
                pool = index.models.iter().collect();
            }
            // non-empty by the check above
            pool.choose(&mut rand::thread_rng())
                .copied()
                .ok_or(Error::EmptyIndex)
        }
        TemplateSelection::SimilarTextureCount(target) => index
            .models
            .iter()
            .min_by_key(|m| m.texture_count.abs_diff(*target))
            .ok_or(Error::EmptyIndex),
    }
}
