//! # modelpak
//!
//! A pure-Rust library for assembling and validating Cubism model packages.
//!
//! A package is a directory holding a `*.model3.json` manifest plus the
//! binary moc data, textures, motions, expressions, physics, and pose files
//! the manifest references. This crate builds new packages from a template
//! package plus independently produced asset fragments, and checks that the
//! result is structurally and referentially sound:
//!
//! - **Descriptor model** - typed `model3.json` handling with lossless
//!   round-tripping of uninterpreted sections
//! - **Reference resolver** - existence of every declared file reference
//! - **Merge engine** - wholesale texture/physics replacement, additive
//!   dedup-by-`File` motion/expression merging
//! - **Asset copier** - atomic per-file staging of template-owned assets
//! - **Validator** - schema, existence, fragment well-formedness, and
//!   parameter consistency checks that never short-circuit
//! - **Assembly orchestrator** - single-package builds and a bounded
//!   parallel batch layer
//!
//! ## Quick Start
//!
//! ### Assembling a package
//!
//! ```no_run
//! use modelpak::assemble::{Assembler, AssemblyJob, AssemblyOptions, TemplateSelection};
//! use modelpak::index::ModelIndex;
//!
//! let index = ModelIndex::load("data/processed/index.json".as_ref())?;
//! let assembler = Assembler::new(AssemblyOptions::new("outputs"));
//! let job = AssemblyJob::clone_template(
//!     "new_model_001",
//!     TemplateSelection::Specified("100100".to_string()),
//! );
//! let outcome = assembler.assemble(&job, &index)?;
//! println!("wrote {}", outcome.manifest_path.display());
//! # Ok::<(), modelpak::Error>(())
//! ```
//!
//! ### Validating a package
//!
//! ```no_run
//! use modelpak::validate::validate_package;
//!
//! let result = validate_package("outputs/new_model_001".as_ref());
//! if !result.is_valid {
//!     for error in &result.errors {
//!         eprintln!("{error}");
//!     }
//! }
//! ```

pub mod assemble;
pub mod descriptor;
pub mod error;
pub mod index;
pub mod merge;
pub mod resolver;
pub mod stage;
pub mod texture;
pub mod validate;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    pub use crate::descriptor::{
        ExpressionDocument, ExpressionRef, FileReferences, ModelDescriptor, MotionDocument,
        MotionRef, PhysicsDocument, find_manifest,
    };

    pub use crate::index::{ModelEntry, ModelIndex};

    pub use crate::resolver::{ResolvedRefs, resolve};

    pub use crate::merge::{MergeInputs, WriteOutcome, merge, write_descriptor};

    pub use crate::stage::{StageOptions, StageReport, stage, stage_textures};

    pub use crate::texture::{PlaceholderSynthesizer, TextureInfo, TextureSynthesizer};

    pub use crate::validate::{
        ValidationReport, ValidationResult, validate_from_index, validate_package,
    };

    pub use crate::assemble::{
        Assembler, AssemblyJob, AssemblyOptions, AssemblyOutcome, ExpressionPlan, MotionPlan,
        PhysicsPlan, TemplateSelection, TexturePlan, batch_assemble,
    };
}
