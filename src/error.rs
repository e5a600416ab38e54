//! Error types for `modelpak`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `modelpak` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A staged copy could not be completed atomically.
    #[error("failed to stage {src} -> {dest}: {reason}")]
    CopyFailed {
        /// Source path of the copy.
        src: PathBuf,
        /// Destination path of the copy.
        dest: PathBuf,
        /// Underlying failure message.
        reason: String,
    },

    // ==================== Manifest Errors ====================
    /// No `*.model3.json` manifest was found in a package directory.
    #[error("no .model3.json manifest found in {dir}")]
    ManifestNotFound {
        /// The package directory that was searched.
        dir: PathBuf,
    },

    /// A manifest file exists but could not be parsed.
    #[error("malformed manifest {path}: {source}")]
    ManifestParse {
        /// Path to the offending manifest.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A motion/expression/physics fragment file could not be parsed.
    #[error("malformed {kind} fragment {path}: {source}")]
    FragmentParse {
        /// Fragment kind ("motion", "expression", "physics").
        kind: &'static str,
        /// Path to the offending fragment.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ==================== Template / Index Errors ====================
    /// The template package directory does not exist.
    #[error("template directory not found: {0}")]
    TemplateDirMissing(PathBuf),

    /// The requested model ID is not present in the index.
    #[error("model not found in index: {0}")]
    ModelNotInIndex(String),

    /// The index contains no models to select from.
    #[error("index contains no models")]
    EmptyIndex,

    // ==================== Texture Errors ====================
    /// A texture file could not be decoded.
    #[error("failed to decode texture {path}: {reason}")]
    TextureDecode {
        /// Path to the texture file.
        path: PathBuf,
        /// Decoder failure message.
        reason: String,
    },

    /// A placeholder texture could not be synthesized.
    #[error("failed to synthesize placeholder {path}: {reason}")]
    PlaceholderSynthesis {
        /// Destination path of the placeholder.
        path: PathBuf,
        /// Encoder failure message.
        reason: String,
    },

    // ==================== Batch Errors ====================
    /// The worker pool for a batch operation could not be built.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),
}

/// Convenience result type for `modelpak` operations.
pub type Result<T> = std::result::Result<T, Error>;
