//! Batch validation over a model index
//!
//! Walks the index entries in order, validates each package, and aggregates a
//! statistics block plus per-package results into a report document. A
//! package that cannot be validated (missing directory, missing manifest)
//! contributes an invalid result and never interrupts its siblings.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::index::ModelIndex;

use super::{ValidationResult, validate_package};

/// Filename of the batch report written into the output directory.
pub const REPORT_FILENAME: &str = "validation_report.json";

/// Report format version.
const VALIDATION_VERSION: &str = "1.0";

/// Progress for batch validation: packages done over total.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Packages processed so far (1-indexed).
    pub current: usize,
    /// Total packages to process.
    pub total: usize,
    /// Model ID of the package being processed.
    pub model_id: String,
}

/// Aggregated statistics over one batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationStatistics {
    pub total_validated: usize,
    pub valid_models: usize,
    pub invalid_models: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    /// Error histogram keyed on the text before the first `:`.
    pub common_errors: IndexMap<String, usize>,
    /// Warning histogram keyed on the text before the first `:`.
    pub common_warnings: IndexMap<String, usize>,
}

/// Metadata block of a batch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// RFC 3339 timestamp of the run.
    pub generated_at: String,
    /// The index document the batch was driven by.
    pub index_file: String,
    pub models_validated: usize,
    pub validation_version: String,
}

/// The batch validation report document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub metadata: ReportMetadata,
    pub statistics: ValidationStatistics,
    pub results: Vec<ValidationResult>,
}

/// Validate every package listed in an index and write the report.
///
/// Packages are processed in index order so the statistics and the results
/// list are deterministic. `max_models` caps the run for spot checks.
///
/// # Errors
/// Only report writing can fail; per-package problems land in the results.
pub fn validate_from_index<F>(
    index: &ModelIndex,
    index_path: &Path,
    out_dir: &Path,
    max_models: Option<usize>,
    progress: F,
) -> Result<ValidationReport>
where
    F: Fn(&BatchProgress),
{
    let limit = max_models.unwrap_or(index.models.len());
    let entries = &index.models[..limit.min(index.models.len())];
    let total = entries.len();
    info!(total, "validating packages from index");

    let mut statistics = ValidationStatistics::default();
    let mut results = Vec::with_capacity(total);

    for (i, entry) in entries.iter().enumerate() {
        progress(&BatchProgress {
            current: i + 1,
            total,
            model_id: entry.model_id.clone(),
        });

        let result = validate_package(&entry.model_path);
        statistics.absorb(&result);
        results.push(result);
    }

    let report = ValidationReport {
        metadata: ReportMetadata {
            generated_at: chrono::Utc::now().to_rfc3339(),
            index_file: index_path.display().to_string(),
            models_validated: results.len(),
            validation_version: VALIDATION_VERSION.to_string(),
        },
        statistics,
        results,
    };

    fs::create_dir_all(out_dir)?;
    let report_path = out_dir.join(REPORT_FILENAME);
    fs::write(&report_path, serde_json::to_vec_pretty(&report)?)?;
    info!(
        valid = report.statistics.valid_models,
        invalid = report.statistics.invalid_models,
        path = %report_path.display(),
        "validation report written"
    );

    Ok(report)
}

impl ValidationStatistics {
    /// Fold one package result into the running statistics.
    fn absorb(&mut self, result: &ValidationResult) {
        self.total_validated += 1;
        if result.is_valid {
            self.valid_models += 1;
        } else {
            self.invalid_models += 1;
        }
        self.total_errors += result.errors.len();
        self.total_warnings += result.warnings.len();

        for error in &result.errors {
            *self.common_errors.entry(prefix_key(error)).or_default() += 1;
        }
        for warning in &result.warnings {
            *self.common_warnings.entry(prefix_key(warning)).or_default() += 1;
        }
    }
}

/// Histogram key: the message text before the first `:`.
fn prefix_key(message: &str) -> String {
    message.split(':').next().unwrap_or(message).to_string()
}
