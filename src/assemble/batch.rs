//! Batch assembly over a bounded worker pool
//!
//! Runs many package builds in parallel. Units share no mutable state and
//! write only under their own output directories, so there is no cross-unit
//! ordering guarantee; per-unit messages are collected and tallied once all
//! units finish. There is no mid-unit cancellation - an interrupted unit
//! leaves a partially staged directory and an idempotent re-run is the
//! recovery path.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::index::ModelIndex;

use super::{Assembler, AssemblyJob};

/// Progress information during batch assembly.
#[derive(Debug, Clone)]
pub struct AssemblyProgress {
    /// Units started so far (1-indexed).
    pub current: usize,
    /// Total units in the batch.
    pub total: usize,
    /// Output name of the unit being built.
    pub output_name: String,
}

/// Result of a batch assembly run.
#[derive(Debug, Clone)]
pub struct BatchAssembleResult {
    /// Number of units that built successfully.
    pub success_count: usize,
    /// Number of units that failed.
    pub fail_count: usize,
    /// One message per unit, in completion order.
    pub results: Vec<String>,
}

/// Assemble packages in parallel on a dedicated pool of `workers` threads.
///
/// The concurrency bound is the explicit `workers` value, never auto-scaled.
/// A unit's failure is reported with its output name and does not abort the
/// batch.
pub fn batch_assemble<F>(
    assembler: &Assembler,
    jobs: &[AssemblyJob],
    index: &ModelIndex,
    workers: usize,
    progress: F,
) -> Result<BatchAssembleResult>
where
    F: Fn(&AssemblyProgress) + Send + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .map_err(|e| Error::WorkerPool(e.to_string()))?;

    let success_counter = AtomicUsize::new(0);
    let fail_counter = AtomicUsize::new(0);
    let started = AtomicUsize::new(0);
    let total = jobs.len();

    let results: Vec<String> = pool.install(|| {
        jobs.par_iter()
            .map(|job| {
                let current = started.fetch_add(1, Ordering::SeqCst) + 1;
                progress(&AssemblyProgress {
                    current,
                    total,
                    output_name: job.output_name.clone(),
                });

                match assembler.assemble(job, index) {
                    Ok(outcome) => {
                        success_counter.fetch_add(1, Ordering::SeqCst);
                        match &outcome.validation {
                            Some(v) if !v.is_valid => format!(
                                "Assembled {} from {} with {} validation errors",
                                job.output_name,
                                outcome.template_id,
                                v.errors.len()
                            ),
                            _ => format!(
                                "Assembled {} from {}",
                                job.output_name, outcome.template_id
                            ),
                        }
                    }
                    Err(e) => {
                        fail_counter.fetch_add(1, Ordering::SeqCst);
                        format!("Failed {}: {e}", job.output_name)
                    }
                }
            })
            .collect()
    });

    Ok(BatchAssembleResult {
        success_count: success_counter.load(Ordering::SeqCst),
        fail_count: fail_counter.load(Ordering::SeqCst),
        results,
    })
}
