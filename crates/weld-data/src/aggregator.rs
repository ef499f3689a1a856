//! Folding per-file outcomes into an ordered batch result.
//!
//! Files are fed to a [`BatchAccumulator`] in chronological order. Failures
//! are kept as [`SkippedFile`]s and leave no gap in the peak sequences, so the
//! finished [`BatchSummary`] always holds two index-aligned sequences over the
//! successfully processed files.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};
use weld_core::error::{Result, WeldError};
use weld_core::formatting::percentage;
use weld_core::models::{BatchResult, PeakPair};

use crate::analyzer::{WeldAnalyzer, WeldOutcome};
use crate::reader::WeldFile;

// ── SkippedFile ───────────────────────────────────────────────────────────────

/// A file excluded from the batch and the reason why.
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: WeldError,
}

// ── ProgressEvent ─────────────────────────────────────────────────────────────

/// Emitted once per processed file, whatever the outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Files finished so far, including this one.
    pub processed: usize,
    /// Files in the batch.
    pub total: usize,
    /// The file that just finished.
    pub path: PathBuf,
    /// Whether the file contributed peaks.
    pub succeeded: bool,
}

impl ProgressEvent {
    /// Completion in percent, `0.0..=100.0`, one decimal place.
    pub fn percent(&self) -> f64 {
        percentage(self.processed as f64, self.total as f64, 1).min(100.0)
    }
}

// ── BatchAccumulator ──────────────────────────────────────────────────────────

/// Running state of a batch. Consumed by value at every step.
#[derive(Debug, Default)]
pub struct BatchAccumulator {
    outcomes: Vec<WeldOutcome>,
    skipped: Vec<SkippedFile>,
}

impl BatchAccumulator {
    /// Start from files already rejected before processing (bad file names).
    pub fn with_skipped(skipped: Vec<SkippedFile>) -> Self {
        Self {
            outcomes: Vec::new(),
            skipped,
        }
    }

    /// Add the outcome of one file. Calls must follow chronological order.
    pub fn push(mut self, path: &Path, result: Result<WeldOutcome>) -> Self {
        match result {
            Ok(outcome) => self.outcomes.push(outcome),
            Err(error) => {
                warn!("Skipping {}: {}", path.display(), error);
                self.skipped.push(SkippedFile {
                    path: path.to_path_buf(),
                    error,
                });
            }
        }
        self
    }

    /// Freeze the accumulated state into a [`BatchSummary`].
    pub fn finish(self) -> BatchSummary {
        let pairs: Vec<PeakPair> = self.outcomes.iter().map(|o| o.peaks).collect();
        BatchSummary {
            result: BatchResult::from_pairs(&pairs),
            outcomes: self.outcomes,
            skipped: self.skipped,
        }
    }
}

// ── BatchSummary ──────────────────────────────────────────────────────────────

/// Final artifact of a batch: aligned peaks plus the per-file bookkeeping.
#[derive(Debug)]
pub struct BatchSummary {
    result: BatchResult,
    outcomes: Vec<WeldOutcome>,
    skipped: Vec<SkippedFile>,
}

impl BatchSummary {
    /// The two peak sequences for the renderer.
    pub fn result(&self) -> &BatchResult {
        &self.result
    }

    /// Processed files, in the same order as [`BatchSummary::result`].
    pub fn outcomes(&self) -> &[WeldOutcome] {
        &self.outcomes
    }

    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    pub fn processed_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

// ── BatchAggregator ───────────────────────────────────────────────────────────

/// Stateless driver for the sequential batch fold.
pub struct BatchAggregator;

impl BatchAggregator {
    /// Run every file through `analyzer` in order and fold the results.
    ///
    /// `progress` is called after each file with the running completion.
    pub fn aggregate<F>(
        analyzer: &WeldAnalyzer,
        files: &[WeldFile],
        rejected: Vec<SkippedFile>,
        progress: F,
    ) -> BatchSummary
    where
        F: FnMut(&ProgressEvent),
    {
        Self::aggregate_until(analyzer, files, rejected, &AtomicBool::new(false), progress)
    }

    /// Same as [`BatchAggregator::aggregate`], but stops before the next file
    /// once `cancelled` is set. Files not reached appear in neither the
    /// outcomes nor the skipped list.
    pub fn aggregate_until<F>(
        analyzer: &WeldAnalyzer,
        files: &[WeldFile],
        rejected: Vec<SkippedFile>,
        cancelled: &AtomicBool,
        mut progress: F,
    ) -> BatchSummary
    where
        F: FnMut(&ProgressEvent),
    {
        let total = files.len();
        let mut acc = BatchAccumulator::with_skipped(rejected);
        for (i, file) in files.iter().enumerate() {
            if cancelled.load(Ordering::Acquire) {
                debug!("Batch cancelled after {} of {} files", i, total);
                break;
            }
            let result = analyzer.analyze_file(file);
            progress(&ProgressEvent {
                processed: i + 1,
                total,
                path: file.path.clone(),
                succeeded: result.is_ok(),
            });
            acc = acc.push(&file.path, result);
        }
        acc.finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
