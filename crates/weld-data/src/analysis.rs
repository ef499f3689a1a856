//! Main batch pipeline.
//!
//! Discovers and orders the weld logs under a root folder, runs each through
//! the [`WeldAnalyzer`] and returns a [`BatchAnalysis`] ready for rendering.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use weld_core::error::Result;
use weld_core::models::PeakMode;
use weld_core::settings::BatchOptions;

use crate::aggregator::{BatchAggregator, BatchSummary, ProgressEvent, SkippedFile};
use crate::analyzer::WeldAnalyzer;
use crate::reader::{find_weld_files, order_by_chronology, WeldFile};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the batch summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Root folder that was scanned.
    pub root: PathBuf,
    /// Extremum reported per channel.
    pub mode: PeakMode,
    /// Files with the weld-log extension found under the root.
    pub files_discovered: usize,
    /// Files that contributed peaks.
    pub files_processed: usize,
    /// Files excluded for any reason.
    pub files_skipped: usize,
    /// Wall-clock seconds spent walking and ordering the folder.
    pub discovery_time_seconds: f64,
    /// Wall-clock seconds spent processing files.
    pub processing_time_seconds: f64,
}

/// The complete output of [`analyze_batch`].
#[derive(Debug)]
pub struct BatchAnalysis {
    pub summary: BatchSummary,
    pub metadata: AnalysisMetadata,
}

/// Files ready for processing, in chronological order.
#[derive(Debug)]
pub struct PreparedBatch {
    pub root: PathBuf,
    pub files: Vec<WeldFile>,
    /// Files rejected before processing: unreadable entries first, then
    /// malformed names.
    pub rejected: Vec<SkippedFile>,
    pub discovered: usize,
    pub discovery_time_seconds: f64,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Discover the weld logs under `root` and put them in chronological order.
///
/// Fails only with [`weld_core::WeldError::RootNotFound`]; per-file problems
/// end up in [`PreparedBatch::rejected`].
pub fn prepare_batch(root: &Path, options: &BatchOptions) -> Result<PreparedBatch> {
    let start = Instant::now();
    let found = find_weld_files(root, &options.extension)?;
    let discovered = found.len();
    let mut rejected = found.unreadable;
    let (files, malformed) = order_by_chronology(found.files, options.delimiter);
    rejected.extend(malformed);

    Ok(PreparedBatch {
        root: root.to_path_buf(),
        files,
        rejected,
        discovered,
        discovery_time_seconds: start.elapsed().as_secs_f64(),
    })
}

/// Run the full pipeline sequentially.
///
/// 1. Discover and order the weld logs.
/// 2. Ingest, segment and extract each file in order.
/// 3. Fold the outcomes into a [`BatchSummary`] with metadata.
///
/// `progress` receives one [`ProgressEvent`] per processed file.
pub fn analyze_batch<F>(root: &Path, options: &BatchOptions, progress: F) -> Result<BatchAnalysis>
where
    F: FnMut(&ProgressEvent),
{
    let prepared = prepare_batch(root, options)?;
    info!(
        "Processing {} weld logs from {}",
        prepared.files.len(),
        root.display()
    );

    let start = Instant::now();
    let analyzer = WeldAnalyzer::new(options.clone());
    let PreparedBatch {
        root,
        files,
        rejected,
        discovered,
        discovery_time_seconds,
    } = prepared;
    let summary = BatchAggregator::aggregate(&analyzer, &files, rejected, progress);

    Ok(finish_batch(
        root,
        options.mode,
        summary,
        discovered,
        discovery_time_seconds,
        start.elapsed().as_secs_f64(),
    ))
}

/// Attach run metadata to a finished summary.
pub fn finish_batch(
    root: PathBuf,
    mode: PeakMode,
    summary: BatchSummary,
    discovered: usize,
    discovery_time_seconds: f64,
    processing_time_seconds: f64,
) -> BatchAnalysis {
    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        root,
        mode,
        files_discovered: discovered,
        files_processed: summary.processed_count(),
        files_skipped: summary.skipped_count(),
        discovery_time_seconds,
        processing_time_seconds,
    };

    info!(
        processed = metadata.files_processed,
        skipped = metadata.files_skipped,
        "batch complete"
    );

    BatchAnalysis { summary, metadata }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
