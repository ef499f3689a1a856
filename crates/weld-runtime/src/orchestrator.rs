//! Async batch orchestrator.
//!
//! Runs the weld pipeline on the tokio blocking pool, either one file at a
//! time or with several files in flight. Progress is forwarded through an
//! `mpsc` channel so the caller can display it while the batch runs. Parallel
//! results are tagged with their chronological rank and merged in rank order,
//! so both modes produce the same [`BatchAnalysis`]. Aborting through
//! [`BatchHandle::abort`] stops work between files in either mode.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use weld_core::error::{Result, WeldError};
use weld_core::settings::BatchOptions;
use weld_data::aggregator::{
    BatchAccumulator, BatchAggregator, BatchSummary, ProgressEvent, SkippedFile,
};
use weld_data::analysis::{finish_batch, prepare_batch, BatchAnalysis, PreparedBatch};
use weld_data::analyzer::{WeldAnalyzer, WeldOutcome};
use weld_data::reader::WeldFile;

// ── BatchOrchestrator ─────────────────────────────────────────────────────────

/// Background batch coordinator.
///
/// Call [`BatchOrchestrator::start`] to run the batch in a tokio task and
/// receive a channel of [`ProgressEvent`]s plus a handle for the result.
#[derive(Debug, Clone)]
pub struct BatchOrchestrator {
    /// Root folder to scan.
    root: PathBuf,
    /// Discovery and per-file options.
    options: BatchOptions,
    /// Maximum number of files processed at once.
    jobs: usize,
    /// Set once the batch is aborted; checked before each file.
    cancelled: Arc<AtomicBool>,
}

impl BatchOrchestrator {
    /// Create a new orchestrator. `jobs` below 1 is treated as 1.
    pub fn new(root: PathBuf, options: BatchOptions, jobs: usize) -> Self {
        Self {
            root,
            options,
            jobs: jobs.max(1),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the batch.
    ///
    /// Spawns a tokio task that runs the whole batch. Returns:
    /// - An `mpsc::UnboundedReceiver<ProgressEvent>` that closes when the batch ends.
    /// - A [`BatchHandle`] resolving to the finished analysis.
    pub fn start(self) -> (mpsc::UnboundedReceiver<ProgressEvent>, BatchHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancelled = Arc::clone(&self.cancelled);
        let handle = tokio::spawn(async move { self.run(tx).await });
        (rx, BatchHandle { handle, cancelled })
    }

    /// Run the batch to completion on the current runtime.
    pub async fn run(self, tx: mpsc::UnboundedSender<ProgressEvent>) -> Result<BatchAnalysis> {
        let root = self.root.clone();
        let options = self.options.clone();
        let prepared = tokio::task::spawn_blocking(move || prepare_batch(&root, &options))
            .await
            .map_err(join_error)??;

        tracing::info!(
            files = prepared.files.len(),
            rejected = prepared.rejected.len(),
            jobs = self.jobs,
            "starting weld batch"
        );

        let PreparedBatch {
            root,
            files,
            rejected,
            discovered,
            discovery_time_seconds,
        } = prepared;

        let start = Instant::now();
        let analyzer = Arc::new(WeldAnalyzer::new(self.options.clone()));

        let summary = if self.jobs == 1 || files.len() <= 1 {
            Self::run_sequential(analyzer, files, rejected, Arc::clone(&self.cancelled), tx).await?
        } else {
            Self::run_parallel(
                analyzer,
                files,
                rejected,
                self.jobs,
                Arc::clone(&self.cancelled),
                tx,
            )
            .await?
        };

        Ok(finish_batch(
            root,
            self.options.mode,
            summary,
            discovered,
            discovery_time_seconds,
            start.elapsed().as_secs_f64(),
        ))
    }

    // ── Private implementation ────────────────────────────────────────────

    /// Process files one by one on a single blocking thread.
    async fn run_sequential(
        analyzer: Arc<WeldAnalyzer>,
        files: Vec<WeldFile>,
        rejected: Vec<SkippedFile>,
        cancelled: Arc<AtomicBool>,
        tx: mpsc::UnboundedSender<ProgressEvent>,
    ) -> Result<BatchSummary> {
        tokio::task::spawn_blocking(move || {
            BatchAggregator::aggregate_until(&analyzer, &files, rejected, &cancelled, |event| {
                // A dropped receiver only means nobody is watching.
                let _ = tx.send(event.clone());
            })
        })
        .await
        .map_err(join_error)
    }

    /// Process up to `jobs` files at once, then merge outcomes by rank.
    async fn run_parallel(
        analyzer: Arc<WeldAnalyzer>,
        files: Vec<WeldFile>,
        rejected: Vec<SkippedFile>,
        jobs: usize,
        cancelled: Arc<AtomicBool>,
        tx: mpsc::UnboundedSender<ProgressEvent>,
    ) -> Result<BatchSummary> {
        let total = files.len();
        let semaphore = Arc::new(Semaphore::new(jobs));
        let mut set: JoinSet<Result<Option<(WeldFile, Result<WeldOutcome>)>>> = JoinSet::new();

        for file in files {
            let analyzer = Arc::clone(&analyzer);
            let semaphore = Arc::clone(&semaphore);
            let cancelled = Arc::clone(&cancelled);
            set.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| WeldError::Io(std::io::Error::other(e)))?;
                if cancelled.load(Ordering::Acquire) {
                    return Ok(None);
                }
                tokio::task::spawn_blocking(move || {
                    let result = analyzer.analyze_file(&file);
                    Some((file, result))
                })
                .await
                .map_err(join_error)
            });
        }

        // Slots indexed by rank; completion order is arbitrary.
        let mut slots: Vec<Option<(WeldFile, Result<WeldOutcome>)>> =
            std::iter::repeat_with(|| None).take(total).collect();
        let mut processed = 0usize;

        while let Some(joined) = set.join_next().await {
            let Some((file, result)) = joined.map_err(join_error)?? else {
                continue;
            };
            processed += 1;
            let _ = tx.send(ProgressEvent {
                processed,
                total,
                path: file.path.clone(),
                succeeded: result.is_ok(),
            });
            let rank = file.rank;
            match slots.get_mut(rank) {
                Some(slot) => *slot = Some((file, result)),
                None => {
                    return Err(WeldError::MalformedData(format!(
                        "rank {rank} out of range for batch of {total}"
                    )))
                }
            }
        }

        let summary = slots
            .into_iter()
            .flatten()
            .fold(BatchAccumulator::with_skipped(rejected), |acc, (file, result)| {
                acc.push(&file.path, result)
            })
            .finish();
        Ok(summary)
    }
}

// ── BatchHandle ───────────────────────────────────────────────────────────────

/// A handle to the background batch task.
pub struct BatchHandle {
    handle: tokio::task::JoinHandle<Result<BatchAnalysis>>,
    cancelled: Arc<AtomicBool>,
}

impl BatchHandle {
    /// Wait for the batch to finish.
    pub async fn wait(self) -> Result<BatchAnalysis> {
        self.handle.await.map_err(join_error)?
    }

    /// Abort the batch. Files already being analysed run to completion;
    /// no further file is started.
    pub fn abort(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.handle.abort();
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn join_error(e: tokio::task::JoinError) -> WeldError {
    WeldError::Io(std::io::Error::other(e))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
