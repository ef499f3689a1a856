//! JSON export of a finished batch.

use std::path::{Path, PathBuf};

use serde::Serialize;
use weld_core::error::Result;
use weld_core::models::BatchResult;

use crate::analysis::{AnalysisMetadata, BatchAnalysis};
use crate::analyzer::WeldOutcome;

/// One excluded file as it appears in the report.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub path: PathBuf,
    /// Stable error identifier, e.g. `"missing_column"`.
    pub kind: &'static str,
    /// Human-readable reason.
    pub reason: String,
}

/// Serializable view of a [`BatchAnalysis`].
#[derive(Debug, Serialize)]
pub struct BatchReport<'a> {
    pub metadata: &'a AnalysisMetadata,
    pub peaks: &'a BatchResult,
    pub welds: &'a [WeldOutcome],
    pub skipped: Vec<SkippedEntry>,
}

impl<'a> BatchReport<'a> {
    pub fn new(analysis: &'a BatchAnalysis) -> Self {
        let skipped = analysis
            .summary
            .skipped()
            .iter()
            .map(|s| SkippedEntry {
                path: s.path.clone(),
                kind: s.error.kind(),
                reason: s.error.to_string(),
            })
            .collect();

        Self {
            metadata: &analysis.metadata,
            peaks: analysis.summary.result(),
            welds: analysis.summary.outcomes(),
            skipped,
        }
    }

    /// Write the report as pretty JSON, creating parent directories if needed.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
