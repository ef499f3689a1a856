//! Per-file weld analysis: ingest → segment → extract.

use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;
use weld_core::chrono_key::ChronoKey;
use weld_core::error::Result;
use weld_core::models::{PeakPair, WeldSegment};
use weld_core::peaks::PeakExtractor;
use weld_core::segmentation::WeldSegmenter;
use weld_core::settings::BatchOptions;

use crate::reader::{load_weld_record, WeldFile};

/// Everything learned from one successfully processed weld log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeldOutcome {
    pub path: PathBuf,
    pub key: ChronoKey,
    /// Zero-based chronological position among all ordered files.
    pub rank: usize,
    /// Number of samples in the log.
    pub samples: usize,
    pub segment: WeldSegment,
    pub peaks: PeakPair,
}

/// Runs the per-file pipeline with a fixed set of options.
#[derive(Debug, Clone)]
pub struct WeldAnalyzer {
    options: BatchOptions,
}

impl WeldAnalyzer {
    pub fn new(options: BatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Load `file`, locate its weld phase and extract both channel peaks.
    ///
    /// The record and segment are dropped once the peaks are known.
    pub fn analyze_file(&self, file: &WeldFile) -> Result<WeldOutcome> {
        let record = load_weld_record(&file.path, &self.options.columns)?;
        let segment = WeldSegmenter::segment(&record)?;
        let peaks = PeakExtractor::extract(&record, &segment, self.options.mode)?;

        debug!(
            path = %file.path.display(),
            samples = record.len(),
            start = segment.start(),
            end = segment.end(),
            shoulder = peaks.shoulder,
            probe = peaks.probe,
            "weld analysed"
        );

        Ok(WeldOutcome {
            path: file.path.clone(),
            key: file.key.clone(),
            rank: file.rank,
            samples: record.len(),
            segment,
            peaks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;
    use weld_core::error::WeldError;
    use weld_core::models::PeakMode;

    fn weld_file(dir: &Path, name: &str, lines: &[&str]) -> WeldFile {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        WeldFile {
            key: ChronoKey::from_file_name(name, '_').unwrap(),
            path,
            rank: 0,
        }
    }

    fn scenario_a(dir: &Path) -> WeldFile {
        weld_file(
            dir,
            "W_2024_01_05_10_30_00_A.csv",
            &[
                "Shoulder Force (N) (),Probe Force (N) (),Shoulder (Y) Pos (mm) ()",
                "10,1,1",
                "10,1,1",
                "50,7,-1",
                "80,9,-2",
                "60,30,-1",
                "10,1,1",
                "10,1,1",
            ],
        )
    }

    #[test]
    fn test_analyze_file_scenario_a() {
        let dir = TempDir::new().unwrap();
        let file = scenario_a(dir.path());
        let analyzer = WeldAnalyzer::new(BatchOptions::default());

        let outcome = analyzer.analyze_file(&file).unwrap();
        assert_eq!(outcome.segment.range(), 2..4);
        assert_eq!(outcome.peaks.shoulder, 80.0);
        assert_eq!(outcome.peaks.probe, 9.0);
        assert_eq!(outcome.samples, 7);
    }

    #[test]
    fn test_analyze_file_min_mode() {
        let dir = TempDir::new().unwrap();
        let file = scenario_a(dir.path());
        let analyzer = WeldAnalyzer::new(BatchOptions {
            mode: PeakMode::Min,
            ..BatchOptions::default()
        });

        let outcome = analyzer.analyze_file(&file).unwrap();
        assert_eq!(outcome.peaks.shoulder, 50.0);
        assert_eq!(outcome.peaks.probe, 7.0);
    }

    #[test]
    fn test_analyze_file_no_weld_phase() {
        let dir = TempDir::new().unwrap();
        let file = weld_file(
            dir.path(),
            "W_2024_01_05_10_30_00_B.csv",
            &[
                "Shoulder Force (N) (),Probe Force (N) (),Shoulder (Y) Pos (mm) ()",
                "10,1,1",
                "10,1,1",
                "10,1,1",
            ],
        );
        let analyzer = WeldAnalyzer::new(BatchOptions::default());
        assert!(matches!(
            analyzer.analyze_file(&file),
            Err(WeldError::NoWeldPhaseDetected)
        ));
    }

    #[test]
    fn test_analyze_file_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let file = scenario_a(dir.path());
        let analyzer = WeldAnalyzer::new(BatchOptions::default());
        assert_eq!(
            analyzer.analyze_file(&file).unwrap(),
            analyzer.analyze_file(&file).unwrap()
        );
    }
}
