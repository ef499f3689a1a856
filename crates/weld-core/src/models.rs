use serde::{Deserialize, Serialize};

use crate::error::{Result, WeldError};

/// Which extremum of a force channel is reported as its peak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PeakMode {
    /// Highest value in the weld phase.
    #[default]
    Max,
    /// Lowest value in the weld phase.
    Min,
}

impl PeakMode {
    /// Label prefix used in chart legends and axis titles.
    pub fn label(self) -> &'static str {
        match self {
            PeakMode::Max => "Max",
            PeakMode::Min => "Min",
        }
    }
}

impl std::fmt::Display for PeakMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeakMode::Max => write!(f, "max"),
            PeakMode::Min => write!(f, "min"),
        }
    }
}

/// One weld log's channels, index-aligned sample by sample.
#[derive(Debug, Clone, PartialEq)]
pub struct WeldRecord {
    shoulder_force: Vec<f64>,
    probe_force: Vec<f64>,
    shoulder_position: Vec<f64>,
}

impl WeldRecord {
    /// Build a record, rejecting empty or unequal-length channels.
    pub fn new(
        shoulder_force: Vec<f64>,
        probe_force: Vec<f64>,
        shoulder_position: Vec<f64>,
    ) -> Result<Self> {
        let n = shoulder_force.len();
        if n == 0 {
            return Err(WeldError::MalformedData(
                "weld record contains no samples".to_string(),
            ));
        }
        if probe_force.len() != n || shoulder_position.len() != n {
            return Err(WeldError::MalformedData(format!(
                "channel lengths differ: shoulder force {}, probe force {}, shoulder position {}",
                n,
                probe_force.len(),
                shoulder_position.len()
            )));
        }
        Ok(Self {
            shoulder_force,
            probe_force,
            shoulder_position,
        })
    }

    /// Number of samples `n` (always at least 1).
    pub fn len(&self) -> usize {
        self.shoulder_force.len()
    }

    /// Always `false`; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.shoulder_force.is_empty()
    }

    pub fn shoulder_force(&self) -> &[f64] {
        &self.shoulder_force
    }

    pub fn probe_force(&self) -> &[f64] {
        &self.probe_force
    }

    pub fn shoulder_position(&self) -> &[f64] {
        &self.shoulder_position
    }
}

/// Half-open index range `[start, end)` covering the weld phase of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeldSegment {
    start: usize,
    end: usize,
}

impl WeldSegment {
    /// Build a segment for a record of length `len`.
    ///
    /// Fails with [`WeldError::EmptySegment`] unless `start < end <= len`.
    pub fn new(start: usize, end: usize, len: usize) -> Result<Self> {
        if start >= end || end > len {
            return Err(WeldError::EmptySegment { start, end, len });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of samples covered (always at least 1).
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always `false`: construction rejects empty ranges.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Peak force on each channel for one weld.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakPair {
    /// Shoulder-force peak in newtons.
    pub shoulder: f64,
    /// Probe-force peak in newtons.
    pub probe: f64,
}

/// Peak sequences for every successfully processed weld, in chronological order.
///
/// Both sequences always have the same length; index `i` refers to the `i`-th
/// processed file. Only [`BatchResult::from_pairs`] builds one, so the
/// alignment cannot be broken after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchResult {
    shoulder_peaks: Vec<f64>,
    probe_peaks: Vec<f64>,
}

impl BatchResult {
    /// Split an ordered list of peak pairs into the two aligned sequences.
    pub fn from_pairs(pairs: &[PeakPair]) -> Self {
        let (shoulder_peaks, probe_peaks) = pairs.iter().map(|p| (p.shoulder, p.probe)).unzip();
        Self {
            shoulder_peaks,
            probe_peaks,
        }
    }

    pub fn shoulder_peaks(&self) -> &[f64] {
        &self.shoulder_peaks
    }

    pub fn probe_peaks(&self) -> &[f64] {
        &self.probe_peaks
    }

    /// Number of welds in the result.
    pub fn len(&self) -> usize {
        self.shoulder_peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shoulder_peaks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weld_record_rejects_empty() {
        let err = WeldRecord::new(vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, WeldError::MalformedData(_)));
    }

    #[test]
    fn test_weld_record_rejects_unequal_lengths() {
        let err = WeldRecord::new(vec![1.0, 2.0], vec![1.0], vec![0.0, -1.0]).unwrap_err();
        assert!(matches!(err, WeldError::MalformedData(_)));
        assert!(err.to_string().contains("probe force 1"));
    }

    #[test]
    fn test_weld_record_accessors() {
        let record = WeldRecord::new(vec![1.0, 2.0], vec![3.0, 4.0], vec![0.5, -0.5]).unwrap();
        assert_eq!(record.len(), 2);
        assert!(!record.is_empty());
        assert_eq!(record.shoulder_force(), &[1.0, 2.0]);
        assert_eq!(record.probe_force(), &[3.0, 4.0]);
        assert_eq!(record.shoulder_position(), &[0.5, -0.5]);
    }

    #[test]
    fn test_weld_segment_bounds() {
        let seg = WeldSegment::new(2, 4, 7).unwrap();
        assert_eq!(seg.start(), 2);
        assert_eq!(seg.end(), 4);
        assert_eq!(seg.len(), 2);
        assert_eq!(seg.range(), 2..4);
        assert!(!seg.is_empty());
    }

    #[test]
    fn test_weld_segment_rejects_empty_and_out_of_range() {
        assert!(matches!(
            WeldSegment::new(3, 3, 7),
            Err(WeldError::EmptySegment { start: 3, end: 3, len: 7 })
        ));
        assert!(matches!(
            WeldSegment::new(4, 2, 7),
            Err(WeldError::EmptySegment { .. })
        ));
        assert!(matches!(
            WeldSegment::new(5, 8, 7),
            Err(WeldError::EmptySegment { .. })
        ));
    }

    #[test]
    fn test_weld_segment_single_sample() {
        let seg = WeldSegment::new(6, 7, 7).unwrap();
        assert_eq!(seg.len(), 1);
    }

    #[test]
    fn test_batch_result_from_pairs_is_aligned() {
        let pairs = [
            PeakPair {
                shoulder: 80.0,
                probe: 40.0,
            },
            PeakPair {
                shoulder: 90.0,
                probe: 45.0,
            },
        ];
        let result = BatchResult::from_pairs(&pairs);
        assert_eq!(result.len(), 2);
        assert_eq!(result.shoulder_peaks(), &[80.0, 90.0]);
        assert_eq!(result.probe_peaks(), &[40.0, 45.0]);
        assert_eq!(result.shoulder_peaks().len(), result.probe_peaks().len());
    }

    #[test]
    fn test_batch_result_default_is_empty() {
        let result = BatchResult::default();
        assert!(result.is_empty());
        assert!(result.probe_peaks().is_empty());
    }

    #[test]
    fn test_peak_mode_serde_and_label() {
        assert_eq!(serde_json::to_string(&PeakMode::Min).unwrap(), "\"min\"");
        let mode: PeakMode = serde_json::from_str("\"max\"").unwrap();
        assert_eq!(mode, PeakMode::Max);
        assert_eq!(PeakMode::Min.label(), "Min");
        assert_eq!(PeakMode::default().to_string(), "max");
    }
}
