use crate::error::{Result, WeldError};
use crate::models::{PeakMode, PeakPair, WeldRecord, WeldSegment};

// ── PeakExtractor ─────────────────────────────────────────────────────────────

/// Stateless extraction of per-channel peaks over a weld segment.
pub struct PeakExtractor;

impl PeakExtractor {
    /// Compute the peak of both force channels over `segment`.
    ///
    /// Raw samples only: no smoothing or outlier rejection. NaN samples never
    /// win the comparison.
    ///
    /// Returns [`WeldError::EmptySegment`] when the segment does not fit the
    /// record or the selected samples are all NaN.
    pub fn extract(record: &WeldRecord, segment: &WeldSegment, mode: PeakMode) -> Result<PeakPair> {
        let empty = || WeldError::EmptySegment {
            start: segment.start(),
            end: segment.end(),
            len: record.len(),
        };

        let shoulder = record
            .shoulder_force()
            .get(segment.range())
            .and_then(|s| Self::peak(s, mode))
            .ok_or_else(empty)?;
        let probe = record
            .probe_force()
            .get(segment.range())
            .and_then(|s| Self::peak(s, mode))
            .ok_or_else(empty)?;

        Ok(PeakPair { shoulder, probe })
    }

    /// Extremum of `values`, or `None` for an empty or all-NaN slice.
    pub fn peak(values: &[f64], mode: PeakMode) -> Option<f64> {
        let mut finite = values.iter().copied().filter(|v| !v.is_nan());
        let first = finite.next()?;
        Some(finite.fold(first, |acc, v| match mode {
            PeakMode::Max => acc.max(v),
            PeakMode::Min => acc.min(v),
        }))
    }
}
