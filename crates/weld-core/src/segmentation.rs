use crate::error::{Result, WeldError};
use crate::models::{WeldRecord, WeldSegment};

// ── WeldSegmenter ─────────────────────────────────────────────────────────────

/// Locates the weld phase inside a record using the shoulder position channel.
///
/// The shoulder only reads a negative position while it is plunged into the
/// workpiece. The first and last negative samples bound the weld phase; the
/// approach before it and the cleaning cycle after it both sit at or above zero.
pub struct WeldSegmenter;

impl WeldSegmenter {
    /// Compute the weld segment `[first_negative, last_negative)`.
    ///
    /// Several separate negative excursions collapse to the outermost bound.
    ///
    /// # Errors
    /// * [`WeldError::NoWeldPhaseDetected`] when no position is negative.
    /// * [`WeldError::EmptySegment`] when the bounds coincide (a single
    ///   negative sample), since the range would cover nothing.
    pub fn segment(record: &WeldRecord) -> Result<WeldSegment> {
        let (first, last) =
            Self::negative_bounds(record.shoulder_position()).ok_or(WeldError::NoWeldPhaseDetected)?;
        WeldSegment::new(first, last, record.len())
    }

    /// Indices of the first and last strictly negative sample, if any.
    fn negative_bounds(positions: &[f64]) -> Option<(usize, usize)> {
        let first = positions.iter().position(|&p| p < 0.0)?;
        let last = positions.iter().rposition(|&p| p < 0.0)?;
        Some((first, last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_positions(positions: &[f64]) -> WeldRecord {
        let n = positions.len();
        WeldRecord::new(vec![0.0; n], vec![0.0; n], positions.to_vec()).unwrap()
    }

    #[test]
    fn test_segment_bounds_single_excursion() {
        let record = record_with_positions(&[1.0, 1.0, -1.0, -2.0, -1.0, 1.0, 1.0]);
        let seg = WeldSegmenter::segment(&record).unwrap();
        assert_eq!(seg.start(), 2);
        assert_eq!(seg.end(), 4);
    }

    #[test]
    fn test_no_negative_positions() {
        let record = record_with_positions(&[1.0, 1.0, 1.0]);
        assert!(matches!(
            WeldSegmenter::segment(&record),
            Err(WeldError::NoWeldPhaseDetected)
        ));
    }

    #[test]
    fn test_zero_is_not_negative() {
        let record = record_with_positions(&[0.0, -0.0, 0.0, 0.0]);
        assert!(matches!(
            WeldSegmenter::segment(&record),
            Err(WeldError::NoWeldPhaseDetected)
        ));
    }

    #[test]
    fn test_single_negative_sample_is_empty_segment() {
        let record = record_with_positions(&[1.0, -0.5, 1.0]);
        assert!(matches!(
            WeldSegmenter::segment(&record),
            Err(WeldError::EmptySegment { start: 1, end: 1, len: 3 })
        ));
    }

    #[test]
    fn test_two_adjacent_negatives_give_length_one() {
        let record = record_with_positions(&[1.0, -0.5, -0.7, 1.0]);
        let seg = WeldSegmenter::segment(&record).unwrap();
        assert_eq!(seg.range(), 1..2);
        assert_eq!(seg.len(), 1);
    }

    #[test]
    fn test_disjoint_excursions_use_outermost_bound() {
        let record = record_with_positions(&[1.0, -1.0, -1.0, 2.0, 2.0, -1.0, -1.0, 1.0]);
        let seg = WeldSegmenter::segment(&record).unwrap();
        assert_eq!(seg.range(), 1..6);
    }

    #[test]
    fn test_negative_through_last_sample() {
        let record = record_with_positions(&[1.0, -1.0, -2.0, -3.0]);
        let seg = WeldSegmenter::segment(&record).unwrap();
        assert_eq!(seg.range(), 1..3);
        assert!(seg.end() <= record.len());
    }

    #[test]
    fn test_nan_positions_are_ignored() {
        let record = record_with_positions(&[f64::NAN, -1.0, f64::NAN, -1.0, f64::NAN]);
        let seg = WeldSegmenter::segment(&record).unwrap();
        assert_eq!(seg.range(), 1..3);
    }
}
