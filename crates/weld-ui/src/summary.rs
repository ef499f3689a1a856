//! Plain-text run summary printed after a batch.

use weld_core::formatting::{format_elapsed, format_force};
use weld_core::models::PeakMode;
use weld_core::peaks::PeakExtractor;
use weld_data::analysis::BatchAnalysis;

/// Render the end-of-run summary: counts, extreme peaks and every skipped
/// file with its reason.
pub fn render_summary(analysis: &BatchAnalysis) -> String {
    let meta = &analysis.metadata;
    let summary = &analysis.summary;
    let result = summary.result();
    let label = meta.mode.label();

    let mut lines = vec![format!(
        "Processed {} of {} weld logs ({} skipped) in {}",
        meta.files_processed,
        meta.files_discovered,
        meta.files_skipped,
        format_elapsed(meta.discovery_time_seconds + meta.processing_time_seconds)
    )];

    // Range of the per-weld peaks, independent of which extremum they hold.
    let highest = |values: &[f64]| PeakExtractor::peak(values, PeakMode::Max);
    let lowest = |values: &[f64]| PeakExtractor::peak(values, PeakMode::Min);
    for (name, values) in [
        ("shoulder", result.shoulder_peaks()),
        ("probe", result.probe_peaks()),
    ] {
        if let (Some(lo), Some(hi)) = (lowest(values), highest(values)) {
            lines.push(format!(
                "  {label} {name} force: {} to {}",
                format_force(lo),
                format_force(hi)
            ));
        }
    }

    if !summary.skipped().is_empty() {
        lines.push("Skipped files:".to_string());
        for skipped in summary.skipped() {
            lines.push(format!("  {}: {}", skipped.path.display(), skipped.error));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;
    use weld_core::settings::BatchOptions;
    use weld_data::analysis::analyze_batch;

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
    }

    #[test]
    fn test_summary_lists_counts_ranges_and_skips() {
        let dir = TempDir::new().unwrap();
        let header = "Shoulder Force (N) (),Probe Force (N) (),Shoulder (Y) Pos (mm) ()";
        write_csv(
            dir.path(),
            "W_2024_01_05_10_30_00_1.csv",
            &[header, "1,1,1", "9000,4000,-1", "9100,4100,-1"],
        );
        write_csv(
            dir.path(),
            "W_2024_01_06_10_30_00_2.csv",
            &[header, "1,1,1", "12000,5000,-1", "100,100,-1"],
        );
        write_csv(dir.path(), "W_2024_01_07_10_30_00_3.csv", &[header, "1,1,1"]);

        let analysis = analyze_batch(dir.path(), &BatchOptions::default(), |_| {}).unwrap();
        let text = render_summary(&analysis);

        assert!(text.starts_with("Processed 2 of 3 weld logs (1 skipped) in "));
        assert!(text.contains("Max shoulder force: 9,000 N to 12,000 N"));
        assert!(text.contains("Max probe force: 4,000 N to 5,000 N"));
        assert!(text.contains("Skipped files:"));
        assert!(text.contains("W_2024_01_07_10_30_00_3.csv: No weld phase detected"));
    }

    #[test]
    fn test_summary_empty_batch() {
        let dir = TempDir::new().unwrap();
        let analysis = analyze_batch(dir.path(), &BatchOptions::default(), |_| {}).unwrap();
        let text = render_summary(&analysis);
        assert!(text.starts_with("Processed 0 of 0 weld logs (0 skipped)"));
        assert!(!text.contains("Skipped files:"));
    }
}
