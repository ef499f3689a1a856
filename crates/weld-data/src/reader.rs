//! Weld log discovery, chronological ordering and CSV loading.
//!
//! Walks a root folder for weld logs, orders them by the date/time fields in
//! their file names and converts each CSV into a [`WeldRecord`].

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use weld_core::chrono_key::ChronoKey;
use weld_core::error::{Result, WeldError};
use weld_core::models::WeldRecord;
use weld_core::settings::ColumnNames;

use crate::aggregator::SkippedFile;

// ── Public types ──────────────────────────────────────────────────────────────

/// A discovered weld log together with its chronological position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeldFile {
    /// Full path to the log.
    pub path: PathBuf,
    /// Ordering key from the file name.
    pub key: ChronoKey,
    /// Zero-based position in chronological order.
    pub rank: usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Result of walking a batch root.
#[derive(Debug, Default)]
pub struct Discovered {
    /// Weld log candidates, sorted by path.
    pub files: Vec<PathBuf>,
    /// Entries that could not be read, in walk order.
    pub unreadable: Vec<SkippedFile>,
}

impl Discovered {
    /// Every entry that counts toward the batch, readable or not.
    pub fn len(&self) -> usize {
        self.files.len() + self.unreadable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Find every file under `root` (recursively) whose extension is `extension`.
///
/// Candidates are sorted by path so that discovery order is deterministic.
/// Fails with [`WeldError::RootNotFound`] when `root` is missing, is not a
/// directory or cannot be listed.
///
/// Entries below the root that cannot be read are returned in
/// [`Discovered::unreadable`] with a [`WeldError::FileRead`] when they could
/// hold weld logs: a path with the weld-log extension (such as a dangling
/// symlink), a directory that cannot be listed, or a symlink loop.
pub fn find_weld_files(root: &Path, extension: &str) -> Result<Discovered> {
    if !root.is_dir() || std::fs::read_dir(root).is_err() {
        return Err(WeldError::RootNotFound(root.to_path_buf()));
    }

    let has_extension = |path: &Path| {
        path.extension()
            .map(|ext| ext == extension)
            .unwrap_or(false)
    };

    let mut discovered = Discovered::default();
    for entry in walkdir::WalkDir::new(root).follow_links(true) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && has_extension(entry.path()) {
                    discovered.files.push(entry.into_path());
                }
            }
            Err(error) => {
                let path = error
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                let relevant =
                    has_extension(&path) || path.is_dir() || error.loop_ancestor().is_some();
                warn!("Unreadable entry under {}: {}", root.display(), error);
                if relevant {
                    discovered.unreadable.push(SkippedFile {
                        path: path.clone(),
                        error: WeldError::FileRead {
                            path,
                            source: std::io::Error::from(error),
                        },
                    });
                }
            }
        }
    }

    discovered.files.sort();
    debug!(
        "Found {} .{} files under {} ({} unreadable)",
        discovered.files.len(),
        extension,
        root.display(),
        discovered.unreadable.len()
    );
    Ok(discovered)
}

/// Order `paths` chronologically by the key embedded in each file name.
///
/// The sort is stable, so files with equal keys keep their input order.
/// Files whose names do not carry the date fields are returned separately
/// as skipped with [`WeldError::MalformedFilename`].
pub fn order_by_chronology(paths: Vec<PathBuf>, delimiter: char) -> (Vec<WeldFile>, Vec<SkippedFile>) {
    let mut keyed: Vec<(PathBuf, ChronoKey)> = Vec::with_capacity(paths.len());
    let mut skipped: Vec<SkippedFile> = Vec::new();

    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match ChronoKey::from_file_name(&name, delimiter) {
            Ok(key) => keyed.push((path, key)),
            Err(error) => {
                warn!("Skipping {}: {}", path.display(), error);
                skipped.push(SkippedFile { path, error });
            }
        }
    }

    keyed.sort_by(|a, b| a.1.cmp(&b.1));

    let files = keyed
        .into_iter()
        .enumerate()
        .map(|(rank, (path, key))| WeldFile { path, key, rank })
        .collect();

    (files, skipped)
}

/// Load the three weld channels from a CSV log.
///
/// Header names are matched after trimming surrounding whitespace; columns
/// other than the three requested ones are ignored. Empty cells load as NaN.
///
/// # Errors
/// * [`WeldError::FileRead`] when the file cannot be opened.
/// * [`WeldError::MissingColumn`] when a requested header is absent.
/// * [`WeldError::MalformedData`] for non-numeric cells, short rows or a
///   file without data rows.
/// * [`WeldError::Csv`] when the CSV itself cannot be decoded.
pub fn load_weld_record(path: &Path, columns: &ColumnNames) -> Result<WeldRecord> {
    let file = std::fs::File::open(path).map_err(|source| WeldError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(std::io::BufReader::new(file));

    let headers = reader.headers()?.clone();
    let shoulder_force_idx = column_index(&headers, &columns.shoulder_force)?;
    let probe_force_idx = column_index(&headers, &columns.probe_force)?;
    let shoulder_position_idx = column_index(&headers, &columns.shoulder_position)?;

    let mut shoulder_force: Vec<f64> = Vec::new();
    let mut probe_force: Vec<f64> = Vec::new();
    let mut shoulder_position: Vec<f64> = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        // Data rows are numbered from 2 so messages match a spreadsheet view.
        let line = row + 2;
        shoulder_force.push(parse_cell(&record, shoulder_force_idx, &columns.shoulder_force, line)?);
        probe_force.push(parse_cell(&record, probe_force_idx, &columns.probe_force, line)?);
        shoulder_position.push(parse_cell(
            &record,
            shoulder_position_idx,
            &columns.shoulder_position,
            line,
        )?);
    }

    debug!("Loaded {} samples from {}", shoulder_force.len(), path.display());

    WeldRecord::new(shoulder_force, probe_force, shoulder_position)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Position of `name` in the header row, compared after trimming.
fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    let wanted = name.trim();
    headers
        .iter()
        .position(|h| h == wanted)
        .ok_or_else(|| WeldError::MissingColumn(name.to_string()))
}

/// Parse one numeric cell. Empty cells become NaN.
fn parse_cell(record: &csv::StringRecord, idx: usize, column: &str, line: usize) -> Result<f64> {
    let raw = record.get(idx).ok_or_else(|| {
        WeldError::MalformedData(format!("row {line} has no value for column {column:?}"))
    })?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed.parse::<f64>().map_err(|_| {
        WeldError::MalformedData(format!(
            "row {line}: {trimmed:?} in column {column:?} is not a number"
        ))
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "Time (s) (),Shoulder Force (N) (),Probe Force (N) (),Shoulder (Y) Pos (mm) ()";

    fn write_file(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    // ── find_weld_files ───────────────────────────────────────────────────────

    #[test]
    fn test_find_weld_files_recursive_and_filtered() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("day-2");
        std::fs::create_dir_all(&sub).unwrap();
        write_file(dir.path(), "a.csv", &["x"]);
        write_file(&sub, "b.csv", &["x"]);
        write_file(dir.path(), "notes.txt", &["x"]);
        write_file(dir.path(), "chart.png", &["x"]);

        let files = find_weld_files(dir.path(), "csv").unwrap().files;
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.extension().unwrap() == "csv"));
    }

    #[test]
    fn test_find_weld_files_sorted() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "c.csv", &["x"]);
        write_file(dir.path(), "a.csv", &["x"]);
        write_file(dir.path(), "b.csv", &["x"]);

        let files = find_weld_files(dir.path(), "csv").unwrap().files;
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv", "c.csv"]);
    }

    #[test]
    fn test_find_weld_files_missing_root() {
        let err = find_weld_files(Path::new("/tmp/does-not-exist-weld-peaks-xyz"), "csv").unwrap_err();
        assert!(matches!(err, WeldError::RootNotFound(_)));
    }

    #[test]
    fn test_find_weld_files_root_is_a_file() {
        let dir = TempDir::new().unwrap();
        let file = write_file(dir.path(), "a.csv", &["x"]);
        assert!(matches!(
            find_weld_files(&file, "csv"),
            Err(WeldError::RootNotFound(_))
        ));
    }

    #[test]
    fn test_find_weld_files_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(find_weld_files(dir.path(), "csv").unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_find_weld_files_reports_dangling_symlink() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "W_2024_01_02_00_00_00_a.csv", &["x"]);
        let link = dir.path().join("W_2024_01_01_00_00_00_x.csv");
        std::os::unix::fs::symlink(dir.path().join("gone.csv"), &link).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("notes.txt"))
            .unwrap();

        let discovered = find_weld_files(dir.path(), "csv").unwrap();
        assert_eq!(discovered.files.len(), 1);
        assert_eq!(discovered.unreadable.len(), 1);
        assert_eq!(discovered.len(), 2);
        assert_eq!(discovered.unreadable[0].path, link);
        assert!(matches!(
            discovered.unreadable[0].error,
            WeldError::FileRead { .. }
        ));
    }

    // ── order_by_chronology ───────────────────────────────────────────────────

    #[test]
    fn test_order_by_chronology_sorts_by_date_fields() {
        let paths = vec![
            PathBuf::from("/w/a/Weld_2024_01_05_10_30_00_1.csv"),
            PathBuf::from("/w/b/Weld_2024_01_04_09_00_00_2.csv"),
        ];
        let (files, skipped) = order_by_chronology(paths, '_');
        assert!(skipped.is_empty());
        assert_eq!(
            files[0].path,
            PathBuf::from("/w/b/Weld_2024_01_04_09_00_00_2.csv")
        );
        assert_eq!(files[0].rank, 0);
        assert_eq!(files[1].rank, 1);
    }

    #[test]
    fn test_order_by_chronology_ignores_directory_names() {
        // The z/ directory sorts last by path but holds the earliest weld.
        let paths = vec![
            PathBuf::from("/w/a/W_2024_03_01_00_00_00_x.csv"),
            PathBuf::from("/w/z/W_2024_02_01_00_00_00_x.csv"),
        ];
        let (files, _) = order_by_chronology(paths, '_');
        assert!(files[0].path.starts_with("/w/z"));
    }

    #[test]
    fn test_order_by_chronology_is_stable_on_ties() {
        let paths = vec![
            PathBuf::from("/w/1/Weld_2024_01_05_10_30_00_B.csv"),
            PathBuf::from("/w/2/Weld_2024_01_05_10_30_00_A.csv"),
            PathBuf::from("/w/3/Weld_2024_01_05_10_30_00_C.csv"),
        ];
        let (files, _) = order_by_chronology(paths.clone(), '_');
        let ordered: Vec<PathBuf> = files.into_iter().map(|f| f.path).collect();
        assert_eq!(ordered, paths);
    }

    #[test]
    fn test_order_by_chronology_skips_malformed_names() {
        let paths = vec![
            PathBuf::from("/w/summary.csv"),
            PathBuf::from("/w/Weld_2024_01_05_10_30_00_A.csv"),
        ];
        let (files, skipped) = order_by_chronology(paths, '_');
        assert_eq!(files.len(), 1);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].path, PathBuf::from("/w/summary.csv"));
        assert!(matches!(
            skipped[0].error,
            WeldError::MalformedFilename { .. }
        ));
    }

    // ── load_weld_record ──────────────────────────────────────────────────────

    #[test]
    fn test_load_weld_record_basic() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "w.csv",
            &[HEADER, "0.0,10,5,1", "0.1,80,40,-1", "0.2,20,10,-2"],
        );

        let record = load_weld_record(&path, &ColumnNames::default()).unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(record.shoulder_force(), &[10.0, 80.0, 20.0]);
        assert_eq!(record.probe_force(), &[5.0, 40.0, 10.0]);
        assert_eq!(record.shoulder_position(), &[1.0, -1.0, -2.0]);
    }

    #[test]
    fn test_load_weld_record_column_order_and_padding() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "w.csv",
            &[
                " Shoulder (Y) Pos (mm) () , Probe Force (N) () ,Shoulder Force (N) ()",
                "-1.5, 3.25 ,100",
            ],
        );

        let record = load_weld_record(&path, &ColumnNames::default()).unwrap();
        assert_eq!(record.shoulder_force(), &[100.0]);
        assert_eq!(record.probe_force(), &[3.25]);
        assert_eq!(record.shoulder_position(), &[-1.5]);
    }

    #[test]
    fn test_load_weld_record_missing_probe_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "w.csv",
            &["Shoulder Force (N) (),Shoulder (Y) Pos (mm) ()", "10,-1"],
        );

        let err = load_weld_record(&path, &ColumnNames::default()).unwrap_err();
        match err {
            WeldError::MissingColumn(name) => assert_eq!(name, "Probe Force (N) ()"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_weld_record_non_numeric_cell() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "w.csv", &[HEADER, "0.0,10,5,1", "0.1,abc,40,-1"]);

        let err = load_weld_record(&path, &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, WeldError::MalformedData(_)));
        assert!(err.to_string().contains("row 3"));
    }

    #[test]
    fn test_load_weld_record_short_row() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "w.csv", &[HEADER, "0.0,10,5"]);

        let err = load_weld_record(&path, &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, WeldError::MalformedData(_)));
    }

    #[test]
    fn test_load_weld_record_empty_cell_is_nan() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "w.csv", &[HEADER, "0.0,,5,1"]);

        let record = load_weld_record(&path, &ColumnNames::default()).unwrap();
        assert!(record.shoulder_force()[0].is_nan());
    }

    #[test]
    fn test_load_weld_record_header_only() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "w.csv", &[HEADER]);

        let err = load_weld_record(&path, &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, WeldError::MalformedData(_)));
    }

    #[test]
    fn test_load_weld_record_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_weld_record(&dir.path().join("nope.csv"), &ColumnNames::default())
            .unwrap_err();
        assert!(matches!(err, WeldError::FileRead { .. }));
    }

    #[test]
    fn test_load_weld_record_custom_columns() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "w.csv", &["SF,PF,POS", "1,2,-3"]);
        let columns = ColumnNames {
            shoulder_force: "SF".to_string(),
            probe_force: "PF".to_string(),
            shoulder_position: "POS".to_string(),
        };

        let record = load_weld_record(&path, &columns).unwrap();
        assert_eq!(record.shoulder_position(), &[-3.0]);
    }
}
