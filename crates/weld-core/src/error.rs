use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while analysing a batch of weld logs.
#[derive(Error, Debug)]
pub enum WeldError {
    /// A file name does not carry the seven delimited fields the machine writes.
    #[error("Malformed weld file name {name:?}: expected at least {expected} '{delimiter}'-separated fields, found {found}")]
    MalformedFilename {
        name: String,
        delimiter: char,
        expected: usize,
        found: usize,
    },

    /// A required channel column is absent from the CSV header.
    #[error("Missing column: {0:?}")]
    MissingColumn(String),

    /// The shoulder position never went negative, so no weld phase exists.
    #[error("No weld phase detected: shoulder position is never negative")]
    NoWeldPhaseDetected,

    /// A segment covers no samples or reaches past the end of the record.
    #[error("Empty weld segment [{start}, {end}) for record of length {len}")]
    EmptySegment { start: usize, end: usize, len: usize },

    /// The batch root does not exist or cannot be read.
    #[error("Root folder not found or unreadable: {0}")]
    RootNotFound(PathBuf),

    /// Channel data is present but unusable (non-numeric cells, ragged rows, no rows).
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected the file.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be parsed or written.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WeldError {
    /// Short, stable identifier for the error kind, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            WeldError::MalformedFilename { .. } => "malformed_filename",
            WeldError::MissingColumn(_) => "missing_column",
            WeldError::NoWeldPhaseDetected => "no_weld_phase_detected",
            WeldError::EmptySegment { .. } => "empty_segment",
            WeldError::RootNotFound(_) => "root_not_found",
            WeldError::MalformedData(_) => "malformed_data",
            WeldError::FileRead { .. } => "file_read",
            WeldError::Csv(_) => "csv",
            WeldError::JsonParse(_) => "json",
            WeldError::Config(_) => "config",
            WeldError::Io(_) => "io",
        }
    }
}

/// Convenience alias used throughout the weld crates.
pub type Result<T> = std::result::Result<T, WeldError>;
