use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::chrono_key::DEFAULT_DELIMITER;
use crate::error::{Result, WeldError};
use crate::models::PeakMode;

/// Column header of the shoulder force channel written by the machine.
pub const SHOULDER_FORCE_COLUMN: &str = "Shoulder Force (N) ()";
/// Column header of the probe force channel written by the machine.
pub const PROBE_FORCE_COLUMN: &str = "Probe Force (N) ()";
/// Column header of the shoulder position channel written by the machine.
pub const SHOULDER_POSITION_COLUMN: &str = "Shoulder (Y) Pos (mm) ()";

pub const DEFAULT_TITLE: &str = "RFSSW Peak Weld Forces";
pub const DEFAULT_EXTENSION: &str = "csv";
pub const DEFAULT_Y_MIN: f64 = 0.0;
pub const DEFAULT_Y_MAX: f64 = 15_000.0;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Plot the peak shoulder and probe forces of every RFSSW weld log under a folder
#[derive(Parser, Debug, Clone)]
#[command(
    name = "weld-peaks",
    about = "Plot peak weld forces across a folder of RFSSW weld logs",
    version
)]
pub struct Settings {
    /// Root folder containing weld logs (searched recursively)
    pub root: PathBuf,

    /// Chart output path (defaults to "<root>/<title>.svg")
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Write a JSON report of every processed and skipped file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Chart title
    #[arg(long, default_value = DEFAULT_TITLE)]
    pub title: String,

    /// Lower y-axis limit in newtons
    #[arg(long, default_value_t = DEFAULT_Y_MIN, allow_negative_numbers = true)]
    pub y_min: f64,

    /// Upper y-axis limit in newtons
    #[arg(long, default_value_t = DEFAULT_Y_MAX, allow_negative_numbers = true)]
    pub y_max: f64,

    /// Which extremum of each force channel to report
    #[arg(long, value_enum, default_value_t = PeakMode::Max)]
    pub mode: PeakMode,

    /// File extension of weld logs
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Field delimiter in weld log file names
    #[arg(long, default_value_t = DEFAULT_DELIMITER)]
    pub delimiter: char,

    /// Shoulder force column header
    #[arg(long, default_value = SHOULDER_FORCE_COLUMN)]
    pub shoulder_force_column: String,

    /// Probe force column header
    #[arg(long, default_value = PROBE_FORCE_COLUMN)]
    pub probe_force_column: String,

    /// Shoulder position column header
    #[arg(long, default_value = SHOULDER_POSITION_COLUMN)]
    pub shoulder_position_column: String,

    /// Number of files processed in parallel
    #[arg(long, short, default_value = "1", value_parser = clap::value_parser!(u16).range(1..=256))]
    pub jobs: u16,

    /// JSON config file with defaults for chart and column settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Hide the progress line
    #[arg(long, short)]
    pub quiet: bool,
}

// ── Option groups ──────────────────────────────────────────────────────────────

/// Header names of the three channels read from each weld log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub shoulder_force: String,
    pub probe_force: String,
    pub shoulder_position: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            shoulder_force: SHOULDER_FORCE_COLUMN.to_string(),
            probe_force: PROBE_FORCE_COLUMN.to_string(),
            shoulder_position: SHOULDER_POSITION_COLUMN.to_string(),
        }
    }
}

/// Everything the data pipeline needs to discover and process a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    pub extension: String,
    pub delimiter: char,
    pub columns: ColumnNames,
    pub mode: PeakMode,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            delimiter: DEFAULT_DELIMITER,
            columns: ColumnNames::default(),
            mode: PeakMode::Max,
        }
    }
}

/// Title and y-axis range handed to the chart renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub title: String,
    pub y_min: f64,
    pub y_max: f64,
    pub mode: PeakMode,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            y_min: DEFAULT_Y_MIN,
            y_max: DEFAULT_Y_MAX,
            mode: PeakMode::Max,
        }
    }
}

// ── ConfigFile ─────────────────────────────────────────────────────────────────

/// Optional JSON config file. Every field falls back to the CLI default.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<PeakMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<ColumnNames>,
}

impl ConfigFile {
    /// Load a config file from an explicit path.
    ///
    /// Unlike a missing optional setting, a named config file that cannot be
    /// read or parsed is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| WeldError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content)
            .map_err(|e| WeldError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write the config to `path`, creating parent directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse process arguments, merge the config file and validate.
    pub fn load() -> Result<Self> {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] but accepts an explicit argument list,
    /// enabling unit-testing without spawning subprocesses.
    pub fn load_from_args(args: Vec<std::ffi::OsString>) -> Result<Self> {
        // Build raw ArgMatches so we can query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if let Some(path) = settings.config.clone() {
            let config = ConfigFile::load_from(&path)?;
            settings.merge_config(config, &matches);
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Apply config-file values for every field not given on the command line
    /// (CLI always wins).
    fn merge_config(&mut self, config: ConfigFile, matches: &clap::ArgMatches) {
        // NOTE: clap stores the arg id using the *field name* (underscores),
        // not the long-flag spelling (hyphens).
        if !is_arg_explicitly_set(matches, "title") {
            if let Some(v) = config.title {
                self.title = v;
            }
        }
        if !is_arg_explicitly_set(matches, "y_min") {
            if let Some(v) = config.y_min {
                self.y_min = v;
            }
        }
        if !is_arg_explicitly_set(matches, "y_max") {
            if let Some(v) = config.y_max {
                self.y_max = v;
            }
        }
        if !is_arg_explicitly_set(matches, "mode") {
            if let Some(v) = config.mode {
                self.mode = v;
            }
        }
        if !is_arg_explicitly_set(matches, "extension") {
            if let Some(v) = config.extension {
                self.extension = v;
            }
        }
        if !is_arg_explicitly_set(matches, "delimiter") {
            if let Some(v) = config.delimiter {
                self.delimiter = v;
            }
        }
        if let Some(columns) = config.columns {
            if !is_arg_explicitly_set(matches, "shoulder_force_column") {
                self.shoulder_force_column = columns.shoulder_force;
            }
            if !is_arg_explicitly_set(matches, "probe_force_column") {
                self.probe_force_column = columns.probe_force;
            }
            if !is_arg_explicitly_set(matches, "shoulder_position_column") {
                self.shoulder_position_column = columns.shoulder_position;
            }
        }
    }

    /// Reject settings that would make the run meaningless.
    pub fn validate(&self) -> Result<()> {
        if !self.y_min.is_finite() || !self.y_max.is_finite() || self.y_min >= self.y_max {
            return Err(WeldError::Config(format!(
                "y-axis range must satisfy y_min < y_max (got {} and {})",
                self.y_min, self.y_max
            )));
        }
        if self.extension.is_empty() {
            return Err(WeldError::Config("extension must not be empty".to_string()));
        }
        for (flag, value) in [
            ("shoulder-force-column", &self.shoulder_force_column),
            ("probe-force-column", &self.probe_force_column),
            ("shoulder-position-column", &self.shoulder_position_column),
        ] {
            if value.trim().is_empty() {
                return Err(WeldError::Config(format!("--{flag} must not be empty")));
            }
        }
        Ok(())
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            extension: self.extension.clone(),
            delimiter: self.delimiter,
            columns: ColumnNames {
                shoulder_force: self.shoulder_force_column.clone(),
                probe_force: self.probe_force_column.clone(),
                shoulder_position: self.shoulder_position_column.clone(),
            },
            mode: self.mode,
        }
    }

    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            title: self.title.clone(),
            y_min: self.y_min,
            y_max: self.y_max,
            mode: self.mode,
        }
    }

    /// Where the chart is written: `--output`, else `<root>/<title>.svg`.
    pub fn chart_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.root.join(format!("{}.svg", self.title)))
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
