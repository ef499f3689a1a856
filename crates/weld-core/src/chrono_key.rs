//! Chronological ordering keys derived from weld file names.
//!
//! The welding machine names every log with delimited fields where positions
//! 1 through 6 hold the fixed-width year, month, day, hour, minute and second.
//! Concatenating those fields verbatim gives a string whose lexicographic
//! order is the chronological order, without any date parsing.

use serde::Serialize;

use crate::error::{Result, WeldError};

/// Field delimiter used by the machine's file names.
pub const DEFAULT_DELIMITER: char = '_';

/// Positions of the date/time fields within the delimited name.
const DATE_FIELDS: std::ops::Range<usize> = 1..7;

/// Opaque ordering token for a weld file. Compare it, do not display it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ChronoKey(String);

impl ChronoKey {
    /// Derive the key from a bare file name (no directory part).
    ///
    /// Fails with [`WeldError::MalformedFilename`] when the name has fewer
    /// than seven `delimiter`-separated fields.
    pub fn from_file_name(file_name: &str, delimiter: char) -> Result<Self> {
        let fields: Vec<&str> = file_name.split(delimiter).collect();
        if fields.len() < DATE_FIELDS.end {
            return Err(WeldError::MalformedFilename {
                name: file_name.to_string(),
                delimiter,
                expected: DATE_FIELDS.end,
                found: fields.len(),
            });
        }
        Ok(Self(fields[DATE_FIELDS].concat()))
    }

    /// The raw concatenated fields, for logs and reports.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
