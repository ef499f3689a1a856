//! Core types and algorithms for weld peak-force analysis.
//!
//! Holds the data model, the error taxonomy, CLI settings, the file-name
//! chronology key, the weld-phase segmenter and the peak extractor. Nothing
//! here touches weld log files directly.

pub mod chrono_key;
pub mod error;
pub mod formatting;
pub mod models;
pub mod peaks;
pub mod segmentation;
pub mod settings;

pub use error::{Result, WeldError};
