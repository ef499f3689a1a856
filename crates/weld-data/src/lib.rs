//! Data layer for weld peak-force analysis.
//!
//! Responsible for discovering and ordering weld logs, reading their CSV
//! channels, running the per-file segment/extract pipeline, folding results
//! into an ordered batch and exporting the JSON report.

pub mod aggregator;
pub mod analysis;
pub mod analyzer;
pub mod reader;
pub mod report;

pub use weld_core as core;
