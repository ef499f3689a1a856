//! Presentation layer for weld peak-force analysis.
//!
//! Renders the batch result as an SVG trend chart, draws the console
//! progress line and formats the end-of-run summary.

pub mod chart;
pub mod progress_bar;
pub mod summary;

pub use weld_core as core;
