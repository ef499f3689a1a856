//! Runtime orchestration layer for weld peak-force analysis.
//!
//! Drives the data pipeline on a tokio runtime, sequentially or with several
//! files in flight, and streams progress events to the caller.

pub mod orchestrator;

pub use weld_core as core;
pub use weld_data as data;
