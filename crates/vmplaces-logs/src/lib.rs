#![doc = include_str!("../readme.md")]

pub mod config;
pub mod energy;
pub mod error;
pub mod events;
pub mod intervals;
pub mod run_log;
pub mod stats;
pub mod summary;

pub use config::Algorithm;
pub use error::ReportError;
pub use stats::{ExperimentStats, LoadParams, RunCounters, RunKey};
