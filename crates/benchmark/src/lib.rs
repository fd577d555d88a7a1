//! Benchmark Suite for U-Cutstock
//!
//! This crate provides:
//! - Loading of optimization requests and engine tuning from JSON
//! - Synthetic request generation for edge case testing
//! - A benchmark runner comparing every registered strategy
//! - Result recording as JSON, CSV and summary tables

mod error;
pub mod logging;
mod result;
mod runner;
mod synthetic;

pub use error::{BenchError, BenchResult};
pub use result::{BenchmarkResult, RunResult};
pub use runner::{load_engine_config, load_request, BenchmarkConfig, BenchmarkRunner, DEFAULT_SEED};
pub use synthetic::{SyntheticGenerator, SyntheticRequests, STANDARD_PANEL};
