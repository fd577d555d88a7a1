//! Error types for the benchmark runner.

use thiserror::Error;

/// Errors raised while loading requests or writing reports.
#[derive(Debug, Error)]
pub enum BenchError {
    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed request, config or result JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The optimizer rejected the request or every strategy failed.
    #[error("Optimization failed: {0}")]
    Optimization(#[from] u_cutstock_core::Error),
}

/// Result type for benchmark operations.
pub type BenchResult<T> = std::result::Result<T, BenchError>;
