//! Benchmark result types and recording.

use crate::error::BenchResult;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use u_cutstock_core::PlacementResult;

/// Result of a single strategy run on one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Request name (usually the file stem)
    pub request: String,
    /// Strategy used
    pub strategy: String,
    /// Whether the run produced a valid result
    pub success: bool,
    /// Number of piece copies placed
    pub pieces_placed: usize,
    /// Total piece copies in the request
    pub total_pieces: usize,
    /// Sheets opened
    pub sheet_count: usize,
    /// Efficiency ratio (0.0 - 1.0)
    pub efficiency: f64,
    /// Computation time in milliseconds
    pub time_ms: u64,
    /// Error message when the run failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResult {
    /// Records a successful run.
    pub fn from_placement(request: impl Into<String>, result: &PlacementResult) -> Self {
        Self {
            request: request.into(),
            strategy: result.algorithm.clone(),
            success: true,
            pieces_placed: result.placed_count(),
            total_pieces: result.placed_count() + result.unused_pieces.len(),
            sheet_count: result.sheet_count,
            efficiency: result.efficiency,
            time_ms: result.execution_time_ms,
            error: None,
        }
    }

    /// Records a failed run.
    pub fn failed(
        request: impl Into<String>,
        strategy: impl Into<String>,
        total_pieces: usize,
        time_ms: u64,
        error: impl ToString,
    ) -> Self {
        Self {
            request: request.into(),
            strategy: strategy.into(),
            success: false,
            pieces_placed: 0,
            total_pieces,
            sheet_count: 0,
            efficiency: 0.0,
            time_ms,
            error: Some(error.to_string()),
        }
    }
}

/// Collection of benchmark runs.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Individual run results
    pub runs: Vec<RunResult>,
    /// Crate version that produced the results
    pub version: String,
}

impl BenchmarkResult {
    /// Creates an empty result set.
    pub fn new() -> Self {
        Self {
            runs: Vec::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Adds a run result.
    pub fn add_run(&mut self, result: RunResult) {
        self.runs.push(result);
    }

    /// The successful run with the highest efficiency, fewest sheets first on ties.
    pub fn best(&self) -> Option<&RunResult> {
        self.runs.iter().filter(|r| r.success).max_by(|a, b| {
            a.efficiency
                .total_cmp(&b.efficiency)
                .then(b.sheet_count.cmp(&a.sheet_count))
        })
    }

    /// Saves results to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> BenchResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Saves results to a CSV file.
    pub fn save_csv(&self, path: impl AsRef<Path>) -> BenchResult<()> {
        let mut file = File::create(path)?;

        writeln!(
            file,
            "request,strategy,success,pieces_placed,total_pieces,sheet_count,efficiency,time_ms"
        )?;
        for run in &self.runs {
            writeln!(
                file,
                "{},{},{},{},{},{},{:.4},{}",
                run.request,
                run.strategy,
                run.success,
                run.pieces_placed,
                run.total_pieces,
                run.sheet_count,
                run.efficiency,
                run.time_ms,
            )?;
        }

        Ok(())
    }

    /// Prints a summary table to stdout.
    pub fn print_summary(&self) {
        println!("\n{:=<92}", "");
        println!("BENCHMARK RESULTS");
        println!("{:=<92}", "");
        println!(
            "{:<20} {:<24} {:>10} {:>8} {:>10} {:>10}",
            "Request", "Strategy", "Placed", "Sheets", "Eff%", "Time(ms)"
        );
        println!("{:-<92}", "");

        for run in &self.runs {
            if run.success {
                println!(
                    "{:<20} {:<24} {:>10} {:>8} {:>10.1} {:>10}",
                    run.request,
                    run.strategy,
                    format!("{}/{}", run.pieces_placed, run.total_pieces),
                    run.sheet_count,
                    run.efficiency * 100.0,
                    run.time_ms
                );
            } else {
                println!(
                    "{:<20} {:<24} FAILED: {}",
                    run.request,
                    run.strategy,
                    run.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        println!("{:=<92}", "");

        if let Some(best) = self.best() {
            println!(
                "Best: {} ({:.1}%, {} sheets)",
                best.strategy,
                best.efficiency * 100.0,
                best.sheet_count
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(strategy: &str, efficiency: f64, sheets: usize) -> RunResult {
        RunResult {
            request: "demo".to_string(),
            strategy: strategy.to_string(),
            success: true,
            pieces_placed: 4,
            total_pieces: 4,
            sheet_count: sheets,
            efficiency,
            time_ms: 1,
            error: None,
        }
    }

    #[test]
    fn test_best_prefers_efficiency_then_fewer_sheets() {
        let mut results = BenchmarkResult::new();
        results.add_run(run("a", 0.7, 2));
        results.add_run(run("b", 0.9, 3));
        results.add_run(run("c", 0.9, 2));
        results.add_run(RunResult::failed("demo", "d", 4, 0, "boom"));

        assert_eq!(results.best().map(|r| r.strategy.as_str()), Some("c"));
    }

    #[test]
    fn test_best_ignores_failures() {
        let mut results = BenchmarkResult::new();
        results.add_run(RunResult::failed("demo", "a", 4, 0, "boom"));

        assert!(results.best().is_none());
    }

    #[test]
    fn test_failed_run_serializes_error() {
        let failed = RunResult::failed("demo", "a", 4, 2, "no fit");
        let json = serde_json::to_string(&failed).unwrap();

        assert!(json.contains("\"error\":\"no fit\""));
        let ok = serde_json::to_string(&run("b", 0.5, 1)).unwrap();
        assert!(!ok.contains("error"));
    }
}
