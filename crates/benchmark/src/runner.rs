//! Benchmark runner for cutting requests.

use crate::error::BenchResult;
use crate::result::{BenchmarkResult, RunResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::Path;
use std::time::Instant;
use u_cutstock_core::{EngineConfig, PlacementResult};
use u_cutstock_guillotine::{OptimizationManager, OptimizationRequest};

/// Default seed when neither the runner nor the request supplies one.
pub const DEFAULT_SEED: u64 = 42;

/// Configuration for benchmark runs.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Strategies to compare (empty = every registered strategy).
    pub strategies: Vec<String>,
    /// Seed override for every run.
    pub seed: Option<u64>,
    /// Number of runs per strategy, each with the next seed.
    pub runs_per_config: usize,
    /// Whether to show progress.
    pub show_progress: bool,
    /// Tuning passed to the built-in strategies.
    pub engine: EngineConfig,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            strategies: Vec::new(),
            seed: None,
            runs_per_config: 1,
            show_progress: true,
            engine: EngineConfig::default(),
        }
    }
}

impl BenchmarkConfig {
    /// Creates a new benchmark configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the comparison to the named strategies.
    pub fn with_strategies(mut self, strategies: Vec<String>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Overrides the request seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the number of runs per strategy.
    pub fn with_runs_per_config(mut self, n: usize) -> Self {
        self.runs_per_config = n.max(1);
        self
    }

    /// Enables or disables progress output.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Sets the engine tuning.
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }
}

/// Loads an optimization request from a JSON file.
pub fn load_request(path: impl AsRef<Path>) -> BenchResult<OptimizationRequest> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Loads engine tuning from a JSON file; missing fields keep their defaults.
pub fn load_engine_config(path: impl AsRef<Path>) -> BenchResult<EngineConfig> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Benchmark runner.
pub struct BenchmarkRunner {
    config: BenchmarkConfig,
    manager: OptimizationManager,
}

impl BenchmarkRunner {
    /// Creates a runner with the built-in strategies.
    pub fn new(config: BenchmarkConfig) -> Self {
        let manager = OptimizationManager::with_config(config.engine.clone());
        Self { config, manager }
    }

    /// The underlying optimization manager.
    pub fn manager(&self) -> &OptimizationManager {
        &self.manager
    }

    /// Seed for the run with index `run_idx`.
    fn seed_for(&self, request: &OptimizationRequest, run_idx: usize) -> u64 {
        self.config
            .seed
            .or(request.seed)
            .unwrap_or(DEFAULT_SEED)
            .wrapping_add(run_idx as u64)
    }

    /// Runs the request through the manager with fallback.
    pub fn run(&self, request: &OptimizationRequest) -> BenchResult<PlacementResult> {
        let mut request = request.clone();
        if let Some(seed) = self.config.seed {
            request.seed = Some(seed);
        }
        Ok(self.manager.run_optimization(&request)?)
    }

    /// Runs each selected strategy directly, without fallback.
    pub fn compare(&self, name: &str, request: &OptimizationRequest) -> BenchmarkResult {
        let mut results = BenchmarkResult::new();
        let total_pieces: usize = request.pieces.iter().map(|p| p.quantity).sum();

        let strategies: Vec<String> = if self.config.strategies.is_empty() {
            self.manager
                .list_algorithms()
                .into_iter()
                .map(|info| info.name)
                .collect()
        } else {
            self.config.strategies.clone()
        };

        if self.config.show_progress {
            println!("\nBenchmarking request: {}", name);
            println!("  Piece types: {}", request.pieces.len());
            println!("  Total pieces: {}", total_pieces);
        }

        for strategy in &strategies {
            if self.config.show_progress {
                println!("  Running {}...", strategy);
            }

            for run_idx in 0..self.config.runs_per_config {
                let mut rng = StdRng::seed_from_u64(self.seed_for(request, run_idx));
                let start = Instant::now();
                let run = match self.manager.execute(strategy, request, &mut rng) {
                    Ok(result) => {
                        if self.config.show_progress {
                            println!(
                                "    Run {}: placed={}/{}, sheets={}, efficiency={}, time={}ms",
                                run_idx + 1,
                                result.placed_count(),
                                total_pieces,
                                result.sheet_count,
                                result.efficiency_percent(),
                                result.execution_time_ms
                            );
                        }
                        RunResult::from_placement(name, &result)
                    }
                    Err(e) => {
                        log::warn!("Strategy '{}' failed on '{}': {}", strategy, name, e);
                        if self.config.show_progress {
                            println!("    Run {} failed: {}", run_idx + 1, e);
                        }
                        RunResult::failed(
                            name,
                            strategy.as_str(),
                            total_pieces,
                            start.elapsed().as_millis() as u64,
                            e,
                        )
                    }
                };
                results.add_run(run);
            }
        }

        results
    }
}
