//! U-Cutstock Benchmark Runner CLI

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use u_cutstock_benchmark::{
    load_engine_config, load_request, logging, BenchmarkConfig, BenchmarkRunner,
    SyntheticGenerator, SyntheticRequests,
};
use u_cutstock_core::EngineConfig;
use u_cutstock_guillotine::OptimizationManager;

#[derive(Parser)]
#[command(name = "u-cutstock-bench")]
#[command(about = "Benchmark runner for U-Cutstock guillotine strategies")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered placement strategies
    List,

    /// Optimize a request with automatic fallback
    Run {
        /// Path to the JSON request file
        request: PathBuf,

        /// Preferred strategy (overrides the request)
        #[arg(short, long)]
        algorithm: Option<String>,

        /// Random seed (overrides the request)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Engine tuning JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file for the placement result (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run every strategy on a request and compare them
    Compare {
        /// Path to the JSON request file
        request: PathBuf,

        /// Random seed (overrides the request)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Strategies to compare (default: all)
        #[arg(short = 'a', long = "algorithm")]
        algorithms: Vec<String>,

        /// Number of runs per strategy
        #[arg(short, long, default_value = "1")]
        runs: usize,

        /// Engine tuning JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file for results (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for CSV results
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Generate synthetic requests
    Generate {
        /// Random seed for reproducibility
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Number of piece types in a single mixed request
        #[arg(short, long)]
        pieces: Option<usize>,

        /// Output directory (all presets) or file (with --pieces)
        #[arg(short, long, default_value = "requests")]
        output: PathBuf,
    },
}

fn engine_config(path: Option<&PathBuf>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => load_engine_config(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn request_name(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "request".to_string())
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            let manager = OptimizationManager::default();
            println!("Available strategies (priority order):");
            println!("======================================");
            for info in manager.list_algorithms() {
                println!(
                    "  - {:<24} rotation={:<5} multi-sheet={:<5} time={:?}",
                    info.name,
                    info.supports_rotation,
                    info.supports_multi_sheet,
                    info.estimated_time
                );
                println!("      {}", info.description);
            }
        }

        Commands::Run {
            request,
            algorithm,
            seed,
            config,
            output,
        } => {
            let mut req = load_request(&request)
                .with_context(|| format!("Failed to load request {}", request.display()))?;
            if algorithm.is_some() {
                req.algorithm = algorithm;
            }

            let config = BenchmarkConfig::new()
                .with_seed(seed)
                .with_engine(engine_config(config.as_ref())?);
            let runner = BenchmarkRunner::new(config);
            let result = runner.run(&req)?;

            println!("Strategy:   {}", result.algorithm);
            println!(
                "Placed:     {}/{}",
                result.placed_count(),
                result.placed_count() + result.unused_pieces.len()
            );
            println!("Sheets:     {}", result.sheet_count);
            println!("Efficiency: {}", result.efficiency_percent());
            println!("Cuts:       {}", result.cuts.len());
            println!("Time:       {}ms", result.execution_time_ms);
            for piece in &result.unused_pieces {
                println!("  unused: {} {} ({} x {})", piece.id, piece.key, piece.width, piece.height);
            }

            if let Some(path) = output {
                std::fs::write(&path, serde_json::to_string_pretty(&result)?)?;
                println!("Result saved to: {}", path.display());
            }
        }

        Commands::Compare {
            request,
            seed,
            algorithms,
            runs,
            config,
            output,
            csv,
        } => {
            let req = load_request(&request)
                .with_context(|| format!("Failed to load request {}", request.display()))?;

            let config = BenchmarkConfig::new()
                .with_seed(seed)
                .with_strategies(algorithms)
                .with_runs_per_config(runs)
                .with_engine(engine_config(config.as_ref())?);
            let runner = BenchmarkRunner::new(config);
            let results = runner.compare(&request_name(&request), &req);

            results.print_summary();

            if let Some(path) = output {
                results.save_json(&path)?;
                println!("Results saved to: {}", path.display());
            }

            if let Some(path) = csv {
                results.save_csv(&path)?;
                println!("CSV saved to: {}", path.display());
            }
        }

        Commands::Generate {
            seed,
            pieces,
            output,
        } => {
            if let Some(count) = pieces {
                let request = SyntheticGenerator::with_seed(seed).mixed(count).with_seed(seed);
                if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&output, serde_json::to_string_pretty(&request)?)?;
                println!(
                    "Generated {} piece types (seed={}) to {}",
                    count,
                    seed,
                    output.display()
                );
                return Ok(());
            }

            std::fs::create_dir_all(&output)?;
            println!(
                "Generating synthetic requests (seed={}) to {}...",
                seed,
                output.display()
            );

            let requests = SyntheticRequests::all(seed);
            for (name, request) in &requests {
                let file_path = output.join(format!("{}.json", name));
                std::fs::write(&file_path, serde_json::to_string_pretty(request)?)?;
                println!(
                    "  {} ... OK ({} piece types, {} pieces)",
                    name,
                    request.pieces.len(),
                    request.pieces.iter().map(|p| p.quantity).sum::<usize>()
                );
            }

            println!("\nGenerated {} synthetic requests", requests.len());
        }
    }

    Ok(())
}
