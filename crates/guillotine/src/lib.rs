//! # U-Cutstock Guillotine
//!
//! Guillotine placement strategies for rectangular panel cutting.
//!
//! This crate places rectangular pieces onto copies of a stock panel,
//! accounting for the blade width (kerf) and optional 90-degree rotation, and
//! picks among several strategies with automatic fallback.
//!
//! ## Strategies
//!
//! | Strategy | Rotation | Speed | Description |
//! |----------|----------|-------|-------------|
//! | `beam-search-guillotine` | yes | Medium | Beam search over free-rectangle choices |
//! | `hybrid-local-search` | yes | Medium | First fit plus cross-sheet exchanges |
//! | `first-fit-decreasing` | no | Fast | Largest first into the tightest slot |
//! | `genetic-search` | yes | Slow | GA over complete layouts |
//!
//! ## Quick Start
//!
//! ```rust
//! use u_cutstock_guillotine::{OptimizationManager, OptimizationRequest};
//! use u_cutstock_core::{Panel, Piece, Settings};
//!
//! let request = OptimizationRequest::new(
//!     vec![
//!         Piece::new("shelf", 800.0, 300.0).with_quantity(4),
//!         Piece::new("side", 1200.0, 300.0).with_quantity(2).with_rotation(true),
//!     ],
//!     Panel::new(2440.0, 1220.0),
//! )
//! .with_settings(Settings::new().with_kerf(3.0))
//! .with_seed(42);
//!
//! let manager = OptimizationManager::default();
//! let result = manager.run_optimization(&request).unwrap();
//!
//! println!("{} sheets, efficiency {}", result.sheet_count, result.efficiency_percent());
//! ```

pub mod beam_cutting;
pub mod ffd_cutting;
pub mod ga_cutting;
pub mod hybrid_cutting;
pub mod optimizer;
pub mod request;

pub use beam_cutting::BeamSearchGuillotine;
pub use ffd_cutting::FirstFitDecreasing;
pub use ga_cutting::{CuttingIndividual, CuttingProblem, GeneticSearch};
pub use hybrid_cutting::HybridLocalSearch;
pub use optimizer::{requires_multi_sheet, requires_rotation, OptimizationManager, StrategyRegistry};
pub use request::OptimizationRequest;

// Re-export core types for convenience
pub use u_cutstock_core::{
    AlgorithmInfo, CutInstruction, Deadline, EngineConfig, Error, Panel, Piece, PlacedPiece,
    PlacementResult, PlacementStrategy, Result, Settings, SolveContext, UnitPiece,
};
