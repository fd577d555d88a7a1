//! # U-Cutstock Core
//!
//! Core types and abstractions for the U-Cutstock guillotine cutting engine.
//!
//! This crate provides the geometry kernel, the piece preprocessor and the
//! shared result and strategy types used by the placement strategies in
//! `u-cutstock-guillotine`.
//!
//! ## Core Components
//!
//! - **Geometry kernel**: [`Rect`], [`split_free_space`], [`prune_contained`]
//! - **Pieces**: [`Piece`], [`UnitPiece`], [`expand`], [`sort_by_priority`]
//! - **Sheets**: [`Panel`], [`Sheet`], [`Layout`], [`PlacedPiece`]
//! - **Strategy trait**: [`PlacementStrategy`] with [`SolveContext`] and [`Deadline`]
//! - **GA framework**: [`GaRunner`], [`GaProblem`]
//! - **Output**: [`PlacementResult`], [`CutInstruction`]
//!
//! ## Configuration
//!
//! Per-request [`Settings`] and engine-wide [`EngineConfig`] use builders:
//!
//! ```rust
//! use u_cutstock_core::{EngineConfig, Settings};
//!
//! let settings = Settings::new().with_kerf(3.0).with_timeout(5_000);
//! let config = EngineConfig::new()
//!     .with_beam_width(20)
//!     .with_population_size(80);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod cuts;
pub mod error;
pub mod ga;
pub mod geometry;
pub mod panel;
pub mod piece;
pub mod placement;
pub mod result;
pub mod settings;
pub mod solver;

// Re-exports
pub use cuts::{generate_cuts, CutDirection, CutInstruction};
pub use error::{Error, Result};
pub use ga::{GaConfig, GaProblem, GaResult, GaRunner, Individual};
pub use geometry::{prune_contained, rebuild_free_space, split_free_space, Rect, EPSILON};
pub use panel::Panel;
pub use piece::{
    expand, sort_by_area, sort_by_priority, validate_pieces, InstanceKey, Orientation, Piece,
    PieceId, UnitPiece,
};
pub use placement::{extent_of, is_feasible, Layout, PlacedPiece, Sheet};
pub use result::{PlacementResult, ResultSummary};
pub use settings::{CutPreference, EngineConfig, Settings};
pub use solver::{
    primary_panel, AlgorithmInfo, Deadline, EstimatedTime, PlacementStrategy, SolveContext,
};
