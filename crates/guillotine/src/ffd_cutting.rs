//! First-Fit-Decreasing guillotine placement.
//!
//! Pieces are taken largest first and dropped into the free rectangle with
//! the least leftover area across all open sheets. Pieces are never rotated
//! and placements are never revisited.

use std::time::Instant;
use u_cutstock_core::{
    primary_panel, sort_by_area, AlgorithmInfo, EstimatedTime, Layout, Panel, PlacementResult,
    PlacementStrategy, Result, Settings, SolveContext, UnitPiece,
};

/// Greedy area-descending best-fit placement.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFitDecreasing;

impl FirstFitDecreasing {
    /// Registry name.
    pub const NAME: &'static str = "first-fit-decreasing";

    /// Creates the strategy.
    pub fn new() -> Self {
        Self
    }
}

impl PlacementStrategy for FirstFitDecreasing {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn info(&self) -> AlgorithmInfo {
        AlgorithmInfo {
            name: Self::NAME.to_string(),
            description: "Largest pieces first into the tightest free rectangle".to_string(),
            supports_rotation: false,
            supports_multi_sheet: true,
            estimated_time: EstimatedTime::Fast,
        }
    }

    fn execute(
        &self,
        pieces: &[UnitPiece],
        panels: &[Panel],
        settings: &Settings,
        _ctx: &mut SolveContext<'_>,
    ) -> Result<PlacementResult> {
        let start = Instant::now();
        let panel = *primary_panel(panels)?;

        let mut order = pieces.to_vec();
        sort_by_area(&mut order);

        let mut layout = Layout::new(panel, settings.kerf);
        let mut unused = Vec::new();
        for piece in order {
            if !layout.place_best_fit(&piece, false) {
                log::debug!("FFD: piece '{}' {} does not fit the panel", piece.id, piece.key);
                unused.push(piece);
            }
        }

        Ok(
            PlacementResult::from_sheets(layout.sheets(), unused, &panel, settings, Self::NAME)
                .with_execution_time(start.elapsed().as_millis() as u64),
        )
    }
}
