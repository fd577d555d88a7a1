//! Beam search over guillotine placements.
//!
//! Pieces are processed one per depth in priority order. Every surviving
//! candidate is expanded into each free rectangle of each open sheet that
//! fits the piece, in every allowed orientation. Only the best `beam_width`
//! candidates survive to the next depth.
//!
//! Candidates share their sheets through [`Arc`]; placing a piece clones
//! only the sheet that changes.

use rayon::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;
use u_cutstock_core::{
    primary_panel, sort_by_priority, AlgorithmInfo, EngineConfig, Error, EstimatedTime, Layout,
    Orientation, Panel, PlacementResult, PlacementStrategy, Result, Settings, Sheet, SolveContext,
    UnitPiece,
};

/// A partial layout in the beam.
#[derive(Debug, Clone)]
struct Candidate {
    sheets: Vec<Arc<Sheet>>,
    /// Indices into the ordered piece list.
    unplaced: Vec<usize>,
    /// Sum of placed areas.
    score: f64,
    /// Accumulated fit waste of the chosen free rectangles.
    waste: f64,
    /// Position among the candidates generated at this depth.
    rank: usize,
}

impl Candidate {
    fn empty() -> Self {
        Self {
            sheets: Vec::new(),
            unplaced: Vec::new(),
            score: 0.0,
            waste: 0.0,
            rank: 0,
        }
    }

    fn with_placement(
        &self,
        sheet_index: usize,
        free_index: usize,
        piece: &UnitPiece,
        orientation: Orientation,
        kerf: f64,
    ) -> Self {
        let mut child = self.clone();
        let sheet = Arc::make_mut(&mut child.sheets[sheet_index]);
        let waste = sheet.free[free_index].fit_waste(orientation.width, orientation.height);
        sheet.place(free_index, piece, orientation, kerf);
        child.score += piece.area();
        child.waste += waste;
        child
    }

    /// Orders candidates best first.
    fn compare(&self, other: &Self) -> Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then(self.sheets.len().cmp(&other.sheets.len()))
            .then(self.waste.partial_cmp(&other.waste).unwrap_or(Ordering::Equal))
            .then(self.rank.cmp(&other.rank))
    }

    fn into_sheets(self) -> Vec<Sheet> {
        self.sheets
            .into_iter()
            .map(|sheet| Arc::try_unwrap(sheet).unwrap_or_else(|shared| (*shared).clone()))
            .collect()
    }
}

/// Beam search over guillotine placements with lazy sheet opening.
#[derive(Debug, Clone)]
pub struct BeamSearchGuillotine {
    beam_width: usize,
}

impl Default for BeamSearchGuillotine {
    fn default() -> Self {
        Self::with_config(&EngineConfig::default())
    }
}

impl BeamSearchGuillotine {
    /// Registry name.
    pub const NAME: &'static str = "beam-search-guillotine";

    /// Creates the strategy with the given beam width.
    pub fn new(beam_width: usize) -> Self {
        Self {
            beam_width: beam_width.max(1),
        }
    }

    /// Creates the strategy from engine settings.
    pub fn with_config(config: &EngineConfig) -> Self {
        Self::new(config.beam_width)
    }

    /// Candidates kept between depths.
    pub fn beam_width(&self) -> usize {
        self.beam_width
    }

    fn expand(
        candidate: &Candidate,
        piece: &UnitPiece,
        piece_index: usize,
        panel: &Panel,
        kerf: f64,
    ) -> Vec<Candidate> {
        let mut children = Vec::new();
        for (sheet_index, sheet) in candidate.sheets.iter().enumerate() {
            for (free_index, free) in sheet.free.iter().enumerate() {
                for orientation in piece.orientations(true) {
                    if free.fits(orientation.width, orientation.height) {
                        children.push(candidate.with_placement(
                            sheet_index,
                            free_index,
                            piece,
                            orientation,
                            kerf,
                        ));
                    }
                }
            }
        }
        if !children.is_empty() {
            return children;
        }

        if panel.can_host(piece, true) {
            let mut opened = candidate.clone();
            opened
                .sheets
                .push(Arc::new(Sheet::new(candidate.sheets.len(), panel)));
            let sheet_index = opened.sheets.len() - 1;
            for orientation in piece.orientations(true) {
                if panel.fits(orientation.width, orientation.height) {
                    children.push(opened.with_placement(sheet_index, 0, piece, orientation, kerf));
                }
            }
        } else {
            let mut skipped = candidate.clone();
            skipped.unplaced.push(piece_index);
            children.push(skipped);
        }
        children
    }
}

impl PlacementStrategy for BeamSearchGuillotine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn info(&self) -> AlgorithmInfo {
        AlgorithmInfo {
            name: Self::NAME.to_string(),
            description: format!(
                "Beam search keeping the {} best partial layouts per piece",
                self.beam_width
            ),
            supports_rotation: true,
            supports_multi_sheet: true,
            estimated_time: EstimatedTime::Medium,
        }
    }

    fn execute(
        &self,
        pieces: &[UnitPiece],
        panels: &[Panel],
        settings: &Settings,
        ctx: &mut SolveContext<'_>,
    ) -> Result<PlacementResult> {
        let start = Instant::now();
        let panel = *primary_panel(panels)?;
        let kerf = settings.kerf;

        let mut order = pieces.to_vec();
        sort_by_priority(&mut order);

        let mut beam = vec![Candidate::empty()];
        let mut depth = 0;
        while depth < order.len() {
            if ctx.deadline.expired() {
                log::debug!("Beam search deadline reached at depth {}/{}", depth, order.len());
                break;
            }

            let piece = &order[depth];
            let mut next: Vec<Candidate> = beam
                .par_iter()
                .map(|candidate| Self::expand(candidate, piece, depth, &panel, kerf))
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .collect();

            if next.is_empty() {
                return Err(Error::ExecutionError(format!(
                    "Beam emptied at depth {} (piece '{}')",
                    depth, piece.id
                )));
            }

            for (rank, candidate) in next.iter_mut().enumerate() {
                candidate.rank = rank;
            }
            next.sort_by(Candidate::compare);
            next.truncate(self.beam_width);
            beam = next;
            depth += 1;
        }

        let best = beam
            .into_iter()
            .next()
            .ok_or_else(|| Error::ExecutionError("Beam search produced no candidate".to_string()))?;
        let mut unused: Vec<UnitPiece> = best.unplaced.iter().map(|&i| order[i].clone()).collect();

        let mut layout = Layout::from_sheets(panel, kerf, best.into_sheets());
        for piece in &order[depth..] {
            if !layout.place_best_fit(piece, true) {
                unused.push(piece.clone());
            }
        }

        log::debug!(
            "Beam search finished: {} sheets, {} unused",
            layout.sheet_count(),
            unused.len()
        );

        Ok(
            PlacementResult::from_sheets(layout.sheets(), unused, &panel, settings, Self::NAME)
                .with_execution_time(start.elapsed().as_millis() as u64),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use u_cutstock_core::{expand, Deadline, Piece};

    fn run_with(
        strategy: &BeamSearchGuillotine,
        pieces: &[Piece],
        panel: Panel,
        settings: Settings,
    ) -> PlacementResult {
        let units = expand(pieces);
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = SolveContext::new(&mut rng, &settings);
        strategy.execute(&units, &[panel], &settings, &mut ctx).unwrap()
    }

    #[test]
    fn test_places_all_fitting_pieces() {
        let result = run_with(
            &BeamSearchGuillotine::default(),
            &[
                Piece::new("A", 50.0, 50.0).with_quantity(4),
                Piece::new("B", 100.0, 25.0).with_quantity(2),
            ],
            Panel::new(100.0, 150.0),
            Settings::new(),
        );

        assert!(result.all_placed());
        assert_eq!(result.sheet_count, 1);
        assert!(result.validate(&Panel::new(100.0, 150.0)).is_ok());
    }

    #[test]
    fn test_rotation_is_used_when_required() {
        let result = run_with(
            &BeamSearchGuillotine::default(),
            &[Piece::new("long", 200.0, 40.0).with_rotation(true)],
            Panel::new(100.0, 300.0),
            Settings::new(),
        );

        assert_eq!(result.placed_count(), 1);
        assert!(result.placed_pieces[0].rotated);
    }

    #[test]
    fn test_oversized_piece_reported_once() {
        let result = run_with(
            &BeamSearchGuillotine::new(3),
            &[
                Piece::new("huge", 500.0, 500.0),
                Piece::new("A", 10.0, 10.0).with_quantity(2),
            ],
            Panel::new(100.0, 100.0),
            Settings::new(),
        );

        assert_eq!(result.unused_pieces.len(), 1);
        assert_eq!(result.unused_pieces[0].id, "huge");
        assert_eq!(result.sheet_count, 1);
    }

    #[test]
    fn test_opens_second_sheet() {
        let result = run_with(
            &BeamSearchGuillotine::default(),
            &[Piece::new("sq", 100.0, 100.0).with_quantity(2)],
            Panel::new(150.0, 100.0),
            Settings::new(),
        );

        assert_eq!(result.sheet_count, 2);
        assert_relative_eq!(result.efficiency, 20_000.0 / 30_000.0);
    }

    #[test]
    fn test_expired_deadline_completes_greedily() {
        let pieces = expand(&[Piece::new("A", 30.0, 30.0).with_quantity(6)]);
        let panel = Panel::new(100.0, 100.0);
        let settings = Settings::new();
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = SolveContext::new(&mut rng, &settings).with_deadline(Deadline::new(Some(0)));

        let result = BeamSearchGuillotine::default()
            .execute(&pieces, &[panel], &settings, &mut ctx)
            .unwrap();

        assert!(result.all_placed());
        assert!(result.validate(&panel).is_ok());
    }

    #[test]
    fn test_beam_width_one() {
        let panel = Panel::new(120.0, 120.0);
        let pieces = [
            Piece::new("A", 60.0, 40.0).with_quantity(3),
            Piece::new("B", 30.0, 20.0).with_quantity(5).with_rotation(true),
        ];
        let result = run_with(&BeamSearchGuillotine::new(1), &pieces, panel, Settings::new().with_kerf(2.0));

        assert!(result.all_placed());
        assert!(result.validate(&panel).is_ok());
        assert_eq!(BeamSearchGuillotine::new(0).beam_width(), 1);
    }

    #[test]
    fn test_priority_controls_placement_order() {
        let result = run_with(
            &BeamSearchGuillotine::new(1),
            &[
                Piece::new("big", 60.0, 60.0),
                Piece::new("small", 10.0, 10.0).with_priority(5),
            ],
            Panel::new(100.0, 100.0),
            Settings::new(),
        );

        let small = result
            .placed_pieces
            .iter()
            .find(|p| p.id == "small")
            .unwrap();
        assert_eq!((small.sheet_index, small.x, small.y), (0, 0.0, 0.0));
        let big = result.placed_pieces.iter().find(|p| p.id == "big").unwrap();
        assert!(big.x > 0.0 || big.y > 0.0);
    }
}
