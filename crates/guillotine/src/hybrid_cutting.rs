//! Constructive placement followed by pairwise-exchange local search.

use std::time::Instant;
use u_cutstock_core::{
    extent_of, is_feasible, primary_panel, sort_by_priority, AlgorithmInfo, EngineConfig,
    EstimatedTime, Layout, Orientation, Panel, PlacedPiece, PlacementResult, PlacementStrategy,
    Result, Settings, Sheet, SolveContext, UnitPiece, EPSILON,
};

/// Hybrid constructive heuristic with local search.
#[derive(Debug, Clone)]
pub struct HybridLocalSearch {
    max_passes: u32,
}

impl Default for HybridLocalSearch {
    fn default() -> Self {
        Self::with_config(&EngineConfig::default())
    }
}

impl HybridLocalSearch {
    /// Registry name.
    pub const NAME: &'static str = "hybrid-local-search";

    /// Creates the strategy with a pass limit.
    pub fn new(max_passes: u32) -> Self {
        Self { max_passes }
    }

    /// Creates the strategy from engine settings.
    pub fn with_config(config: &EngineConfig) -> Self {
        Self::new(config.local_search_passes)
    }
}

/// Places `piece` on the most recent sheet, then any other sheet, then a new one.
fn place_constructive(layout: &mut Layout, piece: &UnitPiece, orientations: &[Orientation]) -> bool {
    let current = layout.sheet_count().checked_sub(1);
    let sheets = current
        .into_iter()
        .chain((0..layout.sheet_count()).filter(|&i| Some(i) != current));

    for sheet in sheets {
        for &orientation in orientations {
            if let Some(free) = layout.sheets()[sheet].first_fit(orientation) {
                layout.place(sheet, free, piece, orientation);
                return true;
            }
        }
    }

    let Some(&orientation) = orientations
        .iter()
        .find(|o| layout.panel().fits(o.width, o.height))
    else {
        return false;
    };
    let sheet = layout.open_sheet();
    layout.place(sheet, 0, piece, orientation);
    true
}

/// Placed area over the area of the placements' bounding extent.
fn compactness(placed: &[PlacedPiece]) -> (f64, f64) {
    let used: f64 = placed.iter().map(PlacedPiece::area).sum();
    (used, extent_of(placed).area())
}

fn combined_ratio(a: (f64, f64), b: (f64, f64)) -> f64 {
    let extent = a.1 + b.1;
    if extent > 0.0 {
        (a.0 + b.0) / extent
    } else {
        0.0
    }
}

/// Tries to exchange the positions of `sheets[a].placed[i]` and `sheets[b].placed[j]`.
///
/// The exchange is committed only if both pieces stay inside the panel,
/// overlap no other piece on their new sheet and the combined compactness of
/// both sheets strictly improves.
fn try_exchange(sheets: &mut [Sheet], a: usize, i: usize, b: usize, j: usize, panel: &Panel) -> bool {
    let first = &sheets[a].placed[i];
    let second = &sheets[b].placed[j];

    let mut moved_first = first.clone();
    moved_first.x = second.x;
    moved_first.y = second.y;
    moved_first.sheet_index = b;

    let mut moved_second = second.clone();
    moved_second.x = first.x;
    moved_second.y = first.y;
    moved_second.sheet_index = a;

    let mut next_a = sheets[a].placed.clone();
    next_a[i] = moved_second;
    let mut next_b = sheets[b].placed.clone();
    next_b[j] = moved_first;

    let others_a: Vec<PlacedPiece> = exclude(&next_a, i);
    let others_b: Vec<PlacedPiece> = exclude(&next_b, j);
    if !is_feasible(&next_a[i], &others_a, panel) || !is_feasible(&next_b[j], &others_b, panel) {
        return false;
    }

    let before = combined_ratio(compactness(&sheets[a].placed), compactness(&sheets[b].placed));
    let after = combined_ratio(compactness(&next_a), compactness(&next_b));
    if after <= before + EPSILON {
        return false;
    }

    sheets[a].placed = next_a;
    sheets[b].placed = next_b;
    true
}

fn exclude(placed: &[PlacedPiece], index: usize) -> Vec<PlacedPiece> {
    placed
        .iter()
        .enumerate()
        .filter(|&(k, _)| k != index)
        .map(|(_, p)| p.clone())
        .collect()
}

/// Runs exchange passes until one finds no improvement, the pass limit is hit
/// or the deadline expires. Returns the number of committed exchanges.
fn local_search(sheets: &mut [Sheet], panel: &Panel, max_passes: u32, ctx: &SolveContext<'_>) -> usize {
    let mut exchanges = 0;
    for pass in 0..max_passes {
        if ctx.deadline.expired() {
            log::debug!("Hybrid local search deadline reached at pass {}", pass);
            break;
        }

        let mut improved = false;
        for a in 0..sheets.len() {
            for b in (a + 1)..sheets.len() {
                for i in 0..sheets[a].placed.len() {
                    for j in 0..sheets[b].placed.len() {
                        if try_exchange(sheets, a, i, b, j, panel) {
                            improved = true;
                            exchanges += 1;
                        }
                    }
                }
            }
        }

        if !improved {
            break;
        }
    }
    exchanges
}

impl PlacementStrategy for HybridLocalSearch {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn info(&self) -> AlgorithmInfo {
        AlgorithmInfo {
            name: Self::NAME.to_string(),
            description: "Priority-ordered first fit refined by cross-sheet exchanges".to_string(),
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

        let mut layout = Layout::new(panel, kerf);
        let mut unused = Vec::new();
        for piece in order {
            let orientations: Vec<Orientation> = piece.orientations(true).collect();
            if !place_constructive(&mut layout, &piece, &orientations) {
                unused.push(piece);
            }
        }

        let mut sheets = layout.into_sheets();
        let exchanges = local_search(&mut sheets, &panel, self.max_passes, ctx);
        if exchanges > 0 {
            for sheet in &mut sheets {
                sheet.rebuild_free_space(&panel, kerf);
            }
        }
        log::debug!(
            "Hybrid search: {} sheets, {} exchanges, {} unused",
            sheets.len(),
            exchanges,
            unused.len()
        );

        Ok(
            PlacementResult::from_sheets(&sheets, unused, &panel, settings, Self::NAME)
                .with_execution_time(start.elapsed().as_millis() as u64),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use u_cutstock_core::{expand, Piece};

    fn run(pieces: &[Piece], panel: Panel, settings: Settings) -> PlacementResult {
        let units = expand(pieces);
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = SolveContext::new(&mut rng, &settings);
        HybridLocalSearch::default()
            .execute(&units, &[panel], &settings, &mut ctx)
            .unwrap()
    }

    fn placed(sheets: &mut [Sheet], sheet: usize, w: f64, h: f64, x: f64, y: f64) {
        let unit = expand(&[Piece::new(format!("{w}x{h}"), w, h)]).remove(0);
        sheets[sheet]
            .placed
            .push(PlacedPiece::new(&unit, x, y, unit.upright(), sheet));
    }

    #[test]
    fn test_constructive_prefers_current_sheet() {
        let panel = Panel::new(100.0, 100.0);
        let units = expand(&[
            Piece::new("big", 100.0, 60.0).with_quantity(2),
            Piece::new("small", 20.0, 20.0),
        ]);
        let mut layout = Layout::new(panel, 0.0);
        for unit in &units {
            let orientations: Vec<Orientation> = unit.orientations(true).collect();
            assert!(place_constructive(&mut layout, unit, &orientations));
        }

        assert_eq!(layout.sheet_count(), 2);
        let small = layout.placements().find(|p| p.id == "small").unwrap();
        assert_eq!(small.sheet_index, 1);
    }

    #[test]
    fn test_constructive_rotates_before_moving_on() {
        let panel = Panel::new(100.0, 100.0);
        let units = expand(&[
            Piece::new("base", 100.0, 70.0),
            Piece::new("bar", 30.0, 90.0).with_rotation(true),
        ]);
        let mut layout = Layout::new(panel, 0.0);
        for unit in &units {
            let orientations: Vec<Orientation> = unit.orientations(true).collect();
            place_constructive(&mut layout, unit, &orientations);
        }

        assert_eq!(layout.sheet_count(), 1);
        let bar = layout.placements().find(|p| p.id == "bar").unwrap();
        assert!(bar.rotated);
        assert_eq!((bar.x, bar.y), (0.0, 70.0));
    }

    #[test]
    fn test_exchange_commits_only_improvements() {
        let panel = Panel::new(100.0, 100.0);
        let mut sheets = vec![Sheet::new(0, &panel), Sheet::new(1, &panel)];
        // Sheet 0: a small piece far from the origin spreads its extent.
        placed(&mut sheets, 0, 10.0, 10.0, 0.0, 0.0);
        placed(&mut sheets, 0, 10.0, 10.0, 80.0, 80.0);
        // Sheet 1: the same small piece at the origin.
        placed(&mut sheets, 1, 10.0, 10.0, 0.0, 0.0);

        let before = combined_ratio(compactness(&sheets[0].placed), compactness(&sheets[1].placed));
        assert!(!try_exchange(&mut sheets, 0, 0, 1, 0, &panel));
        assert!(!try_exchange(&mut sheets, 0, 1, 1, 0, &panel));

        let after = combined_ratio(compactness(&sheets[0].placed), compactness(&sheets[1].placed));
        assert_eq!(before, after);
    }

    #[test]
    fn test_exchange_improves_compactness() {
        let panel = Panel::new(100.0, 100.0);
        let mut sheets = vec![Sheet::new(0, &panel), Sheet::new(1, &panel)];
        placed(&mut sheets, 0, 10.0, 10.0, 0.0, 0.0);
        placed(&mut sheets, 0, 40.0, 40.0, 0.0, 60.0);
        placed(&mut sheets, 1, 10.0, 10.0, 0.0, 0.0);
        placed(&mut sheets, 1, 10.0, 10.0, 0.0, 20.0);

        assert!(try_exchange(&mut sheets, 0, 1, 1, 1, &panel));

        let moved_in = &sheets[1].placed[1];
        assert_eq!((moved_in.width, moved_in.x, moved_in.y), (40.0, 0.0, 20.0));
        assert_eq!(moved_in.sheet_index, 1);
        let moved_out = &sheets[0].placed[1];
        assert_eq!((moved_out.width, moved_out.x, moved_out.y), (10.0, 0.0, 60.0));
        assert_eq!(moved_out.sheet_index, 0);
    }

    #[test]
    fn test_exchange_rejects_overlap() {
        let panel = Panel::new(100.0, 100.0);
        let mut sheets = vec![Sheet::new(0, &panel), Sheet::new(1, &panel)];
        placed(&mut sheets, 0, 10.0, 10.0, 0.0, 0.0);
        placed(&mut sheets, 0, 30.0, 30.0, 60.0, 60.0);
        placed(&mut sheets, 1, 10.0, 10.0, 0.0, 0.0);
        placed(&mut sheets, 1, 10.0, 10.0, 20.0, 0.0);
        placed(&mut sheets, 1, 40.0, 40.0, 0.0, 20.0);
        let before = sheets.clone();

        // The 30x30 piece would land at (20, 0) and cut into the 40x40 piece.
        assert!(!try_exchange(&mut sheets, 0, 1, 1, 1, &panel));
        assert_eq!(sheets, before);
    }

    #[test]
    fn test_hybrid_result_is_valid() {
        let panel = Panel::new(120.0, 80.0);
        let result = run(
            &[
                Piece::new("A", 50.0, 30.0).with_quantity(4).with_rotation(true),
                Piece::new("B", 20.0, 70.0).with_quantity(3).with_rotation(true),
                Piece::new("C", 15.0, 15.0).with_quantity(6),
            ],
            panel,
            Settings::new().with_kerf(2.0),
        );

        assert!(result.validate(&panel).is_ok());
        assert!(result.all_placed());
        assert_eq!(result.algorithm, HybridLocalSearch::NAME);
    }

    #[test]
    fn test_local_search_keeps_piece_count() {
        let panel = Panel::new(100.0, 100.0);
        let mut sheets = vec![Sheet::new(0, &panel), Sheet::new(1, &panel)];
        placed(&mut sheets, 0, 30.0, 30.0, 0.0, 0.0);
        placed(&mut sheets, 0, 10.0, 10.0, 70.0, 70.0);
        placed(&mut sheets, 1, 10.0, 10.0, 0.0, 0.0);
        placed(&mut sheets, 1, 30.0, 30.0, 50.0, 50.0);

        let mut rng = StdRng::seed_from_u64(0);
        let settings = Settings::new();
        let ctx = SolveContext::new(&mut rng, &settings);
        local_search(&mut sheets, &panel, 10, &ctx);

        assert_eq!(sheets[0].placed.len(), 2);
        assert_eq!(sheets[1].placed.len(), 2);
        assert!(sheets[0].placed.iter().all(|p| p.sheet_index == 0));
        assert!(sheets[1].placed.iter().all(|p| p.sheet_index == 1));
    }
}
