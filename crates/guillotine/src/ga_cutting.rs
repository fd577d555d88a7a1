//! Genetic search over complete placement lists.
//!
//! An individual is a full layout: the list of placed pieces with their
//! sheet, position and orientation. Crossover splices two parents' lists at
//! a single point. Mutation exchanges positions, flips orientations and
//! jitters pieces. After every operator the child is validated: placements
//! that left the panel or crowd another piece are dropped and re-inserted
//! first-fit into the rebuilt free space.

use rand::prelude::*;
use std::collections::HashSet;
use std::time::Instant;
use u_cutstock_core::ga::{GaConfig, GaProblem, GaRunner, Individual};
use u_cutstock_core::{
    is_feasible, primary_panel, sort_by_priority, AlgorithmInfo, EngineConfig, Error,
    EstimatedTime, InstanceKey, Layout, Orientation, Panel, PlacedPiece, PlacementResult,
    PlacementStrategy, Result, Settings, SolveContext, UnitPiece,
};

/// A candidate layout.
#[derive(Debug, Clone)]
pub struct CuttingIndividual {
    /// Placements across all sheets.
    pub placements: Vec<PlacedPiece>,
    fitness: f64,
    efficiency: f64,
    sheet_count: usize,
}

impl CuttingIndividual {
    fn new(placements: Vec<PlacedPiece>) -> Self {
        Self {
            placements,
            fitness: f64::NEG_INFINITY,
            efficiency: 0.0,
            sheet_count: 0,
        }
    }

    /// Used area over the area of all opened sheets.
    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    /// Sheets opened by this layout.
    pub fn sheet_count(&self) -> usize {
        self.sheet_count
    }
}

impl Individual for CuttingIndividual {
    fn fitness(&self) -> f64 {
        self.fitness
    }
}

/// Problem definition for genetic cutting-stock search.
pub struct CuttingProblem {
    /// Pieces in priority order.
    pieces: Vec<UnitPiece>,
    panel: Panel,
    kerf: f64,
    config: EngineConfig,
}

impl CuttingProblem {
    /// Creates a new problem; `pieces` are sorted by priority.
    pub fn new(pieces: &[UnitPiece], panel: Panel, kerf: f64, config: EngineConfig) -> Self {
        let mut pieces = pieces.to_vec();
        sort_by_priority(&mut pieces);
        Self {
            pieces,
            panel,
            kerf,
            config,
        }
    }

    fn can_flip(&self, placed: &PlacedPiece) -> bool {
        self.piece(placed.key)
            .map_or(false, |p| p.orientations(true).count() > 1)
    }

    fn piece(&self, key: InstanceKey) -> Option<&UnitPiece> {
        self.pieces.iter().find(|p| p.key == key)
    }

    /// Orientations of `piece`, the turned one first if `first_rotated`.
    fn orientations_from(piece: &UnitPiece, first_rotated: bool) -> Vec<Orientation> {
        let mut all: Vec<Orientation> = piece.orientations(true).collect();
        if first_rotated {
            all.reverse();
        }
        all
    }

    /// Builds a layout by first fit in priority order with random orientations.
    pub fn random_layout<R: Rng + ?Sized>(&self, rng: &mut R) -> CuttingIndividual {
        let mut layout = Layout::new(self.panel, self.kerf);
        for piece in &self.pieces {
            let orientations = Self::orientations_from(piece, rng.gen_bool(0.5));
            layout.place_first_fit(piece, &orientations);
        }
        CuttingIndividual::new(layout.placements().cloned().collect())
    }

    /// Drops duplicates and infeasible placements, re-inserts every missing
    /// piece first fit and removes empty sheets.
    pub fn repair(&self, placements: Vec<PlacedPiece>) -> Vec<PlacedPiece> {
        let mut seen = HashSet::new();
        let mut accepted: Vec<PlacedPiece> = Vec::with_capacity(placements.len());
        for placed in placements {
            if !seen.insert(placed.key) {
                continue;
            }
            let feasible = {
                let same_sheet: Vec<PlacedPiece> = accepted
                    .iter()
                    .filter(|p| p.sheet_index == placed.sheet_index)
                    .cloned()
                    .collect();
                is_feasible(&placed, &same_sheet, &self.panel)
            };
            if feasible {
                accepted.push(placed);
            } else {
                seen.remove(&placed.key);
            }
        }

        let mut layout = Layout::from_placements(self.panel, self.kerf, accepted);
        for piece in &self.pieces {
            if !seen.contains(&piece.key) {
                let orientations: Vec<Orientation> = piece.orientations(true).collect();
                layout.place_first_fit(piece, &orientations);
            }
        }
        layout.compact();
        layout.placements().cloned().collect()
    }

    /// Pieces missing from a layout.
    pub fn unused(&self, placements: &[PlacedPiece]) -> Vec<UnitPiece> {
        let placed: HashSet<InstanceKey> = placements.iter().map(|p| p.key).collect();
        self.pieces
            .iter()
            .filter(|p| !placed.contains(&p.key))
            .cloned()
            .collect()
    }
}

impl GaProblem for CuttingProblem {
    type Individual = CuttingIndividual;

    fn initialize_population<R: Rng + ?Sized>(&self, size: usize, rng: &mut R) -> Vec<CuttingIndividual> {
        (0..size).map(|_| self.random_layout(rng)).collect()
    }

    fn evaluate(&self, individual: &mut CuttingIndividual) {
        let sheet_count = individual
            .placements
            .iter()
            .map(|p| p.sheet_index + 1)
            .max()
            .unwrap_or(0);
        let used: f64 = individual.placements.iter().map(PlacedPiece::area).sum();
        let total = self.panel.area() * sheet_count as f64;

        individual.sheet_count = sheet_count;
        individual.efficiency = if total > 0.0 { used / total } else { 0.0 };
        individual.fitness = if sheet_count > 0 {
            0.8 * individual.efficiency + 0.2 / sheet_count as f64
        } else {
            0.0
        };
    }

    fn crossover<R: Rng + ?Sized>(
        &self,
        a: &CuttingIndividual,
        b: &CuttingIndividual,
        rng: &mut R,
    ) -> CuttingIndividual {
        let shorter = a.placements.len().min(b.placements.len());
        let point = rng.gen_range(0..=shorter);

        let spliced: Vec<PlacedPiece> = a.placements[..point]
            .iter()
            .chain(&b.placements[point..])
            .cloned()
            .collect();
        CuttingIndividual::new(self.repair(spliced))
    }

    fn mutate<R: Rng + ?Sized>(&self, individual: &mut CuttingIndividual, rng: &mut R) {
        let placements = &mut individual.placements;
        let mut changed = false;

        if placements.len() >= 2 && rng.gen::<f64>() < self.config.swap_mutation_rate {
            let i = rng.gen_range(0..placements.len());
            let j = rng.gen_range(0..placements.len());
            if i != j {
                let (xi, yi, si) = (placements[i].x, placements[i].y, placements[i].sheet_index);
                let (xj, yj, sj) = (placements[j].x, placements[j].y, placements[j].sheet_index);
                placements[i].x = xj;
                placements[i].y = yj;
                placements[i].sheet_index = sj;
                placements[j].x = xi;
                placements[j].y = yi;
                placements[j].sheet_index = si;
                changed = true;
            }
        }

        let max_dx = self.panel.width * self.config.jitter_fraction;
        let max_dy = self.panel.height * self.config.jitter_fraction;
        for k in 0..placements.len() {
            if rng.gen::<f64>() < self.config.rotation_mutation_rate && self.can_flip(&placements[k]) {
                placements[k].flip();
                changed = true;
            }
            if rng.gen::<f64>() < self.config.jitter_mutation_rate {
                let placed = &mut placements[k];
                placed.x = (placed.x + rng.gen_range(-1.0..=1.0) * max_dx).max(0.0);
                placed.y = (placed.y + rng.gen_range(-1.0..=1.0) * max_dy).max(0.0);
                changed = true;
            }
        }

        if changed {
            let repaired = self.repair(std::mem::take(&mut individual.placements));
            *individual = CuttingIndividual::new(repaired);
        }
    }

    fn is_satisfied(&self, best: &CuttingIndividual) -> bool {
        best.efficiency > self.config.target_efficiency
    }

    fn on_generation(&self, generation: u32, best: &CuttingIndividual, _population: &[CuttingIndividual]) {
        log::debug!(
            "GA cutting generation {}: fitness={:.4}, efficiency={:.4}, sheets={}",
            generation,
            best.fitness,
            best.efficiency,
            best.sheet_count
        );
    }
}

/// Genetic search over full layouts.
#[derive(Debug, Clone)]
pub struct GeneticSearch {
    config: EngineConfig,
}

impl Default for GeneticSearch {
    fn default() -> Self {
        Self::with_config(&EngineConfig::default())
    }
}

impl GeneticSearch {
    /// Registry name.
    pub const NAME: &'static str = "genetic-search";

    /// Creates the strategy from engine settings.
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn ga_config(&self, ctx: &SolveContext<'_>) -> GaConfig {
        let mut config = GaConfig::new()
            .with_population_size(self.config.population_size)
            .with_max_generations(self.config.max_generations)
            .with_elite_count(self.config.elite_count)
            .with_tournament_size(self.config.tournament_size)
            .with_crossover_rate(1.0)
            .with_stagnation_limit(None);
        if let Some(remaining) = ctx.deadline.remaining() {
            config = config.with_time_limit(remaining);
        }
        config
    }
}

impl PlacementStrategy for GeneticSearch {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn info(&self) -> AlgorithmInfo {
        AlgorithmInfo {
            name: Self::NAME.to_string(),
            description: format!(
                "Genetic search over full layouts ({} individuals, {} generations)",
                self.config.population_size, self.config.max_generations
            ),
            supports_rotation: true,
            supports_multi_sheet: true,
            estimated_time: EstimatedTime::Slow,
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
        let problem = CuttingProblem::new(pieces, panel, settings.kerf, self.config.clone());
        let runner = GaRunner::new(self.ga_config(ctx), problem);

        let ga_result = runner
            .run_with_rng(&mut *ctx.rng)
            .ok_or_else(|| Error::ExecutionError("Genetic search produced no population".to_string()))?;
        log::debug!(
            "Genetic search: {} generations, target reached: {}",
            ga_result.generations,
            ga_result.target_reached
        );

        let problem = runner.problem();
        let unused = problem.unused(&ga_result.best.placements);
        let layout = Layout::from_placements(panel, settings.kerf, ga_result.best.placements);

        Ok(
            PlacementResult::from_sheets(layout.sheets(), unused, &panel, settings, Self::NAME)
                .with_execution_time(start.elapsed().as_millis() as u64),
        )
    }
}
