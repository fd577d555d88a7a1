//! Strategy registry and optimization manager.

use crate::beam_cutting::BeamSearchGuillotine;
use crate::ffd_cutting::FirstFitDecreasing;
use crate::ga_cutting::GeneticSearch;
use crate::hybrid_cutting::HybridLocalSearch;
use crate::request::OptimizationRequest;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::HashSet;
use std::time::Instant;
use u_cutstock_core::{
    expand, AlgorithmInfo, Deadline, EngineConfig, Error, InstanceKey, Panel, PlacementResult,
    PlacementStrategy, Result, SolveContext, UnitPiece,
};

/// Named strategies in priority order.
///
/// The first registered strategy is the default. Lookups ignore case.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn PlacementStrategy>>,
}

impl StrategyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the four built-in strategies.
    ///
    /// Priority order: beam search, hybrid local search, first-fit-decreasing,
    /// genetic search.
    pub fn with_defaults(config: &EngineConfig) -> Self {
        let mut registry = Self::new();
        registry.register(BeamSearchGuillotine::with_config(config));
        registry.register(HybridLocalSearch::with_config(config));
        registry.register(FirstFitDecreasing::new());
        registry.register(GeneticSearch::with_config(config));
        registry
    }

    /// Adds a strategy at the end of the priority order, or replaces the
    /// strategy of the same name in place.
    pub fn register<S: PlacementStrategy + 'static>(&mut self, strategy: S) {
        let boxed: Box<dyn PlacementStrategy> = Box::new(strategy);
        match self.position(boxed.name()) {
            Some(index) => self.strategies[index] = boxed,
            None => self.strategies.push(boxed),
        }
    }

    /// Looks up a strategy by name.
    pub fn get(&self, name: &str) -> Option<&dyn PlacementStrategy> {
        self.position(name).map(|i| self.strategies[i].as_ref())
    }

    /// The highest-priority strategy.
    pub fn default_strategy(&self) -> Option<&dyn PlacementStrategy> {
        self.strategies.first().map(|s| s.as_ref())
    }

    /// Strategies in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn PlacementStrategy> {
        self.strategies.iter().map(|s| s.as_ref())
    }

    /// Strategy names in priority order.
    pub fn priority(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Number of registered strategies.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns true if no strategy is registered.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.strategies
            .iter()
            .position(|s| s.name().eq_ignore_ascii_case(name))
    }
}

/// Returns true if some piece allows rotation and fits the panel only when rotated.
pub fn requires_rotation(pieces: &[UnitPiece], panel: &Panel) -> bool {
    pieces.iter().any(|p| panel.needs_rotation(p))
}

/// Returns true if the pieces cover more than `threshold` of one panel.
pub fn requires_multi_sheet(pieces: &[UnitPiece], panel: &Panel, threshold: f64) -> bool {
    let total: f64 = pieces.iter().map(UnitPiece::area).sum();
    total > threshold * panel.area()
}

/// Selects, runs and validates placement strategies.
pub struct OptimizationManager {
    registry: StrategyRegistry,
    config: EngineConfig,
}

impl Default for OptimizationManager {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl OptimizationManager {
    /// Creates a manager over an explicit registry.
    pub fn new(registry: StrategyRegistry, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    /// Creates a manager with the built-in strategies.
    pub fn with_config(config: EngineConfig) -> Self {
        Self::new(StrategyRegistry::with_defaults(&config), config)
    }

    /// The strategy registry.
    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Descriptions of all registered strategies in priority order.
    pub fn list_algorithms(&self) -> Vec<AlgorithmInfo> {
        self.registry.iter().map(|s| s.info()).collect()
    }

    /// Checks that `strategy` can handle the request's pieces.
    pub fn check_compatibility(
        &self,
        strategy: &dyn PlacementStrategy,
        pieces: &[UnitPiece],
        panel: &Panel,
    ) -> Result<()> {
        let info = strategy.info();
        if !info.supports_rotation && requires_rotation(pieces, panel) {
            return Err(Error::ConfigError(format!(
                "Strategy '{}' does not support rotation, which this request requires",
                info.name
            )));
        }
        if !info.supports_multi_sheet
            && requires_multi_sheet(pieces, panel, self.config.multi_sheet_threshold)
        {
            return Err(Error::ConfigError(format!(
                "Strategy '{}' does not support multiple sheets, which this request requires",
                info.name
            )));
        }
        Ok(())
    }

    /// Runs the named strategy without fallback.
    pub fn execute(
        &self,
        name: &str,
        request: &OptimizationRequest,
        rng: &mut dyn RngCore,
    ) -> Result<PlacementResult> {
        request.validate()?;
        let strategy = self
            .registry
            .get(name)
            .ok_or_else(|| Error::ConfigError(format!("Unknown strategy '{}'", name)))?;

        let pieces = expand(&request.pieces);
        let panel = request.panel()?;
        self.check_compatibility(strategy, &pieces, panel)?;

        let mut ctx = SolveContext::new(rng, &request.settings);
        self.run(strategy, &pieces, request, &mut ctx)
    }

    /// Runs the preferred strategy, falling back through the remaining
    /// compatible strategies in priority order.
    ///
    /// An unknown or missing preferred name selects the default strategy. If
    /// the selected strategy is incompatible with the request a configuration
    /// error is returned without trying others.
    pub fn execute_with_fallback(
        &self,
        request: &OptimizationRequest,
        preferred: Option<&str>,
        rng: &mut dyn RngCore,
    ) -> Result<PlacementResult> {
        request.validate()?;
        let primary = self.resolve(preferred)?;

        let pieces = expand(&request.pieces);
        let panel = request.panel()?;
        self.check_compatibility(primary, &pieces, panel)?;

        let chain = std::iter::once(primary).chain(self.registry.iter().filter(|s| {
            !s.name().eq_ignore_ascii_case(primary.name())
                && self.check_compatibility(*s, &pieces, panel).is_ok()
        }));

        let mut ctx = SolveContext {
            rng,
            deadline: Deadline::new(request.settings.timeout_ms),
        };
        let mut attempted = Vec::new();
        let mut last_error = None;
        for strategy in chain {
            log::info!("Running strategy '{}'", strategy.name());
            match self.run(strategy, &pieces, request, &mut ctx) {
                Ok(result) => return Ok(result),
                Err(e) => {
                    log::warn!("Strategy '{}' failed: {}", strategy.name(), e);
                    attempted.push(strategy.name().to_string());
                    last_error = Some(e);
                }
            }
        }

        Err(Error::Exhausted {
            attempted,
            last: Box::new(last_error.unwrap_or_else(|| {
                Error::ExecutionError("No strategy was attempted".to_string())
            })),
        })
    }

    /// Runs the request's preferred strategy with fallback, seeding the
    /// random source from the request when a seed is given.
    pub fn run_optimization(&self, request: &OptimizationRequest) -> Result<PlacementResult> {
        let mut rng = match request.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.execute_with_fallback(request, request.algorithm.as_deref(), &mut rng)
    }

    fn resolve(&self, preferred: Option<&str>) -> Result<&dyn PlacementStrategy> {
        if let Some(name) = preferred {
            if let Some(strategy) = self.registry.get(name) {
                return Ok(strategy);
            }
            log::warn!("Unknown strategy '{}', using the default", name);
        }
        self.registry
            .default_strategy()
            .ok_or_else(|| Error::ConfigError("No strategies registered".to_string()))
    }

    fn run(
        &self,
        strategy: &dyn PlacementStrategy,
        pieces: &[UnitPiece],
        request: &OptimizationRequest,
        ctx: &mut SolveContext<'_>,
    ) -> Result<PlacementResult> {
        let start = Instant::now();
        let result = strategy.execute(pieces, &request.panels, &request.settings, ctx)?;
        result.validate(request.panel()?)?;
        check_accounting(&result, pieces)?;

        log::info!(
            "Strategy '{}' placed {}/{} pieces on {} sheets ({}) in {} ms",
            strategy.name(),
            result.placed_count(),
            pieces.len(),
            result.sheet_count,
            result.efficiency_percent(),
            start.elapsed().as_millis()
        );
        Ok(result)
    }
}

/// Every unit piece must appear exactly once, placed or unused.
fn check_accounting(result: &PlacementResult, pieces: &[UnitPiece]) -> Result<()> {
    let mut seen: HashSet<InstanceKey> = HashSet::with_capacity(pieces.len());
    let keys = result
        .placed_pieces
        .iter()
        .map(|p| p.key)
        .chain(result.unused_pieces.iter().map(|p| p.key));
    for key in keys {
        if !seen.insert(key) {
            return Err(Error::ExecutionError(format!(
                "Piece {} reported more than once",
                key
            )));
        }
    }
    if seen.len() != pieces.len() || pieces.iter().any(|p| !seen.contains(&p.key)) {
        return Err(Error::ExecutionError(format!(
            "Result accounts for {} of {} pieces",
            seen.len(),
            pieces.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_cutstock_core::Piece;

    #[test]
    fn test_default_priority_order() {
        let registry = StrategyRegistry::with_defaults(&EngineConfig::default());

        assert_eq!(
            registry.priority(),
            vec![
                "beam-search-guillotine",
                "hybrid-local-search",
                "first-fit-decreasing",
                "genetic-search"
            ]
        );
        assert_eq!(
            registry.default_strategy().map(|s| s.name()),
            Some("beam-search-guillotine")
        );
    }

    #[test]
    fn test_lookup_ignores_case() {
        let registry = StrategyRegistry::with_defaults(&EngineConfig::default());

        assert!(registry.get("First-Fit-Decreasing").is_some());
        assert!(registry.get("simulated-annealing").is_none());
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = StrategyRegistry::with_defaults(&EngineConfig::default());
        registry.register(BeamSearchGuillotine::new(3));

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.priority()[0], BeamSearchGuillotine::NAME);
        assert!(registry
            .get(BeamSearchGuillotine::NAME)
            .is_some_and(|s| s.info().description.contains(" 3 ")));
    }

    #[test]
    fn test_requirements() {
        let panel = Panel::new(300.0, 500.0);
        let rotating = expand(&[Piece::new("wide", 400.0, 100.0).with_rotation(true)]);
        let plain = expand(&[Piece::new("small", 100.0, 100.0).with_quantity(13)]);

        assert!(requires_rotation(&rotating, &panel));
        assert!(!requires_rotation(&plain, &panel));
        assert!(requires_multi_sheet(&plain, &panel, 0.8));
        assert!(!requires_multi_sheet(&plain[..12], &panel, 0.8));
    }

    #[test]
    fn test_accounting_detects_missing_pieces() {
        let pieces = expand(&[Piece::new("A", 10.0, 10.0).with_quantity(2)]);
        let panel = Panel::new(100.0, 100.0);
        let result = PlacementResult::from_sheets(
            &[],
            pieces[..1].to_vec(),
            &panel,
            &Default::default(),
            "test",
        );

        assert!(check_accounting(&result, &pieces).is_err());
    }
}
