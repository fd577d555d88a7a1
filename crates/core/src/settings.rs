//! Request settings and engine tuning parameters.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Preferred ordering of the emitted cut instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CutPreference {
    /// Horizontal cuts first.
    Horizontal,
    /// Vertical cuts first.
    Vertical,
    /// Cut along the longer panel side first.
    #[default]
    #[cfg_attr(feature = "serde", serde(other))]
    Auto,
}

/// Per-request cutting settings.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct Settings {
    /// Blade width consumed by every cut.
    pub kerf: f64,

    /// Panel edge padding. Accepted and validated, but not applied.
    pub padding: f64,

    /// Ordering of the emitted cut instructions.
    pub cut_preference: CutPreference,

    /// Search deadline in milliseconds (None = unlimited).
    #[cfg_attr(feature = "serde", serde(rename = "timeout", alias = "timeoutMs"))]
    pub timeout_ms: Option<u64>,
}

impl Settings {
    /// Creates settings with no kerf and no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the blade width.
    pub fn with_kerf(mut self, kerf: f64) -> Self {
        self.kerf = kerf;
        self
    }

    /// Sets the panel padding.
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the cut ordering preference.
    pub fn with_cut_preference(mut self, preference: CutPreference) -> Self {
        self.cut_preference = preference;
        self
    }

    /// Sets the search deadline in milliseconds.
    pub fn with_timeout(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    /// Validates kerf and padding.
    pub fn validate(&self) -> Result<()> {
        if !self.kerf.is_finite() || self.kerf < 0.0 {
            return Err(Error::ConfigError(format!(
                "Kerf must be a non-negative number, got {}",
                self.kerf
            )));
        }
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(Error::ConfigError(format!(
                "Padding must be a non-negative number, got {}",
                self.padding
            )));
        }
        Ok(())
    }
}

/// Tuning parameters shared by the placement strategies.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Candidates kept between beam-search depths.
    pub beam_width: usize,

    /// Maximum improvement passes of the hybrid local search.
    pub local_search_passes: u32,

    // GA-specific parameters
    /// Population size for genetic search.
    pub population_size: usize,

    /// Number of generations for genetic search.
    pub max_generations: u32,

    /// Tournament size for parent selection.
    pub tournament_size: usize,

    /// Individuals carried over unchanged each generation.
    pub elite_count: usize,

    /// Efficiency above which genetic search stops early.
    pub target_efficiency: f64,

    /// Probability of swapping two placements' positions.
    pub swap_mutation_rate: f64,

    /// Per-piece probability of flipping the rotation.
    pub rotation_mutation_rate: f64,

    /// Per-piece probability of a small positional jitter.
    pub jitter_mutation_rate: f64,

    /// Maximum jitter as a fraction of the panel size.
    pub jitter_fraction: f64,

    // Manager parameters
    /// Fraction of one panel's area above which a request needs multi-sheet support.
    pub multi_sheet_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            beam_width: 10,
            local_search_passes: 100,
            population_size: 50,
            max_generations: 100,
            tournament_size: 3,
            elite_count: 1,
            target_efficiency: 0.95,
            swap_mutation_rate: 0.3,
            rotation_mutation_rate: 0.1,
            jitter_mutation_rate: 0.05,
            jitter_fraction: 0.01,
            multi_sheet_threshold: 0.8,
        }
    }
}

impl EngineConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the beam width.
    pub fn with_beam_width(mut self, width: usize) -> Self {
        self.beam_width = width.max(1);
        self
    }

    /// Sets the local search pass limit.
    pub fn with_local_search_passes(mut self, passes: u32) -> Self {
        self.local_search_passes = passes;
        self
    }

    /// Sets the GA population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size.max(2);
        self
    }

    /// Sets the GA generation count.
    pub fn with_max_generations(mut self, generations: u32) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the early-stop efficiency for genetic search.
    pub fn with_target_efficiency(mut self, efficiency: f64) -> Self {
        self.target_efficiency = efficiency.clamp(0.0, 1.0);
        self
    }

    /// Sets the three mutation probabilities.
    pub fn with_mutation_rates(mut self, swap: f64, rotation: f64, jitter: f64) -> Self {
        self.swap_mutation_rate = swap.clamp(0.0, 1.0);
        self.rotation_mutation_rate = rotation.clamp(0.0, 1.0);
        self.jitter_mutation_rate = jitter.clamp(0.0, 1.0);
        self
    }

    /// Sets the multi-sheet threshold.
    pub fn with_multi_sheet_threshold(mut self, threshold: f64) -> Self {
        self.multi_sheet_threshold = threshold.max(0.0);
        self
    }
}
