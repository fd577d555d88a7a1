//! Synthetic request generator for testing edge cases.
//!
//! Generates cutting requests of several flavours for stress testing and
//! comparing strategies.

use rand::prelude::*;
use u_cutstock_core::{Panel, Piece, Settings};
use u_cutstock_guillotine::OptimizationRequest;

/// Standard full-size board (mm).
pub const STANDARD_PANEL: Panel = Panel {
    width: 2440.0,
    height: 1220.0,
};

/// Generator for synthetic cutting requests.
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    rng: StdRng,
    panel: Panel,
    kerf: f64,
}

impl SyntheticGenerator {
    /// Creates a new generator with a random seed.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            panel: STANDARD_PANEL,
            kerf: 3.0,
        }
    }

    /// Creates a new generator with a specific seed for reproducibility.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new()
        }
    }

    /// Sets the stock panel.
    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panel = panel;
        self
    }

    /// Sets the blade width.
    pub fn with_kerf(mut self, kerf: f64) -> Self {
        self.kerf = kerf;
        self
    }

    fn request(&self, pieces: Vec<Piece>) -> OptimizationRequest {
        OptimizationRequest::new(pieces, self.panel)
            .with_settings(Settings::new().with_kerf(self.kerf))
    }

    /// Mixed piece sizes between 5% and 50% of the panel sides.
    pub fn mixed(&mut self, count: usize) -> OptimizationRequest {
        let pieces = (0..count)
            .map(|i| {
                let w = self.rng.gen_range(0.05..0.5) * self.panel.width;
                let h = self.rng.gen_range(0.05..0.5) * self.panel.height;
                Piece::new(format!("M{}", i), w.round(), h.round())
                    .with_quantity(self.rng.gen_range(1..=4))
                    .with_rotation(self.rng.gen_bool(0.5))
            })
            .collect();
        self.request(pieces)
    }

    /// Cabinet-style parts: full-depth strips in a few repeated widths.
    pub fn furniture(&mut self, count: usize) -> OptimizationRequest {
        let depth = (self.panel.height / 2.0 - self.kerf).floor();
        let pieces = (0..count)
            .map(|i| {
                let length = 100.0 * self.rng.gen_range(3..=12) as f64;
                Piece::new(format!("F{}", i), length.min(self.panel.width), depth)
                    .with_quantity(self.rng.gen_range(1..=6))
                    .with_rotation(true)
                    .with_priority(if length > 800.0 { 1 } else { 0 })
            })
            .collect();
        self.request(pieces)
    }

    /// Many small parts in high quantities.
    pub fn small_parts(&mut self, count: usize) -> OptimizationRequest {
        let pieces = (0..count)
            .map(|i| {
                let w = self.rng.gen_range(30.0..150.0_f64).round();
                let h = self.rng.gen_range(30.0..150.0_f64).round();
                Piece::new(format!("S{}", i), w, h)
                    .with_quantity(self.rng.gen_range(5..=20))
                    .with_rotation(true)
            })
            .collect();
        self.request(pieces)
    }

    /// Long thin strips that only fit one way unless rotated.
    pub fn extreme_aspect(&mut self, count: usize) -> OptimizationRequest {
        let pieces = (0..count)
            .map(|i| {
                let long = self.rng.gen_range(0.6..0.95) * self.panel.width;
                let thin = self.rng.gen_range(20.0..80.0_f64);
                let (w, h) = if self.rng.gen_bool(0.5) {
                    (long, thin)
                } else {
                    (thin, long.min(self.panel.height))
                };
                Piece::new(format!("X{}", i), w.round(), h.round())
                    .with_quantity(self.rng.gen_range(1..=3))
                    .with_rotation(true)
            })
            .collect();
        self.request(pieces)
    }

    /// Pieces obtained by recursively guillotine-cutting one panel.
    ///
    /// With zero kerf the pieces tile exactly one sheet, so a perfect answer
    /// is known. Kerf is removed from each cut, which keeps a one-sheet
    /// answer feasible for any kerf.
    pub fn guillotine_partition(&mut self, cuts: usize) -> OptimizationRequest {
        let mut parts = vec![(self.panel.width, self.panel.height)];
        for _ in 0..cuts {
            let Some(index) = parts
                .iter()
                .enumerate()
                .filter(|(_, (w, h))| w.max(*h) > 4.0 * self.kerf + 100.0)
                .max_by(|a, b| (a.1 .0 * a.1 .1).total_cmp(&(b.1 .0 * b.1 .1)))
                .map(|(i, _)| i)
            else {
                break;
            };
            let (w, h) = parts.swap_remove(index);
            let ratio = self.rng.gen_range(0.25..0.75);
            if w >= h {
                let left = (w * ratio).floor();
                parts.push((left, h));
                parts.push((w - left - self.kerf, h));
            } else {
                let bottom = (h * ratio).floor();
                parts.push((w, bottom));
                parts.push((w, h - bottom - self.kerf));
            }
        }

        let pieces = parts
            .into_iter()
            .enumerate()
            .map(|(i, (w, h))| Piece::new(format!("G{}", i), w, h))
            .collect();
        self.request(pieces)
    }
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Predefined synthetic requests.
pub struct SyntheticRequests;

impl SyntheticRequests {
    /// Generates every predefined request with the given seed.
    pub fn all(seed: u64) -> Vec<(String, OptimizationRequest)> {
        let mut gen = SyntheticGenerator::with_seed(seed);
        vec![
            ("synthetic_mixed".to_string(), gen.mixed(20)),
            ("synthetic_furniture".to_string(), gen.furniture(8)),
            ("synthetic_small_parts".to_string(), gen.small_parts(10)),
            ("synthetic_extreme_aspect".to_string(), gen.extreme_aspect(8)),
            (
                "synthetic_guillotine_partition".to_string(),
                gen.guillotine_partition(15),
            ),
        ]
    }

    /// Names of all predefined requests.
    pub fn names() -> &'static [&'static str] {
        &[
            "synthetic_mixed",
            "synthetic_furniture",
            "synthetic_small_parts",
            "synthetic_extreme_aspect",
            "synthetic_guillotine_partition",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mixed_generation() {
        let mut gen = SyntheticGenerator::with_seed(42);
        let request = gen.mixed(10);

        assert_eq!(request.pieces.len(), 10);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_reproducibility() {
        let mut gen1 = SyntheticGenerator::with_seed(123);
        let mut gen2 = SyntheticGenerator::with_seed(123);

        let r1 = gen1.small_parts(5);
        let r2 = gen2.small_parts(5);

        assert_eq!(r1.pieces, r2.pieces);
    }

    #[test]
    fn test_partition_tiles_one_panel_without_kerf() {
        let mut gen = SyntheticGenerator::with_seed(7).with_kerf(0.0);
        let request = gen.guillotine_partition(12);

        assert_eq!(request.pieces.len(), 13);
        assert_relative_eq!(
            request.total_piece_area(),
            STANDARD_PANEL.area(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_all_requests_are_valid() {
        let all = SyntheticRequests::all(42);

        assert_eq!(all.len(), SyntheticRequests::names().len());
        for ((name, request), expected) in all.iter().zip(SyntheticRequests::names()) {
            assert_eq!(name, expected);
            assert!(request.validate().is_ok(), "{} is invalid", name);
        }
    }
}
