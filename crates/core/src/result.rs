//! Placement result representation.

use crate::cuts::{generate_cuts, CutInstruction};
use crate::geometry::EPSILON;
use crate::panel::Panel;
use crate::piece::UnitPiece;
use crate::placement::{PlacedPiece, Sheet};
use crate::settings::Settings;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a placement run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PlacementResult {
    /// Every placed piece copy, sheet by sheet.
    pub placed_pieces: Vec<PlacedPiece>,

    /// Piece copies that could not be placed.
    pub unused_pieces: Vec<UnitPiece>,

    /// Ratio of used to total area (0.0 - 1.0).
    pub efficiency: f64,

    /// Combined area of all opened sheets.
    pub total_area: f64,

    /// Area covered by placed pieces.
    pub used_area: f64,

    /// `total_area - used_area`.
    pub wasted_area: f64,

    /// Cut instructions for all sheets.
    pub cuts: Vec<CutInstruction>,

    /// Number of sheets opened.
    pub sheet_count: usize,

    /// Computation time in milliseconds.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "executionTime", alias = "executionTimeMs")
    )]
    pub execution_time_ms: u64,

    /// Name of the strategy that produced the result.
    pub algorithm: String,
}

impl PlacementResult {
    /// Builds a result from finished sheets, computing areas and cuts.
    pub fn from_sheets(
        sheets: &[Sheet],
        unused_pieces: Vec<UnitPiece>,
        panel: &Panel,
        settings: &Settings,
        algorithm: impl Into<String>,
    ) -> Self {
        let placed_pieces: Vec<PlacedPiece> =
            sheets.iter().flat_map(|s| s.placed.iter().cloned()).collect();
        let used_area: f64 = placed_pieces.iter().map(PlacedPiece::area).sum();
        let total_area = panel.area() * sheets.len() as f64;
        let efficiency = if total_area > 0.0 {
            (used_area / total_area).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            placed_pieces,
            unused_pieces,
            efficiency,
            total_area,
            used_area,
            wasted_area: (total_area - used_area).max(0.0),
            cuts: generate_cuts(sheets, panel, settings.cut_preference),
            sheet_count: sheets.len(),
            execution_time_ms: 0,
            algorithm: algorithm.into(),
        }
    }

    /// Sets the computation time.
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = ms;
        self
    }

    /// Returns true if every piece copy was placed.
    pub fn all_placed(&self) -> bool {
        self.unused_pieces.is_empty()
    }

    /// Number of placed piece copies.
    pub fn placed_count(&self) -> usize {
        self.placed_pieces.len()
    }

    /// Returns efficiency as a percentage string.
    pub fn efficiency_percent(&self) -> String {
        format!("{:.1}%", self.efficiency * 100.0)
    }

    /// Placements on one sheet.
    pub fn sheet_placements(&self, sheet_index: usize) -> impl Iterator<Item = &PlacedPiece> {
        self.placed_pieces
            .iter()
            .filter(move |p| p.sheet_index == sheet_index)
    }

    /// Checks the layout invariants against the panel.
    ///
    /// Every placement must lie inside the panel on an existing sheet, no two
    /// placements on a sheet may overlap, and the area accounting must be
    /// consistent.
    pub fn validate(&self, panel: &Panel) -> Result<()> {
        let bounds = panel.bounds();
        for placed in &self.placed_pieces {
            if placed.sheet_index >= self.sheet_count {
                return Err(Error::ExecutionError(format!(
                    "Piece '{}' {} references sheet {} of {}",
                    placed.id, placed.key, placed.sheet_index, self.sheet_count
                )));
            }
            if !bounds.contains(&placed.rect()) {
                return Err(Error::ExecutionError(format!(
                    "Piece '{}' {} lies outside the panel",
                    placed.id, placed.key
                )));
            }
        }

        for sheet_index in 0..self.sheet_count {
            let on_sheet: Vec<&PlacedPiece> = self.sheet_placements(sheet_index).collect();
            for (i, a) in on_sheet.iter().enumerate() {
                for b in &on_sheet[i + 1..] {
                    if a.rect().overlaps(&b.rect()) {
                        return Err(Error::ExecutionError(format!(
                            "Pieces '{}' {} and '{}' {} overlap on sheet {}",
                            a.id, a.key, b.id, b.key, sheet_index
                        )));
                    }
                }
            }
        }

        if self.used_area > self.total_area + EPSILON || !(0.0..=1.0).contains(&self.efficiency) {
            return Err(Error::ExecutionError(format!(
                "Inconsistent area accounting: used {} of {}, efficiency {}",
                self.used_area, self.total_area, self.efficiency
            )));
        }
        Ok(())
    }

    /// Short summary for reporting.
    pub fn summary(&self) -> ResultSummary {
        ResultSummary::from(self)
    }
}

/// Summary statistics for a placement result.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResultSummary {
    /// Strategy used.
    pub algorithm: String,
    /// Piece copies placed.
    pub placed: usize,
    /// Piece copies left unused.
    pub unused: usize,
    /// Sheets opened.
    pub sheets: usize,
    /// Efficiency percentage.
    pub efficiency_percent: f64,
    /// Computation time in milliseconds.
    pub time_ms: u64,
}

impl From<&PlacementResult> for ResultSummary {
    fn from(result: &PlacementResult) -> Self {
        Self {
            algorithm: result.algorithm.clone(),
            placed: result.placed_pieces.len(),
            unused: result.unused_pieces.len(),
            sheets: result.sheet_count,
            efficiency_percent: result.efficiency * 100.0,
            time_ms: result.execution_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{expand, Piece};
    use approx::assert_relative_eq;

    fn one_piece_sheet() -> (Sheet, Panel) {
        let panel = Panel::new(500.0, 300.0);
        let unit = expand(&[Piece::new("A", 100.0, 50.0)]).remove(0);
        let mut sheet = Sheet::new(0, &panel);
        sheet.place(0, &unit, unit.upright(), 0.0);
        (sheet, panel)
    }

    #[test]
    fn test_from_sheets_accounting() {
        let (sheet, panel) = one_piece_sheet();
        let result = PlacementResult::from_sheets(&[sheet], Vec::new(), &panel, &Settings::new(), "test");

        assert_eq!(result.sheet_count, 1);
        assert_relative_eq!(result.used_area, 5000.0);
        assert_relative_eq!(result.total_area, 150_000.0);
        assert_relative_eq!(result.wasted_area, 145_000.0);
        assert_relative_eq!(result.efficiency, 5000.0 / 150_000.0);
        assert_eq!(result.efficiency_percent(), "3.3%");
        assert!(result.validate(&panel).is_ok());
        assert!(!result.cuts.is_empty());
    }

    #[test]
    fn test_empty_result_has_zero_efficiency() {
        let panel = Panel::new(100.0, 100.0);
        let unused = expand(&[Piece::new("big", 500.0, 500.0)]);
        let result = PlacementResult::from_sheets(&[], unused, &panel, &Settings::new(), "test");

        assert_eq!(result.efficiency, 0.0);
        assert_eq!(result.sheet_count, 0);
        assert!(!result.all_placed());
        assert!(result.validate(&panel).is_ok());
    }

    #[test]
    fn test_validate_detects_overlap() {
        let (sheet, panel) = one_piece_sheet();
        let mut result = PlacementResult::from_sheets(&[sheet], Vec::new(), &panel, &Settings::new(), "test");
        let mut twin = result.placed_pieces[0].clone();
        twin.x += 10.0;
        result.placed_pieces.push(twin);

        assert!(matches!(result.validate(&panel), Err(Error::ExecutionError(_))));
    }

    #[test]
    fn test_validate_detects_out_of_bounds() {
        let (sheet, panel) = one_piece_sheet();
        let mut result = PlacementResult::from_sheets(&[sheet], Vec::new(), &panel, &Settings::new(), "test");
        result.placed_pieces[0].x = 450.0;

        assert!(result.validate(&panel).is_err());
    }

    #[test]
    fn test_summary() {
        let (sheet, panel) = one_piece_sheet();
        let result = PlacementResult::from_sheets(&[sheet], Vec::new(), &panel, &Settings::new(), "ffd")
            .with_execution_time(12);
        let summary = result.summary();

        assert_eq!(summary.algorithm, "ffd");
        assert_eq!(summary.placed, 1);
        assert_eq!(summary.time_ms, 12);
    }
}
