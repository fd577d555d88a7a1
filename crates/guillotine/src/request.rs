//! Optimization request.

use u_cutstock_core::{validate_pieces, Error, Panel, Piece, Result, Settings};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A complete cutting job: pieces, stock panels and settings.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct OptimizationRequest {
    /// Pieces to cut.
    pub pieces: Vec<Piece>,
    /// Stock panels; only the first one is used.
    pub panels: Vec<Panel>,
    /// Cutting settings.
    #[cfg_attr(feature = "serde", serde(default))]
    pub settings: Settings,
    /// Preferred strategy name (None = registry default).
    #[cfg_attr(feature = "serde", serde(default))]
    pub algorithm: Option<String>,
    /// Seed for stochastic strategies (None = entropy).
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: Option<u64>,
}

impl OptimizationRequest {
    /// Creates a request for `pieces` on a single panel.
    pub fn new(pieces: Vec<Piece>, panel: Panel) -> Self {
        Self {
            pieces,
            panels: vec![panel],
            ..Default::default()
        }
    }

    /// Sets the cutting settings.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the preferred strategy.
    pub fn with_algorithm(mut self, name: impl Into<String>) -> Self {
        self.algorithm = Some(name.into());
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The panel every sheet is cut from.
    pub fn panel(&self) -> Result<&Panel> {
        u_cutstock_core::primary_panel(&self.panels)
    }

    /// Total surface of all requested piece copies.
    pub fn total_piece_area(&self) -> f64 {
        self.pieces.iter().map(Piece::total_area).sum()
    }

    /// Validates pieces, panels and settings.
    pub fn validate(&self) -> Result<()> {
        if self.panels.is_empty() {
            return Err(Error::ConfigError("No panels supplied".to_string()));
        }
        self.panels.iter().try_for_each(Panel::validate)?;
        validate_pieces(&self.pieces)?;
        self.settings.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_request() {
        let ok = OptimizationRequest::new(vec![Piece::new("A", 10.0, 10.0)], Panel::new(100.0, 100.0));
        assert!(ok.validate().is_ok());

        let no_panels = OptimizationRequest {
            panels: Vec::new(),
            ..ok.clone()
        };
        assert!(no_panels.validate().unwrap_err().is_config());

        let no_pieces = OptimizationRequest {
            pieces: Vec::new(),
            ..ok.clone()
        };
        assert!(no_pieces.validate().unwrap_err().is_config());

        let bad_kerf = ok.clone().with_settings(Settings::new().with_kerf(-2.0));
        assert!(bad_kerf.validate().is_err());
    }

    #[test]
    fn test_total_piece_area() {
        let request = OptimizationRequest::new(
            vec![
                Piece::new("A", 10.0, 10.0).with_quantity(3),
                Piece::new("B", 5.0, 2.0),
            ],
            Panel::new(100.0, 100.0),
        );
        assert_eq!(request.total_piece_area(), 310.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "pieces": [{ "id": "A", "width": 100, "height": 50, "canRotate": true }],
            "panels": [{ "width": 500, "height": 300 }],
            "settings": { "kerf": 3, "cutPreference": "vertical" },
            "seed": 9
        }"#;
        let request: OptimizationRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.pieces[0].quantity, 1);
        assert!(request.pieces[0].can_rotate);
        assert_eq!(request.settings.kerf, 3.0);
        assert_eq!(request.seed, Some(9));
        assert!(request.algorithm.is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_settings_wire_names() {
        use u_cutstock_core::CutPreference;

        let json = r#"{
            "pieces": [{ "id": "A", "width": 10, "height": 10 }],
            "panels": [{ "width": 100, "height": 100 }],
            "settings": { "kerf": 0, "timeout": 5, "cutPreference": "diagonal" }
        }"#;
        let request: OptimizationRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.settings.timeout_ms, Some(5));
        assert_eq!(request.settings.cut_preference, CutPreference::Auto);

        let out = serde_json::to_string(&request.settings).unwrap();
        assert!(out.contains("\"timeout\":5"));
        assert!(!out.contains("timeoutMs"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_result_reports_execution_time() {
        use u_cutstock_core::{PlacementResult, Sheet};

        let panel = Panel::new(100.0, 100.0);
        let mut result = PlacementResult::from_sheets(
            &[Sheet::new(0, &panel)],
            Vec::new(),
            &panel,
            &Settings::new(),
            "first-fit-decreasing",
        );
        result.execution_time_ms = 12;
        let json = serde_json::to_string(&result).unwrap();

        assert!(json.contains("\"executionTime\":12"));
        assert!(!json.contains("executionTimeMs"));
    }
}
