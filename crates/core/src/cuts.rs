//! Guillotine cut instructions derived from a finished layout.

use crate::geometry::EPSILON;
use crate::panel::Panel;
use crate::placement::Sheet;
use crate::settings::CutPreference;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of a straight cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CutDirection {
    /// Cut along x at a fixed y.
    Horizontal,
    /// Cut along y at a fixed x.
    Vertical,
}

/// A single straight cut on a sheet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CutInstruction {
    /// Sheet the cut is made on.
    pub sheet_index: usize,
    /// Cut direction.
    pub direction: CutDirection,
    /// Fixed coordinate (y for horizontal, x for vertical cuts).
    pub position: f64,
    /// Start of the cut along its direction.
    pub start: f64,
    /// End of the cut along its direction.
    pub end: f64,
}

impl CutInstruction {
    /// Length of the cut.
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Derives cut instructions for every sheet.
///
/// Each placed piece contributes a vertical cut along its right edge and a
/// horizontal cut along its bottom edge, unless that edge lies on the panel
/// border. Collinear overlapping cuts are merged.
pub fn generate_cuts(sheets: &[Sheet], panel: &Panel, preference: CutPreference) -> Vec<CutInstruction> {
    let horizontal_first = match preference {
        CutPreference::Horizontal => true,
        CutPreference::Vertical => false,
        CutPreference::Auto => panel.width >= panel.height,
    };

    let mut cuts = Vec::new();
    for sheet in sheets {
        let mut horizontal = Vec::new();
        let mut vertical = Vec::new();

        for placed in &sheet.placed {
            let right = placed.x + placed.width;
            let bottom = placed.y + placed.height;
            if right < panel.width - EPSILON {
                vertical.push(CutInstruction {
                    sheet_index: sheet.index,
                    direction: CutDirection::Vertical,
                    position: right,
                    start: placed.y,
                    end: bottom,
                });
            }
            if bottom < panel.height - EPSILON {
                horizontal.push(CutInstruction {
                    sheet_index: sheet.index,
                    direction: CutDirection::Horizontal,
                    position: bottom,
                    start: placed.x,
                    end: right,
                });
            }
        }

        let horizontal = merge_collinear(horizontal);
        let vertical = merge_collinear(vertical);
        if horizontal_first {
            cuts.extend(horizontal);
            cuts.extend(vertical);
        } else {
            cuts.extend(vertical);
            cuts.extend(horizontal);
        }
    }
    cuts
}

fn merge_collinear(mut cuts: Vec<CutInstruction>) -> Vec<CutInstruction> {
    cuts.sort_by(|a, b| {
        a.position
            .total_cmp(&b.position)
            .then(a.start.total_cmp(&b.start))
    });

    let mut merged: Vec<CutInstruction> = Vec::with_capacity(cuts.len());
    for cut in cuts {
        match merged.last_mut() {
            Some(last)
                if (last.position - cut.position).abs() < EPSILON
                    && cut.start <= last.end + EPSILON =>
            {
                last.end = last.end.max(cut.end);
            }
            _ => merged.push(cut),
        }
    }
    merged
}
