//! Placed pieces, sheets and multi-sheet layouts.

use crate::geometry::{prune_contained, rebuild_free_space, split_free_space, Rect};
use crate::panel::Panel;
use crate::piece::{InstanceKey, Orientation, PieceId, UnitPiece};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A piece copy positioned on a sheet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PlacedPiece {
    /// Identifier of the source piece.
    pub id: PieceId,
    /// Key of the unit piece this placement belongs to.
    pub key: InstanceKey,
    /// Left edge on the sheet.
    pub x: f64,
    /// Top edge on the sheet.
    pub y: f64,
    /// Width as placed (after rotation).
    pub width: f64,
    /// Height as placed (after rotation).
    pub height: f64,
    /// Whether the piece was turned by 90 degrees.
    pub rotated: bool,
    /// Index of the owning sheet.
    pub sheet_index: usize,
    /// Optional display label.
    pub label: Option<String>,
}

impl PlacedPiece {
    /// Creates a placement of `piece` at `(x, y)` in the given orientation.
    pub fn new(piece: &UnitPiece, x: f64, y: f64, orientation: Orientation, sheet_index: usize) -> Self {
        Self {
            id: piece.id.clone(),
            key: piece.key,
            x,
            y,
            width: orientation.width,
            height: orientation.height,
            rotated: orientation.rotated,
            sheet_index,
            label: piece.label.clone(),
        }
    }

    /// Footprint on the sheet.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Surface of the piece.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Turns the piece by 90 degrees in place, keeping its top-left corner.
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.width, &mut self.height);
        self.rotated = !self.rotated;
    }
}

/// A single stock sheet with its placements and remaining free space.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    /// Position of the sheet in the layout.
    pub index: usize,
    /// Pieces placed so far.
    pub placed: Vec<PlacedPiece>,
    /// Free rectangles; never overlapping any placed piece.
    pub free: Vec<Rect>,
}

impl Sheet {
    /// Creates an empty sheet covering the whole panel.
    pub fn new(index: usize, panel: &Panel) -> Self {
        Self {
            index,
            placed: Vec::new(),
            free: vec![panel.bounds()],
        }
    }

    /// Surface covered by placed pieces.
    pub fn used_area(&self) -> f64 {
        self.placed.iter().map(PlacedPiece::area).sum()
    }

    /// Bounding rectangle of the placements, anchored at the panel origin.
    pub fn extent(&self) -> Rect {
        extent_of(&self.placed)
    }

    /// Index of the first free rectangle that fits the orientation.
    pub fn first_fit(&self, orientation: Orientation) -> Option<usize> {
        self.free
            .iter()
            .position(|f| f.fits(orientation.width, orientation.height))
    }

    /// Tightest free rectangle for any allowed orientation of `piece`.
    ///
    /// Returns `(free_index, orientation, waste)`; the first candidate wins ties.
    pub fn best_fit(&self, piece: &UnitPiece, allow_rotation: bool) -> Option<(usize, Orientation, f64)> {
        let mut best: Option<(usize, Orientation, f64)> = None;
        for (idx, free) in self.free.iter().enumerate() {
            for orientation in piece.orientations(allow_rotation) {
                if !free.fits(orientation.width, orientation.height) {
                    continue;
                }
                let waste = free.fit_waste(orientation.width, orientation.height);
                if best.map_or(true, |(_, _, w)| waste < w) {
                    best = Some((idx, orientation, waste));
                }
            }
        }
        best
    }

    /// Places `piece` at the origin of free rectangle `free_index`.
    ///
    /// The free space is split around the exact footprint; leftover strips not
    /// wider than `kerf` are discarded.
    pub fn place(
        &mut self,
        free_index: usize,
        piece: &UnitPiece,
        orientation: Orientation,
        kerf: f64,
    ) -> &PlacedPiece {
        let slot = self.free[free_index];
        let placed = PlacedPiece::new(piece, slot.x, slot.y, orientation, self.index);
        self.free = split_free_space(&self.free, &placed.rect(), kerf);
        prune_contained(&mut self.free);
        self.placed.push(placed);
        &self.placed[self.placed.len() - 1]
    }

    /// Recomputes the free rectangles from the current placements.
    pub fn rebuild_free_space(&mut self, panel: &Panel, kerf: f64) {
        let rects: Vec<Rect> = self.placed.iter().map(PlacedPiece::rect).collect();
        self.free = rebuild_free_space(panel.bounds(), rects.iter(), kerf);
    }
}

/// Bounding rectangle of `placed`, anchored at the origin.
pub fn extent_of(placed: &[PlacedPiece]) -> Rect {
    let (right, bottom) = placed.iter().fold((0.0_f64, 0.0_f64), |(r, b), p| {
        (r.max(p.x + p.width), b.max(p.y + p.height))
    });
    Rect::new(0.0, 0.0, right, bottom)
}

/// Returns true if `candidate` is inside the panel and overlaps none of `others`.
pub fn is_feasible(candidate: &PlacedPiece, others: &[PlacedPiece], panel: &Panel) -> bool {
    let rect = candidate.rect();
    panel.bounds().contains(&rect) && others.iter().all(|o| !rect.overlaps(&o.rect()))
}

/// A growing set of sheets of one panel size.
#[derive(Debug, Clone)]
pub struct Layout {
    panel: Panel,
    kerf: f64,
    sheets: Vec<Sheet>,
}

impl Layout {
    /// Creates an empty layout.
    pub fn new(panel: Panel, kerf: f64) -> Self {
        Self {
            panel,
            kerf,
            sheets: Vec::new(),
        }
    }

    /// Wraps existing sheets.
    pub fn from_sheets(panel: Panel, kerf: f64, sheets: Vec<Sheet>) -> Self {
        Self {
            panel,
            kerf,
            sheets,
        }
    }

    /// Rebuilds a layout from a flat placement list.
    ///
    /// Sheet indices are kept as given; sheets without placements in between
    /// are created empty. Free space is recomputed for every sheet.
    pub fn from_placements(panel: Panel, kerf: f64, placements: Vec<PlacedPiece>) -> Self {
        let sheet_count = placements
            .iter()
            .map(|p| p.sheet_index + 1)
            .max()
            .unwrap_or(0);
        let mut sheets: Vec<Sheet> = (0..sheet_count).map(|i| Sheet::new(i, &panel)).collect();
        for placed in placements {
            sheets[placed.sheet_index].placed.push(placed);
        }
        for sheet in &mut sheets {
            sheet.rebuild_free_space(&panel, kerf);
        }
        Self {
            panel,
            kerf,
            sheets,
        }
    }

    /// The panel every sheet is cut from.
    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    /// Blade width.
    pub fn kerf(&self) -> f64 {
        self.kerf
    }

    /// Sheets opened so far.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Mutable access to the sheets.
    pub fn sheets_mut(&mut self) -> &mut [Sheet] {
        &mut self.sheets
    }

    /// Consumes the layout, returning its sheets.
    pub fn into_sheets(self) -> Vec<Sheet> {
        self.sheets
    }

    /// Number of sheets opened.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Opens a new empty sheet and returns its index.
    pub fn open_sheet(&mut self) -> usize {
        let index = self.sheets.len();
        self.sheets.push(Sheet::new(index, &self.panel));
        index
    }

    /// Places `piece` in free rectangle `free_index` of sheet `sheet_index`.
    pub fn place(
        &mut self,
        sheet_index: usize,
        free_index: usize,
        piece: &UnitPiece,
        orientation: Orientation,
    ) -> &PlacedPiece {
        let kerf = self.kerf;
        self.sheets[sheet_index].place(free_index, piece, orientation, kerf)
    }

    /// Minimum-waste fit across all open sheets.
    ///
    /// Returns `(sheet_index, free_index, orientation)`; earlier sheets win ties.
    pub fn best_fit(&self, piece: &UnitPiece, allow_rotation: bool) -> Option<(usize, usize, Orientation)> {
        let mut best: Option<(usize, usize, Orientation, f64)> = None;
        for sheet in &self.sheets {
            if let Some((free_idx, orientation, waste)) = sheet.best_fit(piece, allow_rotation) {
                if best.map_or(true, |(_, _, _, w)| waste < w) {
                    best = Some((sheet.index, free_idx, orientation, waste));
                }
            }
        }
        best.map(|(s, f, o, _)| (s, f, o))
    }

    /// Places `piece` at its minimum-waste fit, opening a sheet if needed.
    ///
    /// Returns false, without opening a sheet, if the piece cannot fit even an
    /// empty panel.
    pub fn place_best_fit(&mut self, piece: &UnitPiece, allow_rotation: bool) -> bool {
        if let Some((sheet, free, orientation)) = self.best_fit(piece, allow_rotation) {
            self.place(sheet, free, piece, orientation);
            return true;
        }
        if !self.panel.can_host(piece, allow_rotation) {
            return false;
        }
        let sheet = self.open_sheet();
        match self.sheets[sheet].best_fit(piece, allow_rotation) {
            Some((free, orientation, _)) => {
                self.place(sheet, free, piece, orientation);
                true
            }
            None => false,
        }
    }

    /// Places `piece` in the first fitting free rectangle, trying the given
    /// orientations in order over all sheets, then on a new sheet.
    pub fn place_first_fit(&mut self, piece: &UnitPiece, orientations: &[Orientation]) -> bool {
        for &orientation in orientations {
            for sheet in 0..self.sheets.len() {
                if let Some(free) = self.sheets[sheet].first_fit(orientation) {
                    self.place(sheet, free, piece, orientation);
                    return true;
                }
            }
        }
        let Some(&orientation) = orientations
            .iter()
            .find(|o| self.panel.fits(o.width, o.height))
        else {
            return false;
        };
        let sheet = self.open_sheet();
        self.place(sheet, 0, piece, orientation);
        true
    }

    /// Drops sheets without placements and renumbers the rest.
    pub fn compact(&mut self) {
        self.sheets.retain(|s| !s.placed.is_empty());
        for (index, sheet) in self.sheets.iter_mut().enumerate() {
            sheet.index = index;
            for placed in &mut sheet.placed {
                placed.sheet_index = index;
            }
        }
    }

    /// All placements, sheet by sheet.
    pub fn placements(&self) -> impl Iterator<Item = &PlacedPiece> {
        self.sheets.iter().flat_map(|s| s.placed.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{expand, Piece};

    fn unit(w: f64, h: f64, rotate: bool) -> UnitPiece {
        expand(&[Piece::new("P", w, h).with_rotation(rotate)])
            .remove(0)
    }

    #[test]
    fn test_sheet_place_updates_free_space() {
        let panel = Panel::new(150.0, 100.0);
        let mut sheet = Sheet::new(0, &panel);
        let piece = unit(100.0, 100.0, false);

        let placed = sheet.place(0, &piece, piece.upright(), 0.0).clone();

        assert_eq!((placed.x, placed.y), (0.0, 0.0));
        assert_eq!(sheet.free, vec![Rect::new(100.0, 0.0, 50.0, 100.0)]);
        assert!(sheet.first_fit(piece.upright()).is_none());
    }

    #[test]
    fn test_best_fit_prefers_tight_slot() {
        let panel = Panel::new(100.0, 100.0);
        let mut sheet = Sheet::new(0, &panel);
        sheet.free = vec![
            Rect::new(0.0, 0.0, 60.0, 60.0),
            Rect::new(60.0, 0.0, 21.0, 40.0),
        ];
        let piece = unit(20.0, 40.0, false);

        let (idx, _, waste) = sheet.best_fit(&piece, false).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(waste, 0.0);
    }

    #[test]
    fn test_layout_opens_sheets_lazily() {
        let mut layout = Layout::new(Panel::new(150.0, 100.0), 0.0);
        let piece = unit(100.0, 100.0, false);

        assert!(layout.place_best_fit(&piece, false));
        assert!(layout.place_best_fit(&piece, false));
        assert_eq!(layout.sheet_count(), 2);
    }

    #[test]
    fn test_layout_rejects_oversized_without_opening() {
        let mut layout = Layout::new(Panel::new(100.0, 100.0), 0.0);
        let piece = unit(200.0, 50.0, true);

        assert!(!layout.place_best_fit(&piece, true));
        assert!(!layout.place_first_fit(&piece, &[piece.upright()]));
        assert_eq!(layout.sheet_count(), 0);
    }

    #[test]
    fn test_place_first_fit_uses_rotation() {
        let mut layout = Layout::new(Panel::new(50.0, 200.0), 0.0);
        let piece = unit(100.0, 40.0, true);
        let orientations: Vec<Orientation> = piece.orientations(true).collect();

        assert!(layout.place_first_fit(&piece, &orientations));
        let placed = layout.placements().next().unwrap();
        assert!(placed.rotated);
        assert_eq!((placed.width, placed.height), (40.0, 100.0));
    }

    #[test]
    fn test_from_placements_and_compact() {
        let panel = Panel::new(100.0, 100.0);
        let piece = unit(50.0, 50.0, false);
        let placements = vec![
            PlacedPiece::new(&piece, 0.0, 0.0, piece.upright(), 0),
            PlacedPiece::new(&piece, 0.0, 0.0, piece.upright(), 2),
        ];

        let mut layout = Layout::from_placements(panel, 0.0, placements);
        assert_eq!(layout.sheet_count(), 3);
        assert_eq!(layout.sheets()[1].free, vec![panel.bounds()]);

        layout.compact();
        assert_eq!(layout.sheet_count(), 2);
        assert!(layout
            .placements()
            .map(|p| p.sheet_index)
            .eq([0, 1].into_iter()));
    }

    #[test]
    fn test_feasibility() {
        let panel = Panel::new(100.0, 100.0);
        let piece = unit(50.0, 50.0, false);
        let a = PlacedPiece::new(&piece, 0.0, 0.0, piece.upright(), 0);
        let touching = PlacedPiece::new(&piece, 50.0, 0.0, piece.upright(), 0);
        let overlapping = PlacedPiece::new(&piece, 48.0, 0.0, piece.upright(), 0);
        let outside = PlacedPiece::new(&piece, 52.0, 0.0, piece.upright(), 0);

        assert!(is_feasible(&touching, &[a.clone()], &panel));
        assert!(!is_feasible(&overlapping, &[a.clone()], &panel));
        assert!(!is_feasible(&outside, &[], &panel));
    }

    #[test]
    fn test_kerf_only_discards_slivers() {
        let piece = unit(50.0, 100.0, false);

        let mut layout = Layout::new(Panel::new(100.0, 100.0), 3.0);
        assert!(layout.place_best_fit(&piece, false));
        assert!(layout.place_best_fit(&piece, false));
        assert_eq!(layout.sheet_count(), 1);
        assert!(layout.placements().map(|p| p.x).eq([0.0, 50.0].into_iter()));

        // A 52-wide panel leaves a 2-wide strip, which a 3-wide blade consumes.
        let narrow = unit(50.0, 50.0, false);
        let mut sheet = Sheet::new(0, &Panel::new(52.0, 100.0));
        sheet.place(0, &narrow, narrow.upright(), 3.0);
        assert_eq!(sheet.free, vec![Rect::new(0.0, 50.0, 52.0, 50.0)]);
    }

    #[test]
    fn test_extent() {
        let piece = unit(30.0, 20.0, false);
        let placed = vec![
            PlacedPiece::new(&piece, 0.0, 0.0, piece.upright(), 0),
            PlacedPiece::new(&piece, 40.0, 10.0, piece.upright(), 0),
        ];
        assert_eq!(extent_of(&placed), Rect::new(0.0, 0.0, 70.0, 30.0));
    }
}
