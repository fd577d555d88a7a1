//! Piece definitions and the piece preprocessor.
//!
//! Requests describe pieces with a quantity. Before any strategy runs, the
//! pieces are expanded into [`UnitPiece`]s, one per physical copy, each
//! carrying an [`InstanceKey`] that stays unique even when copies share an id.

use crate::geometry::EPSILON;
use crate::{Error, Result};
use std::cmp::Ordering;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a requested piece.
pub type PieceId = String;

/// A rectangular piece to be cut, possibly in several copies.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Piece {
    /// Caller-supplied identifier.
    pub id: PieceId,
    /// Width before rotation.
    pub width: f64,
    /// Height before rotation.
    pub height: f64,
    /// Number of copies to cut.
    #[cfg_attr(feature = "serde", serde(default = "default_quantity"))]
    pub quantity: usize,
    /// Whether the piece may be turned by 90 degrees.
    #[cfg_attr(feature = "serde", serde(default))]
    pub can_rotate: bool,
    /// Placement priority (higher = placed first).
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: i32,
    /// Optional display label.
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: Option<String>,
}

#[cfg(feature = "serde")]
fn default_quantity() -> usize {
    1
}

impl Piece {
    /// Creates a single, non-rotatable piece.
    pub fn new(id: impl Into<PieceId>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            quantity: 1,
            can_rotate: false,
            priority: 0,
            label: None,
        }
    }

    /// Sets the number of copies.
    pub fn with_quantity(mut self, n: usize) -> Self {
        self.quantity = n;
        self
    }

    /// Allows or forbids 90-degree rotation.
    pub fn with_rotation(mut self, allow: bool) -> Self {
        self.can_rotate = allow;
        self
    }

    /// Sets the placement priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Surface of a single copy.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Surface of all copies.
    pub fn total_area(&self) -> f64 {
        self.area() * self.quantity as f64
    }

    /// Validates dimensions and quantity.
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.height.is_finite()) {
            return Err(Error::ConfigError(format!(
                "Piece '{}' has non-finite dimensions",
                self.id
            )));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(Error::ConfigError(format!(
                "Piece '{}' must have positive dimensions, got {}x{}",
                self.id, self.width, self.height
            )));
        }
        if self.quantity == 0 {
            return Err(Error::ConfigError(format!(
                "Piece '{}' must have a quantity of at least 1",
                self.id
            )));
        }
        Ok(())
    }
}

/// Unique key of one expanded piece copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InstanceKey(pub usize);

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Oriented dimensions of a piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    /// Width as placed.
    pub width: f64,
    /// Height as placed.
    pub height: f64,
    /// Whether the piece is turned by 90 degrees.
    pub rotated: bool,
}

/// A single copy of a [`Piece`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct UnitPiece {
    /// Unique key across the whole expansion.
    pub key: InstanceKey,
    /// Identifier of the source piece.
    pub id: PieceId,
    /// Copy number within the source piece (0-based).
    pub instance: usize,
    /// Width before rotation.
    pub width: f64,
    /// Height before rotation.
    pub height: f64,
    /// Whether the piece may be turned by 90 degrees.
    pub can_rotate: bool,
    /// Placement priority (higher = placed first).
    pub priority: i32,
    /// Optional display label.
    pub label: Option<String>,
}

impl UnitPiece {
    /// Surface of the piece.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Unrotated orientation.
    pub fn upright(&self) -> Orientation {
        Orientation {
            width: self.width,
            height: self.height,
            rotated: false,
        }
    }

    /// Orientations to try, unrotated first.
    ///
    /// The turned orientation is only offered when the strategy supports
    /// rotation, the piece allows it and the piece is not square.
    pub fn orientations(&self, allow_rotation: bool) -> impl Iterator<Item = Orientation> {
        let turned = (allow_rotation && self.can_rotate && (self.width - self.height).abs() > EPSILON)
            .then(|| Orientation {
                width: self.height,
                height: self.width,
                rotated: true,
            });
        std::iter::once(self.upright()).chain(turned)
    }
}

/// Expands every piece into `quantity` unit pieces.
///
/// Keys are assigned sequentially in input order.
pub fn expand(pieces: &[Piece]) -> Vec<UnitPiece> {
    let total: usize = pieces.iter().map(|p| p.quantity).sum();
    let mut units = Vec::with_capacity(total);

    for piece in pieces {
        for instance in 0..piece.quantity {
            units.push(UnitPiece {
                key: InstanceKey(units.len()),
                id: piece.id.clone(),
                instance,
                width: piece.width,
                height: piece.height,
                can_rotate: piece.can_rotate,
                priority: piece.priority,
                label: piece.label.clone(),
            });
        }
    }

    units
}

/// Sorts by priority descending, then area descending.
///
/// The sort is stable: pieces equal on both keys keep their input order.
pub fn sort_by_priority(pieces: &mut [UnitPiece]) {
    pieces.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| compare_area_desc(a, b))
    });
}

/// Sorts by area descending (stable).
pub fn sort_by_area(pieces: &mut [UnitPiece]) {
    pieces.sort_by(compare_area_desc);
}

fn compare_area_desc(a: &UnitPiece, b: &UnitPiece) -> Ordering {
    b.area().partial_cmp(&a.area()).unwrap_or(Ordering::Equal)
}

/// Validates a non-empty list of pieces.
pub fn validate_pieces(pieces: &[Piece]) -> Result<()> {
    if pieces.is_empty() {
        return Err(Error::ConfigError("No pieces supplied".to_string()));
    }
    pieces.iter().try_for_each(Piece::validate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(spec: &[(&str, f64, f64, i32)]) -> Vec<UnitPiece> {
        let pieces: Vec<Piece> = spec
            .iter()
            .map(|&(id, w, h, p)| Piece::new(id, w, h).with_priority(p))
            .collect();
        expand(&pieces)
    }

    fn ids(pieces: &[UnitPiece]) -> Vec<&str> {
        pieces.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_expand_counts_quantity() {
        let pieces = vec![
            Piece::new("A", 10.0, 10.0).with_quantity(3),
            Piece::new("B", 5.0, 5.0),
            Piece::new("C", 1.0, 2.0).with_quantity(2),
        ];

        let units = expand(&pieces);

        assert_eq!(units.len(), 6);
        assert_eq!(ids(&units), vec!["A", "A", "A", "B", "C", "C"]);
        assert_eq!(units[2].instance, 2);
        assert_eq!(units[5].instance, 1);
    }

    #[test]
    fn test_expand_keys_are_unique() {
        let pieces = vec![Piece::new("A", 10.0, 10.0).with_quantity(4)];
        let units = expand(&pieces);

        let mut keys: Vec<InstanceKey> = units.iter().map(|u| u.key).collect();
        keys.dedup();
        assert_eq!(keys.len(), 4);
        assert!(units.iter().all(|u| u.id == "A"));
    }

    #[test]
    fn test_sort_by_priority_then_area() {
        let mut pieces = units(&[
            ("small", 1.0, 1.0, 0),
            ("big", 10.0, 10.0, 0),
            ("urgent", 2.0, 2.0, 5),
            ("medium", 5.0, 5.0, 0),
        ]);

        sort_by_priority(&mut pieces);

        assert_eq!(ids(&pieces), vec!["urgent", "big", "medium", "small"]);
    }

    #[test]
    fn test_sort_by_priority_is_stable() {
        let mut pieces = units(&[
            ("first", 4.0, 1.0, 1),
            ("second", 2.0, 2.0, 1),
            ("third", 1.0, 4.0, 1),
        ]);

        sort_by_priority(&mut pieces);
        assert_eq!(ids(&pieces), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_sort_by_priority_is_idempotent() {
        let mut pieces = units(&[
            ("a", 3.0, 1.0, 0),
            ("b", 1.0, 3.0, 2),
            ("c", 2.0, 2.0, 0),
            ("d", 3.0, 1.0, 0),
        ]);

        sort_by_priority(&mut pieces);
        let once = pieces.clone();
        sort_by_priority(&mut pieces);

        assert_eq!(pieces, once);
    }

    #[test]
    fn test_orientations() {
        let piece = &expand(&[Piece::new("A", 10.0, 5.0).with_rotation(true)])[0];
        let all: Vec<Orientation> = piece.orientations(true).collect();
        assert_eq!(all.len(), 2);
        assert!(all[1].rotated);
        assert_eq!((all[1].width, all[1].height), (5.0, 10.0));

        assert_eq!(piece.orientations(false).count(), 1);

        let square = &expand(&[Piece::new("S", 5.0, 5.0).with_rotation(true)])[0];
        assert_eq!(square.orientations(true).count(), 1);
    }

    #[test]
    fn test_validate_pieces() {
        assert!(validate_pieces(&[]).is_err());
        assert!(validate_pieces(&[Piece::new("A", 0.0, 5.0)]).is_err());
        assert!(validate_pieces(&[Piece::new("A", 5.0, f64::NAN)]).is_err());
        assert!(validate_pieces(&[Piece::new("A", 5.0, 5.0).with_quantity(0)]).is_err());
        assert!(validate_pieces(&[Piece::new("A", 5.0, 5.0)]).is_ok());
    }
}
