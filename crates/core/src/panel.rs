//! Stock panel definition.

use crate::geometry::{Rect, EPSILON};
use crate::piece::UnitPiece;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One physical stock sheet size.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Panel {
    /// Extent along x.
    pub width: f64,
    /// Extent along y.
    pub height: f64,
}

impl Panel {
    /// Creates a new panel.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Surface of the panel.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Full panel rectangle anchored at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Returns true if a `width` x `height` piece fits an empty panel.
    pub fn fits(&self, width: f64, height: f64) -> bool {
        self.bounds().fits(width, height)
    }

    /// Returns true if some allowed orientation of `piece` fits an empty panel.
    pub fn can_host(&self, piece: &UnitPiece, allow_rotation: bool) -> bool {
        piece
            .orientations(allow_rotation)
            .any(|o| self.fits(o.width, o.height))
    }

    /// Returns true if `piece` only fits this panel when rotated.
    pub fn needs_rotation(&self, piece: &UnitPiece) -> bool {
        piece.can_rotate
            && !self.fits(piece.width, piece.height)
            && self.fits(piece.height, piece.width)
    }

    /// Validates the panel dimensions.
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= EPSILON
            || self.height <= EPSILON
        {
            return Err(Error::ConfigError(format!(
                "Panel must have positive dimensions, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{expand, Piece};

    #[test]
    fn test_can_host() {
        let panel = Panel::new(300.0, 500.0);
        let units = expand(&[
            Piece::new("wide", 400.0, 100.0).with_rotation(true),
            Piece::new("fixed", 400.0, 100.0),
            Piece::new("huge", 600.0, 600.0).with_rotation(true),
        ]);

        assert!(panel.can_host(&units[0], true));
        assert!(!panel.can_host(&units[0], false));
        assert!(!panel.can_host(&units[1], true));
        assert!(!panel.can_host(&units[2], true));
    }

    #[test]
    fn test_needs_rotation() {
        let panel = Panel::new(300.0, 500.0);
        let units = expand(&[
            Piece::new("wide", 400.0, 100.0).with_rotation(true),
            Piece::new("small", 100.0, 100.0).with_rotation(true),
        ]);

        assert!(panel.needs_rotation(&units[0]));
        assert!(!panel.needs_rotation(&units[1]));
    }

    #[test]
    fn test_validate() {
        assert!(Panel::new(100.0, 100.0).validate().is_ok());
        assert!(Panel::new(0.0, 100.0).validate().is_err());
        assert!(Panel::new(100.0, f64::INFINITY).validate().is_err());
    }
}
