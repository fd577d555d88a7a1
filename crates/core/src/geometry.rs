//! Rectangle geometry and guillotine free-space tracking.
//!
//! All coordinates use a top-left origin: `x` grows to the right and `y`
//! grows downward, so "above" a rectangle means smaller `y`.
//!
//! Free space on a sheet is tracked as a set of maximal free rectangles.
//! Placing a piece splits every free rectangle it touches into up to four
//! edge-to-edge strips (the guillotine approximation); L-shaped remainders
//! are never modeled.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance for floating-point comparisons.
pub const EPSILON: f64 = 1e-9;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Extent along x.
    pub width: f64,
    /// Extent along y.
    pub height: f64,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (`x + width`).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Surface of the rectangle.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Returns true if the interiors of both rectangles intersect.
    ///
    /// Rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() <= other.x + EPSILON
            || other.right() <= self.x + EPSILON
            || self.bottom() <= other.y + EPSILON
            || other.bottom() <= self.y + EPSILON)
    }

    /// Returns true if `other` lies entirely inside this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x - EPSILON
            && other.y >= self.y - EPSILON
            && other.right() <= self.right() + EPSILON
            && other.bottom() <= self.bottom() + EPSILON
    }

    /// Returns true if a `width` x `height` piece fits inside this rectangle.
    pub fn fits(&self, width: f64, height: f64) -> bool {
        width <= self.width + EPSILON && height <= self.height + EPSILON
    }

    /// Leftover surface when a `width` x `height` piece is put in this rectangle.
    ///
    /// Smaller is a tighter fit. Only meaningful when [`Rect::fits`] holds.
    pub fn fit_waste(&self, width: f64, height: f64) -> f64 {
        (self.width - width) * (self.height - height)
    }
}

/// Splits the free rectangles around a newly used region.
///
/// Every free rectangle overlapping `used` is replaced by the strips above,
/// below, left and right of `used`, each clipped to that free rectangle.
/// Free rectangles that do not overlap pass through unchanged. Children whose
/// width or height is not larger than `kerf` are dropped, since no piece could
/// be cut from them once the blade width is taken.
pub fn split_free_space(free: &[Rect], used: &Rect, kerf: f64) -> Vec<Rect> {
    let mut result = Vec::with_capacity(free.len() + 4);
    let min_side = kerf.max(0.0) + EPSILON;

    for rect in free {
        if !rect.overlaps(used) {
            result.push(*rect);
            continue;
        }

        let children = [
            // Above
            (used.y > rect.y)
                .then(|| Rect::new(rect.x, rect.y, rect.width, used.y - rect.y)),
            // Below
            (used.bottom() < rect.bottom()).then(|| {
                Rect::new(
                    rect.x,
                    used.bottom(),
                    rect.width,
                    rect.bottom() - used.bottom(),
                )
            }),
            // Left
            (used.x > rect.x)
                .then(|| Rect::new(rect.x, rect.y, used.x - rect.x, rect.height)),
            // Right
            (used.right() < rect.right()).then(|| {
                Rect::new(
                    used.right(),
                    rect.y,
                    rect.right() - used.right(),
                    rect.height,
                )
            }),
        ];

        result.extend(
            children
                .into_iter()
                .flatten()
                .filter(|child| child.width > min_side && child.height > min_side),
        );
    }

    result
}

/// Removes free rectangles that are fully contained in another one.
///
/// The union of the free space is unchanged. Of two identical rectangles
/// the later one is kept.
pub fn prune_contained(free: &mut Vec<Rect>) {
    let n = free.len();
    let mut keep = vec![true; n];

    for i in 0..n {
        for j in 0..n {
            if i == j || !keep[j] {
                continue;
            }
            if free[j].contains(&free[i]) {
                keep[i] = false;
                break;
            }
        }
    }

    let mut idx = 0;
    free.retain(|_| {
        let kept = keep[idx];
        idx += 1;
        kept
    });
}

/// Recomputes the free space of a sheet from its occupied footprints.
///
/// Footprints are split out one by one in the given order, discarding kerf
/// slivers exactly as incremental placement does.
pub fn rebuild_free_space<'a, I>(bounds: Rect, occupied: I, kerf: f64) -> Vec<Rect>
where
    I: IntoIterator<Item = &'a Rect>,
{
    let mut free = vec![bounds];
    for rect in occupied {
        free = split_free_space(&free, rect, kerf);
        prune_contained(&mut free);
    }
    free
}
