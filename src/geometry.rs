use serde::{Deserialize, Serialize};

/// Integer chip coordinate.
pub type Coord = u64;

/// Width/height pair, used for outlines and packed extents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: Coord,
    pub height: Coord,
}

impl Size {
    pub const fn new(width: Coord, height: Coord) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u128 {
        self.width as u128 * self.height as u128
    }

    /// True when `self` fits inside `outline` without rotation.
    pub fn fits_within(&self, outline: Size) -> bool {
        self.width <= outline.width && self.height <= outline.height
    }
}

/// Placed rectangle given by its lower-left `(x1, y1)` and upper-right
/// `(x2, y2)` corners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x1: Coord,
    pub y1: Coord,
    pub x2: Coord,
    pub y2: Coord,
}

impl Rect {
    pub const fn new(x1: Coord, y1: Coord, x2: Coord, y2: Coord) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub const fn from_origin(x: Coord, y: Coord, width: Coord, height: Coord) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> Coord {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> Coord {
        self.y2.saturating_sub(self.y1)
    }

    pub fn area(&self) -> u128 {
        self.width() as u128 * self.height() as u128
    }

    /// Centre point, as used by the half-perimeter wirelength estimate.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.x1 + self.x2) as f64 / 2.0,
            (self.y1 + self.y2) as f64 / 2.0,
        )
    }

    /// Area overlap test. Rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x1 < other.x2 && other.x1 < self.x2 && self.y1 < other.y2 && other.y1 < self.y2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_overlap() {
        let left = Rect::new(0, 0, 4, 2);
        let right = Rect::new(4, 0, 7, 5);
        let above = Rect::new(0, 2, 2, 5);
        assert!(!left.overlaps(&right));
        assert!(!left.overlaps(&above));
        assert!(!right.overlaps(&above));
    }

    #[test]
    fn interior_intersection_overlaps() {
        let a = Rect::from_origin(0, 0, 5, 5);
        let b = Rect::from_origin(4, 4, 5, 5);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn center_is_midpoint() {
        assert_eq!(Rect::new(2, 4, 5, 10).center(), (3.5, 7.0));
    }

    #[test]
    fn size_fit_check() {
        let outline = Size::new(10, 8);
        assert!(Size::new(10, 8).fits_within(outline));
        assert!(!Size::new(11, 2).fits_within(outline));
        assert_eq!(Size::new(3, 4).area(), 12);
    }
}
