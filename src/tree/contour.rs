//! Skyline of the packed region, rebuilt for every pack.

use crate::geometry::Coord;

/// One maximal horizontal run of the skyline. Spans `[x, next.x)`; the last
/// segment spans `[x, ∞)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub x: Coord,
    pub y: Coord,
}

/// Ordered skyline: first segment at x = 0, strictly increasing x, adjacent
/// segments never share a height, and the tail is always at height 0.
#[derive(Debug, Clone)]
pub struct Contour {
    segments: Vec<Segment>,
}

impl Default for Contour {
    fn default() -> Self {
        Self::new()
    }
}

impl Contour {
    pub fn new() -> Self {
        Self {
            segments: vec![Segment { x: 0, y: 0 }],
        }
    }

    pub fn with_capacity(blocks: usize) -> Self {
        let mut segments = Vec::with_capacity(2 * blocks + 1);
        segments.push(Segment { x: 0, y: 0 });
        Self { segments }
    }

    /// Back to a single zero-height segment.
    pub fn reset(&mut self) {
        self.segments.clear();
        self.segments.push(Segment { x: 0, y: 0 });
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Index of the segment covering `x`.
    fn covering(&self, x: Coord) -> usize {
        // segments[0].x == 0, so at least one segment satisfies the predicate.
        self.segments.partition_point(|seg| seg.x <= x) - 1
    }

    /// Highest skyline point over `[start, end)`, checking every segment that
    /// intersects the interval.
    pub fn max_height(&self, start: Coord, end: Coord) -> Coord {
        if end <= start {
            return 0;
        }
        self.segments[self.covering(start)..]
            .iter()
            .take_while(|seg| seg.x < end)
            .map(|seg| seg.y)
            .max()
            .unwrap_or(0)
    }

    /// Raise `[start, end)` to exactly `top`. A segment straddling `end` keeps
    /// its old height past `end`; segments outside the span are untouched.
    pub fn raise(&mut self, start: Coord, end: Coord, top: Coord) {
        if end <= start {
            return;
        }
        let first = self.segments.partition_point(|seg| seg.x < start);
        let past = self.segments.partition_point(|seg| seg.x <= end);
        let tail = self.segments[past - 1].y;

        let mut replacement = Vec::with_capacity(2);
        if first == 0 || self.segments[first - 1].y != top {
            replacement.push(Segment { x: start, y: top });
        }
        if tail != top {
            replacement.push(Segment { x: end, y: tail });
        }
        self.segments.splice(first..past, replacement);
    }

    /// Right edge of the packed region.
    pub fn right(&self) -> Coord {
        self.segments.last().map_or(0, |seg| seg.x)
    }

    /// Highest point of the whole skyline.
    pub fn top(&self) -> Coord {
        self.segments.iter().map(|seg| seg.y).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heights(contour: &Contour) -> Vec<(Coord, Coord)> {
        contour.segments().iter().map(|seg| (seg.x, seg.y)).collect()
    }

    fn assert_well_formed(contour: &Contour) {
        let segs = contour.segments();
        assert_eq!(segs[0].x, 0);
        assert_eq!(segs.last().unwrap().y, 0);
        for pair in segs.windows(2) {
            assert!(pair[0].x < pair[1].x, "x not increasing: {:?}", segs);
            assert_ne!(pair[0].y, pair[1].y, "unmerged segments: {:?}", segs);
        }
    }

    #[test]
    fn fresh_contour_is_flat() {
        let contour = Contour::new();
        assert_eq!(contour.max_height(0, 100), 0);
        assert_eq!(contour.right(), 0);
        assert_eq!(heights(&contour), vec![(0, 0)]);
    }

    #[test]
    fn raise_splits_and_keeps_tail_height() {
        let mut contour = Contour::new();
        contour.raise(0, 4, 2);
        assert_eq!(heights(&contour), vec![(0, 2), (4, 0)]);

        contour.raise(4, 7, 5);
        assert_eq!(heights(&contour), vec![(0, 2), (4, 5), (7, 0)]);

        contour.raise(0, 2, 5);
        assert_eq!(heights(&contour), vec![(0, 5), (2, 2), (4, 5), (7, 0)]);
        assert_well_formed(&contour);
    }

    #[test]
    fn max_height_covers_every_intersecting_segment() {
        let mut contour = Contour::new();
        contour.raise(0, 2, 1);
        contour.raise(2, 4, 9);
        contour.raise(4, 8, 3);

        // Starts on the low segment but crosses the tall one.
        assert_eq!(contour.max_height(1, 5), 9);
        assert_eq!(contour.max_height(4, 6), 3);
        // Ends exactly where the tall segment starts: not included.
        assert_eq!(contour.max_height(0, 2), 1);
        assert_eq!(contour.max_height(8, 20), 0);
        assert_eq!(contour.max_height(7, 20), 3);
    }

    #[test]
    fn raise_swallows_inner_segments() {
        let mut contour = Contour::new();
        contour.raise(0, 2, 1);
        contour.raise(2, 4, 9);
        contour.raise(4, 8, 3);
        contour.raise(1, 6, 12);
        assert_eq!(heights(&contour), vec![(0, 1), (1, 12), (6, 3), (8, 0)]);
        assert_well_formed(&contour);
    }

    #[test]
    fn equal_heights_merge() {
        let mut contour = Contour::new();
        contour.raise(0, 3, 4);
        contour.raise(3, 5, 4);
        assert_eq!(heights(&contour), vec![(0, 4), (5, 0)]);

        contour.raise(6, 8, 4);
        contour.raise(5, 6, 4);
        assert_eq!(heights(&contour), vec![(0, 4), (8, 0)]);
        assert_eq!(contour.right(), 8);
        assert_eq!(contour.top(), 4);
    }

    #[test]
    fn reset_discards_everything() {
        let mut contour = Contour::with_capacity(4);
        contour.raise(0, 10, 10);
        contour.reset();
        assert_eq!(heights(&contour), vec![(0, 0)]);
    }
}
