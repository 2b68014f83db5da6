use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Integer lattice index of a grid cell on the shelf plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub i: i32,
    pub j: i32,
}

impl GridCell {
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }
}

/// Square lattice of cell centers at multiples of `spacing`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLattice {
    spacing: f32,
}

impl GridLattice {
    /// Panics unless `spacing` is finite and positive.
    pub fn new(spacing: f32) -> Self {
        assert!(
            spacing.is_finite() && spacing > 0.0,
            "grid spacing must be positive, got {spacing}"
        );
        Self { spacing }
    }

    #[inline]
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Cell whose center is nearest to `p`.
    #[inline]
    pub fn cell_of(&self, p: &Point2<f32>) -> GridCell {
        GridCell::new(self.index(p.x), self.index(p.y))
    }

    #[inline]
    fn index(&self, v: f32) -> i32 {
        (v / self.spacing).round() as i32
    }

    #[inline]
    pub fn center(&self, cell: GridCell) -> Point2<f32> {
        Point2::new(cell.i as f32 * self.spacing, cell.j as f32 * self.spacing)
    }

    /// Cell square corners, counter-clockwise from bottom-left.
    pub fn corners(&self, cell: GridCell) -> [Point2<f32>; 4] {
        let c = self.center(cell);
        let h = self.spacing * 0.5;
        [
            Point2::new(c.x - h, c.y - h),
            Point2::new(c.x + h, c.y - h),
            Point2::new(c.x + h, c.y + h),
            Point2::new(c.x - h, c.y + h),
        ]
    }

    /// Number of cells [`cells_around`](Self::cells_around) would yield,
    /// saturating for absurd bounds.
    pub fn sweep_len(&self, min: &Point2<f32>, max: &Point2<f32>) -> u64 {
        let grow = self.spacing;
        let span = |lo: f32, hi: f32| {
            let (a, b) = (self.index(lo - grow) as i64, self.index(hi + grow) as i64);
            (b - a + 1).max(0) as u64
        };
        span(min.x, max.x).saturating_mul(span(min.y, max.y))
    }

    /// Every cell whose center lies in the box grown by one spacing per side,
    /// bounds snapped to the lattice and inclusive. Column-major: `i` outer.
    pub fn cells_around(
        &self,
        min: &Point2<f32>,
        max: &Point2<f32>,
    ) -> impl Iterator<Item = GridCell> {
        let grow = self.spacing;
        let (i0, i1) = (self.index(min.x - grow), self.index(max.x + grow));
        let (j0, j1) = (self.index(min.y - grow), self.index(max.y + grow));
        (i0..=i1).flat_map(move |i| (j0..=j1).map(move |j| GridCell::new(i, j)))
    }
}
