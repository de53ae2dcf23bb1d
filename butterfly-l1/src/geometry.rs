//! Visibility oracle
//!
//! Two points see each other under L1 when their closed bounding rectangle
//! holds no obstacle cell. A summed-area table answers that in O(1); the
//! obstacle corners worth bending at become the candidate graph vertices.

use tracing::debug;

use crate::contour::{extract_loops, Winding};
use crate::grid::OccupancyGrid;
use crate::orient::orient;
use crate::point::Point;

/// 2D inclusive prefix sums of occupancy, column-major (`x * height + y`)
#[derive(Debug, Clone)]
pub struct SummedAreaTable {
    width: usize,
    height: usize,
    sums: Vec<u32>,
}

impl SummedAreaTable {
    pub fn new<G: OccupancyGrid + ?Sized>(grid: &G) -> Self {
        let (width, height) = grid.shape();
        let mut sums = vec![0u32; width * height];
        for x in 0..width {
            let mut column = 0u32;
            for y in 0..height {
                column += u32::from(grid.get(x, y));
                let left = if x == 0 { 0 } else { sums[(x - 1) * height + y] };
                sums[x * height + y] = left + column;
            }
        }
        Self {
            width,
            height,
            sums,
        }
    }

    /// Occupied cells in [0, x] x [0, y]. Negative coordinates give 0, larger
    /// ones clamp to the last column/row.
    #[inline]
    pub fn integrate(&self, x: f64, y: f64) -> i64 {
        if x < 0.0 || y < 0.0 || self.sums.is_empty() {
            return 0;
        }
        let xi = (x as usize).min(self.width - 1);
        let yi = (y as usize).min(self.height - 1);
        i64::from(self.sums[xi * self.height + yi])
    }

    /// Occupied cells in the closed cell rectangle spanned by two corners
    pub fn count(&self, lo_x: f64, lo_y: f64, hi_x: f64, hi_y: f64) -> i64 {
        self.integrate(lo_x - 1.0, lo_y - 1.0) - self.integrate(lo_x - 1.0, hi_y)
            - self.integrate(hi_x, lo_y - 1.0)
            + self.integrate(hi_x, hi_y)
    }
}

/// Obstacle corners plus the stabbing oracle over one grid
#[derive(Debug, Clone)]
pub struct Geometry {
    width: usize,
    height: usize,
    corners: Vec<Point>,
    loop_count: usize,
    table: SummedAreaTable,
}

impl Geometry {
    /// Trace the grid and collect corners. The grid shape must already be
    /// validated (non-empty, rectangular).
    pub fn new<G: OccupancyGrid + ?Sized>(grid: &G) -> Self {
        let (width, height) = grid.shape();

        let loops = extract_loops(width, height, |x, y| grid.get(x, y), Winding::CounterClockwise);
        debug!(loops = loops.len(), "Traced obstacle boundaries");

        let mut corners = Vec::new();
        for ring in &loops {
            collect_corners(ring, width, height, |x, y| grid.get(x, y), &mut corners);
        }
        corners.sort_by(Point::cmp_xy);
        corners.dedup();

        let table = SummedAreaTable::new(grid);
        debug!(corners = corners.len(), "Built visibility oracle");

        Self {
            width,
            height,
            corners,
            loop_count: loops.len(),
            table,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Candidate vertices, sorted by (x, y) and deduplicated
    pub fn corners(&self) -> &[Point] {
        &self.corners
    }

    pub fn loop_count(&self) -> usize {
        self.loop_count
    }

    pub fn table(&self) -> &SummedAreaTable {
        &self.table
    }

    /// True if any obstacle cell lies in the closed bounding box of a and b
    #[inline]
    pub fn stab_box(&self, a: &Point, b: &Point) -> bool {
        let (lo_x, hi_x) = if a.x <= b.x { (a.x, b.x) } else { (b.x, a.x) };
        let (lo_y, hi_y) = if a.y <= b.y { (a.y, b.y) } else { (b.y, a.y) };
        self.table.count(lo_x, lo_y, hi_x, hi_y) > 0
    }

    /// Horizontal ray from `p` to column `x`
    #[inline]
    pub fn stab_ray(&self, p: &Point, x: f64) -> bool {
        self.stab_box(p, &Point::new(x, p.y))
    }

    /// Single cell
    #[inline]
    pub fn stab_tile(&self, p: &Point) -> bool {
        self.stab_box(p, p)
    }
}

/// Keep loop vertices with a negative turn (counter-clockwise on screen),
/// pushed one cell off the boundary into free space.
fn collect_corners<F>(ring: &[Point], width: usize, height: usize, occupied: F, out: &mut Vec<Point>)
where
    F: Fn(usize, usize) -> bool,
{
    let n = ring.len();
    for i in 0..n {
        let a = &ring[(i + n - 1) % n];
        let b = &ring[i];
        let c = &ring[(i + 1) % n];
        if orient(a, b, c) >= 0.0 {
            continue;
        }

        // Direction of whichever incident edge moves along each axis
        let dx = if b.x != a.x { b.x - a.x } else { b.x - c.x };
        let dy = if b.y != a.y { b.y - a.y } else { b.y - c.y };
        let x = b.x + if dx < 0.0 { -1.0 } else { 0.0 };
        let y = b.y + if dy < 0.0 { -1.0 } else { 0.0 };

        if x < 0.0 || y < 0.0 || x >= width as f64 || y >= height as f64 {
            continue;
        }
        if occupied(x as usize, y as usize) {
            continue;
        }
        out.push(Point::new(x, y));
    }
}
