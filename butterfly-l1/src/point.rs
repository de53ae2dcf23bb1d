//! Planar points with grid-canonical equality

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Points compare equal when they truncate to the same 1/100 cell.
const RESOLUTION: f64 = 100.0;

/// Immutable (x, y) position in grid units.
///
/// Equality and hashing go through [`Point::key`], which scales by 100 and
/// truncates toward zero. Two points built from slightly different float
/// arithmetic still land in the same dedup bucket, and the result is the
/// same on every platform.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Canonical integer key used for equality and hashing
    #[inline]
    pub fn key(&self) -> (i64, i64) {
        ((self.x * RESOLUTION) as i64, (self.y * RESOLUTION) as i64)
    }

    /// L1 distance
    #[inline]
    pub fn manhattan(&self, other: &Point) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Same row or same column (exact coordinates)
    #[inline]
    pub fn shares_axis(&self, other: &Point) -> bool {
        self.x == other.x || self.y == other.y
    }

    /// Lexicographic (x, y) order, used for corners and landmark seeds
    pub fn cmp_xy(&self, other: &Point) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }

    /// Lexicographic (y, x) order, used for split-line events
    pub fn cmp_yx(&self, other: &Point) -> Ordering {
        self.y
            .total_cmp(&other.y)
            .then_with(|| self.x.total_cmp(&other.x))
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x as f64, y as f64)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_equality_truncates_to_resolution() {
        assert_eq!(Point::new(3.0, 4.0), Point::new(3.004, 4.009));
        assert_ne!(Point::new(3.0, 4.0), Point::new(3.01, 4.0));
        // 0.1 + 0.2 is not 0.3 in binary, but both land in the same cell
        assert_eq!(Point::new(0.1 + 0.2, 1.0), Point::new(0.3, 1.0));
    }

    #[test]
    fn test_hash_agrees_with_equality() {
        let mut set = FxHashSet::default();
        set.insert(Point::new(5.0, 7.0));
        assert!(set.contains(&Point::new(5.001, 7.005)));
        assert!(!set.contains(&Point::new(7.0, 5.0)));
    }

    #[test]
    fn test_orderings() {
        let a = Point::new(1.0, 5.0);
        let b = Point::new(2.0, 0.0);
        assert_eq!(a.cmp_xy(&b), Ordering::Less);
        assert_eq!(a.cmp_yx(&b), Ordering::Greater);
        assert_eq!(a.manhattan(&b), 6.0);
        assert!(!a.shares_axis(&b));
        assert!(a.shares_axis(&Point::new(1.0, -3.0)));
    }
}
