//! Robust orientation predicate
//!
//! Sign of the turn a -> b -> c: positive for counter-clockwise, negative for
//! clockwise, exactly zero for collinear input. Turns are read with the y
//! axis pointing up. Grid coordinates grow downward (see [`crate::contour`]),
//! so a positive turn appears clockwise when a map is drawn on screen.
//!
//! The fast path evaluates the 2x2 determinant in floating point and accepts
//! it when its magnitude clears a forward error bound derived from the two
//! products. Near-degenerate input falls back to an exact evaluation: every
//! product is split into a non-overlapping pair with an FMA and the six terms
//! are summed as a floating-point expansion, so no cancellation can flip the
//! sign.

use crate::point::Point;

/// Unit roundoff for f64 (2^-53)
const EPSILON: f64 = 1.1102230246251565e-16;

/// Error bound coefficient for the fast determinant
const ERRBOUND: f64 = (3.0 + 16.0 * EPSILON) * EPSILON;

/// Orientation of the ordered triple (a, b, c)
pub fn orient(a: &Point, b: &Point, c: &Point) -> f64 {
    let l = (a.x - c.x) * (b.y - c.y);
    let r = (a.y - c.y) * (b.x - c.x);
    let det = l - r;

    // Opposite signs (or a zero term) cannot cancel
    let sum = if l > 0.0 {
        if r <= 0.0 {
            return det;
        }
        l + r
    } else if l < 0.0 {
        if r >= 0.0 {
            return det;
        }
        -(l + r)
    } else {
        return det;
    };

    let tol = ERRBOUND * sum;
    if det >= tol || det <= -tol {
        return det;
    }
    orient_exact(a, b, c)
}

/// Exact orientation via expansion arithmetic.
///
/// det = a.x*b.y - a.x*c.y - c.x*b.y - a.y*b.x + a.y*c.x + c.y*b.x
fn orient_exact(a: &Point, b: &Point, c: &Point) -> f64 {
    let terms = [
        (a.x, b.y),
        (-a.x, c.y),
        (-c.x, b.y),
        (-a.y, b.x),
        (a.y, c.x),
        (c.y, b.x),
    ];

    let mut expansion: Vec<f64> = Vec::with_capacity(16);
    for (u, v) in terms {
        let (hi, lo) = two_product(u, v);
        grow_expansion(&mut expansion, lo);
        grow_expansion(&mut expansion, hi);
    }

    // Components are non-overlapping and increasing in magnitude; summing
    // from the small end keeps the sign of the largest one.
    expansion.iter().fold(0.0, |acc, &x| acc + x)
}

/// Knuth's two-sum: a + b == x + err exactly
#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let x = a + b;
    let bv = x - a;
    let av = x - bv;
    (x, (a - av) + (b - bv))
}

/// a * b == hi + lo exactly (barring overflow)
#[inline]
fn two_product(a: f64, b: f64) -> (f64, f64) {
    let hi = a * b;
    (hi, a.mul_add(b, -hi))
}

/// Add a single term to an expansion in place, dropping zero components
fn grow_expansion(expansion: &mut Vec<f64>, b: f64) {
    let mut q = b;
    let mut out = 0;
    for i in 0..expansion.len() {
        let (sum, err) = two_sum(q, expansion[i]);
        q = sum;
        if err != 0.0 {
            expansion[out] = err;
            out += 1;
        }
    }
    expansion.truncate(out);
    if q != 0.0 || expansion.is_empty() {
        expansion.push(q);
    }
}
