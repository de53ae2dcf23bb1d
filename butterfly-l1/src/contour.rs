//! Obstacle boundary extraction
//!
//! Traces every occupied region of a binary raster into closed rectilinear
//! loops at pixel-edge resolution. Coordinates are cell corners: cell (x, y)
//! spans [x, x+1] x [y, y+1], with y growing downward.
//!
//! Pipeline:
//! 1. Scan rows (and columns, through a transposed view) for occupancy flips
//!    and emit one boundary segment per maximal run.
//! 2. Tag segment endpoints start=0 / end=1 and sort the horizontal and
//!    vertical endpoint streams by (x, y, tag).
//! 3. Stitch the i-th horizontal endpoint to the i-th vertical endpoint.
//! 4. Walk each unvisited segment cycle, emitting one corner per segment.

use crate::point::Point;

/// Orientation of a boundary segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Loop traversal direction in grid coordinates (y down, as drawn on
/// screen). [`orient`](crate::orient::orient) reads turns with y up, so a
/// counter-clockwise walk turns negatively at convex corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Winding {
    /// Follow `next` links
    Clockwise,
    /// Follow `prev` links
    #[default]
    CounterClockwise,
}

/// One boundary edge. `start`/`end` run along the axis, `offset` is the
/// perpendicular coordinate of the edge.
#[derive(Debug, Clone)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub axis: Axis,
    pub offset: usize,
    pub next: Option<u32>,
    pub prev: Option<u32>,
    pub visited: bool,
}

impl Segment {
    fn new(start: usize, end: usize, axis: Axis, offset: usize) -> Self {
        Self {
            start,
            end,
            axis,
            offset,
            next: None,
            prev: None,
            visited: false,
        }
    }

    /// Corner emitted for this segment while walking a loop
    fn corner(&self) -> Point {
        match self.axis {
            Axis::Horizontal => Point::new(self.start as f64, self.offset as f64),
            Axis::Vertical => Point::new(self.offset as f64, self.end as f64),
        }
    }

    /// (x, y) of the start and end endpoints
    fn endpoints(&self) -> [(usize, usize); 2] {
        match self.axis {
            Axis::Horizontal => [(self.start, self.offset), (self.end, self.offset)],
            Axis::Vertical => [(self.offset, self.start), (self.offset, self.end)],
        }
    }
}

/// Emit boundary segments parallel to one axis.
///
/// `cell(i, j)` reads line `i` at position `j`; `lines` lines of `len` cells.
/// A segment between lines i-1 and i runs start -> end when the lower line is
/// the filled one and end -> start otherwise, which keeps every loop wound
/// the same way.
fn scan_parallel<F>(lines: usize, len: usize, cell: F, axis: Axis, out: &mut Vec<Segment>)
where
    F: Fn(usize, usize) -> bool,
{
    // First line: boundary against the outside
    let mut a = false;
    let mut x0 = 0;
    for j in 0..len {
        let b = cell(0, j);
        if b == a {
            continue;
        }
        if a {
            out.push(Segment::new(x0, j, axis, 0));
        }
        if b {
            x0 = j;
        }
        a = b;
    }
    if a {
        out.push(Segment::new(x0, len, axis, 0));
    }

    // Interior: compare consecutive lines
    for i in 1..lines {
        let mut a = false;
        let mut b = false;
        let mut x0 = 0;
        for j in 0..len {
            let c = cell(i - 1, j);
            let d = cell(i, j);
            if c == a && d == b {
                continue;
            }
            if a != b {
                if a {
                    out.push(Segment::new(j, x0, axis, i));
                } else {
                    out.push(Segment::new(x0, j, axis, i));
                }
            }
            if c != d {
                x0 = j;
            }
            a = c;
            b = d;
        }
        if a != b {
            if a {
                out.push(Segment::new(len, x0, axis, i));
            } else {
                out.push(Segment::new(x0, len, axis, i));
            }
        }
    }

    // Last line: reversed, boundary against the outside
    let mut a = false;
    let mut x0 = 0;
    for j in 0..len {
        let b = cell(lines - 1, j);
        if b == a {
            continue;
        }
        if a {
            out.push(Segment::new(j, x0, axis, lines));
        }
        if b {
            x0 = j;
        }
        a = b;
    }
    if a {
        out.push(Segment::new(len, x0, axis, lines));
    }
}

/// Sorted endpoint stream: (x, y, tag, segment)
fn sorted_endpoints(segments: &[Segment], range: std::ops::Range<usize>) -> Vec<(usize, usize, u8, u32)> {
    let mut out = Vec::with_capacity(2 * range.len());
    for id in range {
        let [s, e] = segments[id].endpoints();
        out.push((s.0, s.1, 0, id as u32));
        out.push((e.0, e.1, 1, id as u32));
    }
    out.sort_unstable();
    out
}

/// Boundary segments of the grid with `next`/`prev` links stitched.
///
/// Horizontal segments come first; the count is returned alongside.
pub fn stitch_segments<F>(width: usize, height: usize, occupied: F) -> (Vec<Segment>, usize)
where
    F: Fn(usize, usize) -> bool,
{
    let mut segments = Vec::new();
    if width == 0 || height == 0 {
        return (segments, 0);
    }

    scan_parallel(height, width, |i, j| occupied(j, i), Axis::Horizontal, &mut segments);
    let horizontal = segments.len();
    scan_parallel(width, height, |i, j| occupied(i, j), Axis::Vertical, &mut segments);

    let hs = sorted_endpoints(&segments, 0..horizontal);
    let vs = sorted_endpoints(&segments, horizontal..segments.len());
    debug_assert_eq!(hs.len(), vs.len(), "unbalanced boundary endpoints");

    for (h, v) in hs.iter().zip(vs.iter()) {
        let (hid, vid) = (h.3, v.3);
        if h.2 != 0 {
            segments[hid as usize].next = Some(vid);
            segments[vid as usize].prev = Some(hid);
        } else {
            segments[hid as usize].prev = Some(vid);
            segments[vid as usize].next = Some(hid);
        }
    }

    (segments, horizontal)
}

/// Extract every obstacle boundary (outer boundaries and holes) as a closed
/// loop of corners.
///
/// Diagonally touching cells share a corner; their boundaries may come out
/// as two loops or as one loop passing through the shared corner twice.
pub fn extract_loops<F>(width: usize, height: usize, occupied: F, winding: Winding) -> Vec<Vec<Point>>
where
    F: Fn(usize, usize) -> bool,
{
    let (mut segments, horizontal) = stitch_segments(width, height, occupied);

    let mut loops = Vec::new();
    for first in 0..horizontal {
        if segments[first].visited {
            continue;
        }
        let mut corners = Vec::new();
        let mut cursor = Some(first as u32);
        while let Some(id) = cursor {
            let seg = &mut segments[id as usize];
            if seg.visited {
                break;
            }
            seg.visited = true;
            corners.push(seg.corner());
            cursor = match winding {
                Winding::Clockwise => seg.next,
                Winding::CounterClockwise => seg.prev,
            };
        }
        loops.push(corners);
    }
    loops
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn parse(rows: &[&str]) -> (usize, usize, Vec<Vec<bool>>) {
        let cells: Vec<Vec<bool>> = rows
            .iter()
            .map(|r| r.chars().map(|c| c == '#').collect())
            .collect();
        (rows[0].len(), rows.len(), cells)
    }

    fn loops_of(rows: &[&str]) -> Vec<Vec<(f64, f64)>> {
        let (w, h, cells) = parse(rows);
        extract_loops(w, h, |x, y| cells[y][x], Winding::CounterClockwise)
            .into_iter()
            .map(|l| l.into_iter().map(|p| (p.x, p.y)).collect())
            .collect()
    }

    #[test]
    fn test_single_cell() {
        let loops = loops_of(&["...", ".#.", "..."]);
        assert_eq!(loops, vec![vec![(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (2.0, 1.0)]]);
    }

    #[test]
    fn test_block() {
        let loops = loops_of(&["....", ".##.", ".##.", "...."]);
        assert_eq!(loops, vec![vec![(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)]]);
    }

    #[test]
    fn test_full_and_empty() {
        let loops = loops_of(&["##", "##"]);
        assert_eq!(loops, vec![vec![(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)]]);
        assert!(loops_of(&["...", "..."]).is_empty());
    }

    #[test]
    fn test_ring_has_hole() {
        let loops = loops_of(&["#####", "#...#", "#.#.#", "#...#", "#####"]);
        assert_eq!(loops.len(), 3, "outer boundary, hole, pillar");
        assert_eq!(loops[0], vec![(0.0, 0.0), (0.0, 5.0), (5.0, 5.0), (5.0, 0.0)]);
        // The hole winds the other way
        assert_eq!(loops[1], vec![(4.0, 1.0), (4.0, 4.0), (1.0, 4.0), (1.0, 1.0)]);
        assert_eq!(loops[2], vec![(2.0, 2.0), (2.0, 3.0), (3.0, 3.0), (3.0, 2.0)]);
    }

    #[test]
    fn test_knife_edge_configurations() {
        let loops = loops_of(&["#.", ".#"]);
        assert_eq!(
            loops,
            vec![
                vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)],
                vec![(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (2.0, 1.0)],
            ]
        );

        // Opposite diagonal: one loop through the shared corner twice
        let loops = loops_of(&[".#", "#."]);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 8);
        let shared = loops[0].iter().filter(|&&p| p == (1.0, 1.0)).count();
        assert_eq!(shared, 2);

        let loops = loops_of(&["#.#", ".#.", "#.#"]);
        assert_eq!(loops.len(), 3);
        assert_eq!(loops.iter().map(Vec::len).sum::<usize>(), 20);
    }

    #[test]
    fn test_clockwise_walk_visits_same_corners() {
        let (w, h, cells) = parse(&["....", ".##.", ".#..", "...."]);
        let ccw = extract_loops(w, h, |x, y| cells[y][x], Winding::CounterClockwise);
        let cw = extract_loops(w, h, |x, y| cells[y][x], Winding::Clockwise);
        assert_eq!(ccw.len(), 1);
        assert_eq!(cw.len(), 1);
        assert_eq!(ccw[0].len(), 6);
        assert_eq!(cw[0].len(), 6);
    }

    #[test]
    fn test_no_dangling_links() {
        // Random patterns, including knife edges
        let mut rng = StdRng::seed_from_u64(0x2545_f491);
        for _ in 0..200 {
            let w: usize = rng.random_range(1..=9);
            let h: usize = rng.random_range(1..=9);
            let fill = rng.random_range(0.2..0.8);
            let cells: Vec<bool> = (0..w * h).map(|_| rng.random_bool(fill)).collect();
            let occ = |x: usize, y: usize| cells[y * w + x];

            let (segments, horizontal) = stitch_segments(w, h, occ);
            assert_eq!(segments.len() % 2, 0);
            assert_eq!(horizontal * 2, segments.len(), "one vertical edge per horizontal edge");
            for (i, seg) in segments.iter().enumerate() {
                assert!(seg.next.is_some(), "segment {i} has no next link ({w}x{h})");
                assert!(seg.prev.is_some(), "segment {i} has no prev link ({w}x{h})");
            }
        }
    }
}
