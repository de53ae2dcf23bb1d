//! Recursive BSP construction
//!
//! Vertices are created on first sight through a dedup map keyed by the
//! canonical point; visibility edges are collected as point pairs and linked
//! once the whole tree exists.

use rustc_hash::FxHashMap;
use tracing::debug;

use super::{BspNode, Bucket};
use crate::geometry::Geometry;
use crate::graph::Graph;
use crate::point::Point;

/// Shape of the built tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildCounts {
    pub internal_nodes: usize,
    pub leaves: usize,
    pub buckets: usize,
    pub steiner_vertices: usize,
}

/// Corners split around one vertical line
struct Partition {
    left: Vec<Point>,
    right: Vec<Point>,
    /// Corners exactly on the line
    on_line: Vec<Point>,
    /// Crossing events sorted by (y, x): per row, the nearest visible corner
    /// on each side plus everything on the line
    events: Vec<Point>,
}

/// One bucket's worth of points before they become vertex ids
struct BucketPoints {
    y0: f64,
    y1: f64,
    top: Option<Point>,
    bottom: Option<Point>,
    left: Vec<Point>,
    right: Vec<Point>,
    on: Vec<Point>,
}

struct BuildContext<'a> {
    geometry: &'a Geometry,
    graph: &'a mut Graph,
    ids: FxHashMap<Point, u32>,
    edges: Vec<(Point, Point)>,
    leaf_cutoff: usize,
    bucket_size: usize,
    counts: BuildCounts,
}

/// Build the tree over `geometry.corners()` and add its vertices and edges
/// to `graph`.
pub(crate) fn build_tree(
    geometry: &Geometry,
    graph: &mut Graph,
    leaf_cutoff: usize,
    bucket_size: usize,
) -> (Option<Box<BspNode>>, BuildCounts) {
    let mut ctx = BuildContext {
        geometry,
        graph,
        ids: FxHashMap::default(),
        edges: Vec::new(),
        leaf_cutoff,
        bucket_size: bucket_size.max(1),
        counts: BuildCounts::default(),
    };

    let root = ctx.tree(geometry.corners());

    let edges = std::mem::take(&mut ctx.edges);
    for (a, b) in edges {
        let u = ctx.vertex(a);
        let v = ctx.vertex(b);
        ctx.graph.link(u, v);
    }

    debug!(
        internal_nodes = ctx.counts.internal_nodes,
        leaves = ctx.counts.leaves,
        buckets = ctx.counts.buckets,
        steiner = ctx.counts.steiner_vertices,
        "Built BSP"
    );
    (root, ctx.counts)
}

impl BuildContext<'_> {
    /// Get-or-insert the vertex at `p`
    fn vertex(&mut self, p: Point) -> u32 {
        let graph = &mut *self.graph;
        *self.ids.entry(p).or_insert_with(|| graph.add_vertex(p))
    }

    fn edge_if_visible(&mut self, a: Point, b: Point) {
        if !self.geometry.stab_box(&a, &b) {
            self.edges.push((a, b));
        }
    }

    fn tree(&mut self, corners: &[Point]) -> Option<Box<BspNode>> {
        if corners.is_empty() {
            return None;
        }
        if corners.len() < self.leaf_cutoff {
            return Some(Box::new(self.leaf(corners)));
        }

        let x = corners[corners.len() >> 1].x;
        let partition = self.partition(corners, x);
        let left = self.tree(&partition.left);
        let right = self.tree(&partition.right);

        for &p in &partition.on_line {
            self.vertex(p);
        }

        let events = &partition.events;
        let mut buckets = Vec::new();
        let mut last_bottom: Option<Point> = None;
        let mut i = 0;
        while i < events.len() {
            let start = i;
            let mut end = (i + self.bucket_size - 1).min(events.len() - 1) + 1;
            // Never split a row across buckets
            while end < events.len() && events[end - 1].y == events[end].y {
                end += 1;
            }
            i = end;

            let bb = self.bucket(&events[start..end], x);
            if let (Some(a), Some(b)) = (last_bottom, bb.top) {
                self.edge_if_visible(a, b);
            }
            last_bottom = bb.bottom;

            buckets.push(Bucket {
                y0: bb.y0,
                y1: bb.y1,
                top: bb.top.map(|p| self.vertex(p)),
                bottom: bb.bottom.map(|p| self.vertex(p)),
                left: bb.left.iter().map(|&p| self.vertex(p)).collect(),
                right: bb.right.iter().map(|&p| self.vertex(p)).collect(),
                on: bb.on.iter().map(|&p| self.vertex(p)).collect(),
            });
        }

        self.counts.internal_nodes += 1;
        self.counts.buckets += buckets.len();
        Some(Box::new(BspNode::Internal {
            split_x: x,
            buckets,
            left,
            right,
        }))
    }

    /// All-pairs visibility among a handful of corners
    fn leaf(&mut self, corners: &[Point]) -> BspNode {
        let mut vertices = Vec::with_capacity(corners.len());
        for (i, &u) in corners.iter().enumerate() {
            vertices.push(self.vertex(u));
            for &v in &corners[..i] {
                self.edge_if_visible(u, v);
            }
        }
        self.counts.leaves += 1;
        BspNode::Leaf { vertices }
    }

    fn partition(&self, corners: &[Point], x: f64) -> Partition {
        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut on = Vec::new();
        for &c in corners {
            if !self.geometry.stab_ray(&c, x) {
                on.push(c);
            }
            if c.x < x {
                left.push(c);
            } else if c.x > x {
                right.push(c);
            }
        }
        on.sort_by(Point::cmp_yx);

        // Collapse each row to the events that cross the line
        let mut on_line = Vec::new();
        let mut events = Vec::new();
        let mut i = 0;
        while i < on.len() {
            let y = on[i].y;
            let mut l = x;
            while i < on.len() && on[i].y == y && on[i].x < x {
                l = on[i].x;
                i += 1;
            }
            if l < x {
                events.push(Point::new(l, y));
            }
            while i < on.len() && on[i].y == y && on[i].x == x {
                on_line.push(on[i]);
                events.push(on[i]);
                i += 1;
            }
            let mut r = x;
            if i < on.len() && on[i].y == y {
                r = on[i].x;
                i += 1;
                while i < on.len() && on[i].y == y {
                    i += 1;
                }
            }
            if r > x {
                events.push(Point::new(r, y));
            }
        }

        Partition {
            left,
            right,
            on_line,
            events,
        }
    }

    /// Link one bucket's events across the split line, adding split-line
    /// vertices at its first and last row where the line is free.
    fn bucket(&mut self, events: &[Point], x: f64) -> BucketPoints {
        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut on = Vec::new();
        for &p in events {
            if p.x < x {
                left.push(p);
            } else if p.x > x {
                right.push(p);
            } else {
                on.push(p);
            }
        }

        let y0 = events[0].y;
        let y1 = events[events.len() - 1].y;
        let top = self.steiner(&mut on, x, y0, true);
        let bottom = self.steiner(&mut on, x, y1, false);

        self.bipartite(&left, &right);
        self.bipartite(&on, &left);
        self.bipartite(&on, &right);
        for pair in on.windows(2) {
            self.edge_if_visible(pair[0], pair[1]);
        }

        BucketPoints {
            y0,
            y1,
            top,
            bottom,
            left,
            right,
            on,
        }
    }

    /// Split-line vertex at (x, y): reuse a corner already there, otherwise
    /// insert a new one at the front or back of `on`.
    fn steiner(&mut self, on: &mut Vec<Point>, x: f64, y: f64, front: bool) -> Option<Point> {
        let p = Point::new(x, y);
        if self.geometry.stab_tile(&p) {
            return None;
        }
        if let Some(&existing) = on.iter().find(|q| q.x == x && q.y == y) {
            return Some(existing);
        }
        if front {
            on.insert(0, p);
        } else {
            on.push(p);
        }
        if !self.ids.contains_key(&p) {
            self.counts.steiner_vertices += 1;
        }
        self.vertex(p);
        Some(p)
    }

    fn bipartite(&mut self, a: &[Point], b: &[Point]) {
        for &u in a {
            for &v in b {
                self.edge_if_visible(u, v);
            }
        }
    }
}
