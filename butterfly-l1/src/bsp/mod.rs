//! Vertical-split BSP over obstacle corners
//!
//! Internal nodes split at a corner x and keep, per y-range bucket, the
//! vertices proven visible across the split line. Leaves keep a plain vertex
//! list. A query point docks into the graph by walking one root-to-leaf path
//! and linking every candidate that passes a fresh stabbing test.

mod builder;

pub use builder::BuildCounts;
pub(crate) use builder::build_tree;

use crate::geometry::Geometry;
use crate::graph::Graph;
use crate::point::Point;

/// Vertices near one y-range of a split line
#[derive(Debug, Clone)]
pub struct Bucket {
    pub y0: f64,
    pub y1: f64,
    /// Split-line vertex at `y0`, if that cell is free
    pub top: Option<u32>,
    /// Split-line vertex at `y1`, if that cell is free
    pub bottom: Option<u32>,
    pub left: Vec<u32>,
    pub right: Vec<u32>,
    pub on: Vec<u32>,
}

#[derive(Debug)]
pub enum BspNode {
    Internal {
        split_x: f64,
        /// Sorted by y, non-overlapping
        buckets: Vec<Bucket>,
        left: Option<Box<BspNode>>,
        right: Option<Box<BspNode>>,
    },
    Leaf {
        vertices: Vec<u32>,
    },
}

/// Which query endpoint is being docked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Source,
    Target,
}

/// Link `p` to every vertex the tree proposes and the oracle confirms
pub(crate) fn connect(
    root: Option<&BspNode>,
    geometry: &Geometry,
    graph: &mut Graph,
    p: Point,
    side: Side,
) {
    let mut node = root;
    while let Some(current) = node {
        match current {
            BspNode::Leaf { vertices } => {
                for &v in vertices {
                    dock(geometry, graph, p, side, v);
                }
                break;
            }
            BspNode::Internal {
                split_x,
                buckets,
                left,
                right,
            } => {
                // Last bucket with y0 < p.y
                let idx = buckets.partition_point(|b| b.y0 < p.y).checked_sub(1);
                match idx {
                    Some(i) if p.y < buckets[i].y1 => {
                        let bucket = &buckets[i];
                        if *split_x >= p.x {
                            for &v in &bucket.right {
                                dock(geometry, graph, p, side, v);
                            }
                        }
                        if *split_x <= p.x {
                            for &v in &bucket.left {
                                dock(geometry, graph, p, side, v);
                            }
                        }
                        for &v in &bucket.on {
                            dock(geometry, graph, p, side, v);
                        }
                    }
                    Some(i) => {
                        // Between buckets: dock through the split-line proxies
                        if let Some(v) = buckets[i].bottom {
                            dock(geometry, graph, p, side, v);
                        }
                        if let Some(v) = buckets.get(i + 1).and_then(|b| b.top) {
                            dock(geometry, graph, p, side, v);
                        }
                    }
                    None => {
                        if let Some(v) = buckets.first().and_then(|b| b.top) {
                            dock(geometry, graph, p, side, v);
                        }
                    }
                }

                node = if *split_x > p.x {
                    left.as_deref()
                } else if *split_x < p.x {
                    right.as_deref()
                } else {
                    None
                };
            }
        }
    }
}

/// Link `v` to the query point when the box between them is clear
fn dock(geometry: &Geometry, graph: &mut Graph, p: Point, side: Side, v: u32) {
    if geometry.stab_box(&graph.position(v), &p) {
        return;
    }
    match side {
        Side::Target => graph.link_target(v),
        Side::Source => graph.link_source(v),
    }
}
