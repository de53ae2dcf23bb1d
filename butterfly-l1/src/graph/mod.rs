//! Visibility graph with in-place A* scratch
//!
//! Vertices live in a flat arena addressed by `u32`. Index 0 is the heap
//! sentinel; real vertices start at 1. Edges are undirected and fixed after
//! build. Every vertex carries the fields the search needs (heap links,
//! weights, state bits, predecessor, free-list link), so a query allocates
//! nothing per vertex and resets only what it touched.

mod heap;
mod landmarks;
mod search;

pub use search::QueryStats;

use rustc_hash::FxHashSet;

use crate::point::Point;

/// Landmarks per connected component
pub const LANDMARKS: usize = 16;

/// Heap sentinel / null link
pub(crate) const NIL: u32 = 0;

/// Component id of the sentinel
const NO_COMPONENT: u32 = u32::MAX;

/// Search state bits
pub(crate) mod state {
    /// Visible from the query target
    pub const TARGET: u8 = 1;
    /// Reached from the query source (open)
    pub const SOURCE: u8 = 2;
    /// Settled
    pub const CLOSED: u8 = 4;
}

/// Graph node
#[derive(Debug, Clone)]
pub struct Vertex {
    pub(crate) pos: Point,
    pub(crate) edges: Vec<u32>,
    pub(crate) component: u32,
    pub(crate) landmarks: [f64; LANDMARKS],

    // Per-query scratch, reset through the free list
    pub(crate) weight: f64,
    pub(crate) heuristic: f64,
    pub(crate) cost: f64,
    pub(crate) left: u32,
    pub(crate) right: u32,
    pub(crate) parent: u32,
    pub(crate) state: u8,
    pub(crate) pred: Option<u32>,
    /// `Some` while on the free list
    pub(crate) next_free: Option<u32>,
}

impl Vertex {
    pub(crate) fn new(pos: Point) -> Self {
        Self {
            pos,
            edges: Vec::new(),
            component: NO_COMPONENT,
            landmarks: [f64::INFINITY; LANDMARKS],
            weight: 0.0,
            heuristic: 0.0,
            cost: 0.0,
            left: NIL,
            right: NIL,
            parent: NIL,
            state: 0,
            pred: None,
            next_free: None,
        }
    }

    pub(crate) fn sentinel() -> Self {
        let mut v = Self::new(Point::new(f64::INFINITY, f64::INFINITY));
        v.weight = f64::NEG_INFINITY;
        v
    }

    #[inline]
    pub(crate) fn reset_search(&mut self) {
        self.state = 0;
        self.left = NIL;
        self.right = NIL;
        self.parent = NIL;
        self.next_free = None;
    }
}

/// Vertex arena plus the scratch of the query in flight
#[derive(Debug)]
pub struct Graph {
    pub(crate) vertices: Vec<Vertex>,
    component_count: usize,
    edge_count: usize,
    inflation: f64,

    // Query scratch
    pub(crate) open: u32,
    /// Free-list head; `NIL` terminates the list
    pub(crate) free_head: u32,
    pub(crate) source: Point,
    pub(crate) target: Point,
    pub(crate) target_landmarks: [f64; LANDMARKS],
    pub(crate) source_components: FxHashSet<u32>,
    pub(crate) target_components: FxHashSet<u32>,
    pub(crate) stats: QueryStats,
}

impl Graph {
    pub fn new(inflation: f64) -> Self {
        Self {
            vertices: vec![Vertex::sentinel()],
            component_count: 0,
            edge_count: 0,
            inflation,
            open: NIL,
            free_head: NIL,
            source: Point::default(),
            target: Point::default(),
            target_landmarks: [f64::INFINITY; LANDMARKS],
            source_components: FxHashSet::default(),
            target_components: FxHashSet::default(),
            stats: QueryStats::default(),
        }
    }

    /// Append a vertex and return its id
    pub(crate) fn add_vertex(&mut self, pos: Point) -> u32 {
        self.vertices.push(Vertex::new(pos));
        (self.vertices.len() - 1) as u32
    }

    /// Undirected edge
    pub(crate) fn link(&mut self, a: u32, b: u32) {
        if a == b {
            return;
        }
        self.vertices[a as usize].edges.push(b);
        self.vertices[b as usize].edges.push(a);
        self.edge_count += 1;
    }

    /// Number of real vertices (sentinel excluded)
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() - 1
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn component_count(&self) -> usize {
        self.component_count
    }

    /// Ids of all real vertices
    pub fn vertex_ids(&self) -> impl Iterator<Item = u32> {
        1..self.vertices.len() as u32
    }

    pub fn position(&self, v: u32) -> Point {
        self.vertices[v as usize].pos
    }

    pub fn neighbors(&self, v: u32) -> &[u32] {
        &self.vertices[v as usize].edges
    }

    pub fn component(&self, v: u32) -> u32 {
        self.vertices[v as usize].component
    }

    /// True shortest-path distances from `v` to the landmarks of its component
    pub fn landmarks(&self, v: u32) -> &[f64; LANDMARKS] {
        &self.vertices[v as usize].landmarks
    }

    /// Uninflated A* lower bound from `v` to vertex `t`
    pub fn heuristic_bound(&self, v: u32, t: u32) -> f64 {
        let a = &self.vertices[v as usize];
        let b = &self.vertices[t as usize];
        let mut bound = a.pos.manhattan(&b.pos);
        if a.component == b.component {
            for k in 0..LANDMARKS {
                bound = bound.max(b.landmarks[k] - a.landmarks[k]);
            }
        }
        bound
    }

    /// Label connected components (BFS) and compute landmark distances.
    pub(crate) fn finalize(&mut self) {
        let components = self.label_components();
        self.component_count = components.len();
        for members in components {
            self.compute_landmarks(members);
        }
    }

    /// Breadth-first labeling; returns the members of each component.
    fn label_components(&mut self) -> Vec<Vec<u32>> {
        for v in self.vertices.iter_mut().skip(1) {
            v.component = NO_COMPONENT;
        }

        let mut components = Vec::new();
        for seed in 1..self.vertices.len() as u32 {
            if self.vertices[seed as usize].component != NO_COMPONENT {
                continue;
            }
            let label = components.len() as u32;
            self.vertices[seed as usize].component = label;
            let mut queue = vec![seed];
            let mut head = 0;
            while head < queue.len() {
                let v = queue[head];
                head += 1;
                for i in 0..self.vertices[v as usize].edges.len() {
                    let u = self.vertices[v as usize].edges[i];
                    if self.vertices[u as usize].component == NO_COMPONENT {
                        self.vertices[u as usize].component = label;
                        queue.push(u);
                    }
                }
            }
            components.push(queue);
        }
        components
    }
}
