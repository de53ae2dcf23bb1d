//! Build once, query many times
//!
//! A [`Planner`] owns the visibility oracle, the corner graph with its
//! landmark tables, and the BSP used to dock query points. Queries take
//! `&mut self`: the graph carries per-query scratch that is swept after
//! every search, so one planner serves one caller at a time.

use std::time::Instant;

use butterfly_common::Result;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::bsp::{build_tree, connect, BspNode, Side};
use crate::config::PlannerConfig;
use crate::geometry::Geometry;
use crate::graph::{Graph, QueryStats};
use crate::grid::{check_shape, OccupancyGrid};
use crate::point::Point;

/// Statistics from planner construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub loops: usize,
    pub corners: usize,
    pub vertices: usize,
    pub steiner_vertices: usize,
    pub edges: usize,
    pub components: usize,
    pub internal_nodes: usize,
    pub leaves: usize,
    pub buckets: usize,
    pub elapsed_ms: u64,
}

/// Result of one query.
///
/// `path` runs from the target to the source; consecutive points differ in
/// one coordinate only. Unreachable queries have an infinite distance and an
/// empty path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub distance: f64,
    pub path: Vec<Point>,
}

impl Route {
    fn unreachable() -> Self {
        Self {
            distance: f64::INFINITY,
            path: Vec::new(),
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.distance.is_finite()
    }
}

/// L1 shortest-path planner over one static grid
#[derive(Debug)]
pub struct Planner {
    config: PlannerConfig,
    geometry: Geometry,
    graph: Graph,
    root: Option<Box<BspNode>>,
    stats: BuildStats,
}

impl Planner {
    /// Build with default settings
    pub fn build<G: OccupancyGrid + ?Sized>(grid: &G) -> Result<Self> {
        Self::build_with_config(grid, PlannerConfig::default())
    }

    pub fn build_with_config<G: OccupancyGrid + ?Sized>(
        grid: &G,
        config: PlannerConfig,
    ) -> Result<Self> {
        config.validate()?;
        let (width, height) = check_shape(grid)?;
        let start = Instant::now();
        debug!(width, height, ?config, "Building planner");

        let geometry = Geometry::new(grid);
        let mut graph = Graph::new(config.heuristic_inflation);
        let (root, counts) = build_tree(&geometry, &mut graph, config.leaf_cutoff, config.bucket_size);

        graph.finalize();
        debug!(components = graph.component_count(), "Computed landmarks");

        let stats = BuildStats {
            loops: geometry.loop_count(),
            corners: geometry.corners().len(),
            vertices: graph.vertex_count(),
            steiner_vertices: counts.steiner_vertices,
            edges: graph.edge_count(),
            components: graph.component_count(),
            internal_nodes: counts.internal_nodes,
            leaves: counts.leaves,
            buckets: counts.buckets,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            corners = stats.corners,
            vertices = stats.vertices,
            edges = stats.edges,
            components = stats.components,
            elapsed_ms = stats.elapsed_ms,
            "Planner ready"
        );

        Ok(Self {
            config,
            geometry,
            graph,
            root,
            stats,
        })
    }

    /// Shortest L1 route from `source` to `target`
    pub fn query(&mut self, source: impl Into<Point>, target: impl Into<Point>) -> Route {
        self.solve(source.into(), target.into(), true)
    }

    /// Shortest L1 distance; `f64::INFINITY` when unreachable
    pub fn distance(&mut self, source: impl Into<Point>, target: impl Into<Point>) -> f64 {
        self.solve(source.into(), target.into(), false).distance
    }

    fn solve(&mut self, s: Point, t: Point, with_path: bool) -> Route {
        self.graph.begin(s, t);

        if s.x == t.x && s.y == t.y {
            if self.geometry.stab_tile(&s) {
                return Route::unreachable();
            }
            return Route {
                distance: 0.0,
                path: vec![s],
            };
        }

        if !self.geometry.stab_box(&t, &s) {
            let path = if !with_path {
                Vec::new()
            } else if s.shares_axis(&t) {
                vec![t, s]
            } else {
                vec![t, Point::new(s.x, t.y), s]
            };
            trace!(%s, %t, "direct visibility");
            return Route {
                distance: s.manhattan(&t),
                path,
            };
        }

        let root = self.root.as_deref();
        connect(root, &self.geometry, &mut self.graph, t, Side::Target);
        connect(root, &self.geometry, &mut self.graph, s, Side::Source);
        let (distance, chain) = self.graph.search();
        if distance == f64::INFINITY {
            return Route::unreachable();
        }

        let path = if with_path {
            polyline(t, &chain, s)
        } else {
            Vec::new()
        };
        Route { distance, path }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Counters of the most recent graph search
    pub fn last_query_stats(&self) -> QueryStats {
        self.graph.last_query_stats()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn bsp(&self) -> Option<&BspNode> {
        self.root.as_deref()
    }

    /// (width, height) of the grid the planner was built from
    pub fn shape(&self) -> (usize, usize) {
        (self.geometry.width(), self.geometry.height())
    }
}

/// Axis-aligned polyline through the vertex chain, bending at
/// (next.x, previous.y) wherever a hop changes both coordinates.
fn polyline(target: Point, chain: &[Point], source: Point) -> Vec<Point> {
    let mut path = Vec::with_capacity(2 * chain.len() + 3);
    path.push(target);
    let mut prev = target;
    for &p in chain.iter().chain(std::iter::once(&source)) {
        let moves_x = prev.x != p.x;
        let moves_y = prev.y != p.y;
        if moves_x && moves_y {
            // Same bend as the direct shortcut [t, (s.x, t.y), s]
            path.push(Point::new(p.x, prev.y));
        }
        if moves_x || moves_y {
            path.push(p);
        }
        prev = p;
    }
    path
}
