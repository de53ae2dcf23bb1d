//! butterfly-l1: rectilinear shortest paths on static occupancy grids
//!
//! Answers repeated L1 (Manhattan) shortest-path queries between arbitrary
//! points of a binary obstacle map. Construction runs once per grid:
//!
//! 1. Trace obstacle boundaries and keep the corners a shortest path may
//!    bend at ([`contour`], [`geometry`]).
//! 2. Connect mutually visible corners into a sparse graph and index them
//!    in a vertical-split BSP ([`bsp`]).
//! 3. Label components and precompute landmark distances ([`graph`]).
//!
//! A query docks both endpoints into the graph through the BSP and runs A*
//! with landmark bounds over an intrusive pairing heap.
//!
//! ```no_run
//! use butterfly_l1::{DenseGrid, Planner};
//!
//! let grid = DenseGrid::from_ascii("
//! .......
//! .......
//! #####.#
//! .......
//! ").unwrap();
//! let mut planner = Planner::build(&grid).unwrap();
//! let route = planner.query((1, 0), (1, 3));
//! assert_eq!(route.distance, 11.0);
//! ```

pub mod bsp;
pub mod config;
pub mod contour;
pub mod geometry;
pub mod graph;
pub mod grid;
pub mod orient;
pub mod planner;
pub mod point;

pub use butterfly_common::{Error, Result};
pub use config::PlannerConfig;
pub use geometry::Geometry;
pub use graph::{Graph, QueryStats, LANDMARKS};
pub use grid::{DenseGrid, OccupancyGrid};
pub use planner::{BuildStats, Planner, Route};
pub use point::Point;
