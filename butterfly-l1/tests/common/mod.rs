//! Shared helpers for planner integration tests
#![allow(dead_code)]

use std::collections::VecDeque;

use butterfly_l1::{DenseGrid, OccupancyGrid, Point};
use rand::rngs::StdRng;
use rand::Rng;

/// Install a subscriber once so `RUST_LOG=butterfly_l1=trace` shows events
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn ascii(text: &str) -> DenseGrid {
    DenseGrid::from_ascii(text).expect("test map must be rectangular")
}

/// Random obstacle map with the given fill probability
pub fn random_grid(rng: &mut StdRng, width: usize, height: usize, fill: f64) -> DenseGrid {
    let mut grid = DenseGrid::new(width, height);
    for y in 0..height {
        for x in 0..width {
            grid.set(x, y, rng.random_bool(fill));
        }
    }
    grid
}

pub fn random_cell(rng: &mut StdRng, grid: &DenseGrid) -> (i32, i32) {
    let (w, h) = grid.shape();
    (rng.random_range(0..w) as i32, rng.random_range(0..h) as i32)
}

/// 4-connected BFS distance between cells; infinity when blocked
pub fn bfs_distance(grid: &DenseGrid, s: (i32, i32), t: (i32, i32)) -> f64 {
    let (w, h) = grid.shape();
    let idx = |x: i32, y: i32| y as usize * w + x as usize;
    if grid.get(s.0 as usize, s.1 as usize) || grid.get(t.0 as usize, t.1 as usize) {
        return f64::INFINITY;
    }

    let mut dist = vec![u32::MAX; w * h];
    let mut queue = VecDeque::new();
    dist[idx(s.0, s.1)] = 0;
    queue.push_back(s);
    while let Some((x, y)) = queue.pop_front() {
        let d = dist[idx(x, y)];
        if (x, y) == t {
            return f64::from(d);
        }
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let (nx, ny) = (x + dx, y + dy);
            if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                continue;
            }
            if grid.get(nx as usize, ny as usize) || dist[idx(nx, ny)] != u32::MAX {
                continue;
            }
            dist[idx(nx, ny)] = d + 1;
            queue.push_back((nx, ny));
        }
    }
    f64::INFINITY
}

/// Sum of segment lengths
pub fn path_length(path: &[Point]) -> f64 {
    path.windows(2).map(|w| w[0].manhattan(&w[1])).sum()
}

/// Every hop is axis-aligned and every cell it covers is free
pub fn assert_valid_path(grid: &DenseGrid, path: &[Point]) {
    for pair in path.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!(
            a.x == b.x || a.y == b.y,
            "hop {a} -> {b} is not axis-aligned in {path:?}"
        );
        let (x0, x1) = (a.x.min(b.x) as usize, a.x.max(b.x) as usize);
        let (y0, y1) = (a.y.min(b.y) as usize, a.y.max(b.y) as usize);
        for x in x0..=x1 {
            for y in y0..=y1 {
                assert!(!grid.get(x, y), "hop {a} -> {b} crosses obstacle ({x},{y})");
            }
        }
    }
}
