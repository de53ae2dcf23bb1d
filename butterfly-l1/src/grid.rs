//! Occupancy grid input
//!
//! The planner only needs a shape and a per-cell occupancy lookup. Any
//! storage can be plugged in through [`OccupancyGrid`]; [`DenseGrid`] is the
//! owned bitmap used by tests and small callers.

use butterfly_common::{Error, Result};

/// Read-only view of a binary occupancy map (`true` = obstacle)
pub trait OccupancyGrid {
    /// (width, height) in cells
    fn shape(&self) -> (usize, usize);

    /// Occupancy of cell (x, y); callers stay within `shape()`
    fn get(&self, x: usize, y: usize) -> bool;

    /// First row whose length differs from the width, as (row, cells found)
    fn ragged_row(&self) -> Option<(usize, usize)> {
        None
    }

    /// False when the backing storage is ragged
    fn is_rectangular(&self) -> bool {
        self.ragged_row().is_none()
    }
}

/// Reject zero-sized or ragged input before anything is built
pub(crate) fn check_shape<G: OccupancyGrid + ?Sized>(grid: &G) -> Result<(usize, usize)> {
    let (width, height) = grid.shape();
    if width == 0 || height == 0 {
        return Err(Error::EmptyGrid { width, height });
    }
    if !grid.is_rectangular() {
        let (row, found) = grid.ragged_row().unwrap_or((0, 0));
        return Err(Error::RaggedGrid {
            row,
            expected: width,
            found,
        });
    }
    Ok((width, height))
}

/// Owned row-major bitmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl DenseGrid {
    /// All-free grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    pub fn set(&mut self, x: usize, y: usize, occupied: bool) {
        self.cells[y * self.width + x] = occupied;
    }

    /// Build from rows (`rows[y][x]`), rejecting ragged input
    pub fn from_rows(rows: &[Vec<bool>]) -> Result<Self> {
        let width = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(width * rows.len());
        for (row, cols) in rows.iter().enumerate() {
            if cols.len() != width {
                return Err(Error::RaggedGrid {
                    row,
                    expected: width,
                    found: cols.len(),
                });
            }
            cells.extend_from_slice(cols);
        }
        Ok(Self {
            width,
            height: rows.len(),
            cells,
        })
    }

    /// Parse a text map: `#` is an obstacle, any other character is free.
    ///
    /// Leading and trailing blank lines are ignored; the first line is row 0.
    pub fn from_ascii(text: &str) -> Result<Self> {
        let rows: Vec<Vec<bool>> = text
            .trim_matches('\n')
            .lines()
            .map(|line| line.trim_end_matches('\r').chars().map(|c| c == '#').collect())
            .collect();
        Self::from_rows(&rows)
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

impl OccupancyGrid for DenseGrid {
    fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x]
    }
}

/// Row-major nested vectors, `rows[y][x]`
impl OccupancyGrid for Vec<Vec<bool>> {
    fn shape(&self) -> (usize, usize) {
        (self.first().map_or(0, Vec::len), self.len())
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> bool {
        self[y][x]
    }

    fn ragged_row(&self) -> Option<(usize, usize)> {
        let width = self.first().map_or(0, Vec::len);
        self.iter()
            .enumerate()
            .find(|(_, row)| row.len() != width)
            .map(|(i, row)| (i, row.len()))
    }
}

impl<G: OccupancyGrid + ?Sized> OccupancyGrid for &G {
    fn shape(&self) -> (usize, usize) {
        (**self).shape()
    }

    fn get(&self, x: usize, y: usize) -> bool {
        (**self).get(x, y)
    }

    fn ragged_row(&self) -> Option<(usize, usize)> {
        (**self).ragged_row()
    }

    fn is_rectangular(&self) -> bool {
        (**self).is_rectangular()
    }
}
