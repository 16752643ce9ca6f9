//! The cell grid, bounds-checked positions, and the pixel layout.
//!
//! A [`Grid`] owns every [`Cell`] of a level in row-major order. Its
//! dimensions are fixed at construction, so a [`Position`] handed out by a
//! grid stays valid for that grid forever: every mutation of a position is
//! bounds-checked and fails with [`WorldError::OutOfBounds`] instead of
//! clamping.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::description::Coord;
use crate::WorldError;

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// The row/column extent of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub rows: usize,
    pub cols: usize,
}

impl Bounds {
    /// Whether a signed `(row, col)` lies inside these bounds.
    #[inline]
    pub fn contains(self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    fn check(self, row: i64, col: i64) -> Result<(usize, usize), WorldError> {
        if self.contains(row, col) {
            Ok((row as usize, col as usize))
        } else {
            Err(WorldError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A validated `(row, col)` inside a specific grid's bounds.
///
/// Positions are `Copy`; moving one produces an error rather than an invalid
/// value. Index a [`Grid`] with a position to reach its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    row: usize,
    col: usize,
    bounds: Bounds,
}

impl Position {
    /// Create a position, failing if it lies outside `bounds`.
    pub fn new(row: usize, col: usize, bounds: Bounds) -> Result<Self, WorldError> {
        let (row, col) = bounds.check(row as i64, col as i64)?;
        Ok(Self { row, col, bounds })
    }

    #[inline]
    pub fn row(self) -> usize {
        self.row
    }

    #[inline]
    pub fn col(self) -> usize {
        self.col
    }

    #[inline]
    pub fn bounds(self) -> Bounds {
        self.bounds
    }

    /// The plain coordinate of this position.
    #[inline]
    pub fn coord(self) -> Coord {
        Coord::new(self.row, self.col)
    }

    /// The position `(dr, dc)` away from this one.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if the result leaves the grid.
    pub fn offset(self, dr: i64, dc: i64) -> Result<Self, WorldError> {
        let (row, col) = self
            .bounds
            .check(self.row as i64 + dr, self.col as i64 + dc)?;
        Ok(Self { row, col, ..self })
    }

    /// Move this position in place by `(dr, dc)`. On error it is unchanged.
    pub fn move_by(&mut self, dr: i64, dc: i64) -> Result<(), WorldError> {
        *self = self.offset(dr, dc)?;
        Ok(())
    }

    /// Set this position to `(row, col)`. On error it is unchanged.
    pub fn set_to(&mut self, row: usize, col: usize) -> Result<(), WorldError> {
        *self = Self::new(row, col, self.bounds)?;
        Ok(())
    }

    /// Row-major index into a grid with these bounds.
    #[inline]
    fn index(self) -> usize {
        self.row * self.bounds.cols + self.col
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.row, self.col)
    }
}

// ---------------------------------------------------------------------------
// Point / Layout
// ---------------------------------------------------------------------------

/// A fractional pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise `self + (dx, dy)`.
    #[inline]
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Maps grid coordinates to pixels and back.
///
/// The origin is the pixel position of cell `(0, 0)`'s top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub origin: Point,
    pub tile_size: f64,
}

impl Default for Layout {
    /// Origin at `(0, 0)` with 50-pixel tiles.
    fn default() -> Self {
        Self {
            origin: Point::default(),
            tile_size: 50.0,
        }
    }
}

impl Layout {
    pub fn new(origin: Point, tile_size: f64) -> Self {
        Self { origin, tile_size }
    }

    /// A layout that centres a `rows x cols` grid inside a window.
    pub fn centered(window_width: f64, window_height: f64, tile_size: f64, bounds: Bounds) -> Self {
        let origin = Point::new(
            ((window_width - tile_size * bounds.cols as f64) / 2.0).floor(),
            ((window_height - tile_size * bounds.rows as f64) / 2.0).floor(),
        );
        Self { origin, tile_size }
    }

    /// Pixel origin of a cell: `origin + (col * tile, row * tile)`.
    #[inline]
    pub fn pixel_origin(&self, pos: Position) -> Point {
        self.origin.translated(
            pos.col() as f64 * self.tile_size,
            pos.row() as f64 * self.tile_size,
        )
    }

    /// The coordinate of the tile under a pixel, if any tile is there.
    pub fn coord_at(&self, point: Point, bounds: Bounds) -> Option<Coord> {
        let col = ((point.x - self.origin.x) / self.tile_size).floor();
        let row = ((point.y - self.origin.y) / self.tile_size).floor();
        if row.is_finite() && col.is_finite() && bounds.contains(row as i64, col as i64) {
            Some(Coord::new(row as usize, col as usize))
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A fixed-size, row-major store of cells.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Cell>,
    bounds: Bounds,
    layout: Layout,
}

impl Grid {
    /// Build a grid from rows of cells.
    ///
    /// Returns `None` if there are no rows, no columns, or the rows differ in
    /// length. Level loading reports those cases with richer errors before
    /// calling this.
    pub fn from_rows(rows: Vec<Vec<Cell>>, layout: Layout) -> Option<Self> {
        let cols = rows.first()?.len();
        if cols == 0 || rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        let bounds = Bounds {
            rows: rows.len(),
            cols,
        };
        Some(Self {
            cells: rows.into_iter().flatten().collect(),
            bounds,
            layout,
        })
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.bounds.rows
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.bounds.cols
    }

    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// A validated position in this grid.
    pub fn position(&self, row: usize, col: usize) -> Result<Position, WorldError> {
        Position::new(row, col, self.bounds)
    }

    /// A validated position from a description coordinate.
    pub fn position_at(&self, coord: Coord) -> Result<Position, WorldError> {
        self.position(coord.row, coord.col)
    }

    /// Check that `pos` was issued for a grid of these dimensions.
    ///
    /// # Errors
    ///
    /// [`WorldError::OutOfBounds`] if `pos` carries other bounds, which
    /// means it came from another grid.
    pub fn validate(&self, pos: Position) -> Result<Position, WorldError> {
        if pos.bounds == self.bounds {
            Ok(pos)
        } else {
            Err(WorldError::OutOfBounds {
                row: pos.row as i64,
                col: pos.col as i64,
                rows: self.bounds.rows,
                cols: self.bounds.cols,
            })
        }
    }

    /// The cell at `pos`, if `pos` belongs to this grid.
    pub fn get(&self, pos: Position) -> Result<&Cell, WorldError> {
        let pos = self.validate(pos)?;
        Ok(&self.cells[pos.index()])
    }

    /// Mutable access to the cell at `pos`, if `pos` belongs to this grid.
    pub fn get_mut(&mut self, pos: Position) -> Result<&mut Cell, WorldError> {
        let pos = self.validate(pos)?;
        Ok(&mut self.cells[pos.index()])
    }

    /// Replace the cell at `pos`, returning the old one.
    pub fn set(&mut self, pos: Position, cell: Cell) -> Result<Cell, WorldError> {
        Ok(std::mem::replace(self.get_mut(pos)?, cell))
    }

    /// Pixel origin of the cell at `pos`.
    pub fn pixel_origin(&self, pos: Position) -> Point {
        self.layout.pixel_origin(pos)
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let bounds = self.bounds;
        (0..bounds.rows).flat_map(move |row| {
            (0..bounds.cols).map(move |col| Position { row, col, bounds })
        })
    }

    /// Every `(position, cell)` pair in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.positions().zip(self.cells.iter())
    }
}

/// Indexing is for positions this grid handed out.
///
/// # Panics
///
/// Panics if `pos` came from a grid with other dimensions. Use
/// [`Grid::get`] for positions of unknown origin.
impl Index<Position> for Grid {
    type Output = Cell;

    fn index(&self, pos: Position) -> &Cell {
        assert_eq!(pos.bounds, self.bounds, "position from another grid");
        &self.cells[pos.index()]
    }
}

impl IndexMut<Position> for Grid {
    fn index_mut(&mut self, pos: Position) -> &mut Cell {
        assert_eq!(pos.bounds, self.bounds, "position from another grid");
        &mut self.cells[pos.index()]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
