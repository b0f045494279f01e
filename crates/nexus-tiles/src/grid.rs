//! Fixed-size 2D grid of tiles.
//!
//! Cells are stored row-major in a single `Vec` that is allocated once at
//! construction and never resized. Editing a cell replaces its [`Tile`]; it
//! does not touch the backing storage. Every cell always holds a tile --
//! unoccupied cells hold [`TileKind::Empty`].
//!
//! Coordinates are `(x, y)` with `x` the column in `[0, width)` and `y` the
//! row in `[0, height)`.

use crate::tile::{Tile, TileKind};
use crate::NexusError;

/// A grid coordinate `(x, y)`.
pub type Coord = (usize, usize);

/// Width of the reference level.
pub const DEFAULT_WIDTH: usize = 10;

/// Height of the reference level.
pub const DEFAULT_HEIGHT: usize = 10;

/// Neighbor offsets in the fixed visitation order: up, right, down, left.
const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A `width x height` grid that owns one [`Tile`] per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
}

impl Grid {
    /// An all-empty grid.
    ///
    /// # Errors
    ///
    /// Returns [`NexusError::InvalidGrid`] if either dimension is zero.
    pub fn new(width: usize, height: usize) -> Result<Self, NexusError> {
        if width == 0 || height == 0 {
            return Err(NexusError::InvalidGrid {
                reason: format!("dimensions must be non-zero, got {width}x{height}"),
            });
        }
        let mut grid = Self {
            width,
            height,
            cells: vec![Tile::new(TileKind::Empty); width * height],
        };
        grid.stamp_positions();
        Ok(grid)
    }

    /// Build a grid from rows of tiles (`rows[y][x]`).
    ///
    /// # Errors
    ///
    /// Returns [`NexusError::InvalidGrid`] if there are no rows, the first
    /// row is empty, or any row's length differs from the first.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self, NexusError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(NexusError::InvalidGrid {
                reason: "a grid needs at least one row and one column".to_owned(),
            });
        }
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(NexusError::InvalidGrid {
                reason: format!(
                    "row {y} has {} cells, expected {width} (rows must all be the same length)",
                    row.len()
                ),
            });
        }

        let mut grid = Self {
            width,
            height,
            cells: rows.into_iter().flatten().collect(),
        };
        grid.stamp_positions();
        Ok(grid)
    }

    fn stamp_positions(&mut self) {
        let width = self.width;
        for (idx, tile) in self.cells.iter_mut().enumerate() {
            tile.place_at((idx % width, idx / width));
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells (`width * height`).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; construction rejects empty grids.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Row-major index of `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`NexusError::OutOfBounds`] for a coordinate outside the grid.
    pub fn index_of(&self, x: usize, y: usize) -> Result<usize, NexusError> {
        if self.in_bounds(x, y) {
            Ok(y * self.width + x)
        } else {
            Err(NexusError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Coordinate of a row-major index. The index must be below
    /// [`len`](Self::len).
    pub fn coord_of(&self, idx: usize) -> Coord {
        (idx % self.width, idx / self.width)
    }

    /// The tile at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`NexusError::OutOfBounds`] for a coordinate outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Result<&Tile, NexusError> {
        let idx = self.index_of(x, y)?;
        Ok(&self.cells[idx])
    }

    /// Replace the tile at `(x, y)`, returning the previous occupant.
    ///
    /// The new tile's position is stamped to `(x, y)`. This does not run
    /// propagation; the caller is responsible for invoking the engine.
    ///
    /// # Errors
    ///
    /// Returns [`NexusError::OutOfBounds`] for a coordinate outside the grid.
    /// The grid is left unchanged.
    pub fn set(&mut self, x: usize, y: usize, mut tile: Tile) -> Result<Tile, NexusError> {
        let idx = self.index_of(x, y)?;
        tile.place_at((x, y));
        Ok(std::mem::replace(&mut self.cells[idx], tile))
    }

    /// The in-bounds orthogonal neighbors of `(x, y)`, in the order up,
    /// right, down, left. Edge cells have 3 neighbors, corners 2.
    ///
    /// A coordinate outside the grid has no neighbors.
    pub fn neighbors(&self, x: usize, y: usize) -> Vec<Coord> {
        if !self.in_bounds(x, y) {
            return Vec::new();
        }
        let mut result = Vec::with_capacity(4);
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy))
            else {
                continue;
            };
            if self.in_bounds(nx, ny) {
                result.push((nx, ny));
            }
        }
        result
    }

    /// All tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter()
    }

    pub(crate) fn cells(&self) -> &[Tile] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Tile] {
        &mut self.cells
    }

    /// Run every tile's level-start hook in row-major order.
    ///
    /// Call after the initial power computation so the hooks observe the
    /// correct powered state.
    pub fn notify_level_start(&mut self) {
        for tile in &mut self.cells {
            tile.on_level_start();
        }
    }

    /// Each cell's powered flag, row-major.
    pub fn powered_mask(&self) -> Vec<bool> {
        self.cells.iter().map(Tile::is_powered).collect()
    }

    /// Coordinates of every powered tile, row-major.
    pub fn powered_coords(&self) -> Vec<Coord> {
        self.cells
            .iter()
            .filter(|t| t.is_powered())
            .map(Tile::position)
            .collect()
    }

    /// Coordinates of every tile of `kind`, row-major.
    pub fn coords_of_kind(&self, kind: TileKind) -> Vec<Coord> {
        self.cells
            .iter()
            .filter(|t| t.kind() == kind)
            .map(Tile::position)
            .collect()
    }
}
