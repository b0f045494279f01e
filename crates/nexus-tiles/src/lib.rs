//! Nexus Tiles -- tile grid and power propagation for Nexus of Light.
//!
//! This crate holds the simulation core: a fixed-size [`Grid`](grid::Grid) of
//! [`Tile`](tile::Tile)s, the [`PowerEngine`](power::PowerEngine) that decides
//! which tiles are powered, and the declarative
//! [`Arrangement`](arrangement::Arrangement) format levels are built from.
//! Nothing here opens a window or owns an event loop; see `nexus-engine` for
//! the level and host-loop layer.
//!
//! # Quick Start
//!
//! ```
//! use nexus_tiles::prelude::*;
//!
//! let mut grid = Grid::from_rows(vec![vec![
//!     Tile::new(TileKind::Source),
//!     Tile::new(TileKind::Conductor),
//!     Tile::new(TileKind::Consumer),
//! ]])
//! .unwrap();
//!
//! let mut engine = PowerEngine::new();
//! let transitions = engine.recompute(&mut grid);
//!
//! assert_eq!(transitions.len(), 2);
//! assert!(grid.get(2, 0).unwrap().is_powered());
//! ```

#![deny(unsafe_code)]

pub mod arrangement;
pub mod color;
pub mod draw;
pub mod grid;
pub mod power;
pub mod tile;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by grid, arrangement, and level operations.
///
/// Propagation itself never fails: once a [`Grid`](grid::Grid) exists it is
/// valid, and recomputation is a total function over its state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NexusError {
    /// A coordinate outside the grid dimensions was accessed.
    #[error("coordinate ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// A grid could not be built because its shape is malformed.
    #[error("invalid grid: {reason}")]
    InvalidGrid { reason: String },

    /// An arrangement referenced a tile kind that does not exist.
    #[error("unknown tile kind '{name}'. Known kinds: [{known}]")]
    UnknownTileKind { name: String, known: String },

    /// An arrangement document could not be parsed.
    #[error("failed to parse arrangement: {details}")]
    InvalidArrangement { details: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::arrangement::{Arrangement, CellEntry};
    pub use crate::color::Color;
    pub use crate::draw::{DrawCommand, TILE_SIZE};
    pub use crate::grid::{Coord, Grid, DEFAULT_HEIGHT, DEFAULT_WIDTH};
    pub use crate::power::{PowerEngine, Transition};
    pub use crate::tile::{Tile, TileKind};
    pub use crate::NexusError;
}
