//! A playable level: one grid, one power engine, and an edit queue.
//!
//! A [`Level`] is built from an [`Arrangement`], runs the power engine once,
//! then fires every tile's level-start hook in row-major order. After that the
//! grid only changes through edits, and every edit is followed by a full
//! synchronous recomputation before control returns to the caller.
//!
//! Edits can be applied immediately with [`Level::edit`] or queued with
//! [`Level::queue_edit`] and applied by the host loop's per-frame
//! [`Level::advance`]. Queued edits apply in FIFO order. A failing edit never
//! aborts the frame: it is logged, recorded in the [`FrameReport`], and the
//! level keeps its previous valid state.
//!
//! # Example
//!
//! ```
//! use nexus_engine::prelude::*;
//!
//! let arrangement = Arrangement::from_kinds(
//!     "wire",
//!     &[&[TileKind::Source, TileKind::Conductor, TileKind::Consumer]],
//! );
//! let mut level = Level::new(&arrangement).unwrap();
//! assert!(level.is_cleared());
//!
//! let changed = level.edit(1, 0, Tile::new(TileKind::Blocker)).unwrap();
//! assert_eq!(changed.into_iter().collect::<Vec<_>>(), vec![(1, 0), (2, 0)]);
//! assert!(!level.is_cleared());
//! ```

use std::collections::{BTreeSet, VecDeque};

use nexus_tiles::arrangement::Arrangement;
use nexus_tiles::draw::{DrawCommand, TILE_SIZE};
use nexus_tiles::grid::{Coord, Grid};
use nexus_tiles::power::{PowerEngine, Transition};
use nexus_tiles::tile::{Tile, TileKind};
use nexus_tiles::NexusError;
use serde::Serialize;

use crate::host::Surface;

// ---------------------------------------------------------------------------
// FrameReport
// ---------------------------------------------------------------------------

/// An edit that could not be applied during [`Level::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEdit {
    pub x: usize,
    pub y: usize,
    pub kind: TileKind,
    pub error: NexusError,
}

/// What happened during one call to [`Level::advance`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number after this advance (the first advance reports 1).
    pub frame: u64,
    /// Number of queued edits that were applied.
    pub applied: usize,
    /// Cells whose powered state differs from the start of the frame.
    pub changed: BTreeSet<Coord>,
    /// Every hook-firing transition, in the order the hooks ran.
    pub transitions: Vec<Transition>,
    /// Edits that failed; the level ignored them.
    pub rejected: Vec<RejectedEdit>,
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// A grid plus the engine that keeps its power state current.
#[derive(Debug)]
pub struct Level {
    name: String,
    grid: Grid,
    engine: PowerEngine,
    pending: VecDeque<(usize, usize, Tile)>,
    frame_counter: u64,
    last_transitions: Vec<Transition>,
}

impl Level {
    /// Build a level from an arrangement.
    ///
    /// # Errors
    ///
    /// Propagates [`NexusError::UnknownTileKind`] and
    /// [`NexusError::InvalidGrid`] from
    /// [`Arrangement::build_grid`]. Both are fatal to construction.
    pub fn new(arrangement: &Arrangement) -> Result<Self, NexusError> {
        let grid = arrangement.build_grid()?;
        Ok(Self::from_grid(&arrangement.name, grid))
    }

    /// The stock 10x10 level.
    pub fn reference() -> Result<Self, NexusError> {
        Self::new(&Arrangement::reference())
    }

    /// Wrap an already-built grid: run the engine, then the level-start hooks.
    pub fn from_grid(name: &str, grid: Grid) -> Self {
        let mut level = Self {
            name: name.to_owned(),
            grid,
            engine: PowerEngine::new(),
            pending: VecDeque::new(),
            frame_counter: 0,
            last_transitions: Vec::new(),
        };
        level.start();
        tracing::info!(
            name = %level.name,
            width = level.grid.width(),
            height = level.grid.height(),
            powered = level.grid.powered_coords().len(),
            "level started"
        );
        level
    }

    fn start(&mut self) {
        self.last_transitions = self.engine.recompute(&mut self.grid);
        self.grid.notify_level_start();
    }

    /// Re-activate the level in place: recompute power and fire every
    /// level-start hook again. Queued edits are kept.
    pub fn restart(&mut self) {
        self.start();
        tracing::debug!(name = %self.name, "level restarted");
    }

    // -- editing ------------------------------------------------------------

    /// Replace the tile at `(x, y)` and recompute power.
    ///
    /// Returns the cells whose powered state differs from before the edit.
    /// The edited cell is included when its power changed, even though the
    /// replacement tile itself may fire no hook (a new blocker replacing a
    /// powered conductor was never powered, so it has nothing to turn off).
    ///
    /// # Errors
    ///
    /// Returns [`NexusError::OutOfBounds`] for a coordinate outside the grid;
    /// the level is left untouched.
    pub fn edit(&mut self, x: usize, y: usize, tile: Tile) -> Result<BTreeSet<Coord>, NexusError> {
        let before = self.grid.powered_mask();
        self.grid.set(x, y, tile)?;
        self.last_transitions = self.engine.recompute(&mut self.grid);
        Ok(self.diff(&before))
    }

    /// Queue an edit for the next [`advance`](Self::advance).
    pub fn queue_edit(&mut self, x: usize, y: usize, tile: Tile) {
        self.pending.push_back((x, y, tile));
    }

    /// Number of edits waiting for the next advance.
    pub fn pending_edits(&self) -> usize {
        self.pending.len()
    }

    /// Apply every queued edit in order and advance the frame counter.
    pub fn advance(&mut self) -> FrameReport {
        let before = self.grid.powered_mask();
        let mut report = FrameReport::default();

        while let Some((x, y, tile)) = self.pending.pop_front() {
            let kind = tile.kind();
            match self.edit(x, y, tile) {
                Ok(_) => {
                    report.applied += 1;
                    report.transitions.extend_from_slice(&self.last_transitions);
                }
                Err(error) => {
                    tracing::warn!(x, y, %kind, %error, "edit rejected");
                    report.rejected.push(RejectedEdit { x, y, kind, error });
                }
            }
        }

        self.frame_counter += 1;
        report.frame = self.frame_counter;
        report.changed = self.diff(&before);
        report
    }

    fn diff(&self, before: &[bool]) -> BTreeSet<Coord> {
        before
            .iter()
            .zip(self.grid.iter())
            .filter(|(was, tile)| **was != tile.is_powered())
            .map(|(_, tile)| tile.position())
            .collect()
    }

    // -- rendering ----------------------------------------------------------

    /// One draw command per cell, row-major, at `(col * 32, row * 32)`.
    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        self.grid
            .iter()
            .map(|tile| {
                let (x, y) = tile.position();
                tile.render(x as u32 * TILE_SIZE, y as u32 * TILE_SIZE)
            })
            .collect()
    }

    /// Draw every tile onto `surface`. Does not clear or present.
    pub fn render<S: Surface>(&self, surface: &mut S) {
        for cmd in self.draw_commands() {
            surface.draw(&cmd);
        }
    }

    /// The grid cell under pixel `(px, py)`, if any.
    pub fn cell_at_pixel(&self, px: f64, py: f64) -> Option<Coord> {
        if px < 0.0 || py < 0.0 {
            return None;
        }
        let x = (px / f64::from(TILE_SIZE)) as usize;
        let y = (py / f64::from(TILE_SIZE)) as usize;
        self.grid.in_bounds(x, y).then_some((x, y))
    }

    // -- queries ------------------------------------------------------------

    /// Whether the level is solved: it has at least one consumer and every
    /// consumer is powered.
    pub fn is_cleared(&self) -> bool {
        let mut consumers = self
            .grid
            .iter()
            .filter(|t| t.kind() == TileKind::Consumer)
            .peekable();
        consumers.peek().is_some() && consumers.all(Tile::is_powered)
    }

    /// BLAKE3 hex digest of the level's tile state.
    ///
    /// Two levels with identical tiles (kinds, colors, power, activations)
    /// and name hash identically. The frame counter and edit queue are not
    /// included.
    ///
    /// # Panics
    ///
    /// Panics if the tile state cannot be serialized to JSON, which plain
    /// tile data never triggers.
    pub fn state_hash(&self) -> String {
        #[derive(Serialize)]
        struct Hashable<'a> {
            name: &'a str,
            width: usize,
            height: usize,
            tiles: Vec<&'a Tile>,
        }

        let state = Hashable {
            name: &self.name,
            width: self.grid.width(),
            height: self.grid.height(),
            tiles: self.grid.iter().collect(),
        };
        let bytes = serde_json::to_vec(&state)
            .expect("level tile state should always be JSON-serializable");
        blake3::hash(&bytes).to_hex().to_string()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read-only access to the grid. All writes go through the level.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Number of completed [`advance`](Self::advance) calls.
    pub fn frame_count(&self) -> u64 {
        self.frame_counter
    }

    /// Transitions fired by the most recent recomputation.
    pub fn last_transitions(&self) -> &[Transition] {
        &self.last_transitions
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
