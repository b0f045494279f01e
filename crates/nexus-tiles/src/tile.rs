//! Tile kinds, per-kind behavior tables, and the tile state machine.
//!
//! Every cell of a [`Grid`](crate::grid::Grid) holds one [`Tile`]. What a
//! tile does is decided entirely by its [`TileKind`]; the set of kinds is
//! closed, so a new behavior is a new variant and every `match` over kinds
//! stays exhaustive.
//!
//! # Behavior Table
//!
//! | Kind | Powered by propagation | Passes power on | Base color | Lit color |
//! |------|------------------------|-----------------|------------|-----------|
//! | Empty | no | no | white | white |
//! | Plain | no | no | black | black |
//! | Source | always | yes | gold | gold |
//! | Conductor | yes | yes | slate | sky blue |
//! | Consumer | yes | no (sink) | dark red | orange |
//! | Blocker | no | no | charcoal | charcoal |
//!
//! The `powered` flag is owned by the [`PowerEngine`](crate::power::PowerEngine):
//! it only changes through [`Tile::on_powered`] and [`Tile::on_unpowered`],
//! which the engine calls once per transition edge.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::draw::{DrawCommand, TILE_SIZE};
use crate::grid::Coord;

// ---------------------------------------------------------------------------
// TileKind
// ---------------------------------------------------------------------------

/// The closed set of tile kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    /// An unoccupied cell.
    Empty,
    /// The generic base tile: occupies a cell but plays no part in power.
    Plain,
    /// Always powered; the origin of all propagation.
    Source,
    /// Powered iff connected to a source through other conductors.
    Conductor,
    /// Powered when next to a source or powered conductor; never passes
    /// power on.
    Consumer,
    /// Never powered; stops propagation.
    Blocker,
}

impl TileKind {
    /// Every kind, in declaration order.
    pub const ALL: [TileKind; 6] = [
        TileKind::Empty,
        TileKind::Plain,
        TileKind::Source,
        TileKind::Conductor,
        TileKind::Consumer,
        TileKind::Blocker,
    ];

    /// The identifier used for this kind in arrangement documents.
    pub fn name(self) -> &'static str {
        match self {
            TileKind::Empty => "empty",
            TileKind::Plain => "plain",
            TileKind::Source => "source",
            TileKind::Conductor => "conductor",
            TileKind::Consumer => "consumer",
            TileKind::Blocker => "blocker",
        }
    }

    /// Look up a kind by its arrangement identifier (case-sensitive).
    pub fn from_name(name: &str) -> Option<TileKind> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Comma-separated list of every identifier, for error messages.
    pub fn known_names() -> String {
        Self::ALL
            .iter()
            .map(|kind| kind.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether power flows onward from a powered tile of this kind.
    pub fn conducts(self) -> bool {
        matches!(self, TileKind::Source | TileKind::Conductor)
    }

    /// Whether a tile of this kind becomes powered when reached by
    /// propagation.
    pub fn accepts_power(self) -> bool {
        matches!(self, TileKind::Conductor | TileKind::Consumer)
    }

    pub fn is_source(self) -> bool {
        matches!(self, TileKind::Source)
    }

    /// Color shown while unpowered.
    pub fn base_color(self) -> Color {
        match self {
            TileKind::Empty => Color::WHITE,
            TileKind::Plain => Color::BLACK,
            TileKind::Source => Color::rgb(255, 215, 0),
            TileKind::Conductor => Color::rgb(90, 90, 110),
            TileKind::Consumer => Color::rgb(80, 40, 40),
            TileKind::Blocker => Color::rgb(40, 40, 40),
        }
    }

    /// Color shown while powered.
    pub fn lit_color(self) -> Color {
        match self {
            TileKind::Conductor => Color::rgb(120, 200, 255),
            TileKind::Consumer => Color::rgb(255, 120, 60),
            other => other.base_color(),
        }
    }

    /// The next kind in [`ALL`](Self::ALL) order, wrapping around. Used by
    /// interactive editors to cycle a cell through every kind.
    pub fn next(self) -> TileKind {
        let idx = Self::ALL
            .iter()
            .position(|kind| *kind == self)
            .unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// One cell's occupant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    kind: TileKind,
    base_color: Color,
    lit_color: Color,
    current_color: Color,
    powered: bool,
    position: Coord,
    activations: u32,
}

impl Tile {
    /// A tile with its kind's default colors.
    ///
    /// Sources start powered; every other kind starts unpowered. The
    /// position is stamped when the tile is placed in a grid.
    pub fn new(kind: TileKind) -> Self {
        Self::with_colors(kind, kind.base_color(), kind.lit_color())
    }

    /// A tile with explicit unpowered and powered colors.
    pub fn with_colors(kind: TileKind, base_color: Color, lit_color: Color) -> Self {
        let powered = kind.is_source();
        Self {
            kind,
            base_color,
            lit_color,
            current_color: if powered { lit_color } else { base_color },
            powered,
            position: (0, 0),
            activations: 0,
        }
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// The color the tile is drawn with right now.
    pub fn current_color(&self) -> Color {
        self.current_color
    }

    pub fn base_color(&self) -> Color {
        self.base_color
    }

    pub fn lit_color(&self) -> Color {
        self.lit_color
    }

    /// Grid coordinate `(x, y)` this tile was placed at.
    pub fn position(&self) -> Coord {
        self.position
    }

    /// How many times a consumer has been switched on. Always zero for
    /// other kinds.
    pub fn activations(&self) -> u32 {
        self.activations
    }

    pub(crate) fn place_at(&mut self, position: Coord) {
        self.position = position;
    }

    fn color_for_state(&self) -> Color {
        if self.powered {
            self.lit_color
        } else {
            self.base_color
        }
    }

    // -- hooks --------------------------------------------------------------

    /// Called once per tile when a level is (re)activated, after the initial
    /// power computation. Refreshes the visual state; never touches
    /// `powered`.
    pub(crate) fn on_level_start(&mut self) {
        self.current_color = self.color_for_state();
    }

    /// Called by the engine on a false -> true transition.
    pub(crate) fn on_powered(&mut self) {
        debug_assert!(!self.powered, "on_powered called on a powered tile");
        self.powered = true;
        self.current_color = self.lit_color;
        if self.kind == TileKind::Consumer {
            self.activations += 1;
        }
    }

    /// Called by the engine on a true -> false transition.
    pub(crate) fn on_unpowered(&mut self) {
        debug_assert!(self.powered, "on_unpowered called on an unpowered tile");
        self.powered = false;
        self.current_color = self.base_color;
    }

    /// The draw command for this tile with its top-left corner at pixel
    /// `(x, y)`.
    pub fn render(&self, x: u32, y: u32) -> DrawCommand {
        DrawCommand {
            x,
            y,
            width: TILE_SIZE,
            height: TILE_SIZE,
            color: self.current_color,
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::new(TileKind::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_for_every_kind() {
        for kind in TileKind::ALL {
            assert_eq!(TileKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(TileKind::from_name("Source"), None);
        assert_eq!(TileKind::from_name("lamp"), None);
    }

    #[test]
    fn behavior_table() {
        assert!(TileKind::Source.conducts());
        assert!(TileKind::Conductor.conducts());
        assert!(!TileKind::Consumer.conducts());
        assert!(!TileKind::Blocker.conducts());
        assert!(!TileKind::Empty.conducts());
        assert!(!TileKind::Plain.conducts());

        assert!(TileKind::Conductor.accepts_power());
        assert!(TileKind::Consumer.accepts_power());
        assert!(!TileKind::Source.accepts_power());
        assert!(!TileKind::Blocker.accepts_power());
        assert!(!TileKind::Empty.accepts_power());
        assert!(!TileKind::Plain.accepts_power());
    }

    #[test]
    fn sources_start_powered_others_do_not() {
        for kind in TileKind::ALL {
            assert_eq!(Tile::new(kind).is_powered(), kind == TileKind::Source);
        }
    }

    #[test]
    fn reference_colors_match_original_layout() {
        assert_eq!(Tile::new(TileKind::Empty).current_color(), Color::WHITE);
        assert_eq!(Tile::new(TileKind::Plain).current_color(), Color::BLACK);
    }

    #[test]
    fn power_hooks_switch_color() {
        let mut tile = Tile::new(TileKind::Conductor);
        assert_eq!(tile.current_color(), TileKind::Conductor.base_color());

        tile.on_powered();
        assert!(tile.is_powered());
        assert_eq!(tile.current_color(), TileKind::Conductor.lit_color());

        tile.on_unpowered();
        assert!(!tile.is_powered());
        assert_eq!(tile.current_color(), TileKind::Conductor.base_color());
    }

    #[test]
    fn consumer_counts_activations() {
        let mut tile = Tile::new(TileKind::Consumer);
        tile.on_powered();
        tile.on_unpowered();
        tile.on_powered();
        assert_eq!(tile.activations(), 2);

        let mut conductor = Tile::new(TileKind::Conductor);
        conductor.on_powered();
        assert_eq!(conductor.activations(), 0);
    }

    #[test]
    fn level_start_does_not_touch_power() {
        let mut tile = Tile::with_colors(TileKind::Consumer, Color::BLACK, Color::WHITE);
        tile.on_level_start();
        assert!(!tile.is_powered());
        assert_eq!(tile.current_color(), Color::BLACK);
    }

    #[test]
    fn render_is_a_32px_square_in_current_color() {
        let tile = Tile::new(TileKind::Source);
        let cmd = tile.render(64, 32);
        assert_eq!(
            cmd,
            DrawCommand {
                x: 64,
                y: 32,
                width: 32,
                height: 32,
                color: TileKind::Source.lit_color(),
            }
        );
    }

    #[test]
    fn next_cycles_through_every_kind() {
        let mut kind = TileKind::Empty;
        for _ in 0..TileKind::ALL.len() {
            kind = kind.next();
        }
        assert_eq!(kind, TileKind::Empty);
        assert_eq!(TileKind::Blocker.next(), TileKind::Empty);
    }
}
