//! Declarative level layouts.
//!
//! An [`Arrangement`] is read once when a level is built. On disk it is JSON:
//!
//! ```json
//! {
//!   "name": "first light",
//!   "rows": [
//!     ["source", "conductor", {"kind": "consumer", "lit_color": [255, 0, 0]}],
//!     ["empty",  "blocker",   "empty"]
//!   ]
//! }
//! ```
//!
//! Each cell is either a bare kind identifier or an object with a `kind` and
//! optional `color` (unpowered) / `lit_color` (powered) overrides. Unknown
//! identifiers are a hard error at build time; they are never quietly turned
//! into empty cells.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::grid::{Grid, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::tile::{Tile, TileKind};
use crate::NexusError;

// ---------------------------------------------------------------------------
// CellEntry
// ---------------------------------------------------------------------------

/// One cell of an arrangement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellEntry {
    /// Just a kind identifier, with default colors.
    Kind(String),
    /// A kind identifier with per-tile overrides.
    Detailed {
        kind: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<Color>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lit_color: Option<Color>,
    },
}

impl CellEntry {
    pub fn kind_name(&self) -> &str {
        match self {
            CellEntry::Kind(kind) | CellEntry::Detailed { kind, .. } => kind,
        }
    }

    /// Resolve the identifier and build the tile.
    ///
    /// # Errors
    ///
    /// Returns [`NexusError::UnknownTileKind`] if the identifier does not name
    /// a [`TileKind`].
    pub fn to_tile(&self) -> Result<Tile, NexusError> {
        let name = self.kind_name();
        let kind = TileKind::from_name(name).ok_or_else(|| NexusError::UnknownTileKind {
            name: name.to_owned(),
            known: TileKind::known_names(),
        })?;
        Ok(match self {
            CellEntry::Kind(_) => Tile::new(kind),
            CellEntry::Detailed {
                color, lit_color, ..
            } => Tile::with_colors(
                kind,
                color.unwrap_or_else(|| kind.base_color()),
                lit_color.unwrap_or_else(|| kind.lit_color()),
            ),
        })
    }
}

impl From<TileKind> for CellEntry {
    fn from(kind: TileKind) -> Self {
        CellEntry::Kind(kind.name().to_owned())
    }
}

// ---------------------------------------------------------------------------
// Arrangement
// ---------------------------------------------------------------------------

/// The initial layout of a level, `rows[y][x]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrangement {
    #[serde(default)]
    pub name: String,
    pub rows: Vec<Vec<CellEntry>>,
}

impl Arrangement {
    /// Parse an arrangement document.
    ///
    /// Only the JSON shape is checked here; kind identifiers and row lengths
    /// are validated by [`build_grid`](Self::build_grid).
    ///
    /// # Errors
    ///
    /// Returns [`NexusError::InvalidArrangement`] if the document is not
    /// valid arrangement JSON.
    pub fn from_json(json: &str) -> Result<Self, NexusError> {
        serde_json::from_str(json).map_err(|e| NexusError::InvalidArrangement {
            details: e.to_string(),
        })
    }

    /// Serialize back to a JSON document.
    pub fn to_json(&self) -> Result<String, NexusError> {
        serde_json::to_string_pretty(self).map_err(|e| NexusError::InvalidArrangement {
            details: e.to_string(),
        })
    }

    /// An arrangement built from plain kinds with default colors.
    pub fn from_kinds(name: &str, rows: &[&[TileKind]]) -> Self {
        Self {
            name: name.to_owned(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|kind| CellEntry::from(*kind)).collect())
                .collect(),
        }
    }

    /// The stock 10x10 layout: every cell empty except a plain tile at the
    /// origin.
    pub fn reference() -> Self {
        let mut rows = vec![vec![CellEntry::from(TileKind::Empty); DEFAULT_WIDTH]; DEFAULT_HEIGHT];
        rows[0][0] = CellEntry::from(TileKind::Plain);
        Self {
            name: "reference".to_owned(),
            rows,
        }
    }

    /// Build the grid this arrangement describes.
    ///
    /// # Errors
    ///
    /// - [`NexusError::UnknownTileKind`] for the first unregistered identifier
    ///   in row-major order.
    /// - [`NexusError::InvalidGrid`] if there are no rows or they differ in
    ///   length.
    pub fn build_grid(&self) -> Result<Grid, NexusError> {
        let rows = self
            .rows
            .iter()
            .map(|row| row.iter().map(CellEntry::to_tile).collect::<Result<Vec<_>, _>>())
            .collect::<Result<Vec<_>, _>>()?;
        Grid::from_rows(rows)
    }
}

impl Default for Arrangement {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_and_detailed_cells() {
        let json = r#"{
            "name": "mixed",
            "rows": [
                ["source", "conductor", {"kind": "consumer", "color": [1, 2, 3], "lit_color": [4, 5, 6, 7]}]
            ]
        }"#;
        let arrangement = Arrangement::from_json(json).unwrap();
        assert_eq!(arrangement.name, "mixed");

        let grid = arrangement.build_grid().unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 1);

        let consumer = grid.get(2, 0).unwrap();
        assert_eq!(consumer.kind(), TileKind::Consumer);
        assert_eq!(consumer.base_color(), Color::rgb(1, 2, 3));
        assert_eq!(consumer.lit_color(), Color::rgba(4, 5, 6, 7));
        assert_eq!(consumer.current_color(), Color::rgb(1, 2, 3));
    }

    #[test]
    fn detailed_cell_without_overrides_uses_defaults() {
        let json = r#"{"rows": [[{"kind": "blocker"}]]}"#;
        let grid = Arrangement::from_json(json).unwrap().build_grid().unwrap();
        assert_eq!(
            grid.get(0, 0).unwrap().current_color(),
            TileKind::Blocker.base_color()
        );
    }

    #[test]
    fn unknown_kind_is_fatal_not_empty() {
        let json = r#"{"rows": [["source", "lamp"]]}"#;
        let err = Arrangement::from_json(json)
            .unwrap()
            .build_grid()
            .unwrap_err();
        match err {
            NexusError::UnknownTileKind { name, known } => {
                assert_eq!(name, "lamp");
                assert!(known.contains("conductor"));
            }
            other => panic!("expected UnknownTileKind, got {other:?}"),
        }
    }

    #[test]
    fn ragged_arrangement_is_invalid_grid() {
        let json = r#"{"rows": [["source", "empty"], ["empty"]]}"#;
        let err = Arrangement::from_json(json)
            .unwrap()
            .build_grid()
            .unwrap_err();
        assert!(matches!(err, NexusError::InvalidGrid { .. }));
    }

    #[test]
    fn malformed_json_is_invalid_arrangement() {
        assert!(matches!(
            Arrangement::from_json("{\"rows\": 5}"),
            Err(NexusError::InvalidArrangement { .. })
        ));
        assert!(matches!(
            Arrangement::from_json("not json"),
            Err(NexusError::InvalidArrangement { .. })
        ));
    }

    #[test]
    fn reference_layout() {
        let grid = Arrangement::reference().build_grid().unwrap();
        assert_eq!((grid.width(), grid.height()), (10, 10));
        assert_eq!(grid.get(0, 0).unwrap().kind(), TileKind::Plain);
        assert_eq!(grid.coords_of_kind(TileKind::Empty).len(), 99);
    }

    #[test]
    fn json_round_trip_keeps_layout() {
        let original = Arrangement::from_kinds(
            "loop",
            &[
                &[TileKind::Source, TileKind::Conductor],
                &[TileKind::Blocker, TileKind::Consumer],
            ],
        );
        let parsed = Arrangement::from_json(&original.to_json().unwrap()).unwrap();
        assert_eq!(parsed, original);
    }
}
