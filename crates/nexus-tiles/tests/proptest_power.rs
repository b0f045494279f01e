//! Property tests for power propagation.
//!
//! Random grids are generated from a small kind alphabet and the engine's
//! result is checked against a naive fixed-point iteration that knows nothing
//! about BFS or visitation order.

use nexus_tiles::prelude::*;
use proptest::prelude::*;

fn kind_strategy() -> impl Strategy<Value = TileKind> {
    prop_oneof![
        3 => Just(TileKind::Conductor),
        2 => Just(TileKind::Empty),
        1 => Just(TileKind::Source),
        1 => Just(TileKind::Consumer),
        1 => Just(TileKind::Blocker),
        1 => Just(TileKind::Plain),
    ]
}

/// `(width, kinds)` with `kinds.len()` a multiple of `width`.
fn layout_strategy() -> impl Strategy<Value = (usize, Vec<TileKind>)> {
    (1usize..12, 1usize..12).prop_flat_map(|(w, h)| {
        (Just(w), prop::collection::vec(kind_strategy(), w * h))
    })
}

fn build(width: usize, kinds: &[TileKind]) -> Grid {
    let rows = kinds
        .chunks(width)
        .map(|row| row.iter().map(|k| Tile::new(*k)).collect())
        .collect();
    Grid::from_rows(rows).unwrap()
}

/// Powered set by repeated relaxation until nothing changes.
fn fixed_point(width: usize, kinds: &[TileKind]) -> Vec<bool> {
    let height = kinds.len() / width;
    let mut powered: Vec<bool> = kinds.iter().map(|k| k.is_source()).collect();
    loop {
        let mut changed = false;
        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                if powered[idx] || !kinds[idx].accepts_power() {
                    continue;
                }
                let mut feeds = Vec::new();
                if y > 0 {
                    feeds.push(idx - width);
                }
                if y + 1 < height {
                    feeds.push(idx + width);
                }
                if x > 0 {
                    feeds.push(idx - 1);
                }
                if x + 1 < width {
                    feeds.push(idx + 1);
                }
                if feeds.iter().any(|&n| powered[n] && kinds[n].conducts()) {
                    powered[idx] = true;
                    changed = true;
                }
            }
        }
        if !changed {
            return powered;
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn engine_matches_fixed_point((width, kinds) in layout_strategy()) {
        let mut grid = build(width, &kinds);
        PowerEngine::new().recompute(&mut grid);
        prop_assert_eq!(grid.powered_mask(), fixed_point(width, &kinds));
    }

    #[test]
    fn no_sources_nothing_powered((width, kinds) in layout_strategy()) {
        let kinds: Vec<TileKind> = kinds
            .into_iter()
            .map(|k| if k == TileKind::Source { TileKind::Conductor } else { k })
            .collect();
        let mut grid = build(width, &kinds);
        PowerEngine::new().recompute(&mut grid);
        prop_assert!(grid.iter().all(|t| !t.is_powered()));
    }

    #[test]
    fn inert_kinds_never_powered((width, kinds) in layout_strategy()) {
        let mut grid = build(width, &kinds);
        PowerEngine::new().recompute(&mut grid);
        for tile in grid.iter() {
            if matches!(tile.kind(), TileKind::Blocker | TileKind::Empty | TileKind::Plain) {
                prop_assert!(!tile.is_powered(), "{:?} at {:?} is powered", tile.kind(), tile.position());
            }
        }
    }

    #[test]
    fn second_recompute_fires_nothing((width, kinds) in layout_strategy()) {
        let mut grid = build(width, &kinds);
        let mut engine = PowerEngine::new();
        engine.recompute(&mut grid);
        prop_assert!(engine.recompute(&mut grid).is_empty());
    }

    #[test]
    fn transitions_are_row_major_and_match_flags((width, kinds) in layout_strategy()) {
        let mut grid = build(width, &kinds);
        let before = grid.powered_mask();
        let transitions = PowerEngine::new().recompute(&mut grid);
        let after = grid.powered_mask();

        let mut last_idx = None;
        for t in &transitions {
            let idx = grid.index_of(t.position.0, t.position.1).unwrap();
            prop_assert!(last_idx.map_or(true, |l| l < idx));
            last_idx = Some(idx);
            prop_assert_ne!(before[idx], after[idx]);
            prop_assert_eq!(after[idx], t.powered);
        }
        let changed = before.iter().zip(&after).filter(|(b, a)| b != a).count();
        prop_assert_eq!(changed, transitions.len());
    }

    #[test]
    fn random_edits_stay_consistent(
        (width, kinds) in layout_strategy(),
        edits in prop::collection::vec((0usize..12, 0usize..12, kind_strategy()), 1..20),
    ) {
        let mut grid = build(width, &kinds);
        let mut engine = PowerEngine::new();
        engine.recompute(&mut grid);

        for (x, y, kind) in edits {
            if grid.set(x, y, Tile::new(kind)).is_err() {
                continue;
            }
            engine.recompute(&mut grid);
            let current: Vec<TileKind> = grid.iter().map(Tile::kind).collect();
            prop_assert_eq!(grid.powered_mask(), fixed_point(width, &current));
        }
    }
}

#[test]
fn large_grid_serpentine_is_fully_powered() {
    // A 64x64 serpentine corridor: every row is conductors, rows are joined
    // alternately at the right and left ends, blockers elsewhere in the gap rows.
    let size = 64;
    let mut kinds = vec![TileKind::Blocker; size * size];
    for y in (0..size).step_by(2) {
        for x in 0..size {
            kinds[y * size + x] = TileKind::Conductor;
        }
        if y + 1 < size {
            let joint = if (y / 2) % 2 == 0 { size - 1 } else { 0 };
            kinds[(y + 1) * size + joint] = TileKind::Conductor;
        }
    }
    kinds[0] = TileKind::Source;

    let mut grid = build(size, &kinds);
    PowerEngine::new().recompute(&mut grid);

    let conductors = grid.coords_of_kind(TileKind::Conductor);
    assert!(!conductors.is_empty());
    for (x, y) in conductors {
        assert!(grid.get(x, y).unwrap().is_powered(), "({x}, {y}) unpowered");
    }
}
