//! Power propagation benchmarks.
//!
//! Recomputation runs synchronously after every edit, so it has to fit well
//! inside a 16.67ms frame. These benchmarks measure a full recompute and an
//! edit + recompute on seeded random grids from 10x10 (reference level) up to
//! 64x64.
//!
//! Run with: `cargo bench --bench power_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use nexus_tiles::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A `size x size` grid with a fixed kind mix, mostly conductors so the
/// flood actually travels.
fn random_grid(size: usize, seed: u64) -> Grid {
    let mut rng = Pcg64::seed_from_u64(seed);
    let rows = (0..size)
        .map(|_| {
            (0..size)
                .map(|_| {
                    let kind = match rng.gen_range(0..100) {
                        0..=2 => TileKind::Source,
                        3..=64 => TileKind::Conductor,
                        65..=74 => TileKind::Consumer,
                        75..=89 => TileKind::Blocker,
                        _ => TileKind::Empty,
                    };
                    Tile::new(kind)
                })
                .collect()
        })
        .collect();
    Grid::from_rows(rows).expect("benchmark grid is rectangular")
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("recompute");
    for size in [10usize, 32, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut grid = random_grid(size, 42);
            let mut engine = PowerEngine::new();
            b.iter(|| {
                // Alternate states so each iteration does real transition work.
                let src = grid.get(0, 0).map(Tile::kind).unwrap_or(TileKind::Empty);
                let next = if src == TileKind::Source {
                    TileKind::Blocker
                } else {
                    TileKind::Source
                };
                grid.set(0, 0, Tile::new(next)).expect("origin in bounds");
                black_box(engine.recompute(&mut grid));
            });
        });
    }
    group.finish();
}

fn bench_steady_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("recompute_unchanged");
    for size in [10usize, 32, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut grid = random_grid(size, 7);
            let mut engine = PowerEngine::new();
            engine.recompute(&mut grid);
            b.iter(|| black_box(engine.recompute(&mut grid)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_recompute, bench_steady_state);
criterion_main!(benches);
