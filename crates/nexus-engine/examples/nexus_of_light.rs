//! Nexus of Light -- route power from the sources to every consumer.
//!
//! Run with:
//!   cargo run --example nexus_of_light --features renderer -p nexus-engine
//!
//! Pass a path to an arrangement JSON file to play it instead of the
//! built-in puzzle.
//!
//! Controls:
//!   Left click -- cycle the clicked cell's tile kind
//!   Escape -- quit

use nexus_engine::prelude::*;
use nexus_engine::render::run_windowed;
use tracing_subscriber::EnvFilter;

/// A 10x10 puzzle: two consumers, one gap in each conductor line.
const PUZZLE: &str = r#"{
  "name": "two lamps",
  "rows": [
    ["source",    "conductor", "conductor", "empty",     "conductor", "conductor", "consumer", "empty", "empty", "empty"],
    ["empty",     "empty",     "empty",     "empty",     "empty",     "empty",     "empty",    "empty", "empty", "empty"],
    ["empty",     "blocker",   "blocker",   "blocker",   "empty",     "empty",     "empty",    "empty", "empty", "empty"],
    ["empty",     "empty",     "empty",     "empty",     "empty",     "empty",     "empty",    "empty", "empty", "empty"],
    ["source",    "conductor", "empty",     "conductor", "conductor", "empty",     "empty",    "empty", "empty", "empty"],
    ["empty",     "empty",     "empty",     "empty",     "conductor", "empty",     "empty",    "empty", "empty", "empty"],
    ["empty",     "empty",     "empty",     "empty",     "conductor", "empty",     "empty",    "empty", "empty", "empty"],
    ["empty",     "empty",     "empty",     "empty",     {"kind": "consumer", "lit_color": [0, 160, 255]}, "empty", "empty", "empty", "empty", "empty"],
    ["empty",     "empty",     "empty",     "empty",     "empty",     "empty",     "empty",    "empty", "empty", "empty"],
    ["plain",     "empty",     "empty",     "empty",     "empty",     "empty",     "empty",    "empty", "empty", "empty"]
  ]
}"#;

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let arrangement = match std::env::args().nth(1) {
        Some(path) => Arrangement::from_json(&std::fs::read_to_string(path)?)?,
        None => Arrangement::from_json(PUZZLE)?,
    };
    let level = Level::new(&arrangement)?;

    tracing::info!(
        level = level.name(),
        width = level.grid().width(),
        height = level.grid().height(),
        cleared = level.is_cleared(),
        "starting Nexus of Light"
    );

    run_windowed(level, HostConfig::default())
}
