//! Nexus Engine -- levels and the host-loop boundary for Nexus of Light.
//!
//! This crate builds on [`nexus_tiles`] to provide the playable layer: a
//! [`Level`](level::Level) that owns a grid and keeps its power state current
//! across edits, and a [`HostLoop`](host::HostLoop) that drives a level once
//! per frame against any [`Surface`](host::Surface). The `renderer` feature
//! adds a `wgpu` debug renderer and a `winit` windowed runner.
//!
//! # Quick Start
//!
//! ```
//! use nexus_engine::prelude::*;
//!
//! let mut level = Level::reference().unwrap();
//! let mut host = HostLoop::default();
//! let mut surface = RecordingSurface::default();
//!
//! let frames = host
//!     .run(
//!         &mut level,
//!         &mut surface,
//!         vec![
//!             vec![InputEvent::Edit { x: 1, y: 0, kind: TileKind::Source }],
//!             vec![],
//!             vec![InputEvent::Quit],
//!         ],
//!     )
//!     .unwrap();
//!
//! assert_eq!(frames, 2);
//! assert_eq!(surface.commands.len(), 100);
//! assert!(level.grid().get(1, 0).unwrap().is_powered());
//! ```

#![deny(unsafe_code)]

pub mod host;
pub mod level;
pub mod render;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the tile crate for convenience.
pub use nexus_tiles;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    // Re-export everything from the tiles prelude.
    pub use nexus_tiles::prelude::*;

    // Engine-specific exports.
    pub use crate::host::{HostConfig, HostLoop, InputEvent, RecordingSurface, Surface};
    pub use crate::level::{FrameReport, Level, RejectedEdit};
}
