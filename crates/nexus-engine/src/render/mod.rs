//! Windowed debug renderer for playing a level.
//!
//! This module is feature-gated behind `renderer`. When the feature is not
//! enabled, this module compiles to nothing and the engine runs headless
//! against any other [`Surface`](crate::host::Surface).
//!
//! [`TileRenderer`] implements `Surface` on top of `wgpu`, and
//! [`run_windowed`] drives a [`Level`](crate::level::Level) through a
//! [`HostLoop`](crate::host::HostLoop) inside a `winit` event loop.

#[cfg(feature = "renderer")]
pub mod app;
#[cfg(feature = "renderer")]
pub mod renderer;

#[cfg(feature = "renderer")]
pub use app::run_windowed;
#[cfg(feature = "renderer")]
pub use renderer::{ScreenCamera, TileRenderer};
