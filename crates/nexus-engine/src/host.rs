//! The host-loop boundary.
//!
//! The core never opens a window or owns an event pump. Whatever does --
//! the `winit` runner behind the `renderer` feature, a test harness, or a
//! headless batch driver -- implements [`Surface`] and feeds [`InputEvent`]s
//! to a [`HostLoop`], which drives the [`Level`] it is handed each frame:
//!
//! 1. [`HostLoop::on_event`] for every pending input event.
//! 2. [`HostLoop::on_loop`]: advance the level (apply queued edits).
//! 3. [`HostLoop::on_render`]: clear, draw every tile, present.
//!
//! The level is passed in explicitly on every call; there is no global
//! "current level".

use std::convert::Infallible;
use std::fmt;

use nexus_tiles::color::Color;
use nexus_tiles::draw::DrawCommand;
use nexus_tiles::tile::{Tile, TileKind};

use crate::level::{FrameReport, Level};

// ---------------------------------------------------------------------------
// HostConfig
// ---------------------------------------------------------------------------

/// Configuration for the host loop and its window.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Window title.
    pub title: String,
    /// Window width in physical pixels.
    pub width: u32,
    /// Window height in physical pixels.
    pub height: u32,
    /// Color the surface is cleared to before tiles are drawn.
    pub clear_color: Color,
    /// Headless mode: advance the level but never touch the surface.
    pub headless: bool,
}

impl Default for HostConfig {
    /// A 900x600 "Nexus of Light" window cleared to black.
    fn default() -> Self {
        Self {
            title: "Nexus of Light".to_owned(),
            width: 900,
            height: 600,
            clear_color: Color::BLACK,
            headless: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// A display surface the level can be drawn onto.
pub trait Surface {
    /// Error returned when a frame cannot be presented.
    type Error: fmt::Display;

    /// Clear the whole surface to `color`.
    fn fill(&mut self, color: Color);

    /// Draw one filled rectangle.
    fn draw(&mut self, cmd: &DrawCommand);

    /// Show everything drawn since the last present.
    fn present(&mut self) -> Result<(), Self::Error>;
}

/// A surface that only records what it was asked to do.
///
/// Used for headless runs and tests; every frame's commands are kept until
/// the next `fill`.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    /// Last clear color.
    pub clear_color: Option<Color>,
    /// Commands drawn since the last clear.
    pub commands: Vec<DrawCommand>,
    /// Number of presented frames.
    pub presented: u64,
}

impl Surface for RecordingSurface {
    type Error = Infallible;

    fn fill(&mut self, color: Color) {
        self.clear_color = Some(color);
        self.commands.clear();
    }

    fn draw(&mut self, cmd: &DrawCommand) {
        self.commands.push(*cmd);
    }

    fn present(&mut self) -> Result<(), Self::Error> {
        self.presented += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// InputEvent
// ---------------------------------------------------------------------------

/// A discrete input event from the host's event pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// The user asked to close the game.
    Quit,
    /// Place a tile of `kind` at grid cell `(x, y)` on the next advance.
    Edit { x: usize, y: usize, kind: TileKind },
    /// Anything the core does not consume.
    Other,
}

// ---------------------------------------------------------------------------
// HostLoop
// ---------------------------------------------------------------------------

/// Per-frame driver for a [`Level`].
#[derive(Debug)]
pub struct HostLoop {
    config: HostConfig,
    running: bool,
    frames: u64,
    last_report: FrameReport,
}

impl HostLoop {
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            running: true,
            frames: 0,
            last_report: FrameReport::default(),
        }
    }

    /// Handle one input event. `Quit` stops the loop; `Edit` is queued on
    /// the level for the next [`on_loop`](Self::on_loop).
    pub fn on_event(&mut self, level: &mut Level, event: InputEvent) {
        match event {
            InputEvent::Quit => {
                tracing::info!(frames = self.frames, "quit requested");
                self.running = false;
            }
            InputEvent::Edit { x, y, kind } => level.queue_edit(x, y, Tile::new(kind)),
            InputEvent::Other => {}
        }
    }

    /// Advance the level by one frame.
    pub fn on_loop(&mut self, level: &mut Level) -> &FrameReport {
        self.last_report = level.advance();
        self.frames += 1;
        if !self.last_report.changed.is_empty() {
            tracing::debug!(
                frame = self.last_report.frame,
                changed = self.last_report.changed.len(),
                cleared = level.is_cleared(),
                "power changed"
            );
        }
        &self.last_report
    }

    /// Clear the surface, draw the level, and present. A no-op in headless
    /// mode.
    ///
    /// # Errors
    ///
    /// Returns the surface's error if the frame could not be presented.
    pub fn on_render<S: Surface>(&mut self, level: &Level, surface: &mut S) -> Result<(), S::Error> {
        if self.config.headless {
            return Ok(());
        }
        surface.fill(self.config.clear_color);
        level.render(surface);
        surface.present()
    }

    /// Run one full frame: events, then advance and render unless an event
    /// asked to quit. The frame a quit arrives in is neither advanced nor
    /// rendered.
    ///
    /// # Errors
    ///
    /// Returns the surface's error if the frame could not be presented.
    pub fn frame<S, I>(&mut self, level: &mut Level, surface: &mut S, events: I) -> Result<(), S::Error>
    where
        S: Surface,
        I: IntoIterator<Item = InputEvent>,
    {
        for event in events {
            self.on_event(level, event);
        }
        if !self.running {
            return Ok(());
        }
        self.on_loop(level);
        self.on_render(level, surface)
    }

    /// Drive frames from a sequence of per-frame event batches until the
    /// batches run out or a `Quit` arrives. Returns the number of frames
    /// advanced.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first presentation error.
    pub fn run<S, B, I>(&mut self, level: &mut Level, surface: &mut S, batches: B) -> Result<u64, S::Error>
    where
        S: Surface,
        B: IntoIterator<Item = I>,
        I: IntoIterator<Item = InputEvent>,
    {
        let start = self.frames;
        for batch in batches {
            self.frame(level, surface, batch)?;
            if !self.running {
                break;
            }
        }
        Ok(self.frames - start)
    }

    // -- accessors ----------------------------------------------------------

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames advanced so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Report from the most recent [`on_loop`](Self::on_loop).
    pub fn last_report(&self) -> &FrameReport {
        &self.last_report
    }
}

impl Default for HostLoop {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_reference_window() {
        let config = HostConfig::default();
        assert_eq!(config.title, "Nexus of Light");
        assert_eq!((config.width, config.height), (900, 600));
        assert_eq!(config.clear_color, Color::BLACK);
        assert!(!config.headless);
    }

    #[test]
    fn render_clears_then_draws_every_cell() {
        let mut level = Level::reference().unwrap();
        let mut host = HostLoop::default();
        let mut surface = RecordingSurface::default();

        host.frame(&mut level, &mut surface, Vec::<InputEvent>::new())
            .unwrap();

        assert_eq!(surface.clear_color, Some(Color::BLACK));
        assert_eq!(surface.commands.len(), 100);
        assert_eq!(surface.presented, 1);
        assert_eq!(host.frame_count(), 1);
    }

    #[test]
    fn quit_stops_before_advancing() {
        let mut level = Level::reference().unwrap();
        let mut host = HostLoop::default();
        let mut surface = RecordingSurface::default();

        host.frame(&mut level, &mut surface, [InputEvent::Quit]).unwrap();

        assert!(!host.is_running());
        assert_eq!(level.frame_count(), 0);
        assert_eq!(surface.presented, 0);
    }

    #[test]
    fn other_events_are_ignored() {
        let mut level = Level::reference().unwrap();
        let mut host = HostLoop::default();
        host.on_event(&mut level, InputEvent::Other);
        assert!(host.is_running());
        assert_eq!(level.pending_edits(), 0);
    }

    #[test]
    fn headless_skips_surface() {
        let mut level = Level::reference().unwrap();
        let mut host = HostLoop::new(HostConfig {
            headless: true,
            ..Default::default()
        });
        let mut surface = RecordingSurface::default();

        let frames = host
            .run(&mut level, &mut surface, vec![Vec::<InputEvent>::new(); 5])
            .unwrap();

        assert_eq!(frames, 5);
        assert_eq!(level.frame_count(), 5);
        assert_eq!(surface.presented, 0);
        assert!(surface.clear_color.is_none());
    }
}
