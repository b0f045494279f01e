//! Windowed application runner for the tile renderer.
//!
//! Provides [`run_windowed`], which takes ownership of a [`Level`] and drives
//! it through a [`HostLoop`] inside a winit event loop. Window events are
//! translated into [`InputEvent`]s and buffered; each `RedrawRequested`
//! delivers the buffer, advances the level, and renders a frame.
//!
//! Controls: left-click a cell to cycle its tile kind, Escape or closing the
//! window quits.
//!
//! This module is feature-gated behind `renderer`.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{WindowAttributes, WindowId};

use super::renderer::TileRenderer;
use crate::host::{HostConfig, HostLoop, InputEvent};
use crate::level::Level;

/// Run a level in a window until the player quits.
///
/// Takes ownership of the level and blocks until the window is closed.
/// Each frame:
///
/// 1. Delivers the input events gathered since the last frame.
/// 2. Advances the level, applying queued edits.
/// 3. Renders every tile via the tile renderer.
///
/// `config.headless` is ignored here; a window always renders.
///
/// # Errors
///
/// Returns an error if the event loop cannot be created or if the window or
/// renderer fails to initialize.
pub fn run_windowed(level: Level, config: HostConfig) -> Result<(), anyhow::Error> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

    let config = HostConfig {
        headless: false,
        ..config
    };

    let mut app = App {
        state: AppState::Pending { level, config },
        init_failed: false,
    };

    event_loop.run_app(&mut app)?;

    if app.init_failed {
        return Err(anyhow::anyhow!(
            "failed to initialize windowed renderer (see logs for details)"
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Internal state machine
// ---------------------------------------------------------------------------

/// Internal state of the windowed app.
///
/// Winit 0.30 requires window creation inside
/// `ApplicationHandler::resumed`, so the level waits in `Pending` until the
/// window and renderer exist.
enum AppState {
    /// Waiting for `resumed` to create the window and renderer.
    Pending { level: Level, config: HostConfig },
    /// Window and renderer are initialized; the level is live.
    Running(Box<Running>),
    /// Temporary placeholder used during state transitions.
    Transitioning,
}

struct Running {
    level: Level,
    host: HostLoop,
    renderer: TileRenderer,
    /// Last cursor position in physical pixels, if the cursor is inside.
    cursor: Option<(f64, f64)>,
    /// Events gathered since the last redraw.
    events: Vec<InputEvent>,
}

impl Running {
    /// Translate a left click into an edit that cycles the clicked cell.
    fn click(&mut self) {
        let Some((px, py)) = self.cursor else {
            return;
        };
        if let Some(event) = cycle_edit_at(&self.level, px, py) {
            self.events.push(event);
        }
    }

    /// Deliver buffered events, advance, render. Returns `false` once the
    /// host loop has stopped.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> bool {
        for event in self.events.drain(..) {
            self.host.on_event(&mut self.level, event);
        }
        if !self.host.is_running() {
            return false;
        }

        let report = self.host.on_loop(&mut self.level);
        if !report.changed.is_empty() && self.level.is_cleared() {
            tracing::info!(
                level = self.level.name(),
                frame = report.frame,
                "level cleared"
            );
        }

        match self.host.on_render(&self.level, &mut self.renderer) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) => {
                let size = self.renderer.window().inner_size();
                self.renderer.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("GPU out of memory -- exiting");
                event_loop.exit();
                return false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "surface error during render");
            }
        }

        self.renderer.window().request_redraw();
        true
    }
}

/// The edit a left click at pixel `(px, py)` produces: the cell under the
/// cursor advances to the next tile kind. `None` outside the grid.
fn cycle_edit_at(level: &Level, px: f64, py: f64) -> Option<InputEvent> {
    let (x, y) = level.cell_at_pixel(px, py)?;
    let tile = level.grid().get(x, y).ok()?;
    let kind = tile.kind().next();
    tracing::debug!(x, y, kind = %kind, "cell clicked");
    Some(InputEvent::Edit { x, y, kind })
}

/// The winit application handler that drives the level with rendering.
struct App {
    state: AppState,
    /// Set to `true` if initialization fails (window or renderer), so
    /// `run_windowed` can return an error after the event loop exits.
    init_failed: bool,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let state = std::mem::replace(&mut self.state, AppState::Transitioning);
        match state {
            AppState::Pending { level, config } => {
                let window_attrs = WindowAttributes::default()
                    .with_title(config.title.clone())
                    .with_inner_size(winit::dpi::PhysicalSize::new(config.width, config.height));

                let window = match event_loop.create_window(window_attrs) {
                    Ok(window) => Arc::new(window),
                    Err(e) => {
                        tracing::error!(error = %e, "failed to create window -- exiting");
                        self.init_failed = true;
                        self.state = AppState::Pending { level, config };
                        event_loop.exit();
                        return;
                    }
                };

                match pollster::block_on(TileRenderer::new(window.clone())) {
                    Ok(renderer) => {
                        tracing::info!(
                            width = config.width,
                            height = config.height,
                            level = level.name(),
                            "tile renderer window created"
                        );
                        // Some backends never send an initial RedrawRequested.
                        window.request_redraw();
                        self.state = AppState::Running(Box::new(Running {
                            level,
                            host: HostLoop::new(config),
                            renderer,
                            cursor: None,
                            events: Vec::new(),
                        }));
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to initialize tile renderer -- exiting");
                        self.init_failed = true;
                        self.state = AppState::Pending { level, config };
                        event_loop.exit();
                    }
                }
            }
            running @ AppState::Running(_) => {
                self.state = running;
            }
            AppState::Transitioning => {
                tracing::warn!("resumed called during state transition");
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let AppState::Running(running) = &mut self.state else {
            // Not yet initialized; ignore window events.
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!(
                    frames = running.host.frame_count(),
                    "window close requested -- shutting down"
                );
                running.host.on_event(&mut running.level, InputEvent::Quit);
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape) =>
            {
                running.events.push(InputEvent::Quit);
            }
            WindowEvent::CursorMoved { position, .. } => {
                running.cursor = Some((position.x, position.y));
            }
            WindowEvent::CursorLeft { .. } => {
                running.cursor = None;
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => running.click(),
            WindowEvent::Resized(new_size) => {
                tracing::debug!(
                    width = new_size.width,
                    height = new_size.height,
                    "window resized"
                );
                running.renderer.resize(new_size);
            }
            WindowEvent::RedrawRequested => {
                if !running.redraw(event_loop) {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_tiles::tile::TileKind;

    #[test]
    fn click_cycles_the_cell_under_the_cursor() {
        let level = Level::reference().unwrap();
        // (0, 0) holds the plain tile, (1, 0) is empty.
        assert_eq!(
            cycle_edit_at(&level, 5.0, 5.0),
            Some(InputEvent::Edit {
                x: 0,
                y: 0,
                kind: TileKind::Plain.next(),
            })
        );
        assert_eq!(
            cycle_edit_at(&level, 40.0, 31.0),
            Some(InputEvent::Edit {
                x: 1,
                y: 0,
                kind: TileKind::Empty.next(),
            })
        );
    }

    #[test]
    fn click_outside_grid_is_ignored() {
        let level = Level::reference().unwrap();
        assert_eq!(cycle_edit_at(&level, 320.0, 0.0), None);
        assert_eq!(cycle_edit_at(&level, 899.0, 599.0), None);
    }

    #[test]
    fn clicked_edit_applies_through_host_loop() {
        let mut level = Level::reference().unwrap();
        let mut host = HostLoop::new(HostConfig {
            headless: true,
            ..Default::default()
        });
        let event = cycle_edit_at(&level, 40.0, 40.0).unwrap();
        host.on_event(&mut level, event);
        host.on_loop(&mut level);
        assert_eq!(
            level.grid().get(1, 1).unwrap().kind(),
            TileKind::Empty.next()
        );
    }
}
