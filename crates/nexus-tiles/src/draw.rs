//! Draw commands handed to whatever owns the display surface.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Edge length of one tile in pixels.
pub const TILE_SIZE: u32 = 32;

/// A filled, axis-aligned rectangle in screen pixels.
///
/// `(x, y)` is the top-left corner; y grows downward. A tile at grid column
/// `col` and row `row` draws at `(col * TILE_SIZE, row * TILE_SIZE)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawCommand {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub color: Color,
}

impl DrawCommand {
    /// Whether the pixel `(px, py)` falls inside this rectangle.
    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let cmd = DrawCommand {
            x: 32,
            y: 0,
            width: TILE_SIZE,
            height: TILE_SIZE,
            color: Color::BLACK,
        };
        assert!(cmd.contains(32, 0));
        assert!(cmd.contains(63, 31));
        assert!(!cmd.contains(64, 0));
        assert!(!cmd.contains(31, 0));
        assert!(!cmd.contains(40, 32));
    }
}
