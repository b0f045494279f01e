//! RGBA colors with 8-bit channels.
//!
//! Arrangement documents spell colors as JSON arrays of three (`[r, g, b]`)
//! or four (`[r, g, b, a]`) integers in `[0, 255]`. Three-channel colors are
//! fully opaque.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An RGBA color, one byte per channel.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels normalized to `0.0..=1.0`, as GPU vertex data expects.
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02X}{:02X}{:02X}{:02X}",
            self.r, self.g, self.b, self.a
        )
    }
}

impl TryFrom<Vec<u8>> for Color {
    type Error = String;

    fn try_from(channels: Vec<u8>) -> Result<Self, Self::Error> {
        match channels.as_slice() {
            &[r, g, b] => Ok(Color::rgb(r, g, b)),
            &[r, g, b, a] => Ok(Color::rgba(r, g, b, a)),
            other => Err(format!(
                "color must have 3 or 4 channels, got {}",
                other.len()
            )),
        }
    }
}

impl From<Color> for Vec<u8> {
    fn from(c: Color) -> Self {
        if c.a == 255 {
            vec![c.r, c.g, c.b]
        } else {
            vec![c.r, c.g, c.b, c.a]
        }
    }
}
