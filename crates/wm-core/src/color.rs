// ABOUTME: Color representation used by color schemes and draw commands.
// ABOUTME: Stores linear RGBA components as f32.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Translucent gray used to mark the pane under an armed edit pick
    pub const SELECTION: Self = Self::rgba(0.5, 0.5, 0.5, 0.5);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<Color> for [f32; 4] {
    fn from(c: Color) -> Self {
        c.to_array()
    }
}
