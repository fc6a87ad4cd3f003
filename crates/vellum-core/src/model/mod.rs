//! Entities stored in a document: strokes and text boxes.

mod geometry;
mod stroke;
mod text_box;

pub use geometry::{ShapeGeometry, ShapeKind, ShapeParamsError};
pub use stroke::{Stroke, StrokePoint, StrokeShape};
pub use text_box::TextBox;

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Identifier of a stroke. Allocated by the document, never reused within a session.
pub type StrokeId = u64;

/// Identifier of a text box. Has its own counter, independent from strokes.
pub type TextBoxId = u64;

/// Ink color (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InkColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl InkColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Default pen color, a soft black.
    pub const fn ink() -> Self {
        Self::new(20, 20, 20, 255)
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    /// Pack as `0xAARRGGBB`.
    pub fn to_argb(self) -> u32 {
        (u32::from(self.a) << 24) | (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }

    /// Unpack from `0xAARRGGBB`.
    pub fn from_argb(v: u32) -> Self {
        Self {
            a: ((v >> 24) & 0xFF) as u8,
            r: ((v >> 16) & 0xFF) as u8,
            g: ((v >> 8) & 0xFF) as u8,
            b: (v & 0xFF) as u8,
        }
    }

    /// CSS-style hex string (`#rrggbb`), alpha dropped.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for InkColor {
    fn default() -> Self {
        Self::ink()
    }
}

impl From<Color> for InkColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<InkColor> for Color {
    fn from(color: InkColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}
