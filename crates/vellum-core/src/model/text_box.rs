//! Markdown text boxes.

use super::TextBoxId;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An axis-aligned box of markdown text placed in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub id: TextBoxId,
    /// World-space rectangle.
    pub rect: Rect,
    /// Plain or markdown content.
    pub markdown: String,
}

impl TextBox {
    pub fn new(id: TextBoxId, rect: Rect, markdown: impl Into<String>) -> Self {
        Self {
            id,
            rect: rect.abs(),
            markdown: markdown.into(),
        }
    }

    /// Whether the point lies inside the box or on its border.
    pub fn contains(&self, point: Point) -> bool {
        crate::hit_test::rect_contains(self.rect, point)
    }
}
