//! Tool selection and the mutually exclusive interaction modes.

use crate::model::TextBoxId;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pen,
    Eraser,
    Select,
    Text,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [ToolKind::Pen, ToolKind::Eraser, ToolKind::Select, ToolKind::Text];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Pen => "Pen",
            ToolKind::Eraser => "Eraser",
            ToolKind::Select => "Select",
            ToolKind::Text => "Text",
        }
    }
}

/// Which pointer button started an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// What the current pointer interaction is doing. Exactly one at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    /// A pen draft is open in the capture buffer.
    Drafting,
    /// The primary button is held with the eraser.
    Erasing,
    /// A text box follows the pointer.
    Dragging {
        id: TextBoxId,
        /// World position where the drag started.
        grab: Point,
        start_rect: Rect,
    },
    /// A text box's bottom-right corner follows the pointer.
    Resizing {
        id: TextBoxId,
        grab: Point,
        start_rect: Rect,
    },
    /// The view follows the pointer.
    Panning {
        /// Last view position seen.
        last: Point,
    },
}

impl InteractionMode {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionMode::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            InteractionMode::Idle => "idle",
            InteractionMode::Drafting => "drafting",
            InteractionMode::Erasing => "erasing",
            InteractionMode::Dragging { .. } => "dragging",
            InteractionMode::Resizing { .. } => "resizing",
            InteractionMode::Panning { .. } => "panning",
        }
    }
}

/// Minimum edge length of a text box while resizing, in world units.
pub const MIN_TEXT_BOX_SIZE: f64 = 20.0;

/// Rect of a text box moved by the pointer travelling from `grab` to `current`.
pub fn dragged_rect(start: Rect, grab: Point, current: Point) -> Rect {
    start + (current - grab)
}

/// Rect of a text box whose bottom-right corner is dragged from `grab` to
/// `current`. The top-left corner stays put.
pub fn resized_rect(start: Rect, grab: Point, current: Point) -> Rect {
    let delta = current - grab;
    let x1 = (start.x1 + delta.x).max(start.x0 + MIN_TEXT_BOX_SIZE);
    let y1 = (start.y1 + delta.y).max(start.y0 + MIN_TEXT_BOX_SIZE);
    Rect::new(start.x0, start.y0, x1, y1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tool() {
        assert_eq!(ToolKind::default(), ToolKind::Pen);
        assert_eq!(ToolKind::ALL.len(), 4);
    }

    #[test]
    fn test_dragged_rect() {
        let r = dragged_rect(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Point::new(5.0, 5.0),
            Point::new(8.0, 1.0),
        );
        assert_eq!(r, Rect::new(3.0, -4.0, 13.0, 6.0));
    }

    #[test]
    fn test_resized_rect_keeps_minimum() {
        let start = Rect::new(0.0, 0.0, 100.0, 100.0);
        let r = resized_rect(start, Point::new(100.0, 100.0), Point::new(150.0, 120.0));
        assert_eq!(r, Rect::new(0.0, 0.0, 150.0, 120.0));
        let tiny = resized_rect(start, Point::new(100.0, 100.0), Point::new(-50.0, -50.0));
        assert_eq!(tiny, Rect::new(0.0, 0.0, MIN_TEXT_BOX_SIZE, MIN_TEXT_BOX_SIZE));
    }

    #[test]
    fn test_mode_names() {
        assert!(InteractionMode::default().is_idle());
        assert_eq!(InteractionMode::Panning { last: Point::ZERO }.name(), "panning");
    }
}
