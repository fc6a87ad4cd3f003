//! The document: ordered strokes and text boxes, id allocation and change
//! notification.
//!
//! Structural primitives (`insert_*`, `take_*_at`) are index-addressed so that
//! undo can restore the exact paint order. Property edits (`set_*_by_id`) are
//! id-addressed because identity is what matters there, not position.
//! Every primitive that changes state notifies subscribers exactly once, after
//! the change is fully applied. Out-of-range indices and unknown ids are
//! silent no-ops.

use crate::model::{Stroke, StrokeId, StrokeShape, TextBox, TextBoxId};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the canvas is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Unbounded canvas.
    #[default]
    Infinite,
    /// Vertically stacked A4 pages.
    A4Notebook,
}

impl ViewMode {
    /// Same name as the persisted form.
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Infinite => "infinite",
            ViewMode::A4Notebook => "a4_notebook",
        }
    }
}

/// What a mutating call changed.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentChange {
    StrokeInserted { index: usize, id: StrokeId },
    StrokeRemoved { index: usize, id: StrokeId },
    StrokeShapeChanged { id: StrokeId },
    TextBoxInserted { index: usize, id: TextBoxId },
    TextBoxRemoved { index: usize, id: TextBoxId },
    TextBoxRectChanged { id: TextBoxId },
    TextBoxMarkdownChanged { id: TextBoxId },
    ViewModeChanged(ViewMode),
    Cleared,
}

/// Handle returned by [`Document::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&DocumentChange)>;

/// The authoritative entity store of one editing session.
pub struct Document {
    view_mode: ViewMode,
    /// Strokes in paint order (back to front).
    strokes: Vec<Stroke>,
    /// Text boxes in paint order (back to front).
    text_boxes: Vec<TextBox>,
    next_stroke_id: StrokeId,
    next_text_box_id: TextBoxId,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("view_mode", &self.view_mode)
            .field("strokes", &self.strokes.len())
            .field("text_boxes", &self.text_boxes.len())
            .field("next_stroke_id", &self.next_stroke_id)
            .field("next_text_box_id", &self.next_text_box_id)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            view_mode: ViewMode::default(),
            strokes: Vec::new(),
            text_boxes: Vec::new(),
            next_stroke_id: 1,
            next_text_box_id: 1,
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    // --- Change notification ---

    /// Register a callback invoked once per mutating call.
    pub fn subscribe(&mut self, listener: impl FnMut(&DocumentChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, change: DocumentChange) {
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
    }

    // --- Read access ---

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Strokes in paint order.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Text boxes in paint order.
    pub fn text_boxes(&self) -> &[TextBox] {
        &self.text_boxes
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.text_boxes.is_empty()
    }

    pub fn stroke_index_by_id(&self, id: StrokeId) -> Option<usize> {
        self.strokes.iter().position(|s| s.id == id)
    }

    pub fn stroke_by_id(&self, id: StrokeId) -> Option<&Stroke> {
        self.strokes.iter().find(|s| s.id == id)
    }

    pub fn text_box_index_by_id(&self, id: TextBoxId) -> Option<usize> {
        self.text_boxes.iter().position(|t| t.id == id)
    }

    pub fn text_box_by_id(&self, id: TextBoxId) -> Option<&TextBox> {
        self.text_boxes.iter().find(|t| t.id == id)
    }

    /// Union of all stroke bounds and text box rectangles.
    pub fn content_bounds(&self) -> Option<Rect> {
        let strokes = self.strokes.iter().filter_map(Stroke::bounds);
        let boxes = self.text_boxes.iter().map(|t| t.rect.abs());
        strokes.chain(boxes).reduce(|acc, r| acc.union(r))
    }

    // --- View mode ---

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode == mode {
            return;
        }
        self.view_mode = mode;
        self.notify(DocumentChange::ViewModeChanged(mode));
    }

    // --- Strokes ---

    /// Insert a stroke at `index`, or append when `index` is `None` or past the end.
    /// Returns the index actually used.
    pub fn insert_stroke(&mut self, index: Option<usize>, stroke: Stroke) -> usize {
        let index = match index {
            Some(i) if i <= self.strokes.len() => i,
            _ => self.strokes.len(),
        };
        let id = stroke.id;
        self.strokes.insert(index, stroke);
        self.notify(DocumentChange::StrokeInserted { index, id });
        index
    }

    /// Remove and return the stroke at `index`. Out of range yields `None`.
    pub fn take_stroke_at(&mut self, index: usize) -> Option<Stroke> {
        if index >= self.strokes.len() {
            return None;
        }
        let stroke = self.strokes.remove(index);
        self.notify(DocumentChange::StrokeRemoved { index, id: stroke.id });
        Some(stroke)
    }

    /// Replace the shape annotation of a stroke. Returns false if the id is unknown.
    pub fn set_stroke_shape_by_id(&mut self, id: StrokeId, shape: StrokeShape) -> bool {
        let Some(stroke) = self.strokes.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        stroke.shape = shape;
        self.notify(DocumentChange::StrokeShapeChanged { id });
        true
    }

    // --- Text boxes ---

    /// Insert a text box at `index`, or append when `index` is `None` or past the end.
    /// Returns the index actually used.
    pub fn insert_text_box(&mut self, index: Option<usize>, text_box: TextBox) -> usize {
        let index = match index {
            Some(i) if i <= self.text_boxes.len() => i,
            _ => self.text_boxes.len(),
        };
        let id = text_box.id;
        self.text_boxes.insert(index, text_box);
        self.notify(DocumentChange::TextBoxInserted { index, id });
        index
    }

    /// Remove and return the text box at `index`. Out of range yields `None`.
    pub fn take_text_box_at(&mut self, index: usize) -> Option<TextBox> {
        if index >= self.text_boxes.len() {
            return None;
        }
        let text_box = self.text_boxes.remove(index);
        self.notify(DocumentChange::TextBoxRemoved { index, id: text_box.id });
        Some(text_box)
    }

    pub fn set_text_box_rect_by_id(&mut self, id: TextBoxId, rect: Rect) -> bool {
        let Some(text_box) = self.text_boxes.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        text_box.rect = rect.abs();
        self.notify(DocumentChange::TextBoxRectChanged { id });
        true
    }

    pub fn set_text_box_markdown_by_id(&mut self, id: TextBoxId, markdown: &str) -> bool {
        let Some(text_box) = self.text_boxes.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        text_box.markdown = markdown.to_string();
        self.notify(DocumentChange::TextBoxMarkdownChanged { id });
        true
    }

    // --- Identity ---

    /// Allocate the next stroke id.
    pub fn next_stroke_id(&mut self) -> StrokeId {
        let id = self.next_stroke_id;
        self.next_stroke_id = self.next_stroke_id.saturating_add(1);
        id
    }

    /// Allocate the next text box id.
    pub fn next_text_box_id(&mut self) -> TextBoxId {
        let id = self.next_text_box_id;
        self.next_text_box_id = self.next_text_box_id.saturating_add(1);
        id
    }

    /// Advance the counters so the next ids are at least the given values.
    /// Counters never move backwards.
    pub fn set_next_ids(&mut self, min_stroke: StrokeId, min_text_box: TextBoxId) {
        self.next_stroke_id = self.next_stroke_id.max(min_stroke).max(1);
        self.next_text_box_id = self.next_text_box_id.max(min_text_box).max(1);
    }

    /// Empty both collections and reset the id counters. Subscriptions are kept.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.text_boxes.clear();
        self.next_stroke_id = 1;
        self.next_text_box_id = 1;
        self.notify(DocumentChange::Cleared);
    }
}
