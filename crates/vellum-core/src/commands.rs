//! Undo/redo over document mutations.
//!
//! Every undoable edit is a [`Command`] that knows how to apply itself to a
//! [`Document`] and how to invert that effect. Structural commands address
//! entities by index; property commands address them by id and carry the full
//! before/after values.
//!
//! Commands must be undone and redone in strict stack order. Structural
//! edits made to the document outside the stack while it holds commands
//! leave recorded indices stale; the result is unspecified (the store never
//! panics, but undo may act on the wrong entity).

use crate::document::Document;
use crate::model::{Stroke, StrokeId, StrokeShape, TextBox, TextBoxId};
use kurbo::Rect;

/// Default number of commands kept in history.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// A reversible unit of document mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Insert a stroke. The stroke lives here while the command is not applied.
    AddStroke {
        stroke: Option<Stroke>,
        /// Requested index before the first apply; actual index afterwards.
        index: Option<usize>,
    },
    /// Remove the stroke at `index`. The removed stroke lives here while applied.
    RemoveStroke {
        index: usize,
        removed: Option<Stroke>,
    },
    AddTextBox {
        text_box: Option<TextBox>,
        index: Option<usize>,
    },
    RemoveTextBox {
        index: usize,
        removed: Option<TextBox>,
    },
    SetTextBoxRect {
        id: TextBoxId,
        before: Rect,
        after: Rect,
    },
    SetTextBoxMarkdown {
        id: TextBoxId,
        before: String,
        after: String,
    },
    SetStrokeShape {
        id: StrokeId,
        before: StrokeShape,
        after: StrokeShape,
    },
}

impl Command {
    /// Append a stroke.
    pub fn add_stroke(stroke: Stroke) -> Self {
        Command::AddStroke {
            stroke: Some(stroke),
            index: None,
        }
    }

    /// Remove the stroke at `index`.
    pub fn remove_stroke(index: usize) -> Self {
        Command::RemoveStroke { index, removed: None }
    }

    /// Append a text box.
    pub fn add_text_box(text_box: TextBox) -> Self {
        Command::AddTextBox {
            text_box: Some(text_box),
            index: None,
        }
    }

    /// Remove the text box at `index`.
    pub fn remove_text_box(index: usize) -> Self {
        Command::RemoveTextBox { index, removed: None }
    }

    /// Move/resize a text box; the current rect is captured as "before".
    pub fn set_text_box_rect(doc: &Document, id: TextBoxId, after: Rect) -> Option<Self> {
        let before = doc.text_box_by_id(id)?.rect;
        Some(Command::SetTextBoxRect { id, before, after })
    }

    /// Replace a text box's content; the current content is captured as "before".
    pub fn set_text_box_markdown(doc: &Document, id: TextBoxId, after: impl Into<String>) -> Option<Self> {
        let before = doc.text_box_by_id(id)?.markdown.clone();
        Some(Command::SetTextBoxMarkdown {
            id,
            before,
            after: after.into(),
        })
    }

    /// Change a stroke's shape annotation; the current one is captured as "before".
    pub fn set_stroke_shape(doc: &Document, id: StrokeId, after: StrokeShape) -> Option<Self> {
        let before = doc.stroke_by_id(id)?.shape.clone();
        Some(Command::SetStrokeShape { id, before, after })
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Command::AddStroke { .. } => "Add stroke",
            Command::RemoveStroke { .. } => "Remove stroke",
            Command::AddTextBox { .. } => "Add text box",
            Command::RemoveTextBox { .. } => "Remove text box",
            Command::SetTextBoxRect { .. } => "Move/resize text box",
            Command::SetTextBoxMarkdown { .. } => "Edit text",
            Command::SetStrokeShape { .. } => "Snap shape",
        }
    }

    /// Perform (or re-perform) the command.
    pub fn apply(&mut self, doc: &mut Document) {
        match self {
            Command::AddStroke { stroke, index } => {
                if let Some(s) = stroke.take() {
                    *index = Some(doc.insert_stroke(*index, s));
                }
            }
            Command::RemoveStroke { index, removed } => {
                *removed = doc.take_stroke_at(*index);
            }
            Command::AddTextBox { text_box, index } => {
                if let Some(t) = text_box.take() {
                    *index = Some(doc.insert_text_box(*index, t));
                }
            }
            Command::RemoveTextBox { index, removed } => {
                *removed = doc.take_text_box_at(*index);
            }
            Command::SetTextBoxRect { id, after, .. } => {
                doc.set_text_box_rect_by_id(*id, *after);
            }
            Command::SetTextBoxMarkdown { id, after, .. } => {
                doc.set_text_box_markdown_by_id(*id, after);
            }
            Command::SetStrokeShape { id, after, .. } => {
                doc.set_stroke_shape_by_id(*id, after.clone());
            }
        }
    }

    /// Whether the last [`Command::apply`] found nothing to remove.
    fn removed_nothing(&self) -> bool {
        matches!(
            self,
            Command::RemoveStroke { removed: None, .. } | Command::RemoveTextBox { removed: None, .. }
        )
    }

    /// Reverse the effect of the last [`Command::apply`].
    pub fn invert(&mut self, doc: &mut Document) {
        match self {
            Command::AddStroke { stroke, index } => {
                if let Some(i) = *index {
                    *stroke = doc.take_stroke_at(i);
                }
            }
            Command::RemoveStroke { index, removed } => {
                if let Some(s) = removed.take() {
                    doc.insert_stroke(Some(*index), s);
                }
            }
            Command::AddTextBox { text_box, index } => {
                if let Some(i) = *index {
                    *text_box = doc.take_text_box_at(i);
                }
            }
            Command::RemoveTextBox { index, removed } => {
                if let Some(t) = removed.take() {
                    doc.insert_text_box(Some(*index), t);
                }
            }
            Command::SetTextBoxRect { id, before, .. } => {
                doc.set_text_box_rect_by_id(*id, *before);
            }
            Command::SetTextBoxMarkdown { id, before, .. } => {
                doc.set_text_box_markdown_by_id(*id, before);
            }
            Command::SetStrokeShape { id, before, .. } => {
                doc.set_stroke_shape_by_id(*id, before.clone());
            }
        }
    }
}

/// Bounded linear history with a cursor.
///
/// Entries before the cursor are applied (undoable); entries at or after it
/// have been undone (redoable). Pushing discards the redo tail.
#[derive(Debug, Clone)]
pub struct CommandStack {
    commands: Vec<Command>,
    /// Number of applied commands.
    cursor: usize,
    limit: usize,
    /// Cursor position that matches the last saved state, if still reachable.
    clean_index: Option<usize>,
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl CommandStack {
    /// Create an empty stack keeping at most `limit` commands (at least one).
    pub fn new(limit: usize) -> Self {
        Self {
            commands: Vec::new(),
            cursor: 0,
            limit: limit.max(1),
            clean_index: Some(0),
        }
    }

    /// Apply `command` to `doc` and record it. A removal that found nothing
    /// at its index is not recorded; returns false in that case.
    pub fn push(&mut self, doc: &mut Document, mut command: Command) -> bool {
        command.apply(doc);
        if command.removed_nothing() {
            log::debug!("Undo: skipped '{}', nothing to remove", command.description());
            return false;
        }
        log::debug!("Undo: pushed '{}'", command.description());

        self.commands.truncate(self.cursor);
        if self.clean_index.is_some_and(|c| c > self.cursor) {
            self.clean_index = None;
        }
        self.commands.push(command);
        self.cursor += 1;

        while self.commands.len() > self.limit {
            self.commands.remove(0);
            self.cursor -= 1;
            self.clean_index = match self.clean_index {
                Some(0) | None => None,
                Some(c) => Some(c - 1),
            };
        }
        true
    }

    /// Undo the most recent applied command. Returns false if there is none.
    pub fn undo(&mut self, doc: &mut Document) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let command = &mut self.commands[self.cursor];
        log::debug!("Undo: '{}'", command.description());
        command.invert(doc);
        true
    }

    /// Redo the next undone command. Returns false if there is none.
    pub fn redo(&mut self, doc: &mut Document) -> bool {
        let Some(command) = self.commands.get_mut(self.cursor) else {
            return false;
        };
        log::debug!("Redo: '{}'", command.description());
        command.apply(doc);
        self.cursor += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.commands.len()
    }

    pub fn undo_description(&self) -> Option<&'static str> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.commands.get(i))
            .map(Command::description)
    }

    pub fn redo_description(&self) -> Option<&'static str> {
        self.commands.get(self.cursor).map(Command::description)
    }

    pub fn undo_count(&self) -> usize {
        self.cursor
    }

    /// Mark the current position as matching persisted state.
    pub fn set_clean(&mut self) {
        self.clean_index = Some(self.cursor);
    }

    /// Whether the document matches the state recorded by [`Self::set_clean`].
    pub fn is_clean(&self) -> bool {
        self.clean_index == Some(self.cursor)
    }

    /// Drop all history. The empty state counts as clean.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.cursor = 0;
        self.clean_index = Some(0);
        log::debug!("Undo history cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InkColor, ShapeGeometry, StrokePoint};
    use kurbo::Point;

    fn stroke(doc: &mut Document) -> Stroke {
        let id = doc.next_stroke_id();
        Stroke::new(
            id,
            vec![
                StrokePoint::new(Point::new(0.0, 0.0), 0.5, 0),
                StrokePoint::new(Point::new(20.0, 0.0), 0.8, 16),
            ],
            InkColor::new(200, 10, 10, 255),
            3.0,
        )
    }

    #[test]
    fn test_undo_redo_add_stroke() {
        let mut doc = Document::new();
        let mut stack = CommandStack::default();

        let first = stroke(&mut doc);
        stack.push(&mut doc, Command::add_stroke(first));
        let original = stroke(&mut doc);
        stack.push(&mut doc, Command::add_stroke(original.clone()));
        assert_eq!(doc.strokes().len(), 2);

        assert!(stack.undo(&mut doc));
        assert_eq!(doc.strokes().len(), 1);
        assert_eq!(doc.strokes()[0].id, 1);

        assert!(stack.redo(&mut doc));
        assert_eq!(doc.strokes().len(), 2);
        assert_eq!(doc.strokes()[1], original);
    }

    #[test]
    fn test_remove_restores_same_index() {
        let mut doc = Document::new();
        let mut stack = CommandStack::default();
        for _ in 0..3 {
            let s = stroke(&mut doc);
            stack.push(&mut doc, Command::add_stroke(s));
        }

        stack.push(&mut doc, Command::remove_stroke(1));
        let ids: Vec<_> = doc.strokes().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3]);

        stack.undo(&mut doc);
        let ids: Vec<_> = doc.strokes().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        stack.redo(&mut doc);
        assert_eq!(doc.strokes().len(), 2);
    }

    #[test]
    fn test_remove_out_of_range_is_not_recorded() {
        let mut doc = Document::new();
        let mut stack = CommandStack::default();
        assert!(!stack.push(&mut doc, Command::remove_stroke(5)));
        assert!(!stack.push(&mut doc, Command::remove_text_box(0)));
        assert!(!stack.can_undo());
        assert!(doc.strokes().is_empty());

        // a real step before it stays on top of the history
        let s = stroke(&mut doc);
        assert!(stack.push(&mut doc, Command::add_stroke(s)));
        stack.set_clean();
        assert!(!stack.push(&mut doc, Command::remove_stroke(7)));
        assert_eq!(stack.undo_count(), 1);
        assert!(stack.is_clean());
        assert!(stack.undo(&mut doc));
        assert!(doc.strokes().is_empty());
    }

    #[test]
    fn test_property_commands() {
        let mut doc = Document::new();
        let mut stack = CommandStack::default();
        let id = doc.next_text_box_id();
        stack.push(
            &mut doc,
            Command::add_text_box(TextBox::new(id, Rect::new(0.0, 0.0, 260.0, 120.0), "a")),
        );

        let cmd = Command::set_text_box_rect(&doc, id, Rect::new(10.0, 10.0, 270.0, 130.0)).unwrap();
        stack.push(&mut doc, cmd);
        let cmd = Command::set_text_box_markdown(&doc, id, "b").unwrap();
        stack.push(&mut doc, cmd);

        assert_eq!(doc.text_boxes()[0].markdown, "b");
        assert_eq!(doc.text_boxes()[0].rect.x0, 10.0);

        stack.undo(&mut doc);
        assert_eq!(doc.text_boxes()[0].markdown, "a");
        stack.undo(&mut doc);
        assert_eq!(doc.text_boxes()[0].rect.x0, 0.0);
        stack.undo(&mut doc);
        assert!(doc.text_boxes().is_empty());
        assert!(!stack.undo(&mut doc));
    }

    #[test]
    fn test_property_command_unknown_id() {
        let doc = Document::new();
        assert!(Command::set_text_box_rect(&doc, 9, Rect::ZERO).is_none());
        assert!(Command::set_stroke_shape(&doc, 9, StrokeShape::Freehand).is_none());
    }

    #[test]
    fn test_snap_shape_undo() {
        let mut doc = Document::new();
        let mut stack = CommandStack::default();
        let s = stroke(&mut doc);
        let id = s.id;
        stack.push(&mut doc, Command::add_stroke(s));

        let geometry = ShapeGeometry::Line {
            p0: Point::new(0.0, 0.0),
            p1: Point::new(20.0, 0.0),
        };
        let cmd = Command::set_stroke_shape(&doc, id, StrokeShape::Snapped(geometry)).unwrap();
        stack.push(&mut doc, cmd);
        assert!(doc.strokes()[0].shape.is_shape());

        stack.undo(&mut doc);
        assert_eq!(doc.strokes()[0].shape, StrokeShape::Freehand);
        stack.redo(&mut doc);
        assert_eq!(doc.strokes()[0].shape.geometry(), Some(&geometry));
    }

    #[test]
    fn test_push_clears_redo() {
        let mut doc = Document::new();
        let mut stack = CommandStack::default();
        let a = stroke(&mut doc);
        stack.push(&mut doc, Command::add_stroke(a));
        stack.undo(&mut doc);
        assert!(stack.can_redo());

        let b = stroke(&mut doc);
        stack.push(&mut doc, Command::add_stroke(b));
        assert!(!stack.can_redo());
        assert!(!stack.redo(&mut doc));
        assert_eq!(doc.strokes().len(), 1);
        assert_eq!(doc.strokes()[0].id, 2);
    }

    #[test]
    fn test_bounded_history() {
        let mut doc = Document::new();
        let mut stack = CommandStack::new(200);
        for _ in 0..201 {
            let s = stroke(&mut doc);
            stack.push(&mut doc, Command::add_stroke(s));
        }
        assert_eq!(stack.undo_count(), 200);

        let mut undone = 0;
        while stack.undo(&mut doc) {
            undone += 1;
        }
        assert_eq!(undone, 200);
        // The very first stroke can no longer be undone.
        assert_eq!(doc.strokes().len(), 1);
        assert_eq!(doc.strokes()[0].id, 1);
    }

    #[test]
    fn test_clean_tracking() {
        let mut doc = Document::new();
        let mut stack = CommandStack::default();
        assert!(stack.is_clean());

        let s = stroke(&mut doc);
        stack.push(&mut doc, Command::add_stroke(s));
        assert!(!stack.is_clean());
        stack.set_clean();
        assert!(stack.is_clean());

        stack.undo(&mut doc);
        assert!(!stack.is_clean());
        stack.redo(&mut doc);
        assert!(stack.is_clean());

        // Diverging from the clean point makes it unreachable.
        stack.undo(&mut doc);
        let s = stroke(&mut doc);
        stack.push(&mut doc, Command::add_stroke(s));
        stack.undo(&mut doc);
        assert!(!stack.is_clean());
    }

    #[test]
    fn test_descriptions() {
        let mut doc = Document::new();
        let mut stack = CommandStack::default();
        assert_eq!(stack.undo_description(), None);
        let s = stroke(&mut doc);
        stack.push(&mut doc, Command::add_stroke(s));
        assert_eq!(stack.undo_description(), Some("Add stroke"));
        stack.undo(&mut doc);
        assert_eq!(stack.redo_description(), Some("Add stroke"));
    }
}
