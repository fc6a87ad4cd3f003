//! Debounced editing of a text box's content.
//!
//! Keystrokes are written straight into the live text box so they show up
//! immediately, but only one [`Command`] is produced per burst of typing:
//! once the text has been quiet for the debounce window, or when the edit is
//! flushed explicitly.

use crate::commands::Command;
use crate::document::Document;
use crate::model::TextBoxId;
use std::time::{Duration, Instant};

/// Default quiet period before an edit becomes an undo step.
pub const DEFAULT_TEXT_DEBOUNCE: Duration = Duration::from_millis(350);

/// An open editing session on one text box.
#[derive(Debug, Clone)]
pub struct TextEditSession {
    id: TextBoxId,
    /// Content as of the last produced command (or session start).
    committed: String,
    /// When the pending edit becomes due, if any.
    deadline: Option<Instant>,
    debounce: Duration,
}

impl TextEditSession {
    /// Start editing `id`. Returns `None` if the box does not exist.
    pub fn begin(doc: &Document, id: TextBoxId, debounce: Duration) -> Option<Self> {
        let committed = doc.text_box_by_id(id)?.markdown.clone();
        Some(Self {
            id,
            committed,
            deadline: None,
            debounce,
        })
    }

    pub fn id(&self) -> TextBoxId {
        self.id
    }

    /// Whether there are live changes not yet captured in a command.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Write `text` into the live box and restart the quiet period.
    /// Returns false if the box no longer exists.
    pub fn edit(&mut self, doc: &mut Document, text: &str, now: Instant) -> bool {
        if !doc.set_text_box_markdown_by_id(self.id, text) {
            return false;
        }
        self.deadline = Some(now + self.debounce);
        true
    }

    /// The command for the pending edit, if the quiet period has elapsed.
    pub fn poll(&mut self, doc: &Document, now: Instant) -> Option<Command> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.flush(doc),
            _ => None,
        }
    }

    /// The command for the pending edit regardless of timing.
    ///
    /// The returned command's "after" is already live in `doc`, so pushing it
    /// re-applies the same text. Returns `None` if nothing changed since the
    /// last command or the box is gone.
    pub fn flush(&mut self, doc: &Document) -> Option<Command> {
        self.deadline = None;
        let current = &doc.text_box_by_id(self.id)?.markdown;
        if *current == self.committed {
            return None;
        }
        let before = std::mem::replace(&mut self.committed, current.clone());
        Some(Command::SetTextBoxMarkdown {
            id: self.id,
            before,
            after: current.clone(),
        })
    }
}
