//! Persistence: the on-disk document format and storage backends.
//!
//! A document is saved as a versioned JSON [`DocumentFile`]. Loading parses
//! the whole file before touching the target [`Document`], so a failed load
//! leaves it unchanged.

mod file;
mod memory;

pub use file::{FileStorage, load_from_path, save_to_path};
pub use memory::MemoryStorage;

use crate::document::{Document, ViewMode};
use crate::model::{InkColor, Stroke, StrokeId, StrokePoint, StrokeShape, TextBox, TextBoxId};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current document format version.
pub const FORMAT_VERSION: u32 = 1;

/// File extension of saved documents.
pub const FILE_EXTENSION: &str = "vellum";

/// Largest entity id a document may contain: the largest integer a JSON
/// number carries exactly.
pub const MAX_ENTITY_ID: u64 = (1 << 53) - 1;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Unsupported document version {0} (newest supported is {FORMAT_VERSION})")]
    UnsupportedVersion(u32),
    #[error("Entity id {0} is out of range (largest allowed is {MAX_ENTITY_ID})")]
    IdOutOfRange(u64),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A place documents can be saved to and loaded from by key.
///
/// Saving must be all-or-nothing: on failure the previously stored document
/// under the same key is left intact.
pub trait Storage: Send + Sync {
    /// Save a document.
    fn save(&self, id: &str, document: &DocumentFile) -> StorageResult<()>;

    /// Load a document.
    fn load(&self, id: &str) -> StorageResult<DocumentFile>;

    /// Delete a document. Deleting a missing document is not an error.
    fn delete(&self, id: &str) -> StorageResult<()>;

    /// List all document ids.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a document exists.
    fn exists(&self, id: &str) -> StorageResult<bool>;
}

/// One persisted sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_pressure")]
    pub pressure: f64,
    #[serde(default)]
    pub t: u64,
}

fn default_pressure() -> f64 {
    1.0
}

/// One persisted stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeRecord {
    pub id: StrokeId,
    /// Packed `0xAARRGGBB`.
    pub color: u32,
    pub base_width: f64,
    #[serde(default)]
    pub is_shape: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub shape_type: String,
    /// Base64 of the little-endian shape parameter blob.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub shape_params: String,
    pub points: Vec<PointRecord>,
}

impl StrokeRecord {
    pub fn from_stroke(stroke: &Stroke) -> Self {
        let (shape_type, params) = stroke.shape.encode();
        Self {
            id: stroke.id,
            color: stroke.color.to_argb(),
            base_width: stroke.base_width,
            is_shape: stroke.shape.is_shape(),
            shape_type,
            shape_params: if params.is_empty() { String::new() } else { STANDARD.encode(params) },
            points: stroke
                .points
                .iter()
                .map(|p| PointRecord {
                    x: p.position.x,
                    y: p.position.y,
                    pressure: p.pressure,
                    t: p.timestamp_ms,
                })
                .collect(),
        }
    }

    /// Convert back to a stroke. Malformed shape data degrades to an
    /// unrecognized annotation, which renders as the raw polyline.
    pub fn into_stroke(self) -> Stroke {
        let params = STANDARD.decode(self.shape_params.as_bytes()).unwrap_or_else(|e| {
            log::warn!("Stroke {}: bad shape params encoding: {}", self.id, e);
            Vec::new()
        });
        let points = self
            .points
            .iter()
            .map(|p| StrokePoint::new(Point::new(p.x, p.y), p.pressure, p.t))
            .collect();
        let mut stroke = Stroke::new(self.id, points, InkColor::from_argb(self.color), self.base_width);
        stroke.shape = StrokeShape::decode(self.is_shape, &self.shape_type, &params);
        stroke
    }
}

/// One persisted text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBoxRecord {
    pub id: TextBoxId,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(default)]
    pub markdown: String,
}

impl TextBoxRecord {
    pub fn from_text_box(text_box: &TextBox) -> Self {
        let rect = text_box.rect.abs();
        Self {
            id: text_box.id,
            x: rect.x0,
            y: rect.y0,
            w: rect.width(),
            h: rect.height(),
            markdown: text_box.markdown.clone(),
        }
    }

    pub fn into_text_box(self) -> TextBox {
        TextBox::new(
            self.id,
            Rect::new(self.x, self.y, self.x + self.w, self.y + self.h),
            self.markdown,
        )
    }
}

/// Serialized form of a whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFile {
    pub version: u32,
    #[serde(default)]
    pub view_mode: ViewMode,
    /// Milliseconds since the Unix epoch at save time.
    #[serde(default)]
    pub modified_at_ms: u64,
    #[serde(default)]
    pub strokes: Vec<StrokeRecord>,
    #[serde(default)]
    pub text_boxes: Vec<TextBoxRecord>,
}

impl Default for DocumentFile {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            view_mode: ViewMode::default(),
            modified_at_ms: 0,
            strokes: Vec::new(),
            text_boxes: Vec::new(),
        }
    }
}

impl DocumentFile {
    /// Read-only snapshot of `doc`, stamped with the current time.
    pub fn from_document(doc: &Document) -> Self {
        let modified_at_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            version: FORMAT_VERSION,
            view_mode: doc.view_mode(),
            modified_at_ms,
            strokes: doc.strokes().iter().map(StrokeRecord::from_stroke).collect(),
            text_boxes: doc.text_boxes().iter().map(TextBoxRecord::from_text_box).collect(),
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> StorageResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Parse JSON, rejecting versions newer than this build understands.
    pub fn from_json(json: &str) -> StorageResult<Self> {
        let file: Self = serde_json::from_str(json).map_err(|e| StorageError::Serialization(e.to_string()))?;
        file.validate()?;
        Ok(file)
    }

    /// Check the version and that every id leaves room for the counters.
    pub fn validate(&self) -> StorageResult<()> {
        if self.version > FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion(self.version));
        }
        let (max_stroke, max_text_box) = self.max_ids();
        match max_stroke.max(max_text_box) {
            id if id > MAX_ENTITY_ID => Err(StorageError::IdOutOfRange(id)),
            _ => Ok(()),
        }
    }

    /// Largest stroke and text box ids in the file (0 when absent).
    pub fn max_ids(&self) -> (StrokeId, TextBoxId) {
        (
            self.strokes.iter().map(|s| s.id).max().unwrap_or(0),
            self.text_boxes.iter().map(|t| t.id).max().unwrap_or(0),
        )
    }

    /// Replace the contents of `doc` with this file.
    ///
    /// Entities are appended in ascending id order, then the id counters are
    /// moved past the largest loaded ids. Strokes with fewer than two points
    /// are skipped.
    pub fn populate(self, doc: &mut Document) {
        let (max_stroke, max_text_box) = self.max_ids();
        let mut strokes = self.strokes;
        let mut text_boxes = self.text_boxes;
        strokes.sort_by_key(|s| s.id);
        text_boxes.sort_by_key(|t| t.id);

        doc.clear();
        doc.set_view_mode(self.view_mode);
        for record in strokes {
            if record.points.len() < Stroke::MIN_POINTS {
                log::warn!("Skipping stroke {} with {} point(s)", record.id, record.points.len());
                continue;
            }
            doc.insert_stroke(None, record.into_stroke());
        }
        for record in text_boxes {
            doc.insert_text_box(None, record.into_text_box());
        }
        doc.set_next_ids(max_stroke.saturating_add(1), max_text_box.saturating_add(1));
    }
}

impl Document {
    /// Persistable snapshot of the current contents.
    pub fn snapshot(&self) -> DocumentFile {
        DocumentFile::from_document(self)
    }
}
