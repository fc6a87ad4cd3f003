//! Vellum Core Library
//!
//! The editable-document engine behind Vellum's freehand notes: the entity
//! store, reversible commands, the camera, stroke capture, hit testing,
//! shape recognition and persistence. Nothing here draws; renderers read the
//! [`Document`] and subscribe to its change notifications.

pub mod camera;
pub mod canvas;
pub mod capture;
pub mod commands;
pub mod config;
pub mod document;
pub mod hit_test;
pub mod model;
pub mod pages;
pub mod recognize;
pub mod storage;
pub mod text_edit;
pub mod tools;

pub use camera::Camera;
pub use canvas::{Canvas, PointerInput};
pub use capture::{FinishedDraft, StrokeCapture};
pub use commands::{Command, CommandStack, DEFAULT_HISTORY_LIMIT};
pub use config::{ConfigError, EditorConfig};
pub use document::{Document, DocumentChange, SubscriptionId, ViewMode};
pub use hit_test::{distance_point_to_segment, erase_at, hit_test_text_box};
pub use model::{
    InkColor, ShapeGeometry, ShapeKind, ShapeParamsError, Stroke, StrokeId, StrokePoint, StrokeShape, TextBox,
    TextBoxId,
};
pub use recognize::{RecognizerConfig, ShapeMatch, ShapeRecognizer};
pub use storage::{DocumentFile, FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use text_edit::TextEditSession;
pub use tools::{InteractionMode, PointerButton, ToolKind};
