//! Renderer trait abstraction.

use kurbo::{Rect, Size};
use peniko::Color;
use thiserror::Error;
use vellum_core::{Camera, Canvas, Document, Stroke, TextBoxId};

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Formatting failed: {0}")]
    Format(#[from] std::fmt::Error),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Colors used for everything that is not ink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Clear color behind everything.
    pub background: Color,
    /// Fill of an A4 page.
    pub page: Color,
    pub page_border: Color,
    pub page_shadow: Color,
    pub text: Color,
    pub text_box_border: Color,
    /// Border of the text box being edited.
    pub selection: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::from_rgba8(245, 245, 245, 255),
            page: Color::from_rgba8(255, 255, 255, 255),
            page_border: Color::from_rgba8(210, 210, 210, 255),
            page_shadow: Color::from_rgba8(0, 0, 0, 18),
            text: Color::from_rgba8(20, 20, 20, 255),
            text_box_border: Color::from_rgba8(200, 200, 200, 255),
            selection: Color::from_rgba8(59, 130, 246, 255),
        }
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The document to render.
    pub document: &'a Document,
    /// World to view mapping.
    pub camera: &'a Camera,
    /// Viewport size in view pixels.
    pub viewport_size: Size,
    pub palette: Palette,
    /// In-progress stroke drawn on top of committed ink.
    pub draft: Option<Stroke>,
    /// Text box currently being edited (highlighted).
    pub editing_text_box: Option<TextBoxId>,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(document: &'a Document, camera: &'a Camera, viewport_size: Size) -> Self {
        Self {
            document,
            camera,
            viewport_size,
            palette: Palette::default(),
            draft: None,
            editing_text_box: None,
        }
    }

    /// Context for the current state of an editing session, draft included.
    pub fn from_canvas(canvas: &'a Canvas) -> Self {
        Self {
            draft: canvas.capture().preview(),
            editing_text_box: canvas.editing_text_box(),
            ..Self::new(canvas.document(), &canvas.camera, canvas.viewport_size)
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// World rectangle covered by the viewport.
    pub fn visible_world_rect(&self) -> Rect {
        self.camera.visible_world_rect(self.viewport_size)
    }
}

/// Trait for rendering backends.
///
/// Backends read the document through the context and never mutate it.
pub trait Renderer {
    /// Build the drawing commands for a frame.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.palette.background
    }
}
