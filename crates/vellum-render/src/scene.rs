//! Backend-independent display list.
//!
//! Everything is resolved to target coordinates here (view pixels for the
//! screen, page points for export), so a backend only has to draw primitives.

use crate::renderer::{Palette, RenderContext, Renderer};
use kurbo::{Affine, BezPath, Point, Rect};
use peniko::Color;
use vellum_core::pages::{page_rect, pages_in_view};
use vellum_core::{Document, Stroke, TextBox, ViewMode};

/// Thinnest line ever drawn, in target units.
pub const MIN_LINE_WIDTH: f64 = 0.5;
/// Text size in world units.
pub const TEXT_SIZE: f64 = 14.0;
/// Inner padding of a text box in world units.
pub const TEXT_PADDING: f64 = 6.0;
const LINE_SPACING: f64 = 1.3;

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem {
    Rect {
        rect: Rect,
        fill: Option<Color>,
        /// Outline color and width.
        stroke: Option<(Color, f64)>,
    },
    /// One segment of a freehand stroke.
    Segment {
        from: Point,
        to: Point,
        color: Color,
        width: f64,
    },
    /// Outline of a snapped shape.
    Path { path: BezPath, color: Color, width: f64 },
    Text {
        /// Left end of the baseline.
        origin: Point,
        text: String,
        color: Color,
        size: f64,
        bold: bool,
    },
}

/// One line of text box content after light markdown handling.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    /// Multiplier on the base text size.
    pub scale: f64,
    pub bold: bool,
}

/// Split markdown into display lines. Headings grow and go bold, list
/// markers become bullets and emphasis markers are dropped.
pub fn markdown_lines(markdown: &str) -> Vec<TextLine> {
    markdown
        .lines()
        .map(|raw| {
            let trimmed = raw.trim_start();
            let level = trimmed.chars().take_while(|&c| c == '#').count();
            let (body, scale, bold) = match level {
                1..=3 if trimmed[level..].starts_with(' ') => {
                    let scale = [1.6, 1.3, 1.15][level - 1];
                    (trimmed[level..].trim_start().to_string(), scale, true)
                }
                _ => {
                    if let Some(rest) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
                        (format!("\u{2022} {}", rest), 1.0, false)
                    } else {
                        (raw.to_string(), 1.0, false)
                    }
                }
            };
            TextLine {
                text: body.replace("**", "").replace('`', ""),
                scale,
                bold,
            }
        })
        .collect()
}

/// An ordered list of primitives, painted first to last.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    items: Vec<DrawItem>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn push(&mut self, item: DrawItem) {
        self.items.push(item);
    }

    /// Add a stroke. `transform` maps world to target coordinates and
    /// `scale` is its uniform scale factor.
    ///
    /// Snapped strokes draw their idealized outline at the average pressure
    /// width; everything else draws as a polyline whose segments take the
    /// mean pressure of their endpoints.
    pub fn add_stroke(&mut self, stroke: &Stroke, transform: Affine, scale: f64) {
        if stroke.len() < Stroke::MIN_POINTS {
            return;
        }
        let color = Color::from(stroke.color);

        if let Some(geometry) = stroke.shape.geometry() {
            let width = (stroke.base_width * stroke.average_pressure() * scale).max(MIN_LINE_WIDTH);
            self.items.push(DrawItem::Path {
                path: transform * geometry.to_path(),
                color,
                width,
            });
            return;
        }

        for pair in stroke.points.windows(2) {
            let pressure = (pair[0].pressure + pair[1].pressure) * 0.5;
            self.items.push(DrawItem::Segment {
                from: transform * pair[0].position,
                to: transform * pair[1].position,
                color,
                width: (stroke.base_width * pressure * scale).max(MIN_LINE_WIDTH),
            });
        }
    }

    /// Add a text box: its frame, then its content clipped to the box height.
    pub fn add_text_box(&mut self, text_box: &TextBox, transform: Affine, scale: f64, palette: &Palette, active: bool) {
        let rect = transform_rect(transform, text_box.rect);
        let border = if active {
            (palette.selection, 1.5)
        } else {
            (palette.text_box_border, 1.0)
        };
        self.items.push(DrawItem::Rect {
            rect,
            fill: None,
            stroke: Some(border),
        });

        let padding = TEXT_PADDING * scale;
        let mut baseline = rect.y0 + padding;
        for line in markdown_lines(&text_box.markdown) {
            let size = TEXT_SIZE * line.scale * scale;
            baseline += size * LINE_SPACING;
            if baseline > rect.y1 - padding * 0.5 {
                break;
            }
            if line.text.is_empty() {
                continue;
            }
            self.items.push(DrawItem::Text {
                origin: Point::new(rect.x0 + padding, baseline),
                text: line.text,
                color: palette.text,
                size,
                bold: line.bold,
            });
        }
    }

    /// Add an A4 page sheet with a soft drop shadow.
    pub fn add_page(&mut self, index: usize, transform: Affine, palette: &Palette) {
        let rect = transform_rect(transform, page_rect(index));
        self.items.push(DrawItem::Rect {
            rect: rect + kurbo::Vec2::new(2.0, 2.0),
            fill: Some(palette.page_shadow),
            stroke: None,
        });
        self.items.push(DrawItem::Rect {
            rect,
            fill: Some(palette.page),
            stroke: Some((palette.page_border, 1.0)),
        });
    }

    /// Add all strokes and text boxes whose bounds meet `visible` (all of them
    /// when `visible` is `None`), in paint order.
    pub fn add_content(
        &mut self,
        doc: &Document,
        transform: Affine,
        scale: f64,
        visible: Option<Rect>,
        palette: &Palette,
        active_text_box: Option<u64>,
    ) {
        let shows = |bounds: Rect| visible.map_or(true, |v| overlaps(v, bounds));
        for stroke in doc.strokes() {
            let bounds = match stroke.shape.geometry() {
                Some(g) => g.bounds(),
                None => stroke.bounds().unwrap_or(Rect::ZERO),
            };
            if shows(bounds.inflate(stroke.base_width, stroke.base_width)) {
                self.add_stroke(stroke, transform, scale);
            }
        }
        for text_box in doc.text_boxes() {
            if shows(text_box.rect) {
                self.add_text_box(text_box, transform, scale, palette, active_text_box == Some(text_box.id));
            }
        }
    }
}

/// Builds a [`DisplayList`] in view coordinates for the screen.
#[derive(Debug, Default)]
pub struct SceneRenderer {
    list: DisplayList,
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The display list of the last frame.
    pub fn display_list(&self) -> &DisplayList {
        &self.list
    }
}

impl Renderer for SceneRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.list.clear();
        let transform = ctx.camera.transform();
        let zoom = ctx.camera.zoom();
        let visible = ctx.visible_world_rect();

        self.list.push(DrawItem::Rect {
            rect: Rect::from_origin_size(Point::ZERO, ctx.viewport_size),
            fill: Some(self.background_color(ctx)),
            stroke: None,
        });
        if ctx.document.view_mode() == ViewMode::A4Notebook {
            for index in pages_in_view(visible) {
                self.list.add_page(index, transform, &ctx.palette);
            }
        }
        self.list
            .add_content(ctx.document, transform, zoom, Some(visible), &ctx.palette, ctx.editing_text_box);
        if let Some(draft) = &ctx.draft {
            self.list.add_stroke(draft, transform, zoom);
        }
        log::trace!("Built scene with {} items", self.list.len());
    }
}

/// Map a rect through an affine transform and normalize it.
pub fn transform_rect(transform: Affine, rect: Rect) -> Rect {
    transform.transform_rect_bbox(rect)
}

/// Whether two rects share any area or edge.
fn overlaps(a: Rect, b: Rect) -> bool {
    let (a, b) = (a.abs(), b.abs());
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}
