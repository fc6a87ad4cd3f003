//! SVG export.
//!
//! Notebook documents export one SVG per A4 page. Infinite documents export a
//! single A4-sized SVG with the requested region fitted into it.

use crate::renderer::{Palette, RenderError, RenderResult};
use crate::scene::{DisplayList, DrawItem, transform_rect};
use kurbo::{Affine, Point, Rect, Vec2};
use peniko::Color;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use vellum_core::{Document, ViewMode};
use vellum_core::pages::{PAGE_HEIGHT, PAGE_WIDTH, page_count_for, page_rect};

/// Margin around fitted content in infinite mode, in page units.
pub const DEFAULT_MARGIN: f64 = 24.0;

/// One exported page.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgPage {
    /// Zero-based page index.
    pub index: usize,
    pub width: f64,
    pub height: f64,
    /// Complete SVG document.
    pub content: String,
}

/// Turns a document into SVG pages.
#[derive(Debug, Clone)]
pub struct SvgExporter {
    pub margin: f64,
    pub palette: Palette,
}

impl Default for SvgExporter {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            palette: Palette::default(),
        }
    }
}

impl SvgExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Export `doc`. `viewport` is a world rect and only matters in infinite
    /// mode, where it defaults to the content bounds.
    pub fn export(&self, doc: &Document, viewport: Option<Rect>) -> RenderResult<Vec<SvgPage>> {
        match doc.view_mode() {
            ViewMode::A4Notebook => {
                let count = page_count_for(doc.content_bounds());
                (0..count).map(|index| self.export_page(doc, index)).collect()
            }
            ViewMode::Infinite => {
                let source = viewport.or_else(|| doc.content_bounds()).map(|r| r.abs());
                Ok(vec![self.export_fitted(doc, source)?])
            }
        }
    }

    /// Export and write each page as `<stem>-<n>.svg` (1-based) inside `dir`.
    pub fn export_to_dir(
        &self,
        doc: &Document,
        viewport: Option<Rect>,
        dir: &Path,
        stem: &str,
    ) -> RenderResult<Vec<PathBuf>> {
        let pages = self.export(doc, viewport)?;
        std::fs::create_dir_all(dir).map_err(|e| RenderError::Io(format!("{}: {}", dir.display(), e)))?;

        let mut written = Vec::with_capacity(pages.len());
        for page in pages {
            let path = dir.join(format!("{}-{}.svg", stem, page.index + 1));
            std::fs::write(&path, page.content.as_bytes())
                .map_err(|e| RenderError::Io(format!("{}: {}", path.display(), e)))?;
            written.push(path);
        }
        log::info!("Exported {} SVG page(s) to {}", written.len(), dir.display());
        Ok(written)
    }

    fn export_page(&self, doc: &Document, index: usize) -> RenderResult<SvgPage> {
        let page = page_rect(index);
        let transform = Affine::translate(-page.origin().to_vec2());
        let mut list = DisplayList::new();
        list.add_content(doc, transform, 1.0, Some(page), &self.palette, None);
        self.finish(index, &list, None)
    }

    fn export_fitted(&self, doc: &Document, source: Option<Rect>) -> RenderResult<SvgPage> {
        let Some(source) = source else {
            return self.finish(0, &DisplayList::new(), None);
        };
        let (transform, scale) = self.fit_transform(source);
        let mut list = DisplayList::new();
        list.add_content(doc, transform, scale, Some(source), &self.palette, None);
        self.finish(0, &list, Some(transform_rect(transform, source)))
    }

    /// Uniform world to page mapping that centers `source` inside the
    /// margins. Returns the transform and its scale.
    pub fn fit_transform(&self, source: Rect) -> (Affine, f64) {
        let avail_w = (PAGE_WIDTH - 2.0 * self.margin).max(1.0);
        let avail_h = (PAGE_HEIGHT - 2.0 * self.margin).max(1.0);
        let scale = match (source.width() > 0.0, source.height() > 0.0) {
            (true, true) => (avail_w / source.width()).min(avail_h / source.height()),
            (true, false) => avail_w / source.width(),
            (false, true) => avail_h / source.height(),
            (false, false) => 1.0,
        };
        let page_center = Vec2::new(PAGE_WIDTH * 0.5, PAGE_HEIGHT * 0.5);
        let transform =
            Affine::translate(page_center) * Affine::scale(scale) * Affine::translate(-source.center().to_vec2());
        (transform, scale)
    }

    fn finish(&self, index: usize, list: &DisplayList, clip: Option<Rect>) -> RenderResult<SvgPage> {
        let mut out = String::new();
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = PAGE_WIDTH,
            h = PAGE_HEIGHT
        )?;
        writeln!(
            out,
            r#"  <rect x="0" y="0" width="{}" height="{}" {}/>"#,
            PAGE_WIDTH,
            PAGE_HEIGHT,
            fill_attrs(self.palette.page)
        )?;

        if let Some(clip) = clip {
            writeln!(
                out,
                r#"  <defs><clipPath id="view"><rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}"/></clipPath></defs>"#,
                clip.x0,
                clip.y0,
                clip.width(),
                clip.height()
            )?;
            writeln!(out, r#"  <g clip-path="url(#view)">"#)?;
        } else {
            writeln!(out, "  <g>")?;
        }
        for item in list.items() {
            write_item(&mut out, item)?;
        }
        writeln!(out, "  </g>")?;
        writeln!(out, "</svg>")?;

        Ok(SvgPage {
            index,
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            content: out,
        })
    }
}

fn write_item(out: &mut String, item: &DrawItem) -> std::fmt::Result {
    match item {
        DrawItem::Rect { rect, fill, stroke } => {
            let fill = fill.map_or_else(|| r#"fill="none""#.to_string(), fill_attrs);
            let stroke = stroke.map_or_else(String::new, |(color, width)| stroke_attrs(color, width));
            writeln!(
                out,
                r#"    <rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" {} {}/>"#,
                rect.x0,
                rect.y0,
                rect.width(),
                rect.height(),
                fill,
                stroke
            )
        }
        DrawItem::Segment { from, to, color, width } => writeln!(
            out,
            r#"    <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" {} stroke-linecap="round"/>"#,
            from.x,
            from.y,
            to.x,
            to.y,
            stroke_attrs(*color, *width)
        ),
        DrawItem::Path { path, color, width } => writeln!(
            out,
            r#"    <path d="{}" fill="none" {} stroke-linejoin="round"/>"#,
            path.to_svg(),
            stroke_attrs(*color, *width)
        ),
        DrawItem::Text {
            origin,
            text,
            color,
            size,
            bold,
        } => {
            let Point { x, y } = *origin;
            let weight = if *bold { r#" font-weight="bold""# } else { "" };
            writeln!(
                out,
                r#"    <text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="{:.2}"{} {}>{}</text>"#,
                x,
                y,
                size,
                weight,
                fill_attrs(*color),
                escape_xml(text)
            )
        }
    }
}

/// `#rrggbb` plus the alpha as a separate opacity value.
fn color_parts(color: Color) -> (String, Option<f64>) {
    let c = color.to_rgba8();
    let hex = format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b);
    let opacity = (c.a < 255).then(|| f64::from(c.a) / 255.0);
    (hex, opacity)
}

fn fill_attrs(color: Color) -> String {
    match color_parts(color) {
        (hex, Some(opacity)) => format!(r#"fill="{}" fill-opacity="{:.3}""#, hex, opacity),
        (hex, None) => format!(r#"fill="{}""#, hex),
    }
}

fn stroke_attrs(color: Color, width: f64) -> String {
    match color_parts(color) {
        (hex, Some(opacity)) => format!(
            r#"stroke="{}" stroke-opacity="{:.3}" stroke-width="{:.2}""#,
            hex, opacity, width
        ),
        (hex, None) => format!(r#"stroke="{}" stroke-width="{:.2}""#, hex, width),
    }
}

/// Escape text for use inside an XML element.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
