//! Vellum Render Library
//!
//! Read-only consumers of a [`vellum_core::Document`]: a display-list
//! builder for on-screen drawing and an SVG exporter.

mod renderer;
pub mod scene;
pub mod svg;

pub use renderer::{Palette, RenderContext, RenderError, RenderResult, Renderer};
pub use scene::{DisplayList, DrawItem, SceneRenderer, TextLine, markdown_lines};
pub use svg::{SvgExporter, SvgPage};
