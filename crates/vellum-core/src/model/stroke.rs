//! Freehand ink strokes.

use super::geometry::{ShapeGeometry, ShapeKind};
use super::{InkColor, StrokeId};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A single pointer sample in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    /// Position in world coordinates.
    pub position: Point,
    /// Pen pressure in `[0, 1]`.
    pub pressure: f64,
    /// Milliseconds since the editing session started.
    pub timestamp_ms: u64,
}

impl StrokePoint {
    pub fn new(position: Point, pressure: f64, timestamp_ms: u64) -> Self {
        Self {
            position,
            pressure: pressure.clamp(0.0, 1.0),
            timestamp_ms,
        }
    }
}

/// Shape-snap annotation of a stroke.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StrokeShape {
    /// Plain ink, rendered from its points.
    #[default]
    Freehand,
    /// Snapped to an idealized primitive.
    Snapped(ShapeGeometry),
    /// Marked as a shape by a source whose encoding this build cannot read.
    /// Kept verbatim so it survives a save; renders as the raw polyline.
    Unrecognized { shape_type: String, params: Vec<u8> },
}

impl StrokeShape {
    pub fn is_shape(&self) -> bool {
        !matches!(self, StrokeShape::Freehand)
    }

    pub fn kind(&self) -> Option<ShapeKind> {
        match self {
            StrokeShape::Snapped(geometry) => Some(geometry.kind()),
            _ => None,
        }
    }

    /// Geometry usable for rendering, if any.
    pub fn geometry(&self) -> Option<&ShapeGeometry> {
        match self {
            StrokeShape::Snapped(geometry) => Some(geometry),
            _ => None,
        }
    }

    /// Persisted `(shape_type, params)` pair; empty for freehand.
    pub fn encode(&self) -> (String, Vec<u8>) {
        match self {
            StrokeShape::Freehand => (String::new(), Vec::new()),
            StrokeShape::Snapped(geometry) => (geometry.kind().as_str().to_string(), geometry.to_bytes()),
            StrokeShape::Unrecognized { shape_type, params } => (shape_type.clone(), params.clone()),
        }
    }

    /// Rebuild from the persisted triple. Undecodable params are preserved as
    /// [`StrokeShape::Unrecognized`].
    pub fn decode(is_shape: bool, shape_type: &str, params: &[u8]) -> Self {
        if !is_shape {
            return StrokeShape::Freehand;
        }
        match ShapeGeometry::decode(shape_type, params) {
            Ok(geometry) => StrokeShape::Snapped(geometry),
            Err(e) => {
                log::warn!("Keeping undecodable shape annotation: {}", e);
                StrokeShape::Unrecognized {
                    shape_type: shape_type.to_string(),
                    params: params.to_vec(),
                }
            }
        }
    }
}

/// A committed ink stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub id: StrokeId,
    /// Samples in drawing order.
    pub points: Vec<StrokePoint>,
    pub color: InkColor,
    /// Width at full pressure, in world units.
    pub base_width: f64,
    pub shape: StrokeShape,
}

impl Stroke {
    /// Smallest number of points a committed stroke can have.
    pub const MIN_POINTS: usize = 2;

    pub fn new(id: StrokeId, points: Vec<StrokePoint>, color: InkColor, base_width: f64) -> Self {
        Self {
            id,
            points,
            color,
            base_width,
            shape: StrokeShape::Freehand,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Positions only, in drawing order.
    pub fn positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().map(|p| p.position)
    }

    /// Bounding box of the raw points.
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.points.first()?.position;
        Some(
            self.positions()
                .fold(Rect::from_points(first, first), |r, p| r.union_pt(p)),
        )
    }

    /// Mean pressure across all points (1.0 for an empty stroke).
    pub fn average_pressure(&self) -> f64 {
        if self.points.is_empty() {
            return 1.0;
        }
        self.points.iter().map(|p| p.pressure).sum::<f64>() / self.points.len() as f64
    }
}
