//! Idealized shape geometry attached to a snapped stroke.
//!
//! The byte encoding is shared with renderers, exporters and the file
//! format: little-endian `f64` values in a fixed field order.
//!
//! | kind   | fields             |
//! |--------|--------------------|
//! | line   | `x0, y0, x1, y1`   |
//! | circle | `cx, cy, r`        |
//! | rect   | `x, y, w, h`       |

use kurbo::{BezPath, Circle, Line, Point, Rect, Shape};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Flattening tolerance used when converting shapes to paths.
const PATH_TOLERANCE: f64 = 0.1;

/// Kinds of primitives a stroke can be snapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Line,
    Circle,
    Rect,
}

impl ShapeKind {
    /// Name used in the persisted format.
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Line => "line",
            ShapeKind::Circle => "circle",
            ShapeKind::Rect => "rect",
        }
    }

    /// Parse a persisted name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "line" => Some(ShapeKind::Line),
            "circle" => Some(ShapeKind::Circle),
            "rect" => Some(ShapeKind::Rect),
            _ => None,
        }
    }

    /// Number of `f64` fields in the encoding.
    fn field_count(self) -> usize {
        match self {
            ShapeKind::Line | ShapeKind::Rect => 4,
            ShapeKind::Circle => 3,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from decoding a shape parameter blob.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeParamsError {
    #[error("unknown shape type: {0}")]
    UnknownKind(String),
    #[error("{kind} params must be {expected} bytes, got {actual}")]
    BadLength {
        kind: ShapeKind,
        expected: usize,
        actual: usize,
    },
}

/// World-space geometry of a snapped shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeGeometry {
    Line { p0: Point, p1: Point },
    Circle { center: Point, radius: f64 },
    Rect { rect: Rect },
}

impl ShapeGeometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeGeometry::Line { .. } => ShapeKind::Line,
            ShapeGeometry::Circle { .. } => ShapeKind::Circle,
            ShapeGeometry::Rect { .. } => ShapeKind::Rect,
        }
    }

    /// Field values in encoding order.
    fn fields(&self) -> Vec<f64> {
        match *self {
            ShapeGeometry::Line { p0, p1 } => vec![p0.x, p0.y, p1.x, p1.y],
            ShapeGeometry::Circle { center, radius } => vec![center.x, center.y, radius],
            ShapeGeometry::Rect { rect } => vec![rect.x0, rect.y0, rect.width(), rect.height()],
        }
    }

    /// Encode as the shared little-endian blob.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.fields().iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    /// Decode a blob for a known kind.
    pub fn from_bytes(kind: ShapeKind, bytes: &[u8]) -> Result<Self, ShapeParamsError> {
        let expected = kind.field_count() * 8;
        if bytes.len() != expected {
            return Err(ShapeParamsError::BadLength {
                kind,
                expected,
                actual: bytes.len(),
            });
        }

        let v: Vec<f64> = bytes
            .chunks_exact(8)
            .map(|chunk| {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(chunk);
                f64::from_le_bytes(buf)
            })
            .collect();

        Ok(match kind {
            ShapeKind::Line => ShapeGeometry::Line {
                p0: Point::new(v[0], v[1]),
                p1: Point::new(v[2], v[3]),
            },
            ShapeKind::Circle => ShapeGeometry::Circle {
                center: Point::new(v[0], v[1]),
                radius: v[2],
            },
            ShapeKind::Rect => ShapeGeometry::Rect {
                rect: Rect::new(v[0], v[1], v[0] + v[2], v[1] + v[3]),
            },
        })
    }

    /// Decode from a persisted type name and blob.
    pub fn decode(shape_type: &str, bytes: &[u8]) -> Result<Self, ShapeParamsError> {
        let kind = ShapeKind::parse(shape_type)
            .ok_or_else(|| ShapeParamsError::UnknownKind(shape_type.to_string()))?;
        Self::from_bytes(kind, bytes)
    }

    /// World-space bounding box.
    pub fn bounds(&self) -> Rect {
        match *self {
            ShapeGeometry::Line { p0, p1 } => Rect::from_points(p0, p1),
            ShapeGeometry::Circle { center, radius } => Circle::new(center, radius).bounding_box(),
            ShapeGeometry::Rect { rect } => rect.abs(),
        }
    }

    /// Outline as a path in world coordinates.
    pub fn to_path(&self) -> BezPath {
        match *self {
            ShapeGeometry::Line { p0, p1 } => Line::new(p0, p1).to_path(PATH_TOLERANCE),
            ShapeGeometry::Circle { center, radius } => {
                Circle::new(center, radius).to_path(PATH_TOLERANCE)
            }
            ShapeGeometry::Rect { rect } => rect.abs().to_path(PATH_TOLERANCE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_field_order() {
        let g = ShapeGeometry::Line {
            p0: Point::new(1.0, 2.0),
            p1: Point::new(3.0, 4.0),
        };
        let bytes = g.to_bytes();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[0..8], &1.0f64.to_le_bytes());
        assert_eq!(&bytes[24..32], &4.0f64.to_le_bytes());
    }

    #[test]
    fn test_rect_encodes_width_height() {
        let g = ShapeGeometry::Rect {
            rect: Rect::new(10.0, 20.0, 40.0, 60.0),
        };
        let bytes = g.to_bytes();
        assert_eq!(&bytes[16..24], &30.0f64.to_le_bytes());
        assert_eq!(&bytes[24..32], &40.0f64.to_le_bytes());

        let back = ShapeGeometry::from_bytes(ShapeKind::Rect, &bytes).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn test_decode_unknown_kind() {
        let err = ShapeGeometry::decode("triangle", &[]).unwrap_err();
        assert_eq!(err, ShapeParamsError::UnknownKind("triangle".to_string()));
    }

    #[test]
    fn test_decode_bad_length() {
        let err = ShapeGeometry::decode("circle", &[0u8; 16]).unwrap_err();
        assert!(matches!(
            err,
            ShapeParamsError::BadLength {
                kind: ShapeKind::Circle,
                expected: 24,
                actual: 16
            }
        ));
    }

    #[test]
    fn test_circle_bounds() {
        let g = ShapeGeometry::Circle {
            center: Point::new(100.0, 100.0),
            radius: 50.0,
        };
        let b = g.bounds();
        assert!((b.x0 - 50.0).abs() < 1e-9);
        assert!((b.y1 - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_kind_names() {
        for kind in [ShapeKind::Line, ShapeKind::Circle, ShapeKind::Rect] {
            assert_eq!(ShapeKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ShapeKind::parse("ellipse"), None);
    }
}
