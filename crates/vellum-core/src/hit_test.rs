//! Geometric queries used by the eraser and the select tool.
//!
//! Everything here is stateless and works in world coordinates. Searches run
//! front to back (last painted first), so the topmost entity wins.

use crate::document::Document;
use crate::model::{Stroke, TextBoxId};
use kurbo::{Point, Rect};

/// Distance from `p` to the closed segment `a`–`b`.
///
/// The projection parameter is clamped to `[0, 1]`; a degenerate segment
/// falls back to the distance to `a`.
pub fn distance_point_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let ap = p - a;
    let len_sq = ab.hypot2();
    if len_sq <= f64::EPSILON {
        return ap.hypot();
    }
    let t = (ap.dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Whether `p` lies inside `rect` or on any of its edges, regardless of
/// corner order.
pub fn rect_contains(rect: Rect, p: Point) -> bool {
    let r = rect.abs();
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}

/// Whether any segment of the stroke passes within `radius` of `p`.
/// A lone point is tested by plain distance.
pub fn stroke_hit(stroke: &Stroke, p: Point, radius: f64) -> bool {
    match stroke.points.as_slice() {
        [] => false,
        [only] => only.position.distance(p) <= radius,
        points => points
            .windows(2)
            .any(|w| distance_point_to_segment(p, w[0].position, w[1].position) <= radius),
    }
}

/// Index of the topmost stroke within `radius` of `p`.
///
/// Whole-stroke granularity: callers remove the entire stroke. `radius` is
/// usually a fixed view-pixel radius divided by the zoom.
pub fn erase_at(doc: &Document, p: Point, radius: f64) -> Option<usize> {
    doc.strokes()
        .iter()
        .enumerate()
        .rev()
        .find(|(_, s)| stroke_hit(s, p, radius))
        .map(|(i, _)| i)
}

/// Id of the topmost text box containing `p`.
pub fn hit_test_text_box(doc: &Document, p: Point) -> Option<TextBoxId> {
    doc.text_boxes()
        .iter()
        .rev()
        .find(|t| rect_contains(t.rect, p))
        .map(|t| t.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InkColor, StrokePoint, TextBox};

    fn stroke(id: u64, pts: &[(f64, f64)]) -> Stroke {
        Stroke::new(
            id,
            pts.iter()
                .map(|&(x, y)| StrokePoint::new(Point::new(x, y), 1.0, 0))
                .collect(),
            InkColor::ink(),
            2.0,
        )
    }

    #[test]
    fn test_segment_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((distance_point_to_segment(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-12);
        // beyond the end: distance to the endpoint, not the infinite line
        assert!((distance_point_to_segment(Point::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-12);
        assert!((distance_point_to_segment(Point::new(-3.0, 0.0), a, b) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_segment() {
        let a = Point::new(1.0, 1.0);
        assert!((distance_point_to_segment(Point::new(4.0, 5.0), a, a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_radius_on_segment() {
        let mut doc = Document::new();
        doc.insert_stroke(None, stroke(1, &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]));
        assert_eq!(erase_at(&doc, Point::new(5.0, 0.0), 0.0), Some(0));
        assert_eq!(erase_at(&doc, Point::new(5.0, 0.5), 0.0), None);
    }

    #[test]
    fn test_erase_prefers_topmost() {
        let mut doc = Document::new();
        doc.insert_stroke(None, stroke(1, &[(0.0, 0.0), (100.0, 0.0)]));
        doc.insert_stroke(None, stroke(2, &[(0.0, 2.0), (100.0, 2.0)]));
        assert_eq!(erase_at(&doc, Point::new(50.0, 1.0), 5.0), Some(1));
        assert_eq!(erase_at(&doc, Point::new(50.0, 50.0), 5.0), None);
    }

    #[test]
    fn test_single_point_stroke() {
        let s = stroke(1, &[(3.0, 3.0)]);
        assert!(stroke_hit(&s, Point::new(3.0, 4.0), 1.0));
        assert!(!stroke_hit(&s, Point::new(3.0, 6.0), 1.0));
    }

    #[test]
    fn test_text_box_topmost() {
        let mut doc = Document::new();
        doc.insert_text_box(None, TextBox::new(1, Rect::new(0.0, 0.0, 100.0, 100.0), ""));
        doc.insert_text_box(None, TextBox::new(2, Rect::new(50.0, 50.0, 150.0, 150.0), ""));
        assert_eq!(hit_test_text_box(&doc, Point::new(75.0, 75.0)), Some(2));
        assert_eq!(hit_test_text_box(&doc, Point::new(25.0, 25.0)), Some(1));
        assert_eq!(hit_test_text_box(&doc, Point::new(200.0, 200.0)), None);
    }

    #[test]
    fn test_text_box_edges_inclusive() {
        let mut doc = Document::new();
        doc.insert_text_box(None, TextBox::new(7, Rect::new(0.0, 0.0, 100.0, 50.0), ""));
        assert_eq!(hit_test_text_box(&doc, Point::new(100.0, 25.0)), Some(7));
        assert_eq!(hit_test_text_box(&doc, Point::new(40.0, 50.0)), Some(7));
        assert_eq!(hit_test_text_box(&doc, Point::new(100.0, 50.0)), Some(7));
        assert_eq!(hit_test_text_box(&doc, Point::new(100.5, 50.0)), None);
    }
}
