//! Shape recognition for finished freehand strokes.
//!
//! Three independent classifiers (line, circle, rectangle) each either reject
//! the stroke or produce a score in `[0, 1]`. The best score wins; ties go to
//! the earlier classifier in that order. Recognition never mutates anything;
//! callers decide whether a match is good enough to snap.

use crate::hit_test::distance_point_to_segment;
use crate::model::{ShapeGeometry, ShapeKind, Stroke};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Tunable thresholds for the classifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Endpoints closer than this never form a line.
    pub line_min_length: f64,
    /// Reject a line when mean deviation exceeds this fraction of its length.
    pub line_max_error_ratio: f64,
    /// Mean deviation (as a fraction of length) at which the line score reaches 0.
    pub line_score_falloff: f64,
    /// Closed shapes need at least this many points.
    pub closed_min_points: usize,
    /// Start-to-end gap must be below this fraction of the bbox diagonal.
    pub closed_gap_ratio: f64,
    /// Reject a circle when stddev/mean radius exceeds this.
    pub circle_max_relative_stddev: f64,
    /// Edge tolerance as a fraction of the bbox diagonal.
    pub rect_edge_tolerance_ratio: f64,
    /// The fraction of points near an edge must exceed this.
    pub rect_min_edge_fraction: f64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            line_min_length: 15.0,
            line_max_error_ratio: 0.03,
            line_score_falloff: 0.1,
            closed_min_points: 12,
            closed_gap_ratio: 0.25,
            circle_max_relative_stddev: 0.12,
            rect_edge_tolerance_ratio: 0.05,
            rect_min_edge_fraction: 0.7,
        }
    }
}

/// A successful classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeMatch {
    pub score: f64,
    pub geometry: ShapeGeometry,
}

impl ShapeMatch {
    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }
}

/// Classifies point sequences as idealized primitives.
#[derive(Debug, Clone, Default)]
pub struct ShapeRecognizer {
    pub config: RecognizerConfig,
}

impl ShapeRecognizer {
    pub fn new(config: RecognizerConfig) -> Self {
        Self { config }
    }

    /// Best match for a stroke, or `None` when no classifier accepts it.
    pub fn recognize_stroke(&self, stroke: &Stroke) -> Option<ShapeMatch> {
        let points: Vec<Point> = stroke.positions().collect();
        self.recognize(&points)
    }

    /// Best match for a point sequence in world coordinates.
    pub fn recognize(&self, points: &[Point]) -> Option<ShapeMatch> {
        [self.match_line(points), self.match_circle(points), self.match_rect(points)]
            .into_iter()
            .flatten()
            .fold(None, |best: Option<ShapeMatch>, m| match best {
                Some(b) if b.score >= m.score => Some(b),
                _ => Some(m),
            })
    }

    /// Straight segment from the first to the last point.
    pub fn match_line(&self, points: &[Point]) -> Option<ShapeMatch> {
        let (&p0, &p1) = (points.first()?, points.last()?);
        if points.len() < 2 {
            return None;
        }
        let length = p0.distance(p1);
        if length < self.config.line_min_length {
            return None;
        }

        let mean_error = points
            .iter()
            .map(|&p| distance_point_to_segment(p, p0, p1))
            .sum::<f64>()
            / points.len() as f64;
        if mean_error / length > self.config.line_max_error_ratio {
            return None;
        }

        let score = (1.0 - mean_error / (self.config.line_score_falloff * length)).clamp(0.0, 1.0);
        Some(ShapeMatch {
            score,
            geometry: ShapeGeometry::Line { p0, p1 },
        })
    }

    /// Circle around the centroid with the mean radius.
    pub fn match_circle(&self, points: &[Point]) -> Option<ShapeMatch> {
        self.closed_bounds(points)?;

        let n = points.len() as f64;
        let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        let center = Point::new(sx / n, sy / n);

        let radii: Vec<f64> = points.iter().map(|p| p.distance(center)).collect();
        let mean = radii.iter().sum::<f64>() / n;
        if mean <= f64::EPSILON {
            return None;
        }
        let variance = radii.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        let relative_stddev = variance.sqrt() / mean;
        if relative_stddev > self.config.circle_max_relative_stddev {
            return None;
        }

        Some(ShapeMatch {
            score: (1.0 - relative_stddev).clamp(0.0, 1.0),
            geometry: ShapeGeometry::Circle { center, radius: mean },
        })
    }

    /// The stroke's bounding box, when most points hug its edges.
    pub fn match_rect(&self, points: &[Point]) -> Option<ShapeMatch> {
        let bounds = self.closed_bounds(points)?;
        let tolerance = diagonal(bounds) * self.config.rect_edge_tolerance_ratio;

        let near_edge = points
            .iter()
            .filter(|p| {
                let d = (p.x - bounds.x0)
                    .abs()
                    .min((p.x - bounds.x1).abs())
                    .min((p.y - bounds.y0).abs())
                    .min((p.y - bounds.y1).abs());
                d <= tolerance
            })
            .count();
        let fraction = near_edge as f64 / points.len() as f64;
        if fraction <= self.config.rect_min_edge_fraction {
            return None;
        }

        Some(ShapeMatch {
            score: fraction.clamp(0.0, 1.0),
            geometry: ShapeGeometry::Rect { rect: bounds },
        })
    }

    /// Bounding box of a stroke that has enough points and ends near where it
    /// started.
    fn closed_bounds(&self, points: &[Point]) -> Option<Rect> {
        if points.len() < self.config.closed_min_points {
            return None;
        }
        let bounds = bounds_of(points)?;
        let diag = diagonal(bounds);
        if diag <= f64::EPSILON {
            return None;
        }
        let gap = points[0].distance(points[points.len() - 1]);
        (gap < diag * self.config.closed_gap_ratio).then_some(bounds)
    }
}

fn bounds_of(points: &[Point]) -> Option<Rect> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .fold(Rect::from_points(first, first), |r, &p| r.union_pt(p)),
    )
}

fn diagonal(r: Rect) -> f64 {
    r.width().hypot(r.height())
}
