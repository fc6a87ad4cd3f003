//! Accumulation of an in-progress stroke (the draft).

use crate::model::{InkColor, Stroke, StrokeId, StrokePoint};

/// Samples closer than this (world units) to the previous one are dropped.
pub const DEFAULT_MIN_SAMPLE_DISTANCE: f64 = 0.3;

/// A finished draft, ready to become a [`Stroke`] once it has an id.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedDraft {
    pub points: Vec<StrokePoint>,
    pub color: InkColor,
    pub base_width: f64,
}

impl FinishedDraft {
    pub fn into_stroke(self, id: StrokeId) -> Stroke {
        Stroke::new(id, self.points, self.color, self.base_width)
    }
}

/// Collects pointer samples for a stroke that is not yet part of the document.
///
/// Color and width are captured when the draft begins, so changing the pen
/// mid-stroke does not affect it.
#[derive(Debug, Clone)]
pub struct StrokeCapture {
    points: Vec<StrokePoint>,
    color: InkColor,
    base_width: f64,
    active: bool,
    min_distance: f64,
}

impl Default for StrokeCapture {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SAMPLE_DISTANCE)
    }
}

impl StrokeCapture {
    pub fn new(min_distance: f64) -> Self {
        Self {
            points: Vec::new(),
            color: InkColor::default(),
            base_width: 2.0,
            active: false,
            min_distance,
        }
    }

    /// Start a new draft with its first sample, discarding any open one.
    pub fn begin(&mut self, first: StrokePoint, color: InkColor, base_width: f64) {
        self.points.clear();
        self.points.reserve(512);
        self.points.push(first);
        self.color = color;
        self.base_width = base_width;
        self.active = true;
    }

    /// Add a sample. Returns false when there is no open draft or the sample
    /// is too close to the previous one.
    pub fn append(&mut self, sample: StrokePoint) -> bool {
        if !self.active {
            return false;
        }
        if let Some(last) = self.points.last() {
            if last.position.distance(sample.position) < self.min_distance {
                return false;
            }
        }
        self.points.push(sample);
        true
    }

    /// Close the draft. Yields it only if it has enough points to be a stroke;
    /// a degenerate draft is dropped silently.
    pub fn end(&mut self) -> Option<FinishedDraft> {
        if !self.active {
            return None;
        }
        self.active = false;
        let points = std::mem::take(&mut self.points);
        if points.len() < Stroke::MIN_POINTS {
            return None;
        }
        Some(FinishedDraft {
            points,
            color: self.color,
            base_width: self.base_width,
        })
    }

    /// Discard the draft without producing anything.
    pub fn cancel(&mut self) {
        self.active = false;
        self.points.clear();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Samples accepted so far.
    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    /// Temporary stroke for live rendering (id 0), once there are two points.
    pub fn preview(&self) -> Option<Stroke> {
        (self.active && self.points.len() >= Stroke::MIN_POINTS)
            .then(|| Stroke::new(0, self.points.clone(), self.color, self.base_width))
    }
}
