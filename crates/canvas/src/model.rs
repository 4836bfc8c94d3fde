//! Draw model - canonical ownership of completed and in-progress strokes
//!
//! The model is the single authority on "what has been drawn". It is
//! mutated only by the pointer tracker (or direct calls in tests) and
//! cleared only by an explicit [`DrawModel::clear`]. Every mutation bumps
//! a revision counter; the rasterizer uses the revision to invalidate its
//! cached buffer lazily.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::types::{Point, Stroke};

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(0);

/// Ordered collection of completed strokes plus at most one in-progress
/// stroke
#[derive(Debug)]
pub struct DrawModel {
    /// Process-unique identity, so raster caches never confuse two
    /// models whose revisions happen to coincide
    id: u64,
    strokes: Vec<Stroke>,
    active: Option<Stroke>,
    revision: u64,
}

impl Default for DrawModel {
    fn default() -> Self {
        Self {
            id: NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed),
            strokes: Vec::new(),
            active: None,
            revision: 0,
        }
    }
}

impl DrawModel {
    /// Create an empty draw model
    pub fn new() -> Self {
        Self::default()
    }

    /// Model identity, paired with the revision to key raster caches
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Start a new in-progress stroke at the given point
    ///
    /// No-op if a stroke is already in progress: the first press wins.
    pub fn begin_stroke(&mut self, point: Point) {
        if self.active.is_some() {
            debug!("begin_stroke: stroke already in progress, ignoring");
            return;
        }
        self.active = Some(Stroke::new(point));
        self.revision += 1;
    }

    /// Append a point to the in-progress stroke
    ///
    /// No-op if no stroke is in progress.
    pub fn extend_stroke(&mut self, point: Point) {
        let Some(active) = self.active.as_mut() else {
            debug!("extend_stroke: no active stroke, ignoring");
            return;
        };
        active.push(point);
        self.revision += 1;
    }

    /// Seal the in-progress stroke into the completed collection
    ///
    /// No-op if no stroke is in progress.
    pub fn end_stroke(&mut self) {
        let Some(active) = self.active.take() else {
            debug!("end_stroke: no active stroke, ignoring");
            return;
        };
        debug!("end_stroke: sealed stroke with {} points", active.len());
        self.strokes.push(active);
        self.revision += 1;
    }

    /// Discard all strokes, returning to the empty drawing state
    ///
    /// Clearing an already-empty model leaves the revision untouched.
    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        self.strokes.clear();
        self.active = None;
        self.revision += 1;
        debug!("clear: drawing state reset");
    }

    /// Whether a stroke is currently in progress
    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    /// Whether there is nothing drawn at all
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.active.is_none()
    }

    /// Completed strokes in completion order
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// The in-progress stroke, if any
    pub fn active_stroke(&self) -> Option<&Stroke> {
        self.active.as_ref()
    }

    /// Completed strokes followed by the in-progress stroke
    pub fn iter_all(&self) -> impl Iterator<Item = &Stroke> {
        self.strokes.iter().chain(self.active.iter())
    }

    /// Most recently captured point, completed or in progress
    pub fn last_point(&self) -> Option<Point> {
        self.active
            .as_ref()
            .or_else(|| self.strokes.last())
            .map(|s| s.last())
    }

    /// Monotonic revision counter, bumped by every mutation
    ///
    /// The rasterizer keys its cache on this value.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_sequencing() {
        let mut model = DrawModel::new();
        model.begin_stroke(Point::new(0.0, 0.0));
        assert!(model.is_drawing());
        model.extend_stroke(Point::new(1.0, 1.0));
        model.extend_stroke(Point::new(2.0, 2.0));
        model.end_stroke();
        assert!(!model.is_drawing());

        assert_eq!(model.strokes().len(), 1);
        let points = model.strokes()[0].points();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], Point::new(0.0, 0.0));
        assert_eq!(points[1], Point::new(1.0, 1.0));
        assert_eq!(points[2], Point::new(2.0, 2.0));

        // A second press starts an independent stroke
        model.begin_stroke(Point::new(5.0, 5.0));
        model.end_stroke();
        assert_eq!(model.strokes().len(), 2);
        assert_eq!(model.strokes()[1].points().len(), 1);
    }

    #[test]
    fn test_second_press_while_drawing_is_ignored() {
        let mut model = DrawModel::new();
        model.begin_stroke(Point::new(0.0, 0.0));
        model.begin_stroke(Point::new(9.0, 9.0));
        model.extend_stroke(Point::new(1.0, 1.0));
        model.end_stroke();

        assert_eq!(model.strokes().len(), 1);
        // The second press did not restart the stroke
        assert_eq!(model.strokes()[0].points()[0], Point::new(0.0, 0.0));
    }

    #[test]
    fn test_idle_mutations_are_noops() {
        let mut model = DrawModel::new();
        let before = model.revision();

        model.extend_stroke(Point::new(1.0, 1.0));
        model.end_stroke();
        model.extend_stroke(Point::new(2.0, 2.0));

        assert!(model.is_empty());
        assert_eq!(model.revision(), before);
    }

    #[test]
    fn test_clear_idempotence() {
        let mut model = DrawModel::new();
        let fresh_revision = model.revision();
        model.clear();
        assert_eq!(model.revision(), fresh_revision);

        for i in 0..3 {
            model.begin_stroke(Point::new(i as f32, 0.0));
            model.extend_stroke(Point::new(i as f32, 10.0));
            model.end_stroke();
        }
        // Clear also discards an in-progress stroke
        model.begin_stroke(Point::new(9.0, 9.0));
        model.clear();

        assert!(!model.is_drawing());
        assert!(model.is_empty());
        assert_eq!(model.strokes().len(), 0);
        assert!(model.active_stroke().is_none());
        assert!(model.last_point().is_none());
    }

    #[test]
    fn test_revision_bumps_on_mutation() {
        let mut model = DrawModel::new();
        let r0 = model.revision();
        model.begin_stroke(Point::new(0.0, 0.0));
        let r1 = model.revision();
        assert!(r1 > r0);
        model.extend_stroke(Point::new(1.0, 0.0));
        let r2 = model.revision();
        assert!(r2 > r1);
        model.end_stroke();
        assert!(model.revision() > r2);
    }

    #[test]
    fn test_last_point_tracks_active_stroke() {
        let mut model = DrawModel::new();
        assert!(model.last_point().is_none());

        model.begin_stroke(Point::new(1.0, 1.0));
        model.extend_stroke(Point::new(2.0, 3.0));
        assert_eq!(model.last_point(), Some(Point::new(2.0, 3.0)));

        model.end_stroke();
        assert_eq!(model.last_point(), Some(Point::new(2.0, 3.0)));
    }
}
