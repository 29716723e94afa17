//! Rubber-band rectangle drawn over the live capture
//!
//! Tracks a single pointer drag. Each pointer position is projected into
//! both spaces when it arrives, so the finalized rectangle is in source space
//! while the live preview stays in display space.

use crate::capture::{Bounds, Point, ProjectedPoint, Projection};

/// Rectangles smaller than this (in source pixels, on either axis) are discarded
pub const MIN_RECT_SIZE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Draft {
    origin: ProjectedPoint,
    current: ProjectedPoint,
}

/// State of an in-progress region drag
#[derive(Debug, Clone)]
pub struct DragGesture {
    draft: Option<Draft>,
    min_size: f64,
}

impl Default for DragGesture {
    fn default() -> Self {
        Self::new(MIN_RECT_SIZE)
    }
}

impl DragGesture {
    pub fn new(min_size: f64) -> Self {
        Self {
            draft: None,
            min_size,
        }
    }

    /// Whether a drag is in progress
    pub fn is_active(&self) -> bool {
        self.draft.is_some()
    }

    /// Start a drag. Ignored when the capture is not yet projectable.
    pub fn pointer_down(&mut self, point: Point, projection: Option<&Projection>) -> bool {
        let Some(projection) = projection else {
            return false;
        };
        let projected = projection.project_point(point);
        self.draft = Some(Draft {
            origin: projected,
            current: projected,
        });
        true
    }

    /// Extend the drag to a new pointer position
    pub fn pointer_move(&mut self, point: Point, projection: Option<&Projection>) {
        if let (Some(draft), Some(projection)) = (self.draft.as_mut(), projection) {
            draft.current = projection.project_point(point);
        }
    }

    /// Finish the drag, returning the source-space rectangle if it is large enough
    pub fn pointer_up(&mut self) -> Option<Bounds> {
        let draft = self.draft.take()?;
        let bounds = Bounds::from_corners(draft.origin.source, draft.current.source);
        if bounds.width < self.min_size || bounds.height < self.min_size {
            return None;
        }
        Some(bounds)
    }

    /// Abandon the drag without producing a rectangle
    pub fn cancel(&mut self) {
        self.draft = None;
    }

    /// Live preview rectangle, relative to the viewport
    pub fn display_bounds(&self) -> Option<Bounds> {
        self.draft
            .map(|draft| Bounds::from_corners(draft.origin.display, draft.current.display))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection() -> Projection {
        // 2x scale on both axes
        Projection::new(Bounds::new(0.0, 0.0, 960.0, 540.0), 1920.0, 1080.0).unwrap()
    }

    #[test]
    fn test_drag_produces_source_bounds() {
        let projection = projection();
        let mut gesture = DragGesture::default();

        assert!(gesture.pointer_down(Point::new(300.0, 200.0), Some(&projection)));
        gesture.pointer_move(Point::new(100.0, 100.0), Some(&projection));

        let preview = gesture.display_bounds().unwrap();
        assert_eq!(preview, Bounds::new(100.0, 100.0, 200.0, 100.0));

        let bounds = gesture.pointer_up().unwrap();
        assert_eq!(bounds, Bounds::new(200.0, 200.0, 400.0, 200.0));
        assert!(!gesture.is_active());
    }

    #[test]
    fn test_small_drag_is_discarded() {
        let projection = projection();
        let mut gesture = DragGesture::default();

        gesture.pointer_down(Point::new(100.0, 100.0), Some(&projection));
        // 4 display units = 8 source pixels tall
        gesture.pointer_move(Point::new(200.0, 104.0), Some(&projection));
        assert!(gesture.pointer_up().is_none());
        assert!(!gesture.is_active());
    }

    #[test]
    fn test_drag_without_projection_is_ignored() {
        let mut gesture = DragGesture::default();
        assert!(!gesture.pointer_down(Point::new(100.0, 100.0), None));
        assert!(!gesture.is_active());
        assert!(gesture.pointer_up().is_none());
    }

    #[test]
    fn test_drag_leaving_viewport_is_pinned() {
        let projection = projection();
        let mut gesture = DragGesture::default();

        gesture.pointer_down(Point::new(900.0, 500.0), Some(&projection));
        gesture.pointer_move(Point::new(2000.0, 2000.0), Some(&projection));

        let bounds = gesture.pointer_up().unwrap();
        assert_eq!(bounds, Bounds::new(1800.0, 1000.0, 120.0, 80.0));
    }

    #[test]
    fn test_cancel_drops_draft() {
        let projection = projection();
        let mut gesture = DragGesture::default();
        gesture.pointer_down(Point::new(10.0, 10.0), Some(&projection));
        gesture.cancel();
        assert!(gesture.display_bounds().is_none());
    }
}
