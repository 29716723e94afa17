//! Projection between display space and source space
//!
//! Display space is the on-screen rectangle the captured stream is rendered
//! into. Source space is the native pixel grid of the captured frame. Region
//! bounds are always stored in source space; display coordinates depend on
//! the current viewport and are only computed for drawing.

use serde::{Deserialize, Serialize};

/// A point in either display or source space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle (origin plus size)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build the rectangle spanned by two corner points, in any drag direction
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether the rectangle has no area to project through
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// A projected pointer position in both spaces
///
/// `display` is relative to the viewport origin, `source` is in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub display: Point,
    pub source: Point,
}

/// Scale factors between a viewport and a source frame
///
/// Only constructible when both the viewport and the frame have a usable
/// size, so every projection through it is defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    viewport: Bounds,
    source_width: f64,
    source_height: f64,
}

impl Projection {
    /// Returns `None` while the viewport is collapsed or the frame size is not yet known
    ///
    /// Non-finite viewport edges or frame sizes are treated the same way.
    pub fn new(viewport: Bounds, source_width: f64, source_height: f64) -> Option<Self> {
        let edges = [viewport.x, viewport.y, viewport.right(), viewport.bottom()];
        if viewport.is_empty() || !edges.iter().all(|edge| edge.is_finite()) {
            return None;
        }
        if !(source_width > 0.0 && source_height > 0.0)
            || !source_width.is_finite()
            || !source_height.is_finite()
        {
            return None;
        }
        Some(Self {
            viewport,
            source_width,
            source_height,
        })
    }

    pub fn viewport(&self) -> Bounds {
        self.viewport
    }

    /// Source pixels per display unit on each axis
    pub fn scale(&self) -> (f64, f64) {
        (
            self.source_width / self.viewport.width,
            self.source_height / self.viewport.height,
        )
    }

    /// Project a pointer position given in absolute display coordinates
    ///
    /// The position is pinned to the viewport edges first, so drags that
    /// leave the visible area keep producing valid source points.
    pub fn project_point(&self, point: Point) -> ProjectedPoint {
        let clamped_x = point.x.clamp(self.viewport.x, self.viewport.right());
        let clamped_y = point.y.clamp(self.viewport.y, self.viewport.bottom());

        let display = Point::new(clamped_x - self.viewport.x, clamped_y - self.viewport.y);
        let (scale_x, scale_y) = self.scale();

        ProjectedPoint {
            display,
            source: Point::new(display.x * scale_x, display.y * scale_y),
        }
    }

    /// Project source-space bounds into viewport-relative display bounds
    pub fn bounds_to_display(&self, bounds: Bounds) -> Bounds {
        let scale_x = self.viewport.width / self.source_width;
        let scale_y = self.viewport.height / self.source_height;
        Bounds {
            x: bounds.x * scale_x,
            y: bounds.y * scale_y,
            width: bounds.width * scale_x,
            height: bounds.height * scale_y,
        }
    }

    /// Project viewport-relative display bounds back into source space
    pub fn bounds_to_source(&self, bounds: Bounds) -> Bounds {
        let origin = Point::new(self.viewport.x + bounds.x, self.viewport.y + bounds.y);
        let corner = Point::new(origin.x + bounds.width, origin.y + bounds.height);
        Bounds::from_corners(
            self.project_point(origin).source,
            self.project_point(corner).source,
        )
    }
}

/// Convert an absolute display point into source space
pub fn to_source(
    point: Point,
    viewport: Bounds,
    source_width: f64,
    source_height: f64,
) -> Option<Point> {
    Projection::new(viewport, source_width, source_height)
        .map(|projection| projection.project_point(point).source)
}

/// Convert source-space bounds into viewport-relative display bounds
pub fn to_display(
    bounds: Bounds,
    viewport: Bounds,
    source_width: f64,
    source_height: f64,
) -> Option<Bounds> {
    Projection::new(viewport, source_width, source_height)
        .map(|projection| projection.bounds_to_display(bounds))
}
