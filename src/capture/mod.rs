//! Screen Capture Layer
//!
//! Holds the latest frame of the shared screen and the geometry needed to
//! turn pointer gestures over the rendered stream into source-space
//! rectangles. Acquiring the stream itself happens outside this crate; it
//! pushes frames into a [`FrameSlot`].

pub mod draft;
pub mod frame;
pub mod projection;

use parking_lot::RwLock;
use std::sync::Arc;

pub use draft::{DragGesture, MIN_RECT_SIZE};
pub use frame::CapturedFrame;
pub use projection::{to_display, to_source, Bounds, Point, ProjectedPoint, Projection};

/// Anything that can hand out the most recent captured frame
pub trait FrameSource: Send + Sync {
    /// Latest frame, or `None` while the stream is not ready
    fn latest_frame(&self) -> Option<Arc<CapturedFrame>>;

    /// Pixel size of the latest frame
    fn source_dimensions(&self) -> Option<(u32, u32)> {
        self.latest_frame().map(|frame| frame.dimensions())
    }
}

/// Shared slot the stream writer publishes frames into
#[derive(Debug, Clone, Default)]
pub struct FrameSlot {
    latest: Arc<RwLock<Option<Arc<CapturedFrame>>>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current frame
    pub fn publish(&self, frame: CapturedFrame) {
        *self.latest.write() = Some(Arc::new(frame));
    }

    /// Drop the current frame, e.g. when the stream stops
    pub fn clear(&self) {
        *self.latest.write() = None;
    }

    /// Projection for a viewport over the current frame
    pub fn projection(&self, viewport: Bounds) -> Option<Projection> {
        let (width, height) = self.source_dimensions()?;
        Projection::new(viewport, width as f64, height as f64)
    }
}

impl FrameSource for FrameSlot {
    fn latest_frame(&self) -> Option<Arc<CapturedFrame>> {
        self.latest.read().clone()
    }
}
