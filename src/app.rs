//! Application Coordinator
//!
//! Ties the capture state, the frame slot, the drag gesture and the
//! recognition scheduler together. The rendering layer drives it with
//! session commands and pointer events in display coordinates.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::capture::{Bounds, DragGesture, FrameSlot, Point, Projection};
use crate::config::AppConfig;
use crate::document::{CaptureError, Region};
use crate::id::PageId;
use crate::overlay::Transition;
use crate::scheduler::RecognitionScheduler;
use crate::shared::{CaptureState, SharedCaptureState};
use crate::vision::Recognizer;

/// Main application coordinator
pub struct RegionTallyApp {
    /// Shared document and session state
    state: SharedCaptureState,
    /// Latest frame of the shared screen
    frames: FrameSlot,
    /// Rectangle currently being drawn
    gesture: DragGesture,
    /// Recognition job dispatcher
    scheduler: RecognitionScheduler,
    /// Background scan loop
    watch_handle: Option<JoinHandle<()>>,
    scan_interval: Duration,
}

impl RegionTallyApp {
    /// Create a coordinator; must be called inside a tokio runtime
    pub fn new(config: &AppConfig, recognizer: Arc<dyn Recognizer>) -> Result<Self> {
        let state = CaptureState::new().shared();
        let frames = FrameSlot::new();
        let scheduler = RecognitionScheduler::new(
            state.clone(),
            Arc::new(frames.clone()),
            recognizer,
            &config.recognition,
        )?;

        Ok(Self {
            state,
            frames,
            gesture: DragGesture::new(config.capture.min_region_size),
            scheduler,
            watch_handle: None,
            scan_interval: Duration::from_millis(config.capture.scan_interval_ms),
        })
    }

    /// Start the background scan for pending regions
    pub fn start(&mut self) {
        if self.watch_handle.is_none() {
            self.watch_handle = Some(self.scheduler.spawn_watch(self.scan_interval));
            info!("Recognition watch started ({:?} interval)", self.scan_interval);
        }
    }

    /// Get current shared state
    pub fn state(&self) -> SharedCaptureState {
        self.state.clone()
    }

    /// Slot the stream writer publishes frames into
    pub fn frames(&self) -> &FrameSlot {
        &self.frames
    }

    pub fn scheduler(&self) -> &RecognitionScheduler {
        &self.scheduler
    }

    // ---- Session ----

    pub fn begin_capture(&mut self) -> Transition {
        self.gesture.cancel();
        self.state.write().begin_capture()
    }

    pub fn finish_capture(&mut self) -> Option<Transition> {
        self.gesture.cancel();
        self.state.write().finish_capture()
    }

    pub fn cancel_capture(&mut self) -> Transition {
        self.gesture.cancel();
        self.state.write().cancel_capture()
    }

    pub fn toggle_banner(&self, visible: Option<bool>) -> bool {
        self.state.write().session.toggle_banner(visible)
    }

    // ---- Pages and regions ----

    pub fn add_page(&self, label: Option<&str>) -> PageId {
        self.state.write().document.add_page(label)
    }

    pub fn go_to_page(&self, page_id: &PageId) {
        self.state.write().document.go_to_page(page_id);
    }

    /// Stage a region from source-space bounds and kick off recognition
    pub fn stage_region(
        &self,
        bounds: Bounds,
        page_id: Option<&PageId>,
    ) -> Result<Region, CaptureError> {
        let region = self.state.write().document.stage_region(bounds, page_id)?;
        self.scheduler.scan();
        Ok(region)
    }

    pub fn undo_last_region(&self) -> Option<Region> {
        self.state.write().document.undo_last_region()
    }

    // ---- Pointer events ----

    fn projection(&self, viewport: Bounds) -> Option<Projection> {
        self.frames.projection(viewport)
    }

    /// Start drawing a rectangle; only accepted while capturing
    pub fn pointer_down(&mut self, point: Point, viewport: Bounds) -> bool {
        if !self.state.read().session.can_draw() {
            return false;
        }
        let projection = self.projection(viewport);
        self.gesture.pointer_down(point, projection.as_ref())
    }

    pub fn pointer_move(&mut self, point: Point, viewport: Bounds) {
        if self.gesture.is_active() {
            let projection = self.projection(viewport);
            self.gesture.pointer_move(point, projection.as_ref());
        }
    }

    /// Finish the rectangle and stage it on the active page
    pub fn pointer_up(&mut self) -> Result<Option<Region>, CaptureError> {
        let Some(bounds) = self.gesture.pointer_up() else {
            return Ok(None);
        };
        // Capture may have been left while the pointer was down
        if !self.state.read().session.can_draw() {
            debug!("Dropping rectangle drawn outside capture mode");
            return Ok(None);
        }
        self.stage_region(bounds, None).map(Some)
    }

    /// Live rectangle to draw, relative to the viewport
    pub fn draft_display_bounds(&self) -> Option<Bounds> {
        self.gesture.display_bounds()
    }

    /// Regions of the active page projected for drawing, in capture order
    pub fn active_page_overlays(&self, viewport: Bounds) -> Vec<(Region, Bounds)> {
        let Some(projection) = self.projection(viewport) else {
            return Vec::new();
        };
        let state = self.state.read();
        let document = &state.document;
        document
            .page_regions(document.active_page_id())
            .into_iter()
            .map(|region| (region.clone(), projection.bounds_to_display(region.bounds)))
            .collect()
    }

    /// Wait until every staged region has been recognized
    pub async fn wait_for_recognition(&self) {
        self.scheduler.wait_until_idle().await;
    }

    /// Stop recognition and the watch loop
    pub fn shutdown(&mut self) {
        self.scheduler.shutdown();
        if let Some(handle) = self.watch_handle.take() {
            handle.abort();
        }
    }
}

impl Drop for RegionTallyApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CapturedFrame;
    use crate::document::RegionStatus;
    use crate::overlay::OverlayMode;
    use crate::vision::MockRecognizer;

    const VIEWPORT: Bounds = Bounds {
        x: 0.0,
        y: 0.0,
        width: 960.0,
        height: 540.0,
    };

    fn app() -> RegionTallyApp {
        let mut config = AppConfig::default();
        config.capture.scan_interval_ms = 5;
        let app = RegionTallyApp::new(&config, Arc::new(MockRecognizer::new(0..5))).unwrap();
        app.frames()
            .publish(CapturedFrame::solid(1920, 1080, [255, 255, 255, 255]));
        app
    }

    fn draw(app: &mut RegionTallyApp, from: (f64, f64), to: (f64, f64)) -> Option<Region> {
        app.pointer_down(Point::new(from.0, from.1), VIEWPORT);
        app.pointer_move(Point::new(to.0, to.1), VIEWPORT);
        app.pointer_up().unwrap()
    }

    #[tokio::test]
    async fn test_drawing_requires_capture_mode() {
        let mut app = app();
        assert!(!app.pointer_down(Point::new(10.0, 10.0), VIEWPORT));
        assert!(draw(&mut app, (10.0, 10.0), (200.0, 100.0)).is_none());
        assert_eq!(app.state().read().document.regions().count(), 0);
    }

    #[tokio::test]
    async fn test_drawing_without_frame_is_ignored() {
        let mut app = app();
        app.frames().clear();
        app.begin_capture();
        assert!(!app.pointer_down(Point::new(10.0, 10.0), VIEWPORT));
    }

    #[tokio::test]
    async fn test_draw_stage_and_recognize() {
        let mut app = app();
        app.begin_capture();

        let region = draw(&mut app, (100.0, 50.0), (300.0, 100.0)).unwrap();
        assert_eq!(region.bounds, Bounds::new(200.0, 100.0, 400.0, 100.0));

        // Too small to keep
        assert!(draw(&mut app, (10.0, 10.0), (12.0, 200.0)).is_none());

        assert_eq!(app.finish_capture().unwrap().to, OverlayMode::Reviewing);
        app.wait_for_recognition().await;

        let state = app.state();
        let state = state.read();
        let stored = state.document.region(&region.id).unwrap();
        assert_eq!(stored.status, RegionStatus::Complete);
        assert!(!stored.tokens.is_empty());
        assert!((state.document.grand_total() - stored.sum).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_overlays_are_projected_to_display() {
        let mut app = app();
        app.begin_capture();
        draw(&mut app, (100.0, 50.0), (300.0, 100.0)).unwrap();

        let overlays = app.active_page_overlays(VIEWPORT);
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays[0].1, Bounds::new(100.0, 50.0, 200.0, 50.0));

        let collapsed = Bounds::new(0.0, 0.0, 0.0, 0.0);
        assert!(app.active_page_overlays(collapsed).is_empty());
    }

    #[tokio::test]
    async fn test_undo_and_pages() {
        let mut app = app();
        app.begin_capture();
        draw(&mut app, (100.0, 50.0), (300.0, 100.0)).unwrap();
        let second = app.add_page(Some("Second"));
        draw(&mut app, (100.0, 50.0), (300.0, 100.0)).unwrap();

        let state = app.state();
        assert_eq!(state.read().document.page(&second).unwrap().region_ids.len(), 1);

        assert!(app.undo_last_region().is_some());
        assert!(app.undo_last_region().is_none());
        assert_eq!(state.read().document.regions().count(), 1);
    }

    #[tokio::test]
    async fn test_watch_loop_and_shutdown() {
        let mut app = app();
        app.start();
        app.begin_capture();
        let region = draw(&mut app, (100.0, 50.0), (300.0, 100.0)).unwrap();
        app.wait_for_recognition().await;

        app.shutdown();
        assert!(app.scheduler().is_shut_down());

        let state = app.state();
        assert_eq!(
            state.read().document.region(&region.id).unwrap().status,
            RegionStatus::Complete
        );
    }

    #[tokio::test]
    async fn test_cancel_capture_drops_draft() {
        let mut app = app();
        app.begin_capture();
        app.pointer_down(Point::new(10.0, 10.0), VIEWPORT);
        assert!(app.draft_display_bounds().is_some());
        app.cancel_capture();
        assert!(app.draft_display_bounds().is_none());
        assert!(app.pointer_up().unwrap().is_none());
    }
}
