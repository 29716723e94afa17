//! Shared capture state between the overlay, panels and scheduler

use parking_lot::RwLock;
use std::sync::Arc;

use crate::document::CaptureDocument;
use crate::overlay::{CaptureSession, Transition};

/// Handle to the capture state shared across components and tasks
pub type SharedCaptureState = Arc<RwLock<CaptureState>>;

/// Central capture state: the durable document plus the overlay session
#[derive(Debug, Clone, Default)]
pub struct CaptureState {
    /// Pages, regions and selection
    pub document: CaptureDocument,
    /// Overlay lifecycle
    pub session: CaptureSession,
}

impl CaptureState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap into a shared handle
    pub fn shared(self) -> SharedCaptureState {
        Arc::new(RwLock::new(self))
    }

    fn apply(&mut self, transition: Transition) -> Transition {
        if transition.clears_selection {
            self.document.reset_selection();
        }
        transition
    }

    pub fn begin_capture(&mut self) -> Transition {
        let transition = self.session.begin_capture();
        self.apply(transition)
    }

    pub fn finish_capture(&mut self) -> Option<Transition> {
        let transition = self.session.finish_capture()?;
        Some(self.apply(transition))
    }

    pub fn cancel_capture(&mut self) -> Transition {
        let transition = self.session.cancel_capture();
        self.apply(transition)
    }
}
