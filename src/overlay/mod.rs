//! Capture overlay lifecycle
//!
//! The overlay moves between `idle`, `capturing` and `reviewing`. Only
//! `capturing` accepts new rectangles; the component owning the drawing
//! surface checks [`CaptureSession::can_draw`]. Transitions report whether
//! the transient selection has to be cleared, and the caller applies that to
//! the document.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Overlay mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMode {
    #[default]
    Idle,
    Capturing,
    Reviewing,
}

/// Result of a session transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: OverlayMode,
    pub to: OverlayMode,
    /// The selection must be reset
    pub clears_selection: bool,
}

/// Capture session state machine
#[derive(Debug, Clone)]
pub struct CaptureSession {
    mode: OverlayMode,
    banner_visible: bool,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self {
            mode: OverlayMode::Idle,
            banner_visible: true,
        }
    }
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> OverlayMode {
        self.mode
    }

    pub fn banner_visible(&self) -> bool {
        self.banner_visible
    }

    /// Whether new regions may be drawn
    pub fn can_draw(&self) -> bool {
        self.mode == OverlayMode::Capturing
    }

    fn transition(&mut self, to: OverlayMode, clears_selection: bool) -> Transition {
        let from = self.mode;
        self.mode = to;
        if from != to {
            info!("Capture overlay {:?} -> {:?}", from, to);
        }
        Transition {
            from,
            to,
            clears_selection,
        }
    }

    /// Enter capture mode from any state; always shows the banner
    pub fn begin_capture(&mut self) -> Transition {
        self.banner_visible = true;
        self.transition(OverlayMode::Capturing, true)
    }

    /// Stop drawing and review the captured regions
    ///
    /// Only valid while capturing; returns `None` otherwise.
    pub fn finish_capture(&mut self) -> Option<Transition> {
        if self.mode != OverlayMode::Capturing {
            return None;
        }
        Some(self.transition(OverlayMode::Reviewing, false))
    }

    /// Leave the overlay from any state
    pub fn cancel_capture(&mut self) -> Transition {
        self.transition(OverlayMode::Idle, true)
    }

    /// Show or hide the banner; `None` flips the current visibility
    pub fn toggle_banner(&mut self, visible: Option<bool>) -> bool {
        self.banner_visible = visible.unwrap_or(!self.banner_visible);
        self.banner_visible
    }
}
