//! RegionTally core
//!
//! Capture rectangles over a live screen share, recognize the amounts inside
//! each one and keep signed totals per region, per page, across pages and
//! across an ad-hoc selection.

pub mod app;
pub mod capture;
pub mod config;
pub mod document;
pub mod format;
pub mod id;
pub mod overlay;
pub mod scheduler;
pub mod shared;
pub mod storage;
pub mod vision;

pub use app::RegionTallyApp;
pub use document::{CaptureDocument, CaptureError, Page, Region, RegionStatus, Token};
pub use scheduler::RecognitionScheduler;
