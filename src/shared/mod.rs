//! Shared state between the capture overlay and the recognition scheduler
//!
//! All mutation goes through an explicit state object behind a lock; there
//! is no global store.

pub mod state;

pub use state::{CaptureState, SharedCaptureState};
