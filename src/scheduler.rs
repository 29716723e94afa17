//! Recognition Scheduler
//!
//! Watches the document for pending regions and runs at most one recognition
//! job per region at a time. Each job is a tokio task that crops the region
//! from the latest frame, hands it to the recognizer and feeds the tokens
//! back into the document.
//!
//! In-flight regions are tracked in an explicit set instead of trusting the
//! region status, because other mutators can reset a status to `Pending`
//! while its job is still running.
//!
//! Lock order is always: capture state, then in-flight set, then job handles.

use anyhow::{Context, Result};
use image::RgbaImage;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::capture::{Bounds, CapturedFrame, FrameSource};
use crate::config::{OcrPreprocessing, RecognitionSettings};
use crate::document::RegionStatus;
use crate::id::RegionId;
use crate::shared::SharedCaptureState;
use crate::vision::{
    apply_preprocessing, tokenize, Recognition, RecognitionError, RecognitionRequest, Recognizer,
};

/// How often [`RecognitionScheduler::wait_until_idle`] re-checks
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(20);

struct SchedulerInner {
    state: SharedCaptureState,
    frames: Arc<dyn FrameSource>,
    recognizer: Arc<dyn Recognizer>,
    language: String,
    preprocessing: OcrPreprocessing,
    in_flight: Mutex<HashSet<RegionId>>,
    jobs: Mutex<HashMap<RegionId, JoinHandle<()>>>,
    cancel: CancellationToken,
    runtime: Handle,
}

/// Dispatches recognition jobs for pending regions
///
/// Cloning gives another handle to the same scheduler.
#[derive(Clone)]
pub struct RecognitionScheduler {
    inner: Arc<SchedulerInner>,
}

impl RecognitionScheduler {
    /// Create a scheduler bound to the current tokio runtime
    pub fn new(
        state: SharedCaptureState,
        frames: Arc<dyn FrameSource>,
        recognizer: Arc<dyn Recognizer>,
        settings: &RecognitionSettings,
    ) -> Result<Self> {
        let runtime =
            Handle::try_current().context("Recognition scheduler requires a tokio runtime")?;

        Ok(Self {
            inner: Arc::new(SchedulerInner {
                state,
                frames,
                recognizer,
                language: settings.language.clone(),
                preprocessing: settings.preprocessing.clone(),
                in_flight: Mutex::new(HashSet::new()),
                jobs: Mutex::new(HashMap::new()),
                cancel: CancellationToken::new(),
                runtime,
            }),
        })
    }

    /// Dispatch a job for every pending region that has none in flight
    ///
    /// The region flips to `Processing` in the same step, under the state
    /// lock. Returns the number of jobs started.
    pub fn scan(&self) -> usize {
        let inner = &self.inner;
        if inner.cancel.is_cancelled() {
            return 0;
        }

        let mut state = inner.state.write();
        let mut in_flight = inner.in_flight.lock();
        let mut jobs = inner.jobs.lock();

        let mut dispatched = 0;
        for region_id in state.document.pending_region_ids() {
            if in_flight.contains(&region_id) {
                continue;
            }
            let Some(bounds) = state.document.region(&region_id).map(|r| r.bounds) else {
                continue;
            };

            in_flight.insert(region_id.clone());
            state
                .document
                .set_region_status(&region_id, RegionStatus::Processing);

            let handle = self.dispatch(region_id.clone(), bounds);
            jobs.insert(region_id, handle);
            dispatched += 1;
        }

        if dispatched > 0 {
            debug!("Dispatched {} recognition jobs ({} in flight)", dispatched, in_flight.len());
        }
        dispatched
    }

    fn dispatch(&self, region_id: RegionId, bounds: Bounds) -> JoinHandle<()> {
        let inner = self.inner.clone();
        let frame = inner.frames.latest_frame();

        self.inner.runtime.spawn(async move {
            let outcome = inner.recognize_region(frame, bounds).await;
            inner.complete(&region_id, outcome);
        })
    }

    /// Periodically scan for pending regions until shutdown
    pub fn spawn_watch(&self, interval: Duration) -> JoinHandle<()> {
        let scheduler = self.clone();
        let interval = interval.max(Duration::from_millis(1));

        self.inner.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = scheduler.inner.cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        scheduler.scan();
                    }
                }
            }
            debug!("Recognition watch loop stopped");
        })
    }

    /// Whether a job for `region_id` is running
    pub fn is_in_flight(&self, region_id: &RegionId) -> bool {
        self.inner.in_flight.lock().contains(region_id)
    }

    pub fn in_flight_count(&self) -> usize {
        self.inner.in_flight.lock().len()
    }

    /// No job running and no region waiting for one
    pub fn is_idle(&self) -> bool {
        let state = self.inner.state.read();
        let no_jobs = self.inner.in_flight.lock().is_empty();
        no_jobs && state.document.pending_region_ids().is_empty()
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Scan until every pending region has settled, or the scheduler stops
    pub async fn wait_until_idle(&self) {
        loop {
            if self.is_shut_down() || self.is_idle() {
                return;
            }
            self.scan();
            tokio::time::sleep(IDLE_POLL_INTERVAL).await;
        }
    }

    /// Cancel every outstanding job and forget the in-flight set
    ///
    /// Results arriving afterwards are discarded. Regions whose job was
    /// cancelled go back to `Pending` so a later scheduler picks them up.
    pub fn shutdown(&self) {
        let inner = &self.inner;
        let mut state = inner.state.write();
        if inner.cancel.is_cancelled() {
            return;
        }
        inner.cancel.cancel();

        for (_, handle) in inner.jobs.lock().drain() {
            handle.abort();
        }

        let mut in_flight = inner.in_flight.lock();
        let cancelled = in_flight.len();
        for region_id in in_flight.drain() {
            let processing = state
                .document
                .region(&region_id)
                .is_some_and(|region| region.status == RegionStatus::Processing);
            if processing {
                state.document.set_region_status(&region_id, RegionStatus::Pending);
            }
        }

        info!("Recognition scheduler stopped ({} jobs cancelled)", cancelled);
    }
}

impl SchedulerInner {
    async fn recognize_region(
        &self,
        frame: Option<Arc<CapturedFrame>>,
        bounds: Bounds,
    ) -> Result<Recognition, RecognitionError> {
        let request = RecognitionRequest {
            image: prepare_image(frame.as_deref(), bounds, &self.preprocessing)?,
            language: self.language.clone(),
        };

        tokio::select! {
            _ = self.cancel.cancelled() => Err(RecognitionError::Cancelled),
            result = self.recognizer.recognize(request) => result,
        }
    }

    fn complete(&self, region_id: &RegionId, outcome: Result<Recognition, RecognitionError>) {
        let mut state = self.state.write();
        if self.cancel.is_cancelled() {
            debug!("Discarding recognition result for region {} after shutdown", region_id);
            return;
        }

        match outcome {
            Ok(recognition) => {
                let tokens = tokenize(&recognition.text, recognition.confidence);
                debug!(
                    "Recognized {} fragments in region {} (confidence {:?})",
                    tokens.len(),
                    region_id,
                    recognition.confidence
                );
                state.document.update_region_tokens(region_id, tokens);
            }
            Err(RecognitionError::Cancelled) => {
                debug!("Recognition cancelled for region {}", region_id);
            }
            Err(err) => {
                warn!("Recognition failed for region {}: {}", region_id, err);
                state.document.set_region_status(region_id, RegionStatus::Failed);
            }
        }

        self.in_flight.lock().remove(region_id);
        self.jobs.lock().remove(region_id);
    }
}

/// Crop the region out of the frame and apply preprocessing
fn prepare_image(
    frame: Option<&CapturedFrame>,
    bounds: Bounds,
    preprocessing: &OcrPreprocessing,
) -> Result<RgbaImage, RecognitionError> {
    let frame = frame.ok_or(RecognitionError::NoFrame)?;
    let image = frame.crop(bounds).ok_or_else(|| {
        RecognitionError::Image(format!(
            "bounds ({:.0}, {:.0}) {:.0}x{:.0} outside {}x{} frame",
            bounds.x, bounds.y, bounds.width, bounds.height, frame.width, frame.height
        ))
    })?;
    Ok(apply_preprocessing(image, preprocessing))
}
