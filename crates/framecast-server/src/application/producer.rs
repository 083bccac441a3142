//! FrameProducer: the capture → transform → encode → broadcast loop.
//!
//! One producer runs per server as a managed Tokio task:
//!
//! 1. Open the capture source once.  Failure is fatal: it is logged once,
//!    the stream stays [`StreamState::Idle`], and `run` returns an error.
//!    There is no retry.
//! 2. Each tick, grab a frame.  Grab, transform and encode run on the
//!    blocking pool so a slow driver or codec never stalls the runtime.  Empty frames and read errors are skipped and
//!    the next grab happens immediately (after a cooperative yield, no sleep).
//! 3. Resize and derive every configured variant ([`TransformPlan`]).
//! 4. Encode each variant independently.  A variant whose encode fails is
//!    dropped for this tick; the others are still sent.
//! 5. Frame each encoded variant under its kind tag, append one `frameInfo`
//!    text message, and hand the batch to the [`Broadcaster`].
//! 6. Sleep for the tick interval.
//!
//! The loop checks the shared `running` flag at the top of every tick and
//! exits cleanly once it is cleared.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use framecast_core::{Frame, FrameInfo, TextMessage, TransformPlan, WireFrame};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::application::broadcaster::{BroadcastReport, Broadcaster};
use crate::application::ports::{CaptureError, CaptureSource, FrameEncoder};
use crate::domain::StreamState;

/// Error type for the producer task.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProducerError {
    /// The capture source could not be opened; the stream never started.
    #[error("capture source unavailable: {0}")]
    CaptureUnavailable(#[source] CaptureError),
}

/// Shared, lock-free view of the producer's [`StreamState`].
///
/// The producer writes it; the status reporter reads it.
#[derive(Debug, Clone, Default)]
pub struct ProducerStatus {
    state: Arc<AtomicU8>,
}

const STATE_IDLE: u8 = 0;
const STATE_STREAMING: u8 = 1;

impl ProducerStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> StreamState {
        match self.state.load(Ordering::Acquire) {
            STATE_STREAMING => StreamState::Streaming,
            _ => StreamState::Idle,
        }
    }

    fn set(&self, state: StreamState) {
        let raw = match state {
            StreamState::Idle => STATE_IDLE,
            StreamState::Streaming => STATE_STREAMING,
        };
        self.state.store(raw, Ordering::Release);
    }
}

/// Fixed per-run settings.
#[derive(Debug, Clone)]
pub struct ProducerSettings {
    pub plan: TransformPlan,
    pub quality: u8,
    pub tick_interval: Duration,
}

/// Counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    /// Ticks that produced at least one frame and broadcast it.
    pub ticks: u64,
    /// Grabs that returned nothing usable.
    pub frames_skipped: u64,
    /// Individual variant encodes that failed.
    pub encode_failures: u64,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No usable frame; retry immediately.
    Skipped,
    /// A frame was captured but no variant could be encoded; nothing sent.
    NothingEncoded,
    /// Frames were handed to the broadcaster.
    Broadcast(BroadcastReport),
}

/// What the blocking half of a tick hands back.
struct Produced {
    frames: Vec<WireFrame>,
    encode_failures: u64,
}

type SharedCapture = Arc<Mutex<Box<dyn CaptureSource>>>;

fn lock_capture(capture: &SharedCapture) -> MutexGuard<'_, Box<dyn CaptureSource>> {
    // Never held across an await. A panicked grab leaves the source usable
    // for the next attempt.
    capture.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives the capture pipeline and feeds the broadcaster.
///
/// Device I/O and encoding run on Tokio's blocking pool; only the broadcast
/// runs on the async workers.
pub struct FrameProducer {
    capture: SharedCapture,
    encoder: Arc<dyn FrameEncoder>,
    broadcaster: Arc<Broadcaster>,
    settings: ProducerSettings,
    status: ProducerStatus,
    stats: ProducerStats,
}

impl FrameProducer {
    pub fn new(
        settings: ProducerSettings,
        capture: Box<dyn CaptureSource>,
        encoder: Arc<dyn FrameEncoder>,
        broadcaster: Arc<Broadcaster>,
        status: ProducerStatus,
    ) -> Self {
        Self {
            capture: Arc::new(Mutex::new(capture)),
            encoder,
            broadcaster,
            settings,
            status,
            stats: ProducerStats::default(),
        }
    }

    pub fn stats(&self) -> ProducerStats {
        self.stats
    }

    /// Runs until `running` is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`ProducerError::CaptureUnavailable`] if the capture source
    /// cannot be opened.  The failure has already been logged when this
    /// returns.
    pub async fn run(mut self, running: Arc<AtomicBool>) -> Result<ProducerStats, ProducerError> {
        let device = lock_capture(&self.capture).describe();
        let capture = Arc::clone(&self.capture);
        let opened = tokio::task::spawn_blocking(move || lock_capture(&capture).open())
            .await
            .unwrap_or_else(|e| {
                Err(CaptureError::DeviceUnavailable {
                    device: device.clone(),
                    reason: e.to_string(),
                })
            });
        if let Err(e) = opened {
            error!(device = %device, error = %e, "cannot open capture source; stream will not start");
            self.status.set(StreamState::Idle);
            return Err(ProducerError::CaptureUnavailable(e));
        }

        self.status.set(StreamState::Streaming);
        let (width, height) = self.settings.plan.output_size();
        info!(
            device = %device,
            width,
            height,
            quality = self.settings.quality,
            tick_interval = ?self.settings.tick_interval,
            "frame producer streaming"
        );

        while running.load(Ordering::Relaxed) {
            match self.tick().await {
                TickOutcome::Skipped => {
                    tokio::task::yield_now().await;
                    continue;
                }
                TickOutcome::NothingEncoded | TickOutcome::Broadcast(_) => {}
            }
            tokio::time::sleep(self.settings.tick_interval).await;
        }

        self.status.set(StreamState::Idle);
        info!(
            ticks = self.stats.ticks,
            skipped = self.stats.frames_skipped,
            encode_failures = self.stats.encode_failures,
            "frame producer stopped"
        );
        Ok(self.stats)
    }

    /// Performs one capture → broadcast step without sleeping.
    pub async fn tick(&mut self) -> TickOutcome {
        let capture = Arc::clone(&self.capture);
        let encoder = Arc::clone(&self.encoder);
        let plan = self.settings.plan.clone();
        let quality = self.settings.quality;

        let work = tokio::task::spawn_blocking(move || {
            let grabbed = lock_capture(&capture).grab();
            match grabbed {
                Ok(Some(frame)) if !frame.is_empty() => {
                    Some(produce(&plan, encoder.as_ref(), quality, &frame))
                }
                Ok(_) => None,
                Err(e) => {
                    debug!(error = %e, "capture read failed; skipping frame");
                    None
                }
            }
        })
        .await;

        let produced = match work {
            Ok(Some(produced)) => produced,
            Ok(None) => {
                self.stats.frames_skipped += 1;
                return TickOutcome::Skipped;
            }
            Err(e) => {
                warn!(error = %e, "capture task failed; dropping tick");
                return TickOutcome::NothingEncoded;
            }
        };

        self.stats.encode_failures += produced.encode_failures;
        if produced.frames.is_empty() {
            return TickOutcome::NothingEncoded;
        }

        let report = self.broadcaster.broadcast(&produced.frames).await;
        self.stats.ticks += 1;
        TickOutcome::Broadcast(report)
    }
}

/// Transforms, encodes, and frames one captured frame.
///
/// The frames are the binary variants in plan order followed by the
/// `frameInfo` text frame, or nothing if no variant could be encoded.
fn produce(plan: &TransformPlan, encoder: &dyn FrameEncoder, quality: u8, frame: &Frame) -> Produced {
    let mut produced = Produced {
        frames: Vec::new(),
        encode_failures: 0,
    };
    let variants = match plan.apply(frame) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "frame transform failed; dropping frame");
            return produced;
        }
    };

    produced.frames.reserve(variants.len() + 1);
    for variant in &variants {
        match encoder.encode(&variant.image, quality) {
            Ok(bytes) => produced.frames.push(WireFrame::payload(variant.kind, &bytes)),
            Err(e) => {
                produced.encode_failures += 1;
                warn!(kind = %variant.kind, error = %e, "variant encode failed; dropped for this tick");
            }
        }
    }

    if produced.frames.is_empty() {
        return produced;
    }

    let info = TextMessage::FrameInfo(FrameInfo::new(frame.captured_at_ms()));
    match WireFrame::text(&info) {
        Ok(text) => produced.frames.push(text),
        Err(e) => warn!(error = %e, "failed to serialize frameInfo"),
    }
    produced
}
