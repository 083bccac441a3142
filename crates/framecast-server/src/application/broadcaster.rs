//! Broadcaster: best-effort fan-out of one tick's frames to every viewer.
//!
//! # Snapshot-then-release
//!
//! `broadcast` copies the registry membership under the registry lock and
//! releases the lock before the first send.  Opens and closes therefore
//! proceed while a fan-out is in flight, and a slow viewer never blocks
//! registration of new ones.  The cost is that a viewer closing mid-fan-out
//! may still be attempted for the rest of this tick; the transport reports
//! that as a failed send, which is ignored here.
//!
//! # Failure isolation
//!
//! Each viewer gets its own delivery future, and all of them run
//! concurrently.  Within one viewer the frames go out in tick order.  A
//! viewer whose sends do not finish within the send timeout has the
//! outstanding frames counted as failed, so one stalled peer cannot hold up
//! the others or the producer.
//!
//! A failed send is logged and counted, nothing more: it does not stop
//! delivery to the remaining viewers, is never retried, and never removes
//! the viewer from the registry.  Removal happens only through the close
//! event delivered by the transport.

use std::sync::Arc;
use std::time::Duration;

use framecast_core::WireFrame;
use futures_util::future::join_all;
use tokio::time::timeout;
use tracing::debug;

use crate::application::registry::{Connection, ConnectionRegistry};

/// Upper bound on delivering one tick to one viewer.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(1);

/// Counts from one `broadcast` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections in the snapshot.
    pub recipients: usize,
    /// Send attempts made (`frames * recipients`).
    pub attempts: usize,
    /// Attempts that returned an error or did not finish in time.
    pub failures: usize,
}

/// Delivers frames to every member of a [`ConnectionRegistry`] snapshot.
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
    send_timeout: Duration,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            registry,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Replaces the per-viewer delivery bound.
    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Sends each frame, in order, to each connection of one snapshot.
    ///
    /// Viewers are served concurrently; the call returns once every viewer
    /// has either received the whole batch or hit the send timeout.
    pub async fn broadcast(&self, frames: &[WireFrame]) -> BroadcastReport {
        let recipients = self.registry.snapshot();
        let failures: usize = join_all(recipients.iter().map(|conn| self.deliver(conn, frames)))
            .await
            .into_iter()
            .sum();

        let report = BroadcastReport {
            recipients: recipients.len(),
            attempts: recipients.len() * frames.len(),
            failures,
        };
        if report.recipients > 0 {
            debug!(
                recipients = report.recipients,
                attempts = report.attempts,
                failures = report.failures,
                "broadcast complete"
            );
        }
        report
    }

    /// Sends `frames` to one viewer in order and returns how many failed.
    async fn deliver(&self, conn: &Connection, frames: &[WireFrame]) -> usize {
        let mut started: usize = 0;
        let mut failures = 0;
        let delivery = async {
            for frame in frames {
                started += 1;
                if let Err(e) = conn.sink().send(frame).await {
                    failures += 1;
                    debug!(conn = %conn.id(), error = %e, "send failed; viewer stays registered");
                }
            }
        };
        let timed_out = timeout(self.send_timeout, delivery).await.is_err();

        if timed_out {
            // The send in flight and every frame after it.
            let undelivered = frames.len() - started.saturating_sub(1);
            failures += undelivered;
            debug!(
                conn = %conn.id(),
                undelivered,
                "send timed out; viewer stays registered"
            );
        }
        failures
    }
}
