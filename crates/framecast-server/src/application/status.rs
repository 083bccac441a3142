//! StatusReporter: answers `GET /status`.
//!
//! The HTTP route serializes the returned [`StatusReport`] as its JSON body.

use std::sync::Arc;

use crate::application::producer::ProducerStatus;
use crate::application::registry::ConnectionRegistry;
use crate::domain::StatusReport;

/// Read-only view over the registry size and the producer state.
#[derive(Clone)]
pub struct StatusReporter {
    registry: Arc<ConnectionRegistry>,
    producer: ProducerStatus,
}

impl StatusReporter {
    pub fn new(registry: Arc<ConnectionRegistry>, producer: ProducerStatus) -> Self {
        Self { registry, producer }
    }

    /// Current status.  `clients` is the registry size at call time.
    pub fn status(&self) -> StatusReport {
        StatusReport::running(self.registry.len(), self.producer.get())
    }
}
