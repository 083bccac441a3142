//! Application layer for framecast-server.
//!
//! Knows *what* happens on every tick and every open/close event, and
//! delegates *how* (sockets, devices, codecs) to the infrastructure layer
//! through the traits in [`ports`].
//!
//! # Responsibilities
//!
//! - Keeping the set of live viewer connections ([`registry`])
//! - Driving capture → transform → encode on a fixed cadence ([`producer`])
//! - Fanning each tick's frames out to every viewer ([`broadcaster`])
//! - Answering status queries ([`status`])
//! - Applying transport open/close events to the registry ([`lifecycle`])

pub mod broadcaster;
pub mod lifecycle;
pub mod mock;
pub mod ports;
pub mod producer;
pub mod registry;
pub mod status;

pub use broadcaster::{BroadcastReport, Broadcaster};
pub use lifecycle::SessionLifecycle;
pub use ports::{CaptureError, CaptureSource, EncodeError, FrameEncoder, FrameSink, SendError};
pub use producer::{
    FrameProducer, ProducerError, ProducerSettings, ProducerStats, ProducerStatus, TickOutcome,
};
pub use registry::{Connection, ConnectionRegistry};
pub use status::StatusReporter;
