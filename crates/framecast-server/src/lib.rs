//! framecast-server library crate.
//!
//! A single producer captures frames, derives colour and grayscale variants,
//! JPEG-encodes them, and pushes every result to all connected WebSocket
//! viewers.  A `GET /status` query on the same port reports how many viewers
//! are connected.
//!
//! # Architecture
//!
//! ```text
//! Capture source ──► FrameProducer ──► Broadcaster ──► every registered viewer
//!                                           ▲
//!                       ConnectionRegistry ─┘◄── open/close events (ws_server)
//!                               │
//!                       StatusReporter ──► GET /status
//!
//! [framecast-server]
//!   ├── domain/           Pure types: ServerConfig, StatusReport, ConnectionId
//!   ├── application/      Registry, producer, broadcaster, status, lifecycle
//!   └── infrastructure/
//!         ├── ws_server   axum router: /status, WebSocket upgrade, viewer sessions
//!         ├── connection  WebSocket FrameSink
//!         ├── capture/    Capture sources (synthetic pattern, mock)
//!         ├── encoder     JPEG encoder (image)
//!         └── config_file TOML configuration layer
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain`, `framecast-core`, and the port traits
//!   it defines in `application::ports`; it never touches sockets.
//! - `infrastructure` implements the ports and owns all network and device I/O.

/// Domain layer: configuration, status, and identity types (no I/O).
pub mod domain;

/// Application layer: registry, fan-out, producer loop, status queries.
pub mod application;

/// Infrastructure layer: WebSocket/HTTP server, capture sources, encoder.
pub mod infrastructure;
