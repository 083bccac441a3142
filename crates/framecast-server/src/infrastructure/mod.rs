//! Infrastructure layer for framecast-server.
//!
//! Contains the I/O-facing adapters: capture sources, the JPEG encoder, the
//! TOML configuration layer, and the axum HTTP/WebSocket listener.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain`, and
//! `framecast_core`, but MUST NOT be imported by the `application` or domain
//! layers outside of tests.

pub mod capture;
pub mod config_file;
pub mod connection;
pub mod encoder;
pub mod ws_server;
