//! Domain layer for framecast-server.
//!
//! Plain data types shared by the application and infrastructure layers.
//! Nothing here performs I/O, spawns tasks, or reads the environment.

pub mod config;
pub mod connection;
pub mod status;

pub use config::{ConfigError, ServerConfig};
pub use connection::ConnectionId;
pub use status::{StatusReport, StreamState};
