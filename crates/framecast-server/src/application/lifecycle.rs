//! SessionLifecycle: applies transport open/close events to the registry.
//!
//! The transport calls [`SessionLifecycle::on_open`] once the WebSocket
//! handshake completes and [`SessionLifecycle::on_close`] exactly once when
//! the connection ends, for any reason.  Messages received from viewers are
//! not routed here; they are ignored by the transport.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::registry::{Connection, ConnectionRegistry};
use crate::domain::ConnectionId;

/// Registry-facing side of connection handling.
#[derive(Clone)]
pub struct SessionLifecycle {
    registry: Arc<ConnectionRegistry>,
}

impl SessionLifecycle {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Registers a newly opened connection.  Returns `false` if its id was
    /// already registered.
    pub fn on_open(&self, conn: Connection) -> bool {
        let id = conn.id();
        let peer = conn.peer();
        let added = self.registry.add(conn);
        if added {
            info!(
                conn = %id,
                peer = ?peer,
                clients = self.registry.len(),
                "viewer connected"
            );
        } else {
            debug!(conn = %id, "duplicate open ignored");
        }
        added
    }

    /// Unregisters a closed connection.  `code` and `reason` are only logged.
    /// Returns `false` if the connection was not registered.
    pub fn on_close(&self, id: ConnectionId, code: u16, reason: &str) -> bool {
        let removed = self.registry.remove(id);
        if removed {
            info!(
                conn = %id,
                code,
                reason,
                clients = self.registry.len(),
                "viewer disconnected"
            );
        } else {
            debug!(conn = %id, code, "close for unknown connection ignored");
        }
        removed
    }
}
