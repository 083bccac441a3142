//! ConnectionRegistry: the set of viewers that currently receive frames.
//!
//! A connection is a member if and only if its open event has fired and its
//! close event has not yet completed.  Every operation, including
//! [`ConnectionRegistry::snapshot`], takes the same exclusive lock, so no
//! caller ever observes a partially updated set.
//!
//! The lock is a `std::sync::Mutex`: no operation awaits while holding it,
//! and fan-out works on a snapshot copy so the lock is released before any
//! network send starts.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::application::ports::FrameSink;
use crate::domain::ConnectionId;

/// A registered viewer: its identity plus a handle to its send half.
///
/// Cloning is cheap; clones share the same sink.
#[derive(Clone)]
pub struct Connection {
    id: ConnectionId,
    peer: Option<SocketAddr>,
    sink: Arc<dyn FrameSink>,
}

impl Connection {
    pub fn new(id: ConnectionId, peer: Option<SocketAddr>, sink: Arc<dyn FrameSink>) -> Self {
        Self { id, peer, sink }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    pub fn sink(&self) -> &Arc<dyn FrameSink> {
        &self.sink
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Members {
    /// Insertion counter; gives snapshots a stable registry order.
    next_seq: u64,
    entries: HashMap<ConnectionId, (u64, Connection)>,
}

/// Concurrency-safe set of live connections, unique by [`ConnectionId`].
#[derive(Default)]
pub struct ConnectionRegistry {
    members: Mutex<Members>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `conn`.  Returns `false` and leaves the set unchanged if a
    /// connection with the same id is already a member.
    pub fn add(&self, conn: Connection) -> bool {
        let mut members = self.lock();
        if members.entries.contains_key(&conn.id) {
            return false;
        }
        let seq = members.next_seq;
        members.next_seq += 1;
        members.entries.insert(conn.id, (seq, conn));
        true
    }

    /// Removes the connection with `id`.  Returns `false` if it was not a
    /// member.  Never fails.
    pub fn remove(&self, id: ConnectionId) -> bool {
        self.lock().entries.remove(&id).is_some()
    }

    /// Returns `true` if `id` is currently registered.
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.lock().entries.contains_key(&id)
    }

    /// Current member count.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time copy of all members, oldest registration first.
    ///
    /// The lock is released before this returns; callers may iterate and
    /// await freely.
    pub fn snapshot(&self) -> Vec<Connection> {
        let members = self.lock();
        let mut ordered: Vec<&(u64, Connection)> = members.entries.values().collect();
        ordered.sort_unstable_by_key(|(seq, _)| *seq);
        ordered.into_iter().map(|(_, conn)| conn.clone()).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Members> {
        // Every critical section leaves `Members` consistent, so a panic in
        // another holder does not invalidate the data.
        self.members
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
