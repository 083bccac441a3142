//! Connection identity.

use std::fmt;

use uuid::Uuid;

/// Identity of one viewer connection, assigned when its socket is accepted.
///
/// Registry membership is unique by this value; two handles with the same
/// id are the same connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ConnectionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The first block of the UUID is enough to tell viewers apart in logs.
        let s = self.0.simple().to_string();
        f.write_str(&s[..8])
    }
}
