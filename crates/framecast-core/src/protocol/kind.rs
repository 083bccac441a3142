//! Payload kind tags carried at the front of every binary message.
//!
//! The tag table is a convention of framecast, not an external standard.
//! Values are stable once published; new kinds get new values and existing
//! values are never reused.
//!
//! | Tag      | Kind    | Payload                      |
//! |----------|---------|------------------------------|
//! | `0x0001` | `Color` | JPEG, 3-channel RGB          |
//! | `0x0002` | `Gray`  | JPEG, 1-channel luma         |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::protocol::codec::ProtocolError;

/// Identifies what the bytes of a binary frame represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u16)]
pub enum PayloadKind {
    /// Primary full-colour frame.
    Color = 0x0001,
    /// Derived single-channel grayscale frame.
    Gray = 0x0002,
}

impl PayloadKind {
    /// Every kind, in tag order.
    pub const ALL: [PayloadKind; 2] = [PayloadKind::Color, PayloadKind::Gray];

    /// Returns the 16-bit wire tag for this kind.
    pub fn tag(self) -> u16 {
        self as u16
    }

    /// Returns the lowercase name used in configuration and logs.
    pub fn name(self) -> &'static str {
        match self {
            PayloadKind::Color => "color",
            PayloadKind::Gray => "gray",
        }
    }
}

impl TryFrom<u16> for PayloadKind {
    type Error = ProtocolError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x0001 => Ok(PayloadKind::Color),
            0x0002 => Ok(PayloadKind::Gray),
            other => Err(ProtocolError::UnknownKind(other)),
        }
    }
}

impl FromStr for PayloadKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "color" | "colour" => Ok(PayloadKind::Color),
            "gray" | "grey" => Ok(PayloadKind::Gray),
            _ => Err(ProtocolError::UnknownKindName(s.to_string())),
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
