//! Message types sent to viewers.
//!
//! Every tick the producer emits one binary message per encoded variant and,
//! after them, one JSON text message describing the batch:
//!
//! ```json
//! {"type":"frameInfo","timestamp":1718000000123}
//! ```
//!
//! Text messages are serialized independently of the binary tag scheme.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::protocol::codec::{decode_binary, frame_binary, ProtocolError};
use crate::protocol::kind::PayloadKind;

/// Returns the current wall-clock time in milliseconds since the Unix epoch.
pub fn epoch_millis() -> u64 {
    saturating_millis(SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default())
}

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
pub fn saturating_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Metadata describing the most recent frame batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInfo {
    /// Capture time of the batch, milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl FrameInfo {
    /// Creates a record stamped with the given capture time.
    pub fn new(timestamp: u64) -> Self {
        Self { timestamp }
    }
}

/// All JSON text messages a viewer can receive.
///
/// The `type` field is the discriminant; variant fields are flattened next
/// to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TextMessage {
    #[serde(rename = "frameInfo")]
    FrameInfo(FrameInfo),
}

impl TextMessage {
    /// Serializes the message to its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedText`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::MalformedText(e.to_string()))
    }

    /// Parses a JSON text message.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedText`] for invalid JSON or an
    /// unknown `type`.
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(json).map_err(|e| ProtocolError::MalformedText(e.to_string()))
    }
}

/// One transmission unit, created fresh for each tick and dropped after send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireFrame {
    /// Tagged binary payload: `[kind:2][bytes]`.
    Binary(Vec<u8>),
    /// JSON text message.
    Text(String),
}

impl WireFrame {
    /// Frames an encoded payload under its kind tag.
    pub fn payload(kind: PayloadKind, bytes: &[u8]) -> Self {
        WireFrame::Binary(frame_binary(kind, bytes))
    }

    /// Serializes a text message into a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedText`] if serialization fails.
    pub fn text(msg: &TextMessage) -> Result<Self, ProtocolError> {
        msg.to_json().map(WireFrame::Text)
    }

    /// Returns the payload kind of a binary frame, or `None` for text frames
    /// and binary frames with an unrecognised tag.
    pub fn kind(&self) -> Option<PayloadKind> {
        match self {
            WireFrame::Binary(bytes) => decode_binary(bytes).ok().map(|(kind, _)| kind),
            WireFrame::Text(_) => None,
        }
    }

    /// Number of bytes that go on the wire for this frame.
    pub fn len(&self) -> usize {
        match self {
            WireFrame::Binary(bytes) => bytes.len(),
            WireFrame::Text(text) => text.len(),
        }
    }

    /// Returns `true` if the frame carries no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_millis() {
        assert_eq!(saturating_millis(Duration::from_millis(25)), 25);
        assert_eq!(saturating_millis(Duration::from_micros(1_999)), 1);
        assert_eq!(saturating_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_frame_info_json_schema() {
        let msg = TextMessage::FrameInfo(FrameInfo::new(1_718_000_000_123));
        let json = msg.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "frameInfo");
        assert_eq!(value["timestamp"], 1_718_000_000_123u64);
        assert_eq!(value.as_object().map(|o| o.len()), Some(2));
    }

    #[test]
    fn test_frame_info_parses_reference_format() {
        let msg = TextMessage::from_json(r#"{"type": "frameInfo", "timestamp": 42}"#).unwrap();
        assert_eq!(msg, TextMessage::FrameInfo(FrameInfo::new(42)));
    }

    #[test]
    fn test_unknown_text_type_is_error() {
        let result = TextMessage::from_json(r#"{"type":"other","timestamp":1}"#);
        assert!(matches!(result, Err(ProtocolError::MalformedText(_))));
    }

    #[test]
    fn test_timestamp_must_be_integer() {
        let result = TextMessage::from_json(r#"{"type":"frameInfo","timestamp":"42"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_wire_frame_payload_kind() {
        let frame = WireFrame::payload(PayloadKind::Gray, &[9, 9]);
        assert_eq!(frame.kind(), Some(PayloadKind::Gray));
        assert_eq!(frame.len(), 4);
    }

    #[test]
    fn test_wire_frame_text_has_no_kind() {
        let frame = WireFrame::text(&TextMessage::FrameInfo(FrameInfo::new(1))).unwrap();
        assert_eq!(frame.kind(), None);
        assert!(matches!(frame, WireFrame::Text(ref s) if s.contains("frameInfo")));
    }

    #[test]
    fn test_epoch_millis_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(epoch_millis() > 1_577_836_800_000);
    }
}
