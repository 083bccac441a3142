//! Binary framer for tagged payloads.
//!
//! Wire format:
//! ```text
//! [kind_tag:2][payload:N]
//! ```
//! The tag is a big-endian `u16` (see [`PayloadKind`]).  There is no length
//! prefix: the WebSocket message boundary already delimits the payload.

use thiserror::Error;

use crate::protocol::kind::PayloadKind;

/// Size of the kind tag in bytes.
pub const TAG_SIZE: usize = 2;

/// Errors that can occur while decoding framed payloads or protocol messages.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the tag.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The tag does not name a known payload kind.
    #[error("unknown payload kind tag: 0x{0:04X}")]
    UnknownKind(u16),

    /// A kind name (configuration, CLI) is not recognised.
    #[error("unknown payload kind name: {0:?}")]
    UnknownKindName(String),

    /// A text message is not valid JSON or does not match the schema.
    #[error("malformed text message: {0}")]
    MalformedText(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Prepends the kind tag to `payload`, producing one binary wire message.
///
/// # Examples
///
/// ```rust
/// use framecast_core::protocol::{decode_binary, frame_binary, PayloadKind};
///
/// let wire = frame_binary(PayloadKind::Gray, &[0xFF, 0xD8]);
/// assert_eq!(wire, vec![0x00, 0x02, 0xFF, 0xD8]);
/// assert_eq!(decode_binary(&wire).unwrap(), (PayloadKind::Gray, &[0xFF, 0xD8][..]));
/// ```
pub fn frame_binary(kind: PayloadKind, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(TAG_SIZE + payload.len());
    buf.extend_from_slice(&kind.tag().to_be_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Splits one binary wire message into its kind and payload.
///
/// The returned payload borrows from `bytes`; every byte after the tag
/// belongs to it.
///
/// # Errors
///
/// Returns [`ProtocolError::InsufficientData`] when fewer than [`TAG_SIZE`]
/// bytes are present and [`ProtocolError::UnknownKind`] for an unassigned tag.
pub fn decode_binary(bytes: &[u8]) -> Result<(PayloadKind, &[u8]), ProtocolError> {
    if bytes.len() < TAG_SIZE {
        return Err(ProtocolError::InsufficientData {
            needed: TAG_SIZE,
            available: bytes.len(),
        });
    }
    let tag = u16::from_be_bytes([bytes[0], bytes[1]]);
    let kind = PayloadKind::try_from(tag)?;
    Ok((kind, &bytes[TAG_SIZE..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_binary_prepends_big_endian_tag() {
        let wire = frame_binary(PayloadKind::Color, b"jpeg");
        assert_eq!(&wire[..2], &[0x00, 0x01]);
        assert_eq!(&wire[2..], b"jpeg");
    }

    #[test]
    fn test_frame_binary_has_no_length_prefix() {
        let payload = vec![0xAB; 300];
        let wire = frame_binary(PayloadKind::Gray, &payload);
        assert_eq!(wire.len(), TAG_SIZE + payload.len());
    }

    #[test]
    fn test_round_trip_every_kind() {
        let payload = [1u8, 2, 3, 4, 5];
        for kind in PayloadKind::ALL {
            let wire = frame_binary(kind, &payload);
            let (decoded_kind, decoded_payload) = decode_binary(&wire).expect("decode failed");
            assert_eq!(decoded_kind, kind);
            assert_eq!(decoded_payload, &payload);
        }
    }

    #[test]
    fn test_round_trip_empty_payload() {
        let wire = frame_binary(PayloadKind::Gray, &[]);
        assert_eq!(wire.len(), TAG_SIZE);
        let (kind, payload) = decode_binary(&wire).unwrap();
        assert_eq!(kind, PayloadKind::Gray);
        assert!(payload.is_empty());
    }

    #[test]
    fn test_decode_empty_input_is_insufficient() {
        assert_eq!(
            decode_binary(&[]),
            Err(ProtocolError::InsufficientData {
                needed: 2,
                available: 0
            })
        );
    }

    #[test]
    fn test_decode_single_byte_is_insufficient() {
        assert!(matches!(
            decode_binary(&[0x00]),
            Err(ProtocolError::InsufficientData { available: 1, .. })
        ));
    }

    #[test]
    fn test_decode_unknown_tag() {
        assert_eq!(
            decode_binary(&[0x12, 0x34, 0xFF]),
            Err(ProtocolError::UnknownKind(0x1234))
        );
    }

    #[test]
    fn test_error_display_formats_tag_as_hex() {
        let err = ProtocolError::UnknownKind(0x00AB);
        assert_eq!(err.to_string(), "unknown payload kind tag: 0x00AB");
    }
}
