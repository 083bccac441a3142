//! Protocol module containing payload kinds, message types, and the binary framer.

pub mod codec;
pub mod kind;
pub mod messages;

pub use codec::{decode_binary, frame_binary, ProtocolError, TAG_SIZE};
pub use kind::PayloadKind;
pub use messages::{epoch_millis, saturating_millis, FrameInfo, TextMessage, WireFrame};
