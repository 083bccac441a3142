//! # framecast-core
//!
//! Shared library for the framecast live frame stream containing the wire
//! protocol and the pure image pipeline that turns one captured frame into
//! the variants that are broadcast to viewers.
//!
//! It has no dependencies on sockets, async runtimes, or capture hardware.
//!
//! # Architecture overview
//!
//! framecast pushes a live image stream to every connected WebSocket viewer.
//! A single producer captures a frame, derives a small set of variants from
//! it (for example a colour and a grayscale copy), compresses each one, and
//! fans the results out to all subscribers.
//!
//! - **`protocol`** – How payloads travel over the wire.  Binary messages
//!   carry a 2-byte [`PayloadKind`] tag followed by the compressed image;
//!   text messages carry a JSON [`FrameInfo`] record.
//!
//! - **`domain`** – The captured [`Frame`] and the deterministic transforms
//!   (resize, grayscale) that produce each [`Variant`].

pub mod domain;
pub mod protocol;

pub use domain::frame::{Frame, TransformError};
pub use domain::variant::{derive_variants, TransformPlan, Variant, VariantImage};
pub use protocol::codec::{decode_binary, frame_binary, ProtocolError};
pub use protocol::kind::PayloadKind;
pub use protocol::messages::{epoch_millis, saturating_millis, FrameInfo, TextMessage, WireFrame};
