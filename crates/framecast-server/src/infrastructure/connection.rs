//! WebSocket implementation of the [`FrameSink`] port.
//!
//! The write half of each session is shared between the broadcaster and the
//! session task (which sends the close acknowledgement), so it lives behind
//! an async mutex.  A whole message is written under one lock acquisition,
//! so frames from different writers never interleave.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use framecast_core::WireFrame;
use futures_util::stream::SplitSink;
use futures_util::SinkExt;
use tokio::sync::Mutex;

use crate::application::ports::{FrameSink, SendError};

/// Write half of an upgraded viewer connection.
pub type WsWriter = SplitSink<WebSocket, WsMessage>;

/// Sends [`WireFrame`]s as WebSocket messages.
pub struct WsSink {
    writer: Arc<Mutex<WsWriter>>,
}

impl WsSink {
    pub fn new(writer: WsWriter) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    /// Sends a close frame and flushes.  Errors are ignored: the peer may
    /// already be gone.
    pub async fn close(&self) {
        let mut writer = self.writer.lock().await;
        let _ = writer.close().await;
    }
}

/// Maps a [`WireFrame`] to the WebSocket message type it travels as.
pub fn to_ws_message(frame: &WireFrame) -> WsMessage {
    match frame {
        WireFrame::Binary(bytes) => WsMessage::Binary(bytes.clone().into()),
        WireFrame::Text(text) => WsMessage::Text(text.clone().into()),
    }
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send(&self, frame: &WireFrame) -> Result<(), SendError> {
        let mut writer = self.writer.lock().await;
        writer
            .send(to_ws_message(frame))
            .await
            .map_err(|e| SendError::Transport(e.to_string()))
    }
}
