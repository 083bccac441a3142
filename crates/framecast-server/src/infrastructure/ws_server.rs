//! Listener: HTTP routes, WebSocket upgrade, and per-viewer sessions.
//!
//! This module is responsible for:
//!
//! 1. Binding one TCP listener for both WebSocket viewers and status queries.
//! 2. Spawning the [`FrameProducer`] as a managed task.
//! 3. Routing requests: an upgrade request on any path becomes a viewer
//!    session, a plain `GET /status` returns the JSON status, anything else
//!    is `404 Not Found`.
//! 4. Running each viewer session: open event, read loop until close, close
//!    event.
//! 5. Stopping when the shared `running` flag is cleared.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use axum::extract::ws::{close_code, rejection::WebSocketUpgradeRejection, Message as WsMessage};
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use futures_util::StreamExt;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::application::{
    Broadcaster, CaptureSource, Connection, ConnectionRegistry, FrameEncoder, FrameProducer,
    ProducerSettings, ProducerStatus, SessionLifecycle, StatusReporter,
};
use crate::domain::{ConnectionId, ServerConfig};
use crate::infrastructure::capture;
use crate::infrastructure::connection::WsSink;
use crate::infrastructure::encoder::JpegFrameEncoder;

/// How often the shutdown watcher re-checks the `running` flag.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

/// Handles shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: SessionLifecycle,
    pub status: StatusReporter,
}

/// Builds the router for viewers and status queries.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(status_or_viewer).fallback(not_found))
        .fallback(viewer_or_not_found)
        .with_state(state)
}

/// A bound server, ready to run.
pub struct FramecastServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: AppState,
    producer: FrameProducer,
}

impl FramecastServer {
    /// Binds the listener and wires the registry, producer, broadcaster,
    /// status reporter, and lifecycle together.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the listener
    /// cannot be bound (e.g. the port is in use).
    pub async fn bind(
        config: &ServerConfig,
        capture: Box<dyn CaptureSource>,
        encoder: Arc<dyn FrameEncoder>,
    ) -> anyhow::Result<Self> {
        let plan = config
            .transform_plan()
            .context("invalid output configuration")?;

        let listener = TcpListener::bind(config.bind_addr)
            .await
            .with_context(|| format!("failed to bind listener on {}", config.bind_addr))?;
        let local_addr = listener
            .local_addr()
            .context("failed to read bound listener address")?;

        let registry = Arc::new(ConnectionRegistry::new());
        let producer_status = ProducerStatus::new();
        let broadcaster = Arc::new(Broadcaster::new(Arc::clone(&registry)));
        let producer = FrameProducer::new(
            ProducerSettings {
                plan,
                quality: config.quality,
                tick_interval: config.tick_interval,
            },
            capture,
            encoder,
            broadcaster,
            producer_status.clone(),
        );

        Ok(Self {
            listener,
            local_addr,
            state: AppState {
                lifecycle: SessionLifecycle::new(Arc::clone(&registry)),
                status: StatusReporter::new(registry, producer_status),
            },
            producer,
        })
    }

    /// Address the listener is actually bound to (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn status_reporter(&self) -> StatusReporter {
        self.state.status.clone()
    }

    /// Runs the producer and the HTTP server until `running` is cleared.
    ///
    /// A producer that fails to start does not stop the server: sessions
    /// and status queries keep working with the stream idle.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP server fails while serving.
    pub async fn run(self, running: Arc<AtomicBool>) -> anyhow::Result<()> {
        let Self {
            listener,
            local_addr,
            state,
            producer,
        } = self;

        info!("frame server listening on {local_addr}");
        let producer_task = tokio::spawn(producer.run(Arc::clone(&running)));

        let app = build_router(state).into_make_service_with_connect_info::<SocketAddr>();
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_requested(Arc::clone(&running)))
            .await;
        if served.is_err() {
            running.store(false, Ordering::Relaxed);
        }

        match producer_task.await {
            Ok(Ok(stats)) => debug!(?stats, "producer joined"),
            // Already reported when it happened.
            Ok(Err(_)) => {}
            Err(e) => warn!("producer task failed: {e}"),
        }
        served.with_context(|| format!("HTTP server on {local_addr} failed"))
    }
}

/// Builds the production capture source and encoder from `config`, binds,
/// and runs until `running` is cleared.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound.
pub async fn run_server(config: ServerConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    let capture = capture::from_selector(
        &config.capture_device,
        (config.output_width, config.output_height),
    );
    let server = FramecastServer::bind(&config, capture, Arc::new(JpegFrameEncoder::new())).await?;
    server.run(running).await
}

/// Resolves once `running` has been cleared.
async fn shutdown_requested(running: Arc<AtomicBool>) {
    while running.load(Ordering::Relaxed) {
        tokio::time::sleep(SHUTDOWN_POLL).await;
    }
    info!("shutdown flag set; stopping listener");
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /status`, unless the request asks for a WebSocket upgrade.
async fn status_or_viewer(
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Response {
    match upgrade {
        Ok(ws) => accept_viewer(ws, peer, state),
        Err(_) => Json(state.status.status()).into_response(),
    }
}

/// Every other path: viewers may connect anywhere, plain requests get 404.
async fn viewer_or_not_found(
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Response {
    match upgrade {
        Ok(ws) => accept_viewer(ws, peer, state),
        Err(rejection) => {
            debug!("plain request from {peer} on an unknown route ({rejection})");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

fn accept_viewer(ws: WebSocketUpgrade, peer: SocketAddr, state: AppState) -> Response {
    ws.on_failed_upgrade(move |e| debug!("WebSocket upgrade failed with {peer}: {e}"))
        .on_upgrade(move |socket| run_session(socket, peer, state))
}

/// Runs one viewer session from open to close.
///
/// The connection is registered only once the upgrade has completed and is
/// unregistered exactly once, whichever way the session ends.
async fn run_session(socket: WebSocket, peer: SocketAddr, state: AppState) {
    let (ws_tx, mut ws_rx) = socket.split();
    let sink = Arc::new(WsSink::new(ws_tx));
    let id = ConnectionId::new();
    state
        .lifecycle
        .on_open(Connection::new(id, Some(peer), sink.clone()));

    // Viewers have nothing to say; only the end of the stream matters.
    let (code, reason) = loop {
        match ws_rx.next().await {
            Some(Ok(WsMessage::Close(frame))) => {
                break match frame {
                    Some(f) => (f.code, f.reason.as_str().to_owned()),
                    None => (close_code::STATUS, String::new()),
                };
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                debug!(conn = %id, "read error: {e}");
                break (close_code::ABNORMAL, String::new());
            }
            None => break (close_code::ABNORMAL, String::new()),
        }
    };

    state.lifecycle.on_close(id, code, &reason);
    sink.close().await;
}
