//! framecast-server: live frame broadcast server, entry point.
//!
//! Captures frames from a device, derives a colour and a grayscale variant,
//! JPEG-encodes both, and pushes them to every connected WebSocket viewer on
//! a fixed cadence.  `GET /status` on the same port reports the viewer count.
//!
//! # Usage
//!
//! ```text
//! framecast-server [OPTIONS]
//!
//! Options:
//!   --config   <PATH>    Optional TOML config file
//!   --bind     <IP>      Interface to listen on          [default: 0.0.0.0]
//!   --port     <PORT>    Listener port                   [default: 9001]
//!   --device   <SEL>     Capture device selector         [default: synthetic]
//!   --quality  <1-100>   JPEG quality                    [default: 80]
//!   --tick-ms  <MS>      Pause between frames            [default: 25]
//!   --width    <PX>      Output width                    [default: 640]
//!   --height   <PX>      Output height                   [default: 480]
//!   --variants <LIST>    Comma-separated variants        [default: color,gray]
//! ```
//!
//! # Configuration precedence
//!
//! Built-in defaults, then the `--config` file, then flags and their
//! environment variables.  Flags win over environment variables.
//!
//! | Variable            | Flag         |
//! |---------------------|--------------|
//! | `FRAMECAST_CONFIG`  | `--config`   |
//! | `FRAMECAST_BIND`    | `--bind`     |
//! | `FRAMECAST_PORT`    | `--port`     |
//! | `FRAMECAST_DEVICE`  | `--device`   |
//! | `FRAMECAST_QUALITY` | `--quality`  |
//! | `FRAMECAST_TICK_MS` | `--tick-ms`  |
//! | `FRAMECAST_WIDTH`   | `--width`    |
//! | `FRAMECAST_HEIGHT`  | `--height`   |
//! | `FRAMECAST_VARIANTS`| `--variants` |
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use framecast_core::PayloadKind;
use tracing::info;
use tracing_subscriber::EnvFilter;

use framecast_server::domain::ServerConfig;
use framecast_server::infrastructure::config_file::ConfigFile;
use framecast_server::infrastructure::ws_server::run_server;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Live frame broadcast server.
///
/// Every option is optional; anything not given falls back to the config
/// file, then to the built-in default.
#[derive(Debug, Default, Parser)]
#[command(
    name = "framecast-server",
    about = "Capture, encode, and broadcast frames to WebSocket viewers",
    version
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, env = "FRAMECAST_CONFIG")]
    config: Option<PathBuf>,

    /// IP address to listen on.  `0.0.0.0` accepts connections on every
    /// interface.
    #[arg(long, env = "FRAMECAST_BIND")]
    bind: Option<IpAddr>,

    /// TCP port for WebSocket viewers and status queries.
    #[arg(long, env = "FRAMECAST_PORT")]
    port: Option<u16>,

    /// Capture device selector: `synthetic` or `synthetic:WIDTHxHEIGHT`.
    #[arg(long, env = "FRAMECAST_DEVICE")]
    device: Option<String>,

    /// JPEG quality.  Values outside 1–100 are clamped.
    #[arg(long, env = "FRAMECAST_QUALITY")]
    quality: Option<u8>,

    /// Pause between producer ticks, in milliseconds.
    #[arg(long, env = "FRAMECAST_TICK_MS")]
    tick_ms: Option<u64>,

    /// Width frames are scaled to before encoding.
    #[arg(long, env = "FRAMECAST_WIDTH")]
    width: Option<u32>,

    /// Height frames are scaled to before encoding.
    #[arg(long, env = "FRAMECAST_HEIGHT")]
    height: Option<u32>,

    /// Variants to emit each tick, in order, e.g. `color,gray`.
    #[arg(long, env = "FRAMECAST_VARIANTS", value_delimiter = ',')]
    variants: Option<Vec<PayloadKind>>,
}

impl Cli {
    /// Layers defaults, the optional config file, and these arguments into a
    /// validated [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or the final
    /// configuration is invalid.
    fn into_server_config(self) -> anyhow::Result<ServerConfig> {
        let mut config = ServerConfig::default();

        if let Some(path) = &self.config {
            ConfigFile::load(path)
                .and_then(|file| file.apply_to(&mut config))
                .with_context(|| format!("failed to load config file {}", path.display()))?;
        }

        if let Some(ip) = self.bind {
            config.bind_addr.set_ip(ip);
        }
        if let Some(port) = self.port {
            config.bind_addr.set_port(port);
        }
        if let Some(device) = self.device {
            config.capture_device = device;
        }
        if let Some(quality) = self.quality {
            config.set_quality(quality);
        }
        if let Some(ms) = self.tick_ms {
            config.tick_interval = Duration::from_millis(ms);
        }
        if let Some(width) = self.width {
            config.output_width = width;
        }
        if let Some(height) = self.height {
            config.output_height = height;
        }
        if let Some(variants) = self.variants {
            config.variants = variants;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_server_config()?;

    info!(
        bind = %config.bind_addr,
        device = %config.capture_device,
        quality = config.quality,
        tick_interval = ?config.tick_interval,
        "framecast server starting"
    );

    // Cleared by Ctrl+C; the listener and the producer both watch it.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_server(config, running).await?;

    info!("framecast server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
