//! TOML configuration layer.
//!
//! An optional file passed with `--config` overrides the built-in defaults;
//! CLI flags and environment variables override the file.  Every key is
//! optional, so a file only needs the settings it changes:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1"
//! port = 9001
//!
//! [capture]
//! device = "synthetic:1280x720"
//!
//! [stream]
//! quality = 70
//! tick_ms = 40
//! width = 640
//! height = 480
//! variants = ["color", "gray"]
//! ```

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use framecast_core::PayloadKind;
use serde::{Deserialize, Serialize};

use crate::domain::{ConfigError, ServerConfig};

/// On-disk configuration.  Absent keys leave the current value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub server: ServerSection,
    pub capture: CaptureSection,
    pub stream: StreamSection,
}

/// Listener settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    /// Interface to bind, e.g. `"0.0.0.0"`.
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Capture device settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureSection {
    /// Device selector, e.g. `"synthetic"`.
    pub device: Option<String>,
}

/// Encoding and cadence settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StreamSection {
    /// JPEG quality; clamped into 1–100.
    pub quality: Option<u8>,
    /// Pause between producer ticks in milliseconds.
    pub tick_ms: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub variants: Option<Vec<PayloadKind>>,
}

impl ConfigFile {
    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if the TOML is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parses TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Overlays every key present in this file onto `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBindAddress`] if `server.bind` is not an
    /// IP address.
    pub fn apply_to(&self, config: &mut ServerConfig) -> Result<(), ConfigError> {
        if let Some(bind) = &self.server.bind {
            let ip: IpAddr = bind
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidBindAddress(bind.clone()))?;
            config.bind_addr.set_ip(ip);
        }
        if let Some(port) = self.server.port {
            config.bind_addr.set_port(port);
        }
        if let Some(device) = &self.capture.device {
            config.capture_device = device.clone();
        }
        if let Some(quality) = self.stream.quality {
            config.set_quality(quality);
        }
        if let Some(ms) = self.stream.tick_ms {
            config.tick_interval = Duration::from_millis(ms);
        }
        if let Some(width) = self.stream.width {
            config.output_width = width;
        }
        if let Some(height) = self.stream.height {
            config.output_height = height;
        }
        if let Some(variants) = &self.stream.variants {
            config.variants = variants.clone();
        }
        Ok(())
    }
}
