//! Server configuration types.
//!
//! [`ServerConfig`] is the single source of truth for all runtime settings.
//! It is assembled at startup from defaults, an optional TOML file
//! (see `infrastructure::config_file`), and CLI flags / environment
//! variables (see `main.rs`), then validated once.

use std::net::SocketAddr;
use std::time::Duration;

use framecast_core::{PayloadKind, TransformError, TransformPlan};
use thiserror::Error;

/// Lowest and highest accepted JPEG quality.
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The bind host is not an IP address.
    #[error("invalid bind address: {0:?}")]
    InvalidBindAddress(String),

    /// A value is outside its accepted range.
    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// All runtime configuration for the frame broadcast server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address and port the combined WebSocket/HTTP listener binds to.
    pub bind_addr: SocketAddr,

    /// Capture device selector, e.g. `synthetic` or `synthetic:1280x720`.
    pub capture_device: String,

    /// JPEG quality, 1–100.
    pub quality: u8,

    /// Pause between producer ticks; the only throughput cap in the system.
    pub tick_interval: Duration,

    /// Width every captured frame is scaled to before encoding.
    pub output_width: u32,

    /// Height every captured frame is scaled to before encoding.
    pub output_height: u32,

    /// Variants emitted each tick, in emission order.
    pub variants: Vec<PayloadKind>,
}

impl Default for ServerConfig {
    /// | Field          | Default          |
    /// |----------------|------------------|
    /// | bind_addr      | `0.0.0.0:9001`   |
    /// | capture_device | `synthetic`      |
    /// | quality        | 80               |
    /// | tick_interval  | 25 ms            |
    /// | output size    | 640 x 480        |
    /// | variants       | `color`, `gray`  |
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 9001)),
            capture_device: "synthetic".to_string(),
            quality: 80,
            tick_interval: Duration::from_millis(25),
            output_width: 640,
            output_height: 480,
            variants: PayloadKind::ALL.to_vec(),
        }
    }
}

impl ServerConfig {
    /// Sets the quality, clamping it into the accepted 1–100 range.
    pub fn set_quality(&mut self, quality: u8) {
        self.quality = quality.clamp(MIN_QUALITY, MAX_QUALITY);
    }

    /// Checks every field that has a restricted range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&self.quality) {
            return Err(ConfigError::Invalid {
                field: "quality",
                reason: format!("{} is outside {MIN_QUALITY}..={MAX_QUALITY}", self.quality),
            });
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::Invalid {
                field: "tick_interval",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.variants.is_empty() {
            return Err(ConfigError::Invalid {
                field: "variants",
                reason: "at least one variant is required".to_string(),
            });
        }
        if self.capture_device.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "capture_device",
                reason: "must not be empty".to_string(),
            });
        }
        self.transform_plan().map(|_| ())
    }

    /// Builds the per-tick transform plan from the output size and variants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an output dimension is zero.
    pub fn transform_plan(&self) -> Result<TransformPlan, ConfigError> {
        TransformPlan::new(self.output_width, self.output_height, &self.variants).map_err(
            |e: TransformError| ConfigError::Invalid {
                field: "output dimensions",
                reason: e.to_string(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_port_is_9001() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.bind_addr.port(), 9001);
    }

    #[test]
    fn test_default_stream_settings() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.quality, 80);
        assert_eq!(cfg.tick_interval, Duration::from_millis(25));
        assert_eq!((cfg.output_width, cfg.output_height), (640, 480));
        assert_eq!(cfg.variants, vec![PayloadKind::Color, PayloadKind::Gray]);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_set_quality_clamps() {
        let mut cfg = ServerConfig::default();
        cfg.set_quality(0);
        assert_eq!(cfg.quality, 1);
        cfg.set_quality(255);
        assert_eq!(cfg.quality, 100);
        cfg.set_quality(55);
        assert_eq!(cfg.quality, 55);
    }

    #[test]
    fn test_validate_rejects_out_of_range_quality() {
        let cfg = ServerConfig {
            quality: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "quality", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_tick() {
        let cfg = ServerConfig {
            tick_interval: Duration::ZERO,
            ..ServerConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "tick_interval", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_variants() {
        let cfg = ServerConfig {
            variants: Vec::new(),
            ..ServerConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "variants", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_dimensions() {
        let cfg = ServerConfig {
            output_height: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "output dimensions", .. })
        ));
    }

    #[test]
    fn test_transform_plan_uses_output_size() {
        let cfg = ServerConfig {
            output_width: 320,
            output_height: 240,
            ..ServerConfig::default()
        };
        let plan = cfg.transform_plan().unwrap();
        assert_eq!(plan.output_size(), (320, 240));
        assert_eq!(plan.kinds(), &[PayloadKind::Color, PayloadKind::Gray]);
    }
}
