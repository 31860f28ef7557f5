//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field has a default, so a missing section (or a missing file when
//! using [`Config::load_or_default`]) falls back to the panel's stock values.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::error::{PanelError, Result};
use crate::link::protocol::PeerAddress;
use crate::ranging::PathLossModel;
use crate::telemetry::FRAME_TEXT_LIMIT;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub ranging: RangingConfig,
    #[serde(default)]
    pub panel: PanelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// ESP-NOW dongle link configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LinkConfig {
    #[serde(default = "default_link_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_peer_mac")]
    pub peer_mac: PeerAddress,
}

/// Transport bridge timing
#[derive(Debug, Deserialize, Clone)]
pub struct BridgeConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_spm_window_ms")]
    pub spm_window_ms: u64,

    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    #[serde(default = "default_frame_text_limit")]
    pub frame_text_limit: usize,
}

/// RSSI distance calibration
#[derive(Debug, Deserialize, Clone)]
pub struct RangingConfig {
    #[serde(default = "default_reference_dbm")]
    pub reference_dbm: f32,

    #[serde(default = "default_path_loss_exponent")]
    pub path_loss_exponent: f32,
}

/// Panel start-up state
#[derive(Debug, Deserialize, Clone)]
pub struct PanelConfig {
    #[serde(default = "default_initial_speed")]
    pub initial_speed: u8,
}

/// Host-side tracing output
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Daily rolling log files are written here when set
    #[serde(default)]
    pub directory: Option<String>,
}

// Default value functions
fn default_link_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 115200 }
fn default_peer_mac() -> PeerAddress { PeerAddress([0xb8, 0xd6, 0x1a, 0xab, 0xd3, 0xbc]) }

fn default_tick_ms() -> u64 { 100 }
fn default_ping_interval_ms() -> u64 { 200 }
fn default_spm_window_ms() -> u64 { 15000 }
fn default_lock_timeout_ms() -> u64 { 10 }
fn default_frame_text_limit() -> usize { FRAME_TEXT_LIMIT }

fn default_reference_dbm() -> f32 { -40.0 }
fn default_path_loss_exponent() -> f32 { 2.0 }

fn default_initial_speed() -> u8 { 75 }

fn default_log_level() -> String { "info".to_string() }

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: default_link_port(),
            baud_rate: default_baud_rate(),
            peer_mac: default_peer_mac(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            ping_interval_ms: default_ping_interval_ms(),
            spm_window_ms: default_spm_window_ms(),
            lock_timeout_ms: default_lock_timeout_ms(),
            frame_text_limit: default_frame_text_limit(),
        }
    }
}

impl Default for RangingConfig {
    fn default() -> Self {
        Self {
            reference_dbm: default_reference_dbm(),
            path_loss_exponent: default_path_loss_exponent(),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            initial_speed: default_initial_speed(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

impl BridgeConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl RangingConfig {
    pub fn model(&self) -> PathLossModel {
        PathLossModel::new(self.reference_dbm, self.path_loss_exponent)
    }
}

fn invalid(message: impl std::fmt::Display) -> PanelError {
    PanelError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use biospider_panel::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or fall back to defaults when the file does not exist
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`] for a file that exists.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Link
        if self.link.port.is_empty() {
            return Err(invalid("link port cannot be empty"));
        }

        if ![115200, 230400, 460800, 921600].contains(&self.link.baud_rate) {
            return Err(invalid("baud_rate must be one of: 115200, 230400, 460800, 921600"));
        }

        // Bridge timing
        for (name, value) in [
            ("tick_ms", self.bridge.tick_ms),
            ("ping_interval_ms", self.bridge.ping_interval_ms),
            ("spm_window_ms", self.bridge.spm_window_ms),
            ("lock_timeout_ms", self.bridge.lock_timeout_ms),
        ] {
            if value == 0 {
                return Err(invalid(format!("{} must be greater than 0", name)));
            }
        }

        if self.bridge.lock_timeout_ms > 1000 {
            return Err(invalid("lock_timeout_ms must be between 1 and 1000"));
        }

        if self.bridge.frame_text_limit == 0 || self.bridge.frame_text_limit > FRAME_TEXT_LIMIT {
            return Err(invalid(format!("frame_text_limit must be between 1 and {}", FRAME_TEXT_LIMIT)));
        }

        // Ranging
        if !self.ranging.reference_dbm.is_finite() {
            return Err(invalid("reference_dbm must be a finite number"));
        }

        if !(self.ranging.path_loss_exponent > 0.0 && self.ranging.path_loss_exponent <= 10.0) {
            return Err(invalid("path_loss_exponent must be greater than 0.0 and at most 10.0"));
        }

        // Panel
        if self.panel.initial_speed > 100 {
            return Err(invalid("initial_speed must be between 0 and 100"));
        }

        // Logging
        if self.logging.level.trim().is_empty() {
            return Err(invalid("logging level cannot be empty"));
        }

        Ok(())
    }
}
